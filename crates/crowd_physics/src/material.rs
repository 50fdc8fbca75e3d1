//! Material properties and the contact-parameter lookup used by the force
//! model.
//!
//! The registry is built once when a run's configuration is loaded and never
//! mutated afterward; any id or pair missing from the configuration falls
//! back to a fixed default, per §4.2 of the governing specification.

use crowd_containers::HashMap;

/// Young's modulus and shear modulus for a single material.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intrinsic {
    pub young_modulus: f64,
    pub shear_modulus: f64,
}

/// Normal damping, tangential damping and kinetic friction for a pair of
/// materials in contact.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactParameters {
    pub gamma_normal: f64,
    pub gamma_tangential: f64,
    pub kinetic_friction: f64,
}

/// Fallback intrinsic properties used when a shape references a material
/// that was not declared. Softer than the wall default, reflecting that
/// pedestrians are the deformable side of most contacts.
pub const DEFAULT_HUMAN_INTRINSIC: Intrinsic = Intrinsic {
    young_modulus: 1.0e5,
    shear_modulus: 3.0e4,
};

/// Fallback intrinsic properties used when a wall references a material that
/// was not declared.
pub const DEFAULT_WALL_INTRINSIC: Intrinsic = Intrinsic {
    young_modulus: 1.0e6,
    shear_modulus: 3.0e5,
};

/// Fallback contact parameters used when no `(mat_i, mat_j)` pair was
/// declared for a combination of materials that actually touch.
pub const DEFAULT_CONTACT_PARAMETERS: ContactParameters = ContactParameters {
    gamma_normal: 1.0,
    gamma_tangential: 0.5,
    kinetic_friction: 0.5,
};

/// Canonicalizes a pair of material ids so that lookup is commutative.
fn canonical_pair(id1: &str, id2: &str) -> (String, String) {
    if id1 <= id2 {
        (id1.to_owned(), id2.to_owned())
    } else {
        (id2.to_owned(), id1.to_owned())
    }
}

/// A frozen lookup table mapping material ids to their intrinsic properties
/// and pairs of material ids to their contact parameters.
#[derive(Clone, Debug)]
pub struct MaterialRegistry {
    intrinsics: HashMap<String, Intrinsic>,
    contacts: HashMap<(String, String), ContactParameters>,
}

impl MaterialRegistry {
    /// Builds a registry from the declared intrinsic materials and contact
    /// pairs. Does not validate that every pair of declared materials has a
    /// declared contact entry; a missing pair resolves to the default at
    /// lookup time rather than being an error, since agents and walls may
    /// combine materials that never actually touch.
    pub fn build(
        intrinsics: impl IntoIterator<Item = (String, Intrinsic)>,
        contacts: impl IntoIterator<Item = (String, String, ContactParameters)>,
    ) -> Self {
        let intrinsics = intrinsics.into_iter().collect();
        let contacts = contacts
            .into_iter()
            .map(|(id1, id2, params)| (canonical_pair(&id1, &id2), params))
            .collect();
        Self {
            intrinsics,
            contacts,
        }
    }

    /// Looks up the intrinsic properties for a shape's material, falling
    /// back to [`DEFAULT_HUMAN_INTRINSIC`] if `id` is `None` or unknown.
    pub fn shape_intrinsic(&self, id: Option<&str>) -> Intrinsic {
        id.and_then(|id| self.intrinsics.get(id))
            .copied()
            .unwrap_or(DEFAULT_HUMAN_INTRINSIC)
    }

    /// Looks up the intrinsic properties for a wall's material, falling back
    /// to [`DEFAULT_WALL_INTRINSIC`] if `id` is `None` or unknown.
    pub fn wall_intrinsic(&self, id: Option<&str>) -> Intrinsic {
        id.and_then(|id| self.intrinsics.get(id))
            .copied()
            .unwrap_or(DEFAULT_WALL_INTRINSIC)
    }

    /// Looks up the contact parameters for a pair of materials, commutative
    /// in its arguments, falling back to [`DEFAULT_CONTACT_PARAMETERS`] if
    /// the pair was not declared.
    pub fn contact(&self, id1: &str, id2: &str) -> ContactParameters {
        self.contacts
            .get(&canonical_pair(id1, id2))
            .copied()
            .unwrap_or(DEFAULT_CONTACT_PARAMETERS)
    }
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::build([], [])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_material_falls_back_to_the_class_default() {
        let registry = MaterialRegistry::default();
        assert_eq!(registry.shape_intrinsic(Some("concrete")), DEFAULT_HUMAN_INTRINSIC);
        assert_eq!(registry.wall_intrinsic(Some("concrete")), DEFAULT_WALL_INTRINSIC);
        assert_eq!(registry.shape_intrinsic(None), DEFAULT_HUMAN_INTRINSIC);
    }

    #[test]
    fn declared_material_is_found_regardless_of_class() {
        let registry = MaterialRegistry::build(
            [(
                "skin".to_owned(),
                Intrinsic {
                    young_modulus: 2.0e5,
                    shear_modulus: 7.0e4,
                },
            )],
            [],
        );
        assert_eq!(
            registry.shape_intrinsic(Some("skin")),
            Intrinsic {
                young_modulus: 2.0e5,
                shear_modulus: 7.0e4,
            }
        );
    }

    #[test]
    fn contact_lookup_is_commutative() {
        let params = ContactParameters {
            gamma_normal: 10.0,
            gamma_tangential: 5.0,
            kinetic_friction: 0.3,
        };
        let registry = MaterialRegistry::build(
            [],
            [("skin".to_owned(), "concrete".to_owned(), params)],
        );
        assert_eq!(registry.contact("skin", "concrete"), params);
        assert_eq!(registry.contact("concrete", "skin"), params);
    }

    #[test]
    fn undeclared_contact_pair_falls_back_to_default() {
        let registry = MaterialRegistry::default();
        assert_eq!(registry.contact("skin", "concrete"), DEFAULT_CONTACT_PARAMETERS);
    }
}

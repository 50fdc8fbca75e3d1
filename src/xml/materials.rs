//! `<Materials>`: declared intrinsic materials and the contact parameters
//! for every pair of them (§6).

use crate::xml::common::{collect_attrs, local_name, required, required_f64};
use anyhow::{Context, bail, ensure};
use crowd_physics::{ContactParameters, Intrinsic, MaterialRegistry};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashSet;
use std::path::Path;

/// Canonicalizes a pair of material ids so presence checks are commutative.
fn canonical_pair(id1: &str, id2: &str) -> (String, String) {
    if id1 <= id2 {
        (id1.to_owned(), id2.to_owned())
    } else {
        (id2.to_owned(), id1.to_owned())
    }
}

/// Parses the `Materials` file at `path` into a frozen [`MaterialRegistry`].
///
/// # Errors
/// If the file cannot be read or parsed, a material id is declared twice, or
/// any unordered pair of declared materials (including a material paired
/// with itself) lacks a `<Contact>` entry.
pub fn parse(path: &Path) -> anyhow::Result<MaterialRegistry> {
    let text = crowd_io::read_text_file_with_context(path)?;

    let mut intrinsics: Vec<(String, Intrinsic)> = Vec::new();
    let mut contacts: Vec<(String, String, ContactParameters)> = Vec::new();
    let mut declared_pairs: HashSet<(String, String)> = HashSet::new();

    let mut reader = Reader::from_str(&text);
    reader.config_mut().trim_text(true);
    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("malformed XML in {}", path.display()))?;
        match event {
            Event::Eof => break,
            Event::Start(tag) | Event::Empty(tag) => {
                let attrs = collect_attrs(&tag)?;
                match local_name(&tag).as_str() {
                    "Material" => {
                        let id = required(&attrs, "Id", "Material")?.to_owned();
                        ensure!(
                            intrinsics.iter().all(|(existing, _)| existing != &id),
                            "material id {id:?} is declared more than once"
                        );
                        let young_modulus = required_f64(&attrs, "YoungModulus", "Material")?;
                        let shear_modulus = required_f64(&attrs, "ShearModulus", "Material")?;
                        intrinsics.push((
                            id,
                            Intrinsic {
                                young_modulus,
                                shear_modulus,
                            },
                        ));
                    }
                    "Contact" => {
                        let id1 = required(&attrs, "Id1", "Contact")?.to_owned();
                        let id2 = required(&attrs, "Id2", "Contact")?.to_owned();
                        let gamma_normal = required_f64(&attrs, "GammaNormal", "Contact")?;
                        let gamma_tangential = required_f64(&attrs, "GammaTangential", "Contact")?;
                        let kinetic_friction = required_f64(&attrs, "KineticFriction", "Contact")?;
                        declared_pairs.insert(canonical_pair(&id1, &id2));
                        contacts.push((
                            id1,
                            id2,
                            ContactParameters {
                                gamma_normal,
                                gamma_tangential,
                                kinetic_friction,
                            },
                        ));
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    let mut ids: Vec<&str> = intrinsics.iter().map(|(id, _)| id.as_str()).collect();
    ids.sort_unstable();
    for (i, &id_i) in ids.iter().enumerate() {
        for &id_j in &ids[i..] {
            let pair = canonical_pair(id_i, id_j);
            if !declared_pairs.contains(&pair) {
                bail!(
                    "{}: no <Contact> entry for material pair ({}, {})",
                    path.display(),
                    pair.0,
                    pair.1
                );
            }
        }
    }

    Ok(MaterialRegistry::build(intrinsics, contacts))
}

//! The contact force model: normal damped-spring interaction, tangential
//! damped-spring with Coulomb friction capping, and persistent tangential
//! relative displacement (§4.6).

use crate::contact::ContactRecord;
use crate::material::{ContactParameters, Intrinsic};
use crowd_geometry::ContactGeometry;
use nalgebra::Vector2;

/// The force and effective normal stiffness resulting from resolving one
/// active contact for one sub-step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactForce {
    /// The force applied to participant A; participant B receives the
    /// negated force, satisfying momentum symmetry by construction.
    pub force_on_a: Vector2<f64>,
    /// The effective normal stiffness `k_n` used, for the `dt_m` stability
    /// check in §9.
    pub normal_stiffness: f64,
}

/// The harmonic mean of two positive lengths or moduli, expressing the
/// series compliance of two materials in contact.
fn harmonic_mean(a: f64, b: f64) -> f64 {
    2.0 * a * b / (a + b)
}

/// Resolves one active contact between participants A and B, updating the
/// contact's persistent tangential state in place and returning the force
/// to apply to A (and, negated, to B).
///
/// `velocity_a`/`velocity_b` are the world-space velocities of the material
/// points currently in contact (zero for the wall side of an agent–wall
/// contact). `normal` points from A toward B. `effective_length` is the
/// harmonic mean of the two participants' radii for an agent–agent contact,
/// or simply the disk's radius for an agent–wall contact.
#[allow(clippy::too_many_arguments)]
pub fn resolve_contact(
    geometry: &ContactGeometry,
    velocity_a: Vector2<f64>,
    velocity_b: Vector2<f64>,
    intrinsic_a: Intrinsic,
    intrinsic_b: Intrinsic,
    effective_length: f64,
    params: ContactParameters,
    record: &mut ContactRecord,
    dt_m: f64,
) -> ContactForce {
    let normal_stiffness = harmonic_mean(intrinsic_a.young_modulus, intrinsic_b.young_modulus)
        * 0.5
        * effective_length;
    let tangential_stiffness =
        harmonic_mean(intrinsic_a.shear_modulus, intrinsic_b.shear_modulus) * 0.5 * effective_length;

    let n = geometry.normal;
    let relative_velocity = velocity_b - velocity_a;
    let normal_speed = relative_velocity.dot(&n);
    let tangential_velocity = relative_velocity - n * normal_speed;

    // Non-attractive clamp: a positive scalar here would pull A toward B, so
    // it is clamped to zero rather than applied.
    let normal_scalar =
        (-normal_stiffness * geometry.penetration - params.gamma_normal * normal_speed).min(0.0);

    let mut xi = record.tangential_displacement + tangential_velocity * dt_m;
    xi -= n * xi.dot(&n);

    let trial_tangential_force = -tangential_stiffness * xi - params.gamma_tangential * tangential_velocity;
    let friction_limit = params.kinetic_friction * normal_scalar.abs();
    let trial_magnitude = trial_tangential_force.norm();

    let tangential_force_on_a = if trial_magnitude > friction_limit {
        let capped = trial_tangential_force * (friction_limit / trial_magnitude);
        xi = -capped / tangential_stiffness;
        capped
    } else {
        trial_tangential_force
    };

    record.tangential_displacement = xi;
    record.normal_force = -normal_scalar;
    record.tangential_force = tangential_force_on_a.norm();

    ContactForce {
        force_on_a: n * normal_scalar + tangential_force_on_a,
        normal_stiffness,
    }
}

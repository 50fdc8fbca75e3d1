//! `<Agents>`: the static, per-run layout of every agent's five disks (§6).
//!
//! This file carries only the geometry and mechanical constants that never
//! change over a run; pose and velocity come from the separate Agent
//! Dynamics file (see [`crate::xml::dynamics`]) and are combined with these
//! definitions by the driver.

use crate::xml::common::{collect_attrs, local_name, local_name_end, optional_f64, optional_str, parse_position, required, required_f64, required_u64};
use anyhow::{Context, anyhow, bail, ensure};
use crowd_geometry::Disk;
use crowd_physics::{AgentId, Shape};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::path::Path;

/// Fallback relaxation time (seconds) used for an agent that does not
/// declare a `FloorDamping`/`AngularDamping` attribute.
///
/// The XML attribute is read as the relaxation time τ itself (the quantity
/// [`crowd_physics::Agent`] stores and the integrator consumes directly),
/// not its reciprocal damping rate; see `DESIGN.md` for the reasoning.
pub const DEFAULT_RELAXATION_TIME: f64 = 0.5;

/// One agent's static definition: its mechanical constants and its five
/// shapes, each positioned in the agent's local frame.
#[derive(Clone, Debug)]
pub struct AgentDefinition {
    pub id: AgentId,
    pub mass: f64,
    pub moment_of_inertia: f64,
    pub floor_relaxation_time: f64,
    pub angular_relaxation_time: f64,
    pub shapes: [Shape; crowd_physics::agent::SHAPES_PER_AGENT],
}

struct AgentBuilder {
    id: u64,
    mass: f64,
    moment_of_inertia: f64,
    floor_relaxation_time: f64,
    angular_relaxation_time: f64,
    shapes: Vec<Shape>,
}

/// Parses the `Agents` file at `path`.
///
/// # Errors
/// If the file cannot be read or parsed, an agent has a non-positive mass or
/// moment of inertia, a shape's type is not `"disk"` or its radius is not
/// positive, or any agent does not have exactly five shapes.
pub fn parse(path: &Path) -> anyhow::Result<Vec<AgentDefinition>> {
    let text = crowd_io::read_text_file_with_context(path)?;

    let mut agents = Vec::new();
    let mut current: Option<AgentBuilder> = None;

    let mut reader = Reader::from_str(&text);
    reader.config_mut().trim_text(true);
    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("malformed XML in {}", path.display()))?;
        match event {
            Event::Eof => break,
            Event::Start(tag) if local_name(&tag) == "Agent" => {
                ensure!(current.is_none(), "{}: nested <Agent> elements are not supported", path.display());
                let attrs = collect_attrs(&tag)?;
                current = Some(AgentBuilder {
                    id: required_u64(&attrs, "Id", "Agent")?,
                    mass: required_f64(&attrs, "Mass", "Agent")?,
                    moment_of_inertia: required_f64(&attrs, "MomentOfInertia", "Agent")?,
                    floor_relaxation_time: optional_f64(&attrs, "FloorDamping", "Agent", DEFAULT_RELAXATION_TIME)?,
                    angular_relaxation_time: optional_f64(&attrs, "AngularDamping", "Agent", DEFAULT_RELAXATION_TIME)?,
                    shapes: Vec::new(),
                });
            }
            Event::Empty(tag) if local_name(&tag) == "Shape" => {
                let attrs = collect_attrs(&tag)?;
                let builder = current
                    .as_mut()
                    .ok_or_else(|| anyhow!("<Shape> outside of an <Agent>"))?;

                let shape_type = required(&attrs, "Type", "Shape")?;
                ensure!(shape_type == "disk", "<Shape> has unsupported Type {shape_type:?}; only \"disk\" is supported");

                let radius = required_f64(&attrs, "Radius", "Shape")?;
                ensure!(radius > 0.0, "agent {} has a shape with non-positive radius {radius}", builder.id);

                let position = attrs
                    .get("Position")
                    .ok_or_else(|| anyhow!("<Shape> is missing required attribute Position"))?;
                let local_offset = parse_position(position, "Shape")?.coords;
                let material_id = optional_str(&attrs, "MaterialId");

                builder.shapes.push(Shape::new(Disk::new(local_offset, radius), material_id));
            }
            Event::End(tag) if local_name_end(&tag) == "Agent" => {
                let builder = current
                    .take()
                    .ok_or_else(|| anyhow!("unmatched </Agent> in {}", path.display()))?;
                let shape_count = builder.shapes.len();
                let shapes: [Shape; crowd_physics::agent::SHAPES_PER_AGENT] =
                    builder.shapes.try_into().map_err(|_| {
                        anyhow!(
                            "agent {} has {shape_count} shape(s); exactly {} are required",
                            builder.id,
                            crowd_physics::agent::SHAPES_PER_AGENT
                        )
                    })?;
                agents.push(AgentDefinition {
                    id: AgentId(builder.id),
                    mass: builder.mass,
                    moment_of_inertia: builder.moment_of_inertia,
                    floor_relaxation_time: builder.floor_relaxation_time,
                    angular_relaxation_time: builder.angular_relaxation_time,
                    shapes,
                });
            }
            _ => {}
        }
    }

    if current.is_some() {
        bail!("{}: <Agent> never closed", path.display());
    }
    Ok(agents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_shapes_xml() -> String {
        (0..5)
            .map(|i| format!(r#"<Shape Type="disk" Radius="0.1" Position="0,{}"/>"#, i as f64 * 0.2 - 0.4))
            .collect()
    }

    #[test]
    fn parses_an_agent_with_five_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Agents.xml");
        std::fs::write(
            &path,
            format!(
                r#"<Agents><Agent Id="1" Mass="80" MomentOfInertia="4">{}</Agent></Agents>"#,
                five_shapes_xml()
            ),
        )
        .unwrap();

        let agents = parse(&path).unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].floor_relaxation_time, DEFAULT_RELAXATION_TIME);
    }

    #[test]
    fn an_agent_with_the_wrong_shape_count_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Agents.xml");
        std::fs::write(
            &path,
            r#"<Agents><Agent Id="1" Mass="80" MomentOfInertia="4">
                <Shape Type="disk" Radius="0.1" Position="0,0"/>
            </Agent></Agents>"#,
        )
        .unwrap();
        assert!(parse(&path).is_err());
    }

    #[test]
    fn a_non_disk_shape_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Agents.xml");
        std::fs::write(
            &path,
            r#"<Agents><Agent Id="1" Mass="80" MomentOfInertia="4">
                <Shape Type="capsule" Radius="0.1" Position="0,0"/>
            </Agent></Agents>"#,
        )
        .unwrap();
        assert!(parse(&path).is_err());
    }
}

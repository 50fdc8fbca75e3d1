//! Agent Dynamics: per-call input kinematics plus driving force/torque, and
//! the output kinematics written back after a coarse step (§6).

use crate::xml::common::{collect_attrs, format_position, format_vector, local_name, parse_position, parse_vector, required_f64};
use anyhow::{Context, anyhow};
use crowd_physics::{AgentId, World};
use nalgebra::{Point2, Vector2};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::Event;
use std::io::Cursor;
use std::path::Path;

/// One agent's input kinematics and driving force/torque for one call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AgentDynamicsInput {
    pub id: AgentId,
    pub position: Point2<f64>,
    pub velocity: Vector2<f64>,
    pub theta: f64,
    pub omega: f64,
    pub driving_force: Vector2<f64>,
    pub driving_torque: f64,
}

/// Parses the Agent Dynamics input file at `path`.
///
/// # Errors
/// If the file cannot be read or parsed, or any `<Agent>` is missing its
/// `<Kinematics>` or `<Dynamics>` child.
pub fn parse_input(path: &Path) -> anyhow::Result<Vec<AgentDynamicsInput>> {
    let text = crowd_io::read_text_file_with_context(path)?;

    let mut inputs = Vec::new();
    let mut current_id: Option<u64> = None;
    let mut position = None;
    let mut velocity = None;
    let mut theta = None;
    let mut omega = None;
    let mut driving_force = None;
    let mut driving_torque = None;

    let mut reader = Reader::from_str(&text);
    reader.config_mut().trim_text(true);
    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("malformed XML in {}", path.display()))?;
        match event {
            Event::Eof => break,
            Event::Start(tag) if local_name(&tag) == "Agent" => {
                let attrs = collect_attrs(&tag)?;
                current_id = Some(crate::xml::common::required_u64(&attrs, "Id", "Agent")?);
                position = None;
                velocity = None;
                theta = None;
                omega = None;
                driving_force = None;
                driving_torque = None;
            }
            Event::Empty(tag) if local_name(&tag) == "Kinematics" => {
                let attrs = collect_attrs(&tag)?;
                let raw_position = attrs
                    .get("Position")
                    .ok_or_else(|| anyhow!("<Kinematics> is missing required attribute Position"))?;
                let raw_velocity = attrs
                    .get("Velocity")
                    .ok_or_else(|| anyhow!("<Kinematics> is missing required attribute Velocity"))?;
                position = Some(parse_position(raw_position, "Kinematics")?);
                velocity = Some(parse_vector(raw_velocity, "Kinematics")?);
                theta = Some(required_f64(&attrs, "Theta", "Kinematics")?);
                omega = Some(required_f64(&attrs, "Omega", "Kinematics")?);
            }
            Event::Empty(tag) if local_name(&tag) == "Dynamics" => {
                let attrs = collect_attrs(&tag)?;
                let raw_fp = attrs.get("Fp").ok_or_else(|| anyhow!("<Dynamics> is missing required attribute Fp"))?;
                driving_force = Some(parse_vector(raw_fp, "Dynamics")?);
                driving_torque = Some(required_f64(&attrs, "Mp", "Dynamics")?);
            }
            Event::End(tag) if crate::xml::common::local_name_end(&tag) == "Agent" => {
                let id = current_id
                    .take()
                    .ok_or_else(|| anyhow!("unmatched </Agent> in {}", path.display()))?;
                inputs.push(AgentDynamicsInput {
                    id: AgentId(id),
                    position: position
                        .take()
                        .ok_or_else(|| anyhow!("agent {id} is missing <Kinematics>"))?,
                    velocity: velocity
                        .take()
                        .ok_or_else(|| anyhow!("agent {id} is missing <Kinematics>"))?,
                    theta: theta.take().ok_or_else(|| anyhow!("agent {id} is missing <Kinematics>"))?,
                    omega: omega.take().ok_or_else(|| anyhow!("agent {id} is missing <Kinematics>"))?,
                    driving_force: driving_force
                        .take()
                        .ok_or_else(|| anyhow!("agent {id} is missing <Dynamics>"))?,
                    driving_torque: driving_torque
                        .take()
                        .ok_or_else(|| anyhow!("agent {id} is missing <Dynamics>"))?,
                });
            }
            _ => {}
        }
    }

    Ok(inputs)
}

/// Writes the Agent Dynamics output file for `world`'s current kinematics:
/// the same shape as the input file, minus the `<Dynamics>` tag (§6).
pub fn write_output(path: &Path, world: &World) -> anyhow::Result<()> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .create_element("AgentDynamics")
        .write_inner_content::<_, anyhow::Error>(|writer| {
            for agent in world.agents().iter() {
                writer
                    .create_element("Agent")
                    .with_attribute(("Id", agent.id().0.to_string().as_str()))
                    .write_inner_content::<_, anyhow::Error>(|writer| {
                        writer
                            .create_element("Kinematics")
                            .with_attribute(("Position", format_position(agent.pose().position).as_str()))
                            .with_attribute(("Velocity", format_vector(agent.velocity()).as_str()))
                            .with_attribute(("Theta", agent.pose().orientation.to_string().as_str()))
                            .with_attribute(("Omega", agent.angular_velocity().to_string().as_str()))
                            .write_empty()?;
                        Ok(())
                    })?;
            }
            Ok(())
        })?;

    let bytes = writer.into_inner().into_inner();
    let text = String::from_utf8(bytes).context("agent dynamics writer produced invalid UTF-8")?;
    crowd_io::write_text_file_atomically_with_context(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_position_velocity_and_driving_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AgentDynamics.xml");
        std::fs::write(
            &path,
            r#"<AgentDynamics>
                <Agent Id="1">
                    <Kinematics Position="5,2" Velocity="1,0" Theta="0" Omega="0"/>
                    <Dynamics Fp="0,0" Mp="0"/>
                </Agent>
            </AgentDynamics>"#,
        )
        .unwrap();

        let inputs = parse_input(&path).unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].position, Point2::new(5.0, 2.0));
        assert_eq!(inputs[0].velocity, Vector2::new(1.0, 0.0));
    }

    #[test]
    fn a_missing_dynamics_tag_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AgentDynamics.xml");
        std::fs::write(
            &path,
            r#"<AgentDynamics><Agent Id="1"><Kinematics Position="0,0" Velocity="0,0" Theta="0" Omega="0"/></Agent></AgentDynamics>"#,
        )
        .unwrap();
        assert!(parse_input(&path).is_err());
    }
}

//! `AgentInteractions.xml`: the persisted per-contact tangential state,
//! optional on input and mandatory on output (§6).
//!
//! On input it seeds a fresh [`ContactBook`] so that a sustained contact's
//! tangential spring state (`ξ`) survives across separate calls; on output
//! it reports every contact alive at the end of the coarse step just run.

use crate::xml::common::{collect_attrs, format_vector, local_name, local_name_end, parse_vector, required_f64, required_u64, required_usize};
use anyhow::{Context, anyhow};
use crowd_physics::{AgentId, ContactBook, ContactKey, WallId};
use nalgebra::Vector2;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::Event;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

/// One seeded contact: its key and its persisted tangential state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SeedRecord {
    pub key: ContactKey,
    pub tangential_displacement: Vector2<f64>,
    pub normal_force: f64,
    pub tangential_force: f64,
}

/// Parses a previously written Agent Interactions file, if present, into the
/// list of contacts to seed a fresh [`ContactBook`] with.
///
/// Returns an empty list (not an error) if `path` does not exist, since this
/// input is optional (§6).
///
/// # Errors
/// If the file exists but cannot be read or parsed.
pub fn parse(path: &Path) -> anyhow::Result<Vec<SeedRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = crowd_io::read_text_file_with_context(path)?;

    let mut seeds = Vec::new();
    let mut agent_stack: Vec<u64> = Vec::new();

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
                agent_stack.push(required_u64(&attrs, "Id", "Agent")?);
            }
            Event::Empty(tag) if local_name(&tag) == "Agent" => {
                // A parent agent with no recorded interactions at all.
            }
            Event::Empty(tag) if local_name(&tag) == "Interaction" => {
                let attrs = collect_attrs(&tag)?;
                let parent_id = *agent_stack
                    .first()
                    .ok_or_else(|| anyhow!("<Interaction> outside of a parent <Agent>"))?;
                let child_id = *agent_stack
                    .last()
                    .ok_or_else(|| anyhow!("<Interaction> outside of a child <Agent>"))?;
                let shape_a = required_usize(&attrs, "ParentShape", "Interaction")?;
                let shape_b = required_usize(&attrs, "ChildShape", "Interaction")?;
                let xi = parse_vector(
                    attrs
                        .get("TangentialRelativeDisplacement")
                        .ok_or_else(|| anyhow!("<Interaction> is missing TangentialRelativeDisplacement"))?,
                    "Interaction",
                )?;
                seeds.push(SeedRecord {
                    key: ContactKey::agent_agent(AgentId(parent_id), shape_a, AgentId(child_id), shape_b),
                    tangential_displacement: xi,
                    normal_force: required_f64(&attrs, "Fn", "Interaction")?,
                    tangential_force: required_f64(&attrs, "Ft", "Interaction")?,
                });
            }
            Event::Empty(tag) if local_name(&tag) == "Wall" => {
                let attrs = collect_attrs(&tag)?;
                let agent_id = *agent_stack
                    .last()
                    .ok_or_else(|| anyhow!("<Wall> outside of a parent <Agent>"))?;
                let shape = required_usize(&attrs, "ShapeId", "Wall")?;
                let wall = required_u64(&attrs, "WallId", "Wall")?;
                let corner = required_usize(&attrs, "CornerId", "Wall")?;
                let xi = parse_vector(
                    attrs
                        .get("TangentialRelativeDisplacement")
                        .ok_or_else(|| anyhow!("<Wall> is missing TangentialRelativeDisplacement"))?,
                    "Wall",
                )?;
                seeds.push(SeedRecord {
                    key: ContactKey::agent_wall(AgentId(agent_id), shape, WallId(wall), corner),
                    tangential_displacement: xi,
                    normal_force: required_f64(&attrs, "Fn", "Wall")?,
                    tangential_force: required_f64(&attrs, "Ft", "Wall")?,
                });
            }
            Event::End(tag) if local_name_end(&tag) == "Agent" => {
                agent_stack.pop();
            }
            _ => {}
        }
    }

    Ok(seeds)
}

/// Seeds `book` with every record parsed from an Agent Interactions file.
pub fn seed_contact_book(book: &mut ContactBook, seeds: &[SeedRecord]) {
    for seed in seeds {
        book.seed(seed.key, seed.tangential_displacement, seed.normal_force, seed.tangential_force);
    }
}

#[derive(Default)]
struct AgentGroup {
    agent_agent: BTreeMap<u64, Vec<(usize, usize, Vector2<f64>, f64, f64)>>,
    agent_wall: Vec<(usize, u64, usize, Vector2<f64>, f64, f64)>,
}

/// Writes the Agent Interactions output file listing every contact alive in
/// `book` at the end of a coarse step.
pub fn write(path: &Path, book: &ContactBook) -> anyhow::Result<()> {
    let mut groups: BTreeMap<u64, AgentGroup> = BTreeMap::new();

    for (key, record) in book.iter() {
        match *key {
            ContactKey::AgentAgent {
                agent_a,
                agent_b,
                shape_a,
                shape_b,
            } => {
                groups.entry(agent_a).or_default().agent_agent.entry(agent_b).or_default().push((
                    shape_a,
                    shape_b,
                    record.tangential_displacement,
                    record.normal_force,
                    record.tangential_force,
                ));
            }
            ContactKey::AgentWall {
                agent,
                shape,
                wall,
                corner,
            } => {
                groups.entry(agent).or_default().agent_wall.push((
                    shape,
                    wall,
                    corner,
                    record.tangential_displacement,
                    record.normal_force,
                    record.tangential_force,
                ));
            }
        }
    }

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .create_element("AgentInteractions")
        .write_inner_content::<_, anyhow::Error>(|writer| {
            for (agent_id, group) in &groups {
                writer
                    .create_element("Agent")
                    .with_attribute(("Id", agent_id.to_string().as_str()))
                    .write_inner_content::<_, anyhow::Error>(|writer| {
                        for (other_id, interactions) in &group.agent_agent {
                            writer
                                .create_element("Agent")
                                .with_attribute(("Id", other_id.to_string().as_str()))
                                .write_inner_content::<_, anyhow::Error>(|writer| {
                                    for (shape_a, shape_b, xi, fn_, ft) in interactions {
                                        writer
                                            .create_element("Interaction")
                                            .with_attribute(("ParentShape", shape_a.to_string().as_str()))
                                            .with_attribute(("ChildShape", shape_b.to_string().as_str()))
                                            .with_attribute(("TangentialRelativeDisplacement", format_vector(*xi).as_str()))
                                            .with_attribute(("Fn", fn_.to_string().as_str()))
                                            .with_attribute(("Ft", ft.to_string().as_str()))
                                            .write_empty()?;
                                    }
                                    Ok(())
                                })?;
                        }
                        for (shape, wall, corner, xi, fn_, ft) in &group.agent_wall {
                            writer
                                .create_element("Wall")
                                .with_attribute(("ShapeId", shape.to_string().as_str()))
                                .with_attribute(("WallId", wall.to_string().as_str()))
                                .with_attribute(("CornerId", corner.to_string().as_str()))
                                .with_attribute(("TangentialRelativeDisplacement", format_vector(*xi).as_str()))
                                .with_attribute(("Ft", ft.to_string().as_str()))
                                .with_attribute(("Fn", fn_.to_string().as_str()))
                                .write_empty()?;
                        }
                        Ok(())
                    })?;
            }
            Ok(())
        })?;

    let bytes = writer.into_inner().into_inner();
    let text = String::from_utf8(bytes).context("agent interactions writer produced invalid UTF-8")?;
    crowd_io::write_text_file_atomically_with_context(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_an_agent_wall_interaction() {
        let mut book = ContactBook::new();
        let key = ContactKey::agent_wall(AgentId(3), 2, WallId(1), 0);
        book.seed(key, Vector2::new(0.1, -0.2), 15.0, 6.0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AgentInteractions.xml");
        write(&path, &book).unwrap();

        let seeds = parse(&path).unwrap();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].key, key);
        assert_eq!(seeds[0].tangential_displacement, Vector2::new(0.1, -0.2));
        assert_eq!(seeds[0].normal_force, 15.0);
        assert_eq!(seeds[0].tangential_force, 6.0);
    }

    #[test]
    fn round_trips_an_agent_agent_interaction() {
        let mut book = ContactBook::new();
        let key = ContactKey::agent_agent(AgentId(1), 0, AgentId(4), 3);
        book.seed(key, Vector2::new(0.05, 0.0), 9.0, 1.5);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AgentInteractions.xml");
        write(&path, &book).unwrap();

        let seeds = parse(&path).unwrap();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].key, key);
    }

    #[test]
    fn a_missing_file_parses_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does_not_exist.xml");
        assert_eq!(parse(&path).unwrap(), Vec::new());
    }
}

//! `<Geometry>`: the bounding box and polygonal wall obstacles (§6).

use crate::xml::common::{collect_attrs, local_name, local_name_end, optional_str, parse_position, required_f64, required_u64};
use anyhow::{Context, anyhow, bail};
use crowd_physics::{Wall, WallId};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::path::Path;

/// The parsed contents of the `Geometry` file: the simulation's bounding box
/// and its static wall obstacles.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub lx: f64,
    pub ly: f64,
    pub walls: Vec<Wall>,
}

struct WallBuilder {
    id: u64,
    material_id: Option<String>,
    corners: Vec<nalgebra::Point2<f64>>,
}

/// Parses the `Geometry` file at `path`.
///
/// # Errors
/// If the file cannot be read or parsed, `<Dimensions>` is missing, or any
/// `<Wall>` has fewer than two `<Corner>` children.
pub fn parse(path: &Path) -> anyhow::Result<Geometry> {
    let text = crowd_io::read_text_file_with_context(path)?;

    let mut lx = None;
    let mut ly = None;
    let mut walls = Vec::new();
    let mut current_wall: Option<WallBuilder> = None;

    let mut reader = Reader::from_str(&text);
    reader.config_mut().trim_text(true);
    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("malformed XML in {}", path.display()))?;
        match event {
            Event::Eof => break,
            Event::Start(tag) if local_name(&tag) == "Wall" => {
                let attrs = collect_attrs(&tag)?;
                bail_if_open_wall(&current_wall, path)?;
                current_wall = Some(WallBuilder {
                    id: required_u64(&attrs, "Id", "Wall")?,
                    material_id: optional_str(&attrs, "MaterialId"),
                    corners: Vec::new(),
                });
            }
            Event::Empty(tag) if local_name(&tag) == "Corner" => {
                let attrs = collect_attrs(&tag)?;
                let coordinates = attrs
                    .get("Coordinates")
                    .ok_or_else(|| anyhow!("<Corner> is missing required attribute Coordinates"))?;
                let point = parse_position(coordinates, "Corner")?;
                current_wall
                    .as_mut()
                    .ok_or_else(|| anyhow!("<Corner> outside of a <Wall>"))?
                    .corners
                    .push(point);
            }
            Event::Empty(tag) if local_name(&tag) == "Dimensions" => {
                let attrs = collect_attrs(&tag)?;
                lx = Some(required_f64(&attrs, "Lx", "Dimensions")?);
                ly = Some(required_f64(&attrs, "Ly", "Dimensions")?);
            }
            Event::End(tag) if local_name_end(&tag) == "Wall" => {
                let builder = current_wall
                    .take()
                    .ok_or_else(|| anyhow!("unmatched </Wall> in {}", path.display()))?;
                walls.push(Wall::new(WallId(builder.id), builder.material_id, builder.corners)?);
            }
            _ => {}
        }
    }

    Ok(Geometry {
        lx: lx.ok_or_else(|| anyhow!("{}: missing <Dimensions>", path.display()))?,
        ly: ly.ok_or_else(|| anyhow!("{}: missing <Dimensions>", path.display()))?,
        walls,
    })
}

fn bail_if_open_wall(current_wall: &Option<WallBuilder>, path: &Path) -> anyhow::Result<()> {
    if current_wall.is_some() {
        bail!("{}: nested <Wall> elements are not supported", path.display());
    }
    Ok(())
}

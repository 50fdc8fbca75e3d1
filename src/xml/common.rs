//! Shared helpers for reading and writing the XML boundary formats (§6).

use anyhow::{Context, anyhow};
use nalgebra::{Point2, Vector2};
use quick_xml::events::{BytesEnd, BytesStart};
use std::collections::HashMap;

/// The local (unqualified) name of a start/empty tag, e.g. `Agent` for
/// `<Agent .../>`.
pub fn local_name(tag: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(tag.local_name().as_ref()).into_owned()
}

/// The local (unqualified) name of a closing tag.
pub fn local_name_end(tag: &BytesEnd<'_>) -> String {
    String::from_utf8_lossy(tag.local_name().as_ref()).into_owned()
}

/// Collects every attribute of a start/empty tag into a plain string map,
/// keyed by attribute name.
pub fn collect_attrs(tag: &BytesStart<'_>) -> anyhow::Result<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for attr in tag.attributes() {
        let attr = attr.context("malformed XML attribute")?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .with_context(|| format!("malformed value for attribute {key}"))?
            .into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

pub fn required<'a>(
    attrs: &'a HashMap<String, String>,
    name: &str,
    element: &str,
) -> anyhow::Result<&'a str> {
    attrs
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("<{element}> is missing required attribute {name}"))
}

pub fn required_f64(attrs: &HashMap<String, String>, name: &str, element: &str) -> anyhow::Result<f64> {
    required(attrs, name, element)?
        .parse::<f64>()
        .with_context(|| format!("<{element}> attribute {name} is not a valid number"))
}

pub fn required_u64(attrs: &HashMap<String, String>, name: &str, element: &str) -> anyhow::Result<u64> {
    required(attrs, name, element)?
        .parse::<u64>()
        .with_context(|| format!("<{element}> attribute {name} is not a valid integer"))
}

pub fn required_usize(attrs: &HashMap<String, String>, name: &str, element: &str) -> anyhow::Result<usize> {
    required(attrs, name, element)?
        .parse::<usize>()
        .with_context(|| format!("<{element}> attribute {name} is not a valid non-negative integer"))
}

pub fn optional_str(attrs: &HashMap<String, String>, name: &str) -> Option<String> {
    attrs.get(name).cloned()
}

pub fn optional_f64(
    attrs: &HashMap<String, String>,
    name: &str,
    element: &str,
    default: f64,
) -> anyhow::Result<f64> {
    match attrs.get(name) {
        Some(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("<{element}> attribute {name} is not a valid number")),
        None => Ok(default),
    }
}

/// Parses a `"x,y"` coordinate pair as a point.
pub fn parse_position(raw: &str, element: &str) -> anyhow::Result<Point2<f64>> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| anyhow!("<{element}> position {raw:?} is not in \"x,y\" form"))?;
    let x: f64 = x
        .trim()
        .parse()
        .with_context(|| format!("<{element}> position {raw:?} has an invalid x component"))?;
    let y: f64 = y
        .trim()
        .parse()
        .with_context(|| format!("<{element}> position {raw:?} has an invalid y component"))?;
    Ok(Point2::new(x, y))
}

/// Parses a `"x,y"` pair as a vector (velocities, forces).
pub fn parse_vector(raw: &str, element: &str) -> anyhow::Result<Vector2<f64>> {
    let point = parse_position(raw, element)?;
    Ok(Vector2::new(point.x, point.y))
}

pub fn format_position(point: Point2<f64>) -> String {
    format!("{},{}", point.x, point.y)
}

pub fn format_vector(v: Vector2<f64>) -> String {
    format!("{},{}", v.x, v.y)
}

//! `<Parameters>`: the `Static`/`Dynamic` directory roots and the caller's
//! coarse/mechanical time steps for one call (§6, §12).

use crate::xml::common::{collect_attrs, local_name, required_f64};
use anyhow::{Context, anyhow};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::path::{Path, PathBuf};

/// The parsed contents of the `Parameters` file.
///
/// `static_dir`/`dynamic_dir` are already resolved to absolute paths,
/// relative to the parameters file's own parent directory rather than the
/// process's current working directory, so the driver can be invoked from
/// anywhere (§12).
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    pub static_dir: PathBuf,
    pub dynamic_dir: PathBuf,
    pub dt: f64,
    pub dt_m: f64,
}

/// Parses the `Parameters` file at `path`.
///
/// # Errors
/// If the file cannot be read, is malformed XML, or is missing its
/// `<Directories>` or `<Times>` element or any of their attributes.
pub fn parse(path: &Path) -> anyhow::Result<Parameters> {
    let text = crowd_io::read_text_file_with_context(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let mut static_dir = None;
    let mut dynamic_dir = None;
    let mut dt = None;
    let mut dt_m = None;

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
                    "Directories" => {
                        static_dir = Some(base.join(
                            attrs
                                .get("Static")
                                .ok_or_else(|| anyhow!("<Directories> is missing required attribute Static"))?,
                        ));
                        dynamic_dir = Some(base.join(
                            attrs
                                .get("Dynamic")
                                .ok_or_else(|| anyhow!("<Directories> is missing required attribute Dynamic"))?,
                        ));
                    }
                    "Times" => {
                        dt = Some(required_f64(&attrs, "TimeStep", "Times")?);
                        dt_m = Some(required_f64(&attrs, "TimeStepMechanical", "Times")?);
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    Ok(Parameters {
        static_dir: static_dir.ok_or_else(|| anyhow!("{}: missing <Directories>", path.display()))?,
        dynamic_dir: dynamic_dir.ok_or_else(|| anyhow!("{}: missing <Directories>", path.display()))?,
        dt: dt.ok_or_else(|| anyhow!("{}: missing <Times>", path.display()))?,
        dt_m: dt_m.ok_or_else(|| anyhow!("{}: missing <Times>", path.display()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_directories_relative_to_the_parameters_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Parameters.xml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"<Parameters><Directories Static="Static" Dynamic="Dynamic"/><Times TimeStep="0.1" TimeStepMechanical="1e-5"/></Parameters>"#
        )
        .unwrap();

        let parameters = parse(&path).unwrap();
        assert_eq!(parameters.static_dir, dir.path().join("Static"));
        assert_eq!(parameters.dynamic_dir, dir.path().join("Dynamic"));
        assert_eq!(parameters.dt, 0.1);
        assert_eq!(parameters.dt_m, 1e-5);
    }

    #[test]
    fn missing_times_element_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Parameters.xml");
        std::fs::write(&path, r#"<Parameters><Directories Static="S" Dynamic="D"/></Parameters>"#).unwrap();
        assert!(parse(&path).is_err());
    }
}

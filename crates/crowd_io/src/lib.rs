//! Utilities for input/output.

use std::{
    fs::{self, File},
    io::{self, BufReader, Read, Write},
    path::Path,
};

/// Creates any directories missing in order for the given path to be valid.
pub fn create_directory_if_missing(path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if path.extension().is_some() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
        } else {
            Ok(())
        }
    } else {
        fs::create_dir_all(path)
    }
}

/// Creates the file at the given path, as well as any missing parent
/// directories.
pub fn create_file_and_required_directories(file_path: impl AsRef<Path>) -> io::Result<fs::File> {
    create_directory_if_missing(&file_path)?;
    File::create(file_path)
}

/// Reads and returns the content of the specified text file.
pub fn read_text_file(file_path: impl AsRef<Path>) -> io::Result<String> {
    let file = File::open(file_path)?;
    let mut text = String::new();
    let _ = BufReader::new(file).read_to_string(&mut text)?;
    Ok(text)
}

/// Writes the given string as a text file with the specified path, regardless
/// of whether the file already exists.
pub fn write_text_file(text: &str, output_file_path: impl AsRef<Path>) -> io::Result<()> {
    let mut file = create_file_and_required_directories(output_file_path)?;
    write!(&mut file, "{text}")
}

/// Writes the given string to a temporary file next to `output_file_path` and
/// then renames it into place, so a reader never observes a partially written
/// file.
pub fn write_text_file_atomically(
    text: &str,
    output_file_path: impl AsRef<Path>,
) -> io::Result<()> {
    let output_file_path = output_file_path.as_ref();
    let tmp_path = output_file_path.with_extension("tmp");
    write_text_file(text, &tmp_path)?;
    fs::rename(&tmp_path, output_file_path)
}

/// Reads a text file, attaching the file path to the error on failure.
pub fn read_text_file_with_context(file_path: impl AsRef<Path>) -> anyhow::Result<String> {
    use anyhow::Context;
    let file_path = file_path.as_ref();
    read_text_file(file_path).with_context(|| format!("failed to read {}", file_path.display()))
}

/// Atomically writes a text file, attaching the file path to the error on
/// failure.
pub fn write_text_file_atomically_with_context(
    text: &str,
    output_file_path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    use anyhow::Context;
    let output_file_path = output_file_path.as_ref();
    write_text_file_atomically(text, output_file_path)
        .with_context(|| format!("failed to write {}", output_file_path.display()))
}

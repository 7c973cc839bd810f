//! File input and output helpers for project data.

use std::fs::File;
use std::io::{self, Read, Write};

pub mod project;

/// Reads a file to string.
pub fn read_to_string(path: &str) -> io::Result<String> {
    let mut buffer = String::new();
    File::open(path)?.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Writes `contents` to `path`, replacing any existing file.
pub fn write_string(path: &str, contents: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())
}

/// Serializes `value` as pretty JSON into `path`.
pub fn write_json<T: serde::Serialize + ?Sized>(path: &str, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    write_string(path, &json)
}

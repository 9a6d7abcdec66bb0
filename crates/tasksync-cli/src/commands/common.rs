use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CliError;

/// Read and decode a JSON snapshot file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::ReadInput {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::ParseInput {
        path: path.display().to_string(),
        source,
    })
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// First line of `text`, truncated to `max_len` characters
pub fn text_preview(text: &str, max_len: usize) -> String {
    let first_line = text.lines().next().unwrap_or("");
    let preview: String = first_line.chars().take(max_len).collect();
    if first_line.chars().count() > max_len {
        format!("{preview}...")
    } else {
        preview
    }
}

pub const fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

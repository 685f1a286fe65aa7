//! CLI subcommand implementations.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub mod info;
pub mod render;

/// Reads a whole text file, transparently decompressing `.gz` inputs.
pub fn read_text(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut text = String::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        GzDecoder::new(file)
            .read_to_string(&mut text)
            .with_context(|| format!("Failed to decompress {}", path.display()))?;
    } else {
        file.read_to_string(&mut text)
            .with_context(|| format!("Failed to read {}", path.display()))?;
    }
    Ok(text)
}

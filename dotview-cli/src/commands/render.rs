//! Render command implementation - drive the plot engine headlessly and
//! write an SVG snapshot.

use anyhow::{anyhow, Context, Result};
use dotview_core::{
    Dataset, DotPlot, FileCoordsSource, MemoryCost, PlotHost, Severity, StyleValue, SvgDocument,
};
use std::path::PathBuf;
use std::time::Instant;

use crate::LoadChoice;

/// Host that routes plot notifications into the log.
struct LogHost;

impl PlotHost for LogHost {
    fn update_memory_buttons(&mut self, cost: MemoryCost) {
        log::debug!(
            "unloaded bytes in view: unique {}, repetitive {}",
            cost.unique_bytes,
            cost.repetitive_bytes
        );
    }

    fn show_message(&mut self, text: &str, severity: Severity) {
        match severity {
            Severity::Info => log::info!("{text}"),
            Severity::Warning => log::warn!("{text}"),
            Severity::Error => log::error!("{text}"),
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn execute(
    index: PathBuf,
    coords: PathBuf,
    out: PathBuf,
    width: u32,
    height: u32,
    refs: Option<String>,
    queries: Option<String>,
    load: LoadChoice,
    annotations: Vec<PathBuf>,
    set: Vec<String>,
) -> Result<()> {
    log::info!("Rendering {} onto {}", coords.display(), out.display());
    let now = Instant::now();
    let mut host = LogHost;

    let index_text = super::read_text(&index)?;
    let source = FileCoordsSource::open(&coords)
        .with_context(|| format!("Failed to open coordinate file {}", coords.display()))?;

    let mut plot = DotPlot::new(width as f64, height as f64);
    plot.set_coords(&index_text, Box::new(source), now)
        .with_context(|| format!("Failed to parse coordinate index {}", index.display()))?;

    if let Some(names) = refs {
        plot.select_refs(&split_names(&names), now);
        log::info!("selected {} references", plot.selected_refs().len());
    }
    if let Some(names) = queries {
        plot.select_queries(&split_names(&names), now);
        log::info!("selected {} queries", plot.selected_queries().len());
    }

    if let Some(tag) = load.tag() {
        let merged = plot
            .load_all_in_view(tag, now)
            .context("Failed to load coordinate chunks")?;
        log::info!("loaded coordinate chunks for {merged} queries");
    }

    for path in annotations {
        let dataset: Dataset = serde_json::from_str(&super::read_text(&path)?)
            .with_context(|| format!("Failed to parse annotation dataset {}", path.display()))?;
        let key = dataset.key.clone();
        plot.add_annotation_data(dataset, &mut host, now)
            .with_context(|| format!("Annotation dataset '{key}' was rejected"))?;
        log::info!("attached annotation track '{key}'");
    }

    for entry in &set {
        let (name, value) = parse_style_override(entry)?;
        plot.set_style(name, value, now);
    }

    let scene = plot.render(&mut host);
    log::info!(
        "scene: {} alignments in {} batches, {} tracks",
        scene.alignments.drawn,
        scene.alignments.batches.len(),
        scene.x_tracks.len() + scene.y_tracks.len()
    );

    let mut svg = SvgDocument::new(width as f64, height as f64);
    svg.add_background("#ffffff");
    svg.add_scene(&scene, plot.layout(), plot.styles());
    svg.write_to_file(&out)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    log::info!("Wrote {}", out.display());
    Ok(())
}

fn split_names(names: &str) -> Vec<&str> {
    names
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect()
}

/// Parses a 'name=value' style override, guessing the value type the way the
/// schema does: booleans, then numbers, then plain text.
fn parse_style_override(entry: &str) -> Result<(&str, StyleValue)> {
    let (name, value) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("style override '{entry}' is not of the form name=value"))?;
    let value = match value {
        "true" => StyleValue::Bool(true),
        "false" => StyleValue::Bool(false),
        _ => match value.parse::<f64>() {
            Ok(number) => StyleValue::Number(number),
            Err(_) => StyleValue::from(value),
        },
    };
    Ok((name.trim(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_names() {
        assert_eq!(split_names("chr1,chr2"), vec!["chr1", "chr2"]);
        assert_eq!(split_names(" chr1 , ,chr2 "), vec!["chr1", "chr2"]);
    }

    #[test]
    fn test_style_override_types() {
        let (name, value) = parse_style_override("minimum alignment length=500").unwrap();
        assert_eq!(name, "minimum alignment length");
        assert_eq!(value, StyleValue::Number(500.0));

        let (_, value) = parse_style_override("show repetitive alignments=false").unwrap();
        assert_eq!(value, StyleValue::Bool(false));

        let (_, value) = parse_style_override("x-axis title=Reference genome").unwrap();
        assert_eq!(value, StyleValue::from("Reference genome"));

        assert!(parse_style_override("no equals sign").is_err());
    }
}

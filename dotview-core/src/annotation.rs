//! Annotation datasets and per-axis feature tracks.
//!
//! An incoming dataset carries either reference or query coordinates; which
//! one decides the axis its track attaches to. Records are validated against
//! the loaded sequence metadata at intake: a dataset sharing no sequence name
//! with the alignments is rejected wholesale, partial overlap is a warning,
//! and features not fully contained in their sequence are dropped.

use crate::scale::MultiSegmentScale;
use crate::style::{track_style_schema, StyleSet, StyleValue};
use crate::types::{Axis, Position, SeqMeta, Strand};
use log::warn;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("dataset '{0}' has no records")]
    Empty(String),
    #[error("annotation records carry neither ref nor query coordinates")]
    NoSide,
    #[error("none of the annotations' sequence names match the alignments' sequence names")]
    NoMatchingSequences,
}

/// One incoming annotation record, as deserialized from a dataset payload.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "ref")]
    pub ref_name: Option<String>,
    pub ref_start: Option<Position>,
    pub ref_end: Option<Position>,
    pub query: Option<String>,
    pub query_start: Option<Position>,
    pub query_end: Option<Position>,
    pub name: String,
    pub strand: Option<String>,
}

/// An annotation dataset: a key identifying the track plus its records.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    pub key: String,
    pub data: Vec<FeatureRecord>,
}

/// A plottable feature bound to one axis sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub seq_name: String,
    pub start: Position,
    pub end: Position,
    pub name: String,
    pub strand: Option<Strand>,
}

impl Feature {
    pub fn length(&self) -> Position {
        self.end.saturating_sub(self.start)
    }
}

/// An annotation strip attached to one axis of the plot.
#[derive(Debug, Clone)]
pub struct Track {
    pub side: Axis,
    pub key: String,
    pub data: Vec<Feature>,
    pub styles: StyleSet,
    thickness: f64,
}

impl Track {
    pub fn new(side: Axis, key: impl Into<String>, data: Vec<Feature>) -> Self {
        Self {
            side,
            key: key.into(),
            data,
            styles: StyleSet::from_schema(&track_style_schema()),
            thickness: 30.0,
        }
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn set_style(&mut self, name: &str, value: StyleValue) {
        self.styles.set(name, value);
    }
}

/// Resolves a dataset against the loaded sequence metadata, yielding the axis
/// it belongs to and the plottable features.
pub fn resolve_dataset(
    dataset: &Dataset,
    refs: &[SeqMeta],
    queries: &[SeqMeta],
) -> Result<(Axis, Vec<Feature>), AnnotationError> {
    let first = dataset
        .data
        .first()
        .ok_or_else(|| AnnotationError::Empty(dataset.key.clone()))?;

    let side = if first.ref_name.is_some() {
        Axis::X
    } else if first.query.is_some() {
        Axis::Y
    } else {
        return Err(AnnotationError::NoSide);
    };

    let sequences = match side {
        Axis::X => refs,
        Axis::Y => queries,
    };
    let scale = MultiSegmentScale::with_data(0.0, sequences);

    let mut features = Vec::new();
    for record in &dataset.data {
        let (seq_name, start, end) = match side {
            Axis::X => (record.ref_name.clone(), record.ref_start, record.ref_end),
            Axis::Y => (record.query.clone(), record.query_start, record.query_end),
        };
        let (Some(seq_name), Some(start), Some(end)) = (seq_name, start, end) else {
            warn!(
                "annotation '{}' in dataset '{}' is missing coordinates",
                record.name, dataset.key
            );
            continue;
        };
        features.push(Feature {
            seq_name,
            start,
            end,
            name: record.name.clone(),
            strand: record
                .strand
                .as_deref()
                .and_then(|s| s.chars().next())
                .map(Strand::from),
        });
    }

    let mut missing: Vec<&str> = features
        .iter()
        .filter(|f| !scale.contains(&f.seq_name, 0))
        .map(|f| f.seq_name.as_str())
        .collect();
    missing.sort_unstable();
    missing.dedup();

    let known: Vec<&Feature> = features
        .iter()
        .filter(|f| scale.contains(&f.seq_name, 0))
        .collect();
    if known.is_empty() {
        return Err(AnnotationError::NoMatchingSequences);
    }
    if !missing.is_empty() {
        warn!(
            "some annotations are on sequences that are not in the alignments input: {}",
            missing.join(", ")
        );
    }

    let plottable = features
        .iter()
        .filter(|f| scale.contains(&f.seq_name, f.start) && scale.contains(&f.seq_name, f.end))
        .cloned()
        .collect();
    Ok((side, plottable))
}

//! Scene construction and the SVG backend.
//!
//! Scene builders are pure: they turn scales, viewport state and styles into
//! plain geometry structs, testable without any drawing surface. The SVG
//! writer is a thin consumer of those structs.

pub mod alignments;
pub mod grid;
pub mod svg;
pub mod tracks;

/// Everything one render pass produces.
#[derive(Debug, Clone)]
pub struct PlotScene {
    pub grid: grid::GridScene,
    pub alignments: alignments::AlignmentScene,
    pub x_tracks: Vec<tracks::TrackScene>,
    pub y_tracks: Vec<tracks::TrackScene>,
}

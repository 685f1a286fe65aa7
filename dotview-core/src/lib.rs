//! dotview core library
//!
//! Engine of an interactive comparative-genomics dot plot: multi-segment
//! coordinate scales, lazy byte-range alignment loading, a zoom-stack
//! viewport, pure scene builders with an SVG backend, annotation tracks and
//! the style/selection state tying them together.

pub mod annotation;
pub mod index;
pub mod layout;
pub mod loader;
pub mod plot;
pub mod render;
pub mod scale;
pub mod schedule;
pub mod style;
pub mod types;
pub mod viewport;

// Re-export commonly used types and functions
pub use annotation::{Dataset, Feature, FeatureRecord, Track};
pub use index::{parse_index, CoordsIndex, IndexError, QueryInfo, RefInfo};
pub use loader::{
    AlignmentStore, CoordsSource, FileCoordsSource, LoadError, MemCoordsSource, MemoryCost,
};
pub use plot::{DotPlot, NullHost, PlotHost, Severity};
pub use render::svg::SvgDocument;
pub use render::PlotScene;
pub use scale::{Boundary, LinearScale, MultiSegmentScale};
pub use style::{plot_style_schema, track_style_schema, StyleDef, StyleSet, StyleValue};
pub use types::{Alignment, Axis, LoadTag, Position, SeqMeta, Strand, Tag};
pub use viewport::{Rect, ZoomScales};

/// Version information for the dotview core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

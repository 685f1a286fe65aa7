//! Grid and axis-label geometry: viewport filtering, edge snapping and
//! base-pair coordinate formatting.

use crate::scale::{Boundary, LinearScale};
use crate::style::{keys, StyleSet};
use crate::types::{Axis, Position};
use crate::viewport::{Rect, ZoomScales};

/// Segments at or below this pixel width hide their grid line in `zoom` mode
/// and collapse their label to a `.` placeholder.
pub const MIN_SEGMENT_PX: f64 = 5.0;

/// Base-pair coordinate sub-labels only show above this segment width.
pub const MIN_BP_LABEL_PX: f64 = 70.0;

/// A sequence boundary clipped to the viewport, with the visible base-pair
/// sub-range recomputed proportionally.
#[derive(Debug, Clone, PartialEq)]
pub struct SnappedBoundary {
    pub name: String,
    pub start: f64,
    pub end: f64,
    pub length: Position,
    pub start_bases: Position,
    pub end_bases: Position,
}

impl SnappedBoundary {
    pub fn pixel_width(&self) -> f64 {
        (self.end - self.start).abs()
    }
}

/// A span pushed through the zoom scale, clipped to the viewport edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnappedSpan {
    pub start: f64,
    pub end: f64,
    pub start_bases: Position,
    pub end_bases: Position,
}

/// Transforms a span through the zoom scale, drops it when it lies entirely
/// outside the viewport, and snaps overhanging ends to the viewport edge,
/// recomputing the visible base range from the bases-per-pixel ratio.
pub fn snap_span(
    area: Rect,
    zoom: &LinearScale,
    axis: Axis,
    start: f64,
    end: f64,
    length: Position,
) -> Option<SnappedSpan> {
    let start = zoom.scale(start);
    let end = zoom.scale(end);

    let (min, max) = match axis {
        Axis::X => (area.x0, area.x1),
        Axis::Y => (area.y0, area.y1),
    };
    if (start < min && end < min) || (start > max && end > max) {
        return None;
    }
    // On y the axis is flipped: a span starts at the bottom edge.
    let (start_edge, end_edge) = match axis {
        Axis::X => (min, max),
        Axis::Y => (max, min),
    };

    let width = (end - start).abs();
    let bases_per_pixel = if width > 0.0 { length as f64 / width } else { 0.0 };
    let inside = |p: f64| p >= min && p <= max;

    let mut span = SnappedSpan {
        start,
        end,
        start_bases: 0,
        end_bases: length,
    };
    if !inside(span.start) {
        span.start_bases = (bases_per_pixel * (span.start - start_edge).abs()).round() as Position;
        span.start = start_edge;
    }
    if !inside(span.end) {
        span.end_bases = (length as f64 - bases_per_pixel * (span.end - end_edge).abs())
            .max(0.0)
            .round() as Position;
        span.end = end_edge;
    }
    Some(span)
}

/// Filters and snaps a boundary list to the current viewport.
pub fn zoom_filter_snap(
    area: Rect,
    zoom: &LinearScale,
    axis: Axis,
    boundaries: &[Boundary],
) -> Vec<SnappedBoundary> {
    boundaries
        .iter()
        .filter_map(|b| {
            snap_span(area, zoom, axis, b.start, b.end, b.length).map(|span| SnappedBoundary {
                name: b.name.clone(),
                start: span.start,
                end: span.end,
                length: b.length,
                start_bases: span.start_bases,
                end_bases: span.end_bases,
            })
        })
        .collect()
}

/// Formats a base-pair coordinate for an axis sub-label.
pub fn base_format(bases: Position) -> String {
    if bases == 0 {
        return "0".to_string();
    }
    let mb = (bases as f64 / 10_000.0).round() / 100.0;
    format!("{mb} Mb")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridVisibility {
    Always,
    Zoom,
    Never,
}

impl GridVisibility {
    fn from_style(text: &str) -> Self {
        match text {
            "always" => GridVisibility::Always,
            "never" => GridVisibility::Never,
            _ => GridVisibility::Zoom,
        }
    }

    fn shows(&self, width: f64) -> bool {
        match self {
            GridVisibility::Always => true,
            GridVisibility::Never => false,
            GridVisibility::Zoom => width > MIN_SEGMENT_PX,
        }
    }
}

/// Grid line at one boundary start.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub at: f64,
    pub visible: bool,
}

/// Sequence name label centered on one boundary; `text` collapses to `.` for
/// segments too narrow to label. `seq_name` is the click target for the
/// select-this-sequence gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub text: String,
    pub seq_name: String,
    pub mid: f64,
}

/// Base-pair coordinates at both ends of one boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct BpLabel {
    pub start_text: String,
    pub end_text: String,
    pub start_at: f64,
    pub end_at: f64,
    pub visible: bool,
}

/// Geometry for one axis of the grid.
#[derive(Debug, Clone)]
pub struct AxisGrid {
    pub boundaries: Vec<SnappedBoundary>,
    pub lines: Vec<GridLine>,
    pub labels: Vec<AxisLabel>,
    pub bp_labels: Vec<BpLabel>,
    pub show_bp: bool,
}

#[derive(Debug, Clone)]
pub struct GridScene {
    pub x: AxisGrid,
    pub y: AxisGrid,
    pub x_title: String,
    pub y_title: String,
}

fn axis_grid(boundaries: Vec<SnappedBoundary>, visibility: GridVisibility, show_bp: bool) -> AxisGrid {
    let lines = boundaries
        .iter()
        .map(|b| GridLine {
            at: b.start,
            visible: visibility.shows(b.pixel_width()),
        })
        .collect();
    let labels = boundaries
        .iter()
        .map(|b| AxisLabel {
            text: if b.pixel_width() > MIN_SEGMENT_PX {
                b.name.clone()
            } else {
                ".".to_string()
            },
            seq_name: b.name.clone(),
            mid: (b.start + b.end) / 2.0,
        })
        .collect();
    let bp_labels = boundaries
        .iter()
        .map(|b| BpLabel {
            start_text: base_format(b.start_bases),
            end_text: base_format(b.end_bases),
            start_at: b.start,
            end_at: b.end,
            visible: b.pixel_width() > MIN_BP_LABEL_PX,
        })
        .collect();
    AxisGrid {
        boundaries,
        lines,
        labels,
        bp_labels,
        show_bp,
    }
}

/// Builds the grid geometry for both axes from already-snapped boundaries.
pub fn build_grid(
    x_boundaries: Vec<SnappedBoundary>,
    y_boundaries: Vec<SnappedBoundary>,
    styles: &StyleSet,
) -> GridScene {
    GridScene {
        x: axis_grid(
            x_boundaries,
            GridVisibility::from_style(styles.text(keys::GRID_REF)),
            styles.boolean(keys::BP_MARKERS_REF),
        ),
        y: axis_grid(
            y_boundaries,
            GridVisibility::from_style(styles.text(keys::GRID_QUERY)),
            styles.boolean(keys::BP_MARKERS_QUERY),
        ),
        x_title: styles.text(keys::X_AXIS_TITLE).to_string(),
        y_title: styles.text(keys::Y_AXIS_TITLE).to_string(),
    }
}

/// Convenience: snap both axes of a pair of multi-segment scales through the
/// current zoom.
pub fn snapped_boundaries(
    zoom: &ZoomScales,
    x_boundaries: &[Boundary],
    y_boundaries: &[Boundary],
) -> (Vec<SnappedBoundary>, Vec<SnappedBoundary>) {
    let area = zoom.area();
    (
        zoom_filter_snap(area, zoom.x(), Axis::X, x_boundaries),
        zoom_filter_snap(area, zoom.y(), Axis::Y, y_boundaries),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    fn identity() -> LinearScale {
        let mut scale = LinearScale::new();
        scale.set_domain((0.0, 100.0));
        scale.set_range((0.0, 100.0));
        scale
    }

    #[test]
    fn test_base_format() {
        assert_eq!(base_format(0), "0");
        assert_eq!(base_format(100_000), "0.1 Mb");
        assert_eq!(base_format(1_000_000), "1 Mb");
        assert_eq!(base_format(1_234_567), "1.23 Mb");
    }

    #[test]
    fn test_span_inside_viewport_is_untouched() {
        let span = snap_span(area(), &identity(), Axis::X, 10.0, 60.0, 500).unwrap();
        assert_eq!(span.start, 10.0);
        assert_eq!(span.end, 60.0);
        assert_eq!(span.start_bases, 0);
        assert_eq!(span.end_bases, 500);
    }

    #[test]
    fn test_span_fully_outside_is_dropped() {
        assert!(snap_span(area(), &identity(), Axis::X, -50.0, -10.0, 500).is_none());
        assert!(snap_span(area(), &identity(), Axis::X, 110.0, 150.0, 500).is_none());
    }

    #[test]
    fn test_overhanging_span_snaps_proportionally() {
        // 200 px wide span carrying 1000 bases: 5 bases per pixel
        let span = snap_span(area(), &identity(), Axis::X, -50.0, 150.0, 1000).unwrap();
        assert_eq!(span.start, 0.0);
        assert_eq!(span.end, 100.0);
        assert_eq!(span.start_bases, 250);
        assert_eq!(span.end_bases, 750);
    }

    #[test]
    fn test_y_axis_snaps_to_flipped_edges() {
        // y spans run bottom-to-top: start below the viewport, end above it
        let span = snap_span(area(), &identity(), Axis::Y, 150.0, -50.0, 1000).unwrap();
        assert_eq!(span.start, 100.0);
        assert_eq!(span.end, 0.0);
        assert_eq!(span.start_bases, 250);
        assert_eq!(span.end_bases, 750);
    }

    #[test]
    fn test_narrow_segment_collapses_label_and_line() {
        let boundaries = vec![
            SnappedBoundary {
                name: "wide".to_string(),
                start: 0.0,
                end: 50.0,
                length: 500,
                start_bases: 0,
                end_bases: 500,
            },
            SnappedBoundary {
                name: "narrow".to_string(),
                start: 50.0,
                end: 54.0,
                length: 40,
                start_bases: 0,
                end_bases: 40,
            },
        ];
        let grid = axis_grid(boundaries, GridVisibility::Zoom, true);
        assert_eq!(grid.labels[0].text, "wide");
        assert_eq!(grid.labels[1].text, ".");
        assert_eq!(grid.labels[1].seq_name, "narrow");
        assert!(grid.lines[0].visible);
        assert!(!grid.lines[1].visible);
        assert!(!grid.bp_labels[0].visible, "below 70 px");
    }

    #[test]
    fn test_grid_visibility_modes() {
        assert!(GridVisibility::Always.shows(1.0));
        assert!(!GridVisibility::Never.shows(1000.0));
        assert!(GridVisibility::Zoom.shows(6.0));
        assert!(!GridVisibility::Zoom.shows(5.0));
    }
}

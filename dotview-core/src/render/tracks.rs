//! Annotation track geometry: feature filtering, longest-k selection and
//! glyph construction for one axis strip.
//!
//! Glyphs are built in track-local coordinates: local x runs along the axis
//! in zoomed pixels, local y is the cross offset within the strip thickness.
//! X strips are translated into place by the writer; y strips carry the
//! rotate-90-and-mirror transform, so one glyph geometry serves both sides.

use crate::annotation::{Feature, Track};
use crate::render::grid::snap_span;
use crate::scale::MultiSegmentScale;
use crate::style::keys;
use crate::types::{Axis, Strand};
use crate::viewport::ZoomScales;
use std::collections::HashMap;

/// Ordinal feature palette keyed by sequence name, cycling after eight
/// entries.
pub const TRACK_PALETTE: [&str; 8] = [
    "#1b9e77", "#d95f02", "#7570b3", "#e7298a", "#66a61e", "#e6ab02", "#a6761d", "#666666",
];

/// Cross-axis inset of the rectangle body within the strip.
const RECT_INSET: f64 = 2.0;

/// Along-axis length of an arrowhead, capped at the glyph length.
const ARROW_HEAD: f64 = 8.0;

/// How a feature's strand is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKind {
    AtEnd,
    InMiddle,
    Triangle,
}

impl ArrowKind {
    fn from_style(text: &str) -> Self {
        match text {
            "arrow in the middle" => ArrowKind::InMiddle,
            "triangle" => ArrowKind::Triangle,
            _ => ArrowKind::AtEnd,
        }
    }
}

/// Rectangle body of one feature glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRect {
    pub start: f64,
    pub end: f64,
    pub top: f64,
    pub height: f64,
    pub opacity: f64,
}

/// Filled arrow polygon of one feature glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowGlyph {
    pub points: Vec<(f64, f64)>,
}

/// Optional name label centered on the glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLabel {
    pub text: String,
    pub at: f64,
    pub font_size: f64,
}

/// Everything drawn for one feature. `name` is the click-hook payload,
/// `hover` the tooltip string.
#[derive(Debug, Clone)]
pub struct FeatureGlyph {
    pub name: String,
    pub hover: String,
    pub color: String,
    pub rect: Option<FeatureRect>,
    pub arrow: Option<ArrowGlyph>,
    pub label: Option<FeatureLabel>,
}

/// Geometry of one annotation strip.
#[derive(Debug, Clone)]
pub struct TrackScene {
    pub side: Axis,
    pub key: String,
    /// Top-left corner of the strip on the plot surface.
    pub origin: (f64, f64),
    pub thickness: f64,
    pub glyphs: Vec<FeatureGlyph>,
}

/// Assigns palette entries in order of first appearance.
#[derive(Default)]
struct OrdinalPalette {
    assigned: HashMap<String, usize>,
}

impl OrdinalPalette {
    fn color(&mut self, key: &str) -> &'static str {
        let next = self.assigned.len();
        let index = *self.assigned.entry(key.to_string()).or_insert(next);
        TRACK_PALETTE[index % TRACK_PALETTE.len()]
    }
}

/// Builds the glyphs of one track for the current viewport.
///
/// Features below the minimum length drop out first; the k longest of the
/// rest bound drawing cost no matter how many features the track carries.
/// The survivors are scaled to pixels and snapped to the zoom viewport.
pub fn build_track(
    track: &Track,
    scale: &MultiSegmentScale,
    zoom: &ZoomScales,
    origin: (f64, f64),
) -> TrackScene {
    let styles = &track.styles;
    let min_length = styles.number(keys::MIN_FEATURE_LENGTH) as u64;
    let k_longest = styles.number(keys::K_LONGEST).max(0.0) as usize;
    let show_arrows = styles.boolean(keys::SHOW_ARROWS);
    let arrow_kind = ArrowKind::from_style(styles.text(keys::ARROW_STYLE));
    let show_rectangles = styles.boolean(keys::SHOW_RECTANGLES);
    let opacity = styles.number(keys::RECTANGLE_OPACITY);
    let show_names = styles.boolean(keys::SHOW_NAMES);
    let font_size = styles.number(keys::TRACK_FONT_SIZE);
    let thickness = track.thickness();

    let axis_scale = match track.side {
        Axis::X => zoom.x(),
        Axis::Y => zoom.y(),
    };
    let area = zoom.area();

    let mut keep: Vec<&Feature> = track
        .data
        .iter()
        .filter(|f| f.length() >= min_length)
        .collect();
    keep.sort_by(|a, b| b.length().cmp(&a.length()));
    keep.truncate(k_longest);

    let mut palette = OrdinalPalette::default();
    let mut glyphs = Vec::new();
    for feature in keep {
        let (Some(p0), Some(p1)) = (
            scale.get(&feature.seq_name, feature.start),
            scale.get(&feature.seq_name, feature.end),
        ) else {
            continue;
        };
        let Some(span) = snap_span(area, axis_scale, track.side, p0, p1, feature.length()) else {
            continue;
        };
        let (a0, a1) = (span.start, span.end);

        let rect = show_rectangles.then(|| FeatureRect {
            start: a0.min(a1),
            end: a0.max(a1),
            top: RECT_INSET,
            height: thickness - 2.0 * RECT_INSET,
            opacity,
        });
        let arrow = if show_arrows {
            feature
                .strand
                .map(|strand| arrow_points(arrow_kind, strand, a0, a1, thickness))
        } else {
            None
        };
        let label = show_names.then(|| FeatureLabel {
            text: feature.name.clone(),
            at: (a0 + a1) / 2.0,
            font_size,
        });

        glyphs.push(FeatureGlyph {
            name: feature.name.clone(),
            hover: format!(
                "{} ({}:{}-{})",
                feature.name, feature.seq_name, feature.start, feature.end
            ),
            color: palette.color(&feature.seq_name).to_string(),
            rect,
            arrow,
            label,
        });
    }

    TrackScene {
        side: track.side,
        key: track.key.clone(),
        origin,
        thickness,
        glyphs,
    }
}

/// The arrow tip sits at the feature's end for forward strands and at its
/// start for reverse strands, whichever pixel direction that is.
fn arrow_points(kind: ArrowKind, strand: Strand, a0: f64, a1: f64, thickness: f64) -> ArrowGlyph {
    let (back, tip) = match strand {
        Strand::Forward => (a0, a1),
        Strand::Reverse => (a1, a0),
    };
    let mid = thickness / 2.0;
    let head = ARROW_HEAD.min((tip - back).abs());
    let signed_head = if tip >= back { head } else { -head };
    let points = match kind {
        ArrowKind::AtEnd => vec![
            (tip - signed_head, RECT_INSET),
            (tip, mid),
            (tip - signed_head, thickness - RECT_INSET),
        ],
        ArrowKind::InMiddle => {
            let center = (a0 + a1) / 2.0;
            vec![
                (center - signed_head / 2.0, RECT_INSET),
                (center + signed_head / 2.0, mid),
                (center - signed_head / 2.0, thickness - RECT_INSET),
            ]
        }
        ArrowKind::Triangle => vec![
            (back, RECT_INSET),
            (tip, mid),
            (back, thickness - RECT_INSET),
        ],
    };
    ArrowGlyph { points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleValue;
    use crate::types::SeqMeta;
    use crate::viewport::Rect;

    fn feature(seq: &str, start: u64, end: u64, name: &str, strand: Option<Strand>) -> Feature {
        Feature {
            seq_name: seq.to_string(),
            start,
            end,
            name: name.to_string(),
            strand,
        }
    }

    fn x_setup(features: Vec<Feature>) -> (Track, MultiSegmentScale, ZoomScales) {
        let track = Track::new(Axis::X, "genes", features);
        let mut scale = MultiSegmentScale::with_data(0.0, &[SeqMeta::new("chr1", 1000)]);
        scale.range((0.0, 1000.0));
        let mut zoom = ZoomScales::new();
        zoom.set_area(Rect::new(0.0, 0.0, 1000.0, 1000.0));
        (track, scale, zoom)
    }

    #[test]
    fn test_k_longest_bounds_glyph_count() {
        // 150 features with lengths 1..=150, shuffled by stride
        let features: Vec<Feature> = (0..150u64)
            .map(|i| {
                let length = (i * 7) % 150 + 1;
                feature("chr1", i * 5, i * 5 + length, &format!("g{i}"), None)
            })
            .collect();
        let (track, scale, zoom) = x_setup(features);
        let scene = build_track(&track, &scale, &zoom, (0.0, 0.0));
        assert_eq!(scene.glyphs.len(), 100);
        // only the 100 longest survive: nothing shorter than 51 bases
        for glyph in &scene.glyphs {
            let rect = glyph.rect.as_ref().unwrap();
            assert!(rect.end - rect.start >= 51.0, "{} too short", glyph.name);
        }
    }

    #[test]
    fn test_min_feature_length_filter() {
        let (mut track, scale, zoom) = x_setup(vec![
            feature("chr1", 0, 30, "short", None),
            feature("chr1", 100, 400, "long", None),
        ]);
        track.set_style(keys::MIN_FEATURE_LENGTH, StyleValue::Number(50.0));
        let scene = build_track(&track, &scale, &zoom, (0.0, 0.0));
        assert_eq!(scene.glyphs.len(), 1);
        assert_eq!(scene.glyphs[0].name, "long");
    }

    #[test]
    fn test_features_outside_zoom_are_dropped() {
        let (track, scale, mut zoom) = x_setup(vec![
            feature("chr1", 0, 100, "left", None),
            feature("chr1", 800, 900, "right", None),
        ]);
        zoom.set_zoom((0.0, 200.0), (1000.0, 0.0));
        let scene = build_track(&track, &scale, &zoom, (0.0, 0.0));
        assert_eq!(scene.glyphs.len(), 1);
        assert_eq!(scene.glyphs[0].name, "left");
    }

    #[test]
    fn test_arrow_tip_follows_strand() {
        let (track, scale, zoom) = x_setup(vec![
            feature("chr1", 100, 200, "fwd", Some(Strand::Forward)),
            feature("chr1", 300, 400, "rev", Some(Strand::Reverse)),
            feature("chr1", 500, 600, "none", None),
        ]);
        let scene = build_track(&track, &scale, &zoom, (0.0, 0.0));

        let fwd = scene.glyphs.iter().find(|g| g.name == "fwd").unwrap();
        let tip = fwd.arrow.as_ref().unwrap().points[1];
        assert_eq!(tip.0, 200.0);

        let rev = scene.glyphs.iter().find(|g| g.name == "rev").unwrap();
        let tip = rev.arrow.as_ref().unwrap().points[1];
        assert_eq!(tip.0, 300.0);

        let none = scene.glyphs.iter().find(|g| g.name == "none").unwrap();
        assert!(none.arrow.is_none());
    }

    #[test]
    fn test_triangle_spans_whole_glyph() {
        let (mut track, scale, zoom) =
            x_setup(vec![feature("chr1", 100, 200, "g", Some(Strand::Forward))]);
        track.set_style(keys::ARROW_STYLE, StyleValue::from("triangle"));
        let scene = build_track(&track, &scale, &zoom, (0.0, 0.0));
        let points = &scene.glyphs[0].arrow.as_ref().unwrap().points;
        assert_eq!(points[0].0, 100.0);
        assert_eq!(points[1].0, 200.0);
    }

    #[test]
    fn test_arrows_and_names_toggle_off_and_on() {
        let (mut track, scale, zoom) =
            x_setup(vec![feature("chr1", 100, 200, "g", Some(Strand::Forward))]);
        track.set_style(keys::SHOW_ARROWS, StyleValue::Bool(false));
        track.set_style(keys::SHOW_NAMES, StyleValue::Bool(true));
        let scene = build_track(&track, &scale, &zoom, (0.0, 0.0));
        let glyph = &scene.glyphs[0];
        assert!(glyph.arrow.is_none());
        let label = glyph.label.as_ref().unwrap();
        assert_eq!(label.text, "g");
        assert_eq!(label.at, 150.0);
    }

    #[test]
    fn test_palette_is_stable_per_sequence() {
        let (track, _, zoom) = x_setup(vec![]);
        let mut scale = MultiSegmentScale::with_data(
            0.0,
            &[SeqMeta::new("chr1", 400), SeqMeta::new("chr2", 400)],
        );
        scale.range((0.0, 1000.0));
        let mut track = track;
        track.data = vec![
            feature("chr1", 0, 100, "a", None),
            feature("chr2", 0, 100, "b", None),
            feature("chr1", 200, 300, "c", None),
        ];
        let scene = build_track(&track, &scale, &zoom, (0.0, 0.0));
        let by_name = |name: &str| {
            scene
                .glyphs
                .iter()
                .find(|g| g.name == name)
                .unwrap()
                .color
                .clone()
        };
        assert_eq!(by_name("a"), by_name("c"));
        assert_ne!(by_name("a"), by_name("b"));
    }

    #[test]
    fn test_hover_string_carries_coordinates() {
        let (track, scale, zoom) = x_setup(vec![feature("chr1", 100, 200, "gene", None)]);
        let scene = build_track(&track, &scale, &zoom, (0.0, 0.0));
        assert_eq!(scene.glyphs[0].hover, "gene (chr1:100-200)");
    }

    #[test]
    fn test_y_side_maps_along_the_y_scale() {
        let track = Track::new(
            Axis::Y,
            "genes",
            vec![feature("q1", 0, 500, "g", Some(Strand::Forward))],
        );
        let mut scale = MultiSegmentScale::with_data(0.0, &[SeqMeta::new("q1", 1000)]);
        // y ranges run bottom to top
        scale.range((1000.0, 0.0));
        let mut zoom = ZoomScales::new();
        zoom.set_area(Rect::new(0.0, 0.0, 1000.0, 1000.0));
        let scene = build_track(&track, &scale, &zoom, (90.0, 0.0));
        assert_eq!(scene.side, Axis::Y);
        assert_eq!(scene.origin, (90.0, 0.0));
        let rect = scene.glyphs[0].rect.as_ref().unwrap();
        // feature 0..500 of a 1000-base sequence occupies the lower half
        assert_eq!(rect.start, 500.0);
        assert_eq!(rect.end, 1000.0);
    }
}

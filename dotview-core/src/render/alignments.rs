//! Alignment line geometry: per tag-and-orientation batched strokes with
//! viewport culling, plus the optional endpoint dots.

use crate::loader::AlignmentStore;
use crate::scale::MultiSegmentScale;
use crate::style::{keys, StyleSet};
use crate::types::{Alignment, SeqMeta, Strand, Tag};
use crate::viewport::ZoomScales;
use log::{debug, warn};

/// One stroked line segment in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// Lines sharing one stroke color and width, drawn as a single batched path.
#[derive(Debug, Clone)]
pub struct StrokeBatch {
    pub color: String,
    pub width: f64,
    pub lines: Vec<Line>,
}

/// Endpoint dot for the "dotted ends" symbol style.
#[derive(Debug, Clone, PartialEq)]
pub struct EndDot {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: String,
}

#[derive(Debug, Clone, Default)]
pub struct AlignmentScene {
    pub batches: Vec<StrokeBatch>,
    pub dots: Vec<EndDot>,
    pub drawn: usize,
}

fn color_for<'a>(styles: &'a StyleSet, tag: Tag, strand: Strand) -> &'a str {
    match (tag, strand) {
        (Tag::Repetitive, _) => styles.text(keys::COLOR_REPETITIVE),
        (Tag::Unique, Strand::Forward) => styles.text(keys::COLOR_UNIQUE_FORWARD),
        (Tag::Unique, Strand::Reverse) => styles.text(keys::COLOR_UNIQUE_REVERSE),
    }
}

/// Maps a record's endpoints through the segment scales and the zoom; `None`
/// when either sequence name is unknown to its scale.
fn project(
    record: &Alignment,
    x_scale: &MultiSegmentScale,
    y_scale: &MultiSegmentScale,
    zoom: &ZoomScales,
) -> Option<Line> {
    Some(Line {
        x0: zoom.x().scale(x_scale.get(&record.ref_name, record.ref_start)?),
        y0: zoom.y().scale(y_scale.get(&record.query_name, record.query_start)?),
        x1: zoom.x().scale(x_scale.get(&record.ref_name, record.ref_end)?),
        y1: zoom.y().scale(y_scale.get(&record.query_name, record.query_end)?),
    })
}

/// Builds the alignment scene for the current selection and viewport.
///
/// Repetitive batches come first so unique alignments draw on top of them;
/// repetitive alignments share one color for both orientations.
pub fn build_alignments(
    store: &AlignmentStore,
    selected_queries: &[SeqMeta],
    x_scale: &MultiSegmentScale,
    y_scale: &MultiSegmentScale,
    zoom: &ZoomScales,
    styles: &StyleSet,
) -> AlignmentScene {
    let area = zoom.area();
    let show_repetitive = styles.boolean(keys::SHOW_REPETITIVE);
    let thickness = styles.number(keys::LINE_THICKNESS);
    let min_length = styles.number(keys::MIN_ALIGNMENT_LENGTH) as u64;
    let dotted_ends = styles.text(keys::ALIGNMENT_SYMBOL) == "dotted ends";

    // Both endpoints strictly outside one side of the viewport means the
    // segment cannot cross it.
    let excluded = |line: &Line| {
        (line.x0 < area.x0 && line.x1 < area.x0)
            || (line.x0 > area.x1 && line.x1 > area.x1)
            || (line.y0 < area.y0 && line.y1 < area.y0)
            || (line.y0 > area.y1 && line.y1 > area.y1)
    };

    let mut scene = AlignmentScene::default();
    for tag in [Tag::Repetitive, Tag::Unique] {
        if tag == Tag::Repetitive && !show_repetitive {
            continue;
        }
        for strand in [Strand::Forward, Strand::Reverse] {
            let mut batch = StrokeBatch {
                color: color_for(styles, tag, strand).to_string(),
                width: thickness,
                lines: Vec::new(),
            };
            for query in selected_queries {
                for record in store.alignments(&query.name, tag) {
                    if record.strand() != strand || record.ref_span() < min_length {
                        continue;
                    }
                    let Some(line) = project(record, x_scale, y_scale, zoom) else {
                        warn!(
                            "skipping alignment on unknown sequence {}/{}",
                            record.ref_name, record.query_name
                        );
                        continue;
                    };
                    if excluded(&line) {
                        continue;
                    }
                    if dotted_ends {
                        let color = color_for(styles, tag, strand).to_string();
                        scene.dots.push(EndDot {
                            x: line.x0,
                            y: line.y0,
                            radius: thickness,
                            color: color.clone(),
                        });
                        scene.dots.push(EndDot {
                            x: line.x1,
                            y: line.y1,
                            radius: thickness,
                            color,
                        });
                    }
                    batch.lines.push(line);
                }
            }
            if !batch.lines.is_empty() {
                scene.drawn += batch.lines.len();
                scene.batches.push(batch);
            }
        }
    }
    debug!("number of alignments drawn: {}", scene.drawn);
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{plot_style_schema, StyleValue};
    use crate::viewport::Rect;

    fn record(
        query: &str,
        tag: Tag,
        ref_start: u64,
        ref_end: u64,
        query_start: u64,
        query_end: u64,
    ) -> Alignment {
        Alignment {
            ref_start,
            ref_end,
            query_start,
            query_end,
            ref_name: "chr1".to_string(),
            query_name: query.to_string(),
            tag,
        }
    }

    fn setup() -> (AlignmentStore, Vec<SeqMeta>, MultiSegmentScale, MultiSegmentScale, ZoomScales)
    {
        let store = AlignmentStore::from_overview(vec![
            record("q1", Tag::Unique, 0, 400, 0, 400),
            record("q1", Tag::Unique, 400, 800, 900, 500),
            record("q1", Tag::Repetitive, 100, 200, 100, 200),
        ]);
        let queries = vec![SeqMeta::new("q1", 1000)];
        let mut x_scale = MultiSegmentScale::with_data(0.0, &[SeqMeta::new("chr1", 1000)]);
        x_scale.range((0.0, 100.0));
        let mut y_scale = MultiSegmentScale::with_data(0.0, &queries);
        y_scale.range((100.0, 0.0));
        let mut zoom = ZoomScales::new();
        zoom.set_area(Rect::new(0.0, 0.0, 100.0, 100.0));
        (store, queries, x_scale, y_scale, zoom)
    }

    #[test]
    fn test_batches_by_tag_and_orientation() {
        let (store, queries, x_scale, y_scale, zoom) = setup();
        let styles = StyleSet::from_schema(&plot_style_schema());
        let scene = build_alignments(&store, &queries, &x_scale, &y_scale, &zoom, &styles);

        // repetitive-forward, unique-forward, unique-reverse
        assert_eq!(scene.batches.len(), 3);
        assert_eq!(scene.drawn, 3);
        assert_eq!(scene.batches[0].color, "#ef8717");
        assert_eq!(scene.batches[1].color, "#0081b0");
        assert_eq!(scene.batches[2].color, "#87ba2d");
        // default symbol is dotted ends: two dots per drawn line
        assert_eq!(scene.dots.len(), 6);
    }

    #[test]
    fn test_repetitive_hidden_by_style() {
        let (store, queries, x_scale, y_scale, zoom) = setup();
        let mut styles = StyleSet::from_schema(&plot_style_schema());
        styles.set(keys::SHOW_REPETITIVE, StyleValue::Bool(false));
        let scene = build_alignments(&store, &queries, &x_scale, &y_scale, &zoom, &styles);
        assert!(scene.batches.iter().all(|b| b.color != "#ef8717"));
        assert_eq!(scene.drawn, 2);
    }

    #[test]
    fn test_minimum_length_filter() {
        let (store, queries, x_scale, y_scale, zoom) = setup();
        let mut styles = StyleSet::from_schema(&plot_style_schema());
        styles.set(keys::MIN_ALIGNMENT_LENGTH, StyleValue::Number(150.0));
        let scene = build_alignments(&store, &queries, &x_scale, &y_scale, &zoom, &styles);
        // the 100-base repetitive segment drops out
        assert_eq!(scene.drawn, 2);
    }

    #[test]
    fn test_viewport_exclusion_culls_lines() {
        let (store, queries, x_scale, y_scale, mut zoom) = setup();
        let styles = StyleSet::from_schema(&plot_style_schema());
        // zoom into the left 10% of the x axis: ref pixels 0..10 spread over
        // the full viewport, everything beyond ref pixel 10 is off-screen
        zoom.set_zoom((0.0, 10.0), (100.0, 0.0));
        let scene = build_alignments(&store, &queries, &x_scale, &y_scale, &zoom, &styles);
        let visible: usize = scene.batches.iter().map(|b| b.lines.len()).sum();
        // the 400..800 unique-reverse segment is fully right of the viewport
        assert_eq!(visible, 2);
    }

    #[test]
    fn test_line_symbol_has_no_dots() {
        let (store, queries, x_scale, y_scale, zoom) = setup();
        let mut styles = StyleSet::from_schema(&plot_style_schema());
        styles.set(keys::ALIGNMENT_SYMBOL, StyleValue::from("line"));
        let scene = build_alignments(&store, &queries, &x_scale, &y_scale, &zoom, &styles);
        assert!(scene.dots.is_empty());
    }

    #[test]
    fn test_unknown_sequence_is_skipped() {
        let store = AlignmentStore::from_overview(vec![Alignment {
            ref_name: "ghost".to_string(),
            ..record("q1", Tag::Unique, 0, 100, 0, 100)
        }]);
        let (_, queries, x_scale, y_scale, zoom) = setup();
        let styles = StyleSet::from_schema(&plot_style_schema());
        let scene = build_alignments(&store, &queries, &x_scale, &y_scale, &zoom, &styles);
        assert_eq!(scene.drawn, 0);
    }
}

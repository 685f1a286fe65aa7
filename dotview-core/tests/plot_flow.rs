//! End-to-end flow: parse an index, lazily load coordinate chunks, drive the
//! viewport and produce scenes and SVG output through the plot context.

use dotview_core::loader::memory_cost;
use dotview_core::render::grid::SnappedBoundary;
use dotview_core::{
    Axis, Dataset, DotPlot, LoadTag, MemCoordsSource, MemoryCost, PlotHost, Rect, Severity,
    SvgDocument, Tag,
};
use std::time::{Duration, Instant};

fn coords_blob() -> String {
    "!q1!unique\n\
     0,400,0,400,chr1\n\
     500,900,450,50,chr1\n\
     !q1!repetitive\n\
     100,200,100,200,chr1\n\
     !q2!unique\n\
     0,700,0,700,chr2\n"
        .to_string()
}

fn index_text(blob: &str) -> String {
    let q1_repetitive = blob.find("!q1!repetitive").unwrap() as u64;
    let q2_unique = blob.find("!q2!unique").unwrap() as u64;
    format!(
        "#ref\n\
         name,length,matching_queries\n\
         chr1,1000,q1\n\
         chr2,2000,q2\n\
         #query\n\
         name,length,unique_start,repetitive_delta,end_delta,matching_refs\n\
         q1,500,0,{q1_repetitive},{},chr1\n\
         q2,800,{q2_unique},{},0,chr2\n\
         #overview\n\
         ref_start,ref_end,query_start,query_end,ref,query,tag\n\
         0,1000,0,500,chr1,q1,unique\n\
         0,2000,0,800,chr2,q2,unique\n",
        q2_unique - q1_repetitive,
        blob.len() as u64 - q2_unique,
    )
}

fn plot() -> (DotPlot, Instant) {
    let blob = coords_blob();
    let mut plot = DotPlot::new(800.0, 600.0);
    let t0 = Instant::now();
    plot.set_coords(
        &index_text(&blob),
        Box::new(MemCoordsSource::from(blob.as_str())),
        t0,
    )
    .unwrap();
    (plot, t0)
}

#[derive(Default)]
struct RecordingHost {
    memory: Vec<MemoryCost>,
    messages: Vec<(String, Severity)>,
    boundaries: Vec<(Axis, usize)>,
    clicked: Vec<String>,
}

impl PlotHost for RecordingHost {
    fn update_memory_buttons(&mut self, cost: MemoryCost) {
        self.memory.push(cost);
    }

    fn feature_clicked(&mut self, name: &str) {
        self.clicked.push(name.to_string());
    }

    fn show_message(&mut self, text: &str, severity: Severity) {
        self.messages.push((text.to_string(), severity));
    }

    fn visible_boundaries_changed(&mut self, axis: Axis, boundaries: &[SnappedBoundary]) {
        self.boundaries.push((axis, boundaries.len()));
    }
}

#[test]
fn test_full_cycle_load_render_and_memory_accounting() {
    let (mut plot, t0) = plot();
    let mut host = RecordingHost::default();

    assert!(plot.poll_draw(t0 + Duration::from_millis(150)));
    let scene = plot.render(&mut host);

    // overview rows only, one unique-forward batch
    assert_eq!(scene.alignments.drawn, 2);
    assert_eq!(host.boundaries, vec![(Axis::X, 2), (Axis::Y, 2)]);
    let before = *host.memory.last().unwrap();
    assert!(before.unique_bytes > 0);
    assert!(before.repetitive_bytes > 0);

    // both queries are in view; loading them swaps in the real chunks
    let merged = plot.load_all_in_view(LoadTag::Both, t0).unwrap();
    assert_eq!(merged, 2);
    assert_eq!(plot.store().alignments("q1", Tag::Unique).len(), 2);
    assert_eq!(plot.store().alignments("q1", Tag::Repetitive).len(), 1);
    assert_eq!(plot.store().alignments("q2", Tag::Unique).len(), 1);

    let scene = plot.render(&mut host);
    assert_eq!(scene.alignments.drawn, 4);
    let after = *host.memory.last().unwrap();
    assert_eq!(after.unique_bytes, 0);
    assert_eq!(after.repetitive_bytes, 0);

    // loading again is a no-op
    assert_eq!(plot.load_all_in_view(LoadTag::Both, t0).unwrap(), 0);
}

#[test]
fn test_scene_serializes_with_one_path_per_batch() {
    let (mut plot, t0) = plot();
    plot.load_all_in_view(LoadTag::Both, t0).unwrap();

    let mut host = RecordingHost::default();
    let scene = plot.render(&mut host);
    assert!(!scene.alignments.batches.is_empty());

    let mut svg = SvgDocument::new(800.0, 600.0);
    svg.add_background("#ffffff");
    svg.add_scene(&scene, plot.layout(), plot.styles());
    let text = svg.to_svg_string();
    assert_eq!(text.matches("<path ").count(), scene.alignments.batches.len());
    assert!(text.contains(r#"data-seq="chr1""#));
}

#[test]
fn test_zoom_culls_alignments_in_scene() {
    let (mut plot, t0) = plot();
    plot.load_all_in_view(LoadTag::Both, t0).unwrap();
    let mut host = RecordingHost::default();
    let full = plot.render(&mut host).alignments.drawn;

    // zoom into the top-left corner of the inner area
    let inner = plot.layout().inner;
    plot.brush_ended(
        Rect::new(
            inner.left,
            inner.top,
            inner.left + inner.width / 8.0,
            inner.top + inner.height / 8.0,
        ),
        t0,
    );
    let zoomed = plot.render(&mut host).alignments.drawn;
    assert!(zoomed < full, "{zoomed} !< {full}");
}

#[test]
fn test_memory_numbers_follow_the_visible_queries() {
    let (mut plot, t0) = plot();
    plot.load_alignments("q1", LoadTag::Unique, t0).unwrap();

    let visible = plot.visible_query_names();
    assert_eq!(visible, ["q1", "q2"]);

    // q1's unique chunk is loaded; everything else still counts
    let mut host = RecordingHost::default();
    plot.render(&mut host);
    let cost = *host.memory.last().unwrap();
    let blob = coords_blob();
    let q2_unique = blob.find("!q2!unique").unwrap() as u64;
    assert_eq!(cost.unique_bytes, blob.len() as u64 - q2_unique);
    assert!(cost.repetitive_bytes > 0);
}

#[test]
fn test_annotation_dataset_attaches_as_track() {
    let (mut plot, t0) = plot();
    let mut host = RecordingHost::default();

    let dataset: Dataset = serde_json::from_str(
        r#"{
            "key": "genes",
            "data": [
                {"ref": "chr1", "ref_start": 100, "ref_end": 300, "name": "geneA", "strand": "+"},
                {"ref": "chr1", "ref_start": 400, "ref_end": 450, "name": "geneB", "strand": "-"},
                {"ref": "chrX", "ref_start": 0, "ref_end": 10, "name": "lost"}
            ]
        }"#,
    )
    .unwrap();
    plot.add_annotation_data(dataset, &mut host, t0).unwrap();

    // partial overlap: a warning, not a rejection
    assert_eq!(host.messages.len(), 1);
    assert_eq!(host.messages[0].1, Severity::Warning);
    assert_eq!(plot.tracks().len(), 1);

    let scene = plot.render(&mut host);
    assert_eq!(scene.x_tracks.len(), 1);
    assert_eq!(scene.x_tracks[0].glyphs.len(), 2);
    assert!(scene.y_tracks.is_empty());
}

#[test]
fn test_annotation_dataset_with_no_known_sequences_is_rejected() {
    let (mut plot, t0) = plot();
    let mut host = RecordingHost::default();

    let dataset: Dataset = serde_json::from_str(
        r#"{"key": "genes", "data": [{"ref": "chrX", "ref_start": 0, "ref_end": 10, "name": "g"}]}"#,
    )
    .unwrap();
    assert!(plot.add_annotation_data(dataset, &mut host, t0).is_err());
    assert_eq!(host.messages.len(), 1);
    assert_eq!(host.messages[0].1, Severity::Error);
    assert!(plot.tracks().is_empty());
}

#[test]
fn test_feature_click_notifies_host() {
    let (plot, _) = plot();
    let mut host = RecordingHost::default();
    plot.feature_clicked(&mut host, "geneA");
    assert_eq!(host.clicked, ["geneA"]);
}

#[test]
fn test_failed_load_keeps_query_loadable() {
    // byte ranges point at garbage: the chunk parse fails, the flag stays
    // unset and the memory numbers keep reporting the pending bytes
    let blob = "!q1!unique\nnot,numbers,here,at,all\n";
    let index = format!(
        "#ref\nname,length\nchr1,1000\n\
         #query\nname,length,unique_start,repetitive_delta,end_delta,matching_refs\n\
         q1,500,0,{},0,chr1\n",
        blob.len()
    );
    let mut plot = DotPlot::new(800.0, 600.0);
    let t0 = Instant::now();
    plot.set_coords(&index, Box::new(MemCoordsSource::from(blob)), t0)
        .unwrap();

    let merged = plot.load_alignments("q1", LoadTag::Unique, t0).unwrap();
    assert!(!merged);
    assert!(plot.store().alignments("q1", Tag::Unique).is_empty());

    let mut host = RecordingHost::default();
    plot.render(&mut host);
    assert_eq!(host.memory.last().unwrap().unique_bytes, blob.len() as u64);
}

#[test]
fn test_memory_cost_is_reexported_consistently() {
    // the free function and the plot notification agree
    let (mut plot, t0) = plot();
    plot.load_alignments("q2", LoadTag::Unique, t0).unwrap();
    let mut host = RecordingHost::default();
    plot.render(&mut host);
    let via_host = *host.memory.last().unwrap();

    let blob = coords_blob();
    let index = dotview_core::parse_index(&index_text(&blob)).unwrap();
    let mut query_index = dotview_core::loader::QueryIndex::from_queries(&index.queries);
    // replay the load state
    query_index.get_mut("q2").unwrap().loaded_unique = true;
    let direct = memory_cost(&query_index, ["q1", "q2"]);
    assert_eq!(via_host, direct);
}

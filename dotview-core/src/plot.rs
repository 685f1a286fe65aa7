//! The plot context: one object owning metadata, selection, alignment data,
//! scales, zoom state, styles and timing, with the event-handler surface the
//! embedding UI drives.
//!
//! All mutation is synchronous; the only asynchrony in the system is hidden
//! behind [`CoordsSource`] reads and the caller-driven draw polling. Hosts
//! receive notifications through [`PlotHost`] and never influence control
//! flow with their return values.

use crate::annotation::{resolve_dataset, AnnotationError, Dataset, Track};
use crate::index::{parse_index, IndexError, QueryInfo, RefInfo};
use crate::layout::{self, PlotLayout};
use crate::loader::{
    self, AlignmentStore, CoordsSource, LoadError, MemoryCost, QueryIndex,
};
use crate::render::alignments::build_alignments;
use crate::render::grid::{build_grid, snapped_boundaries, zoom_filter_snap, SnappedBoundary};
use crate::render::tracks::build_track;
use crate::render::PlotScene;
use crate::scale::MultiSegmentScale;
use crate::schedule::{ClickArbiter, DrawScheduler, DOUBLE_CLICK_WINDOW, DRAW_DELAY};
use crate::style::{plot_style_schema, StyleDef, StyleSet, StyleValue};
use crate::types::{Alignment, Axis, LoadTag, SeqMeta};
use crate::viewport::{Rect, ZoomScales};
use log::info;
use std::time::Instant;

/// Fraction of the summed sequence lengths inserted as padding between
/// segments on each axis.
pub const SCALE_PADDING_FRACTION: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Callback surface of the embedding UI. All methods are notifications with
/// default no-op bodies; hosts implement what they need.
pub trait PlotHost {
    /// Recoverable memory numbers behind the "load more" affordances,
    /// recomputed with every boundary pass.
    fn update_memory_buttons(&mut self, _cost: MemoryCost) {}

    /// An annotation glyph was clicked; `name` is the feature name.
    fn feature_clicked(&mut self, _name: &str) {}

    fn show_message(&mut self, _text: &str, _severity: Severity) {}

    /// The visible boundary list of one axis changed.
    fn visible_boundaries_changed(&mut self, _axis: Axis, _boundaries: &[SnappedBoundary]) {}
}

/// Host that swallows every notification.
pub struct NullHost;

impl PlotHost for NullHost {}

pub struct DotPlot {
    refs: Vec<RefInfo>,
    queries: Vec<QueryInfo>,
    selected_refs: Vec<String>,
    selected_queries: Vec<String>,
    store: AlignmentStore,
    query_index: QueryIndex,
    source: Option<Box<dyn CoordsSource>>,
    tracks: Vec<Track>,
    x_scale: MultiSegmentScale,
    y_scale: MultiSegmentScale,
    zoom: ZoomScales,
    styles: StyleSet,
    scheduler: DrawScheduler,
    clicks: ClickArbiter,
    layout: PlotLayout,
    width: f64,
    height: f64,
}

impl DotPlot {
    pub fn new(width: f64, height: f64) -> Self {
        let mut plot = Self {
            refs: Vec::new(),
            queries: Vec::new(),
            selected_refs: Vec::new(),
            selected_queries: Vec::new(),
            store: AlignmentStore::default(),
            query_index: QueryIndex::default(),
            source: None,
            tracks: Vec::new(),
            x_scale: MultiSegmentScale::new(SCALE_PADDING_FRACTION),
            y_scale: MultiSegmentScale::new(SCALE_PADDING_FRACTION),
            zoom: ZoomScales::new(),
            styles: StyleSet::from_schema(&plot_style_schema()),
            scheduler: DrawScheduler::new(DRAW_DELAY),
            clicks: ClickArbiter::new(DOUBLE_CLICK_WINDOW),
            layout: layout::compute(width, height, &[], &[]),
            width,
            height,
        };
        plot.rebuild_scales();
        plot
    }

    /// Parses the coordinate index, seeds the alignment store from its
    /// overview table and attaches the byte-range source for lazy loads.
    /// A malformed index is a hard error; nothing is replaced in that case.
    pub fn set_coords(
        &mut self,
        index_text: &str,
        source: Box<dyn CoordsSource>,
        now: Instant,
    ) -> Result<(), IndexError> {
        let index = parse_index(index_text)?;
        info!(
            "coordinate index: {} refs, {} queries, {} overview alignments",
            index.refs.len(),
            index.queries.len(),
            index.overview.len()
        );
        self.store = AlignmentStore::from_overview(index.overview);
        self.query_index = QueryIndex::from_queries(&index.queries);
        self.selected_refs = index.refs.iter().map(|r| r.name.clone()).collect();
        self.selected_queries = index.queries.iter().map(|q| q.name.clone()).collect();
        self.refs = index.refs;
        self.queries = index.queries;
        self.source = Some(source);
        self.recompute_layout();
        self.scheduler.request(now);
        Ok(())
    }

    /// Replaces the whole in-memory alignment set with pre-grouped rows,
    /// bypassing the index. Load flags are untouched.
    pub fn set_overview(&mut self, rows: Vec<Alignment>, now: Instant) {
        self.store = AlignmentStore::from_overview(rows);
        self.scheduler.request(now);
    }

    /// Lazily loads the requested chunk(s) for one query; a no-op when the
    /// tag is already loaded. Schedules a redraw after a merge.
    pub fn load_alignments(
        &mut self,
        query: &str,
        tag: LoadTag,
        now: Instant,
    ) -> Result<bool, LoadError> {
        let source = self.source.as_mut().ok_or(LoadError::NoSource)?;
        let merged = loader::load_alignments(
            source.as_mut(),
            &mut self.query_index,
            &mut self.store,
            query,
            tag,
        )?;
        if merged {
            self.scheduler.request(now);
        }
        Ok(merged)
    }

    /// Loads the requested chunk(s) for every query currently in view.
    /// Returns how many queries actually merged new data.
    pub fn load_all_in_view(&mut self, tag: LoadTag, now: Instant) -> Result<usize, LoadError> {
        let visible = self.visible_query_names();
        let mut merged = 0;
        for query in visible {
            if self.load_alignments(&query, tag, now)? {
                merged += 1;
            }
        }
        Ok(merged)
    }

    /// Restricts the x axis to `names` and pulls in only the queries matching
    /// at least one selected ref. Unknown names are ignored.
    pub fn select_refs(&mut self, names: &[&str], now: Instant) {
        self.selected_refs = self
            .refs
            .iter()
            .filter(|r| names.contains(&r.name.as_str()))
            .map(|r| r.name.clone())
            .collect();
        self.selected_queries = self
            .queries
            .iter()
            .filter(|q| {
                q.matching_refs
                    .iter()
                    .any(|r| self.selected_refs.contains(r))
            })
            .map(|q| q.name.clone())
            .collect();
        self.selection_changed(now);
    }

    /// Mirror image of [`select_refs`](Self::select_refs).
    pub fn select_queries(&mut self, names: &[&str], now: Instant) {
        self.selected_queries = self
            .queries
            .iter()
            .filter(|q| names.contains(&q.name.as_str()))
            .map(|q| q.name.clone())
            .collect();
        self.selected_refs = self
            .refs
            .iter()
            .filter(|r| {
                r.matching_queries
                    .iter()
                    .any(|q| self.selected_queries.contains(q))
            })
            .map(|r| r.name.clone())
            .collect();
        self.selection_changed(now);
    }

    /// Restores the full ref and query lists.
    pub fn reset_selections(&mut self, now: Instant) {
        self.selected_refs = self.refs.iter().map(|r| r.name.clone()).collect();
        self.selected_queries = self.queries.iter().map(|q| q.name.clone()).collect();
        self.selection_changed(now);
    }

    fn selection_changed(&mut self, now: Instant) {
        // any selection change rebuilds the scales, which also resets zoom
        self.rebuild_scales();
        self.scheduler.request(now);
    }

    /// Validates and attaches an annotation dataset as a new track on the
    /// axis its coordinates imply. Rejection is wholesale; partial overlap
    /// keeps the contained features and surfaces a warning.
    pub fn add_annotation_data(
        &mut self,
        dataset: Dataset,
        host: &mut dyn PlotHost,
        now: Instant,
    ) -> Result<(), AnnotationError> {
        let refs: Vec<SeqMeta> = self
            .refs
            .iter()
            .map(|r| SeqMeta::new(r.name.clone(), r.length))
            .collect();
        let queries: Vec<SeqMeta> = self
            .queries
            .iter()
            .map(|q| SeqMeta::new(q.name.clone(), q.length))
            .collect();
        match resolve_dataset(&dataset, &refs, &queries) {
            Ok((side, features)) => {
                if features.len() < dataset.data.len() {
                    host.show_message(
                        &format!(
                            "dataset '{}': only {} of {} annotations lie on the loaded sequences",
                            dataset.key,
                            features.len(),
                            dataset.data.len()
                        ),
                        Severity::Warning,
                    );
                }
                self.tracks.push(Track::new(side, dataset.key, features));
                self.recompute_layout();
                self.scheduler.request(now);
                Ok(())
            }
            Err(err) => {
                host.show_message(&err.to_string(), Severity::Error);
                Err(err)
            }
        }
    }

    /// Click on an axis name label: select just that sequence on its axis.
    pub fn axis_label_clicked(&mut self, axis: Axis, name: &str, now: Instant) {
        match axis {
            Axis::X => self.select_refs(&[name], now),
            Axis::Y => self.select_queries(&[name], now),
        }
    }

    /// Click on an annotation glyph: pure notification to the host.
    pub fn feature_clicked(&self, host: &mut dyn PlotHost, name: &str) {
        host.feature_clicked(name);
    }

    /// End of a brush gesture. A proper rectangle zooms in; a degenerate one
    /// is a click, which arms the double-click window. A double-click zooms
    /// out when zoomed and resets the ref/query selection otherwise.
    pub fn brush_ended(&mut self, selection: Rect, now: Instant) {
        if selection.is_degenerate() {
            self.empty_selection(now);
            return;
        }
        let (x_domain, y_domain) = self.zoom.domains_from_selection(selection);
        self.zoom.set_zoom(x_domain, y_domain);
        self.scheduler.request(now);
    }

    fn empty_selection(&mut self, now: Instant) {
        if self.clicks.click(now) {
            self.double_click(now);
        }
    }

    /// A resolved double-click: zoom out when zoomed, otherwise reset the
    /// ref/query selection. Hosts with native double-click events call this
    /// directly; brush gestures reach it through the click arbiter.
    pub fn double_click(&mut self, now: Instant) {
        if self.zoom.is_zoomed() {
            self.zoom.zoom_out();
            self.scheduler.request(now);
        } else {
            self.reset_selections(now);
        }
    }

    pub fn zoom_out(&mut self, now: Instant) {
        self.zoom.zoom_out();
        self.scheduler.request(now);
    }

    pub fn reset_zoom(&mut self, now: Instant) {
        self.zoom.reset();
        self.scheduler.request(now);
    }

    pub fn style_schema(&self) -> Vec<StyleDef> {
        plot_style_schema()
    }

    pub fn styles(&self) -> &StyleSet {
        &self.styles
    }

    /// Writes one plot style value and unconditionally schedules a redraw.
    pub fn set_style(&mut self, name: &str, value: StyleValue, now: Instant) {
        self.styles.set(name, value);
        self.scheduler.request(now);
    }

    /// Writes one style value on the track with the given key. Returns false
    /// when no such track exists.
    pub fn set_track_style(
        &mut self,
        key: &str,
        name: &str,
        value: StyleValue,
        now: Instant,
    ) -> bool {
        let Some(track) = self.tracks.iter_mut().find(|t| t.key == key) else {
            return false;
        };
        track.set_style(name, value);
        self.scheduler.request(now);
        true
    }

    /// Resizes the plot surface, recomputing layout and scales.
    pub fn resize(&mut self, width: f64, height: f64, now: Instant) {
        self.width = width;
        self.height = height;
        self.recompute_layout();
        self.scheduler.request(now);
    }

    pub fn request_draw(&mut self, now: Instant) {
        self.scheduler.request(now);
    }

    /// True exactly once per request burst, when the coalescing delay has
    /// expired; the caller then runs [`render`](Self::render).
    pub fn poll_draw(&mut self, now: Instant) -> bool {
        self.scheduler.poll(now)
    }

    /// Builds the scene for the current state and pushes the boundary and
    /// memory notifications to the host.
    pub fn render(&self, host: &mut dyn PlotHost) -> PlotScene {
        let (x_snapped, y_snapped) = snapped_boundaries(
            &self.zoom,
            &self.x_scale.boundaries(),
            &self.y_scale.boundaries(),
        );
        host.visible_boundaries_changed(Axis::X, &x_snapped);
        host.visible_boundaries_changed(Axis::Y, &y_snapped);

        let visible: Vec<&str> = y_snapped.iter().map(|b| b.name.as_str()).collect();
        host.update_memory_buttons(loader::memory_cost(&self.query_index, visible));

        let grid = build_grid(x_snapped, y_snapped, &self.styles);
        let alignments = build_alignments(
            &self.store,
            &self.query_metas(&self.selected_queries),
            &self.x_scale,
            &self.y_scale,
            &self.zoom,
            &self.styles,
        );

        let mut x_tracks = Vec::new();
        let mut y_tracks = Vec::new();
        let mut x_index = 0;
        let mut y_index = 0;
        for track in &self.tracks {
            match track.side {
                Axis::X => {
                    let origin = (
                        self.layout.x_tracks_origin.0,
                        self.layout.x_tracks_origin.1 + self.layout.x_track_offsets[x_index],
                    );
                    x_tracks.push(build_track(track, &self.x_scale, &self.zoom, origin));
                    x_index += 1;
                }
                Axis::Y => {
                    let origin = (
                        self.layout.y_tracks_origin.0 + self.layout.y_track_offsets[y_index],
                        self.layout.y_tracks_origin.1,
                    );
                    y_tracks.push(build_track(track, &self.y_scale, &self.zoom, origin));
                    y_index += 1;
                }
            }
        }

        PlotScene {
            grid,
            alignments,
            x_tracks,
            y_tracks,
        }
    }

    pub fn layout(&self) -> &PlotLayout {
        &self.layout
    }

    pub fn zoom(&self) -> &ZoomScales {
        &self.zoom
    }

    pub fn store(&self) -> &AlignmentStore {
        &self.store
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn selected_refs(&self) -> &[String] {
        &self.selected_refs
    }

    pub fn selected_queries(&self) -> &[String] {
        &self.selected_queries
    }

    /// Queries whose boundary intersects the current viewport.
    pub fn visible_query_names(&self) -> Vec<String> {
        zoom_filter_snap(
            self.zoom.area(),
            self.zoom.y(),
            Axis::Y,
            &self.y_scale.boundaries(),
        )
        .into_iter()
        .map(|b| b.name)
        .collect()
    }

    fn ref_metas(&self, names: &[String]) -> Vec<SeqMeta> {
        self.refs
            .iter()
            .filter(|r| names.contains(&r.name))
            .map(|r| SeqMeta::new(r.name.clone(), r.length))
            .collect()
    }

    fn query_metas(&self, names: &[String]) -> Vec<SeqMeta> {
        self.queries
            .iter()
            .filter(|q| names.contains(&q.name))
            .map(|q| SeqMeta::new(q.name.clone(), q.length))
            .collect()
    }

    /// Recomputes the band layout from the current track set, then rebuilds
    /// the scales inside the new inner area.
    fn recompute_layout(&mut self) {
        let x_heights: Vec<f64> = self
            .tracks
            .iter()
            .filter(|t| t.side == Axis::X)
            .map(Track::thickness)
            .collect();
        let y_widths: Vec<f64> = self
            .tracks
            .iter()
            .filter(|t| t.side == Axis::Y)
            .map(Track::thickness)
            .collect();
        self.layout = layout::compute(self.width, self.height, &x_heights, &y_widths);
        self.rebuild_scales();
    }

    /// Rebuilds both multi-segment scales over the selected subsets and
    /// resets the zoom to the new full extent.
    fn rebuild_scales(&mut self) {
        self.x_scale.set_data(&self.ref_metas(&self.selected_refs));
        self.y_scale
            .set_data(&self.query_metas(&self.selected_queries));
        let inner = self.layout.inner;
        self.x_scale.range((inner.left, inner.left + inner.width));
        // query coordinate 0 sits at the bottom of the plot
        self.y_scale.range((inner.top + inner.height, inner.top));
        self.zoom.set_area(Rect::new(
            inner.left,
            inner.top,
            inner.left + inner.width,
            inner.top + inner.height,
        ));
    }
}

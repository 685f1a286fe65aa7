//! SVG backend: a thin writer turning scenes into a standalone document.
//!
//! All geometry decisions live in the scene builders; this module only
//! serializes what they produced. Elements accumulate as strings and the
//! document is assembled on demand.

use crate::layout::PlotLayout;
use crate::render::alignments::AlignmentScene;
use crate::render::grid::GridScene;
use crate::render::tracks::TrackScene;
use crate::render::PlotScene;
use crate::style::{keys, StyleSet};
use crate::types::Axis;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

const FONT_FAMILY: &str = "sans-serif";
const GRID_COLOR: &str = "#d4d4d4";
const BORDER_COLOR: &str = "#333333";

pub struct SvgDocument {
    width: f64,
    height: f64,
    elements: Vec<String>,
}

impl SvgDocument {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    pub fn add_background(&mut self, color: &str) {
        self.elements.push(format!(
            r#"<rect width="{}" height="{}" fill="{}"/>"#,
            self.width, self.height, color
        ));
    }

    /// Adds grid lines, axis name labels and base-pair sub-labels for both
    /// axes. Axis labels carry their sequence name as a `data-seq` attribute,
    /// the click target of the select-this-sequence gesture.
    pub fn add_grid(&mut self, grid: &GridScene, layout: &PlotLayout, styles: &StyleSet) {
        let inner = layout.inner;
        let bottom = inner.top + inner.height;
        let right = inner.left + inner.width;
        let bp_size = styles.number(keys::FONT_SIZE_BP);

        for line in grid.x.lines.iter().filter(|l| l.visible) {
            self.elements.push(format!(
                r#"<line x1="{at}" y1="{}" x2="{at}" y2="{bottom}" stroke="{GRID_COLOR}"/>"#,
                inner.top,
                at = line.at,
            ));
        }
        for line in grid.y.lines.iter().filter(|l| l.visible) {
            self.elements.push(format!(
                r#"<line x1="{}" y1="{at}" x2="{right}" y2="{at}" stroke="{GRID_COLOR}"/>"#,
                inner.left,
                at = line.at,
            ));
        }

        // name labels sit below / left of the annotation bands
        let x_font = styles.number(keys::FONT_SIZE_X_LABELS);
        let label_y = layout.outer.top + layout.outer.height + x_font + 14.0;
        for label in &grid.x.labels {
            if styles.boolean(keys::ROTATE_X_LABELS) {
                self.elements.push(format!(
                    r#"<text x="{mid}" y="{label_y}" font-family="{FONT_FAMILY}" font-size="{x_font}px" text-anchor="end" data-seq="{seq}" transform="rotate(-90,{mid},{label_y})">{text}</text>"#,
                    mid = label.mid,
                    seq = escape(&label.seq_name),
                    text = escape(&label.text),
                ));
            } else {
                self.elements.push(format!(
                    r#"<text x="{mid}" y="{label_y}" font-family="{FONT_FAMILY}" font-size="{x_font}px" text-anchor="middle" data-seq="{seq}">{text}</text>"#,
                    mid = label.mid,
                    seq = escape(&label.seq_name),
                    text = escape(&label.text),
                ));
            }
        }
        let y_font = styles.number(keys::FONT_SIZE_Y_LABELS);
        for label in &grid.y.labels {
            self.elements.push(format!(
                r#"<text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="{y_font}px" text-anchor="end" data-seq="{}">{}</text>"#,
                layout.outer.left - 20.0,
                label.mid + y_font / 3.0,
                escape(&label.seq_name),
                escape(&label.text),
            ));
        }

        let bp_y = layout.outer.top + layout.outer.height + bp_size;
        if grid.x.show_bp {
            for bp in grid.x.bp_labels.iter().filter(|b| b.visible) {
                self.elements.push(format!(
                    r#"<text x="{}" y="{bp_y}" font-family="{FONT_FAMILY}" font-size="{bp_size}px" text-anchor="start">{}</text>"#,
                    bp.start_at,
                    escape(&bp.start_text),
                ));
                self.elements.push(format!(
                    r#"<text x="{}" y="{bp_y}" font-family="{FONT_FAMILY}" font-size="{bp_size}px" text-anchor="end">{}</text>"#,
                    bp.end_at,
                    escape(&bp.end_text),
                ));
            }
        }
        if grid.y.show_bp {
            for bp in grid.y.bp_labels.iter().filter(|b| b.visible) {
                self.elements.push(format!(
                    r#"<text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="{bp_size}px" text-anchor="end">{}</text>"#,
                    layout.outer.left - 4.0,
                    bp.start_at,
                    escape(&bp.start_text),
                ));
                self.elements.push(format!(
                    r#"<text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="{bp_size}px" text-anchor="end">{}</text>"#,
                    layout.outer.left - 4.0,
                    bp.end_at,
                    escape(&bp.end_text),
                ));
            }
        }
    }

    /// Adds the alignment batches and endpoint dots, clipped to the inner
    /// plotting area. Each batch becomes one path element.
    pub fn add_alignments(&mut self, scene: &AlignmentScene, layout: &PlotLayout) {
        let inner = layout.inner;
        self.elements.push(format!(
            r#"<clipPath id="plot-area"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath>"#,
            inner.left, inner.top, inner.width, inner.height
        ));
        self.elements
            .push(r##"<g clip-path="url(#plot-area)">"##.to_string());
        for batch in &scene.batches {
            let mut d = String::new();
            for line in &batch.lines {
                d.push_str(&format!(
                    "M {} {} L {} {} ",
                    line.x0, line.y0, line.x1, line.y1
                ));
            }
            self.elements.push(format!(
                r#"<path d="{}" stroke="{}" stroke-width="{}" stroke-linecap="round" fill="none"/>"#,
                d.trim_end(),
                batch.color,
                batch.width
            ));
        }
        for dot in &scene.dots {
            self.elements.push(format!(
                r#"<circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
                dot.x, dot.y, dot.radius, dot.color
            ));
        }
        self.elements.push("</g>".to_string());
    }

    /// Adds one annotation strip. X strips translate into place; y strips
    /// rotate 90 degrees and mirror so the along-axis coordinate lands on the
    /// plot's y axis.
    pub fn add_track(&mut self, scene: &TrackScene) {
        let transform = match scene.side {
            Axis::X => format!("translate(0,{})", scene.origin.1),
            Axis::Y => format!("translate({},0) rotate(90) scale(1,-1)", scene.origin.0),
        };
        self.elements
            .push(format!(r#"<g transform="{transform}">"#));
        for glyph in &scene.glyphs {
            self.elements
                .push(format!(r#"<g data-name="{}">"#, escape(&glyph.name)));
            if let Some(rect) = &glyph.rect {
                self.elements.push(format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" fill-opacity="{}"><title>{}</title></rect>"#,
                    rect.start,
                    rect.top,
                    rect.end - rect.start,
                    rect.height,
                    glyph.color,
                    rect.opacity,
                    escape(&glyph.hover),
                ));
            }
            if let Some(arrow) = &glyph.arrow {
                let points: Vec<String> = arrow
                    .points
                    .iter()
                    .map(|(x, y)| format!("{x},{y}"))
                    .collect();
                self.elements.push(format!(
                    r#"<polygon points="{}" fill="{}"><title>{}</title></polygon>"#,
                    points.join(" "),
                    glyph.color,
                    escape(&glyph.hover),
                ));
            }
            if let Some(label) = &glyph.label {
                self.elements.push(format!(
                    r#"<text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="{}px" text-anchor="middle">{}</text>"#,
                    label.at,
                    scene.thickness / 2.0 + label.font_size / 3.0,
                    label.font_size,
                    escape(&label.text),
                ));
            }
            self.elements.push("</g>".to_string());
        }
        self.elements.push("</g>".to_string());
    }

    /// Outlines the inner plotting area.
    pub fn add_border(&mut self, layout: &PlotLayout) {
        let inner = layout.inner;
        self.elements.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{BORDER_COLOR}"/>"#,
            inner.left, inner.top, inner.width, inner.height
        ));
    }

    pub fn add_axis_titles(&mut self, grid: &GridScene, layout: &PlotLayout) {
        let inner = layout.inner;
        if !grid.x_title.is_empty() {
            self.elements.push(format!(
                r#"<text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="14px" text-anchor="middle" font-weight="bold">{}</text>"#,
                inner.left + inner.width / 2.0,
                self.height - 8.0,
                escape(&grid.x_title),
            ));
        }
        if !grid.y_title.is_empty() {
            let mid = inner.top + inner.height / 2.0;
            self.elements.push(format!(
                r#"<text x="{}" y="14" font-family="{FONT_FAMILY}" font-size="14px" text-anchor="middle" font-weight="bold" transform="rotate(-90)">{}</text>"#,
                -mid,
                escape(&grid.y_title),
            ));
        }
    }

    /// Serializes one whole render pass in draw order: grid beneath,
    /// alignments, tracks, border and titles on top.
    pub fn add_scene(&mut self, scene: &PlotScene, layout: &PlotLayout, styles: &StyleSet) {
        self.add_grid(&scene.grid, layout, styles);
        self.add_alignments(&scene.alignments, layout);
        for track in scene.x_tracks.iter().chain(&scene.y_tracks) {
            self.add_track(track);
        }
        self.add_border(layout);
        self.add_axis_titles(&scene.grid, layout);
    }

    pub fn to_svg_string(&self) -> String {
        let mut out = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        out.push('\n');
        for element in &self.elements {
            out.push_str(element);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        out
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.to_svg_string().as_bytes())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

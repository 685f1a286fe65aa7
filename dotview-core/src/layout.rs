//! Static plot layout: fixed outer paddings plus the annotation-track bands
//! stacked along each axis. Recomputed when the plot size or the track set
//! changes, never during zooming.

pub const PADDING_LEFT: f64 = 120.0;
pub const PADDING_BOTTOM: f64 = 100.0;
pub const PADDING_TOP: f64 = 10.0;
pub const PADDING_RIGHT: f64 = 10.0;

/// A positioned rectangle within the whole plot surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Band {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotLayout {
    pub whole_width: f64,
    pub whole_height: f64,
    /// Inner plotting area (the canvas the alignments draw into).
    pub inner: Band,
    /// Inner area plus both annotation bands.
    pub outer: Band,
    /// Top-left corner of the x-axis annotation band (below the inner area).
    pub x_tracks_origin: (f64, f64),
    /// Top-left corner of the y-axis annotation band (left of the inner area).
    pub y_tracks_origin: (f64, f64),
    /// Stacking offset of each x track within its band.
    pub x_track_offsets: Vec<f64>,
    /// Stacking offset of each y track within its band.
    pub y_track_offsets: Vec<f64>,
}

/// Computes the layout for a plot of `width` x `height` pixels carrying the
/// given track thicknesses.
pub fn compute(
    width: f64,
    height: f64,
    x_track_heights: &[f64],
    y_track_widths: &[f64],
) -> PlotLayout {
    let mut x_track_offsets = Vec::with_capacity(x_track_heights.len());
    let mut thickness_x = 0.0;
    for &h in x_track_heights {
        x_track_offsets.push(thickness_x);
        thickness_x += h;
    }

    let mut y_track_offsets = Vec::with_capacity(y_track_widths.len());
    let mut thickness_y = 0.0;
    for &w in y_track_widths {
        y_track_offsets.push(thickness_y);
        thickness_y += w;
    }

    let inner = Band {
        left: PADDING_LEFT + thickness_y,
        top: PADDING_TOP,
        width: width - thickness_y - PADDING_LEFT - PADDING_RIGHT,
        height: height - thickness_x - PADDING_BOTTOM - PADDING_TOP,
    };

    PlotLayout {
        whole_width: width,
        whole_height: height,
        inner,
        outer: Band {
            left: PADDING_LEFT,
            top: PADDING_TOP,
            width: inner.width + thickness_y,
            height: inner.height + thickness_x,
        },
        x_tracks_origin: (inner.left, inner.top + inner.height),
        y_tracks_origin: (inner.left - thickness_y, inner.top),
        x_track_offsets,
        y_track_offsets,
    }
}

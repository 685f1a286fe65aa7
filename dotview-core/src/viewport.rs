//! Viewport state: pixel-space zoom scales over the inner plotting area and
//! the zoom history stack.

use crate::scale::LinearScale;

/// Axis-aligned rectangle in pixel space; `(x0, y0)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// A zero-width or zero-height rectangle; such a brush selection is a
    /// click, not a zoom.
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }
}

/// Pixel-to-pixel zoom scales plus the zoom stack.
///
/// The x scale's domain is the visible x window (ascending); the y scale's
/// domain is the visible y window bottom-to-top, matching a flipped y pixel
/// range. The plot is zoomed exactly when the stack is non-empty.
#[derive(Debug, Clone)]
pub struct ZoomScales {
    x: LinearScale,
    y: LinearScale,
    area: Rect,
    stack: Vec<Rect>,
}

impl Default for ZoomScales {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoomScales {
    pub fn new() -> Self {
        Self {
            x: LinearScale::new(),
            y: LinearScale::new(),
            area: Rect::new(0.0, 0.0, 1.0, 1.0),
            stack: Vec::new(),
        }
    }

    /// Resets both scales to the identity over a new inner area and clears
    /// the history.
    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
        self.x.set_domain((area.x0, area.x1));
        self.x.set_range((area.x0, area.x1));
        self.y.set_domain((area.y1, area.y0));
        self.y.set_range((area.y1, area.y0));
        self.stack.clear();
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn x(&self) -> &LinearScale {
        &self.x
    }

    pub fn y(&self) -> &LinearScale {
        &self.y
    }

    pub fn is_zoomed(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Currently visible window as a rectangle.
    pub fn visible(&self) -> Rect {
        let (x0, x1) = self.x.domain();
        let (y1, y0) = self.y.domain();
        Rect::new(x0, y0, x1, y1)
    }

    fn apply(&mut self, rect: Rect) {
        self.x.set_domain((rect.x0, rect.x1));
        self.y.set_domain((rect.y1, rect.y0));
    }

    /// Pushes the current window onto the stack and applies the new domains.
    pub fn set_zoom(&mut self, x_domain: (f64, f64), y_domain: (f64, f64)) {
        let current = self.visible();
        self.stack.push(current);
        self.apply(Rect::new(x_domain.0, y_domain.1, x_domain.1, y_domain.0));
    }

    /// Restores the previous window, or the full area when the history is
    /// empty.
    pub fn zoom_out(&mut self) {
        let rect = self.stack.pop().unwrap_or(self.area);
        self.apply(rect);
    }

    /// Clears the history and restores the full area.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.zoom_out();
    }

    /// Converts a brush selection in screen pixels to (x, y) zoom domains via
    /// the inverse of the current scales.
    pub fn domains_from_selection(&self, selection: Rect) -> ((f64, f64), (f64, f64)) {
        let x_domain = (self.x.invert(selection.x0), self.x.invert(selection.x1));
        let y_domain = (self.y.invert(selection.y1), self.y.invert(selection.y0));
        (x_domain, y_domain)
    }
}

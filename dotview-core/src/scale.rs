//! Coordinate scales: a clamped linear map and the multi-segment axis scale
//! that concatenates every sequence of a genome onto one continuous pixel
//! axis.

use crate::types::{Position, SeqMeta};
use std::collections::HashMap;

/// Linear map between a numeric domain and range, optionally clamped to the
/// range. Descending domains and ranges are allowed; `invert` is the exact
/// inverse map.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
    clamp: bool,
}

impl Default for LinearScale {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearScale {
    pub fn new() -> Self {
        Self {
            domain: (0.0, 1.0),
            range: (0.0, 1.0),
            clamp: false,
        }
    }

    pub fn clamped() -> Self {
        Self {
            clamp: true,
            ..Self::new()
        }
    }

    pub fn set_domain(&mut self, domain: (f64, f64)) {
        self.domain = domain;
    }

    pub fn set_range(&mut self, range: (f64, f64)) {
        self.range = range;
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        let mut t = (value - d0) / (d1 - d0);
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        r0 + t * (r1 - r0)
    }

    pub fn invert(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return d0;
        }
        let mut t = (value - r0) / (r1 - r0);
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        d0 + t * (d1 - d0)
    }
}

/// Pixel-space extent of one sequence on the concatenated axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub name: String,
    pub start: f64,
    pub end: f64,
    pub length: Position,
}

/// Maps `(sequence name, position)` pairs onto a single continuous pixel axis
/// built by concatenating all sequence lengths plus inter-segment padding.
///
/// Padding is `padding_fraction * sum(lengths)` and is added after every
/// segment, including the last, so the total domain length is
/// `sum(lengths) + count * padding`.
#[derive(Debug, Clone)]
pub struct MultiSegmentScale {
    padding_fraction: f64,
    padding: f64,
    total: f64,
    order: Vec<String>,
    offsets: HashMap<String, f64>,
    sizes: HashMap<String, Position>,
    pixel: LinearScale,
}

impl MultiSegmentScale {
    pub fn new(padding_fraction: f64) -> Self {
        Self {
            padding_fraction,
            padding: 0.0,
            total: 0.0,
            order: Vec::new(),
            offsets: HashMap::new(),
            sizes: HashMap::new(),
            pixel: LinearScale::clamped(),
        }
    }

    pub fn with_data(padding_fraction: f64, data: &[SeqMeta]) -> Self {
        let mut scale = Self::new(padding_fraction);
        scale.set_data(data);
        scale
    }

    /// Rebuilds offset and size maps from an ordered sequence list. Duplicate
    /// names keep their first occurrence.
    pub fn set_data(&mut self, data: &[SeqMeta]) {
        let sum: f64 = data.iter().map(|s| s.length as f64).sum();
        self.padding = self.padding_fraction * sum;
        self.total = 0.0;
        self.order.clear();
        self.offsets.clear();
        self.sizes.clear();

        for seq in data {
            if self.sizes.contains_key(&seq.name) {
                continue;
            }
            self.order.push(seq.name.clone());
            self.offsets.insert(seq.name.clone(), self.total);
            self.sizes.insert(seq.name.clone(), seq.length);
            self.total += seq.length as f64 + self.padding;
        }

        self.pixel.set_domain((0.0, self.total));
    }

    /// Sets the pixel output range. Outputs are clamped to this range.
    pub fn range(&mut self, range: (f64, f64)) {
        self.pixel.set_range(range);
    }

    /// Pixel position of `position` within `name`, or `None` when the name is
    /// unknown or the position exceeds the sequence length.
    pub fn get(&self, name: &str, position: Position) -> Option<f64> {
        let offset = *self.offsets.get(name)?;
        if position > self.sizes[name] {
            return None;
        }
        Some(self.pixel.scale(offset + position as f64))
    }

    /// True iff `name` is known and `0 <= position <= length(name)`.
    pub fn contains(&self, name: &str, position: Position) -> bool {
        match self.sizes.get(name) {
            Some(&size) => position <= size,
            None => false,
        }
    }

    /// One boundary per sequence, in insertion order.
    pub fn boundaries(&self) -> Vec<Boundary> {
        self.order
            .iter()
            .map(|name| {
                let offset = self.offsets[name];
                let size = self.sizes[name];
                Boundary {
                    name: name.clone(),
                    start: self.pixel.scale(offset),
                    end: self.pixel.scale(offset + size as f64),
                    length: size,
                }
            })
            .collect()
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

//! Style schemas and the flat style-value store.
//!
//! A schema is an ordered list of named entries with a type and a default;
//! the current values live in a flat map keyed by entry name. Setters do no
//! validation beyond the value type — callers coerce UI input first — and
//! every mutation goes through one setter so a redraw can be scheduled
//! unconditionally.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    Number,
    Text,
    Bool,
    Range,
    Color,
    Selection,
    ColorScale,
    Section,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl StyleValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StyleValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Number(n)
    }
}

impl From<bool> for StyleValue {
    fn from(b: bool) -> Self {
        StyleValue::Bool(b)
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Text(s.to_string())
    }
}

/// One schema entry. Sections carry no value; selections carry their option
/// list; ranges carry min/max/step.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDef {
    pub name: &'static str,
    pub ty: StyleType,
    pub default: Option<StyleValue>,
    pub options: &'static [&'static str],
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl StyleDef {
    fn base(name: &'static str, ty: StyleType, default: Option<StyleValue>) -> Self {
        Self {
            name,
            ty,
            default,
            options: &[],
            min: 0.0,
            max: 0.0,
            step: 0.0,
        }
    }

    pub fn section(name: &'static str) -> Self {
        Self::base(name, StyleType::Section, None)
    }

    pub fn number(name: &'static str, default: f64) -> Self {
        Self::base(name, StyleType::Number, Some(StyleValue::Number(default)))
    }

    pub fn boolean(name: &'static str, default: bool) -> Self {
        Self::base(name, StyleType::Bool, Some(StyleValue::Bool(default)))
    }

    pub fn text(name: &'static str, default: &str) -> Self {
        Self::base(name, StyleType::Text, Some(StyleValue::from(default)))
    }

    pub fn color(name: &'static str, default: &str) -> Self {
        Self::base(name, StyleType::Color, Some(StyleValue::from(default)))
    }

    pub fn selection(
        name: &'static str,
        default: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            options,
            ..Self::base(name, StyleType::Selection, Some(StyleValue::from(default)))
        }
    }

    pub fn range(name: &'static str, default: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            min,
            max,
            step,
            ..Self::base(name, StyleType::Range, Some(StyleValue::Number(default)))
        }
    }
}

/// Current style values, keyed by schema entry name.
#[derive(Debug, Clone, Default)]
pub struct StyleSet {
    values: HashMap<String, StyleValue>,
}

impl StyleSet {
    pub fn from_schema(schema: &[StyleDef]) -> Self {
        let values = schema
            .iter()
            .filter_map(|def| Some((def.name.to_string(), def.default.clone()?)))
            .collect();
        Self { values }
    }

    pub fn set(&mut self, name: &str, value: StyleValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.values.get(name)
    }

    pub fn number(&self, name: &str) -> f64 {
        self.get(name).and_then(StyleValue::as_f64).unwrap_or(0.0)
    }

    pub fn boolean(&self, name: &str) -> bool {
        self.get(name).and_then(StyleValue::as_bool).unwrap_or(false)
    }

    pub fn text(&self, name: &str) -> &str {
        self.get(name).and_then(StyleValue::as_str).unwrap_or("")
    }
}

/// Schema entry names, shared between the schemas and the scene builders.
pub mod keys {
    pub const X_AXIS_TITLE: &str = "x-axis title";
    pub const Y_AXIS_TITLE: &str = "y-axis title";
    pub const SHOW_REPETITIVE: &str = "show repetitive alignments";
    pub const MIN_ALIGNMENT_LENGTH: &str = "minimum alignment length";
    pub const ALIGNMENT_SYMBOL: &str = "alignment symbol";
    pub const LINE_THICKNESS: &str = "alignment line thickness";
    pub const COLOR_UNIQUE_FORWARD: &str = "color of unique forward alignments";
    pub const COLOR_UNIQUE_REVERSE: &str = "color of unique reverse alignments";
    pub const COLOR_REPETITIVE: &str = "color of repetitive alignments";
    pub const ROTATE_X_LABELS: &str = "rotate x-axis labels";
    pub const FONT_SIZE_X_LABELS: &str = "font size (X-axis labels)";
    pub const FONT_SIZE_Y_LABELS: &str = "font size (Y-axis labels)";
    pub const GRID_REF: &str = "show grid lines (reference)";
    pub const GRID_QUERY: &str = "show grid lines (query)";
    pub const BP_MARKERS_REF: &str = "show basepair coordinates markers for reference";
    pub const BP_MARKERS_QUERY: &str = "show basepair coordinates markers for query";
    pub const FONT_SIZE_BP: &str = "font size (basepair coordinates)";

    pub const MIN_FEATURE_LENGTH: &str = "minimum feature length (bp)";
    pub const K_LONGEST: &str = "k longest annotations";
    pub const SHOW_ARROWS: &str = "show arrows based on strands";
    pub const ARROW_STYLE: &str = "arrow style";
    pub const SHOW_RECTANGLES: &str = "show rectangles";
    pub const RECTANGLE_OPACITY: &str = "rectangle opacity";
    pub const SHOW_NAMES: &str = "show names";
    pub const TRACK_FONT_SIZE: &str = "font size";
}

/// Style schema of the plot itself.
pub fn plot_style_schema() -> Vec<StyleDef> {
    use keys::*;
    vec![
        StyleDef::section("Fundamentals"),
        StyleDef::text(X_AXIS_TITLE, ""),
        StyleDef::text(Y_AXIS_TITLE, ""),
        StyleDef::section("Alignments"),
        StyleDef::boolean(SHOW_REPETITIVE, true),
        StyleDef::number(MIN_ALIGNMENT_LENGTH, 0.0),
        StyleDef::selection(ALIGNMENT_SYMBOL, "dotted ends", &["line", "dotted ends"]),
        StyleDef::number(LINE_THICKNESS, 2.0),
        StyleDef::color(COLOR_UNIQUE_FORWARD, "#0081b0"),
        StyleDef::color(COLOR_UNIQUE_REVERSE, "#87ba2d"),
        StyleDef::color(COLOR_REPETITIVE, "#ef8717"),
        StyleDef::section("Sequence labels"),
        StyleDef::boolean(ROTATE_X_LABELS, true),
        StyleDef::number(FONT_SIZE_X_LABELS, 10.0),
        StyleDef::number(FONT_SIZE_Y_LABELS, 10.0),
        StyleDef::section("Grid lines"),
        StyleDef::selection(GRID_REF, "always", &["always", "zoom", "never"]),
        StyleDef::selection(GRID_QUERY, "never", &["always", "zoom", "never"]),
        StyleDef::boolean(BP_MARKERS_REF, true),
        StyleDef::boolean(BP_MARKERS_QUERY, true),
        StyleDef::number(FONT_SIZE_BP, 10.0),
    ]
}

/// Style schema of one annotation track.
pub fn track_style_schema() -> Vec<StyleDef> {
    use keys::*;
    vec![
        StyleDef::section("Filters"),
        StyleDef::number(MIN_FEATURE_LENGTH, 0.0),
        StyleDef::number(K_LONGEST, 100.0),
        StyleDef::section("Arrows"),
        StyleDef::boolean(SHOW_ARROWS, true),
        StyleDef::selection(
            ARROW_STYLE,
            "arrow at the end",
            &["arrow at the end", "arrow in the middle", "triangle"],
        ),
        StyleDef::section("Rectangles"),
        StyleDef::boolean(SHOW_RECTANGLES, true),
        StyleDef::range(RECTANGLE_OPACITY, 0.5, 0.0, 1.0, 0.05),
        StyleDef::section("Text"),
        StyleDef::boolean(SHOW_NAMES, false),
        StyleDef::range(TRACK_FONT_SIZE, 10.0, 0.0, 40.0, 2.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_skip_sections() {
        let styles = StyleSet::from_schema(&plot_style_schema());
        assert!(styles.get("Fundamentals").is_none());
        assert!(styles.boolean(keys::SHOW_REPETITIVE));
        assert_eq!(styles.text(keys::ALIGNMENT_SYMBOL), "dotted ends");
        assert_eq!(styles.text(keys::COLOR_UNIQUE_FORWARD), "#0081b0");
        assert_eq!(styles.number(keys::LINE_THICKNESS), 2.0);
        assert_eq!(styles.text(keys::GRID_REF), "always");
        assert_eq!(styles.text(keys::GRID_QUERY), "never");
    }

    #[test]
    fn test_set_overwrites() {
        let mut styles = StyleSet::from_schema(&plot_style_schema());
        styles.set(keys::MIN_ALIGNMENT_LENGTH, StyleValue::Number(500.0));
        assert_eq!(styles.number(keys::MIN_ALIGNMENT_LENGTH), 500.0);
    }

    #[test]
    fn test_track_schema_defaults() {
        let styles = StyleSet::from_schema(&track_style_schema());
        assert_eq!(styles.number(keys::K_LONGEST), 100.0);
        assert_eq!(styles.text(keys::ARROW_STYLE), "arrow at the end");
        assert_eq!(styles.number(keys::RECTANGLE_OPACITY), 0.5);
        assert!(!styles.boolean(keys::SHOW_NAMES));
    }

    #[test]
    fn test_typed_accessors_fall_back() {
        let styles = StyleSet::default();
        assert_eq!(styles.number("missing"), 0.0);
        assert!(!styles.boolean("missing"));
        assert_eq!(styles.text("missing"), "");
    }
}

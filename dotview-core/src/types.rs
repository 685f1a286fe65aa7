use serde::{Deserialize, Serialize};
use std::fmt;

pub type Position = u64;

/// Orientation of an alignment segment on the query sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

impl From<char> for Strand {
    fn from(c: char) -> Self {
        match c {
            '-' => Strand::Reverse,
            _ => Strand::Forward,
        }
    }
}

/// Classification of an alignment as a one-to-one or a multi-site match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Unique,
    Repetitive,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Unique => "unique",
            Tag::Repetitive => "repetitive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unique" => Some(Tag::Unique),
            "repetitive" => Some(Tag::Repetitive),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which chunk of a query's coordinate data a load request targets.
///
/// `Both` covers response bodies that carry the unique and repetitive
/// sections back to back; each section is still parsed and merged
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTag {
    Unique,
    Repetitive,
    Both,
}

/// Axis selector for scales, boundaries and annotation tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// Sequence name and length as listed in the coordinate index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqMeta {
    pub name: String,
    pub length: Position,
}

impl SeqMeta {
    pub fn new(name: impl Into<String>, length: Position) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }
}

/// One pairwise alignment segment between a reference and a query sequence.
///
/// Query coordinates keep their file order: `query_start > query_end` means
/// the segment aligns to the reverse strand. Records are never mutated after
/// parsing; a (query, tag) slot is only ever replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub ref_start: Position,
    pub ref_end: Position,
    pub query_start: Position,
    pub query_end: Position,
    pub ref_name: String,
    pub query_name: String,
    pub tag: Tag,
}

impl Alignment {
    pub fn strand(&self) -> Strand {
        if self.query_start <= self.query_end {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }

    pub fn ref_span(&self) -> Position {
        self.ref_end.saturating_sub(self.ref_start)
    }
}

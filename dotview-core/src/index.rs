//! Coordinate index parsing.
//!
//! The index is a line-oriented text blob in which `#ref`, `#query` and
//! `#overview` marker lines introduce three embedded CSV tables. The ref and
//! query tables list sequence metadata (plus byte offsets into the coordinate
//! blob for queries); the overview table holds one coarse alignment summary
//! per row. Unrecognized marker lines and content preceding any marker are
//! logged and skipped. A malformed table is a hard error: the plot cannot
//! function without its index.

use crate::types::{Alignment, Position, Tag};
use log::warn;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("{section} section is missing column '{column}'")]
    MissingColumn {
        section: &'static str,
        column: &'static str,
    },
    #[error("{section} section line {line}: expected {expected} fields, got {got}")]
    FieldCount {
        section: &'static str,
        line: usize,
        expected: usize,
        got: usize,
    },
    #[error("{section} section line {line}: invalid number '{value}' in column '{column}'")]
    BadNumber {
        section: &'static str,
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("overview section line {line}: unknown tag '{value}'")]
    BadTag { line: usize, value: String },
}

/// Reference sequence metadata plus the queries it matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefInfo {
    pub name: String,
    pub length: Position,
    pub matching_queries: Vec<String>,
}

/// Query sequence metadata plus delta-encoded byte offsets into the
/// coordinate blob.
///
/// The unique chunk spans `[unique_start, unique_start + repetitive_delta)`
/// and the repetitive chunk follows immediately, spanning `end_delta` more
/// bytes. Deltas are unsigned, so the ranges are monotonic and
/// non-overlapping by construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryInfo {
    pub name: String,
    pub length: Position,
    pub unique_start: u64,
    pub repetitive_delta: u64,
    pub end_delta: u64,
    pub matching_refs: Vec<String>,
}

impl QueryInfo {
    pub fn unique_range(&self) -> (u64, u64) {
        (self.unique_start, self.unique_start + self.repetitive_delta)
    }

    pub fn repetitive_range(&self) -> (u64, u64) {
        let start = self.unique_start + self.repetitive_delta;
        (start, start + self.end_delta)
    }
}

/// Parsed coordinate index: sequence metadata for both axes plus the coarse
/// overview alignments.
#[derive(Debug, Clone, Default)]
pub struct CoordsIndex {
    pub refs: Vec<RefInfo>,
    pub queries: Vec<QueryInfo>,
    pub overview: Vec<Alignment>,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Ref,
    Query,
    Overview,
}

/// Splits the index text into its three CSV sections and parses each with an
/// explicit column schema.
pub fn parse_index(text: &str) -> Result<CoordsIndex, IndexError> {
    let mut ref_lines: Vec<(usize, &str)> = Vec::new();
    let mut query_lines: Vec<(usize, &str)> = Vec::new();
    let mut overview_lines: Vec<(usize, &str)> = Vec::new();
    let mut reading: Option<Section> = None;

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.starts_with('#') {
            reading = match line {
                "#ref" => Some(Section::Ref),
                "#query" => Some(Section::Query),
                "#overview" => Some(Section::Overview),
                _ => {
                    warn!("unrecognized # line in index file: {line}");
                    reading
                }
            };
            continue;
        }
        match reading {
            Some(Section::Ref) => ref_lines.push((lineno + 1, line)),
            Some(Section::Query) => query_lines.push((lineno + 1, line)),
            Some(Section::Overview) => overview_lines.push((lineno + 1, line)),
            None => {
                if !line.is_empty() {
                    warn!("skipping index content before any section marker: {line}");
                }
            }
        }
    }

    Ok(CoordsIndex {
        refs: parse_refs(&ref_lines)?,
        queries: parse_queries(&query_lines)?,
        overview: parse_overview(&overview_lines)?,
    })
}

/// A CSV table with a header row; rows keep their source line numbers.
struct Table<'a> {
    header: Vec<&'a str>,
    rows: Vec<(usize, Vec<&'a str>)>,
}

impl<'a> Table<'a> {
    fn parse(section: &'static str, lines: &[(usize, &'a str)]) -> Result<Option<Self>, IndexError> {
        let mut iter = lines.iter().filter(|(_, l)| !l.is_empty());
        let header = match iter.next() {
            Some((_, line)) => line.split(',').map(str::trim).collect::<Vec<_>>(),
            None => return Ok(None),
        };
        let mut rows = Vec::new();
        for &(lineno, line) in iter {
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != header.len() {
                return Err(IndexError::FieldCount {
                    section,
                    line: lineno,
                    expected: header.len(),
                    got: fields.len(),
                });
            }
            rows.push((lineno, fields));
        }
        Ok(Some(Self { header, rows }))
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|&h| h == name)
    }

    fn require(&self, section: &'static str, name: &'static str) -> Result<usize, IndexError> {
        self.column(name).ok_or(IndexError::MissingColumn {
            section,
            column: name,
        })
    }
}

fn parse_number(
    section: &'static str,
    line: usize,
    column: &'static str,
    value: &str,
) -> Result<u64, IndexError> {
    value.trim().parse().map_err(|_| IndexError::BadNumber {
        section,
        line,
        column,
        value: value.to_string(),
    })
}

/// `~`-delimited list column; an empty cell is an empty list.
fn parse_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split('~').map(str::to_string).collect()
}

fn parse_refs(lines: &[(usize, &str)]) -> Result<Vec<RefInfo>, IndexError> {
    const SECTION: &str = "ref";
    let table = match Table::parse(SECTION, lines)? {
        Some(table) => table,
        None => return Ok(Vec::new()),
    };
    let name_col = table.require(SECTION, "name")?;
    let length_col = table.require(SECTION, "length")?;
    let matching_col = table.column("matching_queries");

    table
        .rows
        .iter()
        .map(|(line, fields)| {
            Ok(RefInfo {
                name: fields[name_col].to_string(),
                length: parse_number(SECTION, *line, "length", fields[length_col])?,
                matching_queries: matching_col.map_or_else(Vec::new, |c| parse_list(fields[c])),
            })
        })
        .collect()
}

fn parse_queries(lines: &[(usize, &str)]) -> Result<Vec<QueryInfo>, IndexError> {
    const SECTION: &str = "query";
    let table = match Table::parse(SECTION, lines)? {
        Some(table) => table,
        None => return Ok(Vec::new()),
    };
    let name_col = table.require(SECTION, "name")?;
    let length_col = table.require(SECTION, "length")?;
    let unique_col = table.column("unique_start");
    let repetitive_col = table.column("repetitive_delta");
    let end_col = table.column("end_delta");
    let matching_col = table.column("matching_refs");

    let byte_field = |line: usize,
                      column: &'static str,
                      col: Option<usize>,
                      fields: &[&str]|
     -> Result<u64, IndexError> {
        match col {
            Some(c) => parse_number(SECTION, line, column, fields[c]),
            None => Ok(0),
        }
    };

    table
        .rows
        .iter()
        .map(|(line, fields)| {
            Ok(QueryInfo {
                name: fields[name_col].to_string(),
                length: parse_number(SECTION, *line, "length", fields[length_col])?,
                unique_start: byte_field(*line, "unique_start", unique_col, fields)?,
                repetitive_delta: byte_field(*line, "repetitive_delta", repetitive_col, fields)?,
                end_delta: byte_field(*line, "end_delta", end_col, fields)?,
                matching_refs: matching_col.map_or_else(Vec::new, |c| parse_list(fields[c])),
            })
        })
        .collect()
}

fn parse_overview(lines: &[(usize, &str)]) -> Result<Vec<Alignment>, IndexError> {
    const SECTION: &str = "overview";
    let table = match Table::parse(SECTION, lines)? {
        Some(table) => table,
        None => return Ok(Vec::new()),
    };
    let ref_start = table.require(SECTION, "ref_start")?;
    let ref_end = table.require(SECTION, "ref_end")?;
    let query_start = table.require(SECTION, "query_start")?;
    let query_end = table.require(SECTION, "query_end")?;
    let ref_name = table.require(SECTION, "ref")?;
    let query_name = table.require(SECTION, "query")?;
    let tag = table.require(SECTION, "tag")?;

    table
        .rows
        .iter()
        .map(|(line, fields)| {
            Ok(Alignment {
                ref_start: parse_number(SECTION, *line, "ref_start", fields[ref_start])?,
                ref_end: parse_number(SECTION, *line, "ref_end", fields[ref_end])?,
                query_start: parse_number(SECTION, *line, "query_start", fields[query_start])?,
                query_end: parse_number(SECTION, *line, "query_end", fields[query_end])?,
                ref_name: fields[ref_name].to_string(),
                query_name: fields[query_name].to_string(),
                tag: Tag::parse(fields[tag]).ok_or_else(|| IndexError::BadTag {
                    line: *line,
                    value: fields[tag].to_string(),
                })?,
            })
        })
        .collect()
}

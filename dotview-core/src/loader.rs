//! Lazy, byte-range-driven loading of alignment coordinates.
//!
//! The coordinate blob is never read whole: the index gives each query a
//! byte-range triplet, and chunks are fetched on demand through a
//! [`CoordsSource`]. A chunk body is a pair of bang-delimited sections
//! (`!<query>!unique`, `!<query>!repetitive`), each a headerless CSV with the
//! fixed columns `ref_start,ref_end,query_start,query_end,ref`. A (query,
//! tag) slot is replaced wholesale on every merge and its loaded flag is set
//! exactly once, on first success, so re-requests are no-ops and a failed
//! load stays re-loadable.

use crate::index::QueryInfo;
use crate::types::{Alignment, LoadTag, Tag};
use log::{debug, warn};
use memmap2::Mmap;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Random-access read primitive over the coordinate blob. The engine does not
/// know whether the backing is a local file, a memory buffer or a remote
/// range request.
pub trait CoordsSource {
    fn read_range(&mut self, start: u64, end: u64) -> io::Result<String>;
}

/// Memory-mapped file source; the default backing for local coordinate files.
pub struct FileCoordsSource {
    mmap: Mmap,
}

impl FileCoordsSource {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap })
    }

    pub fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

impl CoordsSource for FileCoordsSource {
    fn read_range(&mut self, start: u64, end: u64) -> io::Result<String> {
        read_slice(&self.mmap, start, end)
    }
}

/// In-memory source, for tests and small inputs.
pub struct MemCoordsSource {
    data: Vec<u8>,
}

impl MemCoordsSource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

impl From<&str> for MemCoordsSource {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }
}

impl CoordsSource for MemCoordsSource {
    fn read_range(&mut self, start: u64, end: u64) -> io::Result<String> {
        read_slice(&self.data, start, end)
    }
}

fn read_slice(data: &[u8], start: u64, end: u64) -> io::Result<String> {
    if start > end {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("byte range {start}..{end} is reversed"),
        ));
    }
    let len = data.len() as u64;
    let start = start.min(len) as usize;
    let end = end.min(len) as usize;
    Ok(String::from_utf8_lossy(&data[start..end]).into_owned())
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no coordinate source attached")]
    NoSource,
    #[error("unknown query '{0}'")]
    UnknownQuery(String),
    #[error("reading coordinate bytes {start}..{end}: {source}")]
    Read {
        start: u64,
        end: u64,
        #[source]
        source: io::Error,
    },
}

/// Byte ranges plus one-shot load flags for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub unique_range: (u64, u64),
    pub repetitive_range: (u64, u64),
    pub loaded_unique: bool,
    pub loaded_repetitive: bool,
}

impl IndexEntry {
    pub fn from_info(info: &QueryInfo) -> Self {
        Self {
            unique_range: info.unique_range(),
            repetitive_range: info.repetitive_range(),
            loaded_unique: false,
            loaded_repetitive: false,
        }
    }

    fn loaded(&self, tag: Tag) -> bool {
        match tag {
            Tag::Unique => self.loaded_unique,
            Tag::Repetitive => self.loaded_repetitive,
        }
    }

    fn mark_loaded(&mut self, tag: Tag) {
        match tag {
            Tag::Unique => self.loaded_unique = true,
            Tag::Repetitive => self.loaded_repetitive = true,
        }
    }

    fn range(&self, tag: Tag) -> (u64, u64) {
        match tag {
            Tag::Unique => self.unique_range,
            Tag::Repetitive => self.repetitive_range,
        }
    }

    /// Bytes still to fetch for `tag`; zero once loaded.
    fn pending_bytes(&self, tag: Tag) -> u64 {
        if self.loaded(tag) {
            0
        } else {
            let (start, end) = self.range(tag);
            end.saturating_sub(start)
        }
    }
}

/// Load bookkeeping for every query in the index.
#[derive(Debug, Clone, Default)]
pub struct QueryIndex {
    entries: HashMap<String, IndexEntry>,
}

impl QueryIndex {
    pub fn from_queries(queries: &[QueryInfo]) -> Self {
        Self {
            entries: queries
                .iter()
                .map(|info| (info.name.clone(), IndexEntry::from_info(info)))
                .collect(),
        }
    }

    pub fn get(&self, query: &str) -> Option<&IndexEntry> {
        self.entries.get(query)
    }

    pub fn get_mut(&mut self, query: &str) -> Option<&mut IndexEntry> {
        self.entries.get_mut(query)
    }
}

const EMPTY: &[Alignment] = &[];

/// In-memory alignment set, grouped by query then tag.
#[derive(Debug, Clone, Default)]
pub struct AlignmentStore {
    by_query: HashMap<String, TagSlots>,
}

#[derive(Debug, Clone, Default)]
struct TagSlots {
    unique: Vec<Alignment>,
    repetitive: Vec<Alignment>,
}

impl AlignmentStore {
    /// Seeds the store from the overview table, grouping rows by query and
    /// tag.
    pub fn from_overview(rows: Vec<Alignment>) -> Self {
        let mut store = Self::default();
        for row in rows {
            let slots = store.by_query.entry(row.query_name.clone()).or_default();
            match row.tag {
                Tag::Unique => slots.unique.push(row),
                Tag::Repetitive => slots.repetitive.push(row),
            }
        }
        store
    }

    pub fn alignments(&self, query: &str, tag: Tag) -> &[Alignment] {
        match self.by_query.get(query) {
            Some(slots) => match tag {
                Tag::Unique => &slots.unique,
                Tag::Repetitive => &slots.repetitive,
            },
            None => EMPTY,
        }
    }

    /// Replaces the (query, tag) slot wholesale.
    pub fn replace(&mut self, query: &str, tag: Tag, records: Vec<Alignment>) {
        let slots = self.by_query.entry(query.to_string()).or_default();
        let slot = match tag {
            Tag::Unique => &mut slots.unique,
            Tag::Repetitive => &mut slots.repetitive,
        };
        debug!(
            "{query}: replaced {} {tag} alignments with {}",
            slot.len(),
            records.len()
        );
        *slot = records;
    }
}

#[derive(Debug, Error)]
enum ChunkError {
    #[error("line {line}: expected 5 fields, got {got}")]
    FieldCount { line: usize, got: usize },
    #[error("line {line}: invalid number '{value}'")]
    BadNumber { line: usize, value: String },
}

/// Splits a chunk body into its unique and repetitive section texts. Lines
/// under an unrecognized bang marker are dropped.
fn split_chunk_sections(text: &str, query: &str) -> (String, String) {
    let unique_marker = format!("!{query}!unique");
    let repetitive_marker = format!("!{query}!repetitive");
    let mut unique = String::new();
    let mut repetitive = String::new();
    let mut reading: Option<Tag> = None;

    for raw in text.lines() {
        let line = raw.trim_end_matches('\r');
        if line.starts_with('!') {
            reading = if line == unique_marker {
                Some(Tag::Unique)
            } else if line == repetitive_marker {
                Some(Tag::Repetitive)
            } else {
                None
            };
        } else {
            match reading {
                Some(Tag::Unique) => {
                    unique.push_str(line);
                    unique.push('\n');
                }
                Some(Tag::Repetitive) => {
                    repetitive.push_str(line);
                    repetitive.push('\n');
                }
                None => {}
            }
        }
    }
    (unique, repetitive)
}

/// Parses one chunk section with the fixed column order
/// `ref_start,ref_end,query_start,query_end,ref`, tagging every row with the
/// query and tag.
fn parse_chunk(text: &str, query: &str, tag: Tag) -> Result<Vec<Alignment>, ChunkError> {
    let mut records = Vec::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 5 {
            return Err(ChunkError::FieldCount {
                line: lineno + 1,
                got: fields.len(),
            });
        }
        let number = |value: &str| -> Result<u64, ChunkError> {
            value.trim().parse().map_err(|_| ChunkError::BadNumber {
                line: lineno + 1,
                value: value.to_string(),
            })
        };
        records.push(Alignment {
            ref_start: number(fields[0])?,
            ref_end: number(fields[1])?,
            query_start: number(fields[2])?,
            query_end: number(fields[3])?,
            ref_name: fields[4].to_string(),
            query_name: query.to_string(),
            tag,
        });
    }
    Ok(records)
}

/// Fetches and merges the requested chunk(s) for one query. Returns whether
/// anything was merged (the caller schedules a redraw in that case).
///
/// Tags that are already loaded are skipped; for [`LoadTag::Both`] a single
/// read covers the spans of the tags still pending. A section that fails to
/// parse is logged, leaves an empty slot and keeps its flag unset, so the
/// next request retries the read.
pub fn load_alignments(
    source: &mut dyn CoordsSource,
    index: &mut QueryIndex,
    store: &mut AlignmentStore,
    query: &str,
    tag: LoadTag,
) -> Result<bool, LoadError> {
    let entry = index
        .get_mut(query)
        .ok_or_else(|| LoadError::UnknownQuery(query.to_string()))?;

    let wanted: Vec<Tag> = match tag {
        LoadTag::Unique => vec![Tag::Unique],
        LoadTag::Repetitive => vec![Tag::Repetitive],
        LoadTag::Both => vec![Tag::Unique, Tag::Repetitive],
    }
    .into_iter()
    .filter(|&t| !entry.loaded(t))
    .collect();

    if wanted.is_empty() {
        return Ok(false);
    }

    let start = wanted.iter().map(|&t| entry.range(t).0).min().unwrap();
    let end = wanted.iter().map(|&t| entry.range(t).1).max().unwrap();
    let text = source
        .read_range(start, end)
        .map_err(|source| LoadError::Read { start, end, source })?;

    let (unique_text, repetitive_text) = split_chunk_sections(&text, query);
    let mut merged = false;
    for t in wanted {
        let section = match t {
            Tag::Unique => &unique_text,
            Tag::Repetitive => &repetitive_text,
        };
        match parse_chunk(section, query, t) {
            Ok(records) => {
                store.replace(query, t, records);
                entry.mark_loaded(t);
                merged = true;
            }
            Err(err) => {
                warn!("{query}: discarding {t} chunk: {err}");
                store.replace(query, t, Vec::new());
            }
        }
    }
    Ok(merged)
}

/// Recoverable memory cost of the not-yet-loaded chunks of a set of queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MemoryCost {
    pub unique_bytes: u64,
    pub repetitive_bytes: u64,
}

/// Sums, per visible query, the unloaded byte span of each tag (zero once
/// loaded). Queries absent from the index contribute nothing.
pub fn memory_cost<'a, I>(index: &QueryIndex, visible: I) -> MemoryCost
where
    I: IntoIterator<Item = &'a str>,
{
    let mut cost = MemoryCost::default();
    for query in visible {
        if let Some(entry) = index.get(query) {
            cost.unique_bytes += entry.pending_bytes(Tag::Unique);
            cost.repetitive_bytes += entry.pending_bytes(Tag::Repetitive);
        }
    }
    cost
}

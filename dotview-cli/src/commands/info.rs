//! Info command implementation - summarize a coordinate index.

use anyhow::{Context, Result};
use dotview_core::parse_index;
use serde_json::json;
use std::path::PathBuf;

pub fn execute(index_path: PathBuf, json: bool) -> Result<()> {
    let text = super::read_text(&index_path)?;
    let index = parse_index(&text)
        .with_context(|| format!("Failed to parse coordinate index {}", index_path.display()))?;

    if json {
        let summary = json!({
            "refs": index.refs,
            "queries": index.queries,
            "overview_alignments": index.overview.len(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let ref_bases: u64 = index.refs.iter().map(|r| r.length).sum();
    let query_bases: u64 = index.queries.iter().map(|q| q.length).sum();
    println!(
        "references: {} sequences, {} bases",
        index.refs.len(),
        ref_bases
    );
    for r in &index.refs {
        println!("  {}  {} bp  matches {} queries", r.name, r.length, r.matching_queries.len());
    }
    println!(
        "queries: {} sequences, {} bases",
        index.queries.len(),
        query_bases
    );
    for q in &index.queries {
        let (u0, u1) = q.unique_range();
        let (r0, r1) = q.repetitive_range();
        println!(
            "  {}  {} bp  unique bytes {}..{}  repetitive bytes {}..{}",
            q.name, q.length, u0, u1, r0, r1
        );
    }
    println!("overview alignments: {}", index.overview.len());
    Ok(())
}

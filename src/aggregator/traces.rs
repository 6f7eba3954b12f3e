//! Group identical call traces and rank them by frequency.

use super::counts::Tally;
use crate::parser::ParsedLog;
use std::collections::HashMap;

/// One group of blocks sharing a call trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceGroup {
    /// The shared trace frames
    pub trace: Vec<String>,

    /// How many blocks carried this trace
    pub count: u64,

    /// Pages allocated through this trace
    pub pages: u64,
}

/// Collapse blocks with identical traces and return the `top_n` most
/// frequently seen groups, most common first.
pub fn most_common_traces(log: &ParsedLog, top_n: usize) -> Vec<TraceGroup> {
    let mut table: HashMap<&[String], Tally> = HashMap::new();
    for block in &log.blocks {
        table
            .entry(block.trace.as_slice())
            .or_default()
            .add(block.page_count);
    }

    let mut groups: Vec<TraceGroup> = table
        .into_iter()
        .map(|(trace, tally)| TraceGroup {
            trace: trace.to_vec(),
            count: tally.count,
            pages: tally.pages,
        })
        .collect();

    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups.truncate(top_n);
    groups
}

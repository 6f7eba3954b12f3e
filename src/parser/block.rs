//! Scanner for multi-line allocation blocks.
//!
//! A block starts with a `Page allocated via order N, ...` header,
//! continues with call-trace frames (one of which may attribute the
//! allocation to a kernel module via a `[name]` token), and ends at a
//! blank line, the next header, or end of input.

use crate::utils::config::{ALLOC_HEADER_TOKEN, MAX_ORDER, PFN_LINE_PREFIX};
use crate::utils::error::ParseError;
use log::{debug, warn};
use regex::Regex;
use std::io::BufRead;
use std::sync::OnceLock;

/// Process attribution from an extended block header
///
/// Only present when the dump was collected with a kernel that records
/// `pid N, tgid N (name), ts N ns` in the header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: i64,
    pub tgid: i64,
    pub name: String,
    pub timestamp_ns: u64,
}

/// One parsed allocation block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationBlock {
    /// Power-of-two exponent: this allocation spans `2^order` pages
    pub order: u32,

    /// `2^order`, precomputed
    pub page_count: u64,

    /// First bracketed module token seen in the trace, if any
    pub module: Option<String>,

    /// Allocating process, if the header carried one
    pub process: Option<ProcessInfo>,

    /// Trace frames: the block's non-blank lines, minus PFN metadata
    pub trace: Vec<String>,
}

/// Counters for blocks the scanner dropped
///
/// Dropped blocks are intentional best-effort behavior on noisy dumps,
/// not errors. Shown to the user under `--verbose`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipStats {
    /// Header with no parsable `order N` field
    pub missing_order: u64,

    /// Order too large to be a page count
    pub invalid_order: u64,

    /// Header immediately followed by a blank line or end of input
    pub incomplete_trace: u64,
}

impl SkipStats {
    pub fn total(&self) -> u64 {
        self.missing_order + self.invalid_order + self.incomplete_trace
    }
}

/// Result of one scanning pass over a dump
#[derive(Debug, Default)]
pub struct ParsedLog {
    pub blocks: Vec<AllocationBlock>,
    pub skipped: SkipStats,
}

impl ParsedLog {
    /// Sum of `page_count` across all blocks
    pub fn total_pages(&self) -> u64 {
        self.blocks.iter().map(|b| b.page_count).sum()
    }

    /// True if any header carried pid/tgid/process attribution
    pub fn has_process_info(&self) -> bool {
        self.blocks.iter().any(|b| b.process.is_some())
    }
}

/// In-flight state for the block currently being scanned
struct BlockState {
    order: u32,
    page_count: u64,
    module: Option<String>,
    process: Option<ProcessInfo>,
    trace: Vec<String>,
}

impl BlockState {
    fn into_block(self) -> AllocationBlock {
        AllocationBlock {
            order: self.order,
            page_count: self.page_count,
            module: self.module,
            process: self.process,
            trace: self.trace,
        }
    }
}

fn order_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"order (\d+)").expect("valid regex"))
}

fn module_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([A-Za-z0-9_]+)\]").expect("valid regex"))
}

fn process_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"pid (\d+), tgid (\d+) \((.*?)\), ts (\d+)").expect("valid regex")
    })
}

/// Scan a page_owner dump into allocation blocks.
///
/// Single pass, not restartable. A block whose header lacks a usable
/// order is dropped whole; the reference tools instead reused the order
/// of the previous block, which silently miscounts malformed dumps.
///
/// # Errors
/// * `ParseError::Io` - the reader failed mid-scan
pub fn parse_blocks<R: BufRead>(reader: R) -> Result<ParsedLog, ParseError> {
    let mut log = ParsedLog::default();
    let mut current: Option<BlockState> = None;

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();

        // A new header finalizes whatever came before it, blank
        // separator or not.
        if line.contains(ALLOC_HEADER_TOKEN) {
            finish_block(&mut log, current.take());
            current = start_block(trimmed, &mut log.skipped);
            continue;
        }

        if trimmed.is_empty() {
            finish_block(&mut log, current.take());
            continue;
        }

        let Some(state) = current.as_mut() else {
            // Between blocks, or inside a block we already dropped.
            continue;
        };

        if trimmed.starts_with(PFN_LINE_PREFIX) {
            continue;
        }

        state.trace.push(trimmed.to_string());
        if state.module.is_none() {
            state.module = extract_module(trimmed);
        }
    }

    finish_block(&mut log, current.take());

    debug!(
        "scanned {} blocks, {} skipped",
        log.blocks.len(),
        log.skipped.total()
    );

    Ok(log)
}

/// Begin a block from its header line; `None` drops the whole block
fn start_block(header: &str, skipped: &mut SkipStats) -> Option<BlockState> {
    let Some(caps) = order_pattern().captures(header) else {
        warn!("allocation header without an order field: {header}");
        skipped.missing_order += 1;
        return None;
    };

    let order = match caps[1].parse::<u32>() {
        Ok(order) if order < MAX_ORDER => order,
        _ => {
            warn!("allocation order out of range, skipping block: {header}");
            skipped.invalid_order += 1;
            return None;
        }
    };

    Some(BlockState {
        order,
        page_count: 1u64 << order,
        module: None,
        process: extract_process(header),
        trace: Vec::new(),
    })
}

/// Finalize a block; header-only blocks carry no usable trace
fn finish_block(log: &mut ParsedLog, state: Option<BlockState>) {
    let Some(state) = state else {
        return;
    };

    if state.trace.is_empty() {
        log.skipped.incomplete_trace += 1;
        return;
    }

    log.blocks.push(state.into_block());
}

/// First `[identifier]` token on the line, if any
fn extract_module(line: &str) -> Option<String> {
    module_pattern()
        .captures(line)
        .map(|caps| caps[1].to_string())
}

fn extract_process(header: &str) -> Option<ProcessInfo> {
    let caps = process_pattern().captures(header)?;
    Some(ProcessInfo {
        pid: caps[1].parse().ok()?,
        tgid: caps[2].parse().ok()?,
        name: caps[3].to_string(),
        timestamp_ns: caps[4].parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn scan(input: &str) -> ParsedLog {
        parse_blocks(Cursor::new(input)).unwrap()
    }

    #[test]
    fn test_single_block() {
        let log = scan(
            "Page allocated via order 2, mask 0x2dc2\n\
             __alloc_pages+0x1e8/0x230\n\
             vmxnet3_rq_alloc+0x90/0x120 [vmxnet3]\n\
             \n",
        );

        assert_eq!(log.blocks.len(), 1);
        let block = &log.blocks[0];
        assert_eq!(block.order, 2);
        assert_eq!(block.page_count, 4);
        assert_eq!(block.module.as_deref(), Some("vmxnet3"));
        assert_eq!(block.trace.len(), 2);
        assert_eq!(log.skipped.total(), 0);
    }

    #[test]
    fn test_block_without_module() {
        let log = scan(
            "Page allocated via order 0, mask 0x2dc2\n\
             __alloc_pages+0x1e8/0x230\n\
             \n",
        );

        assert_eq!(log.blocks.len(), 1);
        assert!(log.blocks[0].module.is_none());
    }

    #[test]
    fn test_first_bracketed_token_wins() {
        let log = scan(
            "Page allocated via order 0, mask 0x2dc2\n\
             xmit_one+0x90/0x120 [e1000e] via [mac80211]\n\
             \n",
        );

        assert_eq!(log.blocks[0].module.as_deref(), Some("e1000e"));
    }

    #[test]
    fn test_module_found_once_per_block() {
        let log = scan(
            "Page allocated via order 1, mask 0x2dc2\n\
             first_frame+0x10/0x20 [first]\n\
             second_frame+0x30/0x40 [second]\n\
             \n",
        );

        assert_eq!(log.blocks.len(), 1);
        assert_eq!(log.blocks[0].module.as_deref(), Some("first"));
    }

    #[test]
    fn test_pfn_lines_never_contribute() {
        let log = scan(
            "Page allocated via order 0, mask 0x2dc2\n\
             PFN 1048576 type Movable Block 2048 [fake_module]\n\
             real_frame+0x10/0x20\n\
             \n",
        );

        let block = &log.blocks[0];
        assert!(block.module.is_none());
        assert_eq!(block.trace, vec!["real_frame+0x10/0x20".to_string()]);
    }

    #[test]
    fn test_header_finalizes_previous_block() {
        let log = scan(
            "Page allocated via order 0, mask 0x2dc2\n\
             frame_a+0x10/0x20 [mod_a]\n\
             Page allocated via order 3, mask 0x2dc2\n\
             frame_b+0x10/0x20 [mod_b]\n\
             \n",
        );

        assert_eq!(log.blocks.len(), 2);
        assert_eq!(log.blocks[0].module.as_deref(), Some("mod_a"));
        assert_eq!(log.blocks[1].order, 3);
        assert_eq!(log.blocks[1].page_count, 8);
    }

    #[test]
    fn test_trailing_block_flushed_at_eof() {
        let log = scan(
            "Page allocated via order 0, mask 0x2dc2\n\
             frame+0x10/0x20 [tail_mod]",
        );

        assert_eq!(log.blocks.len(), 1);
        assert_eq!(log.blocks[0].module.as_deref(), Some("tail_mod"));
    }

    #[test]
    fn test_missing_order_skips_block() {
        let log = scan(
            "Page allocated via mask 0x2dc2\n\
             frame+0x10/0x20 [mod_a]\n\
             \n",
        );

        assert!(log.blocks.is_empty());
        assert_eq!(log.skipped.missing_order, 1);
    }

    #[test]
    fn test_huge_order_skips_block() {
        let log = scan(
            "Page allocated via order 64, mask 0x2dc2\n\
             frame+0x10/0x20 [mod_a]\n\
             \n",
        );

        assert!(log.blocks.is_empty());
        assert_eq!(log.skipped.invalid_order, 1);
    }

    #[test]
    fn test_header_only_block_counts_incomplete() {
        let log = scan("Page allocated via order 0, mask 0x2dc2\n\n");

        assert!(log.blocks.is_empty());
        assert_eq!(log.skipped.incomplete_trace, 1);
    }

    #[test]
    fn test_extended_header_process_info() {
        let log = scan(
            "Page allocated via order 0, mask 0x2dc2, pid 1234, tgid 1234 (kworker/0:1), ts 5678 ns\n\
             frame+0x10/0x20\n\
             \n",
        );

        let process = log.blocks[0].process.as_ref().unwrap();
        assert_eq!(process.pid, 1234);
        assert_eq!(process.tgid, 1234);
        assert_eq!(process.name, "kworker/0:1");
        assert_eq!(process.timestamp_ns, 5678);
        assert!(log.has_process_info());
    }

    #[test]
    fn test_plain_header_has_no_process_info() {
        let log = scan(
            "Page allocated via order 0, mask 0x2dc2\n\
             frame+0x10/0x20\n\
             \n",
        );

        assert!(log.blocks[0].process.is_none());
        assert!(!log.has_process_info());
    }

    #[test]
    fn test_empty_input() {
        let log = scan("");
        assert!(log.blocks.is_empty());
        assert_eq!(log.skipped.total(), 0);
    }

    #[test]
    fn test_total_pages() {
        let log = scan(
            "Page allocated via order 2, mask 0x2dc2\n\
             frame+0x10/0x20\n\
             \n\
             Page allocated via order 3, mask 0x2dc2\n\
             frame+0x10/0x20\n\
             \n",
        );

        assert_eq!(log.total_pages(), 4 + 8);
    }
}

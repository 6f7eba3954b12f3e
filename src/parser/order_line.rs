//! Scanner for the single-line dump form.
//!
//! Some page_owner exports collapse each allocation to one line whose
//! first field is `Page` and whose fifth field is the order, e.g.
//! `Page allocated via order 2, mask ...`. This scanner deliberately
//! uses that looser field rule instead of the block state machine.

use crate::utils::config::{MAX_ORDER, ORDER_FIELD_INDEX, ORDER_LINE_TOKEN};
use crate::utils::error::ParseError;
use log::warn;
use std::io::BufRead;

/// Collect the order of every matching line.
///
/// Lines whose order field is missing or not numeric are skipped with
/// a warning; a bad line never aborts the scan.
///
/// # Errors
/// * `ParseError::Io` - the reader failed mid-scan
pub fn scan_orders<R: BufRead>(reader: R) -> Result<Vec<u32>, ParseError> {
    let mut orders = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();

        if fields.first() != Some(&ORDER_LINE_TOKEN) {
            continue;
        }

        let Some(field) = fields.get(ORDER_FIELD_INDEX) else {
            warn!("short allocation line, skipping: {line}");
            continue;
        };

        match field.trim_end_matches(',').parse::<u32>() {
            Ok(order) if order < MAX_ORDER => orders.push(order),
            _ => warn!("unparsable order field {field:?}, skipping line"),
        }
    }

    Ok(orders)
}

//! Aggregation of parsed allocation blocks into grouped count tables.
//!
//! This module transforms parser output into:
//! - Per-module and per-(module, order) count tables
//! - Per-process count tables
//! - Per-order page totals with a grand total
//! - Ranked call-trace groups

pub mod counts;
pub mod traces;

// Re-export main types and functions
pub use counts::{
    aggregate_by_module, aggregate_by_module_order, aggregate_by_process, fold_orders,
    ModuleOrderRow, ModuleRow, OrderTotals, ProcessRow, Tally,
};
pub use traces::{most_common_traces, TraceGroup};

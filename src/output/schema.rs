//! JSON report schema definitions.
//!
//! The text tables are the primary interface; this schema is the
//! machine-readable mirror, versioned to allow future evolution.

use crate::aggregator::{ModuleOrderRow, ModuleRow, OrderTotals};
use crate::utils::config::{PAGE_SIZE_KB, SCHEMA_VERSION};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Which report produced this document
    pub report: String,

    /// Input file the report was derived from
    pub source: String,

    /// Data rows, in the same order as the rendered table
    pub rows: Vec<ReportRow>,

    /// Grand total of pages, for reports that have one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// One data row of a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,

    pub count: u64,
    pub pages: u64,
    pub kbytes: u64,
}

impl Report {
    fn new(report: &str, source: &str, rows: Vec<ReportRow>, total_pages: Option<u64>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            report: report.to_string(),
            source: source.to_string(),
            rows,
            total_pages,
            generated_at: Utc::now().to_rfc3339(),
        }
    }

    /// Build a report document from sorted per-module rows.
    pub fn from_modules(source: &str, rows: &[ModuleRow]) -> Self {
        let rows = rows
            .iter()
            .map(|r| ReportRow {
                module: Some(r.module.clone()),
                order: None,
                count: r.count,
                pages: r.pages,
                kbytes: r.pages * PAGE_SIZE_KB,
            })
            .collect();
        Self::new("modules", source, rows, None)
    }

    /// Build a report document from sorted per-(module, order) rows.
    pub fn from_module_orders(source: &str, rows: &[ModuleOrderRow]) -> Self {
        let rows = rows
            .iter()
            .map(|r| ReportRow {
                module: Some(r.module.clone()),
                order: Some(r.order),
                count: r.count,
                pages: r.pages,
                kbytes: r.pages * PAGE_SIZE_KB,
            })
            .collect();
        Self::new("module-orders", source, rows, None)
    }

    /// Build a report document from per-order totals.
    pub fn from_orders(source: &str, totals: &OrderTotals) -> Self {
        let rows = totals
            .per_order
            .iter()
            .map(|(order, tally)| ReportRow {
                module: None,
                order: Some(*order),
                count: tally.count,
                pages: tally.pages,
                kbytes: tally.pages * PAGE_SIZE_KB,
            })
            .collect();
        Self::new("orders", source, rows, Some(totals.total.pages))
    }
}

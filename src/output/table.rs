//! Fixed-width table rendering for the count reports.
//!
//! Sorting lives here with the rendering: each report has exactly one
//! ordering, applied in-process so output never depends on an external
//! sort utility or locale.

use crate::aggregator::{ModuleOrderRow, ModuleRow, OrderTotals, ProcessRow};
use crate::output::units::Unit;
use crate::utils::config::PAGE_SIZE_KB;
use crate::utils::error::OutputError;
use std::io::Write;

/// Sort per-module rows, largest page consumers first (stable ties).
pub fn sort_modules(rows: &mut [ModuleRow]) {
    rows.sort_by(|a, b| b.pages.cmp(&a.pages));
}

/// Sort per-(module, order) rows by module, then ascending order.
pub fn sort_module_orders(rows: &mut [ModuleOrderRow]) {
    rows.sort_by(|a, b| a.module.cmp(&b.module).then(a.order.cmp(&b.order)));
}

/// Sort per-process rows, largest page consumers first.
pub fn sort_processes(rows: &mut [ProcessRow]) {
    rows.sort_by(|a, b| b.pages.cmp(&a.pages));
}

/// Render the per-module report.
///
/// Rows are printed in the order given; callers sort first.
pub fn render_modules(rows: &[ModuleRow], out: &mut impl Write) -> Result<(), OutputError> {
    writeln!(out, "{:>10} {:>10} {:>10} {:>10}", "Count", "Pages", "Kbytes", "Module")?;
    for row in rows {
        writeln!(
            out,
            "{:>10} {:>10} {:>10} {:<10}",
            row.count,
            row.pages,
            row.pages * PAGE_SIZE_KB,
            row.module
        )?;
    }
    Ok(())
}

/// Render the per-(module, order) report.
pub fn render_module_orders(
    rows: &[ModuleOrderRow],
    out: &mut impl Write,
) -> Result<(), OutputError> {
    writeln!(
        out,
        "{:>10} {:>10} {:>10} {:>10} {:>10}",
        "Count", "Pages", "Kbytes", "Order", "Module"
    )?;
    for row in rows {
        writeln!(
            out,
            "{:>10} {:>10} {:>10} {:>10} {:<10}",
            row.count,
            row.pages,
            row.pages * PAGE_SIZE_KB,
            row.order,
            row.module
        )?;
    }
    Ok(())
}

/// Render the per-order totals report, ending with the grand total.
pub fn render_orders(totals: &OrderTotals, out: &mut impl Write) -> Result<(), OutputError> {
    writeln!(out, "{:>10} {:>10} {:>10}", "Order", "Pages", "Kbytes")?;
    for (order, tally) in &totals.per_order {
        writeln!(
            out,
            "{:>10} {:>10} {:>10}",
            order,
            tally.pages,
            tally.pages * PAGE_SIZE_KB
        )?;
    }
    writeln!(
        out,
        "{:>10} {:>10} {:>10}",
        "Total",
        totals.total.pages,
        totals.total.pages * PAGE_SIZE_KB
    )?;
    Ok(())
}

/// Render the per-process report with scaled memory and a total row.
///
/// The total covers the rows shown, so a truncated report totals its
/// visible share.
pub fn render_processes(
    rows: &[ProcessRow],
    unit: Unit,
    out: &mut impl Write,
) -> Result<(), OutputError> {
    let memory_header = format!("Memory ({})", unit.label());
    writeln!(out, "{:<25} {:>12} {:>15}", "Process", "Allocations", memory_header)?;
    writeln!(out, "{}", "=".repeat(54))?;

    let mut total_count = 0u64;
    let mut total_pages = 0u64;
    for row in rows {
        total_count += row.count;
        total_pages += row.pages;
        writeln!(
            out,
            "{:<25} {:>12} {:>15.2}",
            row.process,
            row.count,
            unit.scale(row.pages)
        )?;
    }

    writeln!(out, "{}", "-".repeat(54))?;
    writeln!(
        out,
        "{:<25} {:>12} {:>15.2}",
        "Total",
        total_count,
        unit.scale(total_pages)
    )?;
    Ok(())
}

//! Rendering of ranked call-trace groups.

use crate::aggregator::TraceGroup;
use crate::output::units::Unit;
use crate::utils::error::OutputError;
use std::io::Write;

/// Render the most-common-traces report.
pub fn render_traces(
    groups: &[TraceGroup],
    unit: Unit,
    out: &mut impl Write,
) -> Result<(), OutputError> {
    writeln!(out, "Top {} most commonly seen call traces:", groups.len())?;

    for (index, group) in groups.iter().enumerate() {
        writeln!(out)?;
        writeln!(
            out,
            "Call Trace #{} (Seen {} times, {} pages, {:.2} {}):",
            index + 1,
            group.count,
            group.pages,
            unit.scale(group.pages),
            unit.label()
        )?;
        for line in &group.trace {
            writeln!(out, "{line}")?;
        }
    }

    Ok(())
}

//! Whole-dump summary command.

use super::report::{load_blocks, show_skips, ReportArgs};
use anyhow::Result;

/// Execute the summary report: totals across every parsed block.
pub fn execute_summary(args: ReportArgs) -> Result<()> {
    let log = load_blocks(&args)?;

    let total_pages = log.total_pages();

    println!("Summary:");
    println!("{}", "=".repeat(20));
    println!("Total allocations: {}", log.blocks.len());
    println!("Total pages:       {}", total_pages);
    println!(
        "Total memory:      {:.2} {}",
        args.unit.scale(total_pages),
        args.unit.label()
    );

    show_skips(&log.skipped, args.verbose);
    Ok(())
}

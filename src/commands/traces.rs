//! Most-common-call-traces command.

use super::report::{load_blocks, show_skips, ReportArgs};
use crate::aggregator::most_common_traces;
use crate::output::render_traces;
use crate::utils::config::DEFAULT_TOP_TRACES;
use anyhow::{Context, Result};

/// Execute the call-trace report.
pub fn execute_traces(args: ReportArgs) -> Result<()> {
    let log = load_blocks(&args)?;

    let groups = most_common_traces(&log, args.top.unwrap_or(DEFAULT_TOP_TRACES));

    render_traces(&groups, args.unit, &mut std::io::stdout().lock())
        .context("failed to write report")?;

    show_skips(&log.skipped, args.verbose);
    Ok(())
}

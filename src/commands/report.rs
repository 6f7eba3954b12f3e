//! Count-table report commands.
//!
//! Each command:
//! 1. Validates and opens the input file
//! 2. Scans the dump
//! 3. Folds blocks into the report's key projection
//! 4. Sorts and renders the table to stdout
//! 5. Optionally writes the JSON mirror

use crate::aggregator::{
    aggregate_by_module, aggregate_by_module_order, aggregate_by_process, fold_orders,
};
use crate::output::{
    render_module_orders, render_modules, render_orders, render_processes, sort_module_orders,
    sort_modules, sort_processes, write_report, Report, Unit,
};
use crate::parser::{parse_blocks, scan_orders, ParsedLog, SkipStats};
use crate::utils::config::DEFAULT_TOP_PROCESSES;
use crate::utils::error::InputError;
use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Arguments shared by the report commands
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct ReportArgs {
    /// page_owner dump to analyze
    pub input: PathBuf,

    /// Limit output to the N largest entries (None = everything)
    pub top: Option<usize>,

    /// Also write the report as JSON to this path
    pub json: Option<PathBuf>,

    /// Display unit for scaled-memory reports
    pub unit: Unit,

    /// Show skip statistics after the report
    pub verbose: bool,
}

/// Validate report arguments before executing a command.
///
/// **Public** - called from main.rs before dispatch
pub fn validate_args(args: &ReportArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("input file path cannot be empty");
    }

    if args.top == Some(0) {
        anyhow::bail!("--top must be greater than 0");
    }

    Ok(())
}

/// Open the input file, checking the precondition up front.
///
/// All processing happens after this returns; a missing or unreadable
/// file never produces partial output.
pub fn open_input(path: &Path) -> Result<BufReader<File>, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }

    if !path.is_file() {
        return Err(InputError::NotAFile(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|source| InputError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(BufReader::new(file))
}

/// Scan the dump named by `args.input` into blocks.
pub(crate) fn load_blocks(args: &ReportArgs) -> Result<ParsedLog> {
    let reader = open_input(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;

    let log = parse_blocks(reader).context("failed to scan page_owner dump")?;

    info!(
        "parsed {} allocation blocks ({} skipped)",
        log.blocks.len(),
        log.skipped.total()
    );

    Ok(log)
}

/// Print skip statistics after a report.
pub(crate) fn show_skips(skipped: &SkipStats, verbose: bool) {
    if !verbose {
        return;
    }

    println!();
    println!("Skipped blocks: {}", skipped.total());
    println!(" - Missing order: {}", skipped.missing_order);
    println!(" - Invalid order: {}", skipped.invalid_order);
    println!(" - Incomplete trace: {}", skipped.incomplete_trace);
}

/// Execute the per-module report.
pub fn execute_modules(args: ReportArgs) -> Result<()> {
    let log = load_blocks(&args)?;

    let mut rows = aggregate_by_module(&log);
    sort_modules(&mut rows);
    if let Some(top) = args.top {
        rows.truncate(top);
    }

    render_modules(&rows, &mut std::io::stdout().lock()).context("failed to write report")?;

    if let Some(path) = &args.json {
        let report = Report::from_modules(&args.input.display().to_string(), &rows);
        write_report(&report, path).context("failed to write JSON report")?;
    }

    show_skips(&log.skipped, args.verbose);
    Ok(())
}

/// Execute the per-(module, order) report.
pub fn execute_module_orders(args: ReportArgs) -> Result<()> {
    let log = load_blocks(&args)?;

    let mut rows = aggregate_by_module_order(&log);
    sort_module_orders(&mut rows);

    render_module_orders(&rows, &mut std::io::stdout().lock())
        .context("failed to write report")?;

    if let Some(path) = &args.json {
        let report = Report::from_module_orders(&args.input.display().to_string(), &rows);
        write_report(&report, path).context("failed to write JSON report")?;
    }

    show_skips(&log.skipped, args.verbose);
    Ok(())
}

/// Execute the per-order totals report.
///
/// Uses the loose single-line scanner rather than the block state
/// machine, so it also works on dumps reduced to header lines only.
pub fn execute_orders(args: ReportArgs) -> Result<()> {
    let reader = open_input(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;

    let orders = scan_orders(reader).context("failed to scan page_owner dump")?;
    info!("found {} allocation lines", orders.len());

    let totals = fold_orders(&orders);

    render_orders(&totals, &mut std::io::stdout().lock()).context("failed to write report")?;

    if let Some(path) = &args.json {
        let report = Report::from_orders(&args.input.display().to_string(), &totals);
        write_report(&report, path).context("failed to write JSON report")?;
    }

    Ok(())
}

/// Execute the per-process report.
pub fn execute_processes(args: ReportArgs) -> Result<()> {
    let log = load_blocks(&args)?;

    if !log.has_process_info() {
        println!("Process-level allocation data not found in this dump format.");
        return Ok(());
    }

    let mut rows = aggregate_by_process(&log);
    sort_processes(&mut rows);
    rows.truncate(args.top.unwrap_or(DEFAULT_TOP_PROCESSES));

    render_processes(&rows, args.unit, &mut std::io::stdout().lock())
        .context("failed to write report")?;

    show_skips(&log.skipped, args.verbose);
    Ok(())
}

//! pageowner CLI
//!
//! Aggregated reports from Linux kernel page_owner dumps: pages and
//! allocation counts grouped by module, order, process, or call trace.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use pageowner_analyzer::commands::{
    execute_module_orders, execute_modules, execute_orders, execute_processes, execute_summary,
    execute_traces, validate_args, ReportArgs,
};
use pageowner_analyzer::output::Unit;
use pageowner_analyzer::utils::config::SCHEMA_VERSION;

/// pageowner - aggregated reports from kernel page_owner dumps
#[derive(Parser, Debug)]
#[command(name = "pageowner")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging and skip statistics
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Pages and allocation counts grouped by kernel module
    Modules {
        /// page_owner dump to analyze
        file: PathBuf,

        /// Only show the N largest consumers
        #[arg(long)]
        top: Option<usize>,

        /// Also write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Pages and allocation counts grouped by module and order
    ModuleOrders {
        /// page_owner dump to analyze
        file: PathBuf,

        /// Also write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Page totals per allocation order
    Orders {
        /// page_owner dump to analyze
        file: PathBuf,

        /// Also write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Pages and allocation counts grouped by allocating process
    Processes {
        /// page_owner dump to analyze
        file: PathBuf,

        /// Only show the N largest consumers
        #[arg(long)]
        top: Option<usize>,

        #[command(flatten)]
        unit: UnitFlags,
    },

    /// Most frequently seen call traces
    Traces {
        /// page_owner dump to analyze
        file: PathBuf,

        /// Number of trace groups to show
        #[arg(long)]
        top: Option<usize>,

        #[command(flatten)]
        unit: UnitFlags,
    },

    /// Whole-dump totals
    Summary {
        /// page_owner dump to analyze
        file: PathBuf,

        #[command(flatten)]
        unit: UnitFlags,
    },

    /// Display version information
    Version,
}

/// Display unit selection, kB when no flag is given
#[derive(Args, Debug, Clone, Copy, Default)]
struct UnitFlags {
    /// Show memory in kB
    #[arg(short = 'K', overrides_with_all = ["kb", "mb", "gb"])]
    kb: bool,

    /// Show memory in MB
    #[arg(short = 'M', overrides_with_all = ["kb", "mb", "gb"])]
    mb: bool,

    /// Show memory in GB
    #[arg(short = 'G', overrides_with_all = ["kb", "mb", "gb"])]
    gb: bool,
}

impl UnitFlags {
    fn unit(self) -> Unit {
        if self.gb {
            Unit::Gigabytes
        } else if self.mb {
            Unit::Megabytes
        } else {
            Unit::Kilobytes
        }
    }
}

fn main() -> Result<()> {
    // Argument errors exit 1 rather than clap's default 2; help and
    // version output still exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = i32::from(err.use_stderr());
            let _ = err.print();
            std::process::exit(code);
        }
    };

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Modules { file, top, json } => {
            let args = ReportArgs {
                input: file,
                top,
                json,
                verbose: cli.verbose,
                ..Default::default()
            };
            validate_args(&args)?;
            execute_modules(args)?;
        }

        Commands::ModuleOrders { file, json } => {
            let args = ReportArgs {
                input: file,
                json,
                verbose: cli.verbose,
                ..Default::default()
            };
            validate_args(&args)?;
            execute_module_orders(args)?;
        }

        Commands::Orders { file, json } => {
            let args = ReportArgs {
                input: file,
                json,
                verbose: cli.verbose,
                ..Default::default()
            };
            validate_args(&args)?;
            execute_orders(args)?;
        }

        Commands::Processes { file, top, unit } => {
            let args = ReportArgs {
                input: file,
                top,
                unit: unit.unit(),
                verbose: cli.verbose,
                ..Default::default()
            };
            validate_args(&args)?;
            execute_processes(args)?;
        }

        Commands::Traces { file, top, unit } => {
            let args = ReportArgs {
                input: file,
                top,
                unit: unit.unit(),
                verbose: cli.verbose,
                ..Default::default()
            };
            validate_args(&args)?;
            execute_traces(args)?;
        }

        Commands::Summary { file, unit } => {
            let args = ReportArgs {
                input: file,
                unit: unit.unit(),
                verbose: cli.verbose,
                ..Default::default()
            };
            validate_args(&args)?;
            execute_summary(args)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("pageowner v{}", env!("CARGO_PKG_VERSION"));
    println!("Report schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Aggregated reports from Linux kernel page_owner dumps.");
}

//! CLI command implementations.
//!
//! Each report is implemented in its own module. Commands orchestrate
//! the parser, aggregator, and report renderers.

pub mod report;
pub mod summary;
pub mod traces;

// Re-export main command functions
pub use report::{
    execute_module_orders, execute_modules, execute_orders, execute_processes, open_input,
    validate_args, ReportArgs,
};
pub use summary::execute_summary;
pub use traces::execute_traces;

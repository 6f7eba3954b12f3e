//! Report rendering: fixed-width text tables and the JSON export.

pub mod json;
pub mod schema;
pub mod table;
pub mod traces;
pub mod units;

// Re-export main types and functions
pub use json::{read_report, write_report};
pub use schema::{Report, ReportRow};
pub use table::{
    render_module_orders, render_modules, render_orders, render_processes, sort_module_orders,
    sort_modules, sort_processes,
};
pub use traces::render_traces;
pub use units::Unit;

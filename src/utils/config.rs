//! Configuration and constants for the CLI.

/// Current JSON report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Base page size assumed by every report (kernel default, 4 KiB)
pub const PAGE_SIZE_KB: u64 = 4;

/// Token that opens a multi-line allocation block
pub const ALLOC_HEADER_TOKEN: &str = "Page allocated";

/// Prefix of per-page metadata lines; these carry flags, not trace frames
pub const PFN_LINE_PREFIX: &str = "PFN";

/// First field of the single-line dump form
pub const ORDER_LINE_TOKEN: &str = "Page";

/// Zero-based position of the order in the single-line form
pub const ORDER_FIELD_INDEX: usize = 4;

/// Orders at or above this cannot be represented as a u64 page count
pub const MAX_ORDER: u32 = 64;

/// Default row count for the top-processes report
pub const DEFAULT_TOP_PROCESSES: usize = 10;

/// Default group count for the call-trace report
pub const DEFAULT_TOP_TRACES: usize = 3;

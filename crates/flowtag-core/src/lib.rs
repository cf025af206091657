//! flowtag core library for flow-log classification.
//!
//! This crate implements the offline pipeline used by the CLI: reference
//! tables (protocol numbers and the port/protocol lookup) are loaded once,
//! then a line source feeds flow-log records through a pure classifier whose
//! outcomes are folded into counters and finally into a deterministic report.
//! Parsing is side-effect free; all I/O is isolated in `source` and in the
//! table loaders.
//!
//! Invariants:
//! - Malformed flow-log lines and malformed reference rows are skipped, never fatal.
//! - Unknown protocol numbers fall back to their decimal label.
//! - Unmatched (protocol, port) pairs are tagged [`UNTAGGED`].
//! - The flow log is read one line at a time and never buffered in full.
//! - Report outputs are deterministic and stable across runs.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use flowtag_core::analyze_flow_log_file;
//!
//! let report = analyze_flow_log_file(
//!     Path::new("flow_log.txt"),
//!     Path::new("lookup.csv"),
//!     Path::new("protocol_numbers.csv"),
//! )?;
//! for entry in &report.tags {
//!     println!("{},{}", entry.tag, entry.count);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod flowlog;
mod render;
mod source;
mod tables;

pub use analysis::{
    Aggregator, AnalysisError, Counts, analyze_flow_log_file, analyze_source, run_pipeline,
};
pub use flowlog::{
    Classification, FlowLogError, FlowRecord, Outcome, SkipReason, UNTAGGED, classify,
    parse_flow_record,
};
pub use render::render_text;
pub use source::{BufReadSource, FlowLogFileSource, LineSource, SourceError};
pub use tables::{
    LookupKey, LookupTable, ProtocolTable, TableError, load_lookup_table, load_protocol_table,
};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no flow record carried a usable time.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Aggregated classification report with deterministic ordering.
///
/// # Examples
/// ```
/// use flowtag_core::{InputInfo, make_stub_report};
///
/// let report = make_stub_report(InputInfo::default());
/// assert_eq!(report.report_version, flowtag_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,
    /// Input file metadata.
    pub input: InputInfo,
    /// Line-level summary of the run.
    pub summary: RunSummary,
    /// Per-tag counts, sorted case-insensitively by tag.
    pub tags: Vec<TagCount>,
    /// Per (port, protocol) counts, sorted by port then protocol.
    pub port_protocols: Vec<PortProtocolCount>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "flowtag").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input metadata embedded in reports.
///
/// # Examples
/// ```
/// use flowtag_core::InputInfo;
///
/// let input = InputInfo {
///     flow_log: "flow_log.txt".to_string(),
///     lookup_table: "lookup.csv".to_string(),
///     protocol_numbers: "protocol_numbers.csv".to_string(),
///     bytes: 1024,
/// };
/// assert_eq!(input.bytes, 1024);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputInfo {
    /// Flow-log path as provided to the classifier.
    pub flow_log: String,
    /// Lookup table path.
    pub lookup_table: String,
    /// Protocol numbers table path.
    pub protocol_numbers: String,
    /// Flow-log size in bytes.
    pub bytes: u64,
}

/// Line counters and observed time range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Lines read from the flow log (including blank and malformed lines).
    pub lines_total: u64,
    /// Records that produced a classification.
    pub records_classified: u64,
    /// Lines skipped as blank, comments, or malformed.
    pub records_skipped: u64,
    /// RFC3339 start time of the earliest classified record (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 end time of the latest classified record (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Number of records that received a tag.
///
/// # Examples
/// ```
/// use flowtag_core::TagCount;
///
/// let entry = TagCount {
///     tag: "sv_P1".to_string(),
///     count: 2,
/// };
/// assert_eq!(entry.tag, "sv_P1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    /// Tag as written in the lookup table, or `Untagged`.
    pub tag: String,
    /// Number of classified records carrying this tag.
    pub count: u64,
}

/// Number of records seen for a destination port and protocol name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortProtocolCount {
    /// Destination port.
    pub port: u16,
    /// Lowercase protocol name, or the decimal protocol number when unknown.
    pub protocol: String,
    /// Number of classified records for this combination.
    pub count: u64,
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use flowtag_core::{InputInfo, make_stub_report};
///
/// let report = make_stub_report(InputInfo::default());
/// assert!(report.tags.is_empty());
/// assert!(report.port_protocols.is_empty());
/// ```
pub fn make_stub_report(input: InputInfo) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "flowtag".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input,
        summary: RunSummary::default(),
        tags: vec![],
        port_protocols: vec![],
    }
}

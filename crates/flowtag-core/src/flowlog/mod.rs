//! Flow-log record decoding and classification.
//!
//! The module follows a layered structure:
//! - `layout`: field positions of the fixed 14-field format (source of truth)
//! - `reader`: whitespace tokenizing and numeric field access
//! - `parser`: record extraction and classification against reference tables
//! - `error`: explicit reasons a line was rejected
//!
//! Classification is pure and contains no I/O. Malformed lines become
//! `Outcome::Skipped` and never abort a run.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::FlowLogError;
pub use layout::UNTAGGED;
pub use parser::{Classification, FlowRecord, Outcome, SkipReason, classify, parse_flow_record};

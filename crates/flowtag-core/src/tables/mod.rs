//! Reference tables loaded once before classification.
//!
//! Two immutable structures are built from CSV data:
//! - `protocol`: protocol number -> lowercase protocol name
//! - `lookup`: (lowercase protocol, destination port) -> tag
//!
//! Loading is tolerant: rows that fail to parse are skipped and logged at
//! `debug`. Only an unreadable source aborts the load. Row tokenizing and
//! field conventions live in `reader`.

pub mod error;
pub mod lookup;
pub mod protocol;
pub(crate) mod reader;

pub use error::TableError;
pub use lookup::{LookupKey, LookupTable, load_lookup_table};
pub use protocol::{ProtocolTable, load_protocol_table};

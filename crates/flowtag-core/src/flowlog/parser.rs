use std::borrow::Cow;

use super::error::FlowLogError;
use super::layout;
use super::reader::FlowLogReader;
use crate::tables::{LookupTable, ProtocolTable};

/// Fields extracted from one flow-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowRecord {
    pub dst_port: u16,
    pub protocol: u64,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

/// Decode a flow-log line.
///
/// Returns `Ok(None)` for blank lines and `#` comments.
pub fn parse_flow_record(line: &str) -> Result<Option<FlowRecord>, FlowLogError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(layout::COMMENT_PREFIX) {
        return Ok(None);
    }

    let reader = FlowLogReader::new(line);
    reader.require_fields(layout::MIN_FIELDS)?;
    let dst_port = reader.read_dst_port()?;
    let protocol = reader.read_protocol()?;

    Ok(Some(FlowRecord {
        dst_port,
        protocol,
        start: reader.read_timestamp(layout::START_FIELD),
        end: reader.read_timestamp(layout::END_FIELD),
    }))
}

/// Why a line produced no classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty line or `#` comment.
    Blank,
    /// Line could not be decoded as a record.
    Malformed(FlowLogError),
}

/// A record resolved against the reference tables.
///
/// Borrows the tag and known protocol names from the tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'t> {
    pub tag: &'t str,
    pub port: u16,
    pub protocol: Cow<'t, str>,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<'t> {
    Classified(Classification<'t>),
    Skipped(SkipReason),
}

/// Classify one raw flow-log line.
///
/// The destination port (token 7) and protocol number (token 8) are resolved
/// to a protocol name and then to a tag. Unknown protocol numbers use their
/// decimal label and unmatched keys are tagged `Untagged`.
///
/// # Examples
/// ```
/// use flowtag_core::{LookupTable, Outcome, ProtocolTable, classify};
///
/// let protocols = ProtocolTable::from_rows([["6", "tcp"]]);
/// let lookup = LookupTable::from_rows([["25", "tcp", "sv_P1"]]);
/// let line = "2 123456789012 eni-4d3c2b1a 192.168.1.100 203.0.113.101 23 25 6 18 14000 1620140761 1620140821 REJECT OK";
///
/// match classify(line, &protocols, &lookup) {
///     Outcome::Classified(c) => assert_eq!(c.tag, "sv_P1"),
///     Outcome::Skipped(reason) => panic!("skipped: {reason:?}"),
/// }
/// ```
pub fn classify<'t>(
    line: &str,
    protocols: &'t ProtocolTable,
    lookup: &'t LookupTable,
) -> Outcome<'t> {
    let record = match parse_flow_record(line) {
        Ok(Some(record)) => record,
        Ok(None) => return Outcome::Skipped(SkipReason::Blank),
        Err(err) => return Outcome::Skipped(SkipReason::Malformed(err)),
    };

    let protocol = protocols.name_for(record.protocol);
    let tag = lookup
        .tag_for(&protocol, record.dst_port)
        .unwrap_or(layout::UNTAGGED);

    Outcome::Classified(Classification {
        tag,
        port: record.dst_port,
        protocol,
        start: record.start,
        end: record.end,
    })
}

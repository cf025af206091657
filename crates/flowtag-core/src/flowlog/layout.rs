//! Default (version 2) flow-log record layout.
//!
//! `version account-id interface-id srcaddr dstaddr srcport dstport protocol
//! packets bytes start end action log-status`
//!
//! Indices below are 0-based token positions.

pub const MIN_FIELDS: usize = 14;

pub const DST_PORT_FIELD: usize = 6;
pub const PROTOCOL_FIELD: usize = 7;
pub const START_FIELD: usize = 10;
pub const END_FIELD: usize = 11;

pub const COMMENT_PREFIX: char = '#';

/// Tag assigned when no lookup entry matches.
pub const UNTAGGED: &str = "Untagged";

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::info;

use super::error::TableError;
use super::reader::{RowOutcome, non_empty, parse_number, read_rows};

/// Header cell that marks the first lookup row as column names.
const HEADER_PORT_COLUMN: &str = "dstport";

/// Composite lookup key: lowercase protocol name and destination port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey {
    pub protocol: String,
    pub port: u16,
}

impl LookupKey {
    pub fn new(protocol: &str, port: u16) -> Self {
        Self {
            protocol: protocol.trim().to_lowercase(),
            port,
        }
    }
}

/// (protocol, destination port) to tag mapping.
///
/// Protocol names match case-insensitively; tags keep their original case.
///
/// # Examples
/// ```
/// use flowtag_core::LookupTable;
///
/// let table = LookupTable::from_rows([["25", "tcp", "sv_P1"]]);
/// assert_eq!(table.tag_for("TCP", 25), Some("sv_P1"));
/// assert_eq!(table.tag_for("udp", 25), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTable {
    /// Port, then lowercase protocol name, to tag.
    tags: HashMap<u16, HashMap<String, String>>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows of `(dstport, protocol, tag)`.
    ///
    /// Rows with a non-numeric port or a blank protocol/tag are ignored.
    /// A later row with the same key overrides the earlier one.
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Build a table from CSV data, skipping a `dstport,...` header row.
    ///
    /// # Errors
    /// Returns `TableError` when the reader fails; malformed rows are skipped.
    pub fn from_reader<R: Read>(source: R) -> Result<Self, TableError> {
        let mut table = Self::new();
        let stats = read_rows("lookup", source, |index, record| {
            if index == 0 && is_header(record) {
                return RowOutcome::Header;
            }
            if table.push_row(record) {
                RowOutcome::Accepted
            } else {
                RowOutcome::Skipped
            }
        })?;
        info!(
            entries = table.len(),
            accepted = stats.accepted,
            skipped = stats.skipped,
            "Loaded lookup table"
        );
        Ok(table)
    }

    pub fn insert(&mut self, port: u16, protocol: &str, tag: &str) {
        let key = LookupKey::new(protocol, port);
        self.tags
            .entry(key.port)
            .or_default()
            .insert(key.protocol, tag.trim().to_string());
    }

    /// Find the tag for a protocol name and destination port.
    ///
    /// The protocol is matched case-insensitively. Names that are already
    /// trimmed and lowercase are looked up without allocating.
    pub fn tag_for(&self, protocol: &str, port: u16) -> Option<&str> {
        let by_protocol = self.tags.get(&port)?;
        by_protocol
            .get(normalize_protocol(protocol).as_ref())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    fn push_row<R, S>(&mut self, row: R) -> bool
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = row.into_iter();
        let (port, protocol, tag) = (fields.next(), fields.next(), fields.next());
        let port = parse_number::<u16>(port.as_ref().map(|f| f.as_ref()));
        let protocol = non_empty(protocol.as_ref().map(|f| f.as_ref()));
        let tag = non_empty(tag.as_ref().map(|f| f.as_ref()));
        match (port, protocol, tag) {
            (Some(port), Some(protocol), Some(tag)) => {
                self.insert(port, protocol, tag);
                true
            }
            _ => false,
        }
    }
}

fn normalize_protocol(protocol: &str) -> Cow<'_, str> {
    let trimmed = protocol.trim();
    if trimmed.chars().flat_map(char::to_lowercase).eq(trimmed.chars()) {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(trimmed.to_lowercase())
    }
}

fn is_header(record: &StringRecord) -> bool {
    record
        .get(0)
        .is_some_and(|cell| cell.trim().eq_ignore_ascii_case(HEADER_PORT_COLUMN))
}

/// Load the lookup table from a CSV file.
///
/// # Errors
/// Returns `TableError::Io` when the file cannot be opened.
pub fn load_lookup_table(path: &Path) -> Result<LookupTable, TableError> {
    let file = File::open(path)?;
    LookupTable::from_reader(file)
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::{LookupTable, normalize_protocol};

    #[test]
    fn protocol_matches_case_insensitively() {
        let table = LookupTable::from_rows([["443", "TCP", "sv_P2"]]);
        assert_eq!(table.tag_for("tcp", 443), Some("sv_P2"));
        assert_eq!(table.tag_for("Tcp", 443), Some("sv_P2"));
        assert_eq!(table.tag_for("tcp", 80), None);
    }

    #[test]
    fn lowercase_protocol_is_looked_up_borrowed() {
        assert!(matches!(normalize_protocol("tcp"), Cow::Borrowed("tcp")));
        assert!(matches!(normalize_protocol(" udp "), Cow::Borrowed("udp")));
        assert!(matches!(normalize_protocol("17"), Cow::Borrowed("17")));
        assert_eq!(normalize_protocol("TCP"), "tcp");
        assert!(matches!(normalize_protocol("Icmp"), Cow::Owned(_)));

        let table = LookupTable::from_rows([["25", "tcp", "sv_P1"], ["25", "udp", "sv_P2"]]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.tag_for("tcp", 25), Some("sv_P1"));
        assert_eq!(table.tag_for(" UDP", 25), Some("sv_P2"));
        assert_eq!(table.tag_for("icmp", 25), None);
    }

    #[test]
    fn tag_case_is_preserved() {
        let table = LookupTable::from_rows([["993", "tcp", " Email "]]);
        assert_eq!(table.tag_for("tcp", 993), Some("Email"));
    }

    #[test]
    fn duplicate_keys_keep_last_row() {
        let table = LookupTable::from_rows([["25", "tcp", "sv_P1"], ["25", "TCP", "mail"]]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.tag_for("tcp", 25), Some("mail"));
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let table = LookupTable::from_rows(vec![
            vec!["http", "tcp", "web"],
            vec!["80", "", "web"],
            vec!["80", "tcp", ""],
            vec!["80", "tcp"],
            vec!["70000", "tcp", "too_big"],
            vec!["80", "tcp", "web"],
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.tag_for("tcp", 80), Some("web"));
    }

    #[test]
    fn from_reader_detects_header_row() {
        let csv = "DstPort,Protocol,Tag\n25,tcp,sv_P1\n68,udp,sv_P2\n";
        let table = LookupTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.tag_for("udp", 68), Some("sv_P2"));
    }

    #[test]
    fn from_reader_keeps_first_row_without_header() {
        let csv = "25,tcp,sv_P1\n 68 , UDP , sv_P2 \n";
        let table = LookupTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.tag_for("tcp", 25), Some("sv_P1"));
        assert_eq!(table.tag_for("udp", 68), Some("sv_P2"));
    }

    #[test]
    fn from_reader_ignores_extra_columns() {
        let csv = "dstport,protocol,tag,comment\n143,tcp,email,imap\n";
        let table = LookupTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.tag_for("tcp", 143), Some("email"));
    }
}

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use super::error::TableError;
use super::reader::{RowOutcome, non_empty, parse_number, read_rows};

/// Protocol number to lowercase protocol name, built from IANA-style rows.
///
/// # Examples
/// ```
/// use flowtag_core::ProtocolTable;
///
/// let table = ProtocolTable::from_rows([["6", "TCP"], ["17", "UDP"]]);
/// assert_eq!(table.name_for(6), "tcp");
/// assert_eq!(table.name_for(99), "99");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolTable {
    names: HashMap<u64, String>,
}

impl ProtocolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows of `(number, name, ...)`.
    ///
    /// Rows whose first field is not a non-negative integer or whose second
    /// field is blank are ignored. Later rows override earlier ones.
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

    /// Build a table from CSV data. A leading header row is skipped.
    ///
    /// # Errors
    /// Returns `TableError` when the reader fails; malformed rows are skipped.
    pub fn from_reader<R: Read>(source: R) -> Result<Self, TableError> {
        let mut table = Self::new();
        let stats = read_rows("protocol_numbers", source, |index, record| {
            match (table.push_row(record), index) {
                (true, _) => RowOutcome::Accepted,
                (false, 0) => RowOutcome::Header,
                (false, _) => RowOutcome::Skipped,
            }
        })?;
        info!(
            entries = table.len(),
            accepted = stats.accepted,
            skipped = stats.skipped,
            "Loaded protocol table"
        );
        Ok(table)
    }

    /// Insert a mapping, normalizing the name to lowercase.
    pub fn insert(&mut self, number: u64, name: &str) {
        self.names.insert(number, name.trim().to_lowercase());
    }

    /// Resolve a protocol number to its name.
    ///
    /// Unknown numbers degrade to their decimal label.
    pub fn name_for(&self, number: u64) -> Cow<'_, str> {
        match self.names.get(&number) {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Owned(number.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn push_row<R, S>(&mut self, row: R) -> bool
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = row.into_iter();
        let (number, name) = (fields.next(), fields.next());
        let number = parse_number::<u64>(number.as_ref().map(|f| f.as_ref()));
        let name = non_empty(name.as_ref().map(|f| f.as_ref()));
        match (number, name) {
            (Some(number), Some(name)) => {
                self.insert(number, name);
                true
            }
            _ => false,
        }
    }
}

/// Load the protocol numbers table from a CSV file.
///
/// # Errors
/// Returns `TableError::Io` when the file cannot be opened.
pub fn load_protocol_table(path: &Path) -> Result<ProtocolTable, TableError> {
    let file = File::open(path)?;
    ProtocolTable::from_reader(file)
}

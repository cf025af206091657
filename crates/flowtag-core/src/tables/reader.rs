use std::io::Read;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use super::error::TableError;

/// Disposition of one CSV row offered to a table builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowOutcome {
    Accepted,
    Header,
    Skipped,
}

/// Row tallies collected while loading a table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RowStats {
    pub accepted: usize,
    pub skipped: usize,
}

/// Stream CSV rows from `source` into `accept`, one row at a time.
///
/// Rows are trimmed and may have any number of fields. Rows the CSV layer
/// cannot decode (e.g., invalid UTF-8) are skipped like any other malformed
/// row; only I/O failures abort the load.
///
/// # Errors
/// Returns `TableError::Csv` when the underlying reader fails.
pub(crate) fn read_rows<R, F>(
    table: &'static str,
    source: R,
    mut accept: F,
) -> Result<RowStats, TableError>
where
    R: Read,
    F: FnMut(usize, &StringRecord) -> RowOutcome,
{
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);

    let mut stats = RowStats::default();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                debug!(table, line = index + 1, error = %err, "Skipping undecodable row");
                stats.skipped += 1;
                continue;
            }
        };
        match accept(index, &record) {
            RowOutcome::Accepted => stats.accepted += 1,
            RowOutcome::Header => {}
            RowOutcome::Skipped => {
                debug!(table, line = index + 1, row = ?record, "Skipping malformed row");
                stats.skipped += 1;
            }
        }
    }
    Ok(stats)
}

/// Parse a trimmed field as a number, rejecting blanks and signs.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// assert_eq!(parse_number::<u16>(Some(" 443 ")), Some(443));
/// assert_eq!(parse_number::<u16>(Some("-1")), None);
/// assert_eq!(parse_number::<u16>(None), None);
/// ```
pub(crate) fn parse_number<T: FromStr>(field: Option<&str>) -> Option<T> {
    let field = field?.trim();
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Return the trimmed field when it is present and not empty.
pub(crate) fn non_empty(field: Option<&str>) -> Option<&str> {
    field.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{RowOutcome, non_empty, parse_number, read_rows};

    #[test]
    fn parse_number_accepts_padded_digits() {
        assert_eq!(parse_number::<u16>(Some(" 443 ")), Some(443));
        assert_eq!(parse_number::<u32>(Some("0")), Some(0));
    }

    #[test]
    fn parse_number_rejects_signs_blanks_and_overflow() {
        assert_eq!(parse_number::<u16>(Some("-1")), None);
        assert_eq!(parse_number::<u16>(Some("+1")), None);
        assert_eq!(parse_number::<u16>(Some("")), None);
        assert_eq!(parse_number::<u16>(Some("65536")), None);
        assert_eq!(parse_number::<u16>(None), None);
    }

    #[test]
    fn non_empty_trims_and_filters() {
        assert_eq!(non_empty(Some("  tcp ")), Some("tcp"));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn read_rows_counts_outcomes() {
        let data = "header,x\n1,a\nbad\n2,b\n";
        let stats = read_rows("test", data.as_bytes(), |index, record| {
            if index == 0 {
                RowOutcome::Header
            } else if record.len() < 2 {
                RowOutcome::Skipped
            } else {
                RowOutcome::Accepted
            }
        })
        .unwrap();
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn read_rows_skips_invalid_utf8_rows() {
        let data: &[u8] = b"1,a\n2,\xff\xfe\n3,c\n";
        let mut seen = Vec::new();
        let stats = read_rows("test", data, |_, record| {
            seen.push(record.get(0).unwrap_or("").to_string());
            RowOutcome::Accepted
        })
        .unwrap();
        assert_eq!(seen, vec!["1", "3"]);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.skipped, 1);
    }
}

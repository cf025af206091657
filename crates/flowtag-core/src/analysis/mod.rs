use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, info};

use crate::flowlog::{Outcome, classify};
use crate::source::{FlowLogFileSource, LineSource, SourceError};
use crate::tables::{
    LookupTable, ProtocolTable, TableError, load_lookup_table, load_protocol_table,
};
use crate::{DEFAULT_GENERATED_AT, InputInfo, Report, RunSummary, make_stub_report};

mod counts;

pub use counts::{Aggregator, Counts};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("failed to load {table} table: {source}")]
    Table {
        table: &'static str,
        #[source]
        source: TableError,
    },
}

/// Load both reference tables and classify a flow-log file.
///
/// # Errors
/// Returns `AnalysisError` when any of the three inputs cannot be read.
pub fn analyze_flow_log_file(
    flow_log: &Path,
    lookup_table: &Path,
    protocol_numbers: &Path,
) -> Result<Report, AnalysisError> {
    let lookup = load_lookup_table(lookup_table).map_err(|source| AnalysisError::Table {
        table: "lookup",
        source,
    })?;
    let protocols =
        load_protocol_table(protocol_numbers).map_err(|source| AnalysisError::Table {
            table: "protocol numbers",
            source,
        })?;

    let source = FlowLogFileSource::open(flow_log)?;
    let input = InputInfo {
        flow_log: flow_log.display().to_string(),
        lookup_table: lookup_table.display().to_string(),
        protocol_numbers: protocol_numbers.display().to_string(),
        bytes: flow_log.metadata()?.len(),
    };
    analyze_source(input, source, &protocols, &lookup)
}

/// Classify every line of `source` and build a report.
pub fn analyze_source<S: LineSource>(
    input: InputInfo,
    source: S,
    protocols: &ProtocolTable,
    lookup: &LookupTable,
) -> Result<Report, AnalysisError> {
    let counts = run_pipeline(source, protocols, lookup)?;

    let mut report = make_stub_report(input);
    report.summary = RunSummary {
        lines_total: counts.lines_total(),
        records_classified: counts.classified,
        records_skipped: counts.skipped,
        time_start: ts_to_rfc3339(counts.first_start),
        time_end: ts_to_rfc3339(counts.last_end),
    };
    report.generated_at = report
        .summary
        .time_end
        .clone()
        .or_else(|| report.summary.time_start.clone())
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.tags = counts.tag_summaries();
    report.port_protocols = counts.port_protocol_summaries();
    Ok(report)
}

/// Stream `source` through the classifier, one line at a time.
///
/// # Errors
/// Returns `SourceError` when reading the source fails; malformed lines are
/// counted as skipped.
pub fn run_pipeline<S: LineSource>(
    mut source: S,
    protocols: &ProtocolTable,
    lookup: &LookupTable,
) -> Result<Counts, SourceError> {
    let mut aggregator = Aggregator::new();
    let mut line_number = 0u64;

    while let Some(line) = source.next_line()? {
        line_number += 1;
        let outcome = classify(line, protocols, lookup);
        if let Outcome::Skipped(reason) = &outcome {
            debug!(line = line_number, ?reason, "Skipping flow-log line");
        }
        aggregator.record(&outcome);
    }

    let counts = aggregator.into_counts();
    info!(
        lines = counts.lines_total(),
        classified = counts.classified,
        skipped = counts.skipped,
        tags = counts.tags.len(),
        "Processed flow log"
    );
    Ok(counts)
}

fn ts_to_rfc3339(ts: Option<i64>) -> Option<String> {
    let ts = ts?;
    OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

#[cfg(test)]
mod tests {
    use super::{analyze_source, run_pipeline, ts_to_rfc3339};
    use crate::source::BufReadSource;
    use crate::tables::{LookupTable, ProtocolTable};
    use crate::{DEFAULT_GENERATED_AT, InputInfo};

    const FLOW_LOG: &str = "\
2 123456789012 eni-0a1b2c3d 10.0.1.201 198.51.100.2 443 49153 6 25 20000 1620140761 1620140821 ACCEPT OK
2 123456789012 eni-4d3c2b1a 192.168.1.100 203.0.113.101 23 25 6 18 14000 1620140661 1620140721 REJECT OK

# truncated record below
2 123456789012 eni-5e6f7g8h
2 123456789012 eni-9h8g7f6e 172.16.0.100 203.0.113.102 110 995 99 9 12000 1620140800 1620140900 ACCEPT OK
2 123456789012 eni-1a2b3c4d 192.168.0.1 203.0.113.12 1024 25 6 10 5000 1620140900 1620141000 ACCEPT OK
";

    fn tables() -> (ProtocolTable, LookupTable) {
        (
            ProtocolTable::from_rows([["6", "tcp"], ["17", "udp"]]),
            LookupTable::from_rows([["25", "TCP", "sv_P1"], ["443", "tcp", "sv_P2"]]),
        )
    }

    #[test]
    fn pipeline_counts_tags_and_pairs() {
        let (protocols, lookup) = tables();
        let counts =
            run_pipeline(BufReadSource::new(FLOW_LOG.as_bytes()), &protocols, &lookup).unwrap();

        assert_eq!(counts.tags.get("sv_P1"), Some(&2));
        assert_eq!(counts.tags.get("Untagged"), Some(&2));
        assert_eq!(counts.tags.len(), 2);
        assert_eq!(counts.port_protocols.get(&(25, "tcp".to_string())), Some(&2));
        assert_eq!(counts.port_protocols.get(&(49153, "tcp".to_string())), Some(&1));
        assert_eq!(counts.port_protocols.get(&(995, "99".to_string())), Some(&1));
        assert_eq!(counts.classified, 4);
        assert_eq!(counts.skipped, 3);
    }

    #[test]
    fn empty_source_yields_empty_counts() {
        let (protocols, lookup) = tables();
        let counts = run_pipeline(BufReadSource::new(&b""[..]), &protocols, &lookup).unwrap();
        assert!(counts.tags.is_empty());
        assert!(counts.port_protocols.is_empty());
        assert_eq!(counts.lines_total(), 0);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let (protocols, lookup) = tables();
        let first =
            run_pipeline(BufReadSource::new(FLOW_LOG.as_bytes()), &protocols, &lookup).unwrap();
        let second =
            run_pipeline(BufReadSource::new(FLOW_LOG.as_bytes()), &protocols, &lookup).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn report_is_sorted_and_summarized() {
        let (protocols, lookup) = tables();
        let report = analyze_source(
            InputInfo::default(),
            BufReadSource::new(FLOW_LOG.as_bytes()),
            &protocols,
            &lookup,
        )
        .unwrap();

        let tags: Vec<_> = report.tags.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(tags, vec!["sv_P1", "Untagged"]);
        let ports: Vec<_> = report.port_protocols.iter().map(|p| p.port).collect();
        assert_eq!(ports, vec![25, 995, 49153]);

        assert_eq!(report.summary.lines_total, 7);
        assert_eq!(report.summary.records_classified, 4);
        assert_eq!(report.summary.records_skipped, 3);
        assert_eq!(
            report.summary.time_start.as_deref(),
            Some("2021-05-04T15:04:21Z")
        );
        assert_eq!(
            report.summary.time_end.as_deref(),
            Some("2021-05-04T15:10:00Z")
        );
        assert_eq!(report.generated_at, "2021-05-04T15:10:00Z");
    }

    #[test]
    fn report_without_timestamps_uses_default_generated_at() {
        let (protocols, lookup) = tables();
        let report = analyze_source(
            InputInfo::default(),
            BufReadSource::new(&b""[..]),
            &protocols,
            &lookup,
        )
        .unwrap();
        assert_eq!(report.generated_at, DEFAULT_GENERATED_AT);
        assert!(report.tags.is_empty());
    }

    #[test]
    fn rfc3339_conversion() {
        assert_eq!(ts_to_rfc3339(Some(0)).as_deref(), Some("1970-01-01T00:00:00Z"));
        assert_eq!(ts_to_rfc3339(None), None);
    }
}

use std::collections::HashMap;

use crate::flowlog::{Classification, Outcome};
use crate::{PortProtocolCount, TagCount};

/// Counters folded from classification outcomes.
///
/// # Examples
/// ```
/// use flowtag_core::{Aggregator, LookupTable, ProtocolTable, classify};
///
/// let protocols = ProtocolTable::from_rows([["6", "tcp"]]);
/// let lookup = LookupTable::from_rows([["25", "tcp", "sv_P1"]]);
/// let line = "2 1 eni-1 10.0.0.1 10.0.0.2 1024 25 6 1 60 1620140761 1620140821 ACCEPT OK";
///
/// let mut aggregator = Aggregator::new();
/// aggregator.record(&classify(line, &protocols, &lookup));
/// assert_eq!(aggregator.tag_counts().get("sv_P1"), Some(&1));
/// ```
#[derive(Debug, Default, Clone)]
pub struct Aggregator {
    counts: Counts,
}

/// Snapshot of the aggregated counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Counts {
    pub tags: HashMap<String, u64>,
    pub port_protocols: HashMap<(u16, String), u64>,
    pub classified: u64,
    pub skipped: u64,
    pub first_start: Option<i64>,
    pub last_end: Option<i64>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the counters. Skipped lines leave both maps untouched.
    pub fn record(&mut self, outcome: &Outcome<'_>) {
        match outcome {
            Outcome::Classified(classification) => self.record_classified(classification),
            Outcome::Skipped(_) => self.counts.skipped += 1,
        }
    }

    pub fn tag_counts(&self) -> &HashMap<String, u64> {
        &self.counts.tags
    }

    pub fn port_protocol_counts(&self) -> &HashMap<(u16, String), u64> {
        &self.counts.port_protocols
    }

    pub fn into_counts(self) -> Counts {
        self.counts
    }

    fn record_classified(&mut self, classification: &Classification<'_>) {
        let counts = &mut self.counts;
        counts.classified += 1;

        match counts.tags.get_mut(classification.tag) {
            Some(count) => *count += 1,
            None => {
                counts.tags.insert(classification.tag.to_string(), 1);
            }
        }
        *counts
            .port_protocols
            .entry((classification.port, classification.protocol.to_string()))
            .or_default() += 1;

        if let Some(start) = classification.start {
            counts.first_start = Some(counts.first_start.map_or(start, |t| t.min(start)));
        }
        if let Some(end) = classification.end {
            counts.last_end = Some(counts.last_end.map_or(end, |t| t.max(end)));
        }
    }
}

impl Counts {
    /// Lines observed, whether classified or skipped.
    pub fn lines_total(&self) -> u64 {
        self.classified + self.skipped
    }

    /// Tag counts sorted case-insensitively, ties broken by exact tag.
    pub fn tag_summaries(&self) -> Vec<TagCount> {
        let mut tags: Vec<TagCount> = self
            .tags
            .iter()
            .map(|(tag, count)| TagCount {
                tag: tag.clone(),
                count: *count,
            })
            .collect();
        tags.sort_by(|a, b| {
            a.tag
                .to_lowercase()
                .cmp(&b.tag.to_lowercase())
                .then_with(|| a.tag.cmp(&b.tag))
        });
        tags
    }

    /// Port/protocol counts sorted by port, then protocol name.
    pub fn port_protocol_summaries(&self) -> Vec<PortProtocolCount> {
        let mut entries: Vec<PortProtocolCount> = self
            .port_protocols
            .iter()
            .map(|((port, protocol), count)| PortProtocolCount {
                port: *port,
                protocol: protocol.clone(),
                count: *count,
            })
            .collect();
        entries.sort_by(|a, b| {
            a.port
                .cmp(&b.port)
                .then_with(|| a.protocol.cmp(&b.protocol))
        });
        entries
    }
}

use super::{Analyzer, HarMetrics};
use crate::Result;
use crate::filter::EntryFilter;
use crate::har::{HarReader, TimingArchive};
use std::path::Path;

/// Counts entries and sums their times in a single pass.
///
/// With the default (empty) filter every entry is counted, whatever kind of
/// request it describes.
#[derive(Debug, Default)]
pub struct MetricsAnalyzer {
    filter: EntryFilter,
}

impl MetricsAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only count entries matching `filter`
    pub fn with_filter(filter: EntryFilter) -> Self {
        Self { filter }
    }

    /// Read a downloaded HAR file and compute its metrics
    pub fn aggregate(&self, path: &Path) -> Result<HarMetrics> {
        let archive = HarReader::from_file(path)?;
        self.analyze(&archive)
    }
}

impl Analyzer for MetricsAnalyzer {
    type Output = HarMetrics;

    fn analyze(&self, archive: &TimingArchive) -> Result<Self::Output> {
        tracing::debug!("Aggregating HAR network metrics");

        let (count, total_ms) = archive
            .log
            .entries
            .iter()
            .filter(|entry| self.filter.matches(entry))
            .fold((0usize, 0.0f64), |(count, total), entry| {
                (count + 1, total + entry.time)
            });

        let metrics = HarMetrics {
            count,
            total_seconds: total_ms / 1000.0,
        };

        tracing::info!(
            "HAR metrics complete: {} calls, {:.3}s total",
            metrics.count,
            metrics.total_seconds
        );

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn archive(json: &str) -> TimingArchive {
        HarReader::parse(json).unwrap()
    }

    #[test]
    fn test_sums_entry_times() {
        let har = archive(r#"{"log": {"entries": [{"time": 100}, {"time": 250}, {"time": 650}]}}"#);

        let metrics = MetricsAnalyzer::new().analyze(&har).unwrap();

        assert_eq!(metrics.count, 3);
        assert_eq!(metrics.total_seconds, 1.0);
    }

    #[test]
    fn test_empty_entries() {
        let har = archive(r#"{"log": {"entries": []}}"#);

        let metrics = MetricsAnalyzer::new().analyze(&har).unwrap();

        assert_eq!(metrics.count, 0);
        assert_eq!(metrics.total_seconds, 0.0);
    }

    #[test]
    fn test_filter_restricts_counted_entries() {
        let har = archive(
            r#"{"log": {"entries": [
                {"time": 100, "_resourceType": "xhr", "request": {"method": "GET", "url": "https://api.example.com/a"}},
                {"time": 400, "_resourceType": "document", "request": {"method": "GET", "url": "https://www.example.com/"}},
                {"time": 300, "_resourceType": "xhr", "request": {"method": "POST", "url": "https://api.example.com/b"}}
            ]}}"#,
        );

        let analyzer = MetricsAnalyzer::with_filter(EntryFilter::new().with_resource_type("XHR"));
        let metrics = analyzer.analyze(&har).unwrap();

        assert_eq!(metrics.count, 2);
        assert_eq!(metrics.total_seconds, 0.4);
    }

    #[test]
    fn test_aggregate_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"log": {{"entries": [{{"time": 1500}}, {{"time": 500}}]}}}}"#).unwrap();

        let metrics = MetricsAnalyzer::new().aggregate(file.path()).unwrap();

        assert_eq!(metrics.count, 2);
        assert_eq!(metrics.total_seconds, 2.0);
    }

    #[test]
    fn test_report_lines() {
        let metrics = HarMetrics {
            count: 3,
            total_seconds: 1.0,
        };

        assert_eq!(
            metrics.report_lines(),
            vec![
                "Number of Network Calls made: 3".to_string(),
                "Total time taken for all Network Calls in Seconds: 1.0".to_string(),
            ]
        );
    }
}

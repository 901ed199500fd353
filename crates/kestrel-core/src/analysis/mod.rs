mod metrics;

pub use metrics::MetricsAnalyzer;

use crate::har::TimingArchive;
use serde::{Deserialize, Serialize};

/// Network call statistics for one transaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarMetrics {
    /// Number of entries counted
    pub count: usize,
    /// Sum of entry times, in seconds
    pub total_seconds: f64,
}

impl HarMetrics {
    /// Human-readable lines for a test report
    pub fn report_lines(&self) -> Vec<String> {
        vec![
            format!("Number of Network Calls made: {}", self.count),
            format!(
                "Total time taken for all Network Calls in Seconds: {:?}",
                self.total_seconds
            ),
        ]
    }
}

pub trait Analyzer {
    type Output;

    fn analyze(&self, archive: &TimingArchive) -> crate::Result<Self::Output>;
}

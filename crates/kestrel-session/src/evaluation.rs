use crate::{Error, Result};

/// Speed index threshold, in milliseconds, below which a transaction passes
pub const DEFAULT_SPEED_INDEX_THRESHOLD: i64 = 2000;

/// Pass/fail rule for the `speedIndex` property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedIndexCheck {
    pub threshold: i64,
}

impl Default for SpeedIndexCheck {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SPEED_INDEX_THRESHOLD,
        }
    }
}

/// Outcome of a [`SpeedIndexCheck`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedIndexVerdict {
    pub speed_index: i64,
    pub passed: bool,
    /// Report step text
    pub message: String,
}

impl SpeedIndexCheck {
    pub fn new(threshold: i64) -> Self {
        Self { threshold }
    }

    pub fn evaluate(&self, speed_index: i64) -> SpeedIndexVerdict {
        let passed = speed_index < self.threshold;
        let message = if passed {
            format!("Speed Index Captured is within accepted range: {}", speed_index)
        } else {
            format!("Speed Index Captured is too high: {}", speed_index)
        };

        SpeedIndexVerdict {
            speed_index,
            passed,
            message,
        }
    }

    /// Evaluate the raw property text returned by the reporting API
    pub fn evaluate_str(&self, raw: &str) -> Result<SpeedIndexVerdict> {
        let speed_index = raw.trim().parse::<i64>().map_err(|e| {
            Error::Core(kestrel_core::Error::MalformedResponse(format!(
                "speedIndex '{}' is not an integer: {}",
                raw, e
            )))
        })?;
        Ok(self.evaluate(speed_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_passes() {
        let verdict = SpeedIndexCheck::default().evaluate(1500);
        assert!(verdict.passed);
        assert_eq!(
            verdict.message,
            "Speed Index Captured is within accepted range: 1500"
        );
    }

    #[test]
    fn test_threshold_itself_fails() {
        let verdict = SpeedIndexCheck::default().evaluate(2000);
        assert!(!verdict.passed);
        assert_eq!(verdict.message, "Speed Index Captured is too high: 2000");
    }

    #[test]
    fn test_non_integer_text_is_rejected() {
        let result = SpeedIndexCheck::default().evaluate_str("fast");
        assert!(matches!(
            result,
            Err(Error::Core(kestrel_core::Error::MalformedResponse(_)))
        ));
    }

    #[test]
    fn test_custom_threshold() {
        let verdict = SpeedIndexCheck::new(1000).evaluate_str(" 1200 ").unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.speed_index, 1200);
    }
}

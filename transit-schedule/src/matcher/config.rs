//! Departure matcher configuration.

/// Configuration parameters for departure matching.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Retry on the previous service day with the time shifted by 24 hours
    /// when the same-day search finds nothing.
    pub rollover: bool,

    /// Number of candidate trips whose stop times are fetched concurrently.
    /// Candidates are still accepted in store order.
    pub verify_batch_size: usize,
}

impl MatcherConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(rollover: bool, verify_batch_size: usize) -> Self {
        Self {
            rollover,
            verify_batch_size,
        }
    }

    pub fn with_rollover(mut self, rollover: bool) -> Self {
        self.rollover = rollover;
        self
    }

    pub fn with_verify_batch_size(mut self, verify_batch_size: usize) -> Self {
        self.verify_batch_size = verify_batch_size;
        self
    }

    /// Batch size clamped to at least one candidate.
    pub(crate) fn batch_size(&self) -> usize {
        self.verify_batch_size.max(1)
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            rollover: true,
            verify_batch_size: 4,
        }
    }
}

//! Domain error types.
//!
//! These errors represent malformed or out-of-range schedule values. They are
//! distinct from store/IO errors and are always surfaced to the caller.

/// Which kind of value failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseTarget {
    Time,
    Date,
}

impl std::fmt::Display for ParseTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseTarget::Time => f.write_str("time"),
            ParseTarget::Date => f.write_str("date"),
        }
    }
}

/// Error returned when a time-of-day or service date is malformed or out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {target}: {reason}")]
pub struct ParseError {
    target: ParseTarget,
    reason: &'static str,
}

impl ParseError {
    pub(crate) fn time(reason: &'static str) -> Self {
        Self {
            target: ParseTarget::Time,
            reason,
        }
    }

    pub(crate) fn date(reason: &'static str) -> Self {
        Self {
            target: ParseTarget::Date,
            reason,
        }
    }

    /// Returns what was being parsed.
    pub fn target(&self) -> ParseTarget {
        self.target
    }

    /// Returns the reason the value was rejected.
    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ParseError::time("hour must be 0-32");
        assert_eq!(err.to_string(), "invalid time: hour must be 0-32");
        assert_eq!(err.target(), ParseTarget::Time);

        let err = ParseError::date("date must be between 19700101 and 21001231");
        assert_eq!(
            err.to_string(),
            "invalid date: date must be between 19700101 and 21001231"
        );
        assert_eq!(err.reason(), "date must be between 19700101 and 21001231");
    }
}

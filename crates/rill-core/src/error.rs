#![forbid(unsafe_code)]

//! Stream failure type.
//!
//! There is exactly one failure kind: a source stream terminated with an
//! error. There is no retry policy and no partial-failure aggregation;
//! failures either propagate outward unchanged or are replaced wholesale by
//! [`Stream::recover`](crate::Stream::recover).

use thiserror::Error;

/// Terminal failure carried by a stream's error notification.
///
/// Cheap to clone and comparable so test harnesses can match recorded
/// notifications against expected ones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// An input stream terminated with an error.
    #[error("source stream failed: {reason}")]
    Source {
        /// Human-readable description of the upstream failure.
        reason: String,
    },
}

impl StreamError {
    /// Build a source failure from any displayable reason.
    #[must_use]
    pub fn source(reason: impl Into<String>) -> Self {
        Self::Source {
            reason: reason.into(),
        }
    }
}

//! Status-check outcome classification
//!
//! Every HEAD check ends in exactly one `CheckOutcome`; `broken_status` decides
//! whether that outcome becomes a report row.

use crate::crawler::{FetchError, FetchResponse};
use crate::output::BrokenStatus;

/// Report label used for timed-out checks
pub const TIMEOUT_LABEL: &str = "Request timed out";

/// HEAD is unevenly supported, so this status is never reported
pub const METHOD_NOT_ALLOWED: u16 = 405;

/// Result of checking a single URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The server answered with a status below 400
    Success(u16),

    /// The server answered with a status of 400 or above
    HttpError(u16),

    /// Connection, TLS, DNS or protocol failure
    TransportFailure(String),

    /// No response within the request timeout
    Timeout,

    /// The local connection pool was saturated; says nothing about the link
    PoolExhausted(String),
}

impl CheckOutcome {
    /// Classifies a numeric status
    pub fn from_status(status: u16) -> Self {
        if status >= 400 {
            Self::HttpError(status)
        } else {
            Self::Success(status)
        }
    }

    /// Classifies the result of a fetch
    pub fn from_fetch(result: &Result<FetchResponse, FetchError>) -> Self {
        match result {
            Ok(response) => Self::from_status(response.status),
            Err(FetchError::Timeout) => Self::Timeout,
            Err(FetchError::PoolExhausted(message)) => Self::PoolExhausted(message.clone()),
            Err(FetchError::Transport(message)) => Self::TransportFailure(message.clone()),
        }
    }

    /// The value reported for this outcome, or None if it is not broken
    pub fn broken_status(&self) -> Option<BrokenStatus> {
        match self {
            Self::Success(_) | Self::PoolExhausted(_) => None,
            Self::HttpError(METHOD_NOT_ALLOWED) => None,
            Self::HttpError(status) => Some(BrokenStatus::Code(*status)),
            Self::TransportFailure(message) => Some(BrokenStatus::Error(summarize_error(message))),
            Self::Timeout => Some(BrokenStatus::Error(TIMEOUT_LABEL.to_string())),
        }
    }

    /// Returns true for errors that are dropped without a report row
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::PoolExhausted(_))
    }
}

/// Shortens an error message to its first two `:`-delimited segments
///
/// `"error sending request: error trying to connect: dns error: ..."`
/// becomes `"error sending request: error trying to connect"`.
pub fn summarize_error(message: &str) -> String {
    let summary = message
        .split(':')
        .take(2)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(": ");

    if summary.is_empty() {
        message.trim().to_string()
    } else {
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_statuses_not_broken() {
        for status in [200, 204, 301, 304, 399] {
            assert!(CheckOutcome::from_status(status).broken_status().is_none(), "{}", status);
        }
    }

    #[test]
    fn test_error_statuses_broken() {
        for status in [400, 403, 404, 410, 500, 503] {
            assert_eq!(
                CheckOutcome::from_status(status).broken_status(),
                Some(BrokenStatus::Code(status))
            );
        }
    }

    #[test]
    fn test_method_not_allowed_exempt() {
        let outcome = CheckOutcome::from_status(405);
        assert_eq!(outcome, CheckOutcome::HttpError(405));
        assert!(outcome.broken_status().is_none());
    }

    #[test]
    fn test_pool_exhaustion_suppressed() {
        let outcome = CheckOutcome::from_fetch(&Err(FetchError::PoolExhausted(
            "connection pool exhausted".to_string(),
        )));
        assert!(outcome.is_suppressed());
        assert_eq!(outcome.broken_status(), None);
    }

    #[test]
    fn test_timeout_label() {
        let outcome = CheckOutcome::from_fetch(&Err(FetchError::Timeout));
        assert_eq!(
            outcome.broken_status(),
            Some(BrokenStatus::Error("Request timed out".to_string()))
        );
    }

    #[test]
    fn test_transport_failure_summarized() {
        let outcome = CheckOutcome::from_fetch(&Err(FetchError::Transport(
            "error sending request: error trying to connect: dns error: failed to lookup"
                .to_string(),
        )));
        assert_eq!(
            outcome.broken_status(),
            Some(BrokenStatus::Error(
                "error sending request: error trying to connect".to_string()
            ))
        );
    }

    #[test]
    fn test_from_fetch_response() {
        let response = FetchResponse {
            status: 404,
            body: None,
        };
        assert_eq!(CheckOutcome::from_fetch(&Ok(response)), CheckOutcome::HttpError(404));
    }

    #[test]
    fn test_summarize_error() {
        assert_eq!(summarize_error("HTTP Error 404: Not Found"), "HTTP Error 404: Not Found");
        assert_eq!(summarize_error("a: b: c: d"), "a: b");
        assert_eq!(summarize_error("no colon here"), "no colon here");
        assert_eq!(summarize_error(":::"), ":::");
    }
}

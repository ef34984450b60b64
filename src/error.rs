// Errors at the boundary of one poll cycle

use crate::duration::DurationError;
use std::num::ParseFloatError;

/// Fetching or decoding the upstream statistics document failed.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("upstream returned HTTP {status}")]
    Status { status: reqwest::StatusCode },
    #[error("response body does not match the statistics document: {0}")]
    Body(#[from] serde_json::Error),
}

/// A string field that carries a number or duration could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("DBFetchTime {value:?} is not a duration: {source}")]
    FetchTime {
        value: String,
        #[source]
        source: DurationError,
    },
    #[error("{field} {value:?} is not a number: {source}")]
    Score {
        field: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),
    #[error("projection: {0}")]
    Projection(#[from] ProjectionError),
}

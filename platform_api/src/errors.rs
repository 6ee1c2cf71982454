use http::StatusCode;
use strum::Display;

/// Broad classification of a failure, used by the HTTP layer to pick a response code without having to know
/// about every individual error variant.
#[derive(Debug, Clone, Copy, Display, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// An injected remote check (authorization or validation) could not be completed.
    UpstreamUnavailable,

    /// Stored resources disagree with each other in a way that makes the operation impossible.
    DataInconsistency,

    /// The caller asked for something that can never succeed as given.
    InvalidInput,
}

impl ErrorKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::DataInconsistency => StatusCode::CONFLICT,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        }
    }
}

//! Error taxonomy shared by the sync pipeline.

use std::fmt;

use http::StatusCode;

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Classified failure of an identity, fetch, sync, or storage operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Missing or malformed request input. Never retried.
    Validation(String),
    /// Player, account, or match does not exist.
    NotFound(String),
    /// Bad or expired API credential (403). Fatal for a whole sync.
    UpstreamAuth(String),
    /// Upstream throttled us (429). Surfaced as retry-later.
    UpstreamRateLimited(String),
    /// Any other upstream failure, network errors have no status.
    Upstream {
        /// HTTP status, if a response was received.
        status: Option<u16>,
        /// Description.
        message: String,
    },
    /// Match detail does not have the expected shape, or the player's own
    /// participant entry is missing.
    MalformedMatchData {
        /// Upstream match id.
        match_id: String,
        /// What was wrong.
        reason: String,
    },
    /// Store read or write failure.
    Storage(String),
}

impl Error {
    /// Classify an upstream HTTP failure by status code.
    pub fn from_upstream_status(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        match status.and_then(|s| StatusCode::from_u16(s).ok()) {
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => Self::UpstreamAuth(message),
            Some(StatusCode::TOO_MANY_REQUESTS) => Self::UpstreamRateLimited(message),
            Some(StatusCode::NOT_FOUND) => Self::NotFound(message),
            _ => Self::Upstream { status, message },
        }
    }

    /// If this error should abort a whole sync rather than be tallied against one match.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UpstreamAuth(_) | Self::UpstreamRateLimited(_))
    }

    /// HTTP status the internal API responds with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UpstreamAuth(_) => StatusCode::FORBIDDEN,
            Self::UpstreamRateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream { .. } | Self::MalformedMatchData { .. } => StatusCode::BAD_GATEWAY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Invalid request: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::UpstreamAuth(_) => write!(f, "Riot API rejected the API key."),
            Self::UpstreamRateLimited(_) => {
                write!(f, "Riot API rate limit reached, try again later.")
            }
            Self::Upstream {
                status: Some(status),
                ..
            } => write!(f, "Riot API request failed with status {}.", status),
            Self::Upstream { status: None, .. } => write!(f, "Riot API request failed."),
            Self::MalformedMatchData { match_id, reason } => {
                write!(f, "Malformed match data for {}: {}", match_id, reason)
            }
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            Error::from_upstream_status(Some(403), "x"),
            Error::UpstreamAuth(_)
        ));
        assert!(matches!(
            Error::from_upstream_status(Some(429), "x"),
            Error::UpstreamRateLimited(_)
        ));
        assert!(matches!(
            Error::from_upstream_status(Some(404), "x"),
            Error::NotFound(_)
        ));
        assert_eq!(
            Error::Upstream {
                status: Some(503),
                message: "x".into()
            },
            Error::from_upstream_status(Some(503), "x")
        );
        assert_eq!(
            Error::Upstream {
                status: None,
                message: "timeout".into()
            },
            Error::from_upstream_status(None, "timeout")
        );
    }

    #[test]
    fn test_display_hides_upstream_body() {
        let err = Error::from_upstream_status(Some(500), "<html>stack trace</html>");
        assert_eq!("Riot API request failed with status 500.", err.to_string());
        assert_eq!(StatusCode::BAD_GATEWAY, err.status_code());
    }
}

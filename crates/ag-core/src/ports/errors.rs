use thiserror::Error;

/// Shown for transport-level failures.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error or server unreachable";
/// Shown when the server gave no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Failure of a REST call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received (DNS, connect, reset, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status. `message` is the
    /// `error` field of the response body when present.
    #[error("HTTP {status}{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Http { status: u16, message: Option<String> },

    /// The response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The call requires a session and none is available.
    #[error("not signed in")]
    Unauthenticated,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Text for the toast shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ApiError::Http {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ApiError::Unauthenticated => "Please sign in to continue.".to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Failure of the realtime channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RealtimeError {
    #[error("realtime channel is not connected")]
    NotConnected,
    #[error("realtime transport error: {0}")]
    Transport(String),
    #[error("realtime protocol error: {0}")]
    Protocol(String),
}

/// Failure turning a picked file into a base64 data URL.
#[derive(Debug, Error)]
pub enum ImageEncodeError {
    #[error("failed to read image {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is not a supported image")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_errors_use_the_generic_wording() {
        let err = ApiError::Network("connection refused".into());
        assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn server_message_wins_when_present() {
        let err = ApiError::Http {
            status: 400,
            message: Some("Phone already in use".into()),
        };
        assert_eq!(err.user_message(), "Phone already in use");
        assert_eq!(err.to_string(), "HTTP 400: Phone already in use");
    }

    #[test]
    fn blank_or_missing_message_falls_back() {
        let err = ApiError::Http {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
        assert_eq!(err.to_string(), "HTTP 500");
        let err = ApiError::Http {
            status: 500,
            message: Some(" ".into()),
        };
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn not_found_detection() {
        assert!(ApiError::Http {
            status: 404,
            message: None
        }
        .is_not_found());
        assert!(!ApiError::Decode("x".into()).is_not_found());
    }
}

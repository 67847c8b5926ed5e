use serde::Serialize;
use thiserror::Error;

pub const MSG_NOT_AUTHENTICATED: &str = "Not authenticated. Please sign in to continue.";
pub const MSG_SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";
pub const MSG_RATE_LIMITED: &str = "Rate limit exceeded. Please wait a moment and try again.";
pub const MSG_CREDITS_EXHAUSTED: &str = "AI credits exhausted. Please add credits to continue.";
pub const MSG_NO_BODY: &str = "No response body";
pub const MSG_CONNECTION_FAILED: &str = "Connection failed";
pub const MSG_TIMED_OUT: &str = "Request timed out";
pub const MSG_CANCELLED: &str = "Request cancelled";

/// Classifies why a streaming call ended without completing.
///
/// Callers branch on the kind (e.g. offer a sign-in action for the
/// authentication kinds) instead of matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamErrorKind {
    /// No session was available before the call; nothing was sent.
    AuthenticationMissing,
    /// Upstream answered 401.
    AuthenticationExpired,
    /// Upstream answered 429.
    RateLimited,
    /// Upstream answered 402.
    QuotaExhausted,
    /// Any other non-2xx status.
    RequestFailed,
    /// 2xx without a readable body.
    EmptyResponseBody,
    /// Network-level failure while sending or reading, including timeouts.
    TransportFailure,
    /// The caller cancelled the call.
    Cancelled,
}

impl StreamErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamErrorKind::AuthenticationMissing => "authentication_missing",
            StreamErrorKind::AuthenticationExpired => "authentication_expired",
            StreamErrorKind::RateLimited => "rate_limited",
            StreamErrorKind::QuotaExhausted => "quota_exhausted",
            StreamErrorKind::RequestFailed => "request_failed",
            StreamErrorKind::EmptyResponseBody => "empty_response_body",
            StreamErrorKind::TransportFailure => "transport_failure",
            StreamErrorKind::Cancelled => "cancelled",
        }
    }
}

/// Terminal failure of a streaming call: a kind plus a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct StreamError {
    pub kind: StreamErrorKind,
    pub message: String,
}

impl StreamError {
    pub fn new(kind: StreamErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_authenticated() -> Self {
        Self::new(StreamErrorKind::AuthenticationMissing, MSG_NOT_AUTHENTICATED)
    }

    pub fn cancelled() -> Self {
        Self::new(StreamErrorKind::Cancelled, MSG_CANCELLED)
    }

    pub fn empty_body() -> Self {
        Self::new(StreamErrorKind::EmptyResponseBody, MSG_NO_BODY)
    }

    /// Maps a non-2xx status to its error. `body_message` is the `error`
    /// field of the response body, when it could be parsed.
    pub fn from_status(status: u16, body_message: Option<String>) -> Self {
        match status {
            401 => Self::new(StreamErrorKind::AuthenticationExpired, MSG_SESSION_EXPIRED),
            429 => Self::new(StreamErrorKind::RateLimited, MSG_RATE_LIMITED),
            402 => Self::new(StreamErrorKind::QuotaExhausted, MSG_CREDITS_EXHAUSTED),
            _ => Self::new(
                StreamErrorKind::RequestFailed,
                body_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| format!("Request failed with status {status}")),
            ),
        }
    }

    pub fn transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::new(StreamErrorKind::TransportFailure, MSG_TIMED_OUT);
        }
        let text = err.to_string();
        if text.trim().is_empty() {
            Self::new(StreamErrorKind::TransportFailure, MSG_CONNECTION_FAILED)
        } else {
            Self::new(StreamErrorKind::TransportFailure, text)
        }
    }

    /// True for errors the user resolves by signing in again.
    pub fn is_auth(&self) -> bool {
        matches!(
            self.kind,
            StreamErrorKind::AuthenticationMissing | StreamErrorKind::AuthenticationExpired
        )
    }
}

//! Session lookup for streaming calls.
//!
//! The decoder never caches a token. It asks its `SessionProvider` once per
//! call and treats `None` as "not signed in".

use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current bearer token, or `None` when there is no active session.
    async fn access_token(&self) -> Option<String>;
}

/// A provider holding a fixed token (or none).
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn access_token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// The caller's own session, taken from the incoming `Authorization` header
/// and forwarded upstream unchanged. Never rejects: a missing or malformed
/// header simply yields no session.
#[derive(Debug, Clone, Default)]
pub struct BearerSession(pub StaticSession);

#[async_trait]
impl<S> FromRequestParts<S> for BearerSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_bearer);

        Ok(BearerSession(match token {
            Some(token) => StaticSession::new(token),
            None => StaticSession::anonymous(),
        }))
    }
}

fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(parse_bearer("bearer   tok "), Some("tok"));
        assert_eq!(parse_bearer("Basic dXNlcg=="), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("Bearer"), None);
    }

    #[tokio::test]
    async fn test_static_session() {
        assert_eq!(StaticSession::new("t").access_token().await.as_deref(), Some("t"));
        assert_eq!(StaticSession::anonymous().access_token().await, None);
    }

    #[tokio::test]
    async fn test_extractor_reads_authorization_header() {
        let (mut parts, _) = Request::builder()
            .header(AUTHORIZATION, "Bearer user-jwt")
            .body(())
            .unwrap()
            .into_parts();
        let BearerSession(session) = BearerSession::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(session.access_token().await.as_deref(), Some("user-jwt"));
    }

    #[tokio::test]
    async fn test_extractor_without_header_is_anonymous() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let BearerSession(session) = BearerSession::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(session.access_token().await, None);
    }
}

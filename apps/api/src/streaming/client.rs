use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::streaming::decoder::EventStreamDecoder;
use crate::streaming::envelope::Envelope;
use crate::streaming::error::StreamError;
use crate::streaming::handler::{Callbacks, ChannelHandler, StreamEvent, StreamHandler};
use crate::streaming::session::SessionProvider;

/// Client for the hosted AI functions. Each target is a POST endpoint under
/// `base_url` that answers with a `data: <json>` event stream.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct StreamClient {
    http: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl StreamClient {
    /// `timeout` bounds each call end to end; `None` leaves it to the transport.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().build()?,
            base_url: base_url.into(),
            timeout,
        })
    }

    pub fn endpoint(&self, target: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            target.trim_start_matches('/')
        )
    }

    /// Streams `target` into `handler`. Exactly one of `on_done` / `on_error`
    /// is called before this returns.
    pub async fn stream(
        &self,
        target: &str,
        envelope: &Envelope,
        session: &dyn SessionProvider,
        handler: &mut dyn StreamHandler,
    ) {
        self.stream_with_cancel(target, envelope, session, handler, &CancellationToken::new())
            .await
    }

    /// Like [`stream`](Self::stream), but stops with a `Cancelled` error as
    /// soon as `cancel` fires.
    pub async fn stream_with_cancel(
        &self,
        target: &str,
        envelope: &Envelope,
        session: &dyn SessionProvider,
        handler: &mut dyn StreamHandler,
        cancel: &CancellationToken,
    ) {
        match self.run(target, envelope, session, handler, cancel).await {
            Ok(deltas) => {
                debug!(function = target, deltas, "stream completed");
                handler.on_done();
            }
            Err(err) => {
                warn!(function = target, kind = err.kind.as_str(), "stream failed: {}", err.message);
                handler.on_error(err);
            }
        }
    }

    /// Runs the call to completion and returns the concatenated text.
    pub async fn complete(
        &self,
        target: &str,
        envelope: &Envelope,
        session: &dyn SessionProvider,
    ) -> Result<String, StreamError> {
        let mut text = String::new();
        let mut outcome = Ok(());
        self.stream(
            target,
            envelope,
            session,
            &mut Callbacks::new(|delta: &str| text.push_str(delta), || {}, |err| outcome = Err(err)),
        )
        .await;
        outcome.map(|()| text)
    }

    /// Spawns the call and returns its events as a stream that ends after the
    /// terminal event. Dropping the stream aborts the upstream request.
    pub fn events(
        &self,
        target: impl Into<String>,
        envelope: Envelope,
        session: Arc<dyn SessionProvider>,
        cancel: CancellationToken,
    ) -> impl Stream<Item = StreamEvent> + Send + 'static {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = self.clone();
        let target = target.into();

        tokio::spawn(async move {
            let receiver_gone = tx.clone();
            let mut handler = ChannelHandler::new(tx, cancel.clone());
            tokio::select! {
                _ = client.stream_with_cancel(&target, &envelope, session.as_ref(), &mut handler, &cancel) => {}
                _ = receiver_gone.closed() => {
                    debug!(function = %target, "event receiver dropped, aborting stream");
                    cancel.cancel();
                }
            }
        });

        futures::stream::unfold(Some(rx), |rx| async move {
            let mut rx = rx?;
            let event = rx.recv().await?;
            let next = if event.is_terminal() { None } else { Some(rx) };
            Some((event, next))
        })
    }

    async fn run(
        &self,
        target: &str,
        envelope: &Envelope,
        session: &dyn SessionProvider,
        handler: &mut dyn StreamHandler,
        cancel: &CancellationToken,
    ) -> Result<usize, StreamError> {
        let url = self.endpoint(target);

        let Some(token) = session.access_token().await else {
            return Err(StreamError::not_authenticated());
        };

        let mut request = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&envelope.to_body());
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        debug!(function = target, %url, "opening stream");
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StreamError::cancelled()),
            sent = request.send() => sent.map_err(|e| StreamError::transport(&e))?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StreamError::from_status(
                status.as_u16(),
                error_message(&body),
            ));
        }
        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Err(StreamError::empty_body());
        }

        let mut body = response.bytes_stream();
        let mut decoder = EventStreamDecoder::new();
        let mut deltas = 0usize;

        while !decoder.is_finished() {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(StreamError::cancelled()),
                next = body.next() => next,
            };
            let chunk = match next {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => return Err(StreamError::transport(&e)),
                None => break,
            };
            for text in decoder.feed(&chunk) {
                if cancel.is_cancelled() {
                    return Err(StreamError::cancelled());
                }
                handler.on_delta(&text);
                deltas += 1;
            }
        }

        for text in decoder.finish() {
            handler.on_delta(&text);
            deltas += 1;
        }
        Ok(deltas)
    }
}

/// Pulls a message out of an error body: `{"error": "..."}` or
/// `{"error": {"message": "..."}}`.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(message) => Some(message.clone()),
        Value::Object(inner) => inner
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned),
        _ => None,
    }
}

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::streaming::error::StreamError;

/// Receives the output of one streaming call.
///
/// `on_delta` fires zero or more times in wire order, then exactly one of
/// `on_done` / `on_error`.
pub trait StreamHandler: Send {
    fn on_delta(&mut self, text: &str);
    fn on_done(&mut self);
    fn on_error(&mut self, error: StreamError);
}

/// Tagged form of the handler callbacks, for pull-based consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Delta(String),
    Done,
    Error(StreamError),
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done | StreamEvent::Error(_))
    }
}

/// Adapts three closures into a `StreamHandler`.
pub struct Callbacks<D, F, E> {
    on_delta: D,
    on_done: F,
    on_error: E,
}

impl<D, F, E> Callbacks<D, F, E>
where
    D: FnMut(&str) + Send,
    F: FnMut() + Send,
    E: FnMut(StreamError) + Send,
{
    pub fn new(on_delta: D, on_done: F, on_error: E) -> Self {
        Self {
            on_delta,
            on_done,
            on_error,
        }
    }
}

impl<D, F, E> StreamHandler for Callbacks<D, F, E>
where
    D: FnMut(&str) + Send,
    F: FnMut() + Send,
    E: FnMut(StreamError) + Send,
{
    fn on_delta(&mut self, text: &str) {
        (self.on_delta)(text)
    }

    fn on_done(&mut self) {
        (self.on_done)()
    }

    fn on_error(&mut self, error: StreamError) {
        (self.on_error)(error)
    }
}

/// Forwards events into a channel. When the receiving side has gone away
/// the call is cancelled so the upstream request stops too.
pub struct ChannelHandler {
    tx: UnboundedSender<StreamEvent>,
    cancel: CancellationToken,
}

impl ChannelHandler {
    pub fn new(tx: UnboundedSender<StreamEvent>, cancel: CancellationToken) -> Self {
        Self { tx, cancel }
    }

    fn send(&self, event: StreamEvent) {
        if self.tx.send(event).is_err() {
            self.cancel.cancel();
        }
    }
}

impl StreamHandler for ChannelHandler {
    fn on_delta(&mut self, text: &str) {
        self.send(StreamEvent::Delta(text.to_owned()));
    }

    fn on_done(&mut self) {
        self.send(StreamEvent::Done);
    }

    fn on_error(&mut self, error: StreamError) {
        self.send(StreamEvent::Error(error));
    }
}

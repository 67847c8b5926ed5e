//! Streaming client for the hosted AI functions.
//!
//! Every AI feature in TalentDesk goes through [`StreamClient`]: it fetches
//! the caller's session, POSTs the request envelope and decodes the
//! `data: <json>` event stream into text deltas.

pub mod client;
pub mod decoder;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod session;


pub use client::StreamClient;
pub use envelope::Envelope;
pub use error::{StreamError, StreamErrorKind};
pub use handler::StreamEvent;
pub use session::BearerSession;

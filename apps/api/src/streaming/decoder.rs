//! Incremental decoder for `data: <json>` event-stream bodies.
//!
//! Bytes arrive in arbitrary chunks. A multi-byte character, a `data:` prefix
//! or a whole record may straddle two reads, so the decoder keeps two pieces
//! of carry-over state: undecoded trailing bytes and unterminated text.

use std::borrow::Cow;

use serde_json::Value;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";
const DELTA_POINTER: &str = "/choices/0/delta/content";

/// Stateful UTF-8 decoder that holds back an incomplete trailing sequence
/// until the next chunk completes it. Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn decode(&mut self, chunk: &[u8]) -> String {
        let bytes: Cow<'_, [u8]> = if self.pending.is_empty() {
            Cow::Borrowed(chunk)
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(chunk);
            Cow::Owned(joined)
        };

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &rest[valid + len..];
                        }
                        None => {
                            self.pending = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flushes bytes still held back at end of input.
    fn finish(&mut self) -> String {
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }
}

/// Outcome of classifying one newline-delimited record.
#[derive(Debug, PartialEq, Eq)]
enum Record {
    /// Blank, comment, non-data, or data without delta text.
    Skip,
    Done,
    Delta(String),
    /// `data:` payload that is not valid JSON.
    Unparsed,
}

fn classify(record: &str) -> Record {
    let record = record.strip_suffix('\r').unwrap_or(record);
    if record.trim().is_empty() || record.starts_with(':') {
        return Record::Skip;
    }
    let Some(payload) = record.strip_prefix(DATA_PREFIX) else {
        return Record::Skip;
    };
    let payload = payload.trim();
    if payload == DONE_SENTINEL {
        return Record::Done;
    }
    match serde_json::from_str::<Value>(payload) {
        Ok(value) => match value.pointer(DELTA_POINTER).and_then(Value::as_str) {
            Some(text) if !text.is_empty() => Record::Delta(text.to_owned()),
            _ => Record::Skip,
        },
        Err(_) => Record::Unparsed,
    }
}

/// Turns body chunks into text deltas, in wire order.
#[derive(Debug, Default)]
pub struct EventStreamDecoder {
    utf8: Utf8Decoder,
    buffer: String,
    finished: bool,
}

impl EventStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the `[DONE]` sentinel has been seen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feeds one chunk and returns the deltas completed by it.
    ///
    /// A newline-terminated record whose JSON does not parse is put back at
    /// the front of the buffer and extraction stops until more bytes arrive.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut deltas = Vec::new();
        if self.finished {
            return deltas;
        }
        let text = self.utf8.decode(chunk);
        self.buffer.push_str(&text);

        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            match classify(&line[..line.len() - 1]) {
                Record::Skip => {}
                Record::Delta(text) => deltas.push(text),
                Record::Done => {
                    self.finished = true;
                    self.buffer.clear();
                    break;
                }
                Record::Unparsed => {
                    self.buffer.insert_str(0, &line);
                    break;
                }
            }
        }
        deltas
    }

    /// Flushes whatever is left once the byte stream has ended. A trailing
    /// record without a newline counts as complete here; records that still
    /// fail to parse are dropped.
    pub fn finish(mut self) -> Vec<String> {
        let mut deltas = Vec::new();
        if self.finished {
            return deltas;
        }
        let tail = self.utf8.finish();
        self.buffer.push_str(&tail);
        if self.buffer.is_empty() {
            return deltas;
        }

        for record in self.buffer.split('\n') {
            match classify(record) {
                Record::Delta(text) => deltas.push(text),
                Record::Done => break,
                Record::Skip | Record::Unparsed => {}
            }
        }
        deltas
    }
}

//! Newline-delimited JSON codec
//!
//! Upload bodies are one compact JSON object per line, each followed by `\n`.
//! Downloads are decoded incrementally: bytes arrive in arbitrary chunks and
//! complete lines are parsed as soon as their newline is seen.

use crate::domain::ChangeRecord;
use crate::port::{NdjsonStream, ServiceError};
use futures::{Stream, StreamExt};
use std::collections::VecDeque;

/// Content type sent with NDJSON uploads
pub const CONTENT_TYPE: &str = "application/x-ndjson";

/// Encode records as an NDJSON body
pub fn encode(records: &[ChangeRecord]) -> Result<Vec<u8>, serde_json::Error> {
    let mut body = Vec::with_capacity(records.len() * 64);
    for record in records {
        serde_json::to_writer(&mut body, record)?;
        body.push(b'\n');
    }
    Ok(body)
}

/// Incremental NDJSON decoder
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already known to hold no newline
    scanned: usize,
    line_number: u64,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every line completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<serde_json::Value, ServiceError>> {
        self.buffer.extend_from_slice(chunk);

        let mut values = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.buffer[from..].iter().position(|b| *b == b'\n') {
            let end = from + offset;
            self.line_number += 1;
            if let Some(value) = parse_line(self.line_number, &self.buffer[start..end]) {
                values.push(value);
            }
            start = end + 1;
            from = start;
        }

        self.buffer.drain(..start);
        self.scanned = self.buffer.len();
        values
    }

    /// Flush a final line that had no trailing newline
    pub fn finish(&mut self) -> Option<Result<serde_json::Value, ServiceError>> {
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        self.line_number += 1;
        parse_line(self.line_number, &rest)
    }
}

fn parse_line(line_number: u64, line: &[u8]) -> Option<Result<serde_json::Value, ServiceError>> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.iter().all(|b| b.is_ascii_whitespace()) {
        return None;
    }

    Some(serde_json::from_slice(line).map_err(|e| {
        ServiceError::decode(format!("invalid NDJSON at line {}: {}", line_number, e))
    }))
}

/// Decode a stream of byte chunks into a stream of JSON values
///
/// A transport error ends the stream after it is yielded; a malformed line is
/// yielded as an error and decoding continues with the next line.
pub fn decode_stream<S, B>(chunks: S) -> NdjsonStream
where
    S: Stream<Item = Result<B, ServiceError>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    struct State<S> {
        chunks: std::pin::Pin<Box<S>>,
        decoder: NdjsonDecoder,
        pending: VecDeque<Result<serde_json::Value, ServiceError>>,
        exhausted: bool,
    }

    let state = State {
        chunks: Box::pin(chunks),
        decoder: NdjsonDecoder::new(),
        pending: VecDeque::new(),
        exhausted: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.exhausted {
                return None;
            }
            match state.chunks.next().await {
                Some(Ok(chunk)) => {
                    let values = state.decoder.push(chunk.as_ref());
                    state.pending.extend(values);
                }
                Some(Err(e)) => {
                    state.exhausted = true;
                    state.pending.push_back(Err(e));
                }
                None => {
                    state.exhausted = true;
                    if let Some(last) = state.decoder.finish() {
                        state.pending.push_back(last);
                    }
                }
            }
        }
    })
    .boxed()
}

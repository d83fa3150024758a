//! Depth-tracking push wrapper around `json_event_parser`.
//!
//! [`Scanner`] is fed arbitrary byte chunks (they need not align with tokens)
//! and reports each [`JsonEvent`] together with its nesting depth as soon as
//! the parser produces it. Only the unconsumed tail of the input is buffered,
//! so scanning a multi-gigabyte line costs no more memory than its longest
//! token.
//!
//! Depth counts the enclosing containers, with the root container at 1:
//! a key of the root object is reported at depth 1, and `StartObject` of the
//! root at depth 1 as well.

use json_event_parser::{JsonEvent, LowLevelJsonParser};
use serde_json::{Number, Value};

/// Syntax error reported by the parser, with the number of bytes accepted
/// before it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at byte {offset}")]
pub struct ScanError {
    pub offset: u64,
    pub message: String,
}

/// Value of a scalar event, `None` for structural ones.
pub fn scalar_value(event: &JsonEvent<'_>) -> Option<Value> {
    match event {
        JsonEvent::String(s) => Some(Value::String(s.to_string())),
        JsonEvent::Number(text) => Some(
            serde_json::from_str::<Number>(text).map_or(Value::Null, Value::Number),
        ),
        JsonEvent::Boolean(b) => Some(Value::Bool(*b)),
        JsonEvent::Null => Some(Value::Null),
        _ => None,
    }
}

pub struct Scanner {
    parser: LowLevelJsonParser,
    pending: Vec<u8>,
    drained: u64,
    depth: usize,
    started: bool,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            parser: LowLevelJsonParser::new(),
            pending: Vec::new(),
            drained: 0,
            depth: 0,
            started: false,
        }
    }

    /// Feed the next chunk, calling `emit(event, depth)` for every event it
    /// completes. Stops at the first parser or `emit` error.
    pub fn feed<E, F>(&mut self, bytes: &[u8], emit: F) -> Result<(), E>
    where
        E: From<ScanError>,
        F: FnMut(JsonEvent<'_>, usize) -> Result<(), E>,
    {
        self.started |= bytes.iter().any(|b| !b.is_ascii_whitespace());
        self.pending.extend_from_slice(bytes);
        self.drain(false, emit)
    }

    /// Signal end of input. An empty or all-whitespace input is accepted;
    /// anything left unfinished is an error.
    pub fn finish<E, F>(&mut self, emit: F) -> Result<(), E>
    where
        E: From<ScanError>,
        F: FnMut(JsonEvent<'_>, usize) -> Result<(), E>,
    {
        if !self.started {
            return Ok(());
        }
        self.drain(true, emit)
    }

    fn drain<E, F>(&mut self, is_ending: bool, mut emit: F) -> Result<(), E>
    where
        E: From<ScanError>,
        F: FnMut(JsonEvent<'_>, usize) -> Result<(), E>,
    {
        let mut start = 0;
        let result = loop {
            let step = self.parser.parse_next(&self.pending[start..], is_ending);
            start += step.consumed_bytes;
            let event = match step.event {
                Some(Ok(JsonEvent::Eof)) => break Ok(()),
                Some(Ok(event)) => event,
                Some(Err(err)) => {
                    break Err(ScanError {
                        offset: self.drained + start as u64,
                        message: err.to_string(),
                    }
                    .into());
                }
                None if step.consumed_bytes == 0 => break Ok(()),
                None => continue,
            };
            let emitted = match event {
                JsonEvent::StartObject | JsonEvent::StartArray => {
                    self.depth += 1;
                    emit(event, self.depth)
                }
                JsonEvent::EndObject | JsonEvent::EndArray => {
                    let emitted = emit(event, self.depth);
                    self.depth = self.depth.saturating_sub(1);
                    emitted
                }
                event => emit(event, self.depth),
            };
            if let Err(err) = emitted {
                break Err(err);
            }
        };
        self.pending.drain(..start);
        self.drained += start as u64;
        result
    }
}

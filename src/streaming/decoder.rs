//! Incremental decoder for the upstream event stream
//!
//! Cohere streams one JSON object per event. Network reads do not line up with
//! event boundaries, so bytes are accumulated until a complete value is
//! available. Values may be separated by newlines or any other JSON whitespace.

use serde_json::Deserializer;

use super::StreamError;
use crate::schema::CohereStreamEvent;

/// Result of one [`EventDecoder::feed`] call
#[derive(Debug, Default)]
pub struct Decoded {
    /// Events completed by this read, in upstream order
    pub events: Vec<CohereStreamEvent>,
    /// Set when decoding stopped at bytes that can never form an event
    pub error: Option<StreamError>,
}

impl Decoded {
    /// Events, or the error if one occurred
    pub fn into_result(self) -> Result<Vec<CohereStreamEvent>, StreamError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.events),
        }
    }
}

/// Buffer for accumulating partial events across chunk boundaries.
///
/// # Example
/// ```
/// use cohere_bridge::streaming::EventDecoder;
///
/// let mut decoder = EventDecoder::new();
///
/// // First chunk contains a partial event
/// let decoded = decoder.feed(br#"{"is_finished":false,"text":"hel"#);
/// assert!(decoded.events.is_empty());
///
/// // Second chunk completes it
/// let decoded = decoder.feed(b"lo\"}\n");
/// assert_eq!(decoded.events[0].text, "hello");
/// assert!(decoded.error.is_none());
/// ```
#[derive(Debug, Default)]
pub struct EventDecoder {
    /// Bytes not yet consumed by a complete event
    pending: Vec<u8>,
}

impl EventDecoder {
    /// Create a new empty decoder
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Feed raw bytes and return every event they complete, in order.
    ///
    /// A trailing partial event is retained for the next call. Decoding stops
    /// at bytes that can never form an event: the events before them are still
    /// returned, followed by [`StreamError::Decode`]. The offending bytes stay
    /// in the buffer.
    pub fn feed(&mut self, bytes: &[u8]) -> Decoded {
        self.pending.extend_from_slice(bytes);

        let mut events = Vec::new();
        let (consumed, error) = {
            let mut iter =
                Deserializer::from_slice(&self.pending).into_iter::<CohereStreamEvent>();
            loop {
                let offset = iter.byte_offset();
                match iter.next() {
                    Some(Ok(event)) => events.push(event),
                    Some(Err(e)) if e.is_eof() => break (offset, None),
                    Some(Err(e)) => break (offset, Some(StreamError::Decode(e.to_string()))),
                    None => break (iter.byte_offset(), None),
                }
            }
        };

        self.pending.drain(..consumed);
        Decoded { events, error }
    }

    /// Check if a partial event is waiting for more bytes
    pub fn has_incomplete(&self) -> bool {
        self.pending.iter().any(|b| !b.is_ascii_whitespace())
    }

    /// Get the undecoded bytes, for diagnostics at end of stream
    pub fn remaining(&self) -> &[u8] {
        &self.pending
    }
}

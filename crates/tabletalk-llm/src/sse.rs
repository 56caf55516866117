//! Incremental parser for the Messages API server-sent-event stream.
//!
//! The stream interleaves `message_start`, `content_block_delta`,
//! `message_stop`, and housekeeping events. Only text deltas, the stop
//! marker, and error events matter to callers; everything else is skipped.

use serde::Deserialize;

use crate::{Error, Result};

/// A parsed event the stream consumer cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
  /// One text delta from a `content_block_delta`.
  Text(String),
  /// The backend signalled completion (`message_stop`).
  Stop,
}

#[derive(Deserialize)]
struct EventPayload {
  #[serde(rename = "type")]
  kind:  String,
  delta: Option<DeltaPayload>,
  error: Option<ErrorPayload>,
}

#[derive(Deserialize)]
struct DeltaPayload {
  #[serde(rename = "type")]
  kind: String,
  text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorPayload {
  message: String,
}

/// Accumulates raw bytes and yields complete events. Partial lines are
/// buffered until the terminating newline arrives.
#[derive(Default)]
pub struct SseParser {
  buffer: String,
}

impl SseParser {
  pub fn new() -> Self { Self::default() }

  /// Feed one network chunk; returns every event completed by it.
  pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<SseEvent>> {
    self.buffer.push_str(&String::from_utf8_lossy(bytes));

    // Keep the trailing partial line (if any) for the next feed.
    let consumed = match self.buffer.rfind('\n') {
      Some(idx) => {
        let rest = self.buffer.split_off(idx + 1);
        std::mem::replace(&mut self.buffer, rest)
      }
      None => return Ok(Vec::new()),
    };

    let mut events = Vec::new();
    for line in consumed.lines() {
      let line = line.trim_end_matches('\r');
      let Some(data) = line
        .strip_prefix("data: ")
        .or_else(|| line.strip_prefix("data:"))
      else {
        continue;
      };

      let payload: EventPayload = serde_json::from_str(data)
        .map_err(|e| Error::EventStream(format!("bad event payload: {e}")))?;

      match payload.kind.as_str() {
        "content_block_delta" => {
          if let Some(delta) = payload.delta
            && delta.kind == "text_delta"
            && let Some(text) = delta.text
          {
            events.push(SseEvent::Text(text));
          }
        }
        "message_stop" => events.push(SseEvent::Stop),
        "error" => {
          let message = payload
            .error
            .map(|e| e.message)
            .unwrap_or_else(|| "unknown stream error".to_owned());
          return Err(Error::EventStream(message));
        }
        _ => {}
      }
    }

    Ok(events)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_deltas_are_extracted_in_order() {
    let mut parser = SseParser::new();
    let events = parser
      .feed(
        b"event: content_block_delta\n\
          data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Hel\"}}\n\n\
          event: content_block_delta\n\
          data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"lo\"}}\n\n",
      )
      .unwrap();
    assert_eq!(
      events,
      [SseEvent::Text("Hel".into()), SseEvent::Text("lo".into())]
    );
  }

  #[test]
  fn partial_lines_are_buffered_across_feeds() {
    let mut parser = SseParser::new();
    let first = parser
      .feed(b"data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_del")
      .unwrap();
    assert!(first.is_empty());

    let second = parser.feed(b"ta\",\"text\":\"ok\"}}\n").unwrap();
    assert_eq!(second, [SseEvent::Text("ok".into())]);
  }

  #[test]
  fn message_stop_terminates_the_stream() {
    let mut parser = SseParser::new();
    let events = parser.feed(b"data: {\"type\":\"message_stop\"}\n").unwrap();
    assert_eq!(events, [SseEvent::Stop]);
  }

  #[test]
  fn housekeeping_events_are_skipped() {
    let mut parser = SseParser::new();
    let events = parser
      .feed(b"data: {\"type\":\"ping\"}\ndata: {\"type\":\"message_start\"}\n")
      .unwrap();
    assert!(events.is_empty());
  }

  #[test]
  fn error_events_surface_the_backend_message() {
    let mut parser = SseParser::new();
    let err = parser
      .feed(b"data: {\"type\":\"error\",\"error\":{\"message\":\"overloaded\"}}\n")
      .unwrap_err();
    assert!(matches!(err, Error::EventStream(msg) if msg == "overloaded"));
  }
}

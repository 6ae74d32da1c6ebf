//! Parsing of the notification event stream.
//!
//! The stream is Server-Sent Events: `data:` lines accumulate into one
//! message which is dispatched on a blank line. Payloads that are not JSON
//! are kept as raw text.

use serde::Serialize;
use serde_json::Value;

/// One message from the notification stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Notification {
    Json(Value),
    Raw { raw: String },
}

impl Notification {
    pub fn parse(data: &str) -> Self {
        match serde_json::from_str(data) {
            Ok(value) => Notification::Json(value),
            Err(_) => Notification::Raw {
                raw: data.to_string(),
            },
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Notification::Raw { .. })
    }
}

/// Incremental SSE decoder.
///
/// Bytes may arrive split at any point, including inside a UTF-8 sequence
/// or between `\r` and `\n`.
#[derive(Debug, Default)]
pub struct SseParser {
    pending: Vec<u8>,
    data: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the messages it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Notification> {
        self.pending.extend_from_slice(chunk);
        let mut out = Vec::new();

        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(message) = self.line(&line) {
                out.push(message);
            }
        }
        out
    }

    /// Flush a final message that was not terminated by a blank line.
    pub fn finish(&mut self) -> Option<Notification> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            let line = String::from_utf8_lossy(&rest).into_owned();
            if let Some(message) = self.line(line.trim_end_matches('\r')) {
                return Some(message);
            }
        }
        self.dispatch()
    }

    fn line(&mut self, line: &str) -> Option<Notification> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        // event, id and retry carry nothing the console uses.
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }

    /// Events whose data is empty, e.g. a bare `data:` line, are dropped.
    fn dispatch(&mut self) -> Option<Notification> {
        let data = std::mem::take(&mut self.data).join("\n");
        if data.is_empty() {
            return None;
        }
        Some(Notification::parse(&data))
    }
}

/// Append-only record of received notifications, in arrival order.
#[derive(Debug, Default, Clone, Serialize)]
pub struct NotificationLog {
    messages: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Notification) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Notification] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_and_raw() {
        assert_eq!(
            Notification::parse(r#"{"event": "up"}"#),
            Notification::Json(json!({"event": "up"}))
        );
        let raw = Notification::parse("link eth0 down");
        assert!(raw.is_raw());
        assert_eq!(
            serde_json::to_value(&raw).unwrap(),
            json!({"raw": "link eth0 down"})
        );
    }

    #[test]
    fn test_single_message() {
        let mut parser = SseParser::new();
        let out = parser.feed(b"data: {\"seq\": 1}\n\n");
        assert_eq!(out, vec![Notification::Json(json!({"seq": 1}))]);
    }

    #[test]
    fn test_multiline_data_is_joined() {
        let mut parser = SseParser::new();
        let out = parser.feed(b"data: {\"a\":\ndata: 1}\n\n");
        assert_eq!(out, vec![Notification::Json(json!({"a": 1}))]);
    }

    #[test]
    fn test_split_chunks_and_crlf() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: hel").is_empty());
        assert!(parser.feed(b"lo\r").is_empty());
        assert!(parser.feed(b"\n").is_empty());
        let out = parser.feed(b"\r\n");
        assert_eq!(
            out,
            vec![Notification::Raw {
                raw: "hello".into()
            }]
        );
    }

    #[test]
    fn test_comments_and_other_fields_ignored() {
        let mut parser = SseParser::new();
        let out = parser.feed(b": keepalive\n\nevent: change\nid: 7\ndata: 2\n\n");
        assert_eq!(out, vec![Notification::Json(json!(2))]);
    }

    #[test]
    fn test_empty_data_is_not_a_message() {
        let mut parser = SseParser::new();
        let out = parser.feed(b"data:\n\ndata: \n\ndata: 3\n\n");
        assert_eq!(out, vec![Notification::Json(json!(3))]);
        assert!(parser.feed(b"data:\n").is_empty());
        assert!(parser.finish().is_none());
    }

    #[test]
    fn test_several_messages_in_one_chunk() {
        let mut parser = SseParser::new();
        let out = parser.feed(b"data: 1\n\ndata: x\n\ndata: [true]\n\n");
        assert_eq!(out.len(), 3);
        assert!(out[1].is_raw());
        assert_eq!(out[2], Notification::Json(json!([true])));
    }

    #[test]
    fn test_finish_flushes_unterminated() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: {\"last\": true}").is_empty());
        assert_eq!(
            parser.finish(),
            Some(Notification::Json(json!({"last": true})))
        );
        assert_eq!(parser.finish(), None);
    }

    #[test]
    fn test_log_is_append_only() {
        let mut log = NotificationLog::new();
        assert!(log.is_empty());
        log.push(Notification::parse("1"));
        log.push(Notification::parse("oops"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.messages()[0], Notification::Json(json!(1)));
        assert!(log.messages()[1].is_raw());
    }
}

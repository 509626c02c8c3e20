//! Server-sent event framing
//!
//! Frames are encoded by hand rather than through a framework helper so the
//! wire format stays under our control: `event: <type>\ndata: <json>\n\n`.
//! Browser EventSource and fetch-based readers both consume this shape.

use std::time::Duration;

use serde_json::{json, Value};

use crate::annotations::Annotation;

/// Cadence of keep-alive frames on an open stream.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(15_000);

/// A stream with no producer activity for this long is closed after an error
/// frame.
pub const IDLE_TIMEOUT: Duration = Duration::from_millis(60_000);

pub const TIMEOUT_MESSAGE: &str = "Connection timeout";

/// One SSE frame, ready to encode.
#[derive(Debug, Clone, PartialEq)]
pub struct SseFrame {
    pub event: &'static str,
    pub data: Value,
}

impl SseFrame {
    /// A prose delta for the reader-visible transcript.
    pub fn chunk(content: &str) -> Self {
        Self {
            event: "chunk",
            data: json!({ "type": "chunk", "content": content }),
        }
    }

    /// Newly produced annotations for this fragment.
    pub fn annotations(annotations: &[Annotation]) -> Self {
        Self {
            event: "annotations",
            data: json!({ "type": "annotations", "annotations": annotations }),
        }
    }

    /// A navigation instruction. `target_page` is intentionally not clamped
    /// here; the consumer knows the document's real page count.
    pub fn navigation(target_page: u32, delay_ms: u64) -> Self {
        Self {
            event: "navigation",
            data: json!({ "type": "navigation", "targetPage": target_page, "delayMs": delay_ms }),
        }
    }

    pub fn heartbeat() -> Self {
        Self {
            event: "heartbeat",
            data: json!({ "type": "heartbeat" }),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            event: "error",
            data: json!({ "type": "error", "error": message }),
        }
    }

    pub fn done() -> Self {
        Self {
            event: "done",
            data: json!({ "type": "done" }),
        }
    }

    /// Encode to the wire format, trailing blank line included.
    pub fn encode(&self) -> String {
        format!("event: {}\ndata: {}\n\n", self.event, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(frame: &SseFrame) -> (String, Value) {
        let encoded = frame.encode();
        assert!(encoded.ends_with("\n\n"));

        let mut lines = encoded.trim_end().lines();
        let event = lines
            .next()
            .and_then(|l| l.strip_prefix("event: "))
            .expect("event line")
            .to_string();
        let data = lines
            .next()
            .and_then(|l| l.strip_prefix("data: "))
            .expect("data line");
        (event, serde_json::from_str(data).expect("valid json"))
    }

    #[test]
    fn test_frame_wire_format() {
        let (event, data) = decode(&SseFrame::chunk("hello"));
        assert_eq!(event, "chunk");
        assert_eq!(data["type"], "chunk");
        assert_eq!(data["content"], "hello");
    }

    #[test]
    fn test_timeout_error_frame() {
        let (event, data) = decode(&SseFrame::error(TIMEOUT_MESSAGE));
        assert_eq!(event, "error");
        assert_eq!(data["type"], "error");
        assert_eq!(data["error"], "Connection timeout");
    }

    #[test]
    fn test_navigation_frame_keeps_raw_target() {
        let (event, data) = decode(&SseFrame::navigation(10002, 400));
        assert_eq!(event, "navigation");
        assert_eq!(data["targetPage"], 10002);
        assert_eq!(data["delayMs"], 400);
    }

    #[test]
    fn test_annotations_frame() {
        let anns = vec![Annotation::highlight(
            1,
            100,
            200,
            300,
            50,
            "rgba(255,255,0,0.3)".to_string(),
        )];
        let (event, data) = decode(&SseFrame::annotations(&anns));
        assert_eq!(event, "annotations");
        assert_eq!(data["annotations"][0]["page"], 1);
        assert_eq!(data["annotations"][0]["width"], 300);
    }

    #[test]
    fn test_single_frame_is_two_lines() {
        let encoded = SseFrame::heartbeat().encode();
        assert_eq!(encoded.trim_end().lines().count(), 2);
    }
}

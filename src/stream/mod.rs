//! Stream bridging and transport
//!
//! An assist request happens in two phases: an initiation call stores the
//! context blob ([`StreamPayload`]) under a stream id, and a separate
//! streaming call picks it up and produces SSE frames. The phases may run in
//! isolated execution contexts, hence the TTL store in between.

pub mod driver;
pub mod payload;
pub mod sse;
pub mod store;

pub use driver::StreamDriver;
pub use payload::{ChatMessage, ChatRole, PageHint, PdfTextContext, StreamPayload};
pub use sse::{SseFrame, HEARTBEAT_INTERVAL, IDLE_TIMEOUT};
pub use store::{MemoryPayloadStore, PayloadStore, PAYLOAD_TTL};

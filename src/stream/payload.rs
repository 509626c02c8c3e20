//! Stream payload types
//!
//! The initiation step of an assist request packages everything the streaming
//! step needs (conversation so far, extracted page text, paging metadata)
//! into a [`StreamPayload`] keyed by a stream id. The streaming step may run
//! in a different execution context, so the payload has to be fully
//! self-contained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who said a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One prior conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Extracted text for the page in view plus its neighbors, so the model can
/// answer questions that spill across page breaks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfTextContext {
    pub current: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    pub current_page: u32,
    pub total_pages: u32,
}

/// A section-to-page hint ("Conclusion starts on page 14") the model can use
/// when deciding where to send the reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageHint {
    pub label: String,
    pub page: u32,
}

/// The bridging record between the initiation and streaming steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamPayload {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub pdf_text: PdfTextContext,
    pub pdf_id: String,
    pub current_page: u32,
    #[serde(default)]
    pub page_hints: Vec<PageHint>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

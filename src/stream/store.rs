//! Ephemeral payload store
//!
//! Bridges the stateless initiation step and the streaming step. Entries live
//! for [`PAYLOAD_TTL`]; cleanup is lazy, with every call sweeping expired
//! entries before doing its own work, so the store needs no background task
//! and is safe inside short-lived execution contexts.
//!
//! The in-memory implementation is process-local by design: two instances of
//! the service do not see each other's payloads. Callers handle that by
//! re-sending the payload inline when a stream id misses.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::payload::StreamPayload;

/// How long a stored payload stays retrievable.
pub const PAYLOAD_TTL: Duration = Duration::from_millis(120_000);

/// Keyed payload handoff between isolated request steps.
///
/// Implementations are last-write-wins per key; each stream id is expected to
/// be written exactly once.
pub trait PayloadStore: Send + Sync {
    fn set(&self, id: &str, payload: StreamPayload);
    fn get(&self, id: &str) -> Option<StreamPayload>;
    fn delete(&self, id: &str) -> Option<StreamPayload>;
}

struct Entry {
    stored_at: Instant,
    payload: StreamPayload,
}

/// Process-local store with lazy TTL eviction.
pub struct MemoryPayloadStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryPayloadStore {
    pub fn new() -> Self {
        Self::with_ttl(PAYLOAD_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live (unswept) entries. Mostly useful in tests and health
    /// reporting.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sweep(&self, entries: &mut HashMap<String, Entry>) {
        let ttl = self.ttl;
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);

        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, "swept expired stream payloads");
        }
    }
}

impl Default for MemoryPayloadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadStore for MemoryPayloadStore {
    fn set(&self, id: &str, payload: StreamPayload) {
        let mut entries = self.entries.lock();
        self.sweep(&mut entries);
        entries.insert(
            id.to_string(),
            Entry {
                stored_at: Instant::now(),
                payload,
            },
        );
    }

    fn get(&self, id: &str) -> Option<StreamPayload> {
        let mut entries = self.entries.lock();
        self.sweep(&mut entries);
        entries.get(id).map(|entry| entry.payload.clone())
    }

    fn delete(&self, id: &str) -> Option<StreamPayload> {
        let mut entries = self.entries.lock();
        self.sweep(&mut entries);
        entries.remove(id).map(|entry| entry.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::payload::PdfTextContext;

    fn payload(pdf_id: &str) -> StreamPayload {
        StreamPayload {
            messages: Vec::new(),
            pdf_text: PdfTextContext {
                current: "text".to_string(),
                previous: None,
                next: None,
                current_page: 1,
                total_pages: 3,
            },
            pdf_id: pdf_id.to_string(),
            current_page: 1,
            page_hints: Vec::new(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_set_then_get() {
        let store = MemoryPayloadStore::new();
        store.set("s1", payload("pdf-1"));

        let found = store.get("s1").expect("payload present");
        assert_eq!(found.pdf_id, "pdf-1");
    }

    #[test]
    fn test_get_missing() {
        let store = MemoryPayloadStore::new();
        assert!(store.get("nope").is_none());
    }

    #[test]
    fn test_entry_expires() {
        let store = MemoryPayloadStore::with_ttl(Duration::from_millis(30));
        store.set("s1", payload("pdf-1"));
        assert!(store.get("s1").is_some());

        std::thread::sleep(Duration::from_millis(60));
        assert!(store.get("s1").is_none());
    }

    #[test]
    fn test_set_sweeps_expired_entries() {
        let store = MemoryPayloadStore::with_ttl(Duration::from_millis(30));
        store.set("old-1", payload("pdf-1"));
        store.set("old-2", payload("pdf-2"));

        std::thread::sleep(Duration::from_millis(60));
        store.set("fresh", payload("pdf-3"));

        // the set call itself evicted the stale entries
        assert_eq!(store.len(), 1);
        assert!(store.get("fresh").is_some());
    }

    #[test]
    fn test_delete_removes_entry() {
        let store = MemoryPayloadStore::new();
        store.set("s1", payload("pdf-1"));

        let removed = store.delete("s1").expect("was present");
        assert_eq!(removed.pdf_id, "pdf-1");
        assert!(store.get("s1").is_none());
        assert!(store.delete("s1").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let store = MemoryPayloadStore::new();
        store.set("s1", payload("pdf-1"));
        store.set("s1", payload("pdf-2"));

        assert_eq!(store.get("s1").unwrap().pdf_id, "pdf-2");
        assert_eq!(store.len(), 1);
    }
}

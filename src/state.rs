//! Application state management

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::llm::TokenSource;
use crate::stream::{MemoryPayloadStore, PayloadStore, StreamDriver};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    payloads: Arc<dyn PayloadStore>,
    source: Arc<dyn TokenSource>,
    driver: StreamDriver,
}

impl AppState {
    /// Create application state around a token source. The payload store and
    /// stream driver take their timing from the config.
    pub fn new(config: Config, source: Arc<dyn TokenSource>) -> Self {
        let payloads: Arc<dyn PayloadStore> = Arc::new(MemoryPayloadStore::with_ttl(
            Duration::from_millis(config.stream.payload_ttl_ms),
        ));
        let driver = StreamDriver::with_timing(
            Duration::from_millis(config.stream.heartbeat_ms),
            Duration::from_millis(config.stream.idle_timeout_ms),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                payloads,
                source,
                driver,
            }),
        }
    }

    /// Swap in a different payload store, e.g. a shared one in a multi-node
    /// deployment.
    pub fn with_payload_store(config: Config, source: Arc<dyn TokenSource>, payloads: Arc<dyn PayloadStore>) -> Self {
        let driver = StreamDriver::with_timing(
            Duration::from_millis(config.stream.heartbeat_ms),
            Duration::from_millis(config.stream.idle_timeout_ms),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                payloads,
                source,
                driver,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn payloads(&self) -> &Arc<dyn PayloadStore> {
        &self.inner.payloads
    }

    pub fn source(&self) -> Arc<dyn TokenSource> {
        self.inner.source.clone()
    }

    pub fn driver(&self) -> &StreamDriver {
        &self.inner.driver
    }
}

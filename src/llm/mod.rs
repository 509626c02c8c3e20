//! Model provider boundary
//!
//! The pipeline consumes text fragments; where they come from is someone
//! else's problem. [`TokenSource`] is that seam: a provider turns a
//! [`StreamPayload`] (conversation + page context) into a fragment stream.
//! Real model backends live behind this trait; the crate ships only a
//! scripted implementation for tests and local development.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{stream, Stream, StreamExt};
use thiserror::Error;

use crate::stream::payload::StreamPayload;

/// Fragments as the producer emits them, boundaries and all.
pub type FragmentStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Token producer errors
#[derive(Debug, Error)]
pub enum TokenSourceError {
    #[error("token source unavailable: {0}")]
    Unavailable(String),
}

/// A producer of response fragments for one assist request.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Start producing a response for `payload`. The returned stream is
    /// consumed exactly once.
    async fn fragments(&self, payload: &StreamPayload)
        -> Result<FragmentStream, TokenSourceError>;
}

/// Replays a fixed fragment script, optionally pausing between fragments to
/// imitate generation latency. Used in tests and as the development stand-in
/// until a real model provider is wired in.
pub struct ScriptedSource {
    fragments: Vec<String>,
    delay: Option<Duration>,
}

impl ScriptedSource {
    pub fn new(fragments: Vec<String>) -> Self {
        Self {
            fragments,
            delay: None,
        }
    }

    pub fn with_delay(fragments: Vec<String>, delay: Duration) -> Self {
        Self {
            fragments,
            delay: Some(delay),
        }
    }

    /// Canned walkthrough covering prose, a highlight, and a navigation,
    /// with fragment boundaries in awkward places on purpose.
    pub fn demo() -> Self {
        Self::with_delay(
            vec![
                "Here is the passage that answers your question. [HIGH".to_string(),
                "LIGHT 80 240 420 60] The author states the main claim directly. ".to_string(),
                "The supporting table is on the next page. [NEXT PAGE]".to_string(),
            ],
            Duration::from_millis(350),
        )
    }
}

#[async_trait]
impl TokenSource for ScriptedSource {
    async fn fragments(
        &self,
        _payload: &StreamPayload,
    ) -> Result<FragmentStream, TokenSourceError> {
        let delay = self.delay;
        let fragments = self.fragments.clone();

        let stream = stream::iter(fragments).then(move |fragment| async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            fragment
        });

        Ok(Box::pin(stream))
    }
}

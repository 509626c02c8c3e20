//! Stream driver
//!
//! Pulls fragments from a token source, runs each through the pipeline, and
//! turns the results into SSE frames: prose chunks, annotation batches,
//! delayed navigation frames, heartbeats, and a timeout error when the
//! producer goes quiet for too long.

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::llm::TokenSource;
use crate::pipeline::{PipelineOptions, StreamPipeline};

use super::payload::StreamPayload;
use super::sse::{SseFrame, HEARTBEAT_INTERVAL, IDLE_TIMEOUT, TIMEOUT_MESSAGE};

/// Per-request frame producer. Cheap to clone; holds only timing settings.
#[derive(Debug, Clone)]
pub struct StreamDriver {
    heartbeat: Duration,
    idle_timeout: Duration,
}

impl Default for StreamDriver {
    fn default() -> Self {
        Self {
            heartbeat: HEARTBEAT_INTERVAL,
            idle_timeout: IDLE_TIMEOUT,
        }
    }
}

impl StreamDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timing(heartbeat: Duration, idle_timeout: Duration) -> Self {
        Self {
            heartbeat,
            idle_timeout,
        }
    }

    /// Drive one response stream to completion. The returned stream yields
    /// frames until the producer finishes (`done`), times out (`error`), or
    /// the consumer walks away and drops it.
    pub fn run(
        &self,
        source: Arc<dyn TokenSource>,
        payload: StreamPayload,
        options: PipelineOptions,
    ) -> impl Stream<Item = SseFrame> + Send + 'static {
        let (tx, rx) = mpsc::channel::<SseFrame>(32);
        let heartbeat_every = self.heartbeat;
        let idle_timeout = self.idle_timeout;

        tokio::spawn(async move {
            let trace = options.stream_trace;
            let total_pages = payload.pdf_text.total_pages;
            let mut pipeline = StreamPipeline::new(payload.current_page, options);

            let mut fragments = match source.fragments(&payload).await {
                Ok(stream) => stream,
                Err(err) => {
                    tracing::warn!(error = %err, "token source failed to start");
                    send(&tx, SseFrame::error(&err.to_string()), trace).await;
                    return;
                }
            };

            let mut heartbeat =
                time::interval_at(Instant::now() + heartbeat_every, heartbeat_every);
            heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut deadline = Instant::now() + idle_timeout;

            loop {
                tokio::select! {
                    fragment = fragments.next() => match fragment {
                        Some(text) => {
                            deadline = Instant::now() + idle_timeout;
                            let output = pipeline.process_fragment(&text);

                            if !output.prose.is_empty() {
                                send(&tx, SseFrame::chunk(&output.prose), trace).await;
                            }
                            if !output.annotations.is_empty() {
                                send(&tx, SseFrame::annotations(&output.annotations), trace).await;
                            }
                            if let Some(cue) = output.navigation {
                                if let Some(target) = cue.target_page {
                                    // later implicit-page commands should land
                                    // where the reader is about to go
                                    pipeline.set_current_page(clamp_to_document(target, total_pages));

                                    let tx_nav = tx.clone();
                                    let delay = Duration::from_millis(cue.delay_ms);
                                    tokio::spawn(async move {
                                        time::sleep(delay).await;
                                        let _ = tx_nav
                                            .send(SseFrame::navigation(target, cue.delay_ms))
                                            .await;
                                    });
                                }
                            }
                        }
                        None => {
                            if let Some(rest) = pipeline.finish() {
                                if !rest.is_empty() {
                                    send(&tx, SseFrame::chunk(&rest), trace).await;
                                }
                            }
                            send(&tx, SseFrame::done(), trace).await;
                            break;
                        }
                    },
                    _ = heartbeat.tick() => {
                        send(&tx, SseFrame::heartbeat(), trace).await;
                    }
                    _ = time::sleep_until(deadline) => {
                        send(&tx, SseFrame::error(TIMEOUT_MESSAGE), trace).await;
                        break;
                    }
                }
            }
        });

        futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|frame| (frame, rx))
        })
    }
}

async fn send(tx: &mpsc::Sender<SseFrame>, frame: SseFrame, trace: bool) {
    if trace {
        tracing::debug!(event = frame.event, "sse frame");
    }
    let _ = tx.send(frame).await;
}

/// The driver's own page context is clamped to the document; the emitted
/// frame keeps the raw target because only the consumer renders pages.
fn clamp_to_document(target: u32, total_pages: u32) -> u32 {
    if total_pages >= 1 {
        target.clamp(1, total_pages)
    } else {
        target.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{FragmentStream, ScriptedSource, TokenSource, TokenSourceError};
    use crate::stream::payload::PdfTextContext;
    use async_trait::async_trait;

    fn payload(current_page: u32, total_pages: u32) -> StreamPayload {
        StreamPayload {
            messages: Vec::new(),
            pdf_text: PdfTextContext {
                current: "page text".to_string(),
                previous: None,
                next: None,
                current_page,
                total_pages,
            },
            pdf_id: "pdf-1".to_string(),
            current_page,
            page_hints: Vec::new(),
            created_at: chrono::Utc::now(),
        }
    }

    /// A producer that never says anything.
    struct SilentSource;

    #[async_trait]
    impl TokenSource for SilentSource {
        async fn fragments(
            &self,
            _payload: &StreamPayload,
        ) -> Result<FragmentStream, TokenSourceError> {
            Ok(Box::pin(futures::stream::pending::<String>()))
        }
    }

    #[tokio::test]
    async fn test_happy_path_frame_sequence() {
        let source = Arc::new(ScriptedSource::new(vec![
            "The answer is here. ".to_string(),
            "[HIGHLIGHT 100 200 300 50 1] as marked.".to_string(),
        ]));
        let driver = StreamDriver::new();

        let frames: Vec<SseFrame> = driver
            .run(source, payload(1, 5), PipelineOptions::default())
            .collect()
            .await;

        let events: Vec<&str> = frames.iter().map(|f| f.event).collect();
        assert_eq!(events, vec!["chunk", "chunk", "annotations", "done"]);
        assert_eq!(frames[0].data["content"], "The answer is here. ");
        assert_eq!(frames[2].data["annotations"][0]["page"], 1);
    }

    #[tokio::test]
    async fn test_split_command_survives_fragment_boundary() {
        let source = Arc::new(ScriptedSource::new(vec![
            "look [HIGH".to_string(),
            "LIGHT 1 100 200 300 50] done".to_string(),
        ]));
        let driver = StreamDriver::new();

        let frames: Vec<SseFrame> = driver
            .run(source, payload(1, 5), PipelineOptions::default())
            .collect()
            .await;

        let annotation_frames: Vec<_> =
            frames.iter().filter(|f| f.event == "annotations").collect();
        assert_eq!(annotation_frames.len(), 1);
        assert_eq!(annotation_frames[0].data["annotations"][0]["x"], 100);
    }

    #[tokio::test]
    async fn test_heartbeats_while_producer_thinks() {
        let source = Arc::new(ScriptedSource::with_delay(
            vec!["slow answer".to_string()],
            Duration::from_millis(80),
        ));
        let driver = StreamDriver::with_timing(
            Duration::from_millis(20),
            Duration::from_millis(1_000),
        );

        let frames: Vec<SseFrame> = driver
            .run(source, payload(1, 5), PipelineOptions::default())
            .collect()
            .await;

        assert!(frames.iter().any(|f| f.event == "heartbeat"));
        assert_eq!(frames.last().map(|f| f.event), Some("done"));
    }

    #[tokio::test]
    async fn test_idle_stream_times_out_with_error_frame() {
        let driver = StreamDriver::with_timing(
            Duration::from_millis(1_000),
            Duration::from_millis(40),
        );

        let frames: Vec<SseFrame> = driver
            .run(Arc::new(SilentSource), payload(1, 5), PipelineOptions::default())
            .collect()
            .await;

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "error");
        assert_eq!(frames[0].data["error"], "Connection timeout");
    }

    #[test]
    fn test_page_context_clamping() {
        assert_eq!(clamp_to_document(10002, 12), 12);
        assert_eq!(clamp_to_document(0, 12), 1);
        assert_eq!(clamp_to_document(5, 12), 5);
        // unknown document length: only the lower bound applies
        assert_eq!(clamp_to_document(10002, 0), 10002);
    }

    #[tokio::test]
    async fn test_navigation_frame_arrives_after_delay() {
        let source = Arc::new(ScriptedSource::new(vec![
            "the end [LAST PAGE]".to_string(),
        ]));
        let driver = StreamDriver::new();

        let frames: Vec<SseFrame> = driver
            .run(source, payload(3, 12), PipelineOptions::default())
            .collect()
            .await;

        let nav = frames
            .iter()
            .find(|f| f.event == "navigation")
            .expect("navigation frame");
        // sentinel passes through unclamped; the consumer clamps
        assert_eq!(nav.data["targetPage"], 3 + 9999);
        assert_eq!(nav.data["delayMs"], 400);
    }
}

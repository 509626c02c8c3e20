//! The per-stream extraction pipeline
//!
//! One [`StreamPipeline`] per model response. Each fragment runs through the
//! recognizer, the grammar, the normalizer, and (independently) the
//! navigation extractor, synchronously and in arrival order. Nothing here
//! does I/O; suspension only ever happens between fragments, under the
//! producer's control.

use crate::annotations::fallback::{self, FallbackHint};
use crate::annotations::{normalizer, Annotation};
use crate::commands::recognizer::CommandRecognizer;
use crate::commands::types::CommandError;
use crate::navigation::{self, NavigationCue};

/// Tracing switches handed to the pipeline at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub debug: bool,
    pub annotation_trace: bool,
    pub stream_trace: bool,
}

/// Everything one fragment produced.
#[derive(Debug, Default)]
pub struct FragmentOutput {
    /// Prose safe to show the reader, commands removed
    pub prose: String,
    /// Annotations in left-to-right match order
    pub annotations: Vec<Annotation>,
    /// At most one navigation cue per fragment
    pub navigation: Option<NavigationCue>,
}

/// Stateful fragment processor for a single response stream.
pub struct StreamPipeline {
    recognizer: CommandRecognizer,
    current_page: u32,
    options: PipelineOptions,
}

impl StreamPipeline {
    /// `current_page` is the page in view when the stream starts; commands
    /// that omit a page land there.
    pub fn new(current_page: u32, options: PipelineOptions) -> Self {
        Self {
            recognizer: CommandRecognizer::new(),
            current_page: current_page.max(1),
            options,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Update the page context, e.g. after the consumer followed a
    /// navigation cue.
    pub fn set_current_page(&mut self, page: u32) {
        self.current_page = page.max(1);
    }

    /// Process one fragment. Never fails: a parse fault is logged and the
    /// fragment's prose passes through untouched, so the reader-visible
    /// stream survives anything the model emits.
    pub fn process_fragment(&mut self, fragment: &str) -> FragmentOutput {
        match self.try_process(fragment) {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(error = %err, "fragment parse fault, passing prose through");
                FragmentOutput {
                    prose: fragment.to_string(),
                    ..FragmentOutput::default()
                }
            }
        }
    }

    fn try_process(&mut self, fragment: &str) -> Result<FragmentOutput, CommandError> {
        let scan = self.recognizer.scan(fragment, self.current_page);

        let mut annotations: Vec<Annotation> = scan
            .commands
            .iter()
            .filter_map(|cmd| normalizer::normalize(cmd, self.current_page))
            .collect();

        // the model asked for a highlight but every reading was unusable;
        // give the reader something to look at anyway
        if annotations.is_empty() && scan.had_commands {
            let hint = FallbackHint::from_raw(&scan.raw_tokens.join(" "));
            annotations.push(fallback::synthesize(self.current_page, &hint));
        }

        let cue = navigation::extract(&scan.scanned, self.current_page);
        let navigation = cue.has_navigation.then_some(cue);

        if self.options.annotation_trace && !annotations.is_empty() {
            tracing::debug!(
                count = annotations.len(),
                page = self.current_page,
                "fragment produced annotations"
            );
        }
        if self.options.debug {
            tracing::debug!(
                fragment_len = fragment.len(),
                prose_len = scan.prose.len(),
                commands = scan.commands.len(),
                navigated = navigation.is_some(),
                "processed fragment"
            );
        }

        Ok(FragmentOutput {
            prose: scan.prose,
            annotations,
            navigation,
        })
    }

    /// End of stream: release whatever the carry-over buffer still holds as
    /// plain prose.
    pub fn finish(&mut self) -> Option<String> {
        self.recognizer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::fallback::FALLBACK_COLOR;
    use crate::annotations::AnnotationType;
    use crate::navigation::LAST_PAGE_OFFSET;

    fn pipeline(page: u32) -> StreamPipeline {
        StreamPipeline::new(page, PipelineOptions::default())
    }

    #[test]
    fn test_prose_and_annotation() {
        let mut p = pipeline(1);
        let out = p.process_fragment("The key claim is here. [HIGHLIGHT 100 200 300 50 1] See above.");

        assert_eq!(out.prose, "The key claim is here. See above.");
        assert_eq!(out.annotations.len(), 1);
        let ann = &out.annotations[0];
        assert_eq!(ann.page, 1);
        assert_eq!((ann.x, ann.y), (100, 200));
        assert_eq!((ann.width, ann.height), (Some(300), Some(50)));
        assert!(out.navigation.is_none());
    }

    #[test]
    fn test_split_command_across_fragments() {
        let mut p = pipeline(1);

        let first = p.process_fragment("look [HIGH");
        assert!(first.annotations.is_empty());
        assert_eq!(first.prose, "look ");

        let second = p.process_fragment("LIGHT 1 100 200 300 50] there");
        assert_eq!(second.annotations.len(), 1);
        assert_eq!(second.annotations[0].page, 1);
        assert_eq!(second.prose, " there");
    }

    #[test]
    fn test_degenerate_command_synthesizes_fallback() {
        let mut p = pipeline(6);
        let out = p.process_fragment("important bit [HIGHLIGHT 100 100 0 50 2] truly");

        assert_eq!(out.annotations.len(), 1);
        let ann = &out.annotations[0];
        assert_eq!(ann.annotation_type, AnnotationType::Highlight);
        assert_eq!(ann.page, 6);
        assert_eq!(ann.color, FALLBACK_COLOR);
    }

    #[test]
    fn test_fallback_not_invoked_when_any_annotation_valid() {
        let mut p = pipeline(1);
        let out = p.process_fragment("[HIGHLIGHT 100 100 0 50 2] [CIRCLE 300 400 50]");

        // one valid circle, so no synthetic highlight
        assert_eq!(out.annotations.len(), 1);
        assert_eq!(out.annotations[0].annotation_type, AnnotationType::Circle);
    }

    #[test]
    fn test_navigation_cue_surfaced() {
        let mut p = pipeline(3);
        let out = p.process_fragment("summary lives at the end [LAST PAGE]");

        let cue = out.navigation.expect("navigation cue");
        assert_eq!(cue.target_page, Some(3 + LAST_PAGE_OFFSET));
        assert_eq!(out.prose, "summary lives at the end ");
    }

    #[test]
    fn test_commands_emitted_in_order() {
        let mut p = pipeline(2);
        let out = p.process_fragment(
            "[CIRCLE 2 300 400 50] first, then [HIGHLIGHT 100 150 300 80 2]",
        );

        assert_eq!(out.annotations.len(), 2);
        assert_eq!(out.annotations[0].annotation_type, AnnotationType::Circle);
        assert_eq!(out.annotations[1].annotation_type, AnnotationType::Highlight);
    }

    #[test]
    fn test_page_context_update() {
        let mut p = pipeline(1);
        p.set_current_page(5);
        let out = p.process_fragment("[HIGHLIGHT 100 150 300 80]");
        assert_eq!(out.annotations[0].page, 5);
    }

    #[test]
    fn test_finish_returns_held_prose() {
        let mut p = pipeline(1);
        p.process_fragment("dangling [HIGH");
        assert_eq!(p.finish().as_deref(), Some("[HIGH"));
    }

    #[test]
    fn test_plain_fragment_passes_through() {
        let mut p = pipeline(1);
        let text = "no directives in this sentence at all.";
        let out = p.process_fragment(text);

        assert_eq!(out.prose, text);
        assert!(out.annotations.is_empty());
        assert!(out.navigation.is_none());
    }
}

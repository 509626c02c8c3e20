//! Assistant annotation production
//!
//! Converts resolved highlight/circle commands into bounds-checked, renderable
//! [`Annotation`] records, with a fallback synthesizer for fragments where the
//! model signaled intent but its numbers were unusable.

pub mod fallback;
pub mod normalizer;
pub mod types;

pub use fallback::{synthesize, FallbackHint, FALLBACK_COLOR};
pub use normalizer::normalize;
pub use types::{AnimationEffect, Annotation, AnnotationType, Importance};

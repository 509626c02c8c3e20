//! Fallback highlight synthesis
//!
//! When the model clearly tried to highlight something but every reading came
//! out degenerate, the reader should still see feedback. The synthesizer
//! places a single muted highlight near the top of the current page, sized
//! from whatever textual hint the raw command carried.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{AnimationEffect, Annotation, AnnotationType, Importance};

/// Muted fill so a guessed region does not read as a confident one.
pub const FALLBACK_COLOR: &str = "rgba(255,255,0,0.15)";

pub const FALLBACK_X: u32 = 80;
pub const FALLBACK_HEIGHT: u32 = 36;
/// Vertical placement when the hint names a title.
pub const FALLBACK_TITLE_Y: u32 = 120;
pub const FALLBACK_Y: u32 = 200;

/// Estimated pixels per character when sizing from quoted text.
const CHAR_WIDTH: f64 = 7.2;
const WIDTH_FLOOR: f64 = 160.0;
const WIDTH_CEIL: f64 = 520.0;
const WIDTH_DEFAULT: u32 = 320;

static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)""#).expect("valid quoted text pattern"));

/// What the raw command text suggested about the intended target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FallbackHint {
    /// Length of quoted text inside the command, if any
    pub text_len: Option<usize>,
    /// The command mentioned a title or heading
    pub title_like: bool,
}

impl FallbackHint {
    /// Derive a hint from the raw text of the fragment's command tokens.
    pub fn from_raw(raw: &str) -> Self {
        let text_len = QUOTED
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().chars().count());

        let lowered = raw.to_ascii_lowercase();
        let title_like = lowered.contains("title") || lowered.contains("heading");

        Self {
            text_len,
            title_like,
        }
    }
}

/// Produce the single synthetic highlight for a fragment whose commands all
/// failed normalization.
pub fn synthesize(current_page: u32, hint: &FallbackHint) -> Annotation {
    let width = match hint.text_len {
        Some(len) => ((len as f64) * CHAR_WIDTH).clamp(WIDTH_FLOOR, WIDTH_CEIL).round() as u32,
        None => WIDTH_DEFAULT,
    };

    let y = if hint.title_like {
        FALLBACK_TITLE_Y
    } else {
        FALLBACK_Y
    };

    Annotation {
        annotation_type: AnnotationType::Highlight,
        page: current_page,
        x: FALLBACK_X,
        y,
        width: Some(width),
        height: Some(FALLBACK_HEIGHT),
        radius: None,
        color: FALLBACK_COLOR.to_string(),
        animation_effect: AnimationEffect::Pulse,
        importance: Importance::Low,
        is_automatic: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let ann = synthesize(4, &FallbackHint::default());
        assert_eq!(ann.page, 4);
        assert_eq!((ann.x, ann.y), (FALLBACK_X, FALLBACK_Y));
        assert_eq!(ann.width, Some(WIDTH_DEFAULT));
        assert_eq!(ann.height, Some(FALLBACK_HEIGHT));
        assert_eq!(ann.color, FALLBACK_COLOR);
        assert_eq!(ann.importance, Importance::Low);
    }

    #[test]
    fn test_width_scales_with_text_length() {
        let hint = FallbackHint {
            text_len: Some(40),
            title_like: false,
        };
        // 40 * 7.2 = 288
        assert_eq!(synthesize(1, &hint).width, Some(288));
    }

    #[test]
    fn test_width_clamped_to_range() {
        let short = FallbackHint {
            text_len: Some(5),
            title_like: false,
        };
        assert_eq!(synthesize(1, &short).width, Some(160));

        let long = FallbackHint {
            text_len: Some(500),
            title_like: false,
        };
        assert_eq!(synthesize(1, &long).width, Some(520));
    }

    #[test]
    fn test_title_hint_moves_up() {
        let hint = FallbackHint {
            text_len: None,
            title_like: true,
        };
        assert_eq!(synthesize(1, &hint).y, FALLBACK_TITLE_Y);
    }

    #[test]
    fn test_hint_from_raw_quoted_text() {
        let hint = FallbackHint::from_raw(r#"[HIGHLIGHT "the main theorem" 0 0]"#);
        assert_eq!(hint.text_len, Some(16));
        assert!(!hint.title_like);
    }

    #[test]
    fn test_hint_from_raw_title() {
        let hint = FallbackHint::from_raw("[HIGHLIGHT the title]");
        assert!(hint.title_like);
        assert_eq!(hint.text_len, None);
    }
}

//! Command parsing types
//!
//! Intermediate records between raw model output and finished annotations.
//! None of these are persisted; they live for one fragment.

use thiserror::Error;

/// Annotation command keywords the grammar understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Highlight,
    Circle,
}

/// Which grammar variant claimed a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarVariant {
    /// `[HIGHLIGHT page x y w h]`
    PageFirst,
    /// `[HIGHLIGHT x y w h page]`
    CoordinateFirst,
    /// `[HIGHLIGHT x y w h]`, page taken from the reading context
    ImplicitPage,
    /// `[HIGHLIGHT: x, y, w, h, page]`
    Delimited,
    /// `[HIGHLIGHT x=.. y=.. w=.. h=..]`
    KeyValue,
}

/// Spatial payload of a resolved command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Box { width: u32, height: u32 },
    Dot { radius: u32 },
}

/// One bracket token resolved to exactly one interpretation.
///
/// `start` is the byte offset of the match in the scanned text, used to keep
/// emission order left-to-right within a fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCommand {
    pub raw: String,
    pub kind: CommandKind,
    pub variant: GrammarVariant,
    pub start: usize,
    /// 0 means the command named no usable page; the normalizer substitutes
    /// the page currently in view.
    pub page: u32,
    pub x: u32,
    pub y: u32,
    pub shape: Shape,
    pub color: Option<String>,
}

/// Command parsing errors
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("numeric argument out of range: {0}")]
    BadNumber(String),

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_accessors() {
        let hl = Shape::Box {
            width: 300,
            height: 50,
        };
        assert!(matches!(hl, Shape::Box { width: 300, .. }));

        let circle = Shape::Dot { radius: 40 };
        assert!(matches!(circle, Shape::Dot { radius: 40 }));
    }
}

//! Annotation normalization
//!
//! Turns a resolved command into a bounds-checked [`Annotation`], or nothing
//! when the numbers are unusable. Zero-sized shapes are rejected before
//! clamping: clamping a zero width up to the minimum would invent a region
//! the model never asked for.

use crate::commands::types::{ResolvedCommand, Shape};

use super::types::{
    Annotation, CIRCLE_COLOR, HEIGHT_MAX, HEIGHT_MIN, HIGHLIGHT_COLOR, RADIUS_MAX, RADIUS_MIN,
    WIDTH_MAX, WIDTH_MIN, X_MAX, Y_MAX,
};

/// Normalize one resolved command. `current_page` substitutes for a zero
/// page, which some commands produce by writing `page=0` or a leading 0.
pub fn normalize(cmd: &ResolvedCommand, current_page: u32) -> Option<Annotation> {
    let page = if cmd.page == 0 {
        tracing::warn!(raw = %cmd.raw, "command named page 0, using current page");
        current_page
    } else {
        cmd.page
    };

    let x = cmd.x.min(X_MAX);
    let y = cmd.y.min(Y_MAX);

    match cmd.shape {
        Shape::Box { width, height } => {
            if width == 0 || height == 0 {
                tracing::warn!(raw = %cmd.raw, width, height, "skipping degenerate highlight");
                return None;
            }
            let color = cmd
                .color
                .clone()
                .unwrap_or_else(|| HIGHLIGHT_COLOR.to_string());
            Some(Annotation::highlight(
                page,
                x,
                y,
                width.clamp(WIDTH_MIN, WIDTH_MAX),
                height.clamp(HEIGHT_MIN, HEIGHT_MAX),
                color,
            ))
        }
        Shape::Dot { radius } => {
            if radius == 0 {
                tracing::warn!(raw = %cmd.raw, "skipping degenerate circle");
                return None;
            }
            let color = cmd.color.clone().unwrap_or_else(|| CIRCLE_COLOR.to_string());
            Some(Annotation::circle(
                page,
                x,
                y,
                radius.clamp(RADIUS_MIN, RADIUS_MAX),
                color,
            ))
        }
    }
}

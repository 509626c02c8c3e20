//! Annotation types emitted to the rendering layer
//!
//! An [`Annotation`] is a single drawable directive: "highlight this region",
//! "circle this spot". The assistant pipeline produces only highlights and
//! circles; the remaining variants exist for parity with user-drawn markup so
//! both kinds share one wire format. Serialized as camelCase JSON.

use serde::{Deserialize, Serialize};

/// Horizontal coordinate bound (page-space pixels).
pub const X_MAX: u32 = 800;
/// Vertical coordinate bound (page-space pixels).
pub const Y_MAX: u32 = 1200;

pub const WIDTH_MIN: u32 = 10;
pub const WIDTH_MAX: u32 = 1000;
pub const HEIGHT_MIN: u32 = 10;
pub const HEIGHT_MAX: u32 = 400;
pub const RADIUS_MIN: u32 = 5;
pub const RADIUS_MAX: u32 = 400;

/// Default fill for highlights when the command carries no color.
pub const HIGHLIGHT_COLOR: &str = "rgba(255,255,0,0.3)";
/// Default stroke for circles when the command carries no color.
pub const CIRCLE_COLOR: &str = "rgba(255,0,0,0.7)";

/// Kinds of drawable annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationType {
    Highlight,
    Circle,
    Underline,
    Arrow,
    Text,
    Rectangle,
    Freeform,
}

/// Entrance animation applied by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationEffect {
    Pulse,
    Fade,
    None,
}

/// Visual weight of an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Normal,
    High,
}

/// A single drawable directive, immutable once built.
///
/// Ownership passes to the rendering layer when emitted; the pipeline keeps
/// no reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(rename = "type")]
    pub annotation_type: AnnotationType,
    /// 1-indexed page the annotation is drawn on
    pub page: u32,
    pub x: u32,
    pub y: u32,
    /// Highlight only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Highlight only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Circle only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
    /// CSS color string
    pub color: String,
    pub animation_effect: AnimationEffect,
    pub importance: Importance,
    /// True for annotations produced by the assistant rather than the reader
    pub is_automatic: bool,
}

impl Annotation {
    /// Build a highlight. Callers are expected to pass already-clamped,
    /// positive dimensions.
    pub fn highlight(page: u32, x: u32, y: u32, width: u32, height: u32, color: String) -> Self {
        Self {
            annotation_type: AnnotationType::Highlight,
            page,
            x,
            y,
            width: Some(width),
            height: Some(height),
            radius: None,
            color,
            animation_effect: AnimationEffect::Pulse,
            importance: Importance::Normal,
            is_automatic: true,
        }
    }

    /// Build a circle. Callers are expected to pass an already-clamped,
    /// positive radius.
    pub fn circle(page: u32, x: u32, y: u32, radius: u32, color: String) -> Self {
        Self {
            annotation_type: AnnotationType::Circle,
            page,
            x,
            y,
            width: None,
            height: None,
            radius: Some(radius),
            color,
            animation_effect: AnimationEffect::Pulse,
            importance: Importance::Normal,
            is_automatic: true,
        }
    }
}

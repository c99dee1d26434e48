//! Content regions - the building blocks of post and comment bodies.

use serde::{Deserialize, Serialize};

/// Kind tag carried by every region in a post or comment body.
///
/// Unrecognised kinds decode to `Unknown` and are dropped by the item
/// generator instead of failing the whole payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Text,
    Image,
    Embed,
    #[serde(other)]
    Unknown,
}

/// A single block of post or comment content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub kind: RegionKind,
    /// Text body (markup stripped) for text regions, alt text for images.
    #[serde(default)]
    pub text: Option<String>,
    /// Asset or embed URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Intrinsic pixel width of an image or embed, when known.
    #[serde(default)]
    pub width: Option<u32>,
    /// Intrinsic pixel height of an image or embed, when known.
    #[serde(default)]
    pub height: Option<u32>,
}

impl Region {
    /// Text region with the given body.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            kind: RegionKind::Text,
            text: Some(body.into()),
            url: None,
            width: None,
            height: None,
        }
    }

    /// Image region with intrinsic dimensions.
    pub fn image(url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            kind: RegionKind::Image,
            text: None,
            url: Some(url.into()),
            width: Some(width),
            height: Some(height),
        }
    }

    /// Embed region (video, audio, link card).
    pub fn embed(url: impl Into<String>) -> Self {
        Self {
            kind: RegionKind::Embed,
            text: None,
            url: Some(url.into()),
            width: None,
            height: None,
        }
    }

    /// Height-over-width ratio from the intrinsic dimensions, if both are known and non-zero.
    pub fn aspect_ratio(&self) -> Option<f64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(f64::from(h) / f64::from(w)),
            _ => None,
        }
    }

    /// Character count of the text body (0 for non-text regions).
    pub fn text_len(&self) -> usize {
        self.text.as_deref().map_or(0, |t| t.chars().count())
    }
}

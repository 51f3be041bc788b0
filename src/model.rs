//! Text runs, style segments, box geometry, and overflow verdicts.

use core::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, ErrorPhase};

/// Overflow below or at this many units is treated as metric noise.
pub const OVERFLOW_TOLERANCE: f32 = 4.0;

/// Font family plus style name, e.g. `Inter` / `Semi Bold`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FontName {
    /// Family name.
    pub family: String,
    /// Style name within the family.
    pub style: String,
}

impl FontName {
    /// Build a font name from family and style.
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: style.into(),
        }
    }
}

impl Default for FontName {
    fn default() -> Self {
        Self::new("Inter", "Regular")
    }
}

impl core::fmt::Display for FontName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.family, self.style)
    }
}

/// Font reference carried by a style segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FontRef {
    /// The host resolved a concrete font for the range.
    Named(FontName),
    /// The host could not resolve a font for the range.
    Missing,
}

impl FontRef {
    /// Concrete font name, if the reference resolved.
    pub fn name(&self) -> Option<&FontName> {
        match self {
            Self::Named(name) => Some(name),
            Self::Missing => None,
        }
    }
}

impl From<FontName> for FontRef {
    fn from(value: FontName) -> Self {
        Self::Named(value)
    }
}

/// Solid fill color, channels in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub opacity: f32,
}

impl Fill {
    /// Opaque solid fill.
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r,
            g,
            b,
            opacity: 1.0,
        }
    }
}

/// Style attributes shared by every character of a segment.
///
/// `None` size or fill means "inherit the run default", not "mixed".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharStyle {
    /// Font reference.
    pub font: FontRef,
    /// Font size in layout units.
    pub size: Option<f32>,
    /// Fill color.
    pub fill: Option<Fill>,
}

impl CharStyle {
    /// Style with only a font reference.
    pub fn with_font(font: impl Into<FontRef>) -> Self {
        Self {
            font: font.into(),
            size: None,
            fill: None,
        }
    }
}

/// Contiguous `[start, end)` character range sharing one style.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleSegment {
    /// First character index (inclusive).
    pub start: usize,
    /// Last character index (exclusive).
    pub end: usize,
    /// Shared style.
    pub style: CharStyle,
}

impl StyleSegment {
    /// Segment over `[start, end)`.
    pub fn new(start: usize, end: usize, style: CharStyle) -> Self {
        Self { start, end, style }
    }

    /// Character range covered by this segment.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of characters covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the segment covers no characters.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-only snapshot of a text element's characters and styling.
///
/// Segments are contiguous, non-overlapping, and cover `[0, len)`; adjacent
/// segments never share a style.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    text: String,
    len: usize,
    segments: Vec<StyleSegment>,
    has_missing_font: bool,
}

impl TextRun {
    /// Stylistically uniform run: one segment over the whole text.
    pub fn uniform(text: impl Into<String>, style: CharStyle) -> Self {
        let text = text.into();
        let len = text.chars().count();
        Self {
            text,
            len,
            segments: vec![StyleSegment::new(0, len, style)],
            has_missing_font: false,
        }
    }

    /// Build a run from explicit segments, validating coverage.
    ///
    /// Adjacent segments with identical styles are merged.
    pub fn from_segments(
        text: impl Into<String>,
        segments: Vec<StyleSegment>,
    ) -> Result<Self, AuditError> {
        let text = text.into();
        let len = text.chars().count();
        let mut merged: Vec<StyleSegment> = Vec::with_capacity(segments.len());
        let mut cursor = 0usize;
        for segment in segments {
            if segment.start != cursor || segment.end < segment.start {
                return Err(AuditError::new(
                    ErrorPhase::Styling,
                    "STYLE_RUN_INVALID",
                    format!(
                        "segment {}..{} does not continue at {}",
                        segment.start, segment.end, cursor
                    ),
                ));
            }
            cursor = segment.end;
            if segment.is_empty() && len > 0 {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.style == segment.style => last.end = segment.end,
                _ => merged.push(segment),
            }
        }
        if cursor != len {
            return Err(AuditError::new(
                ErrorPhase::Styling,
                "STYLE_RUN_INVALID",
                format!("segments cover {} of {} characters", cursor, len),
            ));
        }
        Ok(Self {
            text,
            len,
            segments: merged,
            has_missing_font: false,
        })
    }

    /// Flag the run as referencing a font the host reports missing.
    pub fn with_missing_font(mut self, missing: bool) -> Self {
        self.has_missing_font = missing;
        self
    }

    /// Original characters.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Style segments in order.
    pub fn segments(&self) -> &[StyleSegment] {
        &self.segments
    }

    /// Whether one style covers every character.
    pub fn is_uniform(&self) -> bool {
        self.segments.len() <= 1
    }

    /// Whether the host flagged a missing font on this run.
    pub fn has_missing_font(&self) -> bool {
        self.has_missing_font || self.fonts().any(|font| matches!(font, FontRef::Missing))
    }

    /// Style at a character index.
    pub fn style_at(&self, index: usize) -> Option<&CharStyle> {
        self.segments
            .iter()
            .find(|segment| segment.range().contains(&index))
            .map(|segment| &segment.style)
    }

    /// Style of the first segment, used for empty and uniform runs.
    pub fn base_style(&self) -> Option<&CharStyle> {
        self.segments.first().map(|segment| &segment.style)
    }

    /// Every font reference, in segment order (may repeat).
    pub fn fonts(&self) -> impl Iterator<Item = &FontRef> {
        self.segments.iter().map(|segment| &segment.style.font)
    }
}

/// Size of the original element before substitution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxGeometry {
    pub width: f32,
    pub height: f32,
}

impl BoxGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Governing parent container size for freely growing boxes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParentGeometry {
    /// Outer width of the parent.
    pub width: f32,
    /// Known left padding.
    pub padding_left: f32,
    /// Known right padding.
    pub padding_right: f32,
}

impl ParentGeometry {
    /// Width available to children: outer width minus horizontal padding.
    pub fn content_width(&self) -> f32 {
        self.width - self.padding_left - self.padding_right
    }
}

/// Box-sizing behavior of a text element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoResizePolicy {
    /// Fixed box; measured as a natural-width candidate.
    #[default]
    None,
    /// Grows in both axes; compared against the governing parent.
    WidthAndHeight,
    /// Fixed width, grows vertically.
    Height,
    /// Fixed box with truncation; measured like `None`.
    Truncate,
}

/// Whether translated text exceeds its box, and by how much.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverflowVerdict {
    /// `overflow_amount > OVERFLOW_TOLERANCE`.
    pub is_overflow: bool,
    /// Measured minus reference size; negative when the text fits with slack.
    pub overflow_amount: f32,
    /// `overflow_amount` as a percentage of the reference size (floored at 1).
    pub overflow_percent: f32,
}

impl OverflowVerdict {
    /// Verdict for a measured size against its reference size.
    pub fn from_sizes(measured: f32, reference: f32) -> Self {
        let overflow_amount = measured - reference;
        Self {
            is_overflow: overflow_amount > OVERFLOW_TOLERANCE,
            overflow_amount,
            overflow_percent: overflow_amount * 100.0 / reference.max(1.0),
        }
    }

    /// Safe "fits" verdict used when nothing can be compared.
    pub fn fits() -> Self {
        Self::default()
    }
}

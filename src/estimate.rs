//! Measurement-free overflow estimate from character counts.

use serde::{Deserialize, Serialize};

use crate::locale::{is_cjk, width_multiplier};
use crate::model::OverflowVerdict;

/// Heuristic estimate plus the intermediate widths it compared.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverflowEstimate {
    /// Verdict of `estimated_new_width` against `original_width`.
    pub verdict: OverflowVerdict,
    /// Translated width scaled into the box's coordinate space.
    pub estimated_new_width: f32,
    /// Box width the estimate was compared against.
    pub original_width: f32,
}

/// Estimate whether translated text overflows a box of `box_width`.
///
/// Ignores resize policy and line wrapping; a cheap upper-bound signal,
/// not a substitute for live measurement.
pub fn estimate(
    original_text: &str,
    translated_text: &str,
    box_width: f32,
    font_size: f32,
    locale: &str,
) -> OverflowEstimate {
    let char_width = if is_cjk(locale) {
        font_size * 0.95
    } else {
        font_size * 0.6
    };
    let multiplier = width_multiplier(locale);

    let original_estimated = original_text.chars().count() as f32 * char_width;
    let translated_estimated = translated_text.chars().count() as f32 * char_width * multiplier;
    let scale_factor = box_width / original_estimated.max(1.0);
    let estimated_new_width = translated_estimated * scale_factor;

    OverflowEstimate {
        verdict: OverflowVerdict::from_sizes(estimated_new_width, box_width),
        estimated_new_width,
        original_width: box_width,
    }
}

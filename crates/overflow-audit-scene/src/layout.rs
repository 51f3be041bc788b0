//! Deterministic glyph-advance text layout.

/// Line height as a multiple of the largest font size on the node.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

const WRAP_EPSILON: f32 = 1e-3;

/// Character and its horizontal advance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Glyph {
    pub ch: char,
    pub advance: f32,
}

/// Widest line and line count of laid-out text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TextExtent {
    pub width: f32,
    pub lines: usize,
}

/// Full-width glyphs: CJK ideographs, kana, hangul, and fullwidth forms.
pub fn is_wide(ch: char) -> bool {
    matches!(
        ch,
        '\u{3040}'..='\u{30FF}'
            | '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{AC00}'..='\u{D7AF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{FF01}'..='\u{FF60}'
    )
}

/// Horizontal advance of `ch` at `size`; `narrow` is the face's advance factor.
pub fn advance(ch: char, size: f32, narrow: f32) -> f32 {
    if is_wide(ch) {
        size
    } else {
        size * narrow
    }
}

// (space before, word width) pairs; each wide glyph is its own word.
fn break_tokens(paragraph: &[Glyph]) -> Vec<(f32, f32)> {
    let mut tokens = Vec::new();
    let mut space = 0.0f32;
    let mut word = 0.0f32;
    let mut in_word = false;
    for glyph in paragraph {
        if glyph.ch == ' ' || glyph.ch == '\t' {
            if in_word {
                tokens.push((space, word));
                space = 0.0;
                word = 0.0;
                in_word = false;
            }
            space += glyph.advance;
        } else if is_wide(glyph.ch) {
            if in_word {
                tokens.push((space, word));
                space = 0.0;
                word = 0.0;
                in_word = false;
            }
            tokens.push((space, glyph.advance));
            space = 0.0;
        } else {
            word += glyph.advance;
            in_word = true;
        }
    }
    if in_word || space > 0.0 {
        tokens.push((space, word));
    }
    tokens
}

/// Lay out glyphs, breaking at `'\n'` and greedily at `wrap_width` when set.
///
/// A word wider than the wrap width overhangs on its own line.
pub(crate) fn measure_lines(glyphs: &[Glyph], wrap_width: Option<f32>) -> TextExtent {
    let mut extent = TextExtent {
        width: 0.0,
        lines: 0,
    };
    for paragraph in glyphs.split(|glyph| glyph.ch == '\n') {
        extent.lines += 1;
        let mut line = 0.0f32;
        let mut started = false;
        for (space, word) in break_tokens(paragraph) {
            let candidate = line + space + word;
            match wrap_width {
                Some(max) if started && candidate > max + WRAP_EPSILON => {
                    extent.width = extent.width.max(line);
                    extent.lines += 1;
                    line = word;
                }
                _ => line = candidate,
            }
            started = true;
        }
        extent.width = extent.width.max(line);
    }
    extent
}

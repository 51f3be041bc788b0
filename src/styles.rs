//! Style run extraction, proportional remapping, and style application.

use crate::error::{AuditError, ErrorPhase};
use crate::fonts::FontAvailabilityGuard;
use crate::host::{FontLoader, HostError, Mixed, NodeId, TextHost};
use crate::model::{CharStyle, FontRef, StyleSegment, TextRun};

/// Outcome of applying remapped segments to a host node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StyleApplyReport {
    /// Attribute writes that succeeded.
    pub applied: usize,
    /// Attribute writes that failed and were skipped.
    pub skipped: usize,
    /// Styling was skipped entirely because no usable font existed.
    pub raw_only: bool,
}

fn read_error(id: &NodeId) -> impl Fn(HostError) -> AuditError + '_ {
    move |err| {
        AuditError::from_host(ErrorPhase::Styling, "STYLE_READ_FAILED", err).with_node(id.as_str())
    }
}

/// Snapshot a text node's characters and per-character styling.
///
/// Uniform nodes produce a single segment without per-character reads.
pub fn extract_run<H>(host: &H, id: &NodeId) -> Result<TextRun, AuditError>
where
    H: TextHost + ?Sized,
{
    let text = host.characters(id).map_err(read_error(id))?;
    let missing = host.has_missing_font(id).map_err(read_error(id))?;
    let font = host.font_name(id).map_err(read_error(id))?;
    let size = host.font_size(id).map_err(read_error(id))?;
    let fill = host.fill(id).map_err(read_error(id))?;

    if let (Mixed::Uniform(font), Mixed::Uniform(size), Mixed::Uniform(fill)) =
        (&font, &size, &fill)
    {
        let style = CharStyle {
            font: FontRef::Named(font.clone()),
            size: Some(*size),
            fill: Some(*fill),
        };
        return Ok(TextRun::uniform(text, style).with_missing_font(missing));
    }

    let len = text.chars().count();
    let mut segments: Vec<StyleSegment> = Vec::new();
    for index in 0..len {
        let range = index..index + 1;
        let font = match &font {
            Mixed::Uniform(name) => FontRef::Named(name.clone()),
            Mixed::Mixed => host
                .range_font_name(id, range.clone())
                .map_err(read_error(id))?
                .map_or(FontRef::Missing, FontRef::Named),
        };
        let size = match &size {
            Mixed::Uniform(size) => Some(*size),
            Mixed::Mixed => host
                .range_font_size(id, range.clone())
                .map_err(read_error(id))?,
        };
        let fill = match &fill {
            Mixed::Uniform(fill) => Some(*fill),
            Mixed::Mixed => host.range_fill(id, range).map_err(read_error(id))?,
        };
        let style = CharStyle { font, size, fill };
        match segments.last_mut() {
            Some(last) if last.style == style => last.end = index + 1,
            _ => segments.push(StyleSegment::new(index, index + 1, style)),
        }
    }
    Ok(TextRun::from_segments(text, segments)?.with_missing_font(missing))
}

/// Map a styled run onto replacement text of a possibly different length.
///
/// Output position `j` takes the style of source index
/// `min(floor(j * original_len / replacement_len), original_len - 1)`. The
/// mapping is proportional, not linguistic: translated text has no
/// character-level correspondence to its source. `resolve_font` substitutes
/// the usable font for each reference.
pub fn remap_styles<F>(run: &TextRun, replacement: &str, resolve_font: F) -> Vec<StyleSegment>
where
    F: Fn(&FontRef) -> FontRef,
{
    let replacement_len = replacement.chars().count();
    if replacement_len == 0 {
        return Vec::new();
    }

    let resolve = |style: &CharStyle| CharStyle {
        font: resolve_font(&style.font),
        size: style.size,
        fill: style.fill,
    };

    let original_len = run.len();
    if original_len == 0 || run.is_uniform() {
        let style = match run.base_style() {
            Some(style) => resolve(style),
            None => CharStyle::with_font(resolve_font(&FontRef::Missing)),
        };
        return vec![StyleSegment::new(0, replacement_len, style)];
    }

    let styles: Vec<CharStyle> = run.segments().iter().map(|s| resolve(&s.style)).collect();
    let mut owner = Vec::with_capacity(original_len);
    for (slot, segment) in run.segments().iter().enumerate() {
        owner.extend(core::iter::repeat_n(slot, segment.len()));
    }
    let style_for = |j: usize| {
        let source = (j * original_len / replacement_len).min(original_len - 1);
        &styles[owner[source]]
    };

    let mut segments = Vec::new();
    let mut open_start = 0usize;
    let mut open_style = style_for(0);
    for j in 1..=replacement_len {
        if j == replacement_len {
            segments.push(StyleSegment::new(open_start, j, open_style.clone()));
            break;
        }
        let next = style_for(j);
        if next != open_style {
            segments.push(StyleSegment::new(open_start, j, open_style.clone()));
            open_start = j;
            open_style = next;
        }
    }
    segments
}

/// Write segment attributes to a node: font, then size, then fill.
///
/// A failed write is logged and skipped; it never stops the remaining
/// attributes or segments.
pub fn apply_segments<H>(host: &mut H, id: &NodeId, segments: &[StyleSegment]) -> StyleApplyReport
where
    H: TextHost + ?Sized,
{
    let mut report = StyleApplyReport::default();
    let mut tally = |result: Result<(), HostError>, attr: &str, seg: &StyleSegment| {
        match result {
            Ok(()) => report.applied += 1,
            Err(err) => {
                log::warn!(
                    "skipping {} on {} range {}..{}: {}",
                    attr,
                    id,
                    seg.start,
                    seg.end,
                    err
                );
                report.skipped += 1;
            }
        }
    };
    for segment in segments.iter().filter(|segment| !segment.is_empty()) {
        if let Some(font) = segment.style.font.name() {
            tally(
                host.set_range_font_name(id, segment.range(), font),
                "font",
                segment,
            );
        }
        if let Some(size) = segment.style.size {
            tally(
                host.set_range_font_size(id, segment.range(), size),
                "size",
                segment,
            );
        }
        if let Some(fill) = &segment.style.fill {
            tally(host.set_range_fill(id, segment.range(), fill), "fill", segment);
        }
    }
    report
}

/// Replace a node's characters while preserving as much styling as possible.
///
/// Ranges whose font is unusable are downgraded to the fallback before the
/// character count changes. A run the host flagged as missing a font is
/// downgraded as a whole, even when its fonts loaded. When the fallback
/// itself is unusable the node only receives the raw characters.
pub fn substitute_text<H, L>(
    host: &mut H,
    id: &NodeId,
    run: &TextRun,
    replacement: &str,
    fonts: &FontAvailabilityGuard<L>,
) -> Result<StyleApplyReport, AuditError>
where
    H: TextHost + ?Sized,
    L: FontLoader,
{
    let flagged = run.has_missing_font();
    let downgrade: Vec<&StyleSegment> = run
        .segments()
        .iter()
        .filter(|segment| {
            !segment.is_empty() && (flagged || fonts.needs_fallback(&segment.style.font))
        })
        .collect();

    if !downgrade.is_empty() && !fonts.fallback_ready() {
        set_characters(host, id, replacement)?;
        return Ok(StyleApplyReport {
            raw_only: true,
            ..StyleApplyReport::default()
        });
    }

    for segment in downgrade {
        host.set_range_font_name(id, segment.range(), fonts.fallback())
            .map_err(|err| {
                AuditError::from_host(ErrorPhase::Styling, "STYLE_FALLBACK_FAILED", err)
                    .with_node(id.as_str())
            })?;
    }
    set_characters(host, id, replacement)?;

    let missing = FontRef::Missing;
    let segments = remap_styles(run, replacement, |font| {
        let font = if flagged { &missing } else { font };
        fonts
            .usable_font(font)
            .map_or(FontRef::Missing, FontRef::Named)
    });
    Ok(apply_segments(host, id, &segments))
}

fn set_characters<H>(host: &mut H, id: &NodeId, text: &str) -> Result<(), AuditError>
where
    H: TextHost + ?Sized,
{
    host.set_characters(id, text).map_err(|err| {
        AuditError::from_host(ErrorPhase::Measure, "MEASURE_SET_CHARACTERS_FAILED", err)
            .with_node(id.as_str())
    })
}

//! Locale tables: width expansion, script classes, and the audit catalogue.

/// Audit locale with a display label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocaleInfo {
    /// Primary language subtag.
    pub code: &'static str,
    /// English display label.
    pub label: &'static str,
}

impl LocaleInfo {
    const fn new(code: &'static str, label: &'static str) -> Self {
        Self { code, label }
    }
}

/// Locales offered for auditing.
pub const SUPPORTED_LOCALES: &[LocaleInfo] = &[
    LocaleInfo::new("de", "German"),
    LocaleInfo::new("fr", "French"),
    LocaleInfo::new("ja", "Japanese"),
    LocaleInfo::new("ar", "Arabic (RTL)"),
    LocaleInfo::new("es", "Spanish"),
    LocaleInfo::new("pt", "Portuguese"),
    LocaleInfo::new("hi", "Hindi"),
    LocaleInfo::new("ru", "Russian"),
    LocaleInfo::new("ko", "Korean"),
    LocaleInfo::new("zh", "Chinese"),
];

const RTL_LOCALES: &[&str] = &["ar", "he", "fa", "ur", "yi"];

const CJK_LOCALES: &[&str] = &["ja", "zh", "ko"];

// Average rendered width of translated text relative to English.
const WIDTH_MULTIPLIERS: &[(&str, f32)] = &[
    ("de", 1.35),
    ("fr", 1.20),
    ("es", 1.15),
    ("pt", 1.18),
    ("ru", 1.25),
    ("ar", 0.90),
    ("he", 0.85),
    ("fa", 0.88),
    ("ja", 1.10),
    ("ko", 1.05),
    ("zh", 0.95),
    ("hi", 1.15),
];

/// Lowercase primary subtag: `zh-Hant-TW` and `zh_TW` both become `zh`.
pub fn primary_subtag(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether the locale is written right to left.
pub fn is_rtl(locale: &str) -> bool {
    RTL_LOCALES.contains(&primary_subtag(locale).as_str())
}

/// Whether the locale uses full-width CJK glyphs.
pub fn is_cjk(locale: &str) -> bool {
    CJK_LOCALES.contains(&primary_subtag(locale).as_str())
}

/// Width expansion multiplier; `1.0` for unlisted locales.
pub fn width_multiplier(locale: &str) -> f32 {
    let code = primary_subtag(locale);
    WIDTH_MULTIPLIERS
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map_or(1.0, |(_, multiplier)| *multiplier)
}

/// Catalogue entry for a locale, if offered.
pub fn locale_info(locale: &str) -> Option<&'static LocaleInfo> {
    let code = primary_subtag(locale);
    SUPPORTED_LOCALES.iter().find(|info| info.code == code)
}

//! Engine and audit configuration.

use serde::{Deserialize, Serialize};

use crate::model::FontName;

/// Overflow engine options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Face substituted wherever an original font cannot be loaded.
    pub fallback_font: FontName,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fallback_font: FontName::default(),
        }
    }
}

impl EngineOptions {
    /// Override the fallback face.
    pub fn with_fallback_font(mut self, font: FontName) -> Self {
        self.fallback_font = font;
        self
    }
}

/// How an audit derives verdicts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditMode {
    /// Substitute into a hidden copy and measure host layout.
    #[default]
    Measured,
    /// Character-width estimate only; never touches the host.
    Heuristic,
}

/// Audit pass options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditOptions {
    /// Locale of the design's source text.
    pub source_locale: String,
    /// Locales to audit, in order.
    pub target_locales: Vec<String>,
    /// Verdict derivation mode.
    pub mode: AuditMode,
    /// Font size assumed when a node's size is mixed.
    pub default_font_size: f32,
    /// Engine options for measured audits.
    pub engine: EngineOptions,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            source_locale: "en".to_string(),
            target_locales: vec!["de".to_string(), "ja".to_string(), "ar".to_string()],
            mode: AuditMode::Measured,
            default_font_size: 14.0,
            engine: EngineOptions::default(),
        }
    }
}

impl AuditOptions {
    /// Replace the target locale list.
    pub fn with_target_locales<I, S>(mut self, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_locales = locales.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source_locale(mut self, locale: impl Into<String>) -> Self {
        self.source_locale = locale.into();
        self
    }

    pub fn with_mode(mut self, mode: AuditMode) -> Self {
        self.mode = mode;
        self
    }

    /// Parse options from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_overrides_only_present_fields() {
        let opts = AuditOptions::from_json(r#"{"target_locales": ["fr"], "mode": "heuristic"}"#)
            .expect("options should parse");
        assert_eq!(opts.target_locales, vec!["fr".to_string()]);
        assert_eq!(opts.mode, AuditMode::Heuristic);
        assert_eq!(opts.source_locale, "en");
        assert_eq!(opts.default_font_size, 14.0);
        assert_eq!(opts.engine.fallback_font, FontName::new("Inter", "Regular"));
    }

    #[test]
    fn fallback_font_can_be_configured() {
        let opts = AuditOptions::from_json(
            r#"{"engine": {"fallback_font": {"family": "Roboto", "style": "Medium"}}}"#,
        )
        .expect("options should parse");
        assert_eq!(opts.engine.fallback_font, FontName::new("Roboto", "Medium"));
    }
}

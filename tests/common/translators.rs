use std::cell::RefCell;
use std::collections::BTreeMap;

use overflow_audit::{AuditError, ErrorPhase, TranslationResponse, Translator};

/// Canned translations per target locale; unknown locales echo the source.
#[derive(Default)]
pub struct StaticTranslator {
    responses: BTreeMap<String, TranslationResponse>,
    pub calls: RefCell<Vec<String>>,
}

impl StaticTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, locale: &str, texts: &[&str]) -> Self {
        self.responses.insert(
            locale.to_string(),
            TranslationResponse::from_ordered(texts.iter().copied()),
        );
        self
    }

    /// Response for `locale` carrying only the given positions.
    pub fn with_partial(mut self, locale: &str, entries: &[(usize, &str)]) -> Self {
        let content = entries
            .iter()
            .map(|(index, text)| (format!("str_{}", index), text.to_string()))
            .collect();
        self.responses
            .insert(locale.to_string(), TranslationResponse { content });
        self
    }
}

impl Translator for StaticTranslator {
    async fn translate_batch(
        &self,
        texts: &[String],
        _source_locale: &str,
        target_locale: &str,
    ) -> Result<TranslationResponse, AuditError> {
        self.calls.borrow_mut().push(target_locale.to_string());
        Ok(self
            .responses
            .get(target_locale)
            .cloned()
            .unwrap_or_else(|| TranslationResponse::from_ordered(texts.iter().cloned())))
    }
}

/// Fails every batch for one locale, succeeds (echoing) for others.
pub struct FailingTranslator {
    pub failing_locale: String,
}

impl Translator for FailingTranslator {
    async fn translate_batch(
        &self,
        texts: &[String],
        _source_locale: &str,
        target_locale: &str,
    ) -> Result<TranslationResponse, AuditError> {
        if target_locale == self.failing_locale {
            return Err(AuditError::new(
                ErrorPhase::Translate,
                "TRANSLATE_TRANSPORT",
                "translation service returned 503",
            ));
        }
        Ok(TranslationResponse::from_ordered(texts.iter().cloned()))
    }
}

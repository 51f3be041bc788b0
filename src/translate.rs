//! Batch translation collaborator and its JSON wire payload.

use core::future::Future;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, ErrorPhase};

/// Batch translation backend.
///
/// Returning `Err` aborts the audit run; a response missing some entries is
/// not an error (see [`TranslationResponse::into_ordered`]).
pub trait Translator {
    fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
    ) -> impl Future<Output = Result<TranslationResponse, AuditError>>;
}

fn content_key(index: usize) -> String {
    format!("str_{}", index)
}

/// Request body: texts keyed `str_<index>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub content: BTreeMap<String, String>,
    pub source_locale: String,
    pub target_locale: String,
}

impl TranslationRequest {
    pub fn new(texts: &[String], source_locale: &str, target_locale: &str) -> Self {
        let content = texts
            .iter()
            .enumerate()
            .map(|(index, text)| (content_key(index), text.clone()))
            .collect();
        Self {
            content,
            source_locale: source_locale.to_string(),
            target_locale: target_locale.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, AuditError> {
        serde_json::to_string(self).map_err(|err| {
            AuditError::new(ErrorPhase::Translate, "TRANSLATE_PAYLOAD", err.to_string())
                .with_locale(self.target_locale.as_str())
        })
    }
}

/// Response body: translated texts keyed like the request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResponse {
    #[serde(default)]
    pub content: BTreeMap<String, String>,
}

impl TranslationResponse {
    /// Build a response from texts in request order.
    pub fn from_ordered<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let content = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| (content_key(index), text.into()))
            .collect();
        Self { content }
    }

    pub fn from_json(json: &str) -> Result<Self, AuditError> {
        serde_json::from_str(json).map_err(|err| {
            AuditError::new(ErrorPhase::Translate, "TRANSLATE_PAYLOAD", err.to_string())
        })
    }

    /// Translations aligned with `texts`; a missing entry keeps the source text.
    pub fn into_ordered(mut self, texts: &[String]) -> Vec<String> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                self.content
                    .remove(&content_key(index))
                    .unwrap_or_else(|| text.clone())
            })
            .collect()
    }
}

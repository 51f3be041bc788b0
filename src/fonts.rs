//! Font availability: memoized loading with a designated fallback face.

use std::collections::{BTreeMap, BTreeSet};

use futures::future::join_all;

use crate::host::FontLoader;
use crate::model::{FontName, FontRef, TextRun};

/// Recorded outcome of a font load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontStatus {
    /// Font is confirmed usable.
    Loaded,
    /// Loading failed; positions using it need the fallback.
    Failed,
}

/// Append-only record of font load outcomes for one audit pass.
#[derive(Clone, Debug, Default)]
pub struct FontCache {
    entries: BTreeMap<FontName, FontStatus>,
}

impl FontCache {
    pub fn status(&self, font: &FontName) -> Option<FontStatus> {
        self.entries.get(font).copied()
    }

    pub fn is_loaded(&self, font: &FontName) -> bool {
        self.status(font) == Some(FontStatus::Loaded)
    }

    /// Number of distinct fonts with a recorded outcome.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // First outcome wins; entries are never rewritten.
    fn record(&mut self, font: FontName, status: FontStatus) {
        self.entries.entry(font).or_insert(status);
    }
}

/// Summary of one batch preparation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontPreparation {
    /// Distinct fonts the batch needed, fallback included.
    pub requested: usize,
    /// Fonts loaded by this call.
    pub loaded: Vec<FontName>,
    /// Fonts that failed to load in this call.
    pub failed: Vec<FontName>,
    /// Fonts already resolved by an earlier call.
    pub reused: usize,
}

/// Ensures fonts are loaded before any character or style mutation.
#[derive(Debug)]
pub struct FontAvailabilityGuard<L> {
    loader: L,
    fallback: FontName,
    cache: FontCache,
}

impl<L: FontLoader> FontAvailabilityGuard<L> {
    /// Create a guard with an empty cache.
    pub fn new(loader: L, fallback: FontName) -> Self {
        Self {
            loader,
            fallback,
            cache: FontCache::default(),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Designated fallback face.
    pub fn fallback(&self) -> &FontName {
        &self.fallback
    }

    pub fn cache(&self) -> &FontCache {
        &self.cache
    }

    /// Whether the fallback face is confirmed usable.
    pub fn fallback_ready(&self) -> bool {
        self.cache.is_loaded(&self.fallback)
    }

    /// Load one font, at most once per guard. Returns whether it is usable.
    pub async fn ensure_loaded(&mut self, font: &FontName) -> bool {
        if let Some(status) = self.cache.status(font) {
            return status == FontStatus::Loaded;
        }
        let status = match self.loader.load_font(font).await {
            Ok(()) => FontStatus::Loaded,
            Err(err) => {
                log::warn!("font {} failed to load: {}", font, err);
                FontStatus::Failed
            }
        };
        self.cache.record(font.clone(), status);
        status == FontStatus::Loaded
    }

    /// Load the distinct fonts of every run, plus the fallback, concurrently.
    ///
    /// Returns once every pending load has resolved. Fonts already recorded
    /// are not requested again.
    pub async fn prepare_fonts<'a, I>(&mut self, runs: I) -> FontPreparation
    where
        I: IntoIterator<Item = &'a TextRun>,
    {
        let mut wanted = BTreeSet::new();
        wanted.insert(self.fallback.clone());
        for run in runs {
            wanted.extend(run.fonts().filter_map(FontRef::name).cloned());
        }

        let requested = wanted.len();
        let pending: Vec<FontName> = wanted
            .into_iter()
            .filter(|font| self.cache.status(font).is_none())
            .collect();
        let reused = requested - pending.len();

        let loader = &self.loader;
        let outcomes = join_all(pending.iter().map(|font| loader.load_font(font))).await;

        let mut prep = FontPreparation {
            requested,
            reused,
            ..FontPreparation::default()
        };
        for (font, outcome) in pending.into_iter().zip(outcomes) {
            match outcome {
                Ok(()) => {
                    self.cache.record(font.clone(), FontStatus::Loaded);
                    prep.loaded.push(font);
                }
                Err(err) => {
                    log::warn!("font {} failed to load: {}", font, err);
                    self.cache.record(font.clone(), FontStatus::Failed);
                    prep.failed.push(font);
                }
            }
        }
        if !self.fallback_ready() {
            log::warn!(
                "fallback font {} unavailable; runs needing it keep raw characters only",
                self.fallback
            );
        }
        log::debug!(
            "font preparation: requested={} loaded={} failed={} reused={}",
            prep.requested,
            prep.loaded.len(),
            prep.failed.len(),
            prep.reused
        );
        prep
    }

    /// Font to use for a reference: itself when loaded, else the fallback.
    ///
    /// `None` when neither is usable.
    pub fn usable_font(&self, font: &FontRef) -> Option<FontName> {
        match font.name() {
            Some(name) if self.cache.is_loaded(name) => Some(name.clone()),
            _ if self.fallback_ready() => Some(self.fallback.clone()),
            _ => None,
        }
    }

    /// Whether a reference must be downgraded before mutation.
    pub fn needs_fallback(&self, font: &FontRef) -> bool {
        !matches!(font.name(), Some(name) if self.cache.is_loaded(name))
    }
}

//! Overflow engine: font preparation, style remapping, and measurement.

use core::fmt;

use crate::error::AuditError;
use crate::fonts::{FontAvailabilityGuard, FontPreparation};
use crate::host::{FontLoader, TextHost};
use crate::measure::{measure_prepared, snapshot_run, MeasureOutcome, MeasureRequest};
use crate::model::{FontRef, StyleSegment, TextRun};
use crate::options::EngineOptions;
use crate::styles;

/// Overflow engine owning the font cache for one audit pass.
pub struct OverflowEngine<L> {
    opts: EngineOptions,
    fonts: FontAvailabilityGuard<L>,
}

impl<L> fmt::Debug for OverflowEngine<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverflowEngine")
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl<L: FontLoader> OverflowEngine<L> {
    /// Create an engine with a fresh font cache.
    pub fn new(loader: L, opts: EngineOptions) -> Self {
        Self {
            fonts: FontAvailabilityGuard::new(loader, opts.fallback_font.clone()),
            opts,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.opts
    }

    /// Font guard and its cache.
    pub fn fonts(&self) -> &FontAvailabilityGuard<L> {
        &self.fonts
    }

    /// Load every distinct font the runs reference, plus the fallback.
    pub async fn prepare_fonts<'a, I>(&mut self, runs: I) -> FontPreparation
    where
        I: IntoIterator<Item = &'a TextRun>,
    {
        self.fonts.prepare_fonts(runs).await
    }

    /// Style segments for `replacement`, with unusable fonts substituted.
    pub fn remap_styles(&self, run: &TextRun, replacement: &str) -> Vec<StyleSegment> {
        styles::remap_styles(run, replacement, |font| {
            self.fonts
                .usable_font(font)
                .map_or(FontRef::Missing, FontRef::Named)
        })
    }

    /// Measure one element on a hidden copy.
    ///
    /// Never fails: any error becomes a defaulted outcome for this element.
    pub async fn measure<H>(&mut self, host: &mut H, request: &MeasureRequest) -> MeasureOutcome
    where
        H: TextHost + ?Sized,
    {
        let run = match snapshot_run(host, &request.node_id) {
            Ok(run) => run,
            Err(err) => return contain(err),
        };
        self.fonts.prepare_fonts(core::iter::once(&run)).await;
        self.finish(host, request, &run)
    }

    /// Measure many elements, preparing the union of their fonts first.
    ///
    /// Outcomes are returned in request order; one element's failure never
    /// affects another's.
    pub async fn measure_batch<H>(
        &mut self,
        host: &mut H,
        requests: &[MeasureRequest],
    ) -> Vec<MeasureOutcome>
    where
        H: TextHost + ?Sized,
    {
        let snapshots: Vec<Result<TextRun, AuditError>> = requests
            .iter()
            .map(|request| snapshot_run(host, &request.node_id))
            .collect();
        self.fonts.prepare_fonts(snapshots.iter().flatten()).await;

        let mut outcomes = Vec::with_capacity(requests.len());
        for (request, snapshot) in requests.iter().zip(snapshots) {
            let outcome = match snapshot {
                Ok(run) => self.finish(host, request, &run),
                Err(err) => contain(err),
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    fn finish<H>(&self, host: &mut H, request: &MeasureRequest, run: &TextRun) -> MeasureOutcome
    where
        H: TextHost + ?Sized,
    {
        match measure_prepared(host, request, run, &self.fonts) {
            Ok(verdict) => MeasureOutcome::Measured(verdict),
            Err(err) => contain(err),
        }
    }
}

fn contain(err: AuditError) -> MeasureOutcome {
    log::warn!("measurement defaulted to fits: {}", err);
    MeasureOutcome::Defaulted(err)
}

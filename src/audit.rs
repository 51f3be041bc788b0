//! Audit pipeline: scan text nodes, translate per locale, and collect verdicts.

use serde::{Deserialize, Serialize};

use crate::engine::OverflowEngine;
use crate::error::{AuditError, ErrorPhase};
use crate::estimate::estimate;
use crate::host::{FontLoader, Mixed, NodeId, NodeKind, TextHost};
use crate::locale::is_rtl;
use crate::measure::{MeasureOutcome, MeasureRequest};
use crate::model::{AutoResizePolicy, BoxGeometry, OverflowVerdict};
use crate::options::{AuditMode, AuditOptions};
use crate::severity::{classify_severity, SeverityTier};
use crate::translate::Translator;

const ROOT_PARENT_NAME: &str = "Page";

/// Snapshot of one text node taken by [`scan_text_nodes`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextNodeInfo {
    pub id: NodeId,
    pub name: String,
    pub original_text: String,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
    pub parent_name: String,
    pub auto_resize: AutoResizePolicy,
}

/// Collect text nodes under `roots`, depth first.
///
/// Text nodes are leaves: the walk never descends into them. A node whose
/// characters or geometry cannot be read is skipped with a warning.
pub fn scan_text_nodes<H>(
    host: &H,
    roots: &[NodeId],
    default_font_size: f32,
) -> Vec<TextNodeInfo>
where
    H: TextHost + ?Sized,
{
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = roots.iter().rev().cloned().collect();
    while let Some(id) = stack.pop() {
        match host.node_kind(&id) {
            Some(NodeKind::Text) => match read_text_node(host, &id, default_font_size) {
                Ok(info) => out.push(info),
                Err(err) => log::warn!("skipping text node: {}", err),
            },
            Some(_) => stack.extend(host.children(&id).into_iter().rev()),
            None => log::warn!("scan root or child {} no longer exists", id),
        }
    }
    out
}

fn read_text_node<H>(
    host: &H,
    id: &NodeId,
    default_font_size: f32,
) -> Result<TextNodeInfo, AuditError>
where
    H: TextHost + ?Sized,
{
    let read = |err| {
        AuditError::from_host(ErrorPhase::Scan, "SCAN_READ_FAILED", err).with_node(id.as_str())
    };
    let original_text = host.characters(id).map_err(read)?;
    let geometry = host.geometry(id).map_err(read)?;
    let auto_resize = host.auto_resize(id).map_err(read)?;
    let font_size = match host.font_size(id).map_err(read)? {
        Mixed::Uniform(size) => size,
        Mixed::Mixed => default_font_size,
    };
    Ok(TextNodeInfo {
        id: id.clone(),
        name: host.node_name(id).unwrap_or_default(),
        original_text,
        width: geometry.width,
        height: geometry.height,
        font_size,
        parent_name: host
            .parent_name(id)
            .unwrap_or_else(|| ROOT_PARENT_NAME.to_string()),
        auto_resize,
    })
}

/// One node's verdict in one locale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub node_id: NodeId,
    pub node_name: String,
    pub original_text: String,
    pub locale: String,
    pub translated_text: String,
    pub is_overflow: bool,
    pub overflow_amount: f32,
    pub overflow_percent: f32,
    pub is_rtl: bool,
    pub parent_name: String,
    pub severity: SeverityTier,
    /// Set when live measurement failed and the verdict defaulted to "fits".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_error: Option<String>,
}

/// Severity filter for [`AuditReport::filter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityFilter {
    #[default]
    All,
    Warning,
    Critical,
}

impl SeverityFilter {
    fn accepts(self, tier: SeverityTier) -> bool {
        match self {
            Self::All => true,
            Self::Warning => tier == SeverityTier::Warning,
            Self::Critical => tier == SeverityTier::Critical,
        }
    }
}

/// Results of one audit run, locale-major in the order audited.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub results: Vec<AuditResult>,
}

impl AuditReport {
    pub fn overflow_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_overflow).count()
    }

    pub fn critical_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.severity == SeverityTier::Critical)
            .count()
    }

    /// Results that fit their box.
    pub fn safe_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_overflow).count()
    }

    /// Locales with at least one overflow, in first-seen order.
    pub fn overflowing_locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = Vec::new();
        for result in self.results.iter().filter(|r| r.is_overflow) {
            if !locales.contains(&result.locale.as_str()) {
                locales.push(result.locale.as_str());
            }
        }
        locales
    }

    pub fn summary(&self) -> String {
        format!(
            "{} overflow(s) found across {} locale(s)",
            self.overflow_count(),
            self.overflowing_locales().len()
        )
    }

    /// Overflowing results, optionally narrowed to one locale and a tier.
    pub fn filter(&self, locale: Option<&str>, severity: SeverityFilter) -> Vec<&AuditResult> {
        self.results
            .iter()
            .filter(|r| r.is_overflow)
            .filter(|r| locale.is_none_or(|locale| r.locale == locale))
            .filter(|r| severity.accepts(r.severity))
            .collect()
    }
}

/// Runs audits across target locales with one engine and font cache.
#[derive(Debug)]
pub struct Auditor<L> {
    opts: AuditOptions,
    engine: OverflowEngine<L>,
}

impl<L: FontLoader> Auditor<L> {
    pub fn new(loader: L, opts: AuditOptions) -> Self {
        Self {
            engine: OverflowEngine::new(loader, opts.engine.clone()),
            opts,
        }
    }

    pub fn options(&self) -> &AuditOptions {
        &self.opts
    }

    pub fn engine(&self) -> &OverflowEngine<L> {
        &self.engine
    }

    /// Scan `roots` with the configured default font size.
    pub fn scan<H>(&self, host: &H, roots: &[NodeId]) -> Vec<TextNodeInfo>
    where
        H: TextHost + ?Sized,
    {
        scan_text_nodes(host, roots, self.opts.default_font_size)
    }

    /// Translate and judge every node in every target locale.
    ///
    /// A translator error aborts the whole run; measurement failures only
    /// default the affected result.
    pub async fn run<H, T>(
        &mut self,
        host: &mut H,
        translator: &T,
        nodes: &[TextNodeInfo],
    ) -> Result<AuditReport, AuditError>
    where
        H: TextHost + ?Sized,
        T: Translator + ?Sized,
    {
        if nodes.is_empty() {
            return Err(AuditError::new(
                ErrorPhase::Scan,
                "SCAN_EMPTY",
                "no text nodes to audit",
            ));
        }
        if self.opts.target_locales.is_empty() {
            return Err(AuditError::new(
                ErrorPhase::Translate,
                "AUDIT_NO_LOCALES",
                "no target locales selected",
            ));
        }

        let texts: Vec<String> = nodes.iter().map(|n| n.original_text.clone()).collect();
        let locales = self.opts.target_locales.clone();
        let mut report = AuditReport::default();

        for locale in &locales {
            let response = translator
                .translate_batch(&texts, &self.opts.source_locale, locale)
                .await
                .map_err(|err| err.with_locale(locale.as_str()))?;
            let translations = response.into_ordered(&texts);

            let outcomes = match self.opts.mode {
                AuditMode::Measured => self.measure_locale(host, nodes, &translations).await,
                AuditMode::Heuristic => nodes
                    .iter()
                    .zip(&translations)
                    .map(|(node, translated)| {
                        let est = estimate(
                            &node.original_text,
                            translated,
                            node.width,
                            node.font_size,
                            locale,
                        );
                        MeasureOutcome::Measured(est.verdict)
                    })
                    .collect(),
            };

            let rtl = is_rtl(locale);
            let mut overflows = 0usize;
            for ((node, translated), outcome) in nodes.iter().zip(translations).zip(outcomes) {
                let verdict: OverflowVerdict = outcome.verdict();
                overflows += usize::from(verdict.is_overflow);
                report.results.push(AuditResult {
                    node_id: node.id.clone(),
                    node_name: node.name.clone(),
                    original_text: node.original_text.clone(),
                    locale: locale.clone(),
                    translated_text: translated,
                    is_overflow: verdict.is_overflow,
                    overflow_amount: verdict.overflow_amount,
                    overflow_percent: verdict.overflow_percent,
                    is_rtl: rtl,
                    parent_name: node.parent_name.clone(),
                    severity: classify_severity(verdict.overflow_percent),
                    measurement_error: outcome.error().map(ToString::to_string),
                });
            }
            log::debug!(
                "audited {} nodes for {}: {} overflow(s)",
                nodes.len(),
                locale,
                overflows
            );
        }

        Ok(report)
    }

    async fn measure_locale<H>(
        &mut self,
        host: &mut H,
        nodes: &[TextNodeInfo],
        translations: &[String],
    ) -> Vec<MeasureOutcome>
    where
        H: TextHost + ?Sized,
    {
        let requests: Vec<MeasureRequest> = nodes
            .iter()
            .zip(translations)
            .map(|(node, translated)| {
                MeasureRequest::new(
                    node.id.clone(),
                    translated.clone(),
                    node.auto_resize,
                    BoxGeometry::new(node.width, node.height),
                )
                .with_parent(host.parent_geometry(&node.id))
            })
            .collect();
        self.engine.measure_batch(host, &requests).await
    }
}

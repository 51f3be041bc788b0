//! Authoritative overflow measurement on an isolated, hidden node copy.

use crate::error::{AuditError, ErrorPhase};
use crate::fonts::FontAvailabilityGuard;
use crate::host::{FontLoader, HostError, NodeId, NodeKind, TextHost};
use crate::model::{AutoResizePolicy, BoxGeometry, OverflowVerdict, ParentGeometry, TextRun};
use crate::styles::{extract_run, substitute_text};

/// One element to measure with its candidate replacement text.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasureRequest {
    /// Element to copy and measure.
    pub node_id: NodeId,
    /// Candidate replacement text.
    pub replacement: String,
    /// Resize policy of the original element.
    pub policy: AutoResizePolicy,
    /// Original box before substitution.
    pub original: BoxGeometry,
    /// Governing parent for `WidthAndHeight` boxes.
    pub parent: Option<ParentGeometry>,
}

impl MeasureRequest {
    pub fn new(
        node_id: NodeId,
        replacement: impl Into<String>,
        policy: AutoResizePolicy,
        original: BoxGeometry,
    ) -> Self {
        Self {
            node_id,
            replacement: replacement.into(),
            policy,
            original,
            parent: None,
        }
    }

    /// Attach the governing parent geometry.
    pub fn with_parent(mut self, parent: Option<ParentGeometry>) -> Self {
        self.parent = parent;
        self
    }

    /// Read policy, box, and parent geometry from the live element.
    pub fn from_host<H>(
        host: &H,
        node_id: NodeId,
        replacement: impl Into<String>,
    ) -> Result<Self, AuditError>
    where
        H: TextHost + ?Sized,
    {
        let read = |err: HostError| {
            AuditError::from_host(ErrorPhase::Measure, "MEASURE_READ_FAILED", err)
                .with_node(node_id.as_str())
        };
        let policy = host.auto_resize(&node_id).map_err(read)?;
        let original = host.geometry(&node_id).map_err(read)?;
        let parent = host.parent_geometry(&node_id);
        Ok(Self::new(node_id, replacement, policy, original).with_parent(parent))
    }
}

/// Per-element measurement result.
///
/// A defaulted element reads as "fits" in the verdict stream; the error is
/// kept for callers that want to report it.
#[derive(Clone, Debug, PartialEq)]
pub enum MeasureOutcome {
    /// Measurement completed.
    Measured(OverflowVerdict),
    /// Measurement failed; the safe default verdict applies.
    Defaulted(AuditError),
}

impl MeasureOutcome {
    /// Verdict for this element; the safe default when measurement failed.
    pub fn verdict(&self) -> OverflowVerdict {
        match self {
            Self::Measured(verdict) => *verdict,
            Self::Defaulted(_) => OverflowVerdict::fits(),
        }
    }

    pub fn error(&self) -> Option<&AuditError> {
        match self {
            Self::Measured(_) => None,
            Self::Defaulted(err) => Some(err),
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, Self::Measured(_))
    }
}

/// Compare observed geometry with the reference size the policy selects.
///
/// - `WidthAndHeight`: width against the parent's content width; no parent
///   means nothing to compare and the element fits.
/// - `Height`: height against the original height.
/// - `None` / `Truncate`: natural width against the original width.
pub fn compare_geometry(
    policy: AutoResizePolicy,
    observed: BoxGeometry,
    original: BoxGeometry,
    parent: Option<ParentGeometry>,
) -> OverflowVerdict {
    match policy {
        AutoResizePolicy::WidthAndHeight => match parent {
            Some(parent) => OverflowVerdict::from_sizes(observed.width, parent.content_width()),
            None => OverflowVerdict::fits(),
        },
        AutoResizePolicy::Height => OverflowVerdict::from_sizes(observed.height, original.height),
        AutoResizePolicy::None | AutoResizePolicy::Truncate => {
            OverflowVerdict::from_sizes(observed.width, original.width)
        }
    }
}

/// Put the copy into the sizing mode its policy is measured under.
fn apply_policy_layout<H>(
    host: &mut H,
    id: &NodeId,
    policy: AutoResizePolicy,
    original: BoxGeometry,
) -> Result<(), HostError>
where
    H: TextHost + ?Sized,
{
    match policy {
        AutoResizePolicy::Height => {
            host.resize(id, original.width, original.height)?;
            host.set_auto_resize(id, AutoResizePolicy::Height)
        }
        AutoResizePolicy::WidthAndHeight | AutoResizePolicy::None | AutoResizePolicy::Truncate => {
            host.set_auto_resize(id, AutoResizePolicy::WidthAndHeight)
        }
    }
}

/// Hidden copy of a node, removed from the host when dropped.
struct ScopedDuplicate<'h, H: TextHost + ?Sized> {
    host: &'h mut H,
    id: NodeId,
}

impl<'h, H: TextHost + ?Sized> ScopedDuplicate<'h, H> {
    fn acquire(host: &'h mut H, source: &NodeId) -> Result<Self, AuditError> {
        let id = host.duplicate(source).map_err(|err| {
            AuditError::from_host(ErrorPhase::Measure, "MEASURE_DUPLICATE_FAILED", err)
                .with_node(source.as_str())
        })?;
        let mut scoped = Self { host, id };
        scoped.host.set_visible(&scoped.id, false).map_err(|err| {
            AuditError::from_host(ErrorPhase::Measure, "MEASURE_DUPLICATE_FAILED", err)
                .with_node(source.as_str())
        })?;
        Ok(scoped)
    }

    fn parts(&mut self) -> (&mut H, &NodeId) {
        (&mut *self.host, &self.id)
    }
}

impl<H: TextHost + ?Sized> Drop for ScopedDuplicate<'_, H> {
    fn drop(&mut self) {
        if let Err(err) = self.host.remove(&self.id) {
            log::warn!("failed to remove measurement copy {}: {}", self.id, err);
        }
    }
}

/// Confirm the node exists and is text, then snapshot its run.
pub(crate) fn snapshot_run<H>(host: &H, id: &NodeId) -> Result<TextRun, AuditError>
where
    H: TextHost + ?Sized,
{
    match host.node_kind(id) {
        Some(NodeKind::Text) => extract_run(host, id),
        Some(_) => Err(AuditError::new(
            ErrorPhase::Measure,
            "MEASURE_NOT_TEXT",
            "node is not a text element",
        )
        .with_node(id.as_str())),
        None => Err(AuditError::new(
            ErrorPhase::Measure,
            "MEASURE_NODE_MISSING",
            "node not found",
        )
        .with_node(id.as_str())),
    }
}

/// Measure one element whose fonts are already prepared.
pub(crate) fn measure_prepared<H, L>(
    host: &mut H,
    request: &MeasureRequest,
    run: &TextRun,
    fonts: &FontAvailabilityGuard<L>,
) -> Result<OverflowVerdict, AuditError>
where
    H: TextHost + ?Sized,
    L: FontLoader,
{
    let geometry_error = |err: HostError| {
        AuditError::from_host(ErrorPhase::Measure, "MEASURE_GEOMETRY_FAILED", err)
            .with_node(request.node_id.as_str())
    };

    let mut copy = ScopedDuplicate::acquire(host, &request.node_id)?;
    let (host, copy_id) = copy.parts();
    substitute_text(host, copy_id, run, &request.replacement, fonts)?;
    apply_policy_layout(host, copy_id, request.policy, request.original).map_err(geometry_error)?;
    let observed = host.geometry(copy_id).map_err(geometry_error)?;
    Ok(compare_geometry(
        request.policy,
        observed,
        request.original,
        request.parent,
    ))
}

//! Host document and font-loading seams consumed by the engine.

use core::fmt;
use core::future::Future;
use core::ops::Range;

use serde::{Deserialize, Serialize};

use crate::model::{AutoResizePolicy, BoxGeometry, Fill, FontName, ParentGeometry};

/// Opaque host node identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Coarse node classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Text element.
    Text,
    /// Frame, group, or any node with children.
    Container,
    /// Anything else (shapes, images).
    Other,
}

/// Node-wide style read: one value everywhere, or mixed across characters.
#[derive(Clone, Debug, PartialEq)]
pub enum Mixed<T> {
    Uniform(T),
    Mixed,
}

impl<T> Mixed<T> {
    /// Uniform value, if any.
    pub fn uniform(self) -> Option<T> {
        match self {
            Self::Uniform(value) => Some(value),
            Self::Mixed => None,
        }
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, Self::Mixed)
    }
}

/// Failure reported by a host primitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostError {
    pub message: Box<str>,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into().into_boxed_str(),
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HostError {}

/// Host document primitives: reads, geometry, and mutation of text nodes.
///
/// Character ranges are `[start, end)` in Unicode scalar values.
pub trait TextHost {
    /// Node classification, `None` when the node does not exist.
    fn node_kind(&self, id: &NodeId) -> Option<NodeKind>;

    /// Display name of the node.
    fn node_name(&self, id: &NodeId) -> Option<String>;

    /// Direct children in paint order.
    fn children(&self, id: &NodeId) -> Vec<NodeId>;

    /// Display name of the direct parent, if it has one.
    fn parent_name(&self, id: &NodeId) -> Option<String>;

    /// Width and horizontal padding of the governing parent, if resolvable.
    fn parent_geometry(&self, id: &NodeId) -> Option<ParentGeometry>;

    fn characters(&self, id: &NodeId) -> Result<String, HostError>;

    fn font_name(&self, id: &NodeId) -> Result<Mixed<FontName>, HostError>;

    fn font_size(&self, id: &NodeId) -> Result<Mixed<f32>, HostError>;

    fn fill(&self, id: &NodeId) -> Result<Mixed<Fill>, HostError>;

    /// Font on a range; `None` when the host cannot resolve one.
    fn range_font_name(
        &self,
        id: &NodeId,
        range: Range<usize>,
    ) -> Result<Option<FontName>, HostError>;

    fn range_font_size(&self, id: &NodeId, range: Range<usize>) -> Result<Option<f32>, HostError>;

    fn range_fill(&self, id: &NodeId, range: Range<usize>) -> Result<Option<Fill>, HostError>;

    /// Whether the host flags any font on the node as missing.
    fn has_missing_font(&self, id: &NodeId) -> Result<bool, HostError>;

    /// Current laid-out box.
    fn geometry(&self, id: &NodeId) -> Result<BoxGeometry, HostError>;

    fn auto_resize(&self, id: &NodeId) -> Result<AutoResizePolicy, HostError>;

    /// Copy a node; the copy must not be attached anywhere visible.
    fn duplicate(&mut self, id: &NodeId) -> Result<NodeId, HostError>;

    fn remove(&mut self, id: &NodeId) -> Result<(), HostError>;

    fn set_visible(&mut self, id: &NodeId, visible: bool) -> Result<(), HostError>;

    fn set_auto_resize(&mut self, id: &NodeId, policy: AutoResizePolicy) -> Result<(), HostError>;

    fn resize(&mut self, id: &NodeId, width: f32, height: f32) -> Result<(), HostError>;

    /// Replace every character. Requires the node's current fonts to be loaded.
    fn set_characters(&mut self, id: &NodeId, text: &str) -> Result<(), HostError>;

    fn set_range_font_name(
        &mut self,
        id: &NodeId,
        range: Range<usize>,
        font: &FontName,
    ) -> Result<(), HostError>;

    fn set_range_font_size(
        &mut self,
        id: &NodeId,
        range: Range<usize>,
        size: f32,
    ) -> Result<(), HostError>;

    fn set_range_fill(
        &mut self,
        id: &NodeId,
        range: Range<usize>,
        fill: &Fill,
    ) -> Result<(), HostError>;
}

/// Host font-loading primitive. The only suspension point besides translation.
pub trait FontLoader {
    /// Load a font so that text using it can be mutated.
    fn load_font(&self, font: &FontName) -> impl Future<Output = Result<(), HostError>>;
}

use std::collections::BTreeMap;
use std::ops::Range;

use overflow_audit::{
    AutoResizePolicy, BoxGeometry, Fill, FontName, HostError, Mixed, NodeId, NodeKind,
    ParentGeometry, TextHost,
};

use crate::font_library::SceneFontLibrary;
use crate::layout::{advance, measure_lines, Glyph, LINE_HEIGHT_FACTOR};

/// Concrete per-character style of a scene text node.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneStyle {
    pub font: FontName,
    pub size: f32,
    pub fill: Fill,
}

impl SceneStyle {
    /// Black text in `font` at `size`.
    pub fn new(font: FontName, size: f32) -> Self {
        Self {
            font,
            size,
            fill: Fill::rgb(0.0, 0.0, 0.0),
        }
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }
}

#[derive(Clone, Debug)]
struct TextBody {
    chars: Vec<char>,
    styles: Vec<SceneStyle>,
    // Style of an empty node and of text set into one.
    base: SceneStyle,
    auto_resize: AutoResizePolicy,
    fail_fill_writes: bool,
}

impl TextBody {
    fn fonts(&self) -> impl Iterator<Item = &FontName> {
        self.styles
            .iter()
            .chain(self.styles.is_empty().then_some(&self.base))
            .map(|style| &style.font)
    }

    fn uniform<T, F>(&self, range: Range<usize>, read: F) -> Option<T>
    where
        T: PartialEq,
        F: Fn(&SceneStyle) -> T,
    {
        let slice = &self.styles[range];
        let Some(first) = slice.first() else {
            return Some(read(&self.base));
        };
        let value = read(first);
        slice
            .iter()
            .skip(1)
            .all(|style| read(style) == value)
            .then_some(value)
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), HostError> {
        if range.start < range.end && range.end <= self.chars.len() {
            Ok(())
        } else {
            Err(HostError::new(format!(
                "range {}..{} out of bounds for length {}",
                range.start,
                range.end,
                self.chars.len()
            )))
        }
    }
}

#[derive(Clone, Debug)]
enum NodeBody {
    Text(TextBody),
    Frame {
        padding_left: f32,
        padding_right: f32,
    },
    Shape,
}

#[derive(Clone, Debug)]
struct SceneNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    visible: bool,
    width: f32,
    height: f32,
    fail_duplicate: bool,
    body: NodeBody,
}

/// In-memory design document implementing [`TextHost`].
///
/// Text geometry follows the node's resize policy: `WidthAndHeight` grows to
/// the natural extent, `Height` wraps at the stored width, and `None` or
/// `Truncate` keep the stored box.
#[derive(Clone, Debug)]
pub struct SceneDocument {
    fonts: SceneFontLibrary,
    nodes: BTreeMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
    next_id: u64,
}

fn not_found(id: &NodeId) -> HostError {
    HostError::new(format!("node {} not found", id))
}

impl SceneDocument {
    pub fn new(fonts: SceneFontLibrary) -> Self {
        Self {
            fonts,
            nodes: BTreeMap::new(),
            roots: Vec::new(),
            next_id: 0,
        }
    }

    pub fn fonts(&self) -> &SceneFontLibrary {
        &self.fonts
    }

    /// Top-level nodes in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Live node count, measurement copies included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn is_visible(&self, id: &NodeId) -> Option<bool> {
        self.nodes.get(id).map(|node| node.visible)
    }

    pub fn add_frame(
        &mut self,
        parent: Option<&NodeId>,
        name: &str,
        geometry: BoxGeometry,
    ) -> NodeId {
        let body = NodeBody::Frame {
            padding_left: 0.0,
            padding_right: 0.0,
        };
        self.insert(parent, name, geometry, body)
    }

    pub fn add_shape(
        &mut self,
        parent: Option<&NodeId>,
        name: &str,
        geometry: BoxGeometry,
    ) -> NodeId {
        self.insert(parent, name, geometry, NodeBody::Shape)
    }

    /// Add a uniformly styled text node; geometry is recomputed per `policy`.
    pub fn add_text(
        &mut self,
        parent: Option<&NodeId>,
        name: &str,
        text: &str,
        style: SceneStyle,
        policy: AutoResizePolicy,
        geometry: BoxGeometry,
    ) -> NodeId {
        let chars: Vec<char> = text.chars().collect();
        let body = NodeBody::Text(TextBody {
            styles: vec![style.clone(); chars.len()],
            chars,
            base: style,
            auto_resize: policy,
            fail_fill_writes: false,
        });
        let id = self.insert(parent, name, geometry, body);
        self.relayout(&id);
        id
    }

    pub fn set_padding(&mut self, id: &NodeId, left: f32, right: f32) -> Result<(), HostError> {
        match self.nodes.get_mut(id).map(|node| &mut node.body) {
            Some(NodeBody::Frame {
                padding_left,
                padding_right,
            }) => {
                *padding_left = left;
                *padding_right = right;
                Ok(())
            }
            Some(_) => Err(HostError::new(format!("node {} is not a frame", id))),
            None => Err(not_found(id)),
        }
    }

    /// Restyle a character range without the loaded-font requirement.
    pub fn restyle(
        &mut self,
        id: &NodeId,
        range: Range<usize>,
        style: SceneStyle,
    ) -> Result<(), HostError> {
        let body = self.text_mut(id)?;
        body.check_range(&range)?;
        body.styles[range].fill(style);
        self.relayout(id);
        Ok(())
    }

    /// Make every later `duplicate` of this node fail.
    pub fn fail_duplication(&mut self, id: &NodeId) -> Result<(), HostError> {
        let node = self.nodes.get_mut(id).ok_or_else(|| not_found(id))?;
        node.fail_duplicate = true;
        Ok(())
    }

    /// Make fill writes fail on this node and on its copies.
    pub fn fail_fill_writes(&mut self, id: &NodeId) -> Result<(), HostError> {
        self.text_mut(id)?.fail_fill_writes = true;
        Ok(())
    }

    /// Per-character styles of a text node.
    pub fn char_styles(&self, id: &NodeId) -> Option<Vec<SceneStyle>> {
        self.text(id).ok().map(|body| body.styles.clone())
    }

    fn insert(
        &mut self,
        parent: Option<&NodeId>,
        name: &str,
        geometry: BoxGeometry,
        body: NodeBody,
    ) -> NodeId {
        let id = self.alloc_id();
        let parent = parent.filter(|p| self.nodes.contains_key(*p)).cloned();
        match &parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(parent_id) {
                    parent_node.children.push(id.clone());
                }
            }
            None => self.roots.push(id.clone()),
        }
        self.nodes.insert(
            id.clone(),
            SceneNode {
                name: name.to_string(),
                parent,
                children: Vec::new(),
                visible: true,
                width: geometry.width,
                height: geometry.height,
                fail_duplicate: false,
                body,
            },
        );
        id
    }

    fn alloc_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId::new(format!("1:{}", self.next_id))
    }

    fn node(&self, id: &NodeId) -> Result<&SceneNode, HostError> {
        self.nodes.get(id).ok_or_else(|| not_found(id))
    }

    fn text(&self, id: &NodeId) -> Result<&TextBody, HostError> {
        match &self.node(id)?.body {
            NodeBody::Text(body) => Ok(body),
            _ => Err(HostError::new(format!("node {} is not a text node", id))),
        }
    }

    fn text_mut(&mut self, id: &NodeId) -> Result<&mut TextBody, HostError> {
        match self.nodes.get_mut(id).map(|node| &mut node.body) {
            Some(NodeBody::Text(body)) => Ok(body),
            Some(_) => Err(HostError::new(format!("node {} is not a text node", id))),
            None => Err(not_found(id)),
        }
    }

    fn require_loaded(&self, font: &FontName) -> Result<(), HostError> {
        if self.fonts.is_loaded(font) {
            Ok(())
        } else {
            Err(HostError::new(format!("font {} is not loaded", font)))
        }
    }

    fn relayout(&mut self, id: &NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let NodeBody::Text(body) = &node.body else {
            return;
        };
        let wrap_width = match body.auto_resize {
            AutoResizePolicy::WidthAndHeight => None,
            AutoResizePolicy::Height => Some(node.width),
            AutoResizePolicy::None | AutoResizePolicy::Truncate => return,
        };

        let glyphs: Vec<Glyph> = body
            .chars
            .iter()
            .zip(&body.styles)
            .map(|(&ch, style)| Glyph {
                ch,
                advance: advance(ch, style.size, self.fonts.advance(&style.font)),
            })
            .collect();
        let max_size = body
            .styles
            .iter()
            .map(|style| style.size)
            .fold(body.base.size, f32::max);
        let extent = measure_lines(&glyphs, wrap_width);
        let width = wrap_width.unwrap_or(extent.width);
        let height = extent.lines as f32 * max_size * LINE_HEIGHT_FACTOR;

        if let Some(node) = self.nodes.get_mut(id) {
            node.width = width;
            node.height = height;
        }
    }
}

impl TextHost for SceneDocument {
    fn node_kind(&self, id: &NodeId) -> Option<NodeKind> {
        self.nodes.get(id).map(|node| match node.body {
            NodeBody::Text(_) => NodeKind::Text,
            NodeBody::Frame { .. } => NodeKind::Container,
            NodeBody::Shape => NodeKind::Other,
        })
    }

    fn node_name(&self, id: &NodeId) -> Option<String> {
        self.nodes.get(id).map(|node| node.name.clone())
    }

    fn children(&self, id: &NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    fn parent_name(&self, id: &NodeId) -> Option<String> {
        let parent = self.nodes.get(id)?.parent.as_ref()?;
        self.node_name(parent)
    }

    fn parent_geometry(&self, id: &NodeId) -> Option<ParentGeometry> {
        let parent = self.nodes.get(self.nodes.get(id)?.parent.as_ref()?)?;
        match parent.body {
            NodeBody::Frame {
                padding_left,
                padding_right,
            } => Some(ParentGeometry {
                width: parent.width,
                padding_left,
                padding_right,
            }),
            _ => None,
        }
    }

    fn characters(&self, id: &NodeId) -> Result<String, HostError> {
        Ok(self.text(id)?.chars.iter().collect())
    }

    fn font_name(&self, id: &NodeId) -> Result<Mixed<FontName>, HostError> {
        let body = self.text(id)?;
        let font = body.uniform(0..body.styles.len(), |s| s.font.clone());
        Ok(mixed(font))
    }

    fn font_size(&self, id: &NodeId) -> Result<Mixed<f32>, HostError> {
        let body = self.text(id)?;
        Ok(mixed(body.uniform(0..body.styles.len(), |s| s.size)))
    }

    fn fill(&self, id: &NodeId) -> Result<Mixed<Fill>, HostError> {
        let body = self.text(id)?;
        Ok(mixed(body.uniform(0..body.styles.len(), |s| s.fill)))
    }

    fn range_font_name(
        &self,
        id: &NodeId,
        range: Range<usize>,
    ) -> Result<Option<FontName>, HostError> {
        let body = self.text(id)?;
        body.check_range(&range)?;
        Ok(body.uniform(range, |s| s.font.clone()))
    }

    fn range_font_size(&self, id: &NodeId, range: Range<usize>) -> Result<Option<f32>, HostError> {
        let body = self.text(id)?;
        body.check_range(&range)?;
        Ok(body.uniform(range, |s| s.size))
    }

    fn range_fill(&self, id: &NodeId, range: Range<usize>) -> Result<Option<Fill>, HostError> {
        let body = self.text(id)?;
        body.check_range(&range)?;
        Ok(body.uniform(range, |s| s.fill))
    }

    fn has_missing_font(&self, id: &NodeId) -> Result<bool, HostError> {
        let body = self.text(id)?;
        Ok(body.fonts().any(|font| !self.fonts.is_installed(font)))
    }

    fn geometry(&self, id: &NodeId) -> Result<BoxGeometry, HostError> {
        let node = self.node(id)?;
        Ok(BoxGeometry::new(node.width, node.height))
    }

    fn auto_resize(&self, id: &NodeId) -> Result<AutoResizePolicy, HostError> {
        Ok(self.text(id)?.auto_resize)
    }

    fn duplicate(&mut self, id: &NodeId) -> Result<NodeId, HostError> {
        let source = self.node(id)?;
        if source.fail_duplicate {
            let reason = format!("duplication of {} was rejected", id);
            return Err(HostError::new(reason));
        }
        if !matches!(source.body, NodeBody::Text(_)) {
            return Err(HostError::new(format!("node {} is not a text node", id)));
        }
        let mut copy = source.clone();
        copy.children.clear();
        let copy_id = self.alloc_id();
        let siblings = match &copy.parent {
            Some(parent) => self.nodes.get_mut(parent).map(|node| &mut node.children),
            None => Some(&mut self.roots),
        };
        if let Some(siblings) = siblings {
            let at = siblings
                .iter()
                .position(|sibling| sibling == id)
                .map_or(siblings.len(), |pos| pos + 1);
            siblings.insert(at, copy_id.clone());
        }
        self.nodes.insert(copy_id.clone(), copy);
        log::debug!("duplicated {} as {}", id, copy_id);
        Ok(copy_id)
    }

    fn remove(&mut self, id: &NodeId) -> Result<(), HostError> {
        let node = self.nodes.remove(id).ok_or_else(|| not_found(id))?;
        match &node.parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(parent) {
                    parent.children.retain(|child| child != id);
                }
            }
            None => self.roots.retain(|root| root != id),
        }
        let mut pending = node.children;
        while let Some(child) = pending.pop() {
            if let Some(child) = self.nodes.remove(&child) {
                pending.extend(child.children);
            }
        }
        log::debug!("removed {}", id);
        Ok(())
    }

    fn set_visible(&mut self, id: &NodeId, visible: bool) -> Result<(), HostError> {
        let node = self.nodes.get_mut(id).ok_or_else(|| not_found(id))?;
        node.visible = visible;
        Ok(())
    }

    fn set_auto_resize(&mut self, id: &NodeId, policy: AutoResizePolicy) -> Result<(), HostError> {
        self.text_mut(id)?.auto_resize = policy;
        self.relayout(id);
        Ok(())
    }

    fn resize(&mut self, id: &NodeId, width: f32, height: f32) -> Result<(), HostError> {
        let node = self.nodes.get_mut(id).ok_or_else(|| not_found(id))?;
        node.width = width;
        node.height = height;
        self.relayout(id);
        Ok(())
    }

    fn set_characters(&mut self, id: &NodeId, text: &str) -> Result<(), HostError> {
        let body = self.text(id)?;
        for font in body.fonts() {
            self.require_loaded(font)?;
        }
        let style = body.styles.first().unwrap_or(&body.base).clone();

        let body = self.text_mut(id)?;
        body.chars = text.chars().collect();
        body.styles = vec![style.clone(); body.chars.len()];
        body.base = style;
        self.relayout(id);
        Ok(())
    }

    fn set_range_font_name(
        &mut self,
        id: &NodeId,
        range: Range<usize>,
        font: &FontName,
    ) -> Result<(), HostError> {
        self.require_loaded(font)?;
        let body = self.text_mut(id)?;
        body.check_range(&range)?;
        for style in &mut body.styles[range] {
            style.font = font.clone();
        }
        self.relayout(id);
        Ok(())
    }

    fn set_range_font_size(
        &mut self,
        id: &NodeId,
        range: Range<usize>,
        size: f32,
    ) -> Result<(), HostError> {
        let body = self.text_mut(id)?;
        body.check_range(&range)?;
        for style in &mut body.styles[range] {
            style.size = size;
        }
        self.relayout(id);
        Ok(())
    }

    fn set_range_fill(
        &mut self,
        id: &NodeId,
        range: Range<usize>,
        fill: &Fill,
    ) -> Result<(), HostError> {
        let body = self.text_mut(id)?;
        if body.fail_fill_writes {
            return Err(HostError::new(format!("fill writes on {} are rejected", id)));
        }
        body.check_range(&range)?;
        for style in &mut body.styles[range] {
            style.fill = *fill;
        }
        Ok(())
    }
}

fn mixed<T>(value: Option<T>) -> Mixed<T> {
    value.map_or(Mixed::Mixed, Mixed::Uniform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use overflow_audit::FontLoader;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn inter() -> FontName {
        FontName::default()
    }

    fn loaded_doc() -> SceneDocument {
        let fonts = SceneFontLibrary::with_fonts([inter(), FontName::new("Inter", "Bold")]);
        block_on(fonts.load_font(&inter())).expect("inter should load");
        SceneDocument::new(fonts)
    }

    #[test]
    fn fixed_box_keeps_stored_geometry() {
        let mut doc = loaded_doc();
        let id = doc.add_text(
            None,
            "label",
            "Save",
            SceneStyle::new(inter(), 20.0),
            AutoResizePolicy::None,
            BoxGeometry::new(100.0, 24.0),
        );
        doc.set_characters(&id, "Speichern").expect("set");
        let geometry = doc.geometry(&id).expect("geometry should read");
        assert_eq!(geometry, BoxGeometry::new(100.0, 24.0));
    }

    #[test]
    fn width_and_height_grows_to_natural_extent() {
        let mut doc = loaded_doc();
        let id = doc.add_text(
            None,
            "label",
            "Save",
            SceneStyle::new(inter(), 20.0),
            AutoResizePolicy::WidthAndHeight,
            BoxGeometry::default(),
        );
        let geometry = doc.geometry(&id).expect("geometry should read");
        assert!(approx(geometry.width, 48.0));
        assert!(approx(geometry.height, 24.0));
    }

    #[test]
    fn height_policy_wraps_at_fixed_width() {
        let mut doc = loaded_doc();
        let id = doc.add_text(
            None,
            "body",
            "aaa bbb",
            SceneStyle::new(inter(), 10.0),
            AutoResizePolicy::Height,
            BoxGeometry::new(50.0, 12.0),
        );
        assert!(approx(doc.geometry(&id).expect("geometry").height, 12.0));
        // Words 18 wide, spaces 6: two words per 50-wide line.
        doc.set_characters(&id, "aaa bbb ccc ddd").expect("set");
        let geometry = doc.geometry(&id).expect("geometry should read");
        assert!(approx(geometry.width, 50.0));
        assert!(approx(geometry.height, 24.0));
    }

    #[test]
    fn set_characters_requires_loaded_fonts() {
        let mut doc = loaded_doc();
        let bold = FontName::new("Inter", "Bold");
        let id = doc.add_text(
            None,
            "label",
            "Hi",
            SceneStyle::new(bold.clone(), 12.0),
            AutoResizePolicy::None,
            BoxGeometry::new(40.0, 14.0),
        );
        let err = doc.set_characters(&id, "Hallo").expect_err("not loaded");
        assert!(err.message.contains("not loaded"));
        block_on(doc.fonts().load_font(&bold)).expect("bold should load");
        doc.set_characters(&id, "Hallo").expect("loaded now");
        assert_eq!(doc.characters(&id).expect("read"), "Hallo");
    }

    #[test]
    fn new_text_takes_first_character_style() {
        let mut doc = loaded_doc();
        let id = doc.add_text(
            None,
            "label",
            "ab",
            SceneStyle::new(inter(), 12.0),
            AutoResizePolicy::None,
            BoxGeometry::new(40.0, 14.0),
        );
        doc.restyle(&id, 1..2, SceneStyle::new(inter(), 30.0))
            .expect("restyle should succeed");
        assert!(doc.font_size(&id).expect("read").is_mixed());
        doc.set_characters(&id, "xyz").expect("set should succeed");
        assert_eq!(doc.font_size(&id).expect("read"), Mixed::Uniform(12.0));
    }

    #[test]
    fn range_reads_report_mixed_as_none() {
        let mut doc = loaded_doc();
        let id = doc.add_text(
            None,
            "label",
            "abcd",
            SceneStyle::new(inter(), 12.0),
            AutoResizePolicy::None,
            BoxGeometry::new(40.0, 14.0),
        );
        doc.restyle(&id, 2..4, SceneStyle::new(inter(), 18.0))
            .expect("restyle should succeed");
        assert_eq!(doc.range_font_size(&id, 0..2).expect("read"), Some(12.0));
        assert_eq!(doc.range_font_size(&id, 1..3).expect("read"), None);
        assert!(doc.range_font_size(&id, 3..5).is_err());
        assert!(doc.range_font_size(&id, 2..2).is_err());
    }

    #[test]
    fn range_font_write_requires_loaded_target() {
        let mut doc = loaded_doc();
        let id = doc.add_text(
            None,
            "label",
            "abcd",
            SceneStyle::new(inter(), 12.0),
            AutoResizePolicy::None,
            BoxGeometry::new(40.0, 14.0),
        );
        let bold = FontName::new("Inter", "Bold");
        assert!(doc.set_range_font_name(&id, 0..2, &bold).is_err());
        assert_eq!(doc.font_name(&id).expect("read"), Mixed::Uniform(inter()));
    }

    #[test]
    fn duplicate_and_remove_maintain_tree() {
        let mut doc = loaded_doc();
        let frame = doc.add_frame(None, "Card", BoxGeometry::new(200.0, 100.0));
        doc.set_padding(&frame, 8.0, 12.0).expect("frame padding");
        let label = doc.add_text(
            Some(&frame),
            "label",
            "Save",
            SceneStyle::new(inter(), 12.0),
            AutoResizePolicy::WidthAndHeight,
            BoxGeometry::default(),
        );
        let copy = doc.duplicate(&label).expect("duplicate should succeed");
        assert_eq!(doc.children(&frame), vec![label.clone(), copy.clone()]);
        assert_eq!(doc.parent_name(&copy).as_deref(), Some("Card"));
        let parent = doc.parent_geometry(&copy).expect("frame parent");
        assert!(approx(parent.content_width(), 180.0));

        doc.remove(&copy).expect("remove should succeed");
        assert_eq!(doc.children(&frame), vec![label]);
        assert_eq!(doc.node_count(), 2);
    }

    #[test]
    fn removing_a_frame_removes_descendants() {
        let mut doc = loaded_doc();
        let frame = doc.add_frame(None, "Card", BoxGeometry::new(200.0, 100.0));
        doc.add_shape(Some(&frame), "bg", BoxGeometry::new(200.0, 100.0));
        doc.remove(&frame).expect("remove should succeed");
        assert_eq!(doc.node_count(), 0);
        assert!(doc.roots().is_empty());
    }

    #[test]
    fn injected_duplication_failure() {
        let mut doc = loaded_doc();
        let id = doc.add_text(
            None,
            "label",
            "Save",
            SceneStyle::new(inter(), 12.0),
            AutoResizePolicy::None,
            BoxGeometry::new(40.0, 14.0),
        );
        doc.fail_duplication(&id).expect("node exists");
        assert!(doc.duplicate(&id).is_err());
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn missing_font_means_not_installed() {
        let mut doc = loaded_doc();
        let id = doc.add_text(
            None,
            "label",
            "Save",
            SceneStyle::new(FontName::new("Brand Sans", "Black"), 12.0),
            AutoResizePolicy::None,
            BoxGeometry::new(40.0, 14.0),
        );
        assert!(doc.has_missing_font(&id).expect("read"));
    }
}

//! Document model for viewport geometry measurement.
//!
//! An arena-backed tree of document/element/text nodes carrying the layout
//! facts the geometry helpers read: computed style strings, viewport-relative
//! bounding rects, the offset-parent chain, and page scroll offsets. Nodes are
//! referenced by opaque [`NodeId`] handles scoped to a [`Document`].
//!
//! The `Document` is passed explicitly to every consumer; there is no global
//! document handle. Hosts populate geometry through the setters after their
//! own layout pass, and tests build small trees the same way.

use anyhow::{Result, bail};
use indextree::Arena;
use log::trace;
use std::collections::HashMap;

mod node;

pub use indextree::NodeId;
pub use node::{DomNode, NodeKind, OffsetRecord, Rect};

/// A document tree plus the page-level scroll state.
///
/// Always contains a document node with a single root element (`html`) child.
#[derive(Debug)]
pub struct Document {
    arena: Arena<DomNode>,
    document: NodeId,
    root: NodeId,
    /// Designated scrolling element, when the host has nominated one.
    scrolling: Option<NodeId>,
    scroll_x: f64,
    scroll_y: f64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only the document node and the root
    /// element.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let document = arena.new_node(DomNode::default());
        let root = arena.new_node(DomNode::element("html"));
        document.append(root, &mut arena);
        Self {
            arena,
            document,
            root,
            scrolling: None,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    /// The document node itself (above the root element).
    pub fn document_node(&self) -> NodeId {
        self.document
    }

    /// The root element (`html`).
    pub fn root_element(&self) -> NodeId {
        self.root
    }

    /// The element that scrolls the page: the host-designated scrolling
    /// element, falling back to the root element when none was set.
    pub fn scrolling_element(&self) -> NodeId {
        self.scrolling.unwrap_or(self.root)
    }

    /// Tree parent of `node`. `None` for the document node or a stale handle.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.live(node).and_then(indextree::Node::parent)
    }

    /// Last child of `node`, if any.
    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.live(node).and_then(indextree::Node::last_child)
    }

    /// Immediate previous sibling of `node`, if any.
    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.live(node).and_then(indextree::Node::previous_sibling)
    }

    /// Immediate next sibling of `node`, if any.
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.live(node).and_then(indextree::Node::next_sibling)
    }

    /// Children of `node` in tree order.
    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(&self.arena)
    }

    /// Structural containment: whether `node` is `ancestor` or a descendant
    /// of it. Matches the DOM `Node.contains` convention of a node containing
    /// itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node.ancestors(&self.arena).any(|link| link == ancestor)
    }

    /// Element tag, or `None` for non-element nodes and stale handles.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.live(node)?.get().kind {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }

    /// Attribute lookup on an element.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.live(node)?
            .get()
            .attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Computed style lookup: the resolved string value of `property`, or
    /// `None` when the property has no computed value on this node.
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.live(node)?
            .get()
            .style
            .get(property)
            .map(String::as_str)
    }

    /// Viewport-relative bounding rect from the last layout pass. Zero for
    /// nodes no layout pass has measured.
    pub fn bounding_rect(&self, node: NodeId) -> Rect {
        self.live(node)
            .map_or_else(Rect::default, |entry| entry.get().rect)
    }

    /// Nearest positioned ancestor of `node` in the layout tree.
    pub fn offset_parent(&self, node: NodeId) -> Option<NodeId> {
        self.live(node).and_then(|entry| entry.get().offset.parent)
    }

    /// Offset of `node` from its offset parent's padding edge, block axis.
    pub fn offset_top(&self, node: NodeId) -> f64 {
        self.live(node).map_or(0.0, |entry| entry.get().offset.top)
    }

    /// Offset of `node` from its offset parent's padding edge, inline axis.
    pub fn offset_left(&self, node: NodeId) -> f64 {
        self.live(node).map_or(0.0, |entry| entry.get().offset.left)
    }

    /// Current horizontal page scroll offset in pixels.
    pub fn scroll_x(&self) -> f64 {
        self.scroll_x
    }

    /// Current vertical page scroll offset in pixels.
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Append a new element under `parent`.
    ///
    /// # Errors
    /// Returns an error if `parent` is not a live node of this document.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId> {
        self.ensure_live(parent)?;
        let child = self.arena.new_node(DomNode::element(tag));
        parent.checked_append(child, &mut self.arena)?;
        Ok(child)
    }

    /// Append a new text node under `parent`.
    ///
    /// # Errors
    /// Returns an error if `parent` is not a live node of this document.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        self.ensure_live(parent)?;
        let child = self.arena.new_node(DomNode::text(text));
        parent.checked_append(child, &mut self.arena)?;
        Ok(child)
    }

    /// Set an attribute, replacing any existing value for `name`.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(entry) = self.live_mut(node) {
            let attrs = &mut entry.get_mut().attrs;
            if let Some(existing) = attrs.iter_mut().find(|(key, _)| key == name) {
                existing.1 = value.to_owned();
            } else {
                attrs.push((name.to_owned(), value.to_owned()));
            }
        }
    }

    /// Set a computed style property to its resolved string value.
    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(entry) = self.live_mut(node) {
            entry
                .get_mut()
                .style
                .insert(property.to_owned(), value.to_owned());
        }
    }

    /// Replace the computed style map wholesale.
    pub fn set_styles(&mut self, node: NodeId, styles: HashMap<String, String>) {
        if let Some(entry) = self.live_mut(node) {
            entry.get_mut().style = styles;
        }
    }

    /// Record a node's viewport-relative bounding rect.
    pub fn set_bounding_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(entry) = self.live_mut(node) {
            entry.get_mut().rect = rect;
        }
    }

    /// Record a node's offset parent and offsets from it.
    pub fn set_offset(&mut self, node: NodeId, parent: Option<NodeId>, top: f64, left: f64) {
        if let Some(entry) = self.live_mut(node) {
            entry.get_mut().offset = OffsetRecord { parent, top, left };
        }
    }

    /// Record the page scroll position.
    pub fn set_scroll_offset(&mut self, x: f64, y: f64) {
        self.scroll_x = x;
        self.scroll_y = y;
    }

    /// Nominate the element that scrolls the page.
    pub fn set_scrolling_element(&mut self, node: NodeId) {
        self.scrolling = Some(node);
    }

    /// Detach `node` and its subtree from the document.
    ///
    /// # Errors
    /// Returns an error when asked to remove the document node or the root
    /// element.
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        if node == self.document || node == self.root {
            bail!("cannot remove the document node or the root element");
        }
        self.ensure_live(node)?;
        node.remove_subtree(&mut self.arena);
        Ok(())
    }

    /// Move `node` so it becomes the immediate previous sibling of
    /// `reference`. The single structural mutation the geometry helpers
    /// perform.
    ///
    /// # Errors
    /// Returns an error when `reference` has no parent, when either handle is
    /// stale, or when the move would create a cycle.
    pub fn insert_before(&mut self, node: NodeId, reference: NodeId) -> Result<()> {
        self.ensure_live(node)?;
        self.ensure_live(reference)?;
        if self.parent(reference).is_none() {
            bail!("insert_before reference node has no parent");
        }
        if node == self.document || node == self.root {
            bail!("cannot relocate the document node or the root element");
        }
        trace!("moving {node:?} before {reference:?}");
        node.detach(&mut self.arena);
        reference.checked_insert_before(node, &mut self.arena)?;
        Ok(())
    }

    fn live(&self, node: NodeId) -> Option<&indextree::Node<DomNode>> {
        self.arena.get(node).filter(|entry| !entry.is_removed())
    }

    fn live_mut(&mut self, node: NodeId) -> Option<&mut indextree::Node<DomNode>> {
        self.arena.get_mut(node).filter(|entry| !entry.is_removed())
    }

    fn ensure_live(&self, node: NodeId) -> Result<()> {
        if self.live(node).is_none() {
            bail!("node handle is not live in this document");
        }
        Ok(())
    }
}

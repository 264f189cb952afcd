use indextree::NodeId;
use smallvec::SmallVec;
use std::collections::HashMap;

/// What a node in the document tree is.
#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
    Text {
        text: String,
    },
}

/// On-screen rectangle in viewport pixels, as reported by a layout pass.
///
/// Matches the shape of a bounding client rect: `top`/`left` are
/// viewport-relative and move as the page scrolls.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Layout-tree-relative position of a node.
///
/// `parent` is the nearest positioned ancestor (the offset parent); `top` and
/// `left` are measured from that ancestor's padding edge. Distinct from the
/// viewport-relative [`Rect`]: these values do not move when the page scrolls.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetRecord {
    pub parent: Option<NodeId>,
    pub top: f64,
    pub left: f64,
}

/// Per-node data stored in the document arena.
#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
    /// Computed style: resolved property values as strings (e.g. "12px").
    pub(crate) style: HashMap<String, String>,
    /// Viewport-relative bounding rect from the last layout pass.
    pub(crate) rect: Rect,
    /// Offset-parent chain position from the last layout pass.
    pub(crate) offset: OffsetRecord,
}

impl DomNode {
    pub(crate) fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element { tag: tag.to_owned() },
            ..Self::default()
        }
    }

    pub(crate) fn text(text: &str) -> Self {
        Self {
            kind: NodeKind::Text { text: text.to_owned() },
            ..Self::default()
        }
    }
}

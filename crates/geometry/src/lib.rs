//! Geometry helpers for scroll-viewport measurement.
//!
//! Stateless functions over a [`Document`] and its [`NodeId`] element
//! handles: finding the ancestor that acts as a scroll container, measuring
//! distances to the document top or to an ancestor, summing numeric computed
//! style values, and outer/inner box dimensions. Every function is a pure
//! query except [`insert_before_node`], which performs exactly one structural
//! mutation.
//!
//! Callers pass the document handle explicitly; results reflect the layout
//! facts recorded on it at call time, with no staleness guarantees across
//! separate calls.

use anyhow::{Result, bail};
use cssparser::{Parser, ParserInput, Token};
use dom::{Document, NodeId};
use log::trace;

/// Axis selector for offset and scroll measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Vertical,
    Horizontal,
}

/// Whether `element`'s computed overflow lets it scroll its content.
///
/// True iff computed `overflow-y` or `overflow` is exactly `scroll` or
/// `auto`. Missing style reads as not scrollable.
pub fn has_overflow_scroll(doc: &Document, element: NodeId) -> bool {
    let scrollable = |value: Option<&str>| matches!(value, Some("scroll" | "auto"));
    scrollable(doc.style(element, "overflow-y")) || scrollable(doc.style(element, "overflow"))
}

/// The nearest ancestor of `element` that acts as its scroll container.
///
/// Walks tree parents starting above `element`, stopping before the root
/// element, and returns the first ancestor with scrollable overflow. When no
/// ancestor qualifies, returns the document's designated scrolling element
/// (which itself falls back to the root element). Never traverses past the
/// document root.
pub fn scroller_element(doc: &Document, element: NodeId) -> NodeId {
    let root = doc.root_element();
    let mut current = doc.parent(element);
    while let Some(candidate) = current {
        if candidate == root || candidate == doc.document_node() {
            break;
        }
        if has_overflow_scroll(doc, candidate) {
            trace!("scroller for {element:?} is ancestor {candidate:?}");
            return candidate;
        }
        current = doc.parent(candidate);
    }
    trace!("no scrollable ancestor for {element:?}, using the document scroller");
    doc.scrolling_element()
}

/// Sum the numeric interpretation of the named computed style properties.
///
/// Each property's resolved string is read as a leading number (`"12px"`
/// contributes 12, `"50%"` contributes 50); missing or non-numeric values
/// contribute 0. An empty property list sums to 0.
pub fn style_values(doc: &Document, element: NodeId, properties: &[&str]) -> f64 {
    properties
        .iter()
        .map(|property| doc.style(element, property).map_or(0.0, numeric_value))
        .sum()
}

/// Bounding height plus top and bottom margins: the vertical space the
/// element occupies in flow.
pub fn outer_height(doc: &Document, element: NodeId) -> f64 {
    doc.bounding_rect(element).height + style_values(doc, element, &["margin-top", "margin-bottom"])
}

/// Bounding width plus left and right margins.
pub fn outer_width(doc: &Document, element: NodeId) -> f64 {
    doc.bounding_rect(element).width + style_values(doc, element, &["margin-left", "margin-right"])
}

/// Bounding height minus top and bottom border widths: the vertical space
/// available to scrollable content inside the borders. Note the asymmetry
/// with [`outer_height`] (margins are added, borders subtracted).
pub fn scroll_height(doc: &Document, element: NodeId) -> f64 {
    doc.bounding_rect(element).height
        - style_values(doc, element, &["border-top-width", "border-bottom-width"])
}

/// Bounding width minus left and right border widths.
pub fn scroll_width(doc: &Document, element: NodeId) -> f64 {
    doc.bounding_rect(element).width
        - style_values(doc, element, &["border-left-width", "border-right-width"])
}

/// Distance from the document's top (or left) edge to `element`, rounded to
/// the nearest pixel.
///
/// Computed as the viewport-relative rect edge plus the current page scroll
/// offset, minus the root element's client-edge offset (its leading border
/// width). Rounding is half-away-from-zero.
pub fn distance_to_top_of_document(
    doc: &Document,
    element: NodeId,
    direction: Direction,
) -> i64 {
    let rect = doc.bounding_rect(element);
    let root = doc.root_element();
    let raw = match direction {
        Direction::Vertical => {
            rect.top + doc.scroll_y() - style_values(doc, root, &["border-top-width"])
        }
        Direction::Horizontal => {
            rect.left + doc.scroll_x() - style_values(doc, root, &["border-left-width"])
        }
    };
    raw.round() as i64
}

/// Offset of `child` relative to `parent` along `direction`, measured
/// through the offset-parent chain (layout-tree-relative, unlike
/// [`distance_to_top_of_document`] which is viewport-derived).
///
/// Ascends the chain accumulating offsets until it meets `parent`, or until
/// `parent` sits between the current offset parent and the walk (in which
/// case `parent`'s own offset is subtracted out). When `parent` is not on
/// any offset-parent chain above `child`, the walk runs off the top of the
/// chain and the result is relative to the document instead; callers get a
/// best-effort number, not an error.
pub fn distance_to_parent(
    doc: &Document,
    child: NodeId,
    parent: NodeId,
    direction: Direction,
) -> f64 {
    let offset_along = |node: NodeId| match direction {
        Direction::Vertical => doc.offset_top(node),
        Direction::Horizontal => doc.offset_left(node),
    };

    // Iterative form of the ascent; each step strictly climbs the finite
    // offset-parent chain.
    let mut current = child;
    let mut total = 0.0;
    loop {
        let own = offset_along(current);
        match doc.offset_parent(current) {
            None => return total + own,
            Some(offset_parent) if offset_parent == parent => return total + own,
            Some(offset_parent) if doc.contains(offset_parent, parent) => {
                // `parent` lies between the offset parent and the walk:
                // rebase by parent's own offset within that frame.
                return total + own - offset_along(parent);
            }
            Some(offset_parent) => {
                total += own;
                current = offset_parent;
            }
        }
    }
}

/// A list-like UI structure exposing the last node it rendered.
pub trait View {
    /// The view's last node, if it currently has one.
    fn last_node(&self, doc: &Document) -> Option<NodeId>;
}

/// A view backed by a container element: its last node is the container's
/// last child.
impl View for NodeId {
    fn last_node(&self, doc: &Document) -> Option<NodeId> {
        doc.last_child(*self)
    }
}

/// Move `view`'s last node so it immediately precedes `bottom_buffer`.
///
/// The only mutating helper: exactly one node changes position.
///
/// # Errors
/// Returns an error when the view has no last node or when `bottom_buffer`
/// has no parent to insert under.
pub fn insert_before_node(
    doc: &mut Document,
    view: &impl View,
    bottom_buffer: NodeId,
) -> Result<()> {
    let Some(node) = view.last_node(doc) else {
        bail!("view has no last node to move");
    };
    doc.insert_before(node, bottom_buffer)
}

/// Leading numeric value of a computed style string; 0 when the string does
/// not start with a number.
fn numeric_value(value: &str) -> f64 {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    match parser.next() {
        Ok(Token::Dimension { value, .. } | Token::Number { value, .. }) => f64::from(*value),
        // Percentages read as their written magnitude ("50%" is 50).
        Ok(Token::Percentage { unit_value, .. }) => f64::from(*unit_value) * 100.0,
        _ => 0.0,
    }
}

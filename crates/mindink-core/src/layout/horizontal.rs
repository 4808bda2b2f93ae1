//! Horizontal tree layout: depth-first, bottom-up sizing.
//!
//! Each subtree claims a vertical band equal to the sum of its children's
//! bands plus spacing; a node is centered on its band and its children are
//! stacked consecutively inside it. Horizontal placement follows the parent's
//! actual width, so differently sized nodes lay out correctly.

use super::{LayoutConfig, LayoutResult, visible_children};
use crate::document::MapDocument;
use crate::node::NodeId;
use kurbo::Point;
use std::collections::HashMap;

pub(super) fn layout(doc: &MapDocument, config: &LayoutConfig, anchor: Point) -> LayoutResult {
    let mut result = LayoutResult::default();
    let Some(root) = doc.root() else {
        return result;
    };

    let mut extents = HashMap::new();
    measure(doc, config, root, &mut extents);

    let root_extent = extents[&root];
    let Some(root_node) = doc.get(root) else {
        return result;
    };
    let left = anchor.x - root_node.size.width / 2.0;
    place(doc, config, root, left, anchor.y - root_extent / 2.0, &extents, &mut result);
    result
}

/// Vertical band a subtree occupies: its own height for leaves (and
/// collapsed nodes), otherwise the children's bands plus spacing.
fn measure(
    doc: &MapDocument,
    config: &LayoutConfig,
    id: NodeId,
    extents: &mut HashMap<NodeId, f64>,
) -> f64 {
    let children = visible_children(doc, id);
    let extent = if children.is_empty() {
        doc.get(id).map(|n| n.size.height).unwrap_or(0.0)
    } else {
        let gaps = (children.len() - 1) as f64 * config.vertical_spacing;
        children
            .iter()
            .map(|&c| measure(doc, config, c, extents))
            .sum::<f64>()
            + gaps
    };
    extents.insert(id, extent);
    extent
}

/// Place a node centered on its band, then stack its children in the band
/// to the right of the node.
fn place(
    doc: &MapDocument,
    config: &LayoutConfig,
    id: NodeId,
    left: f64,
    band_top: f64,
    extents: &HashMap<NodeId, f64>,
    result: &mut LayoutResult,
) {
    let Some(node) = doc.get(id) else { return };
    let extent = extents[&id];
    let top = band_top + (extent - node.size.height) / 2.0;
    result.set(id, Point::new(left, top));

    let child_left = left + node.size.width + config.horizontal_spacing;
    let mut cursor = band_top;
    for &child in visible_children(doc, id) {
        place(doc, config, child, child_left, cursor, extents, result);
        cursor += extents[&child] + config.vertical_spacing;
    }
}

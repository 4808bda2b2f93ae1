//! Radial tree layout: angular sectors around a fixed center.
//!
//! The root sits at the center; each subtree is allotted an angular sector
//! `[start, end)` which is split among its children, either evenly or
//! weighted by subtree leaf count. A node sits at `base + depth * step` from
//! the center, at the middle of its sector.

use super::{LayoutConfig, LayoutResult, visible_children};
use crate::document::MapDocument;
use crate::node::NodeId;
use kurbo::{Point, Vec2};
use std::f64::consts::TAU;

pub(super) fn layout(doc: &MapDocument, config: &LayoutConfig, center: Point) -> LayoutResult {
    let mut result = LayoutResult::default();
    let Some(root) = doc.root() else {
        return result;
    };

    set_center(doc, root, center, &mut result);
    spread(doc, config, root, center, 1, 0.0, TAU, &mut result);
    result
}

/// Recursively allot the sector `[start, end)` to the children of `id`.
fn spread(
    doc: &MapDocument,
    config: &LayoutConfig,
    id: NodeId,
    center: Point,
    depth: usize,
    start: f64,
    end: f64,
    result: &mut LayoutResult,
) {
    let children = visible_children(doc, id);
    if children.is_empty() {
        return;
    }

    let total: f64 = if config.weighted_sectors {
        children.iter().map(|&c| leaf_count(doc, c) as f64).sum()
    } else {
        children.len() as f64
    };
    let span = end - start;
    let radius = config.radial_base_radius + (depth - 1) as f64 * config.radial_radius_step;

    let mut cursor = start;
    for &child in children {
        let share = if config.weighted_sectors {
            leaf_count(doc, child) as f64 / total
        } else {
            1.0 / total
        };
        let child_span = span * share;
        let angle = cursor + child_span / 2.0;

        let pos = center + Vec2::new(radius * angle.cos(), radius * angle.sin());
        set_center(doc, child, pos, result);

        spread(doc, config, child, center, depth + 1, cursor, cursor + child_span, result);
        cursor += child_span;
    }
}

/// Visible leaves under `id`, counting `id` itself when it has none.
fn leaf_count(doc: &MapDocument, id: NodeId) -> usize {
    let children = visible_children(doc, id);
    if children.is_empty() {
        1
    } else {
        children.iter().map(|&c| leaf_count(doc, c)).sum()
    }
}

/// Record a node position given its desired center.
fn set_center(doc: &MapDocument, id: NodeId, center: Point, result: &mut LayoutResult) {
    if let Some(node) = doc.get(id) {
        result.set(
            id,
            Point::new(
                center.x - node.size.width / 2.0,
                center.y - node.size.height / 2.0,
            ),
        );
    }
}

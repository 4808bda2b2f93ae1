//! Layout algorithms that position every visible node of a document.
//!
//! Both algorithms share one contract: given a tree and a spacing
//! configuration, return a top-left position for every non-collapsed node.
//! They never mutate the document, and running them twice on an unchanged
//! tree yields identical positions.

mod horizontal;
mod radial;

use crate::document::MapDocument;
use crate::node::NodeId;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which layout algorithm positions the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Children grow rightward from their parent, stacked vertically.
    #[default]
    Horizontal,
    /// Children fan out on circles around the root.
    Radial,
}

/// Spacing configuration shared by both algorithms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Gap between a parent's right edge and its children's left edges.
    pub horizontal_spacing: f64,
    /// Gap between adjacent sibling subtrees.
    pub vertical_spacing: f64,
    /// Radius of the first ring in radial mode.
    pub radial_base_radius: f64,
    /// Radius added per depth level in radial mode.
    pub radial_radius_step: f64,
    /// When true, radial sectors are split proportionally to subtree size
    /// instead of evenly among children.
    pub weighted_sectors: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 60.0,
            vertical_spacing: 24.0,
            radial_base_radius: 180.0,
            radial_radius_step: 140.0,
            weighted_sectors: true,
        }
    }
}

/// Computed positions: top-left corner per visible node. Collapsed subtrees
/// have no entry.
#[derive(Debug, Clone, Default)]
pub struct LayoutResult {
    positions: HashMap<NodeId, Point>,
}

impl LayoutResult {
    pub(crate) fn set(&mut self, id: NodeId, position: Point) {
        self.positions.insert(id, position);
    }

    /// Position of a node, if it is visible.
    pub fn get(&self, id: NodeId) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    /// Number of positioned nodes.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when nothing was positioned.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterate over `(id, position)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Point)> + '_ {
        self.positions.iter().map(|(&id, &p)| (id, p))
    }

    /// Union of all positioned node rectangles.
    pub fn bounds(&self, doc: &MapDocument) -> Option<Rect> {
        let mut result: Option<Rect> = None;
        for (id, position) in self.iter() {
            let Some(node) = doc.get(id) else { continue };
            let rect = Rect::from_origin_size(position, node.size);
            result = Some(match result {
                Some(r) => r.union(rect),
                None => rect,
            });
        }
        result
    }
}

/// Position every visible node of `doc`.
///
/// `anchor` is the world position of the root node's center; an empty
/// document yields an empty result.
pub fn compute_layout(
    doc: &MapDocument,
    mode: LayoutMode,
    config: &LayoutConfig,
    anchor: Point,
) -> LayoutResult {
    match mode {
        LayoutMode::Horizontal => horizontal::layout(doc, config, anchor),
        LayoutMode::Radial => radial::layout(doc, config, anchor),
    }
}

/// Children of `id` that take part in layout (none when `id` is collapsed).
pub(crate) fn visible_children(doc: &MapDocument, id: NodeId) -> &[NodeId] {
    if doc.get(id).is_some_and(|n| n.collapsed) {
        &[]
    } else {
        doc.children(id)
    }
}

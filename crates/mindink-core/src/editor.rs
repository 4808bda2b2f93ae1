//! Editor runtime: the only component that mutates the tree.
//!
//! Wraps the document together with the viewport, layout cache, drag
//! controller, selection, and history. Every structural mutation runs to
//! completion, triggers a layout pass, and records a history snapshot.
//! Invalid references are silent no-ops; structural violations (cycle-forming
//! moves, deleting the root) are rejected before anything is applied.

use crate::document::MapDocument;
use crate::drag::{DragController, DragUpdate, Placement};
use crate::history::{History, Snapshot};
use crate::layout::{LayoutConfig, LayoutMode, LayoutResult, compute_layout};
use crate::node::{Node, NodeId, NodePatch, SIZE_EPSILON};
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Size};

/// The mind-map editing engine.
#[derive(Debug, Clone)]
pub struct Editor {
    document: MapDocument,
    viewport: Viewport,
    screen_size: Size,
    layout_mode: LayoutMode,
    layout_config: LayoutConfig,
    layout: LayoutResult,
    drag: DragController,
    selection: Vec<NodeId>,
    history: History,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Create an editor over an empty document.
    pub fn new() -> Self {
        Self::with_document(MapDocument::new())
    }

    /// Create an editor over an existing document.
    pub fn with_document(document: MapDocument) -> Self {
        let (nodes, root) = document.state();
        let mut editor = Self {
            document,
            viewport: Viewport::new(),
            screen_size: Size::new(1280.0, 800.0),
            layout_mode: LayoutMode::default(),
            layout_config: LayoutConfig::default(),
            layout: LayoutResult::default(),
            drag: DragController::new(),
            selection: Vec::new(),
            history: History::new(Snapshot { nodes, root }),
        };
        editor.relayout();
        editor
    }

    // -- accessors ---------------------------------------------------------

    pub fn document(&self) -> &MapDocument {
        &self.document
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.layout_mode
    }

    /// Switch layout algorithm and reposition the tree.
    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        if self.layout_mode != mode {
            self.layout_mode = mode;
            self.relayout();
        }
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout_config
    }

    pub fn set_layout_config(&mut self, config: LayoutConfig) {
        self.layout_config = config;
        self.relayout();
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Report the screen size used to bound drag candidate search.
    pub fn set_screen_size(&mut self, width: f64, height: f64) {
        self.screen_size = Size::new(width, height);
    }

    // -- mutations ---------------------------------------------------------

    /// Create a node under `parent`, inserted at the end of the parent's
    /// child order or immediately after `after_sibling` when given.
    ///
    /// With `parent = None` the node becomes the root, but only when no root
    /// exists yet. Returns `None` (without mutating) for invalid references.
    pub fn create_node(
        &mut self,
        parent: Option<NodeId>,
        label: impl Into<String>,
        after_sibling: Option<NodeId>,
    ) -> Option<NodeId> {
        match parent {
            None if self.document.root().is_some() => return None,
            Some(p) if !self.document.contains(p) => return None,
            _ => {}
        }

        let node = Node::new(parent, label);
        let id = node.id;
        self.document.insert(node, after_sibling);
        self.relayout();
        self.commit();
        Some(id)
    }

    /// Delete a node and its entire subtree, pruning selection references.
    /// Deleting the root (or an unknown id) is a no-op.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        if !self.document.contains(id) || self.document.root() == Some(id) {
            return false;
        }
        let removed = self.document.remove_subtree(id);
        self.selection.retain(|s| !removed.contains(s));
        if self.drag.dragged_node().is_some_and(|d| removed.contains(&d)) {
            self.drag.cancel();
        }
        self.relayout();
        self.commit();
        true
    }

    /// Move a node relative to `target`.
    ///
    /// Rejected without any change when the move would form a cycle (target
    /// is the node itself or one of its descendants), when either id is
    /// unknown, when the node is the root, or when `Before`/`After` is asked
    /// of the root (which has no siblings).
    pub fn move_node(&mut self, id: NodeId, target: NodeId, placement: Placement) -> bool {
        if !self.document.contains(id) || !self.document.contains(target) {
            return false;
        }
        if self.document.root() == Some(id) {
            return false;
        }
        if target == id || self.document.descendants(id).contains(&target) {
            log::debug!("rejected move of {id}: {target} is inside its subtree");
            return false;
        }

        match placement {
            Placement::Child => {
                self.document.detach(id);
                if let Some(node) = self.document.get_mut(id) {
                    node.parent = Some(target);
                    node.metadata.touch();
                }
                if let Some(target_node) = self.document.get_mut(target) {
                    target_node.children.push(id);
                }
            }
            Placement::Before | Placement::After => {
                let Some(new_parent) = self.document.get(target).and_then(|n| n.parent) else {
                    return false;
                };
                // Detach first so an in-place reorder splices rather than
                // duplicates.
                self.document.detach(id);
                if let Some(node) = self.document.get_mut(id) {
                    node.parent = Some(new_parent);
                    node.metadata.touch();
                }
                if let Some(parent_node) = self.document.get_mut(new_parent) {
                    let anchor = parent_node
                        .children
                        .iter()
                        .position(|&c| c == target)
                        .unwrap_or(parent_node.children.len());
                    let index = match placement {
                        Placement::Before => anchor,
                        _ => anchor + 1,
                    };
                    parent_node.children.insert(index.min(parent_node.children.len()), id);
                }
            }
        }

        self.relayout();
        self.commit();
        true
    }

    /// Shallow-merge label/size/collapsed changes.
    ///
    /// Label changes record history; size changes below [`SIZE_EPSILON`] are
    /// ignored so remeasurement noise never churns the layout.
    pub fn update_node(&mut self, id: NodeId, patch: NodePatch) -> bool {
        let Some(node) = self.document.get_mut(id) else {
            return false;
        };

        let mut relabeled = false;
        let mut needs_layout = false;

        if let Some(label) = patch.label {
            if label != node.label {
                node.label = label;
                relabeled = true;
            }
        }
        if let Some(size) = patch.size {
            let material = (size.width - node.size.width).abs() > SIZE_EPSILON
                || (size.height - node.size.height).abs() > SIZE_EPSILON;
            if material {
                node.size = size;
                needs_layout = true;
            }
        }
        if let Some(collapsed) = patch.collapsed {
            if collapsed != node.collapsed {
                node.collapsed = collapsed;
                needs_layout = true;
            }
        }

        if relabeled || needs_layout {
            node.metadata.touch();
        }
        if needs_layout {
            self.relayout();
        }
        if relabeled {
            self.commit();
        }
        true
    }

    /// Collapse or expand a subtree.
    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) -> bool {
        self.update_node(id, NodePatch::collapsed(collapsed))
    }

    // -- history -----------------------------------------------------------

    /// Restore the previous snapshot. No-op at the oldest retained state.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        let (nodes, root) = (snapshot.nodes.clone(), snapshot.root);
        self.restore(nodes, root);
        true
    }

    /// Restore the next snapshot. No-op at the newest state.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        let (nodes, root) = (snapshot.nodes.clone(), snapshot.root);
        self.restore(nodes, root);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore(&mut self, nodes: std::collections::HashMap<NodeId, Node>, root: Option<NodeId>) {
        self.document.restore(nodes, root);
        self.selection.retain(|&s| self.document.contains(s));
        self.drag.cancel();
        self.relayout();
    }

    fn commit(&mut self) {
        let (nodes, root) = self.document.state();
        self.history.record(Snapshot { nodes, root });
    }

    // -- selection ---------------------------------------------------------

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    /// Select a single node (clears the previous selection).
    pub fn select(&mut self, id: NodeId) {
        if self.document.contains(id) {
            self.selection.clear();
            self.selection.push(id);
        }
    }

    pub fn add_to_selection(&mut self, id: NodeId) {
        if self.document.contains(id) && !self.selection.contains(&id) {
            self.selection.push(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.contains(&id)
    }

    // -- pointer interaction ----------------------------------------------

    /// Pointer press from the view adapter, in screen coordinates. Selects
    /// and starts dragging the hit node; grabbing the root pans instead.
    pub fn pointer_down(&mut self, screen: Point) -> Option<NodeId> {
        let hit = self.drag.begin(&self.document, &self.viewport, screen)?;
        self.select(hit);
        Some(hit)
    }

    /// Pointer move while pressed. Reclassifies the drop intent, or pans the
    /// viewport when the root is grabbed.
    pub fn pointer_move(&mut self, screen: Point) {
        let update = self.drag.update(
            &self.document,
            self.layout_mode,
            &self.viewport,
            self.screen_size,
            screen,
        );
        if let DragUpdate::Pan(delta) = update {
            self.viewport.pan(delta);
        }
    }

    /// Pointer release. Commits the last classified drop intent as a single
    /// mutation, or does nothing when no valid target was under the pointer.
    pub fn pointer_up(&mut self) -> bool {
        match self.drag.finish() {
            Some((node, intent)) => self.move_node(node, intent.target, intent.placement),
            None => false,
        }
    }

    /// Abandon an in-progress drag.
    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Rectangle the dragged node would land in, for ghost rendering.
    pub fn ghost_rect(&self) -> Option<Rect> {
        self.drag.ghost_rect(&self.document, &self.layout_config)
    }

    // -- layout ------------------------------------------------------------

    /// Pan/zoom so the whole tree is visible.
    pub fn fit_to_content(&mut self) {
        if let Some(bounds) = self.layout.bounds(&self.document) {
            self.viewport.fit_to_bounds(bounds, self.screen_size, 50.0);
        }
    }

    /// Recompute positions for the whole tree and write them back to the
    /// nodes. The root's existing position is held fixed so a local edit
    /// never makes the diagram jump.
    fn relayout(&mut self) {
        let anchor = self
            .document
            .root()
            .and_then(|root| self.document.get(root))
            .map(|n| n.center())
            .unwrap_or(Point::ZERO);

        self.layout = compute_layout(&self.document, self.layout_mode, &self.layout_config, anchor);
        let positions: Vec<_> = self.layout.iter().collect();
        for (id, position) in positions {
            if let Some(node) = self.document.get_mut(id) {
                node.position = position;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concrete_scenario() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();

        let a = editor.create_node(Some(r), "A", None).unwrap();
        assert_eq!(editor.document().children(r), &[a]);

        let b = editor.create_node(Some(r), "B", None).unwrap();
        assert_eq!(editor.document().children(r), &[a, b]);

        assert!(editor.move_node(a, b, Placement::After));
        assert_eq!(editor.document().children(r), &[b, a]);

        assert!(editor.delete_node(b));
        assert_eq!(editor.document().children(r), &[a]);
        assert!(editor.document().get(b).is_none());

        // Walk back through move, create B, create A, create R.
        assert!(editor.undo());
        assert_eq!(editor.document().children(r), &[b, a]);
        assert!(editor.undo());
        assert_eq!(editor.document().children(r), &[a, b]);
        assert!(editor.undo());
        assert_eq!(editor.document().children(r), &[a]);
        assert!(editor.undo());
        assert_eq!(editor.document().children(r), &[] as &[NodeId]);
        assert_eq!(editor.document().len(), 1);
    }

    #[test]
    fn test_reparent_onto_descendant_rejected() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        let a = editor.create_node(Some(r), "A", None).unwrap();
        let a1 = editor.create_node(Some(a), "A1", None).unwrap();

        assert!(!editor.move_node(a, a1, Placement::Child));
        assert!(!editor.move_node(a, a, Placement::Child));

        // Tree unchanged after the rejected calls.
        assert_eq!(editor.document().children(r), &[a]);
        assert_eq!(editor.document().children(a), &[a1]);
        assert_eq!(editor.document().get(a).unwrap().parent, Some(r));
        assert!(editor.document().is_consistent());
    }

    #[test]
    fn test_consistency_after_every_mutation() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        let a = editor.create_node(Some(r), "A", None).unwrap();
        let b = editor.create_node(Some(r), "B", None).unwrap();
        let c = editor.create_node(Some(b), "C", Some(a)).unwrap();
        assert!(editor.document().is_consistent());

        assert!(editor.move_node(c, a, Placement::Child));
        assert!(editor.document().is_consistent());
        assert!(editor.move_node(c, b, Placement::Before));
        assert!(editor.document().is_consistent());
        assert_eq!(editor.document().children(r), &[a, c, b]);

        assert!(editor.delete_node(a));
        assert!(editor.document().is_consistent());
        assert!(editor.undo());
        assert!(editor.document().is_consistent());
    }

    #[test]
    fn test_single_root_enforced() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        assert!(editor.create_node(None, "Another root", None).is_none());
        assert_eq!(editor.document().root(), Some(r));
    }

    #[test]
    fn test_delete_root_is_noop() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        assert!(!editor.delete_node(r));
        assert_eq!(editor.document().len(), 1);
    }

    #[test]
    fn test_delete_prunes_selection() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        let a = editor.create_node(Some(r), "A", None).unwrap();
        let a1 = editor.create_node(Some(a), "A1", None).unwrap();

        editor.select(a);
        editor.add_to_selection(a1);
        assert!(editor.delete_node(a));
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_invalid_references_are_silent_noops() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        let ghost = uuid::Uuid::new_v4();

        assert!(editor.create_node(Some(ghost), "X", None).is_none());
        assert!(!editor.delete_node(ghost));
        assert!(!editor.move_node(ghost, r, Placement::Child));
        assert!(!editor.move_node(r, ghost, Placement::Child));
        assert!(!editor.update_node(ghost, NodePatch::label("Y")));
        assert_eq!(editor.document().len(), 1);
    }

    #[test]
    fn test_sibling_move_relative_to_root_rejected() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        let a = editor.create_node(Some(r), "A", None).unwrap();

        // The root has no siblings, so Before/After it is meaningless.
        assert!(!editor.move_node(a, r, Placement::Before));
        assert_eq!(editor.document().get(a).unwrap().parent, Some(r));
    }

    #[test]
    fn test_in_place_reorder_does_not_duplicate() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        let a = editor.create_node(Some(r), "A", None).unwrap();
        let b = editor.create_node(Some(r), "B", None).unwrap();
        let c = editor.create_node(Some(r), "C", None).unwrap();

        assert!(editor.move_node(a, c, Placement::After));
        assert_eq!(editor.document().children(r), &[b, c, a]);
        assert!(editor.document().is_consistent());
    }

    #[test]
    fn test_noop_move_keeps_positions() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        let a = editor.create_node(Some(r), "A", None).unwrap();
        let b = editor.create_node(Some(r), "B", None).unwrap();

        let before: Vec<(NodeId, Point)> = editor.layout().iter().collect();
        // Re-assert a's current place: sibling immediately before b.
        assert!(editor.move_node(a, b, Placement::Before));
        assert_eq!(editor.document().children(r), &[a, b]);

        for (id, pos) in before {
            let now = editor.layout().get(id).unwrap();
            assert!((now.x - pos.x).abs() < 1e-9);
            assert!((now.y - pos.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_relabel_participates_in_history() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        editor.update_node(r, NodePatch::label("Renamed"));

        assert_eq!(editor.document().get(r).unwrap().label, "Renamed");
        assert!(editor.undo());
        assert_eq!(editor.document().get(r).unwrap().label, "Root");
        assert!(editor.redo());
        assert_eq!(editor.document().get(r).unwrap().label, "Renamed");
    }

    #[test]
    fn test_subpixel_remeasure_ignored() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        let size = editor.document().get(r).unwrap().size;

        editor.update_node(r, NodePatch::size(Size::new(size.width + 0.1, size.height)));
        assert!((editor.document().get(r).unwrap().size.width - size.width).abs() < f64::EPSILON);

        editor.update_node(r, NodePatch::size(Size::new(size.width + 40.0, size.height)));
        assert!((editor.document().get(r).unwrap().size.width - size.width - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_mutation_truncates_redo() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        let a = editor.create_node(Some(r), "A", None).unwrap();
        editor.create_node(Some(r), "B", None).unwrap();

        editor.undo();
        assert!(editor.can_redo());
        editor.create_node(Some(a), "C", None).unwrap();
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_root_held_fixed_across_edits() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        editor.create_node(Some(r), "A", None).unwrap();
        let anchor = editor.document().get(r).unwrap().center();

        editor.create_node(Some(r), "B", None).unwrap();
        editor.create_node(Some(r), "C", None).unwrap();

        let after = editor.document().get(r).unwrap().center();
        assert!((after.x - anchor.x).abs() < 1e-9);
        assert!((after.y - anchor.y).abs() < 1e-9);
    }

    #[test]
    fn test_drag_to_reparent_end_to_end() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        let a = editor.create_node(Some(r), "A", None).unwrap();
        let b = editor.create_node(Some(r), "B", None).unwrap();

        let grab = editor.viewport().world_to_screen(editor.document().get(a).unwrap().center());
        assert_eq!(editor.pointer_down(grab), Some(a));
        assert!(editor.is_selected(a));

        let drop = editor.viewport().world_to_screen(editor.document().get(b).unwrap().center());
        editor.pointer_move(drop);
        assert!(editor.ghost_rect().is_some());

        assert!(editor.pointer_up());
        assert_eq!(editor.document().get(a).unwrap().parent, Some(b));
        assert_eq!(editor.document().children(b), &[a]);
    }

    #[test]
    fn test_release_without_target_mutates_nothing() {
        let mut editor = Editor::new();
        let r = editor.create_node(None, "Root", None).unwrap();
        let a = editor.create_node(Some(r), "A", None).unwrap();

        let grab = editor.viewport().world_to_screen(editor.document().get(a).unwrap().center());
        editor.pointer_down(grab);
        editor.pointer_move(Point::new(-9000.0, -9000.0));
        assert!(!editor.pointer_up());
        assert_eq!(editor.document().get(a).unwrap().parent, Some(r));
    }
}

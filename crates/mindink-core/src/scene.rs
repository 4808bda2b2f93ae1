//! Render output handed to the view adapter.
//!
//! The adapter owns the actual drawing (SVG, canvas, GPU); the engine only
//! exchanges positions, sizes, and connector paths with it. Everything here
//! is expressed in screen coordinates, already put through the viewport
//! transform.

use crate::editor::Editor;
use crate::geometry::connector_path;
use crate::node::NodeId;
use kurbo::{BezPath, Point, Rect};

/// One visible node, ready to draw.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: NodeId,
    /// Screen-space rectangle.
    pub rect: Rect,
    pub label: String,
    /// Depth in the tree; adapters commonly map this to a color ramp.
    pub depth: usize,
    pub selected: bool,
    pub collapsed: bool,
}

/// One parent-child connector, terminating at the node borders.
#[derive(Debug, Clone)]
pub struct SceneEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub path: BezPath,
}

/// A full frame description.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Visible nodes in draw order (parents before children).
    pub nodes: Vec<SceneNode>,
    /// One edge per visible non-root node.
    pub edges: Vec<SceneEdge>,
    /// Ghost placeholder for the in-flight drag, if any.
    pub ghost: Option<Rect>,
}

/// Build a frame from the editor's current state. Read-only; safe to call
/// every frame, including mid-drag.
pub fn build_scene(editor: &Editor) -> Scene {
    let doc = editor.document();
    let viewport = editor.viewport();
    let to_screen = |rect: Rect| -> Rect {
        let origin = viewport.world_to_screen(Point::new(rect.x0, rect.y0));
        Rect::from_origin_size(origin, rect.size() * viewport.zoom)
    };

    let mut scene = Scene::default();
    for id in doc.visible_ids() {
        let Some(node) = doc.get(id) else { continue };
        scene.nodes.push(SceneNode {
            id,
            rect: to_screen(node.bounds()),
            label: node.label.clone(),
            depth: doc.depth(id),
            selected: editor.is_selected(id),
            collapsed: node.collapsed,
        });
    }

    for (parent, child) in doc.visible_edges() {
        let (Some(from), Some(to)) = (doc.get(parent), doc.get(child)) else {
            continue;
        };
        scene.edges.push(SceneEdge {
            from: parent,
            to: child,
            path: connector_path(to_screen(from.bounds()), to_screen(to.bounds())),
        });
    }

    scene.ghost = editor.ghost_rect().map(to_screen);
    scene
}

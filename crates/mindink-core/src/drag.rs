//! Pointer-driven drag interaction: hit-zone classification, cycle
//! prevention, and drop-intent tracking.
//!
//! The controller never mutates the tree. While a drag is live it only
//! reclassifies the pointer against candidate targets; the committed
//! mutation happens once, on release, through the editor. Illegal targets
//! (the dragged node itself and its descendants, captured at drag start) are
//! excluded before any distance comparison, so no rejected-move error path
//! exists.

use crate::document::MapDocument;
use crate::geometry::rect_dist;
use crate::layout::{LayoutConfig, LayoutMode};
use crate::node::NodeId;
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where a dropped node attaches relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Sibling immediately before the target.
    Before,
    /// Sibling immediately after the target.
    After,
    /// Last child of the target.
    Child,
}

/// The classified, not-yet-committed outcome of a drag at the current
/// pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropIntent {
    pub target: NodeId,
    pub placement: Placement,
}

/// Tuning for drop-target classification.
///
/// The zone fractions are empirical UI tuning, not an invariant; they are
/// configurable rather than hard-coded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragConfig {
    /// Maximum pointer-to-target distance in world units (equal to screen
    /// pixels at zoom 1; the screen-space reach grows with the zoom).
    pub pick_radius: f64,
    /// Leading fraction of the target's primary axis mapped to `Before`.
    pub before_fraction: f64,
    /// Trailing fraction of the target's primary axis mapped to `After`.
    pub after_fraction: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            pick_radius: 100.0,
            before_fraction: 0.3,
            after_fraction: 0.3,
        }
    }
}

/// What a pointer-move produced while a gesture is live.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragUpdate {
    /// No gesture in progress.
    Idle,
    /// Root drag: the caller should pan its viewport by this screen delta.
    Pan(Vec2),
    /// Node drag: the freshly classified drop intent, if any.
    Intent(Option<DropIntent>),
}

/// Interaction state machine: `Idle -> Dragging -> Idle`.
///
/// Releasing outside any valid target simply returns to `Idle` with no
/// mutation; there is no distinct cancelled state.
#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    /// Dragging the root pans the view instead of moving the node.
    Panning { last_screen: Point },
    Dragging {
        node: NodeId,
        /// The node and its full descendant set, captured at drag start.
        excluded: HashSet<NodeId>,
        /// Parent at drag start, used to suppress no-op reparents.
        origin_parent: Option<NodeId>,
        /// Pointer offset from the node's top-left corner at grab time.
        grab_offset: Vec2,
        current_world: Point,
        intent: Option<DropIntent>,
    },
}

/// Drag controller fed with raw pointer events by the view adapter.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    pub config: DragConfig,
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a gesture at a screen point. Returns the grabbed node, if the
    /// pointer hit one. Grabbing the root starts a viewport pan.
    pub fn begin(
        &mut self,
        doc: &MapDocument,
        viewport: &Viewport,
        screen: Point,
    ) -> Option<NodeId> {
        let world = viewport.screen_to_world(screen);
        let hit = hit_test(doc, world)?;

        if doc.get(hit).is_some_and(|n| n.is_root()) {
            // Rerooting is not permitted; the whole tree stays fixed and the
            // user moves their view instead.
            self.state = DragState::Panning { last_screen: screen };
            return Some(hit);
        }

        let node = doc.get(hit)?;
        let mut excluded: HashSet<NodeId> = doc.descendants(hit).into_iter().collect();
        excluded.insert(hit);

        self.state = DragState::Dragging {
            node: hit,
            excluded,
            origin_parent: node.parent,
            grab_offset: world - node.position,
            current_world: world,
            intent: None,
        };
        Some(hit)
    }

    /// Process a pointer move. Cheap enough to run on every move callback;
    /// candidates outside the visible screen area are never distance-tested.
    pub fn update(
        &mut self,
        doc: &MapDocument,
        mode: LayoutMode,
        viewport: &Viewport,
        screen_size: Size,
        screen: Point,
    ) -> DragUpdate {
        match &mut self.state {
            DragState::Idle => DragUpdate::Idle,
            DragState::Panning { last_screen } => {
                let delta = screen - *last_screen;
                *last_screen = screen;
                DragUpdate::Pan(delta)
            }
            DragState::Dragging {
                excluded,
                origin_parent,
                current_world,
                intent,
                ..
            } => {
                let world = viewport.screen_to_world(screen);
                *current_world = world;

                let threshold = self.config.pick_radius;
                let cull = candidate_bounds(viewport, screen_size, threshold);
                let mut nearest: Option<(NodeId, Rect, f64)> = None;
                for id in doc.visible_ids() {
                    if excluded.contains(&id) {
                        continue;
                    }
                    let Some(node) = doc.get(id) else { continue };
                    let bounds = node.bounds();
                    if !cull.overlaps(bounds) {
                        continue;
                    }
                    let dist = rect_dist(bounds, world);
                    if dist <= threshold
                        && nearest.is_none_or(|(_, _, best)| dist < best)
                    {
                        nearest = Some((id, bounds, dist));
                    }
                }

                *intent = nearest.and_then(|(target, bounds, _)| {
                    let placement = classify_zone(&self.config, mode, bounds, world);
                    // Dropping as a child of the current parent would change
                    // nothing; offer no intent rather than a no-op move.
                    if placement == Placement::Child && Some(target) == *origin_parent {
                        return None;
                    }
                    Some(DropIntent { target, placement })
                });
                DragUpdate::Intent(*intent)
            }
        }
    }

    /// Finish the gesture. For a node drag this yields the dragged node and
    /// the *last classified* intent, which is authoritative: the pointer and
    /// preview must match what the user saw, so no re-computation happens on
    /// release.
    pub fn finish(&mut self) -> Option<(NodeId, DropIntent)> {
        let result = match &self.state {
            DragState::Dragging {
                node,
                intent: Some(intent),
                ..
            } => Some((*node, *intent)),
            _ => None,
        };
        self.state = DragState::Idle;
        result
    }

    /// Abandon the gesture. No cleanup beyond clearing ephemeral state.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// True while a node (not the view) is being dragged.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The node being dragged, if any.
    pub fn dragged_node(&self) -> Option<NodeId> {
        match &self.state {
            DragState::Dragging { node, .. } => Some(*node),
            _ => None,
        }
    }

    /// The current drop intent, if the pointer is over a valid target.
    pub fn intent(&self) -> Option<DropIntent> {
        match &self.state {
            DragState::Dragging { intent, .. } => *intent,
            _ => None,
        }
    }

    /// Rectangle the dragged node would occupy if released now: next to the
    /// intended target when an intent exists, otherwise floating under the
    /// pointer. Visual-only; nothing is mutated until release.
    pub fn ghost_rect(&self, doc: &MapDocument, config: &LayoutConfig) -> Option<Rect> {
        let DragState::Dragging {
            node,
            grab_offset,
            current_world,
            intent,
            ..
        } = &self.state
        else {
            return None;
        };
        let size = doc.get(*node)?.size;

        if let Some(intent) = intent {
            let target = doc.get(intent.target)?.bounds();
            let origin = match intent.placement {
                Placement::Child => Point::new(
                    target.x1 + config.horizontal_spacing,
                    target.center().y - size.height / 2.0,
                ),
                Placement::Before => Point::new(
                    target.x0,
                    target.y0 - config.vertical_spacing - size.height,
                ),
                Placement::After => {
                    Point::new(target.x0, target.y1 + config.vertical_spacing)
                }
            };
            return Some(Rect::from_origin_size(origin, size));
        }

        Some(Rect::from_origin_size(*current_world - *grab_offset, size))
    }
}

/// Topmost visible node containing the world point. Later (deeper) nodes in
/// the pre-order walk win, matching front-to-back selection priority.
fn hit_test(doc: &MapDocument, world: Point) -> Option<NodeId> {
    doc.visible_ids()
        .into_iter()
        .rev()
        .find(|&id| doc.get(id).is_some_and(|n| n.bounds().contains(world)))
}

/// World-space rectangle of the screen, inflated by the pick threshold, used
/// to bound the candidate set for large trees.
fn candidate_bounds(viewport: &Viewport, screen_size: Size, threshold: f64) -> Rect {
    let top_left = viewport.screen_to_world(Point::ZERO);
    let bottom_right =
        viewport.screen_to_world(Point::new(screen_size.width, screen_size.height));
    Rect::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y).inflate(threshold, threshold)
}

/// Classify the pointer position inside the target's bounding box along the
/// layout's primary axis: leading zone reorders before, trailing zone after,
/// the middle reparents.
fn classify_zone(config: &DragConfig, mode: LayoutMode, bounds: Rect, world: Point) -> Placement {
    let fraction = match mode {
        LayoutMode::Horizontal => {
            ((world.y - bounds.y0) / bounds.height().max(f64::EPSILON)).clamp(0.0, 1.0)
        }
        LayoutMode::Radial => {
            ((world.x - bounds.x0) / bounds.width().max(f64::EPSILON)).clamp(0.0, 1.0)
        }
    };
    if fraction < config.before_fraction {
        Placement::Before
    } else if fraction > 1.0 - config.after_fraction {
        Placement::After
    } else {
        Placement::Child
    }
}

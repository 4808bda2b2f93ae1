//! Node definitions for the mind map.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for nodes.
pub type NodeId = Uuid;

/// Default width for newly created nodes.
pub const DEFAULT_NODE_WIDTH: f64 = 160.0;
/// Default height for newly created nodes.
pub const DEFAULT_NODE_HEIGHT: f64 = 48.0;

/// Size deltas below this are treated as remeasurement noise and ignored.
pub const SIZE_EPSILON: f64 = 0.5;

/// Creation/update timestamps in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub created_at: u64,
    pub updated_at: u64,
}

impl NodeMetadata {
    /// Create metadata stamped with the current time.
    pub fn now() -> Self {
        let now = current_millis();
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Stamp the update time with the current time.
    pub fn touch(&mut self) {
        self.updated_at = current_millis();
    }
}

fn current_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A single node in the mind-map tree.
///
/// `position` and `size` are layout output; structure is expressed only
/// through `parent` and `children`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Text content. Empty means "newly created, unnamed".
    pub label: String,
    /// Parent node, or `None` for the single root.
    pub parent: Option<NodeId>,
    /// Ordered child ids. Order determines vertical/angular placement.
    pub children: Vec<NodeId>,
    /// Top-left corner in world coordinates (computed by layout).
    pub position: Point,
    /// Node extent (default until measured content reports otherwise).
    pub size: Size,
    /// When true, descendants are excluded from layout and display.
    pub collapsed: bool,
    /// Creation/update timestamps.
    pub metadata: NodeMetadata,
}

impl Node {
    /// Create a new node under the given parent.
    pub fn new(parent: Option<NodeId>, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            parent,
            children: Vec::new(),
            position: Point::ZERO,
            size: Size::new(DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT),
            collapsed: false,
            metadata: NodeMetadata::now(),
        }
    }

    /// Bounding rectangle in world coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Center of the node in world coordinates.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// True if this node is the root.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Partial update applied by [`crate::editor::Editor::update_node`].
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct NodePatch {
    pub label: Option<String>,
    pub size: Option<Size>,
    pub collapsed: Option<bool>,
}

impl NodePatch {
    /// Patch that only changes the label.
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Patch that only changes the measured size.
    pub fn size(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    /// Patch that only changes the collapsed flag.
    pub fn collapsed(collapsed: bool) -> Self {
        Self {
            collapsed: Some(collapsed),
            ..Self::default()
        }
    }
}

/// Flat persisted form of a node.
///
/// Child order is not stored; it is rebuilt (and repaired) from the
/// `parent_id` fields on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub label: String,
    pub position: Point,
    pub size: Size,
    pub collapsed: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            parent_id: node.parent,
            label: node.label.clone(),
            position: node.position,
            size: node.size,
            collapsed: node.collapsed,
            created_at: node.metadata.created_at,
            updated_at: node.metadata.updated_at,
        }
    }
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        Self {
            id: record.id,
            label: record.label,
            parent: record.parent_id,
            children: Vec::new(),
            position: record.position,
            size: record.size,
            collapsed: record.collapsed,
            metadata: NodeMetadata {
                created_at: record.created_at,
                updated_at: record.updated_at,
            },
        }
    }
}

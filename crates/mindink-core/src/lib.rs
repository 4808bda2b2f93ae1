//! Mindink Core Library
//!
//! Backend-independent mind-map editing engine: the node/edge tree, the
//! horizontal and radial layout algorithms, the pointer-driven
//! reparent/reorder interaction, and snapshot-based undo/redo. Rendering and
//! persistence are external collaborators reached through the [`scene`] and
//! [`storage`] interfaces.

pub mod document;
pub mod drag;
pub mod editor;
pub mod geometry;
pub mod history;
pub mod layout;
pub mod node;
pub mod scene;
pub mod storage;
pub mod viewport;

pub use document::MapDocument;
pub use drag::{DragConfig, DragController, DropIntent, Placement};
pub use editor::Editor;
pub use history::{History, MAX_HISTORY, Snapshot};
pub use layout::{LayoutConfig, LayoutMode, LayoutResult, compute_layout};
pub use node::{Node, NodeId, NodePatch};
pub use scene::{Scene, SceneEdge, SceneNode, build_scene};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use viewport::Viewport;

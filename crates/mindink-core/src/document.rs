//! Mind-map document: the canonical node arena and its structural queries.
//!
//! All structural queries are pure reads. Structural writes are crate-private
//! and only reachable through [`crate::editor::Editor`], so tree invariants
//! (single root, parent/child-order agreement, acyclicity) are enforced in
//! one place.

use crate::node::{Node, NodeId, NodeRecord};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Flat persisted form: node records plus the root id. Child order and edges
/// are derived state and are rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedDocument {
    id: String,
    name: String,
    root_id: Option<NodeId>,
    nodes: Vec<NodeRecord>,
}

/// The mind-map tree.
#[derive(Debug, Clone)]
pub struct MapDocument {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    /// All nodes, keyed by id.
    nodes: HashMap<NodeId, Node>,
    /// The single root node, if the document is non-empty.
    root: Option<NodeId>,
}

impl Default for MapDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MapDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            nodes: HashMap::new(),
            root: None,
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the document has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root node id, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Get a node by id.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Check whether a node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Iterate over all nodes in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Ordered children of a node. Empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// All transitive descendants of a node, depth-first, excluding the node
    /// itself. Collapsed subtrees are included; this is the structural
    /// closure used to forbid illegal drops.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend_from_slice(self.children(next));
        }
        out
    }

    /// Chain of ancestors from the node's parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.nodes.get(&id).and_then(|n| n.parent);
        while let Some(parent) = cursor {
            out.push(parent);
            cursor = self.nodes.get(&parent).and_then(|n| n.parent);
        }
        out
    }

    /// Depth of a node; the root is at depth 0. Unknown ids report 0.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    /// Ids of nodes that take part in layout and display: the root and every
    /// node whose ancestors are all expanded. Order is a pre-order walk, so
    /// parents precede children.
    pub fn visible_ids(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(&id) {
                if !node.collapsed {
                    // Reverse so children pop in declared order.
                    stack.extend(node.children.iter().rev());
                }
            }
        }
        out
    }

    /// Derived edges `(parent, child)` for every visible non-root node.
    pub fn visible_edges(&self) -> Vec<(NodeId, NodeId)> {
        self.visible_ids()
            .into_iter()
            .filter_map(|id| {
                let parent = self.nodes.get(&id)?.parent?;
                Some((parent, id))
            })
            .collect()
    }

    /// Verify bidirectional parent/child-order consistency and the single
    /// root invariant. Intended for tests and debug assertions.
    pub fn is_consistent(&self) -> bool {
        let mut roots = 0;
        for node in self.nodes.values() {
            match node.parent {
                None => roots += 1,
                Some(parent) => {
                    let Some(parent_node) = self.nodes.get(&parent) else {
                        return false;
                    };
                    if parent_node.children.iter().filter(|&&c| c == node.id).count() != 1 {
                        return false;
                    }
                }
            }
            for &child in &node.children {
                match self.nodes.get(&child) {
                    Some(c) if c.parent == Some(node.id) => {}
                    _ => return false,
                }
            }
        }
        match self.root {
            None => roots == 0,
            Some(root) => {
                roots == 1 && self.nodes.get(&root).is_some_and(|n| n.parent.is_none())
            }
        }
    }

    // -- crate-private structural writes (used by the editor) --------------

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Insert a node and register it in its parent's child order, either at
    /// the end or immediately after `after_sibling` when present.
    pub(crate) fn insert(&mut self, node: Node, after_sibling: Option<NodeId>) {
        let id = node.id;
        let parent = node.parent;
        self.nodes.insert(id, node);

        match parent {
            None => self.root = Some(id),
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(&parent) {
                    let index = after_sibling
                        .and_then(|after| parent_node.children.iter().position(|&c| c == after))
                        .map(|i| i + 1)
                        .unwrap_or(parent_node.children.len());
                    parent_node.children.insert(index, id);
                }
            }
        }
    }

    /// Remove a node from its parent's child order without deleting it.
    pub(crate) fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|&c| c != id);
        }
    }

    /// Remove a node and its entire subtree. Returns the removed ids.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.nodes.contains_key(&id) {
            return Vec::new();
        }
        self.detach(id);
        let mut removed = self.descendants(id);
        removed.push(id);
        for gone in &removed {
            self.nodes.remove(gone);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        removed
    }

    /// Snapshot of the structural state, for history.
    pub(crate) fn state(&self) -> (HashMap<NodeId, Node>, Option<NodeId>) {
        (self.nodes.clone(), self.root)
    }

    /// Replace the structural state from a history snapshot.
    pub(crate) fn restore(&mut self, nodes: HashMap<NodeId, Node>, root: Option<NodeId>) {
        self.nodes = nodes;
        self.root = root;
    }

    // -- persistence -------------------------------------------------------

    /// Serialize to the flat JSON form: node records plus root id.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut records: Vec<NodeRecord> = Vec::with_capacity(self.nodes.len());
        // Pre-order so child order survives the round trip through the
        // record sequence.
        for id in self.walk_all() {
            if let Some(node) = self.nodes.get(&id) {
                records.push(NodeRecord::from(node));
            }
        }
        let persisted = PersistedDocument {
            id: self.id.clone(),
            name: self.name.clone(),
            root_id: self.root,
            nodes: records,
        };
        serde_json::to_string_pretty(&persisted)
    }

    /// Deserialize from the flat JSON form, rebuilding and repairing child
    /// order from the `parent_id` fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let persisted: PersistedDocument = serde_json::from_str(json)?;
        Ok(Self::from_records(
            persisted.id,
            persisted.name,
            persisted.root_id,
            persisted.nodes,
        ))
    }

    /// Rebuild a document from flat records. Records whose parent is missing
    /// and parent cycles unreachable from the root are reattached under the
    /// root; a missing or unknown root id falls back to the first parentless
    /// record.
    pub fn from_records(
        id: String,
        name: String,
        root_id: Option<NodeId>,
        records: Vec<NodeRecord>,
    ) -> Self {
        let order: Vec<NodeId> = records.iter().map(|r| r.id).collect();
        let mut nodes: HashMap<NodeId, Node> = records
            .into_iter()
            .map(|r| (r.id, Node::from(r)))
            .collect();

        let root = root_id
            .filter(|r| nodes.contains_key(r))
            .or_else(|| order.iter().copied().find(|id| {
                nodes.get(id).is_some_and(|n| n.parent.is_none())
            }));

        // Repair dangling parents and extra parentless nodes: everything that
        // is not the root must hang off an existing parent.
        if let Some(root) = root {
            for &id in &order {
                if id == root {
                    if nodes.get(&id).and_then(|n| n.parent).is_some() {
                        log::warn!("root node {id} had a parent; clearing it");
                        if let Some(n) = nodes.get_mut(&id) {
                            n.parent = None;
                        }
                    }
                    continue;
                }
                let parent = nodes.get(&id).and_then(|n| n.parent);
                let valid = parent.is_some_and(|p| nodes.contains_key(&p));
                if !valid {
                    log::warn!("node {id} has a missing parent; reattaching under root");
                    if let Some(n) = nodes.get_mut(&id) {
                        n.parent = Some(root);
                    }
                }
            }
        }

        // Rebuild child order from parent pointers, in record order.
        for &id in &order {
            let Some(parent) = nodes.get(&id).and_then(|n| n.parent) else {
                continue;
            };
            if let Some(parent_node) = nodes.get_mut(&parent) {
                if !parent_node.children.contains(&id) {
                    parent_node.children.push(id);
                }
            }
        }

        // Parent cycles among the records survive the passes above: every
        // node in the cycle has an existing parent, but none is reachable
        // from the root. Break each cycle by reattaching its first node (in
        // record order) under the root.
        if let Some(root) = root {
            let mut reachable = HashSet::new();
            mark_reachable(&nodes, root, &mut reachable);
            for &id in &order {
                if reachable.contains(&id) {
                    continue;
                }
                log::warn!("node {id} is unreachable from the root; reattaching under root");
                if let Some(parent) = nodes.get(&id).and_then(|n| n.parent) {
                    if let Some(parent_node) = nodes.get_mut(&parent) {
                        parent_node.children.retain(|&c| c != id);
                    }
                }
                if let Some(n) = nodes.get_mut(&id) {
                    n.parent = Some(root);
                }
                if let Some(root_node) = nodes.get_mut(&root) {
                    root_node.children.push(id);
                }
                // The rest of the former cycle now hangs off this node.
                mark_reachable(&nodes, id, &mut reachable);
            }
        }

        Self {
            id,
            name,
            nodes,
            root,
        }
    }

    /// Pre-order walk over every node, collapsed subtrees included.
    fn walk_all(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }
}

/// Add `from` and everything below it to `reachable`. Tolerates cycles in
/// the child lists; nodes already marked are not revisited.
fn mark_reachable(
    nodes: &HashMap<NodeId, Node>,
    from: NodeId,
    reachable: &mut HashSet<NodeId>,
) {
    let mut stack = vec![from];
    while let Some(id) = stack.pop() {
        if !reachable.insert(id) {
            continue;
        }
        if let Some(node) = nodes.get(&id) {
            stack.extend(node.children.iter().copied());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (MapDocument, NodeId, NodeId, NodeId, NodeId) {
        // root -> a -> a1
        //      -> b
        let mut doc = MapDocument::new();
        let root = Node::new(None, "Root");
        let root_id = root.id;
        doc.insert(root, None);

        let a = Node::new(Some(root_id), "A");
        let a_id = a.id;
        doc.insert(a, None);

        let b = Node::new(Some(root_id), "B");
        let b_id = b.id;
        doc.insert(b, None);

        let a1 = Node::new(Some(a_id), "A1");
        let a1_id = a1.id;
        doc.insert(a1, None);

        (doc, root_id, a_id, b_id, a1_id)
    }

    #[test]
    fn test_children_order_matches_insertion() {
        let (doc, root, a, b, _) = sample();
        assert_eq!(doc.children(root), &[a, b]);
    }

    #[test]
    fn test_insert_after_sibling() {
        let (mut doc, root, a, b, _) = sample();
        let c = Node::new(Some(root), "C");
        let c_id = c.id;
        doc.insert(c, Some(a));
        assert_eq!(doc.children(root), &[a, c_id, b]);
    }

    #[test]
    fn test_descendants_and_ancestors() {
        let (doc, root, a, b, a1) = sample();

        let mut desc = doc.descendants(root);
        desc.sort();
        let mut expected = vec![a, b, a1];
        expected.sort();
        assert_eq!(desc, expected);

        assert_eq!(doc.descendants(a), vec![a1]);
        assert_eq!(doc.ancestors(a1), vec![a, root]);
        assert_eq!(doc.depth(a1), 2);
        assert_eq!(doc.depth(root), 0);
    }

    #[test]
    fn test_remove_subtree_cascades() {
        let (mut doc, root, a, b, a1) = sample();
        let removed = doc.remove_subtree(a);

        assert_eq!(removed.len(), 2);
        assert!(removed.contains(&a));
        assert!(removed.contains(&a1));
        assert!(!doc.contains(a));
        assert!(!doc.contains(a1));
        assert_eq!(doc.children(root), &[b]);
        assert!(doc.is_consistent());
    }

    #[test]
    fn test_visible_ids_skips_collapsed_subtrees() {
        let (mut doc, root, a, b, a1) = sample();
        doc.get_mut(a).unwrap().collapsed = true;

        let visible = doc.visible_ids();
        assert_eq!(visible, vec![root, a, b]);
        assert!(!visible.contains(&a1));
    }

    #[test]
    fn test_visible_edges_one_per_nonroot() {
        let (doc, root, a, _, a1) = sample();
        let edges = doc.visible_edges();
        assert_eq!(edges.len(), 3);
        assert!(edges.contains(&(root, a)));
        assert!(edges.contains(&(a, a1)));
    }

    #[test]
    fn test_json_roundtrip_preserves_child_order() {
        let (doc, root, a, b, a1) = sample();
        let json = doc.to_json().unwrap();
        let loaded = MapDocument::from_json(&json).unwrap();

        assert_eq!(loaded.root(), Some(root));
        assert_eq!(loaded.children(root), &[a, b]);
        assert_eq!(loaded.children(a), &[a1]);
        assert!(loaded.is_consistent());
    }

    #[test]
    fn test_from_records_repairs_dangling_parent() {
        let (doc, root, a, _, _) = sample();
        let mut records: Vec<NodeRecord> = Vec::new();
        for id in [root, a] {
            records.push(NodeRecord::from(doc.get(id).unwrap()));
        }
        // Point `a` at a parent that no longer exists.
        records[1].parent_id = Some(Uuid::new_v4());

        let repaired =
            MapDocument::from_records("d".into(), "n".into(), Some(root), records);
        assert_eq!(repaired.get(a).unwrap().parent, Some(root));
        assert!(repaired.is_consistent());
    }

    #[test]
    fn test_from_records_reattaches_parent_cycle() {
        let root = Node::new(None, "Root");
        let root_id = root.id;
        // x and y arrive pointing at each other: a parent cycle detached
        // from the root.
        let mut x = Node::new(None, "X");
        let y = Node::new(Some(x.id), "Y");
        x.parent = Some(y.id);
        let (x_id, y_id) = (x.id, y.id);

        let records: Vec<NodeRecord> =
            [&root, &x, &y].into_iter().map(NodeRecord::from).collect();
        let loaded =
            MapDocument::from_records("d".into(), "n".into(), Some(root_id), records);

        assert!(loaded.is_consistent());
        // x (first in record order) is pulled under the root; y stays its
        // child, so the whole former cycle is reachable again.
        assert_eq!(loaded.get(x_id).unwrap().parent, Some(root_id));
        assert_eq!(loaded.get(y_id).unwrap().parent, Some(x_id));
        let desc = loaded.descendants(root_id);
        assert!(desc.contains(&x_id));
        assert!(desc.contains(&y_id));
        assert_eq!(loaded.visible_ids().len(), 3);
    }

    #[test]
    fn test_from_records_recovers_missing_root_id() {
        let (doc, root, a, b, a1) = sample();
        let records: Vec<NodeRecord> = [root, a, b, a1]
            .iter()
            .map(|&id| NodeRecord::from(doc.get(id).unwrap()))
            .collect();

        let loaded = MapDocument::from_records("d".into(), "n".into(), None, records);
        assert_eq!(loaded.root(), Some(root));
        assert!(loaded.is_consistent());
    }
}

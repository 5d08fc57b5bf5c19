//! Reply tree
//!
//! Replies are stored in an arena keyed by [`NodeId`]; parents and children
//! refer to each other by identifier. Depths are always derived from the
//! position in the tree, never taken from the wire. The thread itself is the
//! implicit root at depth 0, its direct replies are at depth 1.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::{debug, warn};

use crate::models::NodeId;
use crate::wire::CanonicalReply;

/// A node of the discussion: the thread itself or one of its replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    /// The thread root
    Thread,
    /// A reply
    Reply(&'a NodeId),
}

/// One comment or nested reply
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyNode {
    /// Reply identifier
    pub id: NodeId,
    /// Parent reply, `None` when the reply sits directly under the thread
    pub parent: Option<NodeId>,
    /// Username of the author
    pub author: String,
    /// Body text
    pub body: String,
    /// Creation timestamp, as sent by the server
    pub created_at: String,
    /// Vote tally from the server
    pub votes: i64,
    /// Child replies in source order
    pub children: Vec<NodeId>,
    /// Distance from the thread
    pub depth: usize,
}

/// Structural problems found while assembling a tree
///
/// None of these stop assembly; the offending record is dropped or moved under
/// the thread root and the rest of the tree is built as usual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A degraded record (the `position`th in flattened source order) was left out
    DegradedDropped {
        /// Position in the flattened source list
        position: usize,
    },
    /// A second record with an identifier that was already seen was left out
    DuplicateDropped {
        /// The repeated identifier
        id: NodeId,
    },
    /// The declared parent does not exist, the reply now sits under the thread
    OrphanReattached {
        /// The reply that was moved
        id: NodeId,
        /// The parent it declared
        parent: NodeId,
    },
    /// The reply was its own ancestor; its parent link was cut and it now sits
    /// under the thread
    CycleBroken {
        /// The reply that was moved
        id: NodeId,
        /// The parent link that closed the cycle
        parent: NodeId,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DegradedDropped { position } => {
                write!(f, "dropped malformed reply record #{}", position)
            }
            Diagnostic::DuplicateDropped { id } => write!(f, "dropped duplicate reply {}", id),
            Diagnostic::OrphanReattached { id, parent } => write!(
                f,
                "reply {} names unknown parent '{}', attached to thread",
                id, parent
            ),
            Diagnostic::CycleBroken { id, parent } => write!(
                f,
                "reply {} is its own ancestor via {}, attached to thread",
                id, parent
            ),
        }
    }
}

/// The canonical, depth-annotated reply tree of one thread
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplyTree {
    thread_id: NodeId,
    nodes: HashMap<NodeId, ReplyNode>,
    roots: Vec<NodeId>,
    diagnostics: Vec<Diagnostic>,
}

impl ReplyTree {
    /// A tree with no replies
    pub fn empty(thread_id: NodeId) -> Self {
        ReplyTree {
            thread_id,
            ..ReplyTree::default()
        }
    }

    /// Build the tree from normalized records
    ///
    /// Records may be flat (each naming its parent) or already nested; nested
    /// children always belong to their enclosing record whatever parent they
    /// declare. Sibling order is source order.
    pub fn assemble(thread_id: NodeId, records: Vec<CanonicalReply>) -> Self {
        let mut flat = Vec::new();
        flatten(records, None, &mut flat);

        let mut tree = ReplyTree::empty(thread_id);
        let mut order = Vec::with_capacity(flat.len());

        // Index pass
        for (position, record) in flat.into_iter().enumerate() {
            if record.degraded {
                tree.report(Diagnostic::DegradedDropped { position });
                continue;
            }
            if tree.nodes.contains_key(&record.id) {
                tree.report(Diagnostic::DuplicateDropped { id: record.id });
                continue;
            }

            order.push(record.id.clone());
            tree.nodes.insert(
                record.id.clone(),
                ReplyNode {
                    id: record.id,
                    parent: record.parent,
                    author: record.author,
                    body: record.body,
                    created_at: record.created_at,
                    votes: record.votes,
                    children: Vec::new(),
                    depth: 0,
                },
            );
        }

        // Link pass, in source order so children keep it
        for id in &order {
            let parent = tree.nodes.get(id).and_then(|node| node.parent.clone());
            match parent {
                None => tree.roots.push(id.clone()),
                Some(parent) if parent == *id => tree.detach(id, parent, true),
                Some(parent) => match tree.nodes.get_mut(&parent) {
                    Some(parent_node) => parent_node.children.push(id.clone()),
                    None => tree.detach(id, parent, false),
                },
            }
        }

        let mut visited = HashSet::with_capacity(order.len());
        let roots = tree.roots.clone();
        for root in &roots {
            tree.assign_depths(root, &mut visited);
        }

        // Whatever the walk from the root missed hangs off a cycle
        for id in &order {
            if visited.contains(id) {
                continue;
            }
            if let Some((member, parent)) = tree.find_cycle(id) {
                if let Some(parent_node) = tree.nodes.get_mut(&parent) {
                    parent_node.children.retain(|child| *child != member);
                }
                tree.detach(&member, parent, true);
                tree.assign_depths(&member, &mut visited);
            }
        }

        debug!(
            "assembled thread {} with {} replies ({} diagnostics)",
            tree.thread_id,
            tree.nodes.len(),
            tree.diagnostics.len()
        );

        tree
    }

    /// Identifier of the thread this tree belongs to
    pub fn thread_id(&self) -> &NodeId {
        &self.thread_id
    }

    /// Look up a reply
    pub fn get(&self, id: &NodeId) -> Option<&ReplyNode> {
        self.nodes.get(id)
    }

    /// True if the reply is part of the tree
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of replies in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the thread has no replies
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct replies to the thread, in source order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Direct children of a node. Unknown nodes have none
    pub fn children(&self, node: NodeRef<'_>) -> &[NodeId] {
        match node {
            NodeRef::Thread => &self.roots,
            NodeRef::Reply(id) => self
                .nodes
                .get(id)
                .map(|node| node.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Depth of a node, `None` if the reply is not in the tree
    pub fn depth(&self, node: NodeRef<'_>) -> Option<usize> {
        match node {
            NodeRef::Thread => Some(0),
            NodeRef::Reply(id) => self.nodes.get(id).map(|node| node.depth),
        }
    }

    /// Problems found during assembly
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// All replies, depth first, in display order
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: self.roots.iter().rev().collect(),
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("thread {}: {}", self.thread_id, diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Move a reply under the thread root
    fn detach(&mut self, id: &NodeId, parent: NodeId, cycle: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = None;
        }
        self.roots.push(id.clone());

        let id = id.clone();
        self.report(if cycle {
            Diagnostic::CycleBroken { id, parent }
        } else {
            Diagnostic::OrphanReattached { id, parent }
        });
    }

    fn assign_depths(&mut self, start: &NodeId, visited: &mut HashSet<NodeId>) {
        let depth = match self.nodes.get(start) {
            Some(node) => node.parent.as_ref().map_or(1, |parent| {
                self.nodes.get(parent).map_or(1, |parent| parent.depth + 1)
            }),
            None => return,
        };

        let mut stack = vec![(start.clone(), depth)];
        while let Some((id, depth)) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get_mut(&id) {
                node.depth = depth;
                stack.extend(node.children.iter().map(|child| (child.clone(), depth + 1)));
            }
        }
    }

    /// Follow parent links up from `start` until one repeats. Returns the node
    /// whose parent link closes the loop, together with that parent.
    fn find_cycle(&self, start: &NodeId) -> Option<(NodeId, NodeId)> {
        let mut seen = HashSet::new();
        let mut current = start.clone();

        loop {
            if !seen.insert(current.clone()) {
                let parent = self.nodes.get(&current)?.parent.clone()?;
                return Some((current, parent));
            }
            current = self.nodes.get(&current)?.parent.clone()?;
        }
    }
}

/// Depth-first iterator over the replies of a [`ReplyTree`]
pub struct Walk<'a> {
    tree: &'a ReplyTree,
    stack: Vec<&'a NodeId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a ReplyNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(node) = self.tree.nodes.get(id) {
                self.stack.extend(node.children.iter().rev());
                return Some(node);
            }
        }
        None
    }
}

fn flatten(records: Vec<CanonicalReply>, parent: Option<&NodeId>, out: &mut Vec<CanonicalReply>) {
    for mut record in records {
        if let Some(parent) = parent {
            record.parent = Some(parent.clone());
        }
        let children = std::mem::take(&mut record.children);
        let id = record.id.clone();
        out.push(record);
        flatten(children, Some(&id), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::normalize_replies;
    use serde_json::{json, Value};

    fn assemble(raw: Value) -> ReplyTree {
        ReplyTree::assemble(NodeId::from("t1"), normalize_replies(&raw))
    }

    fn depth_of(tree: &ReplyTree, id: &str) -> Option<usize> {
        tree.depth(NodeRef::Reply(&NodeId::from(id)))
    }

    fn assert_depth_invariant(tree: &ReplyTree) {
        for node in tree.walk() {
            let expected = match &node.parent {
                None => 1,
                Some(parent) => tree.get(parent).unwrap().depth + 1,
            };
            assert_eq!(node.depth, expected, "depth of {}", node.id);
        }
        assert_eq!(tree.walk().count(), tree.len(), "every reply is reachable");
    }

    #[test]
    fn test_flat_chain() {
        let tree = assemble(json!([
            { "id": 1, "parent_reply_id": null },
            { "id": 2, "parent_reply_id": 1 },
            { "id": 3, "parent_reply_id": 2 },
            { "id": 4, "parent_reply_id": 3 },
        ]));

        let depths: Vec<_> = tree.walk().map(|node| node.depth).collect();
        assert_eq!(depths, vec![1, 2, 3, 4]);
        assert!(tree.contains(&NodeId::from("4")));
        assert!(tree.diagnostics().is_empty());
        assert_depth_invariant(&tree);
    }

    #[test]
    fn test_thread_is_depth_zero() {
        let tree = assemble(json!([]));
        assert_eq!(tree.depth(NodeRef::Thread), Some(0));
        assert!(tree.is_empty());
        assert_eq!(depth_of(&tree, "nope"), None);
    }

    #[test]
    fn test_children_keep_source_order() {
        let tree = assemble(json!([
            { "id": "a" },
            { "id": "c", "parentId": "a", "upvotes": 1 },
            { "id": "b" },
            { "id": "d", "parentId": "a", "upvotes": 50 },
            { "id": "e", "parentId": "b" },
        ]));

        let order: Vec<_> = tree.walk().map(|node| node.id.as_str()).collect();
        assert_eq!(order, vec!["a", "c", "d", "b", "e"]);
        assert_eq!(tree.roots(), &[NodeId::from("a"), NodeId::from("b")][..]);
    }

    #[test]
    fn test_child_listed_before_parent() {
        let tree = assemble(json!([
            { "id": 2, "parent_reply_id": 1 },
            { "id": 1 },
        ]));

        assert_eq!(depth_of(&tree, "1"), Some(1));
        assert_eq!(depth_of(&tree, "2"), Some(2));
        assert!(tree.diagnostics().is_empty());
    }

    #[test]
    fn test_unknown_parent_attaches_to_thread() {
        let tree = assemble(json!([
            { "id": 1 },
            { "id": 2, "parent_reply_id": 99 },
        ]));

        assert_eq!(depth_of(&tree, "2"), Some(1));
        assert_eq!(tree.get(&NodeId::from("2")).unwrap().parent, None);
        assert_eq!(
            tree.diagnostics(),
            &[Diagnostic::OrphanReattached {
                id: NodeId::from("2"),
                parent: NodeId::from("99"),
            }][..]
        );
    }

    #[test]
    fn test_nested_input() {
        let tree = assemble(json!([
            {
                "id": 1,
                "replies": [
                    // declared parent is ignored, nesting wins
                    { "id": 2, "parentId": 77, "replies": [{ "id": 3 }] },
                    { "id": 4 },
                ],
            },
            { "id": 5 },
        ]));

        assert_eq!(depth_of(&tree, "1"), Some(1));
        assert_eq!(depth_of(&tree, "2"), Some(2));
        assert_eq!(depth_of(&tree, "3"), Some(3));
        assert_eq!(depth_of(&tree, "4"), Some(2));
        assert_eq!(depth_of(&tree, "5"), Some(1));
        assert!(tree.diagnostics().is_empty());
        assert_depth_invariant(&tree);
    }

    #[test]
    fn test_self_parent_is_broken() {
        let tree = assemble(json!([{ "id": 1, "parentId": 1 }]));

        assert_eq!(depth_of(&tree, "1"), Some(1));
        assert_eq!(
            tree.diagnostics(),
            &[Diagnostic::CycleBroken {
                id: NodeId::from("1"),
                parent: NodeId::from("1"),
            }][..]
        );
    }

    #[test]
    fn test_cycle_is_broken() {
        let tree = assemble(json!([
            { "id": "ok" },
            { "id": "x", "parentId": "z" },
            { "id": "y", "parentId": "x" },
            { "id": "z", "parentId": "y" },
            { "id": "w", "parentId": "y" },
        ]));

        assert_eq!(tree.len(), 5);
        assert_depth_invariant(&tree);
        assert_eq!(tree.roots().len(), 2);
        assert!(matches!(
            tree.diagnostics(),
            [Diagnostic::CycleBroken { .. }]
        ));
        let depths: Vec<_> = tree.walk().map(|node| node.depth).collect();
        assert!(depths.iter().all(|depth| *depth <= 4));
    }

    #[test]
    fn test_degraded_and_duplicate_records_are_dropped() {
        let tree = assemble(json!([
            { "id": 1 },
            "not a record",
            { "id": 1, "text": "again" },
            { "text": "no id", "replies": [{ "id": 2 }] },
        ]));

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(&NodeId::from("1")).unwrap().body, "");
        // the child of the dropped record survives under the thread
        assert_eq!(depth_of(&tree, "2"), Some(1));
        assert_eq!(
            tree.diagnostics(),
            &[
                Diagnostic::DegradedDropped { position: 1 },
                Diagnostic::DuplicateDropped { id: NodeId::from("1") },
                Diagnostic::DegradedDropped { position: 3 },
                Diagnostic::OrphanReattached {
                    id: NodeId::from("2"),
                    parent: NodeId::default(),
                },
            ][..]
        );
    }
}

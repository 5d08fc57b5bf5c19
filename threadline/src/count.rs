//! Reply counts
//!
//! Counts are derived from the shape of the tree every time it is rebuilt and
//! are never stored on the nodes, so they cannot drift from the tree.

use std::collections::HashMap;

use crate::models::NodeId;
use crate::tree::{NodeRef, ReplyTree};

/// Total number of descendants of a node: children, their children, and so on
pub fn count_replies(tree: &ReplyTree, node: NodeRef<'_>) -> usize {
    tree.children(node)
        .iter()
        .map(|child| 1 + count_replies(tree, NodeRef::Reply(child)))
        .sum()
}

/// Descendant counts for the thread and every reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyCounts {
    total: usize,
    per_node: HashMap<NodeId, usize>,
}

impl ReplyCounts {
    /// Number of comments in the whole thread
    pub fn total(&self) -> usize {
        self.total
    }

    /// Descendant count of a node. Unknown replies have none
    pub fn get(&self, node: NodeRef<'_>) -> usize {
        match node {
            NodeRef::Thread => self.total,
            NodeRef::Reply(id) => self.per_node.get(id).copied().unwrap_or(0),
        }
    }
}

/// Compute every count in one pass over the tree
pub fn reply_counts(tree: &ReplyTree) -> ReplyCounts {
    let mut per_node: HashMap<NodeId, usize> = HashMap::with_capacity(tree.len());

    // Reverse pre-order reaches every child before its parent
    let nodes: Vec<_> = tree.walk().collect();
    for node in nodes.iter().rev() {
        let count: usize = node
            .children
            .iter()
            .map(|child| 1 + per_node.get(child).copied().unwrap_or(0))
            .sum();
        per_node.insert(node.id.clone(), count);
    }

    let total: usize = tree
        .roots()
        .iter()
        .map(|root| 1 + per_node.get(root).copied().unwrap_or(0))
        .sum();

    ReplyCounts { total, per_node }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::normalize_replies;
    use serde_json::json;

    fn sample() -> ReplyTree {
        // 1
        // ├── 2
        // │   ├── 4
        // │   │   └── 6
        // │   └── 5
        // └── 3
        // 7
        ReplyTree::assemble(
            NodeId::from("t"),
            normalize_replies(&json!([
                { "id": 1 },
                { "id": 2, "parentId": 1 },
                { "id": 3, "parentId": 1 },
                { "id": 4, "parentId": 2 },
                { "id": 5, "parentId": 2 },
                { "id": 6, "parentId": 4 },
                { "id": 7 },
            ])),
        )
    }

    #[test]
    fn test_count_replies() {
        let tree = sample();
        let count = |id: &str| count_replies(&tree, NodeRef::Reply(&NodeId::from(id)));

        assert_eq!(count_replies(&tree, NodeRef::Thread), 7);
        assert_eq!(count("1"), 5);
        assert_eq!(count("2"), 3);
        assert_eq!(count("4"), 1);
        assert_eq!(count("3"), 0);
        assert_eq!(count("7"), 0);
        assert_eq!(count("missing"), 0);
    }

    #[test]
    fn test_count_is_sum_over_children() {
        let tree = sample();

        for node in tree.walk() {
            let expected: usize = node
                .children
                .iter()
                .map(|child| 1 + count_replies(&tree, NodeRef::Reply(child)))
                .sum();
            assert_eq!(count_replies(&tree, NodeRef::Reply(&node.id)), expected);
        }
    }

    #[test]
    fn test_reply_counts_match_recursive_counts() {
        let tree = sample();
        let counts = reply_counts(&tree);

        assert_eq!(counts.total(), 7);
        assert_eq!(counts.get(NodeRef::Thread), 7);
        for node in tree.walk() {
            assert_eq!(
                counts.get(NodeRef::Reply(&node.id)),
                count_replies(&tree, NodeRef::Reply(&node.id))
            );
        }
    }

    #[test]
    fn test_empty_tree() {
        let tree = ReplyTree::empty(NodeId::from("t"));
        assert_eq!(count_replies(&tree, NodeRef::Thread), 0);
        assert_eq!(reply_counts(&tree).total(), 0);
    }
}

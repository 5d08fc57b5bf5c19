use std::ops::Range;

use threadline::compose::Target;
use threadline::models::NodeId;
use threadline::Discussion;

use crate::util;

/// Rows taken by each node: a header and a body line
pub const NODE_HEIGHT: usize = 2;

/// Cursor and scroll position over a thread, thread first then replies in
/// display order
pub struct State {
    thread_id: NodeId,
    nodes: Vec<Target>,
    current_node: usize,
    row_offset: usize,
    col_offset: usize,
    status: Option<String>,
}

impl State {
    pub fn new(discussion: &Discussion) -> Self {
        State {
            thread_id: discussion.thread.id.clone(),
            nodes: nodes(discussion),
            current_node: 0,
            row_offset: 0,
            col_offset: 0,
            status: None,
        }
    }

    /// Take a freshly fetched thread, keeping the cursor on the same node
    /// when it is still there
    pub fn refresh(&mut self, discussion: &Discussion) {
        let current = self.current_target().clone();
        self.thread_id = discussion.thread.id.clone();
        self.nodes = nodes(discussion);
        self.current_node = self
            .nodes
            .iter()
            .position(|target| *target == current)
            .unwrap_or_else(|| self.current_node.min(self.nodes.len() - 1));
    }

    pub fn nodes(&self) -> &[Target] {
        &self.nodes
    }

    pub fn current_node_index(&self) -> usize {
        self.current_node
    }

    pub fn current_target(&self) -> &Target {
        &self.nodes[self.current_node]
    }

    /// Node that votes on the current row apply to
    pub fn current_vote_node(&self) -> &NodeId {
        match self.current_target() {
            Target::Thread => &self.thread_id,
            Target::Reply(id) => id,
        }
    }

    pub fn current_node_offset(&self) -> usize {
        self.current_node * NODE_HEIGHT
    }

    pub fn visible_range(&self, height: usize) -> Range<usize> {
        self.row_offset..self.row_offset + height
    }

    pub fn node_range(&self) -> Range<usize> {
        self.current_node_offset()..self.current_node_offset() + NODE_HEIGHT
    }

    pub fn max_score_digits(&self, discussion: &Discussion) -> usize {
        discussion
            .tree
            .walk()
            .map(|node| util::count_digits(node.votes))
            .chain(Some(util::count_digits(discussion.thread.votes)))
            .max()
            .unwrap_or(1)
    }

    pub fn row_offset_get_mut(&mut self) -> &mut usize {
        &mut self.row_offset
    }

    pub fn col_offset(&self) -> usize {
        self.col_offset
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status<S: Into<String>>(&mut self, status: S) {
        self.status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn next_node(&mut self) -> bool {
        if self.current_node < (self.nodes.len() - 1) {
            self.current_node += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_node(&mut self) -> bool {
        if let Some(index) = self.current_node.checked_sub(1) {
            self.current_node = index;
            true
        } else {
            false
        }
    }

    pub fn scroll_left(&mut self, amount: usize) -> bool {
        self.col_offset += amount;
        true
    }

    pub fn scroll_right(&mut self, amount: usize) -> bool {
        if let Some(new_offset) = self.col_offset.checked_sub(amount) {
            self.col_offset = new_offset;
            true
        } else {
            false
        }
    }
}

fn nodes(discussion: &Discussion) -> Vec<Target> {
    let mut nodes = vec![Target::Thread];
    nodes.extend(
        discussion
            .tree
            .walk()
            .map(|node| Target::Reply(node.id.clone())),
    );
    nodes
}

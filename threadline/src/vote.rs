//! Vote ledger
//!
//! Votes are kept on the client only. The server reports a tally per node but
//! has no endpoint that records who voted which way, so the ledger starts out
//! empty on every thread load and the tally shown is always the server's.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::debug;

use crate::error::Error;
use crate::identity::Identity;
use crate::models::NodeId;

/// Direction of a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vote {
    /// Upvote
    Up,
    /// Downvote
    Down,
}

/// Current vote of one identity on one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoteState {
    /// No vote
    #[default]
    None,
    /// Upvoted
    Up,
    /// Downvoted
    Down,
}

impl From<Vote> for VoteState {
    fn from(vote: Vote) -> Self {
        match vote {
            Vote::Up => VoteState::Up,
            Vote::Down => VoteState::Down,
        }
    }
}

/// Per (identity, node) vote record
#[derive(Debug, Clone, Default)]
pub struct VoteLedger {
    votes: HashMap<(Identity, NodeId), Vote>,
}

impl VoteLedger {
    /// An empty ledger
    pub fn new() -> Self {
        VoteLedger::default()
    }

    /// Vote on `node` in `direction`, or take the vote back if it was already
    /// cast in that direction. An opposite vote is replaced in the same step.
    ///
    /// Fails without touching the ledger when nobody is logged in.
    pub fn toggle_vote(
        &mut self,
        identity: Option<&Identity>,
        node: &NodeId,
        direction: Vote,
    ) -> Result<VoteState, Error> {
        let identity = identity.ok_or(Error::Unauthenticated)?;

        let state = match self.votes.entry((identity.clone(), node.clone())) {
            Entry::Occupied(entry) if *entry.get() == direction => {
                entry.remove();
                VoteState::None
            }
            Entry::Occupied(mut entry) => {
                entry.insert(direction);
                direction.into()
            }
            Entry::Vacant(entry) => {
                entry.insert(direction);
                direction.into()
            }
        };

        debug!("{} vote on {} is now {:?}", identity.username(), node, state);
        Ok(state)
    }

    /// Vote of `identity` on `node`
    pub fn state(&self, identity: Option<&Identity>, node: &NodeId) -> VoteState {
        identity
            .and_then(|identity| self.votes.get(&(identity.clone(), node.clone())))
            .map(|vote| VoteState::from(*vote))
            .unwrap_or_default()
    }

    /// Forget every vote
    pub fn clear(&mut self) {
        self.votes.clear();
    }

    /// Number of active votes
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    /// True if no votes are active
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}

//! A thread as one user sees it
//!
//! [`ThreadSession`] ties the pieces together: it fetches and rebuilds the
//! canonical tree, owns the vote ledger and the compose boxes, and runs
//! submissions end to end (pre-flight checks, the request itself bounded by a
//! timeout, and the re-fetch after a successful write).

use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::timeout;

use crate::api::DiscussionApi;
use crate::compose::{ComposeState, Rejection, Resolution, SubmissionController, Target};
use crate::config::DEFAULT_TIMEOUT;
use crate::count::{reply_counts, ReplyCounts};
use crate::error::{Error, SubmissionFailure};
use crate::identity::Identity;
use crate::models::{NodeId, Thread, ThreadPayload};
use crate::policy;
use crate::tree::ReplyTree;
use crate::vote::{Vote, VoteLedger, VoteState};
use crate::wire::{normalize_replies, normalize_thread};

/// Canonical state of a thread after normalization and assembly
#[derive(Debug, Clone, PartialEq)]
pub struct Discussion {
    /// The root post
    pub thread: Thread,
    /// All replies
    pub tree: ReplyTree,
    /// Descendant counts, derived from `tree`
    pub counts: ReplyCounts,
}

impl Discussion {
    /// Normalize and assemble a fetch-thread response
    pub fn from_payload(thread_id: &NodeId, payload: &ThreadPayload) -> Result<Self, Error> {
        let mut thread = payload
            .thread
            .as_ref()
            .and_then(normalize_thread)
            .ok_or(Error::MissingThread)?;
        if thread.id.is_empty() {
            thread.id = thread_id.clone();
        }

        let tree = ReplyTree::assemble(thread_id.clone(), normalize_replies(&payload.replies));
        let counts = reply_counts(&tree);

        Ok(Discussion {
            thread,
            tree,
            counts,
        })
    }
}

/// One user's view of one thread
pub struct ThreadSession<A> {
    api: A,
    thread_id: NodeId,
    identity: Option<Identity>,
    request_timeout: Duration,
    discussion: Option<Discussion>,
    stale: bool,
    votes: VoteLedger,
    composer: SubmissionController,
}

impl<A: DiscussionApi> ThreadSession<A> {
    /// A session for `thread_id`. Nothing is fetched until [`load`](Self::load)
    pub fn new(api: A, thread_id: NodeId, identity: Option<Identity>) -> Self {
        ThreadSession {
            api,
            composer: SubmissionController::new(thread_id.clone()),
            thread_id,
            identity,
            request_timeout: DEFAULT_TIMEOUT,
            discussion: None,
            stale: false,
            votes: VoteLedger::new(),
        }
    }

    /// Bound submissions by `request_timeout` instead of the default
    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Thread this session shows
    pub fn thread_id(&self) -> &NodeId {
        &self.thread_id
    }

    /// The acting identity
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Change the acting identity
    pub fn set_identity(&mut self, identity: Option<Identity>) {
        self.identity = identity;
    }

    /// Fetch the thread as if navigating to it: votes and drafts start empty
    pub async fn load(&mut self) -> Result<&Discussion, Error> {
        self.votes.clear();
        self.composer.leave();
        self.refresh().await
    }

    /// Fetch the thread again and rebuild the tree. Votes and drafts are kept
    pub async fn refresh(&mut self) -> Result<&Discussion, Error> {
        let payload = self.api.fetch_thread(&self.thread_id).await?;
        let discussion = Discussion::from_payload(&self.thread_id, &payload)?;
        info!(
            "thread {} has {} comments",
            self.thread_id,
            discussion.counts.total()
        );

        self.stale = false;
        Ok(&*self.discussion.insert(discussion))
    }

    /// The last fetched state, if any
    pub fn discussion(&self) -> Option<&Discussion> {
        self.discussion.as_ref()
    }

    /// True when a reply was stored but the thread could not be fetched again
    /// afterwards, so [`discussion`](Self::discussion) does not show it yet
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Can `target` receive a reply in the current tree?
    pub fn can_reply(&self, target: &Target) -> bool {
        match target {
            Target::Thread => true,
            Target::Reply(id) => self
                .discussion
                .as_ref()
                .and_then(|discussion| discussion.tree.get(id))
                .map_or(false, |node| policy::can_reply_at(node.depth)),
        }
    }

    /// Open a compose box
    pub fn open(&mut self, target: Target) -> Result<(), Error> {
        let empty;
        let tree = match &self.discussion {
            Some(discussion) => &discussion.tree,
            None => {
                empty = ReplyTree::empty(self.thread_id.clone());
                &empty
            }
        };
        self.composer.open(target, tree)
    }

    /// Replace the draft of an open compose box
    pub fn edit<S: Into<String>>(&mut self, target: &Target, text: S) -> Result<(), Error> {
        self.composer.edit(target, text)
    }

    /// Close a compose box, dropping its draft
    pub fn cancel(&mut self, target: &Target) {
        self.composer.cancel(target)
    }

    /// State of a compose box
    pub fn compose_state(&self, target: &Target) -> ComposeState {
        self.composer.state(target)
    }

    /// Draft of a compose box
    pub fn draft(&self, target: &Target) -> Option<&str> {
        self.composer.draft(target)
    }

    /// Why the last submit of a compose box was refused before sending
    pub fn rejection(&self, target: &Target) -> Option<&Rejection> {
        self.composer.rejection(target)
    }

    /// Send the draft of `target`
    ///
    /// Pre-flight failures are returned as errors and nothing is sent. Once
    /// the request has gone out the outcome is reported as a [`Resolution`];
    /// on success the thread has already been re-fetched when this returns.
    /// A failed re-fetch does not turn a stored reply into an error: the
    /// session is marked [stale](Self::is_stale) instead.
    pub async fn submit(&mut self, target: &Target) -> Result<Resolution, Error> {
        let empty;
        let tree = match &self.discussion {
            Some(discussion) => &discussion.tree,
            None => {
                empty = ReplyTree::empty(self.thread_id.clone());
                &empty
            }
        };
        let pending = self.composer.submit(target, self.identity.as_ref(), tree)?;

        let outcome = match timeout(self.request_timeout, self.api.post_reply(&pending.request)).await
        {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(SubmissionFailure::TimedOut(self.request_timeout)),
        };

        let resolution = self.composer.resolve(pending.ticket, outcome);
        if let Resolution::Refetch(_) = resolution {
            if let Err(err) = self.refresh().await {
                warn!(
                    "reply to {} was stored but thread {} could not be reloaded: {}",
                    target, self.thread_id, err
                );
                self.stale = true;
            }
        }
        debug!("submission to {} resolved as {:?}", target, resolution);

        Ok(resolution)
    }

    /// Toggle the acting identity's vote on the thread or a reply
    pub fn toggle_vote(&mut self, node: &NodeId, direction: Vote) -> Result<VoteState, Error> {
        self.votes
            .toggle_vote(self.identity.as_ref(), node, direction)
    }

    /// The acting identity's vote on a node
    pub fn vote_state(&self, node: &NodeId) -> VoteState {
        self.votes.state(self.identity.as_ref(), node)
    }

    /// Navigate away: drafts and in-flight submissions are dropped
    pub fn leave(&mut self) {
        self.composer.leave();
        self.stale = false;
        self.discussion = None;
    }
}

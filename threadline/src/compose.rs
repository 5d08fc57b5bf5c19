//! Composing and submitting comments and replies
//!
//! Every open compose box is a small state machine:
//!
//! ```text
//! Idle -> Editing -> Submitting -> Succeeded
//!            ^           |
//!            |           v
//!            +------- Failed
//! ```
//!
//! The controller never performs I/O. [`SubmissionController::submit`] hands
//! back the request to send together with a [`Ticket`], and the caller reports
//! the outcome with [`SubmissionController::resolve`]. A successful write is
//! never spliced into the tree locally; the caller re-fetches the thread so the
//! tree always reflects the server.
//!
//! Because the tree can be rebuilt while a draft is open, `submit` checks the
//! target against the tree it is given rather than the one the box was opened
//! on.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::error::{Error, SubmissionFailure};
use crate::identity::Identity;
use crate::models::{NewReply, NodeId};
use crate::policy;
use crate::tree::{NodeRef, ReplyTree};

/// What a compose box answers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A top-level comment on the thread
    Thread,
    /// A reply to an existing reply
    Reply(NodeId),
}

impl Target {
    /// The reply being answered, if any
    pub fn parent(&self) -> Option<&NodeId> {
        match self {
            Target::Thread => None,
            Target::Reply(id) => Some(id),
        }
    }

    /// The node this target answers
    pub fn node(&self) -> NodeRef<'_> {
        match self {
            Target::Thread => NodeRef::Thread,
            Target::Reply(id) => NodeRef::Reply(id),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Thread => f.write_str("the thread"),
            Target::Reply(id) => write!(f, "reply {}", id),
        }
    }
}

/// Identifies one submission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// State of one compose box
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeState {
    /// No box is open
    Idle,
    /// A draft is being written
    Editing,
    /// The draft was sent and the outcome is pending
    Submitting(Ticket),
    /// The server accepted the reply
    Succeeded,
    /// The server or the network refused the reply; the draft is kept
    Failed(SubmissionFailure),
}

/// Why `submit` did not send anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Nothing but whitespace was typed
    EmptyBody,
    /// Nobody is logged in
    Unauthenticated,
    /// The reply being answered is gone from the tree
    TargetMissing(NodeId),
    /// The reply being answered is too deep to receive replies
    DepthExceeded(usize),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Error::from(self.clone()))
    }
}

/// A request ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    /// Pass back to [`SubmissionController::resolve`] with the outcome
    pub ticket: Ticket,
    /// The box this came from
    pub target: Target,
    /// Body for the post-reply endpoint
    pub request: NewReply,
}

/// What the caller should do after [`SubmissionController::resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The reply was stored: re-fetch the thread
    Refetch(Target),
    /// The reply was refused; tell the user, the draft is still there
    Failed(Target, SubmissionFailure),
    /// The outcome belongs to a box that no longer exists
    Ignored,
}

#[derive(Debug)]
struct Composer {
    state: ComposeState,
    draft: String,
    depth: usize,
    rejection: Option<Rejection>,
}

/// Compose boxes of one thread view
#[derive(Debug)]
pub struct SubmissionController {
    thread_id: NodeId,
    composers: HashMap<Target, Composer>,
    next_ticket: u64,
}

impl SubmissionController {
    /// Controller for the thread `thread_id`
    pub fn new(thread_id: NodeId) -> Self {
        SubmissionController {
            thread_id,
            composers: HashMap::new(),
            next_ticket: 0,
        }
    }

    /// Thread the replies are posted to
    pub fn thread_id(&self) -> &NodeId {
        &self.thread_id
    }

    /// Open a compose box. Opening one that is already open does nothing.
    pub fn open(&mut self, target: Target, tree: &ReplyTree) -> Result<(), Error> {
        if let Some(composer) = self.composers.get(&target) {
            if !matches!(composer.state, ComposeState::Idle | ComposeState::Succeeded) {
                return Ok(());
            }
        }

        let depth = tree
            .depth(target.node())
            .ok_or_else(|| Error::TargetMissing(target.parent().cloned().unwrap_or_default()))?;
        policy::check_reply_at(depth)?;

        debug!("opening compose box for {} at depth {}", target, depth);
        self.composers.insert(
            target,
            Composer {
                state: ComposeState::Editing,
                draft: String::new(),
                depth,
                rejection: None,
            },
        );
        Ok(())
    }

    /// Replace the draft text
    pub fn edit<S: Into<String>>(&mut self, target: &Target, text: S) -> Result<(), Error> {
        let composer = self.editable(target)?;
        composer.draft = text.into();
        composer.state = ComposeState::Editing;
        composer.rejection = None;
        Ok(())
    }

    /// Close a compose box and discard its draft
    ///
    /// A submission still in flight for it will be ignored when it resolves.
    pub fn cancel(&mut self, target: &Target) {
        if self.composers.remove(target).is_some() {
            debug!("closed compose box for {}", target);
        }
    }

    /// Check the draft and, if it passes, move it to `Submitting`
    ///
    /// `tree` should be the freshest tree available; the target must still be
    /// part of it and still be allowed to receive replies. When a check fails
    /// the box keeps its state and draft, and the reason is available from
    /// [`rejection`](SubmissionController::rejection).
    pub fn submit(
        &mut self,
        target: &Target,
        identity: Option<&Identity>,
        tree: &ReplyTree,
    ) -> Result<PendingSubmission, Error> {
        let ticket = Ticket(self.next_ticket);
        let thread_id = self.thread_id.clone();
        let composer = self.editable(target)?;

        let checked = preflight(target, &composer.draft, identity, tree);
        let (username, depth) = match checked {
            Ok(checked) => checked,
            Err(rejection) => {
                debug!("not submitting to {}: {}", target, rejection);
                composer.rejection = Some(rejection.clone());
                return Err(rejection.into());
            }
        };

        composer.state = ComposeState::Submitting(ticket);
        composer.depth = depth;
        composer.rejection = None;
        let request = NewReply {
            text: composer.draft.clone(),
            username,
            thread_id,
            parent_reply_id: target.parent().cloned(),
        };

        self.next_ticket += 1;
        debug!("submitting to {} as {:?}", target, ticket);
        Ok(PendingSubmission {
            ticket,
            target: target.clone(),
            request,
        })
    }

    /// Record the outcome of a submission
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        outcome: Result<(), SubmissionFailure>,
    ) -> Resolution {
        let found = self
            .composers
            .iter_mut()
            .find(|(_, composer)| composer.state == ComposeState::Submitting(ticket));
        let (target, composer) = match found {
            Some(found) => found,
            None => {
                debug!("ignoring outcome of stale {:?}", ticket);
                return Resolution::Ignored;
            }
        };

        match outcome {
            Ok(()) => {
                debug!("{} accepted", target);
                composer.state = ComposeState::Succeeded;
                composer.draft.clear();
                Resolution::Refetch(target.clone())
            }
            Err(failure) => {
                debug!("{} failed: {}", target, failure);
                composer.state = ComposeState::Failed(failure.clone());
                Resolution::Failed(target.clone(), failure)
            }
        }
    }

    /// Drop every compose box, in flight or not. Used when the thread view goes away
    pub fn leave(&mut self) {
        self.composers.clear();
    }

    /// State of a compose box
    pub fn state(&self, target: &Target) -> ComposeState {
        self.composers
            .get(target)
            .map(|composer| composer.state.clone())
            .unwrap_or(ComposeState::Idle)
    }

    /// Draft text of an open box
    pub fn draft(&self, target: &Target) -> Option<&str> {
        self.composers
            .get(target)
            .map(|composer| composer.draft.as_str())
    }

    /// Why the last submit attempt of a box was refused
    pub fn rejection(&self, target: &Target) -> Option<&Rejection> {
        self.composers
            .get(target)
            .and_then(|composer| composer.rejection.as_ref())
    }

    /// Depth of the target when the box was opened or last submitted
    pub fn captured_depth(&self, target: &Target) -> Option<usize> {
        self.composers.get(target).map(|composer| composer.depth)
    }

    fn editable(&mut self, target: &Target) -> Result<&mut Composer, Error> {
        match self.composers.get_mut(target) {
            Some(composer)
                if matches!(
                    composer.state,
                    ComposeState::Editing | ComposeState::Failed(_)
                ) =>
            {
                Ok(composer)
            }
            _ => Err(Error::NotEditing(target.clone())),
        }
    }
}

fn preflight(
    target: &Target,
    draft: &str,
    identity: Option<&Identity>,
    tree: &ReplyTree,
) -> Result<(String, usize), Rejection> {
    if draft.trim().is_empty() {
        return Err(Rejection::EmptyBody);
    }
    let identity = identity.ok_or(Rejection::Unauthenticated)?;
    let depth = match target {
        Target::Thread => 0,
        Target::Reply(id) => tree
            .depth(NodeRef::Reply(id))
            .ok_or_else(|| Rejection::TargetMissing(id.clone()))?,
    };
    if !policy::can_reply_at(depth) {
        return Err(Rejection::DepthExceeded(depth));
    }
    Ok((identity.username().to_string(), depth))
}

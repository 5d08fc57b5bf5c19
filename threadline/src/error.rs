//! Errors

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::compose::{Rejection, Target};
use crate::models::NodeId;

/// The main error type of the library
#[derive(Debug, Error)]
pub enum Error {
    /// An error related to performing a HTTP request
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// An attempt to parse a string that was not a valid URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    /// An I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Stored data or a response body was not the JSON we expected
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// User home directory could not be determined
    #[error("unable to determine the home directory of the user")]
    HomeNotFound,
    /// The server answered a read with a non-success status
    #[error("server responded with status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },
    /// A thread response did not contain a thread record
    #[error("response did not contain a thread")]
    MissingThread,
    /// A vote or post was attempted without an identity
    #[error("you need to log in first")]
    Unauthenticated,
    /// A reply was attempted at or beyond the maximum nesting depth
    #[error("replies are not allowed below depth {depth}")]
    DepthExceeded {
        /// Depth of the node that was to receive the reply
        depth: usize,
    },
    /// The reply text was empty after trimming
    #[error("reply text is empty")]
    EmptyBody,
    /// The node a reply was aimed at is not in the current tree
    #[error("reply target {0} is no longer part of the thread")]
    TargetMissing(NodeId),
    /// There is no open draft for the compose target
    #[error("no draft is open for {0}")]
    NotEditing(Target),
    /// An identifier that cannot be used as a path segment, such as `..`
    #[error("invalid identifier: {0:?}")]
    InvalidId(String),
    /// A username was empty
    #[error("username must not be empty")]
    InvalidIdentity,
    /// Posting a reply failed
    #[error(transparent)]
    Submission(#[from] SubmissionFailure),
}

/// Why a submitted reply did not make it to the server
///
/// This is the only failure surfaced to the end user as actionable. The draft
/// is kept so the reply can be resubmitted by hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionFailure {
    /// The server answered with a non-success status
    #[error("server rejected the reply ({status}): {detail}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// The `detail` message of the error body, if any
        detail: String,
    },
    /// The request never produced a response
    #[error("network error: {0}")]
    Transport(String),
    /// No response arrived within the request timeout
    #[error("no response after {0:?}")]
    TimedOut(Duration),
}

impl From<Rejection> for Error {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::EmptyBody => Error::EmptyBody,
            Rejection::Unauthenticated => Error::Unauthenticated,
            Rejection::TargetMissing(id) => Error::TargetMissing(id),
            Rejection::DepthExceeded(depth) => Error::DepthExceeded { depth },
        }
    }
}

//! Reply depth policy

use crate::error::Error;

/// Deepest level that can still receive replies, exclusive. Replies to a node
/// at this depth would land one level below it.
pub const MAX_DEPTH: usize = 3;

/// May a node at `depth` receive a new reply?
///
/// The thread (depth 0) always can. Existing replies below the limit are still
/// shown; they just cannot be answered.
///
/// ```
/// use threadline::policy::can_reply_at;
///
/// assert!(can_reply_at(0));
/// assert!(can_reply_at(2));
/// assert!(!can_reply_at(3));
/// ```
pub fn can_reply_at(depth: usize) -> bool {
    depth < MAX_DEPTH
}

/// [`can_reply_at`] as a pre-flight check
pub fn check_reply_at(depth: usize) -> Result<(), Error> {
    if can_reply_at(depth) {
        Ok(())
    } else {
        Err(Error::DepthExceeded { depth })
    }
}

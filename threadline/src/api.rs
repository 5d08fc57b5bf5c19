//! The discussion backend as seen by a thread session

use futures::future::BoxFuture;

use crate::error::{Error, SubmissionFailure};
use crate::models::{NewReply, NodeId, ThreadPayload};

/// Operations the thread session needs from the backend
///
/// [`Client`](crate::Client) implements this over HTTP.
pub trait DiscussionApi {
    /// Fetch a thread together with all of its replies
    fn fetch_thread<'a>(&'a self, thread_id: &'a NodeId)
        -> BoxFuture<'a, Result<ThreadPayload, Error>>;

    /// Store a new comment or reply. Success carries no data; the new reply
    /// shows up when the thread is fetched again.
    fn post_reply<'a>(&'a self, reply: &'a NewReply)
        -> BoxFuture<'a, Result<(), SubmissionFailure>>;
}

impl<T: DiscussionApi + ?Sized> DiscussionApi for &T {
    fn fetch_thread<'a>(
        &'a self,
        thread_id: &'a NodeId,
    ) -> BoxFuture<'a, Result<ThreadPayload, Error>> {
        (**self).fetch_thread(thread_id)
    }

    fn post_reply<'a>(&'a self, reply: &'a NewReply) -> BoxFuture<'a, Result<(), SubmissionFailure>> {
        (**self).post_reply(reply)
    }
}

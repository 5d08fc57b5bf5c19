//! Wire normalizer
//!
//! The discussion backend has renamed its reply fields more than once
//! (`content`/`text`, `author`/`username`, `upvotes` versus `likes` and
//! `dislikes`, `createdAt`/`date`), and older records are still served in the
//! old shapes. Everything coming off the wire goes through the functions here
//! so the rest of the crate only ever sees [`CanonicalReply`] and [`Thread`].
//!
//! Normalization is total: a missing field gets its default, and a record that
//! cannot be used at all comes back marked [`degraded`](CanonicalReply::degraded)
//! instead of failing.

use log::warn;
use serde_json::{Map, Value};

use crate::models::{Container, ContainerKind, NodeId, Thread};

/// Author shown when a record names none
pub const UNKNOWN_AUTHOR: &str = "Unknown";
/// Timestamp shown when a record carries none
pub const JUST_NOW: &str = "Just now";

// Field resolution table. For every canonical field the source keys are tried
// in order and the first one present wins.
const ID: &[&str] = &["id"];
const PARENT: &[&str] = &[
    "parent_reply_id",
    "parentReplyId",
    "parent_id",
    "parentId",
    "parentCommentId",
];
const BODY: &[&str] = &["content", "text"];
const AUTHOR: &[&str] = &["author", "username"];
const CREATED_AT: &[&str] = &["createdAt", "created_at", "date"];
const CHILDREN: &[&str] = &["replies", "children"];
const TITLE: &[&str] = &["title"];
const CONTAINERS: &[(&str, ContainerKind)] = &[
    ("sceneId", ContainerKind::Scene),
    ("scene_id", ContainerKind::Scene),
    ("communityId", ContainerKind::Community),
    ("community_id", ContainerKind::Community),
    ("albumId", ContainerKind::Album),
    ("album_id", ContainerKind::Album),
];

/// A reply record in the one shape the tree assembler accepts
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalReply {
    /// Reply identifier. Empty when the record had none
    pub id: NodeId,
    /// Declared parent reply; `None` attaches to the thread root
    pub parent: Option<NodeId>,
    /// Username of the author
    pub author: String,
    /// Body text
    pub body: String,
    /// Creation timestamp, passed through as sent
    pub created_at: String,
    /// Signed vote tally
    pub votes: i64,
    /// Replies the server already nested under this one
    pub children: Vec<CanonicalReply>,
    /// Set when the source record was unusable and defaults were substituted
    pub degraded: bool,
}

impl CanonicalReply {
    fn degraded() -> Self {
        CanonicalReply {
            id: NodeId::default(),
            parent: None,
            author: UNKNOWN_AUTHOR.to_string(),
            body: String::new(),
            created_at: JUST_NOW.to_string(),
            votes: 0,
            children: Vec::new(),
            degraded: true,
        }
    }
}

/// Normalize one raw reply record
pub fn normalize_reply(raw: &Value) -> CanonicalReply {
    let record = match raw.as_object() {
        Some(record) => record,
        None => {
            warn!("reply record is not an object: {}", raw);
            return CanonicalReply::degraded();
        }
    };

    let id = first(record, ID).and_then(NodeId::from_json);
    if id.is_none() {
        warn!("reply record has no usable id");
    }

    CanonicalReply {
        degraded: id.is_none(),
        id: id.unwrap_or_default(),
        parent: first(record, PARENT).and_then(NodeId::from_json),
        author: text(record, AUTHOR).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        body: text(record, BODY).unwrap_or_default(),
        created_at: text(record, CREATED_AT).unwrap_or_else(|| JUST_NOW.to_string()),
        votes: vote_tally(record),
        children: first(record, CHILDREN)
            .map(normalize_replies)
            .unwrap_or_default(),
    }
}

/// Normalize a list of raw reply records. Anything but an array is an empty list
pub fn normalize_replies(raw: &Value) -> Vec<CanonicalReply> {
    raw.as_array()
        .map(|items| items.iter().map(normalize_reply).collect())
        .unwrap_or_default()
}

/// Normalize a raw thread record. Returns `None` when it is not an object
pub fn normalize_thread(raw: &Value) -> Option<Thread> {
    let record = raw.as_object()?;

    let container = CONTAINERS.iter().find_map(|(key, kind)| {
        record
            .get(*key)
            .and_then(NodeId::from_json)
            .map(|id| Container { kind: *kind, id })
    });

    Some(Thread {
        id: first(record, ID)
            .and_then(NodeId::from_json)
            .unwrap_or_default(),
        title: text(record, TITLE).unwrap_or_default(),
        body: text(record, BODY).unwrap_or_default(),
        author: text(record, AUTHOR).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        created_at: text(record, CREATED_AT).unwrap_or_else(|| JUST_NOW.to_string()),
        votes: vote_tally(record),
        container,
    })
}

/// `upvotes` when it is a number, otherwise `likes - dislikes`
fn vote_tally(record: &Map<String, Value>) -> i64 {
    match record.get("upvotes").and_then(integer) {
        Some(upvotes) => upvotes,
        None => {
            let likes = record.get("likes").and_then(integer).unwrap_or(0);
            let dislikes = record.get("dislikes").and_then(integer).unwrap_or(0);
            likes.saturating_sub(dislikes)
        }
    }
}

fn integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.trunc() as i64))
}

/// First key that is present and not `null`
fn first<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

/// First key holding a scalar, rendered as text. An empty string counts as present
fn text(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_is_equivalent_to_content() {
        let with_content = json!({ "id": 1, "author": "ana", "content": "side B is better", "createdAt": "2024-03-01T10:00:00Z" });
        let with_text = json!({ "id": 1, "author": "ana", "text": "side B is better", "createdAt": "2024-03-01T10:00:00Z" });

        assert_eq!(normalize_reply(&with_content), normalize_reply(&with_text));
    }

    #[test]
    fn test_content_wins_over_text() {
        let reply = normalize_reply(&json!({ "id": 1, "content": "new", "text": "old" }));
        assert_eq!(reply.body, "new");

        let reply = normalize_reply(&json!({ "id": 1, "content": null, "text": "old" }));
        assert_eq!(reply.body, "old");
    }

    #[test]
    fn test_likes_and_upvotes_agree() {
        let likes = normalize_reply(&json!({ "id": 1, "likes": 5, "dislikes": 2 }));
        let upvotes = normalize_reply(&json!({ "id": 2, "upvotes": 3 }));

        assert_eq!(likes.votes, 3);
        assert_eq!(upvotes.votes, 3);
    }

    #[test]
    fn test_non_numeric_upvotes_fall_back_to_likes() {
        let reply = normalize_reply(&json!({ "id": 1, "upvotes": "lots", "likes": 4 }));
        assert_eq!(reply.votes, 4);

        let reply = normalize_reply(&json!({ "id": 1, "dislikes": 2 }));
        assert_eq!(reply.votes, -2);
    }

    #[test]
    fn test_extreme_likes_saturate() {
        let reply = normalize_reply(&json!({ "id": 1, "likes": i64::MAX, "dislikes": -1 }));
        assert_eq!(reply.votes, i64::MAX);

        let reply = normalize_reply(&json!({ "id": 1, "likes": i64::MIN, "dislikes": 1 }));
        assert_eq!(reply.votes, i64::MIN);
    }

    #[test]
    fn test_defaults() {
        let reply = normalize_reply(&json!({ "id": "r1" }));

        assert_eq!(reply.id, NodeId::from("r1"));
        assert_eq!(reply.parent, None);
        assert_eq!(reply.author, UNKNOWN_AUTHOR);
        assert_eq!(reply.body, "");
        assert_eq!(reply.created_at, JUST_NOW);
        assert_eq!(reply.votes, 0);
        assert!(reply.children.is_empty());
        assert!(!reply.degraded);
    }

    #[test]
    fn test_username_and_date_variants() {
        let reply = normalize_reply(&json!({
            "id": 4,
            "username": "kim",
            "date": "3 days ago",
            "parent_reply_id": 2,
        }));

        assert_eq!(reply.author, "kim");
        assert_eq!(reply.created_at, "3 days ago");
        assert_eq!(reply.parent, Some(NodeId::from("2")));
    }

    #[test]
    fn test_parent_key_variants() {
        for key in PARENT {
            let mut record = json!({ "id": 9 });
            record[*key] = json!("5");
            assert_eq!(
                normalize_reply(&record).parent,
                Some(NodeId::from("5")),
                "parent key {}",
                key
            );
        }

        let reply = normalize_reply(&json!({ "id": 9, "parent_reply_id": null }));
        assert_eq!(reply.parent, None);
    }

    #[test]
    fn test_malformed_records_are_degraded() {
        for raw in &[json!(null), json!("hello"), json!(42), json!([1, 2])] {
            let reply = normalize_reply(raw);
            assert!(reply.degraded, "{} should be degraded", raw);
            assert_eq!(reply.author, UNKNOWN_AUTHOR);
            assert_eq!(reply.created_at, JUST_NOW);
        }

        let reply = normalize_reply(&json!({ "text": "no id here" }));
        assert!(reply.degraded);
        assert_eq!(reply.body, "no id here");
    }

    #[test]
    fn test_nested_children_are_normalized() {
        let reply = normalize_reply(&json!({
            "id": 1,
            "content": "top",
            "replies": [
                { "id": 2, "text": "middle", "children": [{ "id": 3, "text": "bottom" }] },
            ],
        }));

        assert_eq!(reply.children.len(), 1);
        assert_eq!(reply.children[0].body, "middle");
        assert_eq!(reply.children[0].children[0].id, NodeId::from("3"));
    }

    #[test]
    fn test_normalize_replies_ignores_non_arrays() {
        assert!(normalize_replies(&json!(null)).is_empty());
        assert!(normalize_replies(&json!({ "id": 1 })).is_empty());
        assert_eq!(normalize_replies(&json!([{ "id": 1 }, "junk"])).len(), 2);
    }

    #[test]
    fn test_normalize_thread() {
        let thread = normalize_thread(&json!({
            "id": 12,
            "title": "Best closing track?",
            "text": "Go.",
            "author": "ana",
            "createdAt": "2024-03-01T10:00:00Z",
            "likes": 10,
            "dislikes": 1,
            "sceneId": 3,
        }))
        .unwrap();

        assert_eq!(thread.id, NodeId::from("12"));
        assert_eq!(thread.title, "Best closing track?");
        assert_eq!(thread.body, "Go.");
        assert_eq!(thread.votes, 9);
        assert_eq!(
            thread.container,
            Some(Container {
                kind: ContainerKind::Scene,
                id: NodeId::from("3")
            })
        );

        assert_eq!(normalize_thread(&json!(null)), None);
    }
}

//! Records exchanged with the discussion API

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Identifier of a thread or reply
///
/// The backend has sent identifiers both as JSON numbers and as strings, so
/// they are kept in text form: `1` and `"1"` name the same node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    /// Create an identifier from its text form
    pub fn new<S: Into<String>>(id: S) -> Self {
        NodeId(id.into())
    }

    /// The identifier as text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the placeholder identifier of a record that had none
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read an identifier from a JSON number or non-blank string
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number
                .as_i64()
                .map(|n| n.to_string())
                .or_else(|| number.as_u64().map(|n| n.to_string()))
                .or_else(|| {
                    number
                        .as_f64()
                        .filter(|f| f.fract() == 0.0)
                        .map(|f| format!("{}", f as i64))
                })
                .map(NodeId),
            Value::String(s) if !s.trim().is_empty() => Some(NodeId(s.trim().to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        NodeId(id.to_string())
    }
}

impl FromStr for NodeId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(NodeId::new(s.trim()))
    }
}

// The backend takes integer ids, so canonical integers go back out as numbers
impl Serialize for NodeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0.parse::<i64>() {
            Ok(n) if n.to_string() == self.0 => serializer.serialize_i64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

/// The page a thread was started on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// A music scene
    Scene,
    /// A community
    Community,
    /// An album page
    Album,
}

/// Reference to the scene, community or album a thread belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// What kind of page this is
    pub kind: ContainerKind,
    /// Identifier of the page
    pub id: NodeId,
}

/// The root post of a discussion
#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    /// Thread identifier
    pub id: NodeId,
    /// Title
    pub title: String,
    /// Body text
    pub body: String,
    /// Username of the author
    pub author: String,
    /// Creation timestamp, as sent by the server
    pub created_at: String,
    /// Vote tally from the server
    pub votes: i64,
    /// Where the thread was started, if the server said
    pub container: Option<Container>,
}

/// Response of the fetch-thread-with-replies endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadPayload {
    /// The thread record, in whatever shape the server sent it
    #[serde(default)]
    pub thread: Option<Value>,
    /// Flat or nested list of reply records
    #[serde(default)]
    pub replies: Value,
}

/// Body of the post-reply endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReply {
    /// Reply text, as typed
    pub text: String,
    /// Username of the acting identity
    pub username: String,
    /// Thread the reply belongs to
    pub thread_id: NodeId,
    /// Reply being answered; `None` attaches the reply directly under the thread
    pub parent_reply_id: Option<NodeId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_id_from_json() {
        assert_eq!(NodeId::from_json(&json!(7)), Some(NodeId::from("7")));
        assert_eq!(NodeId::from_json(&json!("7")), Some(NodeId::from("7")));
        assert_eq!(NodeId::from_json(&json!(7.0)), Some(NodeId::from("7")));
        assert_eq!(NodeId::from_json(&json!(" abc ")), Some(NodeId::from("abc")));
        assert_eq!(NodeId::from_json(&json!(7.5)), None);
        assert_eq!(NodeId::from_json(&json!("  ")), None);
        assert_eq!(NodeId::from_json(&json!(null)), None);
        assert_eq!(NodeId::from_json(&json!({ "id": 1 })), None);
    }

    #[test]
    fn test_new_reply_serializes_numeric_ids_as_numbers() {
        let reply = NewReply {
            text: "great record".to_string(),
            username: "mo".to_string(),
            thread_id: NodeId::from("12"),
            parent_reply_id: None,
        };
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({
                "text": "great record",
                "username": "mo",
                "thread_id": 12,
                "parent_reply_id": null,
            })
        );

        let reply = NewReply {
            parent_reply_id: Some(NodeId::from("a1b2")),
            ..reply
        };
        assert_eq!(
            serde_json::to_value(&reply).unwrap()["parent_reply_id"],
            json!("a1b2")
        );
    }

    #[test]
    fn test_only_canonical_integers_serialize_as_numbers() {
        let id = NodeId::from_json(&json!("007")).unwrap();
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("007"));
        assert_eq!(serde_json::to_value(NodeId::from("+5")).unwrap(), json!("+5"));
        assert_eq!(serde_json::to_value(NodeId::from("-3")).unwrap(), json!(-3));
        assert_eq!(serde_json::to_value(NodeId::from("0")).unwrap(), json!(0));
    }
}

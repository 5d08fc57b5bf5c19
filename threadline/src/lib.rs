#![warn(rust_2018_idioms)]
#![warn(missing_docs)]

//! # Threadline
//!
//! ## What
//!
//! This is a Rust crate that implements the threaded discussion engine of a
//! social music-review site, plus an asynchronous HTTP client for the site's
//! discussion API. Album, scene and community pages host discussion threads;
//! each thread carries a tree of comments and nested replies.
//!
//! This crate allows the following to be performed:
//!
//! * Fetch a thread with its replies, whichever of the backend's historical
//!   field layouts the server happens to answer with ([`wire`])
//! * Assemble the replies into a depth-annotated tree ([`tree`]) and count
//!   descendants for display ([`count`])
//! * Decide where replies are allowed ([`policy`])
//! * Track the acting user's up/down votes ([`vote`])
//! * Post comments and replies through an explicit submission state machine
//!   that always reconciles by re-fetching the thread ([`compose`], [`session`])
//!
//! ## How
//!
//! Check out the `threadline-cli` binary for sample usage. The short version:
//!
//! ```no_run
//! # async fn demo() -> Result<(), threadline::Error> {
//! use threadline::{Client, Config, ThreadSession};
//!
//! let config = Config::new(threadline::URL.parse()?);
//! let client = Client::new(&config)?;
//! let mut session = ThreadSession::new(client, "42".into(), None);
//! let discussion = session.load().await?;
//! println!("{} comments", discussion.counts.total());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod compose;
pub mod config;
pub mod count;
pub mod error;
pub mod identity;
pub mod models;
pub mod policy;
pub mod session;
pub mod time;
pub mod tree;
pub mod vote;
pub mod wire;

pub use api::DiscussionApi;
pub use client::Client;
pub use config::Config;
pub use error::{Error, SubmissionFailure};
pub use identity::Identity;
pub use models::NodeId;
pub use session::{Discussion, ThreadSession};
pub use url;

/// URL of a locally running discussion backend. Useful as `base_url` to `Config`
pub const URL: &str = "http://localhost:8000/";

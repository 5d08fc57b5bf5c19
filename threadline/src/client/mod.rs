//! HTTP client for the discussion API

mod http_client;

use futures::future::{BoxFuture, FutureExt};
use reqwest::ClientBuilder;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use self::http_client::HttpClient;
use crate::api::DiscussionApi;
use crate::config::Config;
use crate::error::{Error, SubmissionFailure};
use crate::models::{NewReply, NodeId, ThreadPayload};

/// Client of the discussion API
#[derive(Clone)]
pub struct Client {
    http: HttpClient,
}

/// Error body of the backend, e.g. `{"detail": "Thread not found"}`
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

impl Client {
    /// Create a new client
    pub fn new(config: &Config) -> Result<Self, Error> {
        let reqwest = ClientBuilder::new()
            .use_rustls_tls()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Client {
            http: HttpClient::new(config.base_url.clone(), reqwest),
        })
    }

    /// Base URL requests are made against
    pub fn base_url(&self) -> &Url {
        self.http.base_url()
    }

    /// Retrieve a thread and its replies
    pub async fn thread(&self, thread_id: &NodeId) -> Result<ThreadPayload, Error> {
        let path = ["api", "threads", thread_id.as_str(), "replies"];
        let res = self.http.get_json(&path).await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(res.json::<ThreadPayload>().await?)
    }

    /// Post a comment (no parent) or a reply
    pub async fn submit_reply(&self, reply: &NewReply) -> Result<(), SubmissionFailure> {
        let res = self
            .http
            .post_json(&["api", "replies"], reply)
            .await
            .map_err(|err| SubmissionFailure::Transport(err.to_string()))?;

        let status = res.status();
        if status.is_success() {
            return Ok(());
        }

        let body = res.json::<ErrorBody>().await.unwrap_or_default();
        Err(SubmissionFailure::Rejected {
            status: status.as_u16(),
            detail: detail_message(body.detail),
        })
    }
}

impl DiscussionApi for Client {
    fn fetch_thread<'a>(
        &'a self,
        thread_id: &'a NodeId,
    ) -> BoxFuture<'a, Result<ThreadPayload, Error>> {
        self.thread(thread_id).boxed()
    }

    fn post_reply<'a>(&'a self, reply: &'a NewReply) -> BoxFuture<'a, Result<(), SubmissionFailure>> {
        self.submit_reply(reply).boxed()
    }
}

/// The backend sends `detail` as a string, or as a list of validation errors
fn detail_message(detail: Option<Value>) -> String {
    match detail {
        Some(Value::String(message)) => message,
        Some(Value::Null) | None => "Unknown error".to_string(),
        Some(other) => other.to_string(),
    }
}

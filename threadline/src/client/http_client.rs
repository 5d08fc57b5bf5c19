use log::info;
use reqwest::header::ACCEPT;
use reqwest::{Client as ReqwestClient, Response};
use serde::Serialize;
use url::Url;

use crate::error::Error;

#[derive(Clone)]
pub(super) struct HttpClient {
    base_url: Url,
    reqwest: ReqwestClient,
}

impl HttpClient {
    pub(super) fn new(base_url: Url, reqwest: ReqwestClient) -> Self {
        HttpClient { base_url, reqwest }
    }

    pub(super) async fn post_json<B>(&self, path: &[&str], body: &B) -> Result<Response, Error>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        info!("POST {}", url.as_str());

        let res = self
            .reqwest
            .post(url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        Ok(res)
    }

    pub(super) async fn get_json(&self, path: &[&str]) -> Result<Response, Error> {
        let url = self.url(path)?;
        info!("GET {}", url.as_str());

        let res = self
            .reqwest
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        Ok(res)
    }

    /// Append `path` to the base URL, percent-encoding each segment
    pub(super) fn url(&self, path: &[&str]) -> Result<Url, Error> {
        if let Some(segment) = path
            .iter()
            .find(|segment| matches!(segment.trim(), "" | "." | ".."))
        {
            return Err(Error::InvalidId(segment.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(path);

        Ok(url)
    }

    pub(super) fn base_url(&self) -> &Url {
        &self.base_url
    }
}

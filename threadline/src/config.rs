//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use url::Url;

use crate::error::Error;

/// How long a request may take before it is abandoned
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the backend lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the discussion backend; API paths are joined onto it
    pub base_url: Url,
    /// Upper bound for every request, submissions included
    pub request_timeout: Duration,
}

impl Config {
    /// Configuration with the default timeout
    pub fn new(base_url: Url) -> Self {
        Config {
            base_url,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the request timeout
    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

/// Per-user configuration directory
pub fn config_dir() -> Result<PathBuf, Error> {
    ProjectDirs::from("fm", "threadline", env!("CARGO_PKG_NAME"))
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
        .ok_or(Error::HomeNotFound)
}

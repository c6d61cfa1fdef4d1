//! Page sources: where the dashboard body comes from.
//!
//! The report command only sees [`PageSource`]. The live source issues a
//! single blocking GET with no retry; the file source reads a saved page.

use crate::error::{CiFlakesError, Result};
use crate::util::progress::{create_spinner, should_show_progress};
use anyhow::Context;
use reqwest::Url;
use reqwest::blocking::Client;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("ci-flakes/", env!("CARGO_PKG_VERSION"));

/// Something that yields the raw dashboard page.
pub trait PageSource {
    /// Short human description for logs (URL or path).
    fn describe(&self) -> String;

    /// Fetch the whole page body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be retrieved.
    fn fetch(&self) -> Result<String>;
}

/// Dashboard query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardQuery {
    pub filter: String,
    pub filter_prop: String,
    pub fail_list: String,
}

impl DashboardQuery {
    fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("filter", self.filter.as_str()),
            ("filter_prop", self.filter_prop.as_str()),
            ("fail_list", self.fail_list.as_str()),
        ]
    }
}

/// Build the dashboard URL from a base URL and query parameters.
///
/// # Errors
///
/// Returns a config error if `base` is not a valid absolute URL.
pub fn dashboard_url(base: &str, query: &DashboardQuery) -> Result<Url> {
    Url::parse_with_params(base, query.pairs())
        .map_err(|err| CiFlakesError::Config(format!("invalid url '{base}': {err}")))
}

/// Live dashboard over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    /// Create a source for `url`; `timeout` of `None` waits indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the HTTP client (TLS backend) cannot be
    /// initialized.
    pub fn new(url: Url, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to initialize HTTP client")?;
        Ok(Self { client, url })
    }

    fn network_error(&self, message: String) -> CiFlakesError {
        CiFlakesError::Network {
            url: self.url.to_string(),
            message,
        }
    }
}

impl PageSource for HttpSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    fn fetch(&self) -> Result<String> {
        info!(url = %self.url, "Fetching dashboard");
        let spinner = create_spinner("Fetching CI dashboard...", should_show_progress());

        let result = self
            .client
            .get(self.url.clone())
            .send()
            .map_err(|err| self.network_error(err.to_string()));
        spinner.finish_and_clear();
        let response = result?;

        let status = response.status();
        if !status.is_success() {
            return Err(CiFlakesError::Http {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response
            .text()
            .map_err(|err| self.network_error(format!("failed to read response body: {err}")))?;
        debug!(bytes = body.len(), "Received dashboard body");
        Ok(body)
    }
}

/// Saved page on disk; `-` reads standard input.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_stdin(&self) -> bool {
        self.path.as_os_str() == "-"
    }
}

impl PageSource for FileSource {
    fn describe(&self) -> String {
        if self.is_stdin() {
            "<stdin>".to_string()
        } else {
            self.path.display().to_string()
        }
    }

    fn fetch(&self) -> Result<String> {
        info!(source = %self.describe(), "Reading saved page");
        let read = if self.is_stdin() {
            let mut body = String::new();
            io::stdin().read_to_string(&mut body).map(|_| body)
        } else {
            fs::read_to_string(&self.path)
        };
        read.map_err(|source| CiFlakesError::Input {
            path: self.path.clone(),
            source,
        })
    }
}

use std::time::Duration;

use reqwest::{Client, Url};
use tracing::{debug, instrument};

use super::{Page, PageSource, Result};
use crate::{FetchError, LoaderConfig};

const USER_AGENT: &str = concat!("trashpoint/", env!("CARGO_PKG_VERSION"));

/// [`PageSource`] backed by an HTTP GET against the dataset API.
///
/// `limit` and `offset` are appended to the configured dataset URL as query
/// parameters.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
    base_url: Url,
}

impl HttpPageSource {
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        Self::with_timeout(&config.dataset_url, config.fetch_timeout)
    }

    pub fn with_timeout(dataset_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(dataset_url).map_err(|e| FetchError::InvalidUrl {
            url: dataset_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn page_url(&self, offset: usize, limit: usize) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        url
    }
}

impl PageSource for HttpPageSource {
    #[instrument(name = "Fetch dataset page", skip(self), level = "debug")]
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Page> {
        let url = self.page_url(offset, limit);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                offset,
            });
        }
        let body = response.bytes().await?;
        let page = Page::from_json(&body)?;
        debug!(rows = page.rows.len(), total = ?page.total, "Fetched page");
        Ok(page)
    }
}

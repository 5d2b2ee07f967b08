use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;

use crate::config::FetchConfig;
use crate::error::{EngineError, Result};
use crate::fetch::PageSource;

/// Plain HTTP GET strategy for pages that render server-side. Sends a
/// realistic browser User-Agent; some marketplaces return empty results
/// without one.
pub struct StaticFetcher {
    client: Client,
}

impl StaticFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US, en;q=0.5"));

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EngineError::Fetch {
                url: url.to_string(),
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Fetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("status code {}", status.as_u16()),
            });
        }

        response.text().await.map_err(|e| EngineError::Fetch {
            url: url.to_string(),
            status: Some(status.as_u16()),
            message: format!("body read failed: {}", e),
        })
    }
}

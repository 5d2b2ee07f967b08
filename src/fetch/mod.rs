use async_trait::async_trait;

use crate::config::AppConfig;
use crate::error::Result;
use crate::models::FetchMethod;

pub mod browser;
pub mod session;
pub mod static_http;

pub use browser::BrowserFetcher;
pub use session::SessionCache;
pub use static_http::StaticFetcher;

/// Capability for obtaining raw page HTML. Parsing stays out of this trait
/// on purpose: `scraper::Html` is not `Send`, so the document handle must
/// never cross an await point.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Holds one strategy per fetch method. Selection is data-driven off the
/// tracker's configured method, resolved once at run start.
pub struct PageFetcher {
    static_http: Box<dyn PageSource>,
    browser: Box<dyn PageSource>,
}

impl PageFetcher {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            static_http: Box::new(StaticFetcher::new(&config.fetch)?),
            browser: Box::new(BrowserFetcher::new(
                config.browser.clone(),
                config.fetch.user_agent.clone(),
            )),
        })
    }

    /// Swap in custom strategies (used by tests and embedders).
    pub fn with_sources(static_http: Box<dyn PageSource>, browser: Box<dyn PageSource>) -> Self {
        Self {
            static_http,
            browser,
        }
    }

    pub fn source_for(&self, method: FetchMethod) -> &dyn PageSource {
        match method {
            FetchMethod::StaticHtml => self.static_http.as_ref(),
            FetchMethod::ScriptedBrowser => self.browser.as_ref(),
        }
    }
}

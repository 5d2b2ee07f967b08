use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use url::Url;

use crate::config::BrowserConfig;
use crate::error::{EngineError, Result};
use crate::fetch::{PageSource, SessionCache};

/// Scripted-browser strategy for pages that only render client-side. One
/// headless Chrome process is launched lazily and shared; each fetch gets its
/// own tab, which is closed on every exit path. Session cookies are restored
/// from and persisted to a per-site cache around each navigation.
pub struct BrowserFetcher {
    config: BrowserConfig,
    user_agent: String,
    sessions: SessionCache,
    browser: Mutex<Option<Arc<Browser>>>,
}

impl BrowserFetcher {
    pub fn new(config: BrowserConfig, user_agent: String) -> Self {
        let sessions = SessionCache::new(Duration::from_secs(config.session_ttl_secs));
        Self {
            config,
            user_agent,
            sessions,
            browser: Mutex::new(None),
        }
    }

    fn browser(&self) -> Result<Arc<Browser>> {
        let mut guard = self
            .browser
            .lock()
            .map_err(|_| EngineError::Browser(anyhow::anyhow!("browser mutex poisoned")))?;
        if let Some(browser) = guard.as_ref() {
            return Ok(Arc::clone(browser));
        }

        let mut launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .args(vec![
                std::ffi::OsStr::new("--no-sandbox"),
                std::ffi::OsStr::new("--disable-dev-shm-usage"),
                std::ffi::OsStr::new("--disable-gpu"),
                std::ffi::OsStr::new("--ignore-certificate-errors"),
            ])
            .build()
            .map_err(|e| EngineError::Browser(anyhow::anyhow!("launch options: {}", e)))?;

        if let Some(chrome_path) = &self.config.chrome_path {
            launch_options.path = Some(std::path::PathBuf::from(chrome_path));
        }

        let browser = Arc::new(Browser::new(launch_options)?);
        *guard = Some(Arc::clone(&browser));
        Ok(browser)
    }

    fn navigate(&self, tab: &Tab, url: &str, site: &str) -> Result<String> {
        tab.set_default_timeout(Duration::from_secs(self.config.page_ready_timeout));
        tab.set_user_agent(&self.user_agent, None, None)?;

        if let Some(cookies) = self.sessions.acquire(site) {
            tab.set_cookies(cookies)?;
        }

        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;
        Ok(tab.get_content()?)
    }
}

fn site_key(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

#[async_trait]
impl PageSource for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let browser = self.browser()?;
        let tab = browser.new_tab()?;
        let site = site_key(url);

        let result = self.navigate(&tab, url, &site);

        // Persist cookies and release the tab whether or not the navigation
        // succeeded; a leaked tab keeps the renderer alive.
        if let Ok(cookies) = tab.get_cookies() {
            self.sessions.store(&site, cookies);
        }
        if let Err(e) = tab.close(true) {
            tracing::debug!("tab close failed for {}: {}", url, e);
        }

        result
    }
}

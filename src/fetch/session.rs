use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use headless_chrome::protocol::cdp::Network::{Cookie, CookieParam};

/// Per-site cache of browser session cookies, so an authenticated session
/// survives across runs without re-logging in. Entries expire after the
/// configured TTL; past that, the next navigation starts a fresh session.
pub struct SessionCache {
    ttl: Duration,
    inner: Mutex<HashMap<String, StoredSession>>,
}

struct StoredSession {
    cookies: Vec<Cookie>,
    saved_at: Instant,
}

impl SessionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Cookies for a site, ready to hand to a fresh tab. Expired entries are
    /// evicted here rather than on store, so the TTL is checked against use.
    pub fn acquire(&self, site: &str) -> Option<Vec<CookieParam>> {
        let mut inner = self.inner.lock().ok()?;
        let session = inner.get(site)?;
        if session.saved_at.elapsed() > self.ttl {
            inner.remove(site);
            return None;
        }
        Some(session.cookies.iter().map(to_param).collect())
    }

    pub fn store(&self, site: &str, cookies: Vec<Cookie>) {
        if cookies.is_empty() {
            return;
        }
        if let Ok(mut inner) = self.inner.lock() {
            inner.insert(
                site.to_string(),
                StoredSession {
                    cookies,
                    saved_at: Instant::now(),
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn to_param(cookie: &Cookie) -> CookieParam {
    CookieParam {
        name: cookie.name.clone(),
        value: cookie.value.clone(),
        url: None,
        domain: Some(cookie.domain.clone()),
        path: Some(cookie.path.clone()),
        secure: Some(cookie.secure),
        http_only: Some(cookie.http_only),
        same_site: cookie.same_site.clone(),
        expires: Some(cookie.expires),
        priority: Some(cookie.priority.clone()),
        same_party: Some(cookie.same_party),
        source_scheme: Some(cookie.source_scheme.clone()),
        source_port: Some(cookie.source_port),
        partition_key: cookie.partition_key.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(name: &str) -> Cookie {
        // Built from the wire shape so the helper stays stable across CDP
        // protocol revisions.
        serde_json::from_value(serde_json::json!({
            "name": name,
            "value": "v",
            "domain": "example.com",
            "path": "/",
            "expires": 0.0,
            "size": 1,
            "httpOnly": false,
            "secure": true,
            "session": true,
            "priority": "Medium",
            "sameParty": false,
            "sourceScheme": "Secure",
            "sourcePort": 443
        }))
        .unwrap()
    }

    #[test]
    fn test_store_then_acquire() {
        let cache = SessionCache::new(Duration::from_secs(60));
        cache.store("example.com", vec![cookie("sid")]);

        let params = cache.acquire("example.com").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "sid");
        assert_eq!(params[0].domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_unknown_site_is_none() {
        let cache = SessionCache::new(Duration::from_secs(60));
        assert!(cache.acquire("other.example").is_none());
    }

    #[test]
    fn test_expired_session_is_evicted() {
        let cache = SessionCache::new(Duration::from_secs(0));
        cache.store("example.com", vec![cookie("sid")]);
        std::thread::sleep(Duration::from_millis(5));

        assert!(cache.acquire("example.com").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_empty_cookie_set_is_not_stored() {
        let cache = SessionCache::new(Duration::from_secs(60));
        cache.store("example.com", vec![]);
        assert!(cache.is_empty());
    }
}

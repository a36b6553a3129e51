//! Two-tier offline cache shell.
//!
//! Static assets are served cache-first from `<app>-static-v<version>`;
//! everything else is network-first with successful responses copied into
//! `<app>-dynamic-v<version>`. Activation deletes every cache whose name is
//! not one of the two current names, so bumping the version invalidates all
//! earlier caches at once.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// File extensions always treated as static assets.
const STATIC_EXTENSIONS: [&str; 7] = [".js", ".css", ".png", ".jpg", ".svg", ".ico", ".woff2"];

pub const OFFLINE_STATUS: u16 = 503;
pub const OFFLINE_BODY: &str = "offline: resource unavailable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub app: String,
    pub version: String,
    /// Paths fetched into the static cache on install.
    pub static_assets: Vec<String>,
    /// Cached document served to navigation requests when offline.
    pub offline_document: String,
    /// Substrings identifying API requests.
    pub api_patterns: Vec<String>,
}

impl CacheConfig {
    pub fn new(app: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            version: version.into(),
            static_assets: vec!["/".into(), "/index.html".into(), "/manifest.json".into()],
            offline_document: "/index.html".into(),
            api_patterns: vec![
                "/rest/v1/words".into(),
                "/rest/v1/categories".into(),
                "/rest/v1/system_config".into(),
            ],
        }
    }

    #[must_use]
    pub fn static_cache_name(&self) -> String {
        format!("{}-static-v{}", self.app, self.version)
    }

    #[must_use]
    pub fn dynamic_cache_name(&self) -> String {
        format!("{}-dynamic-v{}", self.app, self.version)
    }
}

/// What the request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    /// A page navigation.
    Document,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub destination: Destination,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".into(),
            url: url.into(),
            destination: Destination::Other,
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            destination: Destination::Document,
            ..Self::get(url)
        }
    }

    fn path(&self) -> &str {
        let without_scheme = self
            .url
            .split_once("://")
            .map_or(self.url.as_str(), |(_, rest)| rest);
        let path = without_scheme
            .find('/')
            .map_or("/", |i| &without_scheme[i..]);
        path.split(['?', '#']).next().unwrap_or(path)
    }

    fn is_http(&self) -> bool {
        !self.url.contains("://")
            || self.url.starts_with("http://")
            || self.url.starts_with("https://")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn offline() -> Self {
        Self {
            status: OFFLINE_STATUS,
            body: OFFLINE_BODY.as_bytes().to_vec(),
        }
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("network error: {0}")]
pub struct NetworkError(pub String);

/// Whatever actually performs fetches.
pub trait Network {
    /// # Errors
    ///
    /// Returns an error when the request cannot be completed at all.
    fn fetch(&mut self, request: &Request) -> Result<Response, NetworkError>;
}

/// Named caches of URL → response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStorage {
    caches: BTreeMap<String, BTreeMap<String, Response>>,
}

impl CacheStorage {
    pub fn put(&mut self, cache: &str, url: &str, response: Response) {
        self.caches
            .entry(cache.to_string())
            .or_default()
            .insert(url.to_string(), response);
    }

    /// First match for `url` across every cache, in name order.
    #[must_use]
    pub fn lookup(&self, url: &str) -> Option<&Response> {
        self.caches.values().find_map(|entries| entries.get(url))
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }

    pub fn delete(&mut self, cache: &str) -> bool {
        self.caches.remove(cache).is_some()
    }

    #[must_use]
    pub fn len(&self, cache: &str) -> usize {
        self.caches.get(cache).map_or(0, BTreeMap::len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Not handled; the request goes straight to the network.
    Bypass,
    CacheFirst,
    NetworkFirst,
}

/// The offline shell: configuration plus the caches it manages.
#[derive(Debug, Clone)]
pub struct OfflineShell {
    config: CacheConfig,
    storage: CacheStorage,
}

impl OfflineShell {
    #[must_use]
    pub const fn new(config: CacheConfig, storage: CacheStorage) -> Self {
        Self { config, storage }
    }

    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    #[must_use]
    pub const fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    #[must_use]
    pub fn into_storage(self) -> CacheStorage {
        self.storage
    }

    /// Pre-cache every static asset. All-or-nothing: if any fetch fails or
    /// returns a non-success status, nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns the first failed asset fetch.
    pub fn install(&mut self, network: &mut dyn Network) -> Result<usize, NetworkError> {
        let mut fetched = Vec::with_capacity(self.config.static_assets.len());
        for asset in &self.config.static_assets {
            let response = network.fetch(&Request::get(asset.clone()))?;
            if !response.is_ok() {
                return Err(NetworkError(format!(
                    "{asset} returned status {}",
                    response.status
                )));
            }
            fetched.push((asset.clone(), response));
        }

        let cache = self.config.static_cache_name();
        let count = fetched.len();
        for (asset, response) in fetched {
            self.storage.put(&cache, &asset, response);
        }
        info!(cache, count, "static assets cached");
        Ok(count)
    }

    /// Delete every cache not named for the current version. Returns the
    /// deleted names.
    pub fn activate(&mut self) -> Vec<String> {
        let keep = [
            self.config.static_cache_name(),
            self.config.dynamic_cache_name(),
        ];
        let stale: Vec<String> = self
            .storage
            .names()
            .into_iter()
            .filter(|name| !keep.contains(name))
            .collect();
        for name in &stale {
            self.storage.delete(name);
            info!(cache = %name, "deleted stale cache");
        }
        stale
    }

    #[must_use]
    pub fn strategy_for(&self, request: &Request) -> Strategy {
        if !request.method.eq_ignore_ascii_case("GET") || !request.is_http() {
            return Strategy::Bypass;
        }
        if self.is_static_asset(request) {
            return Strategy::CacheFirst;
        }
        Strategy::NetworkFirst
    }

    /// Answer `request`, or `None` when it bypasses the shell.
    pub fn handle(&mut self, request: &Request, network: &mut dyn Network) -> Option<Response> {
        match self.strategy_for(request) {
            Strategy::Bypass => None,
            Strategy::CacheFirst => Some(self.cache_first(request, network)),
            Strategy::NetworkFirst => Some(self.network_first(request, network)),
        }
    }

    #[must_use]
    pub fn is_api_request(&self, request: &Request) -> bool {
        self.config
            .api_patterns
            .iter()
            .any(|pattern| request.url.contains(pattern.as_str()))
    }

    fn is_static_asset(&self, request: &Request) -> bool {
        let path = request.path();
        self.config
            .static_assets
            .iter()
            .any(|asset| asset == path)
            || STATIC_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    }

    fn cache_first(&mut self, request: &Request, network: &mut dyn Network) -> Response {
        if let Some(cached) = self.storage.lookup(&request.url) {
            debug!(url = %request.url, "served from cache");
            return cached.clone();
        }
        match network.fetch(request) {
            Ok(response) => {
                if response.is_ok() {
                    let cache = self.config.static_cache_name();
                    self.storage.put(&cache, &request.url, response.clone());
                }
                response
            }
            Err(err) => {
                warn!(url = %request.url, error = %err, "cache-first fetch failed");
                Response::offline()
            }
        }
    }

    fn network_first(&mut self, request: &Request, network: &mut dyn Network) -> Response {
        match network.fetch(request) {
            Ok(response) => {
                if response.is_ok() {
                    let cache = self.config.dynamic_cache_name();
                    self.storage.put(&cache, &request.url, response.clone());
                }
                response
            }
            Err(err) => {
                debug!(url = %request.url, api = self.is_api_request(request), error = %err, "network failed, trying cache");
                if let Some(cached) = self.storage.lookup(&request.url) {
                    return cached.clone();
                }
                if request.destination == Destination::Document {
                    if let Some(doc) = self.storage.lookup(&self.config.offline_document) {
                        return doc.clone();
                    }
                }
                Response::offline()
            }
        }
    }
}

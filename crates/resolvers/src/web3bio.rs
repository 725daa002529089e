//! Name resolution via the web3.bio profile API.

use core::time::Duration;

use async_trait::async_trait;
use mention_core::NameResolver;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::DEFAULT_TIMEOUT;

const DEFAULT_BASE_URL: &str = "https://api.web3.bio";

#[derive(Debug, Deserialize)]
struct Profile {
    address: Option<String>,
}

/// Resolves domain-style names (`vitalik.eth`, `alice.farcaster.eth`) via
/// `GET {base}/profile/{name}`. The service answers with an array of
/// profiles; the first entry's address wins.
#[derive(Debug, Clone)]
pub struct Web3BioResolver {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl Web3BioResolver {
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch(&self, name: &str) -> Option<String> {
        let url = format!("{}/profile/{name}", self.base_url);
        let mut request = self.http.get(&url).header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("X-API-KEY", key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(name, error = %error, "web3.bio request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(name, status = %response.status(), "web3.bio returned non-success");
            return None;
        }

        match response.json::<Vec<Profile>>().await {
            Ok(profiles) => {
                let address = first_address(profiles);
                debug!(name, address = ?address, "web3.bio lookup finished");
                address
            }
            Err(error) => {
                warn!(name, error = %error, "web3.bio returned an unexpected body");
                None
            }
        }
    }
}

fn first_address(profiles: Vec<Profile>) -> Option<String> {
    profiles.into_iter().next().and_then(|profile| profile.address)
}

#[async_trait]
impl NameResolver for Web3BioResolver {
    async fn resolve_name(&self, name: &str) -> Option<String> {
        match tokio::time::timeout(self.timeout, self.fetch(name)).await {
            Ok(address) => address,
            Err(_) => {
                warn!(name, timeout_secs = self.timeout.as_secs(), "web3.bio lookup timed out");
                None
            }
        }
    }
}

//! Name resolution via Farcaster profile lookups.
//!
//! Bare handles reach this resolver with a `.farcaster.eth` suffix already
//! appended by the core. Resolution runs in two hops: search the username
//! for candidate FIDs, then bulk-fetch the matching profile and take its
//! first verified Ethereum address (custody address as a fallback).

use core::time::Duration;

use async_trait::async_trait;
use mention_core::NameResolver;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::DEFAULT_TIMEOUT;

const DEFAULT_BASE_URL: &str = "https://api.neynar.com";
const SEARCH_LIMIT: u8 = 5;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    users: Vec<SearchUser>,
}

#[derive(Debug, Deserialize)]
struct SearchUser {
    fid: u64,
    username: String,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    users: Vec<BulkUser>,
}

#[derive(Debug, Deserialize)]
struct BulkUser {
    custody_address: Option<String>,
    #[serde(default)]
    verified_addresses: VerifiedAddresses,
}

#[derive(Debug, Default, Deserialize)]
struct VerifiedAddresses {
    #[serde(default)]
    eth_addresses: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FarcasterResolver {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl FarcasterResolver {
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

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Option<T> {
        let mut request = self.http.get(url).header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(url, error = %error, "farcaster request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(url, status = %response.status(), "farcaster returned non-success");
            return None;
        }

        match response.json::<T>().await {
            Ok(body) => Some(body),
            Err(error) => {
                warn!(url, error = %error, "farcaster returned an unexpected body");
                None
            }
        }
    }

    async fn search_fid(&self, username: &str) -> Option<u64> {
        let url = format!(
            "{}/v2/farcaster/user/search?q={username}&limit={SEARCH_LIMIT}",
            self.base_url
        );
        let response: SearchResponse = self.get_json(&url).await?;
        pick_fid(&response.result.users, username)
    }

    async fn fetch(&self, name: &str) -> Option<String> {
        let username = strip_farcaster_suffix(name);
        let fid = self.search_fid(username).await?;
        debug!(username, fid, "farcaster username matched");

        let url = format!("{}/v2/farcaster/user/bulk?fids={fid}", self.base_url);
        let response: BulkResponse = self.get_json(&url).await?;
        response.users.into_iter().next().and_then(pick_address)
    }
}

fn strip_farcaster_suffix(name: &str) -> &str {
    name.strip_suffix(".farcaster.eth").unwrap_or(name)
}

/// Search results are fuzzy; only an exact (case-insensitive) username
/// match counts as resolved.
fn pick_fid(users: &[SearchUser], username: &str) -> Option<u64> {
    users
        .iter()
        .find(|user| user.username.eq_ignore_ascii_case(username))
        .map(|user| user.fid)
}

fn pick_address(user: BulkUser) -> Option<String> {
    user.verified_addresses
        .eth_addresses
        .into_iter()
        .next()
        .or(user.custody_address)
}

#[async_trait]
impl NameResolver for FarcasterResolver {
    async fn resolve_name(&self, name: &str) -> Option<String> {
        match tokio::time::timeout(self.timeout, self.fetch(name)).await {
            Ok(address) => address,
            Err(_) => {
                warn!(name, timeout_secs = self.timeout.as_secs(), "farcaster lookup timed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BulkUser, FarcasterResolver, SearchUser, pick_address, pick_fid, strip_farcaster_suffix,
    };
    use core::time::Duration;
    use mention_core::NameResolver as _;

    #[test]
    fn suffix_is_stripped_before_search() {
        assert_eq!(strip_farcaster_suffix("dwr.farcaster.eth"), "dwr");
        assert_eq!(strip_farcaster_suffix("dwr"), "dwr");
    }

    #[test]
    fn only_exact_username_matches() {
        let users: Vec<SearchUser> = serde_json::from_str(
            r#"[{"fid":2,"username":"varunsrin"},{"fid":3,"username":"dwr"}]"#,
        )
        .unwrap();
        assert_eq!(pick_fid(&users, "dwr"), Some(3));
        assert_eq!(pick_fid(&users, "DWR"), Some(3));
        assert_eq!(pick_fid(&users, "dw"), None);
    }

    #[test]
    fn verified_address_is_preferred_over_custody() {
        let user: BulkUser = serde_json::from_str(
            r#"{"custody_address":"0xcc",
                "verified_addresses":{"eth_addresses":["0xaa","0xbb"]}}"#,
        )
        .unwrap();
        assert_eq!(pick_address(user).as_deref(), Some("0xaa"));
    }

    #[test]
    fn custody_address_is_the_fallback() {
        let user: BulkUser =
            serde_json::from_str(r#"{"custody_address":"0xcc"}"#).unwrap();
        assert_eq!(pick_address(user).as_deref(), Some("0xcc"));
    }

    #[test]
    fn addressless_profile_yields_none() {
        let user: BulkUser = serde_json::from_str(r#"{"custody_address":null}"#).unwrap();
        assert_eq!(pick_address(user), None);
    }

    #[tokio::test]
    async fn unresponsive_upstream_times_out_to_none() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            loop {
                let (socket, _) = listener.accept().await.unwrap();
                held.push(socket);
            }
        });

        let resolver = FarcasterResolver::with_base_url(format!("http://{addr}"), None)
            .with_timeout(Duration::from_millis(100));
        assert_eq!(resolver.resolve_name("dwr.farcaster.eth").await, None);
        server.abort();
    }
}

//! Mention extraction and identifier resolution.
//!
//! The pipeline is linear: message text goes through [`extract_mentions`],
//! each surviving candidate is classified by shape and dispatched to one of
//! three strategies in [`resolve_identifier`], and
//! [`resolve_mentions_in_message`] fans the lookups out concurrently and
//! collects one entry per candidate. Lookup failures are data (`None`), not
//! errors; nothing in this crate panics on message content.

pub mod extract;
mod matching;

pub use extract::extract_mentions;
pub use matching::match_shortened_address;

use std::sync::OnceLock;

use async_trait::async_trait;
use futures_util::future::join_all;
use regex::Regex;
use tracing::debug;

static FULL_ADDRESS: OnceLock<Regex> = OnceLock::new();
static SHORTENED_SHAPE: OnceLock<Regex> = OnceLock::new();

fn full_address_regex() -> &'static Regex {
    FULL_ADDRESS.get_or_init(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").unwrap())
}

fn shortened_shape_regex() -> &'static Regex {
    SHORTENED_SHAPE
        .get_or_init(|| Regex::new(r"0x[a-fA-F0-9]+(?:…|\.{2,3})[a-fA-F0-9]+").unwrap())
}

/// External name-resolution collaborator (ENS-style domains and profile
/// handles). Implementations bound each lookup with their own timeout and
/// report every failure mode — not found, timeout, malformed upstream
/// response — as `None` so the aggregate step is never blocked or failed by
/// a single bad candidate.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve_name(&self, name: &str) -> Option<String>;
}

/// Resolves a single candidate identifier to an Ethereum address.
///
/// Dispatch order is fixed: full addresses pass through unchanged, shortened
/// addresses are matched against the supplied member list, bare handles get
/// the `.farcaster.eth` suffix before lookup, and anything else dotted goes
/// to the name resolver as-is.
pub async fn resolve_identifier(
    identifier: &str,
    member_addresses: Option<&[String]>,
    resolver: &dyn NameResolver,
) -> Option<String> {
    if full_address_regex().is_match(identifier) {
        return Some(identifier.to_owned());
    }

    if shortened_shape_regex().is_match(identifier) {
        // Only resolvable inside a group; without a member list this fails.
        let members = member_addresses.filter(|m| !m.is_empty())?;
        return match_shortened_address(identifier, members);
    }

    let name = if identifier.contains('.') {
        identifier.to_owned()
    } else {
        // Untagged handles are assumed to be Farcaster identities.
        format!("{identifier}.farcaster.eth")
    };
    debug!(identifier, name = %name, "dispatching to name resolver");
    resolver.resolve_name(&name).await
}

/// Resolves a list of already-extracted candidates concurrently, preserving
/// candidate order. One entry per candidate; unresolvable candidates map to
/// `None` without affecting the others.
pub async fn resolve_identifiers(
    identifiers: Vec<String>,
    member_addresses: Option<&[String]>,
    resolver: &dyn NameResolver,
) -> Vec<(String, Option<String>)> {
    let lookups = identifiers
        .iter()
        .map(|identifier| resolve_identifier(identifier, member_addresses, resolver));
    let resolved = join_all(lookups).await;
    identifiers.into_iter().zip(resolved).collect()
}

/// Extracts every mention from `message` and resolves them all.
///
/// This is the aggregate entry point: extraction, fan-out resolution,
/// fan-in into a candidate → address-or-`None` mapping. Mention-free text
/// yields an empty mapping, never an error.
pub async fn resolve_mentions_in_message(
    message: &str,
    member_addresses: Option<&[String]>,
    resolver: &dyn NameResolver,
) -> Vec<(String, Option<String>)> {
    let mentions = extract_mentions(message);
    resolve_identifiers(mentions, member_addresses, resolver).await
}

//! Regex-based mention extraction.
//!
//! Scan order matters: full addresses are collected before the shortened
//! pass so a 40-hex address is never split at its prefix, and `@`-prefixed
//! captures come before the bare-domain pass so dedup can unify them.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

static FULL_ADDRESSES: OnceLock<Regex> = OnceLock::new();
static SHORTENED_AT: OnceLock<Regex> = OnceLock::new();
static AT_MENTIONS: OnceLock<Regex> = OnceLock::new();
static BARE_DOMAINS: OnceLock<Regex> = OnceLock::new();

fn full_addresses_regex() -> &'static Regex {
    FULL_ADDRESSES.get_or_init(|| Regex::new(r"0x[a-fA-F0-9]{40}\b").unwrap())
}

fn shortened_at_regex() -> &'static Regex {
    SHORTENED_AT
        .get_or_init(|| Regex::new(r"@(0x[a-fA-F0-9]+(?:…|\.{2,3})[a-fA-F0-9]+)").unwrap())
}

fn at_mentions_regex() -> &'static Regex {
    // The name-service alternative comes first so sentence punctuation after
    // a domain-style mention is not swallowed into the capture.
    AT_MENTIONS.get_or_init(|| Regex::new(r"@([\w.-]+\.eth|[\w.-]+)").unwrap())
}

fn bare_domains_regex() -> &'static Regex {
    BARE_DOMAINS.get_or_init(|| Regex::new(r"\b[\w-]+(?:\.[\w-]+)*\.eth\b").unwrap())
}

/// Parses a message into the deduplicated list of candidate identifiers:
/// full addresses, shortened addresses, `@`-handles and ENS-style domains,
/// all stripped of any leading `@`.
///
/// Any input yields a list — possibly empty — without panicking. When both
/// a subdomain and one of its parent domains were matched independently,
/// only the most specific (child) candidate survives.
pub fn extract_mentions(message: &str) -> Vec<String> {
    let mut mentions: Vec<String> = Vec::new();

    for m in full_addresses_regex().find_iter(message) {
        mentions.push(m.as_str().to_owned());
    }

    for caps in shortened_at_regex().captures_iter(message) {
        mentions.push(caps[1].to_owned());
    }

    // `regex` has no negative lookahead, so the `@0x...` exclusion from the
    // handle pattern is applied here instead.
    for caps in at_mentions_regex().captures_iter(message) {
        let handle = &caps[1];
        if !handle.starts_with("0x") {
            mentions.push(handle.to_owned());
        }
    }

    // Standalone domains. Ones directly preceded by `@` were already taken
    // by the handle pass; skipping them stands in for a negative lookbehind.
    for m in bare_domains_regex().find_iter(message) {
        if m.start() > 0 && message.as_bytes()[m.start() - 1] == b'@' {
            continue;
        }
        mentions.push(m.as_str().to_owned());
    }

    let mut seen = HashSet::new();
    let unique: Vec<String> = mentions
        .into_iter()
        .filter(|mention| seen.insert(mention.clone()))
        .collect();

    // A nested name textually contains its parent as a suffix, so naive
    // matching surfaces both; keep only the most specific candidate.
    unique
        .iter()
        .filter(|mention| {
            !unique
                .iter()
                .any(|other| other != *mention && other.ends_with(&format!(".{mention}")))
        })
        .cloned()
        .collect()
}

//! Shortened-address matching against a group member list.

use std::sync::OnceLock;

use regex::Regex;

static PREFIX_SUFFIX: OnceLock<Regex> = OnceLock::new();

fn prefix_suffix_regex() -> &'static Regex {
    PREFIX_SUFFIX
        .get_or_init(|| Regex::new(r"^(0x[a-fA-F0-9]+)(?:…|\.{2,3})([a-fA-F0-9]+)$").unwrap())
}

/// Matches a shortened display form like `0xabc5…f002` against a list of
/// full addresses by case-insensitive prefix/suffix containment.
///
/// The first member satisfying both ends wins; members sharing the same
/// prefix and suffix are not disambiguated.
#[must_use]
pub fn match_shortened_address(shortened: &str, full_addresses: &[String]) -> Option<String> {
    let caps = prefix_suffix_regex().captures(shortened)?;
    let prefix = caps[1].to_lowercase();
    let suffix = caps[2].to_lowercase();

    full_addresses
        .iter()
        .find(|address| {
            let normalized = address.to_lowercase();
            normalized.starts_with(&prefix) && normalized.ends_with(&suffix)
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::match_shortened_address;

    fn members(addresses: &[&str]) -> Vec<String> {
        addresses.iter().map(|a| (*a).to_owned()).collect()
    }

    #[test]
    fn matches_case_insensitively() {
        let list = members(&["0xABCDEF0000000000000000000000000000001234"]);
        assert_eq!(
            match_shortened_address("0xabcd…1234", &list).as_deref(),
            Some("0xABCDEF0000000000000000000000000000001234")
        );
    }

    #[test]
    fn two_and_three_dot_forms_match() {
        let list = members(&["0xabcdef0000000000000000000000000000001234"]);
        assert!(match_shortened_address("0xabc..1234", &list).is_some());
        assert!(match_shortened_address("0xabc...1234", &list).is_some());
    }

    #[test]
    fn no_match_returns_none() {
        let list = members(&["0xffffff0000000000000000000000000000000000"]);
        assert_eq!(match_shortened_address("0xabcd…1234", &list), None);
    }

    #[test]
    fn malformed_shortened_form_returns_none() {
        let list = members(&["0xabcdef0000000000000000000000000000001234"]);
        assert_eq!(match_shortened_address("0xabcd.1234", &list), None);
        assert_eq!(match_shortened_address("abcd…1234", &list), None);
    }

    #[test]
    fn first_match_wins_on_ambiguity() {
        let list = members(&[
            "0xabcd000000000000000000000000000000001234",
            "0xabcd111111111111111111111111111111111234",
        ]);
        assert_eq!(
            match_shortened_address("0xabcd…1234", &list).as_deref(),
            Some("0xabcd000000000000000000000000000000001234")
        );
    }
}

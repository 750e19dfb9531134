// URL classification - platform detection and canonical id extraction

use regex::Regex;

use super::models::Platform;

const SHORT_FORM_DOMAINS: &[&str] = &["tiktok.com"];
const STREAM_INDEXED_DOMAINS: &[&str] = &["youtube.com", "youtu.be"];

lazy_static::lazy_static! {
    // Checked in order; the first rule that matches wins.
    static ref ID_RULES: Vec<Regex> = vec![
        Regex::new(r"v=([0-9A-Za-z_-]{11})").unwrap(),
        Regex::new(r"youtu\.be/([0-9A-Za-z_-]{11})").unwrap(),
        Regex::new(r"(?:embed|shorts)/([0-9A-Za-z_-]{11})").unwrap(),
        Regex::new(r"/([0-9A-Za-z_-]{11})").unwrap(),
        Regex::new(r"^([0-9A-Za-z_-]{11})$").unwrap(),
    ];
}

/// Map a raw URL to its platform family
pub fn classify(url: &str) -> Platform {
    let lower = url.to_lowercase();

    if SHORT_FORM_DOMAINS.iter().any(|d| lower.contains(d)) {
        Platform::ShortForm
    } else if STREAM_INDEXED_DOMAINS.iter().any(|d| lower.contains(d)) {
        Platform::StreamIndexed
    } else {
        Platform::Generic
    }
}

/// Extract the 11-character video id from a watch, short-link, embed or shorts URL
///
/// A bare 11-character token is accepted as an id on its own.
pub fn extract_canonical_id(url: &str) -> Option<String> {
    let trimmed = url.trim();

    ID_RULES.iter().find_map(|rule| {
        rule.captures(trimmed)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

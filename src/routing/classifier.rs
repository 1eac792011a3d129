//! URL classification.
//!
//! # Responsibilities
//! - Parse absolute and relative URLs
//! - Extract the host used for domain lookup
//! - Split the path into non-empty segments
//! - Decode the query string, repeated keys becoming lists
//!
//! # Design Decisions
//! - Input without a scheme is a path on the default host, even when it starts with `//`
//! - Paths are split as written: no dot-segment removal, no re-encoding
//! - Host keeps a non-default port (`host:port`) so it never aliases the bare host
//! - URLs that cannot carry a path (`mailto:`, `tel:`) get an empty host
//! - A query key without a value decodes to an empty string

use std::borrow::Cow;
use std::collections::btree_map::Entry;

use url::{form_urlencoded, Url};

use crate::routing::table::{ParamValue, Params};

/// A URL broken into the parts the dispatcher needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedUrl {
    pub host: String,
    pub path_segments: Vec<String>,
    pub query_params: Params,
}

/// Classify `raw`; input without a scheme is routed on `default_host`.
pub fn classify(raw: &str, default_host: &str) -> Result<ClassifiedUrl, url::ParseError> {
    let raw = raw.trim();
    let Some(colon) = scheme_len(raw) else {
        return Ok(from_reference(default_host.to_string(), raw));
    };

    // Absolute URLs still go through the parser for host validation and normalization.
    let parsed = Url::parse(raw)?;
    if parsed.cannot_be_a_base() {
        return Ok(ClassifiedUrl {
            host: String::new(),
            path_segments: Vec::new(),
            query_params: parse_query(parsed.query_pairs()),
        });
    }

    let host = match (parsed.host_str().filter(|h| !h.is_empty()), parsed.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => default_host.to_string(),
    };

    match raw[colon + 1..].strip_prefix("//") {
        Some(after_slashes) => {
            let authority_end = after_slashes
                .find(|c: char| matches!(c, '/' | '?' | '#'))
                .unwrap_or(after_slashes.len());
            Ok(from_reference(host, &after_slashes[authority_end..]))
        }
        // `http:path` style input: only the parser knows where the path starts.
        None => Ok(ClassifiedUrl {
            host,
            path_segments: parsed
                .path_segments()
                .map(split_segments)
                .unwrap_or_default(),
            query_params: parse_query(parsed.query_pairs()),
        }),
    }
}

/// Length of the leading `scheme` in `scheme:...`, if there is one.
fn scheme_len(raw: &str) -> Option<usize> {
    let end = raw.find(|c: char| matches!(c, ':' | '/' | '?' | '#'))?;
    if !raw[end..].starts_with(':') {
        return None;
    }
    let scheme = &raw[..end];
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(end)
}

/// Split `path?query#fragment` taken verbatim from the input.
fn from_reference(host: String, reference: &str) -> ClassifiedUrl {
    let reference = reference
        .split_once('#')
        .map_or(reference, |(before, _)| before);
    let (path, query) = match reference.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (reference, None),
    };

    ClassifiedUrl {
        host,
        path_segments: split_segments(path.split('/')),
        query_params: query
            .map(|q| parse_query(form_urlencoded::parse(q.as_bytes())))
            .unwrap_or_default(),
    }
}

fn split_segments<'a>(segments: impl Iterator<Item = &'a str>) -> Vec<String> {
    segments
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_query<'a>(pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> Params {
    let mut params = Params::new();
    for (key, value) in pairs {
        let value = value.into_owned();
        match params.entry(key.into_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(ParamValue::Text(value));
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                ParamValue::List(values) => values.push(value),
                ParamValue::Text(first) => {
                    let first = std::mem::take(first);
                    slot.insert(ParamValue::List(vec![first, value]));
                }
            },
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "artsy.net";

    #[test]
    fn test_absolute_url() {
        let url = classify("https://www.artsy.net/artist/banksy?sort=-date", DEFAULT).unwrap();
        assert_eq!(url.host, "www.artsy.net");
        assert_eq!(url.path_segments, vec!["artist", "banksy"]);
        assert_eq!(url.query_params.get("sort"), Some(&ParamValue::from("-date")));
    }

    #[test]
    fn test_relative_url_uses_default_host() {
        let url = classify("/my-bids?ref=email", DEFAULT).unwrap();
        assert_eq!(url.host, DEFAULT);
        assert_eq!(url.path_segments, vec!["my-bids"]);
        assert_eq!(url.query_params.get("ref"), Some(&ParamValue::from("email")));
    }

    #[test]
    fn test_repeated_and_trailing_slashes_dropped() {
        let url = classify("https://artsy.net//fair///123/artworks/", DEFAULT).unwrap();
        assert_eq!(url.path_segments, vec!["fair", "123", "artworks"]);

        let root = classify("https://artsy.net/", DEFAULT).unwrap();
        assert!(root.path_segments.is_empty());
    }

    #[test]
    fn test_repeated_query_keys_become_list() {
        let url = classify("/search?q=a&q=b&q=c&page=2", DEFAULT).unwrap();
        assert_eq!(
            url.query_params.get("q"),
            Some(&ParamValue::List(vec!["a".into(), "b".into(), "c".into()]))
        );
        assert_eq!(url.query_params.get("page"), Some(&ParamValue::from("2")));
    }

    #[test]
    fn test_query_values_are_decoded() {
        let url = classify("/search?term=andy%20warhol&x=a+b", DEFAULT).unwrap();
        assert_eq!(url.query_params.get("term"), Some(&ParamValue::from("andy warhol")));
        assert_eq!(url.query_params.get("x"), Some(&ParamValue::from("a b")));
    }

    #[test]
    fn test_no_query_is_empty() {
        let url = classify("/sales", DEFAULT).unwrap();
        assert!(url.query_params.is_empty());
    }

    #[test]
    fn test_host_is_lowercased_and_keeps_port() {
        let url = classify("https://ARTSY.net/sales", DEFAULT).unwrap();
        assert_eq!(url.host, "artsy.net");

        let url = classify("http://artsy.net:8080/sales", DEFAULT).unwrap();
        assert_eq!(url.host, "artsy.net:8080");
    }

    #[test]
    fn test_opaque_url_has_empty_host() {
        let url = classify("mailto:support@artsy.net", DEFAULT).unwrap();
        assert_eq!(url.host, "");
        assert!(url.path_segments.is_empty());
    }

    #[test]
    fn test_leading_double_slash_is_a_path() {
        let url = classify("//fair/123/artworks", DEFAULT).unwrap();
        assert_eq!(url.host, DEFAULT);
        assert_eq!(url.path_segments, vec!["fair", "123", "artworks"]);
    }

    #[test]
    fn test_dot_segments_are_kept() {
        let url = classify("/artist/../sales", DEFAULT).unwrap();
        assert_eq!(url.path_segments, vec!["artist", "..", "sales"]);

        let url = classify("/artist/%2e%2e/sales", DEFAULT).unwrap();
        assert_eq!(url.path_segments, vec!["artist", "%2e%2e", "sales"]);

        let url = classify("https://artsy.net/artist/./x/../sales", DEFAULT).unwrap();
        assert_eq!(url.path_segments, vec!["artist", ".", "x", "..", "sales"]);
    }

    #[test]
    fn test_fragment_is_ignored() {
        let url = classify("/artist/banksy?tab=works#bio", DEFAULT).unwrap();
        assert_eq!(url.path_segments, vec!["artist", "banksy"]);
        assert_eq!(url.query_params.get("tab"), Some(&ParamValue::from("works")));

        let url = classify("https://artsy.net/sales#top", DEFAULT).unwrap();
        assert_eq!(url.path_segments, vec!["sales"]);
        assert!(url.query_params.is_empty());
    }

    #[test]
    fn test_app_scheme_without_host() {
        let url = classify("artsy:///artwork/some-work?ref=push", DEFAULT).unwrap();
        assert_eq!(url.host, DEFAULT);
        assert_eq!(url.path_segments, vec!["artwork", "some-work"]);
        assert_eq!(url.query_params.get("ref"), Some(&ParamValue::from("push")));
    }

    #[test]
    fn test_key_without_value_is_empty_string() {
        let url = classify("/sales?flag&x=1", DEFAULT).unwrap();
        assert_eq!(url.query_params.get("flag"), Some(&ParamValue::from("")));
        assert_eq!(url.query_params.get("x"), Some(&ParamValue::from("1")));
    }

    #[test]
    fn test_scheme_detection() {
        assert_eq!(scheme_len("https://artsy.net"), Some(5));
        assert_eq!(scheme_len("mailto:a@b.c"), Some(6));
        assert_eq!(scheme_len("/artist/a:b"), None);
        assert_eq!(scheme_len("//fair/1"), None);
        assert_eq!(scheme_len("1http://x"), None);
    }

    #[test]
    fn test_invalid_url_is_error() {
        assert!(classify("http://[::1", DEFAULT).is_err());
    }
}

//! Percent-encoding detection and escaping for URI components.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::borrow::Cow;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Characters escaped in query and fragment components.
///
/// Everything outside RFC 3986 `pchar / "/" / "?"`. Includes `%`, so text
/// escaped with this set is never interpreted as pre-encoded.
const QUERY_FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters escaped in path components.
const PATH: &AsciiSet = &QUERY_FRAGMENT.add(b'?');

/// The parts of a URI that may carry percent-encoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Component {
    Path,
    Query,
    Fragment,
}

impl Component {
    fn escape_set(self) -> &'static AsciiSet {
        match self {
            Component::Path => PATH,
            Component::Query | Component::Fragment => QUERY_FRAGMENT,
        }
    }

    fn is_allowed(self, byte: u8) -> bool {
        byte.is_ascii_alphanumeric()
            || b"-._~!$&'()*+,;=:@/".contains(&byte)
            || (byte == b'?' && self != Component::Path)
    }
}

/// A component that is not a valid fully-encoded string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{component:?} is not fully encoded: invalid character at byte {position}")]
pub(crate) struct MalformedEncoding {
    pub component: Component,
    pub position: usize,
}

/// Check that `raw` only holds characters legal for `component` and that
/// every `%` starts a two-digit hex escape.
pub(crate) fn verify_encoded(raw: &str, component: Component) -> Result<(), MalformedEncoding> {
    let bytes = raw.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if byte == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(MalformedEncoding {
                    component,
                    position: i,
                });
            }
            i += 3;
            continue;
        }
        if !component.is_allowed(byte) {
            return Err(MalformedEncoding {
                component,
                position: i,
            });
        }
        i += 1;
    }

    Ok(())
}

/// Escape every character not legal for `component`, `%` included.
pub(crate) fn encode(raw: &str, component: Component) -> Cow<'_, str> {
    utf8_percent_encode(raw, component.escape_set()).into()
}

/// Whether the raw path, query, or fragment of `uri` is percent-encoded.
///
/// A `%` anywhere makes the URI a candidate; it only counts as encoded if
/// every component then passes strict validation. Partially encoded URIs
/// are reported as unencoded.
///
/// # Arguments
///
/// * `uri` - The request URI; its raw (serialized) components are inspected
///
/// # Returns
///
/// `true` if the URI should be rebuilt keeping its components verbatim,
/// `false` if they should be escaped afresh.
pub fn contains_encoded_parts(uri: &Url) -> bool {
    let components = [
        (Some(uri.path()), Component::Path),
        (uri.query(), Component::Query),
        (uri.fragment(), Component::Fragment),
    ];

    let has_percent = components
        .iter()
        .any(|(raw, _)| raw.is_some_and(|raw| raw.contains('%')));
    if !has_percent {
        return false;
    }

    for (raw, component) in components {
        let Some(raw) = raw else { continue };
        if let Err(e) = verify_encoded(raw, component) {
            debug!(uri = %uri, error = %e, "treating partially encoded uri as unencoded");
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_plain_uri_is_not_encoded() {
        assert!(!contains_encoded_parts(&url("http://gateway/api/users?x=1#top")));
    }

    #[test]
    fn test_valid_escape_in_query_is_encoded() {
        assert!(contains_encoded_parts(&url("http://gateway/search?q=a%20b")));
    }

    #[test]
    fn test_valid_escape_in_path_is_encoded() {
        assert!(contains_encoded_parts(&url("http://gateway/files/a%2Fb")));
    }

    #[test]
    fn test_valid_escape_in_fragment_is_encoded() {
        assert!(contains_encoded_parts(&url("http://gateway/doc#sec%C3%A9")));
    }

    #[test]
    fn test_stray_percent_is_not_encoded() {
        assert!(!contains_encoded_parts(&url("http://gateway/search?q=100%")));
    }

    #[test]
    fn test_bad_hex_is_not_encoded() {
        assert!(!contains_encoded_parts(&url("http://gateway/search?q=%zz")));
    }

    #[test]
    fn test_partial_encoding_is_not_encoded() {
        // The path escape is valid but the query brace is not legal raw text.
        assert!(!contains_encoded_parts(&url("http://gateway/a%20b?q={x}")));
    }

    #[test]
    fn test_verify_reports_position() {
        let err = verify_encoded("abc%2", Component::Query).unwrap_err();
        assert_eq!(err.position, 3);
        assert_eq!(err.component, Component::Query);
    }

    #[test]
    fn test_question_mark_legal_in_query_only() {
        assert!(verify_encoded("a?b", Component::Query).is_ok());
        assert!(verify_encoded("a?b", Component::Fragment).is_ok());
        assert!(verify_encoded("a?b", Component::Path).is_err());
    }

    #[test]
    fn test_encode_escapes_percent() {
        assert_eq!(encode("q=100%", Component::Query), "q=100%25");
        assert_eq!(encode("a%20b", Component::Path), "a%2520b");
    }

    #[test]
    fn test_encode_keeps_legal_characters() {
        assert_eq!(encode("/api/users", Component::Path), "/api/users");
        assert_eq!(encode("x=1&y=2", Component::Query), "x=1&y=2");
    }

    #[test]
    fn test_encode_escapes_non_ascii_and_braces() {
        assert_eq!(encode("é", Component::Fragment), "%C3%A9");
        assert_eq!(encode("{x}", Component::Query), "%7Bx%7D");
    }
}

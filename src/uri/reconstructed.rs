//! The result of a URI rewrite.

use std::borrow::Cow;
use std::fmt;
use url::{Position, Url};

/// A request URI aimed at a chosen instance, together with its resolved port.
///
/// `url::Url` elides a port equal to its scheme's default, so the port is
/// carried alongside and [`fmt::Display`] always writes it out
/// (`https://10.0.0.5:443/api`). [`ReconstructedUri::url`] of an unchanged
/// result is the caller's original value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedUri<'a> {
    uri: Cow<'a, Url>,
    port: u16,
}

impl<'a> ReconstructedUri<'a> {
    pub(crate) fn unchanged(original: &'a Url, port: u16) -> Self {
        Self {
            uri: Cow::Borrowed(original),
            port,
        }
    }

    pub(crate) fn rewritten(uri: Url, port: u16) -> Self {
        Self {
            uri: Cow::Owned(uri),
            port,
        }
    }

    /// Whether this is the original URI handed back by reference.
    pub fn is_unchanged(&self) -> bool {
        matches!(self.uri, Cow::Borrowed(_))
    }

    pub fn url(&self) -> &Url {
        &self.uri
    }

    /// Port to dispatch to. Always concrete, even where [`Url::port`] is `None`.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Detach from the original URI's lifetime.
    pub fn into_owned(self) -> ReconstructedUri<'static> {
        ReconstructedUri {
            uri: Cow::Owned(self.uri.into_owned()),
            port: self.port,
        }
    }
}

impl fmt::Display for ReconstructedUri<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let uri: &Url = &self.uri;
        if uri.port().is_some() || !uri.has_host() {
            return f.write_str(uri.as_str());
        }

        write!(
            f,
            "{}:{}{}",
            &uri[..Position::AfterHost],
            self.port,
            &uri[Position::BeforePath..]
        )
    }
}

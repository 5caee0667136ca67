//! Rewriting request URIs to target a chosen instance.

use super::encoding::{Component, contains_encoded_parts, encode};
use super::{ReconstructError, ReconstructedUri};
use crate::instance::{ServiceInstance, bracket_host};
use std::borrow::Cow;
use tracing::debug;
use url::{Host, Url};

const DEFAULT_SCHEME: &str = "http";

const DEFAULT_SECURE_SCHEME: &str = "https";

/// Insecure schemes and their secure counterparts.
const INSECURE_SCHEME_MAPPINGS: &[(&str, &str)] =
    &[(DEFAULT_SCHEME, DEFAULT_SECURE_SCHEME), ("ws", "wss")];

fn secure_counterpart(scheme: &str) -> Option<&'static str> {
    INSECURE_SCHEME_MAPPINGS
        .iter()
        .find(|(insecure, _)| *insecure == scheme)
        .map(|(_, secure)| *secure)
}

/// Scheme to dispatch with: the instance's own, else the request's,
/// upgraded to its secure counterpart for secure instances.
pub fn resolve_scheme<'a>(instance: &'a ServiceInstance, original: &'a Url) -> &'a str {
    if let Some(scheme) = &instance.scheme {
        return scheme;
    }

    let original_or_default = match original.scheme() {
        "" => DEFAULT_SCHEME,
        scheme => scheme,
    };
    if instance.secure {
        if let Some(secure) = secure_counterpart(original_or_default) {
            return secure;
        }
    }
    original_or_default
}

/// Port to dispatch to. An unset port becomes 443 for `https` and 80 for
/// everything else, `wss` included.
pub fn resolve_port(port: Option<u16>, scheme: &str) -> u16 {
    match port {
        Some(port) => port,
        None if scheme == DEFAULT_SECURE_SCHEME => 443,
        None => 80,
    }
}

/// Whether `original` already names `host`.
///
/// `Url` stores hosts normalized (lowercase, punycode), so the instance host
/// goes through the same parsing before comparing.
fn same_host(original: &Url, host: &str) -> bool {
    let Some(original_host) = original.host() else {
        return false;
    };
    if original.host_str() == Some(host) {
        return true;
    }

    match Host::parse(host) {
        Ok(parsed) => parsed == original_host.to_owned(),
        Err(_) => false,
    }
}

/// Rewrite `original` so it targets `instance`.
///
/// Only scheme, host and port change; user info, path, query and fragment
/// are carried over, re-escaped only when they are not validly encoded.
///
/// # Arguments
///
/// * `instance` - The chosen service instance
/// * `original` - The request URI as the caller issued it
///
/// # Returns
///
/// The URI to dispatch to with its resolved port. When host, port and
/// scheme already match, it borrows `original` itself
/// ([`ReconstructedUri::is_unchanged`]). Fails if the rebuilt text is not a
/// valid URI, e.g. for an unusable instance host.
pub fn reconstruct<'a>(
    instance: &ServiceInstance,
    original: &'a Url,
) -> Result<ReconstructedUri<'a>, ReconstructError> {
    let host = bracket_host(&instance.host);
    let scheme = resolve_scheme(instance, original);
    let port = resolve_port(instance.port, scheme);

    if same_host(original, &host)
        && original.port_or_known_default() == Some(port)
        && original.scheme() == scheme
    {
        debug!(uri = %original, "instance matches request, uri unchanged");
        return Ok(ReconstructedUri::unchanged(original, port));
    }

    let encoded = contains_encoded_parts(original);
    let rebuilt = rebuild(original, scheme, &host, port, encoded)?;
    let rebuilt = ReconstructedUri::rewritten(rebuilt, port);
    debug!(from = %original, to = %rebuilt, encoded, "reconstructed uri");

    Ok(rebuilt)
}

fn rebuild(
    original: &Url,
    scheme: &str,
    host: &str,
    port: u16,
    encoded: bool,
) -> Result<Url, ReconstructError> {
    let mut target = String::with_capacity(original.as_str().len() + host.len() + scheme.len());
    target.push_str(scheme);
    target.push_str("://");

    if !original.username().is_empty() || original.password().is_some() {
        target.push_str(original.username());
        if let Some(password) = original.password() {
            target.push(':');
            target.push_str(password);
        }
        target.push('@');
    }
    target.push_str(host);
    target.push(':');
    target.push_str(&port.to_string());

    let path = original.path();
    if !path.is_empty() && !path.starts_with('/') {
        target.push('/');
    }
    target.push_str(&component(path, Component::Path, encoded));

    if let Some(query) = original.query() {
        target.push('?');
        target.push_str(&component(query, Component::Query, encoded));
    }
    if let Some(fragment) = original.fragment() {
        target.push('#');
        target.push_str(&component(fragment, Component::Fragment, encoded));
    }

    Url::parse(&target).map_err(|source| ReconstructError::InvalidUri {
        uri: target,
        source,
    })
}

/// Raw text kept as-is when the URI is already encoded, escaped otherwise.
fn component(raw: &str, kind: Component, encoded: bool) -> Cow<'_, str> {
    if encoded {
        Cow::Borrowed(raw)
    } else {
        encode(raw, kind)
    }
}

//! Resolved service endpoints.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A concrete network endpoint chosen to serve a logical service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceInstance {
    /// Logical service this instance belongs to
    #[serde(default)]
    pub service_id: String,

    /// Unique id of this instance within its service
    #[serde(default)]
    pub instance_id: Option<String>,

    /// Host name or IP literal
    pub host: String,

    /// Port, or `None` to infer it from the scheme
    #[serde(default)]
    pub port: Option<u16>,

    /// Scheme to dispatch with, or `None` to infer it from the request
    #[serde(default)]
    pub scheme: Option<String>,

    /// Whether the instance expects a secure transport
    #[serde(default)]
    pub secure: bool,

    /// Free-form instance metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ServiceInstance {
    /// Create an insecure instance with no port or scheme.
    pub fn new(service_id: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            instance_id: None,
            host: host.into(),
            port: None,
            scheme: None,
            secure: false,
            metadata: HashMap::new(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_instance_id(mut self, id: impl Into<String>) -> Self {
        self.instance_id = Some(id.into());
        self
    }

    /// Base URI of this instance, e.g. `https://10.0.0.5:8443`.
    ///
    /// Without an explicit scheme, `https` is used for secure instances and
    /// `http` otherwise. Without a port, the scheme's default is used.
    pub fn uri(&self) -> String {
        let scheme = match &self.scheme {
            Some(scheme) => scheme.as_str(),
            None if self.secure => "https",
            None => "http",
        };
        let port = self
            .port
            .unwrap_or(if scheme == "https" { 443 } else { 80 });
        format!("{}://{}:{}", scheme, bracket_host(&self.host), port)
    }
}

impl fmt::Display for ServiceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", bracket_host(&self.host), port),
            None => write!(f, "{}", bracket_host(&self.host)),
        }
    }
}

/// Wrap bare IPv6 literals in brackets so they can appear in a URI authority.
pub(crate) fn bracket_host(host: &str) -> std::borrow::Cow<'_, str> {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]", host).into()
    } else {
        host.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_defaults_to_http_80() {
        let instance = ServiceInstance::new("users", "10.0.0.1");
        assert_eq!(instance.uri(), "http://10.0.0.1:80");
    }

    #[test]
    fn test_uri_secure_defaults_to_https_443() {
        let instance = ServiceInstance::new("users", "10.0.0.1").with_secure(true);
        assert_eq!(instance.uri(), "https://10.0.0.1:443");
    }

    #[test]
    fn test_uri_explicit_scheme_and_port() {
        let instance = ServiceInstance::new("chat", "chat.internal")
            .with_scheme("ws")
            .with_port(9000);
        assert_eq!(instance.uri(), "ws://chat.internal:9000");
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let instance = ServiceInstance::new("users", "::1").with_port(8080);
        assert_eq!(instance.uri(), "http://[::1]:8080");
        assert_eq!(instance.to_string(), "[::1]:8080");
    }

    #[test]
    fn test_deserialize_minimal() {
        let instance: ServiceInstance = serde_yaml::from_str("host: 10.0.0.2").unwrap();
        assert_eq!(instance.host, "10.0.0.2");
        assert_eq!(instance.port, None);
        assert_eq!(instance.scheme, None);
        assert!(!instance.secure);
        assert!(instance.metadata.is_empty());
    }
}

//! Request attributes handed to context-aware balancers.

use crate::util::RequestId;

/// What a balancer may know about the request being routed.
///
/// The client passes this through untouched; only strategies that route on
/// request attributes look inside.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Id used to correlate log lines for this request
    pub request_id: RequestId,

    /// Routing hint, e.g. a preferred instance id
    pub hint: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an id issued upstream, e.g. from an `X-Request-Id` header.
    pub fn with_request_id(mut self, id: impl Into<RequestId>) -> Self {
        self.request_id = id.into();
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_gets_fresh_id() {
        let a = RequestContext::new();
        let b = RequestContext::new();
        assert_ne!(a.request_id, b.request_id);
        assert!(a.hint.is_none());
    }

    #[test]
    fn test_upstream_request_id_is_kept() {
        let context = RequestContext::new()
            .with_request_id("abc-123")
            .with_hint("users-1");
        assert_eq!(context.request_id.as_str(), "abc-123");
        assert_eq!(context.hint.as_deref(), Some("users-1"));
    }
}

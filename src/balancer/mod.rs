//! Instance selection: balancer trait, outcomes, and the service registry.

mod context;
mod registry;
mod round_robin;

pub use context::RequestContext;
pub use registry::{BalancerRegistry, ServiceRegistry};
pub use round_robin::RoundRobinBalancer;

use crate::instance::ServiceInstance;
use async_trait::async_trait;

/// Outcome of choosing an instance for a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// An instance was chosen.
    Chosen(ServiceInstance),
    /// No instance is available. This is an expected outcome, not an error.
    Empty,
}

impl Selection {
    pub fn is_chosen(&self) -> bool {
        matches!(self, Selection::Chosen(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }

    /// Borrow the chosen instance, if any.
    pub fn instance(&self) -> Option<&ServiceInstance> {
        match self {
            Selection::Chosen(instance) => Some(instance),
            Selection::Empty => None,
        }
    }

    pub fn into_instance(self) -> Option<ServiceInstance> {
        match self {
            Selection::Chosen(instance) => Some(instance),
            Selection::Empty => None,
        }
    }
}

impl From<Option<ServiceInstance>> for Selection {
    fn from(instance: Option<ServiceInstance>) -> Self {
        instance.map_or(Selection::Empty, Selection::Chosen)
    }
}

/// Strategy that picks one instance of a service.
///
/// Implementations may suspend (e.g. to refresh their instance list); any
/// timeout or cancellation policy belongs to the implementation.
#[async_trait]
pub trait Balancer: Send + Sync {
    /// Choose an instance without request context.
    async fn choose(&self) -> Selection;

    /// Choose an instance using attributes of the request being routed.
    ///
    /// Strategies that do not need the request fall back to [`Balancer::choose`].
    async fn choose_with(&self, _context: &RequestContext) -> Selection {
        self.choose().await
    }
}

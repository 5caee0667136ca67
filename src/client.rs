//! Load-balancing client: choose an instance, then rewrite the request for it.

use crate::balancer::{BalancerRegistry, RequestContext, Selection};
use crate::instance::ServiceInstance;
use crate::uri::{self, ReconstructError, ReconstructedUri};
use thiserror::Error;
use tracing::{Instrument, debug, debug_span};
use url::Url;

/// Errors returned by [`LoadBalancerClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("service instance cannot be empty")]
    InvalidArgument,

    #[error(transparent)]
    Reconstruct(#[from] ReconstructError),
}

/// Routes requests for logical services to concrete instances.
///
/// The client holds no state of its own: which balancer serves a service is
/// decided by the registry, and how an instance is picked is decided by the
/// balancer.
pub struct LoadBalancerClient<R> {
    registry: R,
}

impl<R: BalancerRegistry> LoadBalancerClient<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Choose an instance of a service.
    ///
    /// # Arguments
    ///
    /// * `service_id` - Logical service to route to
    ///
    /// # Returns
    ///
    /// The balancer's choice, or [`Selection::Empty`] right away when no
    /// balancer is registered for the service.
    pub async fn choose(&self, service_id: &str) -> Selection {
        let Some(balancer) = self.registry.balancer(service_id) else {
            debug!(service = service_id, "no balancer registered for service");
            return Selection::Empty;
        };

        balancer
            .choose()
            .instrument(debug_span!("choose", service = service_id))
            .await
    }

    /// Choose an instance of a service, letting the balancer inspect the request.
    ///
    /// # Arguments
    ///
    /// * `service_id` - Logical service to route to
    /// * `context` - Request attributes, passed to the balancer unchanged
    ///
    /// # Returns
    ///
    /// The balancer's choice, or [`Selection::Empty`] right away when no
    /// balancer is registered for the service.
    pub async fn choose_with(&self, service_id: &str, context: &RequestContext) -> Selection {
        let Some(balancer) = self.registry.balancer(service_id) else {
            debug!(
                service = service_id,
                request_id = %context.request_id,
                "no balancer registered for service"
            );
            return Selection::Empty;
        };

        balancer
            .choose_with(context)
            .instrument(debug_span!(
                "choose",
                service = service_id,
                request_id = %context.request_id
            ))
            .await
    }

    /// Rewrite a request URI to target an instance.
    ///
    /// # Arguments
    ///
    /// * `instance` - The chosen instance; `None` is rejected
    /// * `original` - The request URI as the caller issued it
    ///
    /// # Returns
    ///
    /// The URI to dispatch to, borrowing `original` when it already targets
    /// the instance. Fails with [`ClientError::InvalidArgument`] when there
    /// is no instance.
    pub fn reconstruct_uri<'a>(
        &self,
        instance: Option<&ServiceInstance>,
        original: &'a Url,
    ) -> Result<ReconstructedUri<'a>, ClientError> {
        let instance = instance.ok_or(ClientError::InvalidArgument)?;
        Ok(uri::reconstruct(instance, original)?)
    }

    /// Choose an instance of a service and rewrite a request URI for it.
    ///
    /// # Arguments
    ///
    /// * `service_id` - Logical service to route to
    /// * `context` - Request attributes, passed to the balancer unchanged
    /// * `original` - The request URI as the caller issued it
    ///
    /// # Returns
    ///
    /// The URI to dispatch to, or `Ok(None)` if no instance was available.
    pub async fn choose_and_reconstruct(
        &self,
        service_id: &str,
        context: &RequestContext,
        original: &Url,
    ) -> Result<Option<ReconstructedUri<'static>>, ClientError> {
        let selection = self.choose_with(service_id, context).await;
        let Some(instance) = selection.instance() else {
            return Ok(None);
        };

        let uri = self.reconstruct_uri(Some(instance), original)?;
        Ok(Some(uri.into_owned()))
    }
}

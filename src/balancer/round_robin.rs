//! Round-robin balancer over a replaceable instance list.

use super::{Balancer, RequestContext, Selection};
use crate::instance::ServiceInstance;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Round-robin balancer.
///
/// Cycles through the instances of one service in order. When the request
/// context carries a hint naming an instance id, that instance is chosen
/// instead, which gives callers simple sticky routing.
pub struct RoundRobinBalancer {
    service_id: String,
    instances: ArcSwap<Vec<ServiceInstance>>,
    counter: AtomicUsize,
}

impl RoundRobinBalancer {
    pub fn new(service_id: impl Into<String>, instances: Vec<ServiceInstance>) -> Self {
        Self {
            service_id: service_id.into(),
            instances: ArcSwap::from_pointee(instances),
            counter: AtomicUsize::new(0),
        }
    }

    /// Snapshot of the current instance list.
    pub fn instances(&self) -> Arc<Vec<ServiceInstance>> {
        self.instances.load_full()
    }

    /// Replace the instance list. In-flight selections keep the old snapshot.
    pub fn update_instances(&self, instances: Vec<ServiceInstance>) {
        debug!(
            service = %self.service_id,
            instances = instances.len(),
            "updated instance list"
        );
        self.instances.store(Arc::new(instances));
    }

    fn next(&self, instances: &[ServiceInstance]) -> Selection {
        if instances.is_empty() {
            warn!(service = %self.service_id, "no instances available for service");
            return Selection::Empty;
        }

        let idx = self.counter.fetch_add(1, Ordering::Relaxed) % instances.len();
        let instance = &instances[idx];
        debug!(service = %self.service_id, instance = %instance, "selected instance");
        Selection::Chosen(instance.clone())
    }
}

#[async_trait]
impl Balancer for RoundRobinBalancer {
    async fn choose(&self) -> Selection {
        let instances = self.instances.load();
        self.next(&instances)
    }

    async fn choose_with(&self, context: &RequestContext) -> Selection {
        let instances = self.instances.load();

        if let Some(hint) = context.hint.as_deref() {
            if let Some(instance) = instances
                .iter()
                .find(|i| i.instance_id.as_deref() == Some(hint))
            {
                debug!(
                    service = %self.service_id,
                    request_id = %context.request_id,
                    instance = %instance,
                    "selected hinted instance"
                );
                return Selection::Chosen(instance.clone());
            }
        }

        self.next(&instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_instances() -> Vec<ServiceInstance> {
        (1..=3)
            .map(|i| {
                ServiceInstance::new("users", format!("10.0.0.{}", i))
                    .with_port(8080)
                    .with_instance_id(format!("users-{}", i))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_round_robin_cycles() {
        let rr = RoundRobinBalancer::new("users", test_instances());
        let instances = test_instances();

        let s1 = rr.choose().await.into_instance().unwrap();
        let s2 = rr.choose().await.into_instance().unwrap();
        let s3 = rr.choose().await.into_instance().unwrap();
        let s4 = rr.choose().await.into_instance().unwrap();

        assert_eq!(s1, instances[0]);
        assert_eq!(s2, instances[1]);
        assert_eq!(s3, instances[2]);
        assert_eq!(s4, instances[0]); // Cycles back
    }

    #[tokio::test]
    async fn test_round_robin_empty() {
        let rr = RoundRobinBalancer::new("users", vec![]);
        assert!(rr.choose().await.is_empty());
        assert!(rr.choose_with(&RequestContext::new()).await.is_empty());
    }

    #[tokio::test]
    async fn test_hint_selects_instance() {
        let rr = RoundRobinBalancer::new("users", test_instances());
        let context = RequestContext::new().with_hint("users-3");

        for _ in 0..3 {
            let chosen = rr.choose_with(&context).await.into_instance().unwrap();
            assert_eq!(chosen.host, "10.0.0.3");
        }
    }

    #[tokio::test]
    async fn test_unknown_hint_falls_back_to_rotation() {
        let rr = RoundRobinBalancer::new("users", test_instances());
        let context = RequestContext::new().with_hint("users-9");

        let chosen = rr.choose_with(&context).await.into_instance().unwrap();
        assert_eq!(chosen.host, "10.0.0.1");
    }

    #[tokio::test]
    async fn test_update_instances() {
        let rr = RoundRobinBalancer::new("users", test_instances());
        rr.update_instances(vec![ServiceInstance::new("users", "10.0.1.1")]);

        assert_eq!(rr.instances().len(), 1);
        let chosen = rr.choose().await.into_instance().unwrap();
        assert_eq!(chosen.host, "10.0.1.1");

        rr.update_instances(vec![]);
        assert!(rr.choose().await.is_empty());
    }
}

//! Lookup of the balancer responsible for a service.

use super::{Balancer, RoundRobinBalancer};
use crate::config::{Config, Strategy};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Maps service ids to their balancers.
pub trait BalancerRegistry: Send + Sync {
    /// The balancer registered for `service_id`, if any.
    fn balancer(&self, service_id: &str) -> Option<Arc<dyn Balancer>>;
}

impl<T: BalancerRegistry + ?Sized> BalancerRegistry for Arc<T> {
    fn balancer(&self, service_id: &str) -> Option<Arc<dyn Balancer>> {
        (**self).balancer(service_id)
    }
}

/// In-process registry that can be populated from configuration and
/// updated while in use.
#[derive(Default)]
pub struct ServiceRegistry {
    balancers: DashMap<String, Arc<dyn Balancer>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry with one balancer per configured service.
    pub fn from_config(config: &Config) -> Self {
        let registry = Self::new();

        for service in &config.services {
            let instances = service
                .instances
                .iter()
                .cloned()
                .map(|mut instance| {
                    if instance.service_id.is_empty() {
                        instance.service_id = service.name.clone();
                    }
                    instance
                })
                .collect();

            let balancer: Arc<dyn Balancer> = match service.strategy {
                Strategy::RoundRobin => Arc::new(RoundRobinBalancer::new(&service.name, instances)),
            };

            info!(
                service = %service.name,
                strategy = ?service.strategy,
                instances = service.instances.len(),
                "registered service"
            );
            registry.register(service.name.clone(), balancer);
        }

        registry
    }

    /// Register `balancer` for `service_id`, returning the one it replaces.
    pub fn register(
        &self,
        service_id: impl Into<String>,
        balancer: Arc<dyn Balancer>,
    ) -> Option<Arc<dyn Balancer>> {
        self.balancers.insert(service_id.into(), balancer)
    }

    /// Remove the balancer for `service_id`.
    pub fn deregister(&self, service_id: &str) -> Option<Arc<dyn Balancer>> {
        let removed = self.balancers.remove(service_id).map(|(_, b)| b);
        if removed.is_some() {
            debug!(service = service_id, "deregistered service");
        }
        removed
    }

    /// Ids of all registered services, sorted.
    pub fn service_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.balancers.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.balancers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balancers.is_empty()
    }
}

impl BalancerRegistry for ServiceRegistry {
    fn balancer(&self, service_id: &str) -> Option<Arc<dyn Balancer>> {
        self.balancers.get(service_id).map(|b| Arc::clone(b.value()))
    }
}

//! lbroute - client-side load-balanced request routing
//!
//! This crate picks a concrete instance for a logical service and rewrites
//! request URIs to target it:
//! - Pluggable balancers behind the [`balancer::Balancer`] trait
//! - A registry mapping service ids to balancers
//! - URI reconstruction with scheme/port inference and encoding preservation
//! - YAML configuration for static service pools

pub mod balancer;
pub mod client;
pub mod config;
pub mod instance;
pub mod uri;
pub mod util;

pub use balancer::{Balancer, BalancerRegistry, RequestContext, Selection, ServiceRegistry};
pub use client::{ClientError, LoadBalancerClient};
pub use config::Config;
pub use instance::ServiceInstance;
pub use uri::ReconstructedUri;

//! Benchmarks for lbroute components.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lbroute::balancer::RoundRobinBalancer;
use lbroute::uri::{contains_encoded_parts, reconstruct};
use lbroute::{LoadBalancerClient, RequestContext, ServiceInstance, ServiceRegistry};
use std::sync::Arc;
use url::Url;

fn benchmark_reconstruct(c: &mut Criterion) {
    let instance = ServiceInstance::new("users", "10.0.0.5")
        .with_port(8443)
        .with_secure(true);
    let plain = Url::parse("http://gateway/api/users?x=1").unwrap();
    let encoded = Url::parse("http://gateway/search?q=a%20b#r%C3%A9sum%C3%A9").unwrap();
    let malformed = Url::parse("http://gateway/discount?q=100%").unwrap();

    let mut group = c.benchmark_group("reconstruct");
    group.bench_function("plain", |b| {
        b.iter(|| black_box(reconstruct(&instance, black_box(&plain))))
    });
    group.bench_function("encoded", |b| {
        b.iter(|| black_box(reconstruct(&instance, black_box(&encoded))))
    });
    group.bench_function("malformed", |b| {
        b.iter(|| black_box(reconstruct(&instance, black_box(&malformed))))
    });
    group.finish();
}

fn benchmark_identity(c: &mut Criterion) {
    let instance = ServiceInstance::new("gateway", "gateway");
    let original = Url::parse("http://gateway/api/users").unwrap();

    c.bench_function("reconstruct_identity", |b| {
        b.iter(|| black_box(reconstruct(&instance, black_box(&original))))
    });
}

fn benchmark_encoded_detection(c: &mut Criterion) {
    let encoded = Url::parse("http://gateway/a%20b/c?q=x%26y&z=%2F#frag%20ment").unwrap();

    c.bench_function("contains_encoded_parts", |b| {
        b.iter(|| black_box(contains_encoded_parts(black_box(&encoded))))
    });
}

fn benchmark_choose_and_reconstruct(c: &mut Criterion) {
    let instances: Vec<ServiceInstance> = (0..10)
        .map(|i| ServiceInstance::new("users", format!("10.0.0.{}", i)).with_port(9000))
        .collect();

    let registry = ServiceRegistry::new();
    registry.register("users", Arc::new(RoundRobinBalancer::new("users", instances)));
    let client = LoadBalancerClient::new(registry);
    let context = RequestContext::new();
    let original = Url::parse("http://users/api/users?x=1").unwrap();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    c.bench_function("choose_and_reconstruct", |b| {
        b.to_async(&runtime).iter(|| async {
            black_box(
                client
                    .choose_and_reconstruct("users", &context, &original)
                    .await
                    .unwrap(),
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_reconstruct,
    benchmark_identity,
    benchmark_encoded_detection,
    benchmark_choose_and_reconstruct
);
criterion_main!(benches);

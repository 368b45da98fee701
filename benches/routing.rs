use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use pkgmeta::router::{RouteMeta, Router};
use std::hint::black_box;

fn registry_router() -> Router {
    let mut router = Router::new();
    for (method, pattern) in [
        (Method::GET, "/heartbeat"),
        (Method::GET, "/api/meta/:scope/:pkg"),
        (Method::POST, "/api/meta/:scope/:pkg"),
        (Method::GET, "/api/meta/:scope/:pkg/versions/:version"),
        (Method::GET, "/api/owners/:owner/packages"),
        (Method::GET, "/api/search"),
    ] {
        router.insert(RouteMeta::new(method, pattern));
    }
    router
}

fn bench_route_match(c: &mut Criterion) {
    let router = registry_router();
    let test_paths = [
        (Method::GET, "/heartbeat"),
        (Method::GET, "/api/meta/acme/widget"),
        (Method::POST, "/api/meta/acme/widget"),
        (Method::GET, "/api/meta/acme/widget/versions/1.2.3"),
        (Method::GET, "/api/does/not/exist"),
    ];
    c.bench_function("route_match", |b| {
        b.iter(|| {
            for (method, path) in &test_paths {
                black_box(router.route(method, path));
            }
        })
    });
}

criterion_group!(benches, bench_route_match);
criterion_main!(benches);

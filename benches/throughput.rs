use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use declarouter::meta::{Description, Endpoints, ParameterSpec, TargetType};
use declarouter::{Dispatcher, Flow, Registrar, Reply, RequestContext, RoutingConfig};
use http::Method;

struct Zoo;

impl Endpoints for Zoo {
    fn prefix(&self) -> &str {
        "zoo"
    }

    fn describe(d: &mut Description<Self>) {
        d.method("animals")
            .get("/animals")
            .handle(|_: &Zoo, _ctx, _args| Ok(Reply::text("animals")));
        d.method("animal")
            .get("/animals/{id}")
            .param(ParameterSpec::path("id").of(TargetType::Integer))
            .handle(|_: &Zoo, _ctx, args| Ok(format!("animal {}", args.integer("id").unwrap_or(0))));
        d.method("animal_v2")
            .get("/animals/{id}")
            .version("2")
            .param(ParameterSpec::path("id").of(TargetType::Integer))
            .handle(|_: &Zoo, _ctx, args| Ok(format!("animal v2 {}", args.integer("id").unwrap_or(0))));
        d.method("toy")
            .get("/animals/{id}/toys/{toy_id}")
            .params([ParameterSpec::path("id"), ParameterSpec::path("toy_id")])
            .handle(|_: &Zoo, _ctx, _args| Ok(Reply::text("toy")));
        d.method("habitat")
            .get("/{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}")
            .params([
                ParameterSpec::path("category"),
                ParameterSpec::path("id"),
                ParameterSpec::path("habitat_id"),
                ParameterSpec::path("section_id"),
            ])
            .handle(|_: &Zoo, _ctx, _args| Ok(Reply::text("section")));
        d.method("feed")
            .post("/animals/{id}/feed")
            .params([
                ParameterSpec::path("id"),
                ParameterSpec::body().of(TargetType::Json),
            ])
            .handle(|_: &Zoo, _ctx, args| Ok(args.json("body").cloned().unwrap_or_default()));
        d.method("count")
            .before_each()
            .intercept(|_: &Zoo, _ctx| Ok(Flow::Continue));
    }
}

fn zoo_dispatcher() -> Dispatcher {
    let mut registrar = Registrar::new();
    registrar.register(Zoo);
    match registrar.build() {
        Ok(table) => Dispatcher::new(table, RoutingConfig::default()),
        Err(err) => panic!("invalid bench registration: {err}"),
    }
}

fn bench_route_match(c: &mut Criterion) {
    let dispatcher = zoo_dispatcher();
    let table = dispatcher.table();
    c.bench_function("route_match", |b| {
        let test_paths = [
            (Method::GET, "/zoo/animals/123"),
            (Method::GET, "/zoo/animals/123/toys/456"),
            (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
            (Method::POST, "/zoo/animals/1/feed"),
            (Method::GET, "/zoo/missing"),
        ];
        b.iter(|| {
            for (method, path) in &test_paths {
                let res = table.router().route(method, path);
                black_box(&res);
            }
        })
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let dispatcher = zoo_dispatcher();
    c.bench_function("dispatch_versioned", |b| {
        b.iter(|| {
            let mut ctx =
                RequestContext::new(Method::GET, "/zoo/animals/42").with_header("X-API-Version", "2");
            black_box(dispatcher.dispatch(&mut ctx));
        })
    });
    c.bench_function("dispatch_json_body", |b| {
        b.iter(|| {
            let mut ctx = RequestContext::new(Method::POST, "/zoo/animals/42/feed")
                .with_body(r#"{"food":"fish","grams":250}"#);
            black_box(dispatcher.dispatch(&mut ctx));
        })
    });
}

criterion_group!(benches, bench_route_match, bench_dispatch);
criterion_main!(benches);

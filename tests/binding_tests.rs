use declarouter::meta::{Description, Endpoints, ParameterSpec, TargetType};
use declarouter::{Arguments, Failure, Outcome, Registrar, Reply, RequestContext};
use http::Method;
use serde::Deserialize;
use serde_json::{json, Value};

mod common;
use common::{dispatcher, get, post};

#[derive(Debug, Deserialize, PartialEq)]
struct NewOrder {
    sku: String,
    quantity: u32,
}

struct Orders;

impl Endpoints for Orders {
    fn prefix(&self) -> &str {
        "orders"
    }

    fn describe(d: &mut Description<Self>) {
        d.method("show")
            .get("/{id}")
            .params([
                ParameterSpec::path("id").of(TargetType::Integer),
                ParameterSpec::query("expand").of(TargetType::Boolean).nullable(),
                ParameterSpec::cookie("session").nullable(),
                ParameterSpec::context(),
            ])
            .handle(|_: &Orders, ctx, args| {
                let id: i64 = args.require("id")?;
                let expand: Option<bool> = args.optional("expand")?;
                Ok(json!({
                    "id": id,
                    "expand": expand,
                    "session": args.text("session"),
                    "template": ctx.matched().map(|m| m.path_template().to_string()),
                }))
            });
        d.method("create")
            .post("")
            .status(201)
            .param(ParameterSpec::body().of(TargetType::Json))
            .handle(|_: &Orders, _ctx, args| {
                let order: NewOrder = args.decode_body()?;
                Ok(format!("{} x{}", order.sku, order.quantity))
            });
        d.method("note")
            .put("/{id}/note")
            .params([
                ParameterSpec::path("id"),
                ParameterSpec::body().nullable(),
            ])
            .handle(|_: &Orders, _ctx, args| {
                Ok(match args.text("body") {
                    Some(note) => format!("{}: {note}", args.text("id").unwrap_or_default()),
                    None => "no note".to_string(),
                })
            });
    }
}

fn json_body(ctx: &RequestContext) -> &Value {
    match ctx.response_body() {
        Reply::Json(value) => value,
        other => panic!("expected json reply, got {other:?}"),
    }
}

fn orders() -> declarouter::Dispatcher {
    let mut registrar = Registrar::new();
    registrar.register(Orders);
    dispatcher(registrar)
}

#[test]
fn test_path_query_and_cookie_parameters_bind() {
    let dispatcher = orders();
    let mut ctx = get("/orders/42?expand=true").with_header("Cookie", "theme=dark; session=s-1");
    assert_eq!(dispatcher.dispatch(&mut ctx), Outcome::Completed);
    assert_eq!(
        json_body(&ctx),
        &json!({
            "id": 42,
            "expand": true,
            "session": "s-1",
            "template": "/orders/{id}",
        })
    );
}

#[test]
fn test_absent_nullable_parameters_bind_as_none() {
    let dispatcher = orders();
    let mut ctx = get("/orders/7");
    dispatcher.dispatch(&mut ctx);
    assert_eq!(json_body(&ctx)["expand"], Value::Null);
    assert_eq!(json_body(&ctx)["session"], Value::Null);
}

#[test]
fn test_conversion_failure_is_bad_request() {
    let dispatcher = orders();
    let mut ctx = get("/orders/abc");
    assert_eq!(dispatcher.dispatch(&mut ctx), Outcome::Fallback);
    assert_eq!(ctx.status(), 400);
    assert_eq!(json_body(&ctx)["kind"], "ParameterBinding");
    assert_eq!(json_body(&ctx)["parameter"], "id");

    let mut bad_flag = get("/orders/1?expand=maybe");
    dispatcher.dispatch(&mut bad_flag);
    assert_eq!(bad_flag.status(), 400);
    assert_eq!(json_body(&bad_flag)["parameter"], "expand");
}

#[test]
fn test_json_body_decodes_into_user_type() {
    let dispatcher = orders();
    let mut ctx = post("/orders")
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"sku":"A-1","quantity":3}"#);
    assert_eq!(dispatcher.dispatch(&mut ctx), Outcome::Completed);
    assert_eq!(ctx.status(), 201);
    assert_eq!(ctx.response_body(), &Reply::text("A-1 x3"));
}

#[test]
fn test_missing_and_malformed_bodies() {
    let dispatcher = orders();

    let mut empty = post("/orders");
    assert_eq!(dispatcher.dispatch(&mut empty), Outcome::Fallback);
    assert_eq!(json_body(&empty)["kind"], "MissingParameter");

    let mut null = post("/orders").with_body("null");
    dispatcher.dispatch(&mut null);
    assert_eq!(json_body(&null)["kind"], "MissingParameter");

    let mut broken = post("/orders").with_body("{not json");
    dispatcher.dispatch(&mut broken);
    assert_eq!(broken.status(), 400);
    assert_eq!(json_body(&broken)["kind"], "ParameterBinding");

    let mut wrong_shape = post("/orders").with_body(r#"{"sku":"A-1"}"#);
    dispatcher.dispatch(&mut wrong_shape);
    assert_eq!(wrong_shape.status(), 400);
    assert_eq!(json_body(&wrong_shape)["kind"], "ParameterBinding");
}

#[test]
fn test_text_body_is_passed_through() {
    let dispatcher = orders();

    let mut ctx = RequestContext::new(Method::PUT, "/orders/9/note").with_body("ship friday");
    dispatcher.dispatch(&mut ctx);
    assert_eq!(ctx.response_body(), &Reply::text("9: ship friday"));

    let mut none = RequestContext::new(Method::PUT, "/orders/9/note");
    dispatcher.dispatch(&mut none);
    assert_eq!(none.response_body(), &Reply::text("no note"));
}

#[test]
fn test_arguments_report_type_mismatches() {
    let ctx = RequestContext::new(Method::GET, "/?n=5");
    let params = [ParameterSpec::query("n").of(TargetType::Integer)];
    let args: Arguments =
        declarouter::binder::bind(&params, &ctx, &declarouter::binder::JsonBodyDeserializer)
            .expect("binds");

    assert_eq!(args.len(), 1);
    let err: Failure = args.require::<bool>("n").expect_err("integer is not a boolean");
    assert_eq!(err.kind().name(), "ParameterBinding");
    let missing = args.require::<i64>("other").expect_err("not declared");
    assert_eq!(missing.kind().name(), "MissingParameter");
}

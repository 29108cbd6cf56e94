use std::sync::Arc;

use http::Method;

use super::{RouteEntry, Router, VersionSource};
use crate::binder::Arguments;
use crate::context::{Reply, RequestContext};
use crate::error::{ConfigurationError, RequestError};
use crate::meta::{EndpointDescriptor, GroupId};

fn descriptor(
    method: Method,
    template: &str,
    versions: &[&str],
    name: &'static str,
) -> Arc<EndpointDescriptor> {
    Arc::new(EndpointDescriptor {
        method,
        path_template: template.to_string(),
        versions: versions.iter().map(|v| (*v).to_string()).collect(),
        params: Vec::new(),
        handler: "Test",
        method_name: name,
        group: GroupId(0),
        success_status: None,
        error_status: None,
        callable: Arc::new(|_ctx: &mut RequestContext, _args: &Arguments| {
            Ok(Reply::Empty)
        }),
    })
}

fn entry(method: Method, template: &str, descriptors: Vec<Arc<EndpointDescriptor>>) -> RouteEntry {
    let mut entry = RouteEntry::new(method, template.to_string());
    for d in descriptors {
        entry.insert(d).expect("distinct aliases");
    }
    entry
}

fn resolved(
    entry: &RouteEntry,
    requested: Option<&str>,
) -> Result<(&'static str, String), RequestError> {
    entry
        .resolve(requested)
        .map(|(d, alias)| (d.method_name, alias.to_string()))
}

#[test]
fn test_exact_alias_wins_over_default() {
    let entry = entry(
        Method::GET,
        "/api/users",
        vec![
            descriptor(Method::GET, "/api/users", &["default"], "list"),
            descriptor(Method::GET, "/api/users", &["v2", "v3"], "list_v2"),
        ],
    );
    assert_eq!(resolved(&entry, Some("v3")), Ok(("list_v2", "v3".to_string())));
    assert_eq!(resolved(&entry, None), Ok(("list", "default".to_string())));
}

#[test]
fn test_unknown_version_falls_back_to_default() {
    let entry = entry(
        Method::GET,
        "/api/users",
        vec![
            descriptor(Method::GET, "/api/users", &["default"], "list"),
            descriptor(Method::GET, "/api/users", &["v2"], "list_v2"),
        ],
    );
    assert_eq!(resolved(&entry, Some("v9")), Ok(("list", "default".to_string())));
}

#[test]
fn test_no_default_and_no_match_is_version_not_found() {
    let entry = entry(
        Method::GET,
        "/api/users",
        vec![descriptor(Method::GET, "/api/users", &["v2"], "list_v2")],
    );
    assert_eq!(
        resolved(&entry, Some("v1")),
        Err(RequestError::VersionNotFound {
            method: Method::GET,
            template: "/api/users".to_string(),
            requested: Some("v1".to_string()),
        })
    );
    assert!(matches!(
        resolved(&entry, None),
        Err(RequestError::VersionNotFound { requested: None, .. })
    ));
}

#[test]
fn test_shared_alias_is_a_duplicate_route() {
    let mut entry = RouteEntry::new(Method::POST, "/api/hello".to_string());
    entry
        .insert(descriptor(Method::POST, "/api/hello", &["v1", "v2"], "a"))
        .expect("first insert");
    let err = entry
        .insert(descriptor(Method::POST, "/api/hello", &["v2"], "b"))
        .expect_err("alias v2 is taken");
    assert_eq!(
        err,
        ConfigurationError::DuplicateRoute {
            method: Method::POST,
            path: "/api/hello".to_string(),
            version: "v2".to_string(),
        }
    );
    assert_eq!(entry.versions().aliases(), vec!["v1", "v2"]);
}

#[test]
fn test_router_matches_method_and_path() {
    let router = Router::new(vec![
        entry(
            Method::GET,
            "/api/users/{id}",
            vec![descriptor(Method::GET, "/api/users/{id}", &["default"], "show")],
        ),
        entry(
            Method::DELETE,
            "/api/users/{id}",
            vec![descriptor(Method::DELETE, "/api/users/{id}", &["default"], "remove")],
        ),
    ]);
    let matched = router.route(&Method::GET, "/api/users/42").expect("route exists");
    assert_eq!(matched.entry.template(), "/api/users/{id}");
    assert_eq!(matched.get_path_param("id"), Some("42"));
    assert!(router.route(&Method::PUT, "/api/users/42").is_none());
    assert!(router.route(&Method::GET, "/api/users").is_none());
    assert_eq!(router.len(), 2);
    assert_eq!(router.allowed_methods("/api/users/42").len(), 2);
}

#[test]
fn test_version_source_reads_header_or_query() {
    let ctx = RequestContext::new(Method::GET, "/x?version=v2&blank=")
        .with_header("x-api-version", " v3 ");
    assert_eq!(VersionSource::default().read(&ctx), Some("v3"));
    assert_eq!(VersionSource::Query("version".into()).read(&ctx), Some("v2"));
    assert_eq!(VersionSource::Query("blank".into()).read(&ctx), None);
    assert_eq!(VersionSource::Header("X-Other".into()).read(&ctx), None);
}

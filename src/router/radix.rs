//! Radix tree for route matching.
//!
//! Paths are split into segments. Static segments match exactly,
//! `{name}` segments match any single segment and capture it. Terminal
//! nodes store one value per HTTP method. Lookup is O(k) in the number of
//! path segments, not the number of routes.
//!
//! Static children are tried before parameter children; when a static
//! branch dead-ends the search backtracks into the parameter branches, so
//! `/users/me` and `/users/{id}/posts` coexist.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use http::Method;

use super::core::ParamVec;
use super::template::{placeholder_name, segments};

struct RadixNode<V> {
    /// The path segment this node represents (without leading /)
    segment: Cow<'static, str>,
    /// Values of terminal nodes, per HTTP method
    routes: HashMap<Method, Arc<V>>,
    /// Parameter name if this segment is a path parameter (e.g., "{id}" -> Some("id"))
    param_name: Option<Arc<str>>,
    children: Vec<RadixNode<V>>,
    /// Parameter children; several names may share a position
    /// (e.g., /users/{id}/posts vs /users/{user_id}/comments)
    param_children: Vec<RadixNode<V>>,
}

impl<V> RadixNode<V> {
    fn new(segment: Cow<'static, str>) -> Self {
        Self {
            segment,
            routes: HashMap::new(),
            param_name: None,
            children: Vec::new(),
            param_children: Vec::new(),
        }
    }

    fn new_param(param_name: &str) -> Self {
        Self {
            param_name: Some(Arc::from(param_name)),
            ..Self::new(Cow::Borrowed(""))
        }
    }

    fn insert(&mut self, segments: &[&str], method: Method, value: Arc<V>) -> Option<Arc<V>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.routes.insert(method, value);
        };

        if let Some(param_name) = placeholder_name(segment) {
            let existing = self
                .param_children
                .iter_mut()
                .find(|child| child.param_name.as_deref() == Some(param_name));
            if let Some(child) = existing {
                return child.insert(remaining, method, value);
            }
            let mut child = RadixNode::new_param(param_name);
            let previous = child.insert(remaining, method, value);
            self.param_children.push(child);
            return previous;
        }

        if let Some(child) = self.children.iter_mut().find(|c| c.segment == *segment) {
            return child.insert(remaining, method, value);
        }
        let mut child = RadixNode::new(Cow::Owned((*segment).to_string()));
        let previous = child.insert(remaining, method, value);
        self.children.push(child);
        previous
    }

    fn search(&self, segments: &[&str], method: &Method, params: &mut ParamVec) -> Option<Arc<V>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.routes.get(method).map(Arc::clone);
        };

        for child in &self.children {
            if child.segment == *segment {
                if let Some(value) = child.search(remaining, method, params) {
                    return Some(value);
                }
            }
        }

        for child in &self.param_children {
            if let Some(name) = &child.param_name {
                params.push((Arc::clone(name), (*segment).to_string()));
                if let Some(value) = child.search(remaining, method, params) {
                    return Some(value);
                }
                // Backtrack
                params.pop();
            }
        }

        None
    }

    fn methods_at(&self, segments: &[&str], found: &mut Vec<Method>) {
        let Some((segment, remaining)) = segments.split_first() else {
            for method in self.routes.keys() {
                if !found.contains(method) {
                    found.push(method.clone());
                }
            }
            return;
        };
        for child in self.children.iter().filter(|c| c.segment == *segment) {
            child.methods_at(remaining, found);
        }
        for child in &self.param_children {
            child.methods_at(remaining, found);
        }
    }
}

/// Radix tree keyed by path template and HTTP method.
pub struct RadixRouter<V> {
    root: RadixNode<V>,
    len: usize,
}

impl<V> Default for RadixRouter<V> {
    fn default() -> Self {
        Self {
            root: RadixNode::new(Cow::Borrowed("")),
            len: 0,
        }
    }
}

impl<V> RadixRouter<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` for `method` at `template`, returning the value it replaced.
    pub fn insert(&mut self, template: &str, method: Method, value: Arc<V>) -> Option<Arc<V>> {
        let segments: Vec<&str> = segments(template).collect();
        let previous = self.root.insert(&segments, method, value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Match a request path, returning the stored value and captured parameters.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<(Arc<V>, ParamVec)> {
        let segments: Vec<&str> = segments(path).collect();
        let mut params = ParamVec::new();
        let value = self.root.search(&segments, method, &mut params)?;
        Some((value, params))
    }

    /// HTTP methods registered for any template matching `path`.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let segments: Vec<&str> = segments(path).collect();
        let mut found = Vec::new();
        self.root.methods_at(&segments, &mut found);
        found
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(routes: &[(Method, &str, &'static str)]) -> RadixRouter<&'static str> {
        let mut router = RadixRouter::new();
        for (method, path, name) in routes {
            router.insert(path, method.clone(), Arc::new(*name));
        }
        router
    }

    fn param<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
        params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_radix_router_simple_route() {
        let router = router(&[(Method::GET, "/health", "health_check")]);
        let (route, params) = router.route(&Method::GET, "/health").expect("matches");
        assert_eq!(*route, "health_check");
        assert!(params.is_empty());
    }

    #[test]
    fn test_radix_router_root_route() {
        let router = router(&[(Method::GET, "/", "index")]);
        let (route, _) = router.route(&Method::GET, "/").expect("matches");
        assert_eq!(*route, "index");
    }

    #[test]
    fn test_radix_router_multiple_parameters() {
        let router = router(&[(Method::GET, "/users/{user_id}/posts/{post_id}", "get_post")]);
        let (route, params) = router
            .route(&Method::GET, "/users/123/posts/456")
            .expect("matches");
        assert_eq!(*route, "get_post");
        assert_eq!(param(&params, "user_id"), Some("123"));
        assert_eq!(param(&params, "post_id"), Some("456"));
    }

    #[test]
    fn test_radix_router_method_filtering() {
        let router = router(&[
            (Method::GET, "/items", "get_items"),
            (Method::POST, "/items", "create_item"),
        ]);
        assert_eq!(router.route(&Method::GET, "/items").map(|r| *r.0), Some("get_items"));
        assert_eq!(router.route(&Method::POST, "/items").map(|r| *r.0), Some("create_item"));
        assert!(router.route(&Method::PUT, "/items").is_none());

        let mut allowed = router.allowed_methods("/items");
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(allowed, vec![Method::GET, Method::POST]);
    }

    #[test]
    fn test_radix_router_no_match() {
        let router = router(&[(Method::GET, "/users/{id}", "get_user")]);
        assert!(router.route(&Method::GET, "/posts/123").is_none());
        assert!(router.route(&Method::GET, "/users/123/extra").is_none());
        assert!(router.route(&Method::GET, "/users").is_none());
    }

    #[test]
    fn test_radix_router_static_beats_param_with_backtracking() {
        let router = router(&[
            (Method::GET, "/users/me", "me"),
            (Method::GET, "/users/{id}", "get_user"),
            (Method::GET, "/users/{id}/posts", "get_user_posts"),
        ]);
        assert_eq!(router.route(&Method::GET, "/users/me").map(|r| *r.0), Some("me"));
        assert_eq!(router.route(&Method::GET, "/users/7").map(|r| *r.0), Some("get_user"));

        let (route, params) = router.route(&Method::GET, "/users/me/posts").expect("matches");
        assert_eq!(*route, "get_user_posts");
        assert_eq!(param(&params, "id"), Some("me"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_radix_router_different_param_names_same_position() {
        let router = router(&[
            (Method::GET, "/users/{user_id}/posts", "get_user_posts"),
            (Method::GET, "/users/{id}/comments", "get_user_comments"),
        ]);

        let (route, params) = router.route(&Method::GET, "/users/123/posts").expect("matches");
        assert_eq!(*route, "get_user_posts");
        assert_eq!(param(&params, "user_id"), Some("123"));
        assert_eq!(param(&params, "id"), None);

        let (route, params) = router
            .route(&Method::GET, "/users/456/comments")
            .expect("matches");
        assert_eq!(*route, "get_user_comments");
        assert_eq!(param(&params, "id"), Some("456"));
        assert_eq!(param(&params, "user_id"), None);
    }

    #[test]
    fn test_radix_router_insert_replaces_and_counts() {
        let mut router = RadixRouter::new();
        assert!(router.insert("/a", Method::GET, Arc::new(1)).is_none());
        assert_eq!(router.insert("/a", Method::GET, Arc::new(2)).map(|v| *v), Some(1));
        assert_eq!(router.len(), 1);
    }
}

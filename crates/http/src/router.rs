//! Router builder for the catalog HTTP server

use axum::{middleware, Router};
use std::{path::Path, time::Duration};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use crate::{method_override::method_override, MakeRequestUuid};

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Merge a module's router at the server root
    pub fn merge_module(mut self, module_name: &str, module_router: Router) -> Self {
        tracing::info!(module = module_name, "mounting module routes");
        self.router = self.router.merge(module_router);
        self
    }

    /// Serve files from `dir` for any path no route matched
    pub fn with_static_dir(mut self, dir: &Path) -> Self {
        self.router = self.router.fallback_service(ServeDir::new(dir));
        self
    }

    /// Wrap everything added so far in the `_method` override.
    ///
    /// Call after all routes are registered; routes added later bypass it.
    pub fn with_method_override(mut self) -> Self {
        self.router = Router::new()
            .fallback_service(self.router)
            .layer(middleware::from_fn(method_override));
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add request ID middleware; the id is echoed on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    /// Add timeout middleware
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        routing::{get, put},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_router_builder_basic() {
        let router = RouterBuilder::new()
            .route("/test", get(|| async { "test" }))
            .build();

        let (status, body) = send(router, get_request("/test")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "test");
    }

    #[tokio::test]
    async fn test_module_merging() {
        let module_router = Router::new().route("/add", get(|| async { "module" }));

        let router = RouterBuilder::new()
            .merge_module("test", module_router)
            .build();

        let (status, body) = send(router, get_request("/add")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "module");
    }

    #[tokio::test]
    async fn test_static_files_served_after_routes() {
        let dir = std::env::temp_dir().join(format!("catalog-static-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("style.css"), "body {}").unwrap();

        let router = RouterBuilder::new()
            .route("/", get(|| async { "index" }))
            .with_static_dir(&dir)
            .build();

        let (status, body) = send(router.clone(), get_request("/style.css")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body {}");

        let (status, body) = send(router.clone(), get_request("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "index");

        let (status, _) = send(router, get_request("/missing.css")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_method_override_runs_before_routing() {
        let router = RouterBuilder::new()
            .route("/books/{id}", put(|| async { "updated" }))
            .with_method_override()
            .build();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/books/1")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("_method=PUT"))
            .unwrap();

        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "updated");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let router = RouterBuilder::new()
            .route("/health", get(|| async { "ok" }))
            .with_tracing()
            .with_request_id()
            .with_timeout(5000)
            .build();

        let response = router.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let request_id = response.headers().get("x-request-id").unwrap();
        assert!(uuid::Uuid::parse_str(request_id.to_str().unwrap()).is_ok());
    }
}

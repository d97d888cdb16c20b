pub mod handlers;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, MethodRouter};
use axum::Router;
use tracing::warn;

use crate::outcomes::Resolver;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
    pub allow_origin: Arc<str>,
}

/// The proxy endpoint, mounted at `/` and at `route`.
pub fn router(state: AppState, route: &str) -> Router {
    let mut router = Router::new().route("/", endpoint());
    if route != "/" && !route.is_empty() {
        router = router.route(route, endpoint());
    }

    router
        .layer(middleware::from_fn_with_state(state.clone(), cors))
        .with_state(state)
}

fn endpoint() -> MethodRouter<AppState> {
    get(handlers::dispatch)
        .options(handlers::preflight)
        .fallback(handlers::method_not_allowed)
}

async fn cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    match HeaderValue::from_str(&state.allow_origin) {
        Ok(origin) => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        Err(_) => warn!("Invalid CORS origin: {}", state.allow_origin),
    }
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, OPTIONS"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));

    response
}

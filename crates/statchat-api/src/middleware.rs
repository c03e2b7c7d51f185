//! Layers shared by every route.
use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// The chat widget is served from other origins; it only needs JSON over
/// GET and POST.
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

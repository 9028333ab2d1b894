//! # Routes
//!
//! Axum router configuration for the CafeRadius API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /api/health - Liveness check
/// - GET  /api/test - Static confirmation message
/// - GET  /api/debug - Credential presence and environment name
/// - GET  /api/cafes - List cafés
/// - POST /api/vouchers/create - Issue a voucher
/// - GET  /api/vouchers/verify/{code} - Verify a voucher
///
/// Every route also answers with a trailing slash. Anything else falls
/// through to axum's default 404.
pub fn create_router(state: AppState) -> Router {
    // Browser clients call from arbitrary origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let voucher_routes = [
        ("/create", post(handlers::create_voucher)),
        ("/verify/{code}", get(handlers::verify_voucher)),
    ]
    .into_iter()
    .fold(Router::new(), |router, (path, handler)| {
        route_lenient(router, path, handler)
    });

    let api_routes = [
        ("/health", get(handlers::health)),
        ("/test", get(handlers::smoke_test)),
        ("/debug", get(handlers::debug_info)),
        ("/cafes", get(handlers::list_cafes)),
    ]
    .into_iter()
    .fold(Router::new(), |router, (path, handler)| {
        route_lenient(router, path, handler)
    })
    .nest("/vouchers", voucher_routes);

    Router::new()
        .nest("/api", api_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}

/// Register `path` with and without a trailing slash
fn route_lenient(
    router: Router<AppState>,
    path: &str,
    handler: MethodRouter<AppState>,
) -> Router<AppState> {
    router
        .route(path, handler.clone())
        .route(&format!("{}/", path), handler)
}

//! HTTP surface: routes, layers, and error mapping.

pub mod classify;
pub mod errors;
pub mod openapi;
pub mod verify;

use std::{future::Future, net::SocketAddr};

use axum::{
    Router,
    http::HeaderName,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use tracing::info;

use crate::{
    app_state::AppState, auth::handlers as auth_handlers, dataset::handlers as dataset_handlers,
    health, middleware::rate_limit::rate_limit_middleware,
};

pub use errors::{ApiError, ErrorResponse};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds the application router with tracing and request ids.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/v1/verify-url", post(verify::verify_url))
        .route("/v1/auth/register", post(auth_handlers::register))
        .route("/v1/auth/login", post(auth_handlers::login))
        .route_layer(from_fn_with_state(state.clone(), rate_limit_middleware));

    let protected = Router::new()
        .route("/v1/classify/text", post(classify::classify_text))
        .route("/v1/classify/url", post(classify::classify_url))
        .route(
            "/v1/datasets",
            get(dataset_handlers::list_items).put(dataset_handlers::replace_items),
        )
        .route(
            "/v1/datasets/{id}",
            put(dataset_handlers::update_item).delete(dataset_handlers::delete_item),
        )
        .route("/v1/datasets/stats", get(dataset_handlers::stats))
        .route("/v1/datasets/feedback", post(dataset_handlers::submit_feedback));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/healthz", get(health::health_check))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .merge(public)
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
        .with_state(state)
}

/// Serves `app` until `signal` resolves and every in-flight request has
/// finished, then cancels `background`.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    background: CancellationToken,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(signal)
    .await;

    info!("connections drained, stopping background tasks");
    background.cancel();
    result
}

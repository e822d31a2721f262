use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{modules, web::AppState};

pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config().upload_dir);
    let frontend = ServeDir::new(&state.config().frontend_dir);

    // Multipart bodies can carry several files, each bounded individually by
    // the per-file cap; the request limit leaves headroom for the envelope.
    let body_limit = (state.config().max_upload_bytes as usize).saturating_mul(8);

    Router::new()
        .route("/healthz", get(healthz))
        .merge(modules::accounts::router())
        .merge(modules::institutes::router())
        .merge(modules::proctor::router())
        .merge(modules::ai::router())
        .merge(modules::projects::router())
        .nest_service("/static", uploads)
        .fallback_service(frontend)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

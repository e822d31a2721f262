use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{store::User, web::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/login", post(login))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    ok: bool,
    user: User,
}

#[derive(Debug, Serialize)]
struct LoginRejection {
    ok: bool,
    error: &'static str,
}

/// Demo login: no credentials, no deduplication. Every call with an email
/// mints a fresh user record.
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<LoginRejection>)> {
    if request.email.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(LoginRejection {
                ok: false,
                error: "Email required",
            }),
        ));
    }

    let user = state.store().create_user(request.email).await;
    info!(user_id = user.id, "user logged in");

    Ok(Json(LoginResponse { ok: true, user }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::for_tests(std::env::temp_dir())
    }

    #[tokio::test]
    async fn login_creates_user_and_echoes_email() {
        let state = state();
        let Json(response) = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "host@example.com".into(),
            }),
        )
        .await
        .unwrap();

        assert!(response.ok);
        assert!(response.user.id > 0);
        assert_eq!(response.user.email, "host@example.com");
        assert_eq!(state.store().user_count().await, 1);
    }

    #[tokio::test]
    async fn login_without_email_is_rejected() {
        let state = state();
        let (status, Json(rejection)) = login(
            State(state.clone()),
            Json(LoginRequest {
                email: String::new(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!rejection.ok);
        assert_eq!(rejection.error, "Email required");
        assert_eq!(state.store().user_count().await, 0);
    }
}

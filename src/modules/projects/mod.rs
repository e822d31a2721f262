use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
};
use serde::Serialize;
use tracing::info;

use crate::web::{ApiError, AppState, ensure_directory, json_error, process_upload_form};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/pro_final/upload", post(upload_project))
}

#[derive(Debug, Serialize)]
struct ProjectUploadResponse {
    ok: bool,
    path: String,
}

/// Standalone staging endpoint: the file lands on disk but no record is
/// created in the store.
async fn upload_project(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProjectUploadResponse>, (StatusCode, Json<ApiError>)> {
    let config = state.config();

    ensure_directory(&config.upload_dir)
        .await
        .map_err(|err| json_error(err.status(), err.to_string()))?;

    let upload = process_upload_form(
        multipart,
        &config.upload_dir,
        &["project"],
        config.max_upload_bytes,
    )
    .await
    .map_err(|err| json_error(err.status(), err.to_string()))?;

    let Some(file) = upload.first_file_for("project") else {
        return Err(json_error(StatusCode::BAD_REQUEST, "No file"));
    };

    info!(
        original = %file.original_name,
        stored = %file.stored_name,
        size_bytes = file.size_bytes,
        "project file staged"
    );

    Ok(Json(ProjectUploadResponse {
        ok: true,
        path: file.stored_path.display().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::FromRequest, http::Request};

    use super::*;

    async fn multipart_from(body: Vec<u8>) -> Multipart {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(body))
            .unwrap();

        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn uploaded_project_round_trips_through_the_returned_path() {
        let staging = tempfile::tempdir().unwrap();
        let state = AppState::for_tests(staging.path().to_path_buf());
        let payload: &[u8] = b"final project submission";

        let body = [
            b"--BOUNDARY\r\n".as_slice(),
            b"Content-Disposition: form-data; name=\"project\"; filename=\"final.zip\"\r\n\r\n",
            payload,
            b"\r\n--BOUNDARY--\r\n",
        ]
        .concat();

        let Json(response) = upload_project(State(state), multipart_from(body).await)
            .await
            .unwrap();

        assert!(response.ok);
        let staged = tokio::fs::read(&response.path).await.unwrap();
        assert_eq!(staged, payload);
    }

    #[tokio::test]
    async fn upload_without_file_is_rejected() {
        let staging = tempfile::tempdir().unwrap();
        let state = AppState::for_tests(staging.path().to_path_buf());

        let body = [
            b"--BOUNDARY\r\n".as_slice(),
            b"Content-Disposition: form-data; name=\"note\"\r\n\r\n",
            b"no attachment here",
            b"\r\n--BOUNDARY--\r\n",
        ]
        .concat();

        let (status, Json(rejection)) = upload_project(State(state), multipart_from(body).await)
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(rejection.error, "No file");
    }
}


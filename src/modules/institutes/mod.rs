use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use tracing::info;

use crate::{
    store::{Institute, StoredFile},
    web::{ApiError, AppState, UploadOutcome, ensure_directory, json_error, process_upload_form},
};

/// File fields accepted by the registration form.
const FILE_FIELDS: &[&str] = &["proof", "degree"];

const REGISTERED_MESSAGE: &str =
    "Institute registered. Email may go to spam depending on SMTP settings.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/institute/register", post(register))
        .route("/api/institutes", get(list))
}

#[derive(Serialize)]
struct RegisterResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct InstituteList {
    institutes: Vec<Institute>,
}

async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RegisterResponse>, (StatusCode, Json<ApiError>)> {
    let config = state.config();

    ensure_directory(&config.upload_dir)
        .await
        .map_err(|err| json_error(err.status(), err.to_string()))?;

    let upload = process_upload_form(
        multipart,
        &config.upload_dir,
        FILE_FIELDS,
        config.max_upload_bytes,
    )
    .await
    .map_err(|err| json_error(err.status(), err.to_string()))?;

    let name = upload.first_text("name").unwrap_or("").to_string();
    let email = upload.first_text("email").unwrap_or("").to_string();
    if name.is_empty() || email.is_empty() {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "Name and email required",
        ));
    }

    let files = group_files(&upload);
    let institute = state.store().create_institute(name, email, files).await;
    info!(
        institute_id = institute.id,
        files = upload.files.len(),
        "institute registered"
    );

    // Best-effort notification; the response never waits on delivery.
    if let Some(mailer) = state.mailer() {
        mailer.send_registration_notice(&institute.name, &institute.email);
    }

    Ok(Json(RegisterResponse {
        message: REGISTERED_MESSAGE,
    }))
}

async fn list(State(state): State<AppState>) -> Json<InstituteList> {
    Json(InstituteList {
        institutes: state.store().list_institutes().await,
    })
}

/// Groups staged files by form field, mirroring the upload form layout.
/// Fields with no files are omitted entirely.
fn group_files(upload: &UploadOutcome) -> HashMap<String, Vec<StoredFile>> {
    let mut files: HashMap<String, Vec<StoredFile>> = HashMap::new();
    for field in FILE_FIELDS {
        let staged: Vec<StoredFile> = upload
            .files_for(field)
            .cloned()
            .map(StoredFile::from)
            .collect();
        if !staged.is_empty() {
            files.insert((*field).to_string(), staged);
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::web::SavedFile;

    fn saved(field: &str, original: &str, size: u64) -> SavedFile {
        SavedFile {
            field_name: field.into(),
            original_name: original.into(),
            stored_name: "stored".into(),
            stored_path: PathBuf::from("uploads/stored"),
            size_bytes: size,
            mime_type: "application/octet-stream".into(),
        }
    }

    #[test]
    fn group_files_splits_by_field_and_skips_empty() {
        let upload = UploadOutcome {
            files: vec![
                saved("proof", "id.png", 10),
                saved("proof", "license.png", 20),
                saved("degree", "phd.pdf", 30),
            ],
            text_fields: HashMap::new(),
        };

        let grouped = group_files(&upload);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["proof"].len(), 2);
        assert_eq!(grouped["degree"].len(), 1);
        assert_eq!(grouped["degree"][0].original_name, "phd.pdf");
    }

    #[test]
    fn group_files_with_no_uploads_is_empty() {
        let upload = UploadOutcome::default();
        assert!(group_files(&upload).is_empty());
    }

    #[tokio::test]
    async fn list_returns_store_snapshot() {
        let state = AppState::for_tests(std::env::temp_dir());
        state
            .store()
            .create_institute("Acme".into(), "acme@example.com".into(), HashMap::new())
            .await;

        let response = list(State(state)).await;
        assert_eq!(response.0.institutes.len(), 1);
        assert_eq!(response.0.institutes[0].name, "Acme");
    }
}

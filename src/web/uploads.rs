use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use axum::{extract::Multipart, http::StatusCode};
use tokio::{fs::File, io::AsyncWriteExt};
use uuid::Uuid;

use crate::store::StoredFile;

/// Result type used by the shared upload helpers.
pub type UploadResult<T> = Result<T, UploadError>;

/// Error raised while validating or staging uploaded files.
#[derive(Debug)]
pub enum UploadError {
    /// The client sent a form we do not accept.
    Rejected(String),
    /// A single file exceeded the configured cap.
    TooLarge { field: String, limit_bytes: u64 },
    /// Filesystem or stream failure while staging bytes.
    Io(String),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::Rejected(_) => StatusCode::BAD_REQUEST,
            UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadError::Rejected(message) => write!(f, "{message}"),
            UploadError::TooLarge { field, limit_bytes } => {
                write!(f, "File in field `{field}` exceeds {limit_bytes} bytes")
            }
            UploadError::Io(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for UploadError {}

/// Metadata describing a staged upload on disk.
#[derive(Debug, Clone)]
pub struct SavedFile {
    pub field_name: String,
    pub original_name: String,
    pub stored_name: String,
    pub stored_path: PathBuf,
    pub size_bytes: u64,
    pub mime_type: String,
}

impl From<SavedFile> for StoredFile {
    fn from(file: SavedFile) -> Self {
        StoredFile {
            stored_path: file.stored_path.display().to_string(),
            original_name: file.original_name,
            size_bytes: file.size_bytes,
            mime_type: file.mime_type,
        }
    }
}

/// Aggregated output of the shared upload processor.
#[derive(Debug, Default)]
pub struct UploadOutcome {
    pub files: Vec<SavedFile>,
    pub text_fields: HashMap<String, Vec<String>>,
}

impl UploadOutcome {
    pub fn files_for<'a>(&'a self, field_name: &str) -> impl Iterator<Item = &'a SavedFile> {
        self.files
            .iter()
            .filter(move |file| file.field_name == field_name)
    }

    pub fn first_file_for(&self, field_name: &str) -> Option<&SavedFile> {
        self.files_for(field_name).next()
    }

    pub fn first_text(&self, field_name: &str) -> Option<&str> {
        self.text_fields
            .get(field_name)
            .and_then(|values| values.first().map(|s| s.as_str()))
    }
}

/// Ensures the staging directory exists.
pub async fn ensure_directory(path: &Path) -> UploadResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|err| UploadError::Io(format!("failed to create upload directory: {err}")))
}

/// Parses multipart form data, staging files from the allowed fields.
///
/// Stored names are randomized so concurrent uploads never collide and
/// client-supplied names never reach the filesystem. Text fields are
/// collected verbatim.
pub async fn process_upload_form(
    mut multipart: Multipart,
    staging_dir: &Path,
    file_fields: &[&str],
    max_file_bytes: u64,
) -> UploadResult<UploadOutcome> {
    let mut text_fields: HashMap<String, Vec<String>> = HashMap::new();
    let mut saved_files: Vec<SavedFile> = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| UploadError::Rejected(format!("failed to parse upload form: {err}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field.file_name().is_none() {
            let value = field.text().await.map_err(|err| {
                UploadError::Rejected(format!("failed to read field `{field_name}`: {err}"))
            })?;
            text_fields
                .entry(field_name.clone())
                .or_default()
                .push(value);
            continue;
        }

        if !file_fields.contains(&field_name.as_str()) {
            return Err(UploadError::Rejected(format!(
                "unexpected file field: `{field_name}`"
            )));
        }

        let client_name = field.file_name().unwrap_or("upload.bin").to_string();
        let original_name = sanitize_filename::sanitize(&client_name);
        let mime_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());

        let stored_name = staged_filename(&client_name);
        let stored_path = staging_dir.join(&stored_name);
        let mut file = File::create(&stored_path)
            .await
            .map_err(|err| UploadError::Io(format!("failed to create staged file: {err}")))?;

        let mut size_bytes: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| UploadError::Rejected(format!("failed to read upload data: {err}")))?
        {
            size_bytes += chunk.len() as u64;
            if size_bytes > max_file_bytes {
                drop(file);
                let _ = tokio::fs::remove_file(&stored_path).await;
                return Err(UploadError::TooLarge {
                    field: field_name,
                    limit_bytes: max_file_bytes,
                });
            }
            file.write_all(&chunk)
                .await
                .map_err(|err| UploadError::Io(format!("failed to write staged file: {err}")))?;
        }
        file.flush()
            .await
            .map_err(|err| UploadError::Io(format!("failed to flush staged file: {err}")))?;

        saved_files.push(SavedFile {
            field_name,
            original_name,
            stored_name,
            stored_path,
            size_bytes,
            mime_type,
        });
    }

    Ok(UploadOutcome {
        files: saved_files,
        text_fields,
    })
}

/// Random stored name keeping only a lowercased, alphanumeric extension
/// taken from the raw client filename. The extension must come from the raw
/// name: sanitizing first can collapse path text into something that looks
/// like an extension.
fn staged_filename(original: &str) -> String {
    let extension = Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 16 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        });

    match extension {
        Some(extension) => format!("{}.{extension}", Uuid::new_v4()),
        None => Uuid::new_v4().to_string(),
    }
}

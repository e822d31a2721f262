pub mod responses;
pub mod router;
pub mod state;
pub mod uploads;

pub use responses::{ApiError, json_error};
pub use state::AppState;
pub use uploads::{SavedFile, UploadError, UploadOutcome, ensure_directory, process_upload_form};

//! Error helpers.

use http::StatusCode;
use worker::Response;

/// Error helper type.
#[derive(Debug)]
pub enum AtError {
    /// Classified [`arena_tracker::Error`].
    Sync(arena_tracker::Error),
    /// [`worker::Error`]
    WorkerError(worker::Error),
}
impl From<arena_tracker::Error> for AtError {
    fn from(value: arena_tracker::Error) -> Self {
        Self::Sync(value)
    }
}
impl From<worker::Error> for AtError {
    fn from(value: worker::Error) -> Self {
        Self::WorkerError(value)
    }
}
impl AtError {
    /// Status the error responds with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AtError::Sync(error) => error.status_code(),
            AtError::WorkerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render as a `{"error": ...}` response. Internal details are logged, not returned.
    pub fn into_response(self) -> worker::Result<Response> {
        let status = self.status_code();
        let message = match &self {
            AtError::Sync(error) => {
                if status.is_server_error() {
                    log::error!("Request failed: {:?}", error);
                } else {
                    log::info!("Request rejected: {}", error);
                }
                error.to_string()
            }
            AtError::WorkerError(worker_error) => {
                log::error!("Worker error: {}", worker_error);
                "Internal server error.".to_owned()
            }
        };
        Ok(Response::from_json(&ErrorBody { error: message })?.with_status(status.as_u16()))
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sweeper_core::sheet::SheetError;
use sweeper_core::SweepError;
use uuid::Uuid;

/// Errors returned by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unknown session: {0}")]
    NotFound(Uuid),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Sweep(#[from] SweepError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Sweep(err) => match err {
                SweepError::UnsupportedFormat { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                SweepError::UnknownFormat(_) => StatusCode::BAD_REQUEST,
                SweepError::Sheet(sheet) => match sheet {
                    SheetError::ColumnNotFound { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    SheetError::XlsxWrite(_) | SheetError::Io(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                    _ => StatusCode::BAD_REQUEST,
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

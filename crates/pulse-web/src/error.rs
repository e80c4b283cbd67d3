use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use pulse_common::ErrorBody;
use thiserror::Error;

/// Anything that can go wrong talking to Yahoo.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request failed with status {status}: {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid upstream url: {0}")]
    Url(String),
}

/// Failure of a proxy endpoint, rendered as `{"error": "..."}`.
///
/// The caller only ever sees the display message; the cause behind an
/// [`ApiError::Upstream`] stays in the server log.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{context}")]
    Upstream {
        context: &'static str,
        #[source]
        source: UpstreamError,
    },
}

impl ApiError {
    pub fn upstream(context: &'static str, source: UpstreamError) -> Self {
        log::error!("{context}: {source}");
        ApiError::Upstream { context, source }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

use serde::Serialize;
use worker::{console_error, Response};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failure of an API operation, mapped onto an HTTP status by [`ApiError::status`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),
    /// A referenced agent does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Store or runtime failure. Only `context` reaches the client.
    #[error("{context}: {source}")]
    Internal {
        context: &'static str,
        #[source]
        source: worker::Error,
    },
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ApiError {
    /// `map_err` adapter naming what the handler was doing when the store failed.
    pub fn internal(context: &'static str) -> impl FnOnce(worker::Error) -> ApiError {
        move |source| ApiError::Internal { context, source }
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("Agent not found".into())
    }

    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Internal { .. } => 500,
        }
    }

    pub fn body(&self, request_id: &str) -> ErrorBody {
        match self {
            ApiError::Validation(msg) | ApiError::NotFound(msg) => ErrorBody {
                error: msg.clone(),
                request_id: None,
            },
            ApiError::Internal { context, .. } => ErrorBody {
                error: (*context).to_string(),
                request_id: Some(request_id.to_string()),
            },
        }
    }

    /// Render as a JSON error response, logging internal failures under `request_id`.
    pub fn into_response(self, request_id: &str) -> worker::Result<Response> {
        if let ApiError::Internal { .. } = &self {
            console_error!("[{request_id}] {self}");
        }
        Ok(Response::from_json(&self.body(request_id))?.with_status(self.status()))
    }
}

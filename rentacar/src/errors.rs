//! # Error Handling for the REST API
//!
//! [`ApiError`] maps every failure to an HTTP status and a sanitized JSON
//! body. Database and search-store details are logged through `tracing` and
//! never sent to clients.
//!
//! ```json
//! { "error": "A new brand cannot already have an ID", "errorKey": "idexists" }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

use crate::core::ServiceError;
use crate::filtering::CriteriaError;
use crate::search::SearchError;

#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found
    NotFound {
        resource: String,
        id: Option<String>,
    },

    /// 400 Bad Request. `error_key` is a stable machine-readable code such as
    /// `idexists` or `idnull`.
    BadRequest {
        message: String,
        error_key: Option<&'static str>,
    },

    /// 500, primary store failure (details logged, not exposed)
    Database { message: String, internal: DbErr },

    /// 503, search store failure on a read (details logged, not exposed)
    Search {
        message: String,
        internal: SearchError,
    },

    /// 500 Internal Server Error
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            error_key: None,
        }
    }

    /// A 400 carrying an error key, e.g. `("idnull", "Invalid id")`.
    pub fn bad_request_alert(error_key: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            error_key: Some(error_key),
        }
    }

    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    #[must_use]
    pub fn search(err: SearchError) -> Self {
        Self::Search {
            message: "The search index is unavailable".to_string(),
            internal: err,
        }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Search { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// The user-facing error message (sanitized)
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => match id {
                Some(id) => format!("{resource} with ID '{id}' not found"),
                None => format!("{resource} not found"),
            },
            Self::BadRequest { message, .. }
            | Self::Database { message, .. }
            | Self::Search { message, .. }
            | Self::Internal { message, .. } => message.clone(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Search { internal, .. } => {
                tracing::error!(error = %internal, "Search store error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_key: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = match &self {
            Self::BadRequest { message, error_key } => ErrorResponse {
                error: message.clone(),
                error_key: *error_key,
            },
            _ => ErrorResponse {
                error: self.user_message(),
                error_key: None,
            },
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// `DbErr::RecordNotFound` becomes 404, every other `DbErr` a sanitized 500.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::RecordNotFound(msg) => {
                let resource = msg.split_whitespace().next().unwrap_or("Resource");
                Self::NotFound {
                    resource: resource.to_string(),
                    id: None,
                }
            }
            _ => Self::database(err),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        Self::search(err)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => e.into(),
            ServiceError::Search(e) => e.into(),
        }
    }
}

/// Malformed criteria and paging parameters are client errors.
impl From<CriteriaError> for ApiError {
    fn from(err: CriteriaError) -> Self {
        Self::bad_request_alert("badcriteria", err.to_string())
    }
}

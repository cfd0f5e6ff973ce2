//! HTTP error envelope.
//!
//! Every failed request is answered with an [`ErrorMessage`] body. [`ApiError`]
//! collects the errors handlers can produce and decides the status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Local, NaiveDateTime};
use depot_core::ValidationErrors;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::service::error::{DeliveryError, DispatchError, HandlerError};

/// Message used for every request-body validation failure.
pub const VALIDATION_FAILED: &str = "Validation failed";

/// JSON body of every error response.
///
/// `details` is `null` when there are no field-level details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub timestamp: NaiveDateTime,
    pub status: u16,
    pub message: String,
    pub details: Option<String>,
}

impl ErrorMessage {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            status: status.as_u16(),
            message: message.into(),
            details,
        }
    }
}

/// Errors returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body could not be decoded or violated a constraint.
    #[error("validation failed: {details}")]
    Validation { details: String },
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl ApiError {
    /// Builds a validation error carrying a decoder or extractor message.
    pub fn malformed(details: impl Into<String>) -> Self {
        Self::Validation {
            details: details.into(),
        }
    }

    /// Status code this error is answered with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::Dispatch(DispatchError::Unrecognized { .. })
            | Self::Delivery(DeliveryError::Validation(_) | DeliveryError::Pricing(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Dispatch(DispatchError::Handler { source, .. }) => match source {
                HandlerError::Forward(_) => StatusCode::BAD_GATEWAY,
                HandlerError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Delivery(DeliveryError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Delivery(DeliveryError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            Self::Delivery(DeliveryError::Collaborator { .. }) => StatusCode::BAD_GATEWAY,
            Self::Delivery(DeliveryError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_message(self) -> ErrorMessage {
        let status = self.status();
        match self {
            Self::Validation { details } => {
                warn!(%details, "request validation failed");
                ErrorMessage::new(status, VALIDATION_FAILED, Some(details))
            }
            Self::Delivery(DeliveryError::Validation(errors)) => {
                let details = errors.details();
                warn!(%details, "request validation failed");
                ErrorMessage::new(status, VALIDATION_FAILED, Some(details))
            }
            err if status.is_server_error() && status != StatusCode::BAD_GATEWAY => {
                error!(error = %err, "request failed");
                ErrorMessage::new(status, "Internal server error", None)
            }
            err => {
                warn!(error = %err, status = status.as_u16(), "request rejected");
                ErrorMessage::new(status, err.to_string(), None)
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation {
            details: errors.details(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.into_message())).into_response()
    }
}

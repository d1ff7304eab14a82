use crate::sentiment::Sentiment;
use crate::storage::ReviewStore;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReviewStore>,
}

/// Review text, guaranteed non-empty once deserialized
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct ReviewText(String);

impl TryFrom<String> for ReviewText {
    type Error = String;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        if text.is_empty() {
            return Err("Review text cannot be empty".to_string());
        }
        Ok(Self(text))
    }
}

impl ReviewText {
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Request to create a review
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub text: ReviewText,
}

/// Query string for listing reviews
#[derive(Debug, Default, Deserialize)]
pub struct ListReviewsQuery {
    pub sentiment: Option<String>,
}

impl ListReviewsQuery {
    /// Parse the optional filter. An empty value means no filter.
    pub fn sentiment_filter(&self) -> Result<Option<Sentiment>, String> {
        match self.sentiment.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                "Invalid sentiment value. Allowed: positive, negative, neutral".to_string()
            }),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub total_reviews: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    /// Request body that could not be read as the expected JSON
    InvalidBody(JsonRejection),
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidBody(rejection) => {
                (StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorResponse {
            error: status.to_string(),
            message,
        }))
        .into_response()
    }
}

//! HTTP mapping of [`AppError`].

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use dk_core::AppError;
use serde_json::json;
use std::fmt;

/// Wrapper so `AppError` can be returned from actix handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub fn status_of(err: &AppError) -> StatusCode {
    match err {
        AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::NotFound(..) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::Persistence(_) | AppError::Corrupt(..) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "project_code" => "project code",
        "work_type" => "work type",
        "message" => "first message",
        "text" => "reply text",
        "url" => "URL",
        other => other,
    }
}

/// What the user is told. Storage details stay in the logs.
pub fn user_message(err: &AppError) -> String {
    match err {
        AppError::ValidationError(fields) => {
            let labels: Vec<&str> = fields.iter().map(|f| field_label(f)).collect();
            format!("Please fill in: {}.", labels.join(", "))
        }
        AppError::NotFound(kind, _) => format!("That {kind} no longer exists."),
        AppError::Conflict(_) => {
            "Someone else saved changes in the meantime. Reload and try again.".to_string()
        }
        AppError::Persistence(_) | AppError::Corrupt(..) => {
            "Could not save or load data. Please try again.".to_string()
        }
    }
}

/// Stable machine-readable error kind for the JSON API.
fn kind(err: &AppError) -> &'static str {
    match err {
        AppError::ValidationError(_) => "validation",
        AppError::NotFound(..) => "not_found",
        AppError::Conflict(_) => "conflict",
        AppError::Persistence(_) | AppError::Corrupt(..) => "persistence",
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_of(&self.0)
    }

    fn error_response(&self) -> HttpResponse {
        if self.0.is_storage() {
            log::error!("request failed: {}", self.0);
        }
        let mut body = json!({
            "error": kind(&self.0),
            "message": user_message(&self.0),
        });
        if let AppError::ValidationError(fields) = &self.0 {
            body["fields"] = json!(fields);
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

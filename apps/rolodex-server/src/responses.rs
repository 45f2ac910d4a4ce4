use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use rolodex_core::ValidationError;
use rolodex_store::DirectoryError;
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use crate::router::paths;

pub fn json_ok<T: Serialize>(body: T) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

pub fn problem(status: StatusCode, title: &str, detail: Option<&str>) -> Response {
    let mut body = json!({"type":"about:blank","title": title,"status": status.as_u16()});
    if let Some(d) = detail {
        body["detail"] = json!(d);
    }
    (status, Json(body)).into_response()
}

pub fn not_found(detail: &str) -> Response {
    problem(StatusCode::NOT_FOUND, "Not Found", Some(detail))
}

pub fn bad_request(detail: &str) -> Response {
    problem(StatusCode::BAD_REQUEST, "Bad Request", Some(detail))
}

/// Accepted mutations land back on the contact list.
pub fn back_to_list() -> Response {
    Redirect::to(paths::CONTACT).into_response()
}

pub fn message_for(err: ValidationError) -> &'static str {
    match err {
        ValidationError::MissingName => "Contact name is required",
        ValidationError::DuplicateName => "Contact name is already taken",
        ValidationError::InvalidEmail => "Email is not valid",
        ValidationError::InvalidPhone => "Phone number is not valid",
    }
}

/// Re-renders the submitting form: the submitted values plus one entry per
/// failed rule, in rule order.
pub fn rejected(title: &str, errors: &[ValidationError], contact: serde_json::Value) -> Response {
    let errors: Vec<_> = errors
        .iter()
        .map(|e| {
            json!({
                "field": e.field().as_str(),
                "code": e.code(),
                "msg": message_for(*e),
            })
        })
        .collect();
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "title": title,
            "errors": errors,
            "contact": contact,
        })),
    )
        .into_response()
}

/// Maps a directory failure onto the HTTP surface. `form_title` and the
/// submitted values are echoed back when the failure is a rejection.
pub fn directory_error<T: Serialize>(
    err: DirectoryError,
    form_title: &str,
    submitted: Option<&T>,
) -> Response {
    match err {
        DirectoryError::Rejected(errors) => {
            let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
            warn!(form = form_title, errors = ?codes, "submission rejected");
            let contact = submitted
                .and_then(|v| serde_json::to_value(v).ok())
                .unwrap_or_default();
            rejected(form_title, &errors, contact)
        }
        DirectoryError::NotFound => not_found("contact not found"),
        err @ DirectoryError::RejectedInput { .. } => {
            error!(%err, "directory refused an unapproved mutation");
            problem(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
        }
        DirectoryError::Storage(err) => {
            error!(%err, "storage failure");
            problem(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                Some("storage unavailable"),
            )
        }
    }
}

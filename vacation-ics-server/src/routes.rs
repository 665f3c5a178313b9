use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, error, warn};
use vacation_ics::{
    CalendarExporter, ErrorKind, ExportError, FieldPath, RawExportRequest, ValidationError,
    MEDIA_TYPE,
};

pub const EXPORT_PATH: &str = "/api/generate-ics";

#[derive(Serialize)]
struct Failure {
    success: bool,
    error: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<Detail>,
}

#[derive(Serialize)]
struct Detail {
    path: FieldPath,
    field: String,
    kind: ErrorKind,
    reason: String,
}

impl From<ValidationError> for Detail {
    fn from(error: ValidationError) -> Self {
        Self {
            field: error.path.to_string(),
            path: error.path,
            kind: error.kind,
            reason: error.reason,
        }
    }
}

impl Failure {
    fn new(error: &'static str, details: Vec<Detail>) -> Self {
        Self {
            success: false,
            error,
            details,
        }
    }
}

pub fn router(exporter: Arc<CalendarExporter>) -> Router {
    Router::new()
        .route(
            EXPORT_PATH,
            post(handle_export).fallback(method_not_allowed),
        )
        .fallback(|| async { Redirect::permanent(env!("CARGO_PKG_REPOSITORY")) })
        .with_state(exporter)
}

async fn handle_export(
    State(exporter): State<Arc<CalendarExporter>>,
    payload: Result<Json<RawExportRequest>, JsonRejection>,
) -> Response {
    let raw = match payload {
        Ok(Json(raw)) => raw,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "unreadable export body");
            let detail = Detail {
                path: FieldPath::field("body"),
                field: "body".into(),
                kind: ErrorKind::Shape,
                reason: unreadable_reason(&rejection).into(),
            };
            return (
                StatusCode::BAD_REQUEST,
                Json(Failure::new("invalid request", vec![detail])),
            )
                .into_response();
        }
    };

    match exporter.export(&raw) {
        Ok(export) => {
            debug!(
                file_name = %export.file_name,
                events = export.document.event_count(),
                "serving calendar"
            );
            (
                [
                    (header::CONTENT_TYPE, MEDIA_TYPE.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", export.file_name),
                    ),
                    (
                        header::CACHE_CONTROL,
                        "no-cache, no-store, must-revalidate".to_string(),
                    ),
                ],
                export.document.into_string(),
            )
                .into_response()
        }
        Err(ExportError::Invalid(errors)) => {
            warn!(violations = errors.len(), %errors, "export request rejected");
            let details = errors.into_iter().map(Detail::from).collect();
            (
                StatusCode::BAD_REQUEST,
                Json(Failure::new("invalid request", details)),
            )
                .into_response()
        }
        Err(err @ ExportError::Generation(_)) => {
            error!(%err, "calendar generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Failure::new("failed to generate the calendar file", Vec::new())),
            )
                .into_response()
        }
    }
}

fn unreadable_reason(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => "request body must be sent as application/json",
        JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON",
        JsonRejection::JsonDataError(_) => "request body must be a JSON object",
        _ => "request body could not be read",
    }
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(Failure::new("method not allowed, use POST", Vec::new())),
    )
        .into_response()
}

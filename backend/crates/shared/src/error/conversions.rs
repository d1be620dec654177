//! Error conversions and the HTTP mapping of [`AppError`]

use super::app_error::AppError;

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found").with_source(err),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::service_unavailable("Database unavailable").with_source(err)
            }
            _ => AppError::internal("Database error").with_source(err),
        }
    }
}

/// Same body the proxy routes emit for gateway-local failures:
/// `{ "error": <message>, "backendStatus": null, "backendError": <detail> }`
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = serde_json::json!({
            "error": self.message(),
            "backendStatus": null,
            "backendError": self.detail().cloned().unwrap_or(serde_json::Value::Null),
        });

        (status, Json(body)).into_response()
    }
}

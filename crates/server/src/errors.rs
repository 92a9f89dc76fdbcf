use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::errors::{ServiceError, ValidationError};
use thiserror::Error;
use tracing::{error, info, warn};

/// JSON error body: `{"error": title, "message": detail, "code": n}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
    pub code: Option<u16>,
    /// Internal cause, logged but never sent to the client.
    pub cause: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<u16>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail, code: None, cause: None }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_cause(mut self, cause: String) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn not_found_route() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", Some("route not found".into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let detail = self.detail.as_deref().unwrap_or_default();
        if self.status.is_server_error() {
            let cause = self.cause.as_deref().unwrap_or(detail);
            error!(status = self.status.as_u16(), code = ?self.code, %detail, %cause, "request failed");
        } else if matches!(self.status, StatusCode::UNAUTHORIZED | StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNSUPPORTED_MEDIA_TYPE) {
            warn!(status = self.status.as_u16(), code = ?self.code, %detail, "request rejected");
        } else {
            info!(status = self.status.as_u16(), code = ?self.code, %detail, "request rejected");
        }
        let body = ErrorBody { error: self.title, message: self.detail.as_deref(), code: self.code };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let (status, title) = match &e {
            ServiceError::Validation(ValidationError::UnsupportedFileType(_)) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported Media Type"),
            ServiceError::Validation(ValidationError::FileTooLarge { .. }) => (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large"),
            ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            ServiceError::Unauthorized | ServiceError::InvalidCredential(_) => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ServiceError::StorageUnavailable(_) | ServiceError::IdentityUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
            }
        };
        let (detail, cause) = match &e {
            ServiceError::Validation(v) => (v.to_string(), None),
            ServiceError::StorageUnavailable(c) => ("storage backend unavailable, try again later".to_string(), Some(c.clone())),
            ServiceError::IdentityUnavailable(c) => ("identity verification unavailable, try again later".to_string(), Some(c.clone())),
            other => (other.to_string(), None),
        };
        let err = JsonApiError::new(status, title, Some(detail)).with_code(e.code());
        match cause {
            Some(c) => err.with_cause(c),
            None => err,
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: ServiceError) -> (StatusCode, Option<u16>) {
        let j = JsonApiError::from(e);
        (j.status, j.code)
    }

    #[test]
    fn service_errors_map_to_http() {
        assert_eq!(status_of(ValidationError::MissingFile.into()), (StatusCode::BAD_REQUEST, Some(1001)));
        assert_eq!(status_of(ValidationError::UnsupportedFileType("image/gif".into()).into()), (StatusCode::UNSUPPORTED_MEDIA_TYPE, Some(1002)));
        assert_eq!(status_of(ValidationError::FileTooLarge { size: 2, max: 1 }.into()), (StatusCode::PAYLOAD_TOO_LARGE, Some(1003)));
        assert_eq!(status_of(ValidationError::MissingField("title").into()), (StatusCode::BAD_REQUEST, Some(1004)));
        assert_eq!(status_of(ServiceError::not_found("wallpaper")), (StatusCode::NOT_FOUND, Some(1100)));
        assert_eq!(status_of(ServiceError::Unauthorized), (StatusCode::UNAUTHORIZED, Some(1200)));
        assert_eq!(status_of(ServiceError::InvalidCredential("x".into())), (StatusCode::UNAUTHORIZED, Some(1201)));
        assert_eq!(status_of(ServiceError::db("down")), (StatusCode::SERVICE_UNAVAILABLE, Some(1300)));
        assert_eq!(status_of(ServiceError::IdentityUnavailable("no key".into())), (StatusCode::SERVICE_UNAVAILABLE, Some(1301)));
    }

    #[test]
    fn storage_detail_is_not_leaked() {
        let j = JsonApiError::from(ServiceError::db("password authentication failed for user postgres"));
        assert!(j.cause.as_deref().is_some_and(|c| c.contains("postgres")));
        assert!(!j.detail.unwrap().contains("postgres"));
    }

    #[test]
    fn storage_failure_is_logged_once() {
        let (logs, _guard) = capture_logs();
        let res = JsonApiError::from(ServiceError::db("connection refused")).into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        let out = logs.contents();
        assert_eq!(out.matches("ERROR").count(), 1, "{out}");
        assert!(out.contains("connection refused"));
    }

    #[derive(Clone, Default)]
    struct SharedBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
    }

    fn capture_logs() -> (SharedBuf, tracing::subscriber::DefaultGuard) {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || writer.clone())
            .finish();
        (buf, tracing::subscriber::set_default(subscriber))
    }
}

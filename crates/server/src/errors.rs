use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use frontdesk_core::errors::InterfaceError;

/// JSON error body shared by every endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub correlation_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                success: false,
                error: message.into(),
                correlation_id: correlation_id.into(),
            },
        }
    }
}

impl From<InterfaceError> for ApiError {
    fn from(error: InterfaceError) -> Self {
        let status = match &error {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            body: ErrorBody {
                success: false,
                error: error.user_message().to_string(),
                correlation_id: error.correlation_id().to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn correlation_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use frontdesk_core::errors::{ApplicationError, DomainError, InterfaceError};

    use super::ApiError;

    #[test]
    fn interface_errors_map_to_http_status() {
        let empty: ApiError =
            ApplicationError::from(DomainError::EmptyUtterance).into_interface("c-1").into();
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);
        assert_eq!(empty.body.error, "Mensaje vacío");
        assert!(!empty.body.success);

        let missing: ApiError = InterfaceError::not_found("tipo", "c-2").into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let down: ApiError =
            ApplicationError::Persistence("closed".to_string()).into_interface("c-3").into();
        assert_eq!(down.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(down.body.correlation_id, "c-3");
    }
}

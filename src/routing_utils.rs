use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::{FromRequest, FromRequestParts};

use serde::Serialize;
use tracing::error;
use utoipa::openapi::{RefOr, Schema};
use utoipa::{ToSchema, openapi};

use validator::ValidationErrors;

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToSchema)]
pub struct BasicErrorResponse {
    #[schema(example = "not_found")]
    error_code: String,
    #[schema(example = "The requested entity could not be found.")]
    error_description: String,
    extra_info: Option<ExtraInfo>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(untagged)]
pub enum ExtraInfo {
    ValidationIssues(ValidationErrorSchema),
    Message(String),
}

/// Stand-in OpenAPI schema for [ValidationErrors] which just provides an empty object
#[derive(Serialize, Debug)]
#[serde(transparent)]
pub struct ValidationErrorSchema(ValidationErrors);

impl<'schem> ToSchema<'schem> for ValidationErrorSchema {
    fn schema() -> (&'schem str, RefOr<Schema>) {
        (
            "ValidationErrorSchema",
            openapi::ObjectBuilder::new().into(),
        )
    }
}

/// An expected API failure with a fixed status and machine-readable code
#[derive(Debug)]
pub struct ApiErrorResponse {
    status: StatusCode,
    error_code: &'static str,
    error_description: String,
}

impl ApiErrorResponse {
    pub fn new(status: StatusCode, error_code: &'static str, error_description: impl Into<String>) -> Self {
        ApiErrorResponse {
            status,
            error_code,
            error_description: error_description.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "not_found",
            "The requested entity could not be found.",
        )
    }

    pub fn forbidden(error_description: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", error_description)
    }

    pub fn unauthenticated(error_description: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthenticated", error_description)
    }

    pub fn conflict(error_description: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", error_description)
    }

    pub fn bad_request(error_code: &'static str, error_description: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_code, error_description)
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(BasicErrorResponse {
                error_code: self.error_code.into(),
                error_description: self.error_description,
                extra_info: None,
            }),
        )
            .into_response()
    }
}

/// Response type for unexpected failures, such as the entity store being unreachable.
/// The underlying error is logged but not exposed to the client.
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        error!("Request failed unexpectedly: {:#}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BasicErrorResponse {
                error_code: "internal_error".into(),
                error_description: "Could not access data to complete your request".into(),
                extra_info: None,
            }),
        )
            .into_response()
    }
}

/// Response type that wraps validation errors and turns them into [BasicErrorResponse]s
pub struct ValidationErrorResponse(ValidationErrors);

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(BasicErrorResponse {
                error_code: "invalid_input".into(),
                error_description: "Submitted data was invalid.".to_owned(),
                extra_info: Some(ExtraInfo::ValidationIssues(ValidationErrorSchema(self.0))),
            }),
        )
            .into_response()
    }
}

impl From<ValidationErrors> for ValidationErrorResponse {
    fn from(value: ValidationErrors) -> Self {
        Self(value)
    }
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
pub struct JsonErrorResponse {
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(BasicErrorResponse {
                error_code: "invalid_json".into(),
                error_description:
                    "The passed request body contained malformed or unreadable JSON.".into(),
                extra_info: Some(ExtraInfo::Message(self.parse_problem)),
            }),
        )
            .into_response()
    }
}

/// Wrapper for [axum::extract::Path] which reports unparseable path parameters using our
/// data structure for API errors
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ParameterErrorResponse))]
pub struct Path<T>(pub T);

/// Wrapper for [axum::extract::Query], same idea as [Path]
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ParameterErrorResponse))]
pub struct Query<T>(pub T);

/// Response type for path or query parameters that don't parse into the expected types
pub struct ParameterErrorResponse {
    error_code: &'static str,
    error_description: &'static str,
    parse_problem: String,
}

impl From<PathRejection> for ParameterErrorResponse {
    fn from(value: PathRejection) -> Self {
        ParameterErrorResponse {
            error_code: "invalid_path",
            error_description: "A path parameter in the request URL was malformed.",
            parse_problem: value.body_text(),
        }
    }
}

impl From<QueryRejection> for ParameterErrorResponse {
    fn from(value: QueryRejection) -> Self {
        ParameterErrorResponse {
            error_code: "invalid_query",
            error_description: "The query string of the request URL was malformed.",
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for ParameterErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(BasicErrorResponse {
                error_code: self.error_code.into(),
                error_description: self.error_description.into(),
                extra_info: Some(ExtraInfo::Message(self.parse_problem)),
            }),
        )
            .into_response()
    }
}

use crate::domain::models::{RenderMapError, RenderedMap};

use axum::{
    Json,
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub(super) const MAP_ID_HEADER: &str = "x-map-id";
pub(super) const MAP_WIDTH_HEADER: &str = "x-map-width";
pub(super) const MAP_HEIGHT_HEADER: &str = "x-map-height";

/// A successfully rendered map, sent back as the PNG itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngResponse(RenderedMap);

impl From<RenderedMap> for PngResponse {
    fn from(map: RenderedMap) -> Self {
        Self(map)
    }
}

impl IntoResponse for PngResponse {
    fn into_response(self) -> Response {
        let map = self.0;

        let headers = [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
            (
                HeaderName::from_static(MAP_ID_HEADER),
                header_value(map.id().to_string()),
            ),
            (
                HeaderName::from_static(MAP_WIDTH_HEADER),
                header_value(map.width().raw().to_string()),
            ),
            (
                HeaderName::from_static(MAP_HEIGHT_HEADER),
                header_value(map.height().to_string()),
            ),
        ];

        (StatusCode::OK, headers, map.into_png()).into_response()
    }
}

// Digits and uuids are always valid header values.
fn header_value(value: String) -> HeaderValue {
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl From<RenderMapError> for ApiError {
    fn from(e: RenderMapError) -> Self {
        match e {
            RenderMapError::InvalidMap(cause) => Self::UnprocessableEntity(cause.to_string()),
            RenderMapError::Unknown(cause) => {
                tracing::error!("{:?}\n{}", cause, cause.backtrace());
                Self::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use ApiError::*;

        match self {
            InternalServerError(e) => {
                tracing::error!("{}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponseBody::new_error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )),
                )
                    .into_response()
            }
            UnprocessableEntity(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponseBody::new_error(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    message,
                )),
            )
                .into_response(),
        }
    }
}

/// Generic response structure shared by all API error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

/// The response data format for all error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

use super::WidthLimits;
use super::api::{ApiError, PngResponse};
use crate::domain::models::{CanvasWidth, CanvasWidthError, RenderMapRequest};
use crate::domain::ports::MapService;
use crate::inbound::AppState;

use axum::body::Bytes;
use axum::extract::{Query, State};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub(super) enum ParseRenderMapHttpRequestError {
    #[error(transparent)]
    Width(#[from] CanvasWidthError),
    #[error("request body is empty, expected an OSM XML document")]
    EmptyBody,
}

impl From<ParseRenderMapHttpRequestError> for ApiError {
    fn from(e: ParseRenderMapHttpRequestError) -> Self {
        ApiError::UnprocessableEntity(e.to_string())
    }
}

/// The query string of a render request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RenderMapHttpQuery {
    width: Option<u32>,
}

impl RenderMapHttpQuery {
    /// Converts the HTTP request into a domain request.
    fn try_into_domain(
        self,
        body: Bytes,
        widths: WidthLimits,
    ) -> Result<RenderMapRequest, ParseRenderMapHttpRequestError> {
        if body.is_empty() {
            return Err(ParseRenderMapHttpRequestError::EmptyBody);
        }

        let width = CanvasWidth::new(self.width.unwrap_or(widths.default), widths.max)?;

        Ok(RenderMapRequest::new(width, body.to_vec()))
    }
}

/// Render the OSM XML document in the request body.
///
/// # Responses
///
/// - 200 OK: the map was rendered, the body is the PNG.
/// - 422 Unprocessable entity: the width or the document was rejected.
pub(super) async fn render_map_handler<MS: MapService>(
    State(state): State<AppState<MS>>,
    Query(query): Query<RenderMapHttpQuery>,
    body: Bytes,
) -> Result<PngResponse, ApiError> {
    let domain_req = query.try_into_domain(body, state.widths)?;
    state
        .map_service
        .render_map(domain_req)
        .await
        .map_err(ApiError::from)
        .map(PngResponse::from)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::domain::models::{RenderMapError, RenderedMap};

    use std::sync::Arc;

    use axum::{http::StatusCode, response::IntoResponse};

    const LIMITS: WidthLimits = WidthLimits {
        default: 2000,
        max: 4000,
    };

    #[derive(Debug, Clone)]
    struct EchoService;

    impl MapService for EchoService {
        async fn render_map(&self, req: RenderMapRequest) -> Result<RenderedMap, RenderMapError> {
            Ok(RenderedMap::new(
                uuid::Uuid::nil(),
                req.width(),
                1,
                req.into_source(),
            ))
        }
    }

    fn state() -> AppState<EchoService> {
        AppState {
            map_service: Arc::new(EchoService),
            widths: LIMITS,
        }
    }

    #[test]
    fn missing_width_uses_the_default() {
        let req = RenderMapHttpQuery::default()
            .try_into_domain(Bytes::from_static(b"<osm/>"), LIMITS)
            .unwrap();

        assert_eq!(req.raw_width(), 2000);
        assert_eq!(req.source(), b"<osm/>");
    }

    #[test]
    fn out_of_range_widths_are_rejected() {
        for width in [0, 4001] {
            let query = RenderMapHttpQuery { width: Some(width) };
            assert!(matches!(
                query.try_into_domain(Bytes::from_static(b"<osm/>"), LIMITS),
                Err(ParseRenderMapHttpRequestError::Width(_))
            ));
        }
    }

    #[test]
    fn empty_bodies_are_rejected() {
        assert!(matches!(
            RenderMapHttpQuery::default().try_into_domain(Bytes::new(), LIMITS),
            Err(ParseRenderMapHttpRequestError::EmptyBody)
        ));
    }

    #[tokio::test]
    async fn handler_returns_the_png_body() {
        let response = render_map_handler(
            State(state()),
            Query(RenderMapHttpQuery { width: Some(64) }),
            Bytes::from_static(b"<osm/>"),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-map-width"], "64");
    }

    #[tokio::test]
    async fn handler_rejects_bad_widths() {
        let response = render_map_handler(
            State(state()),
            Query(RenderMapHttpQuery { width: Some(0) }),
            Bytes::from_static(b"<osm/>"),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

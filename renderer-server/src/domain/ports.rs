/*
   Module `ports` specifies the API by which external modules interact with the render domain.

   All traits are bounded by `Send + Sync + 'static`, since their implementations must be shareable
   between request-handling threads.

   Trait methods are explicitly asynchronous, including `Send` bounds on response types,
   since the application is expected to always run in a multithreaded environment.
*/

use std::future::Future;

use crate::domain::models::*;

/// `MapService` is the public API for the render domain.
///
/// External modules must conform to this contract – the domain is not concerned with the
/// implementation details or underlying technology of any external code.
pub trait MapService: Clone + Send + Sync + 'static {
    /// Asynchronously parse and render the OSM extract carried by `req`.
    ///
    /// Every call works on its own map graph and canvas.
    ///
    /// # Errors
    ///
    /// - [RenderMapError::InvalidMap] if the extract cannot be parsed, projected or drawn.
    fn render_map(
        &self,
        req: RenderMapRequest,
    ) -> impl Future<Output = Result<RenderedMap, RenderMapError>> + Send;
}

/// `MapRepository` represents a store of the rendered maps.
pub trait MapRepository: Send + Sync + Clone + 'static {
    /// Asynchronously persist a new [RenderedMap].
    fn persist_map(
        &self,
        image: RenderedImage,
    ) -> impl Future<Output = Result<RenderedMap, RenderMapError>> + Send;
}

/// `MapMetrics` describes an aggregator of render related metrics, such as a time-series
/// database.
pub trait MapMetrics: Send + Sync + Clone + 'static {
    /// Record a successful render.
    fn record_render_success(&self) -> impl Future<Output = ()> + Send;

    /// Record a render failure.
    fn record_render_failure(&self) -> impl Future<Output = ()> + Send;
}

/// `RenderNotifier` triggers notifications once a map has been rendered.
pub trait RenderNotifier: Send + Sync + Clone + 'static {
    fn map_rendered(&self, map: &RenderedMap) -> impl Future<Output = ()> + Send;
}

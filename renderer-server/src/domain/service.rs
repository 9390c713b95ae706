/*!
   Module `service` provides the canonical implementation of the [MapService] port.
*/

use renderer_core::{RenderConfig, render_map};

use anyhow::Context;

use super::{
    models::{RenderMapError, RenderMapRequest, RenderedImage, RenderedMap},
    ports::{MapMetrics, MapRepository, MapService, RenderNotifier},
};

/// Canonical implementation of the [MapService] port, through which the render domain API is
/// consumed.
#[derive(Debug, Clone)]
pub struct Service<R, M, N>
where
    R: MapRepository,
    M: MapMetrics,
    N: RenderNotifier,
{
    repository: R,
    metrics: M,
    notifier: N,
}

impl<R, M, N> Service<R, M, N>
where
    R: MapRepository,
    M: MapMetrics,
    N: RenderNotifier,
{
    pub fn new(repo: R, metrics: M, notifier: N) -> Self {
        Self {
            repository: repo,
            metrics,
            notifier,
        }
    }

    async fn render_image(req: RenderMapRequest) -> Result<RenderedImage, RenderMapError> {
        let width = req.width();
        let source = req.into_source();

        // Parsing and drawing are CPU bound and fully synchronous.
        let rendered = tokio::task::spawn_blocking(move || {
            let config = RenderConfig::with_width(width.raw());
            let canvas = render_map(source.as_slice(), &config)?;
            let png = canvas.encode_png()?;

            Ok::<_, renderer_core::Error>((canvas.height(), png))
        })
        .await
        .context("render task did not complete")?;

        let (height, png) = rendered?;

        Ok(RenderedImage { width, height, png })
    }
}

impl<R, M, N> MapService for Service<R, M, N>
where
    R: MapRepository,
    M: MapMetrics,
    N: RenderNotifier,
{
    /// Render the [RenderedMap] specified in `req` and trigger notifications.
    ///
    /// # Errors
    ///
    /// - [RenderMapError::InvalidMap] if the extract is rejected by the renderer.
    /// - Propagates any [RenderMapError] returned by the [MapRepository].
    async fn render_map(&self, req: RenderMapRequest) -> Result<RenderedMap, RenderMapError> {
        let result = match Self::render_image(req).await {
            Ok(image) => self.repository.persist_map(image).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(ref rendered_map) => {
                self.metrics.record_render_success().await;
                self.notifier.map_rendered(rendered_map).await;
            }
            Err(_) => self.metrics.record_render_failure().await,
        }

        result
    }
}

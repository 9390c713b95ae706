use crate::domain::{models::RenderedMap, ports::RenderNotifier};

use tracing::event;

#[derive(Debug, Clone)]
pub struct NullNotifier;

impl RenderNotifier for NullNotifier {
    async fn map_rendered(&self, map: &RenderedMap) {
        event!(
            tracing::Level::DEBUG,
            "Rendered map {} ({}x{}, {} bytes)",
            map.id(),
            map.width().raw(),
            map.height(),
            map.png().len()
        );
    }
}

use crate::domain::ports::MapMetrics;

#[derive(Debug, Clone)]
pub struct NullMetrics;

impl MapMetrics for NullMetrics {
    async fn record_render_success(&self) {}

    async fn record_render_failure(&self) {}
}

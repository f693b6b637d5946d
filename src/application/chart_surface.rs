// Chart surface trait and the renderer that owns the single live chart
use crate::domain::chart::ClusteredChart;
use std::sync::Arc;
use thiserror::Error;

/// Token for a chart currently drawn on a surface
///
/// Not `Clone`: releasing consumes it, so a handle cannot be released twice.
#[derive(Debug, PartialEq, Eq)]
pub struct ChartHandle {
    id: u64,
}

impl ChartHandle {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("chart {0} is still on screen")]
    HandleStillLive(u64),
}

pub trait ChartSurface: Send + Sync {
    /// Draw a chart; fails if another chart is still live
    fn draw(&self, chart: &ClusteredChart) -> Result<ChartHandle, SurfaceError>;

    /// Remove a previously drawn chart
    fn release(&self, handle: ChartHandle);
}

/// Holds the one live handle and swaps charts release-then-acquire
pub struct ChartRenderer {
    surface: Arc<dyn ChartSurface>,
    current: Option<ChartHandle>,
}

impl ChartRenderer {
    pub fn new(surface: Arc<dyn ChartSurface>) -> Self {
        Self {
            surface,
            current: None,
        }
    }

    pub fn show(&mut self, chart: &ClusteredChart) -> Result<(), SurfaceError> {
        if let Some(previous) = self.current.take() {
            self.surface.release(previous);
        }
        let handle = self.surface.draw(chart)?;
        tracing::debug!("Drew chart {} with {} agents", handle.id(), chart.agents.len());
        self.current = Some(handle);
        Ok(())
    }

    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            self.surface.release(previous);
        }
    }
}

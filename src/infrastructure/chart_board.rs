// In-process chart board - the surface the refresh loop draws on and HTTP reads from
use crate::application::chart_surface::{ChartHandle, ChartSurface, SurfaceError};
use crate::domain::chart::ClusteredChart;
use chrono::{DateTime, Utc};
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct DrawnChart {
    pub id: u64,
    pub drawn_at: DateTime<Utc>,
    pub chart: ClusteredChart,
}

#[derive(Debug, Default)]
struct BoardState {
    next_id: u64,
    live: Option<DrawnChart>,
    draws: u64,
}

#[derive(Debug, Default)]
pub struct ChartBoard {
    state: RwLock<BoardState>,
}

impl ChartBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The chart currently on screen, if any
    pub fn snapshot(&self) -> Option<DrawnChart> {
        match self.state.read() {
            Ok(state) => state.live.clone(),
            Err(poisoned) => poisoned.into_inner().live.clone(),
        }
    }

    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        usize::from(self.snapshot().is_some())
    }

    pub fn draws(&self) -> u64 {
        match self.state.read() {
            Ok(state) => state.draws,
            Err(poisoned) => poisoned.into_inner().draws,
        }
    }
}

impl ChartSurface for ChartBoard {
    fn draw(&self, chart: &ClusteredChart) -> Result<ChartHandle, SurfaceError> {
        let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());
        if let Some(live) = &state.live {
            return Err(SurfaceError::HandleStillLive(live.id));
        }
        state.next_id += 1;
        state.draws += 1;
        let id = state.next_id;
        state.live = Some(DrawnChart {
            id,
            drawn_at: Utc::now(),
            chart: chart.clone(),
        });
        Ok(ChartHandle::new(id))
    }

    fn release(&self, handle: ChartHandle) {
        let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());
        if state.live.as_ref().is_some_and(|live| live.id == handle.id()) {
            state.live = None;
        } else {
            tracing::warn!("Release of chart {} which is not on screen", handle.id());
        }
    }
}

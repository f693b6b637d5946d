// Scheduled refresh loop - fetch, aggregate, draw, re-arm
//
// One tokio task owns the renderer and therefore the only chart handle. Fetches
// fan out to worker tasks and are joined back here before anything is drawn.
use crate::application::aggregation::{aggregate, SourceReport, SourceSpec};
use crate::application::chart_surface::{ChartRenderer, ChartSurface};
use crate::application::sheet_source::{SheetRef, SheetSource};
use crate::domain::chart::{ClusteredChart, DateWindow};
use crate::domain::error::TrackerError;
use crate::domain::record::RecordSet;
use crate::infrastructure::config::{MilestoneConfig, RetryDelays, TrackerConfig};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshCommand {
    Refresh,
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshState {
    Idle,
    Rendering,
    Failed { reason: String },
    /// Waiting for the timer; `reason` is set when the short delay follows a failure
    Armed { delay: Duration, reason: Option<String> },
    Stopped,
}

#[derive(Debug, Clone)]
pub struct RefreshStatus {
    pub state: RefreshState,
    pub cycles: u64,
    pub last_error: Option<String>,
    pub last_success: Option<DateTime<Utc>>,
    /// Row accounting from the last cycle that got as far as aggregation
    pub sources: Vec<SourceReport>,
}

impl Default for RefreshStatus {
    fn default() -> Self {
        Self {
            state: RefreshState::Idle,
            cycles: 0,
            last_error: None,
            last_success: None,
            sources: Vec::new(),
        }
    }
}

/// Everything the loop needs for its whole lifetime, passed in explicitly
pub struct RefreshContext {
    pub sources: Vec<(SheetRef, SourceSpec)>,
    pub window: DateWindow,
    pub delays: RetryDelays,
    pub milestone: Option<MilestoneConfig>,
    congratulated: HashSet<String>,
}

impl RefreshContext {
    pub fn new(
        sources: Vec<(SheetRef, SourceSpec)>,
        window: DateWindow,
        delays: RetryDelays,
        milestone: Option<MilestoneConfig>,
    ) -> Self {
        Self {
            sources,
            window,
            delays,
            milestone,
            congratulated: HashSet::new(),
        }
    }

    pub fn from_config(cfg: &TrackerConfig) -> Self {
        let sources = cfg
            .sources
            .iter()
            .map(|s| {
                let sheet = SheetRef {
                    name: s.name.clone(),
                    spreadsheet: s.url.clone(),
                    worksheet: s.worksheet.clone(),
                };
                (sheet, SourceSpec::from(s))
            })
            .collect();
        Self::new(sources, cfg.date_window, cfg.retry_delays, cfg.milestone.clone())
    }

    /// Agents who reached the milestone for the first time in this chart
    fn celebrate(&mut self, chart: &ClusteredChart) -> Vec<String> {
        let Some(milestone) = &self.milestone else {
            return Vec::new();
        };
        let Some(category) = chart
            .categories
            .iter()
            .position(|c| c.label == milestone.category)
        else {
            return Vec::new();
        };
        let mut fresh = Vec::new();
        for agent in &chart.agents {
            if agent.count(category) >= milestone.threshold
                && self.congratulated.insert(agent.name.clone())
            {
                tracing::info!(
                    "Congratulations {}: {} {} reached",
                    agent.name,
                    agent.count(category),
                    milestone.category
                );
                fresh.push(agent.name.clone());
            }
        }
        fresh
    }
}

/// Cheap clonable control surface for a running loop
#[derive(Clone)]
pub struct RefreshHandle {
    commands: mpsc::Sender<RefreshCommand>,
    status: watch::Receiver<RefreshStatus>,
}

impl RefreshHandle {
    /// Ask for an immediate cycle; returns false if the loop has stopped
    ///
    /// Never waits: a full queue already holds a refresh, and queued
    /// refreshes collapse into one cycle anyway.
    pub fn refresh_now(&self) -> bool {
        match self.commands.try_send(RefreshCommand::Refresh) {
            Ok(()) | Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Closed(_)) => false,
        }
    }

    pub async fn exit(&self) {
        let _ = self.commands.send(RefreshCommand::Exit).await;
    }

    pub fn status(&self) -> RefreshStatus {
        self.status.borrow().clone()
    }
}

/// The part of the loop a cycle needs; commands stay readable while it runs
struct CycleRunner {
    context: RefreshContext,
    source: Arc<dyn SheetSource>,
    renderer: ChartRenderer,
    status: watch::Sender<RefreshStatus>,
}

impl CycleRunner {
    async fn fetch_all(&self) -> Result<Vec<(SourceSpec, RecordSet)>, TrackerError> {
        let tasks = self.context.sources.iter().map(|(sheet, _)| {
            let source = self.source.clone();
            let sheet = sheet.clone();
            tokio::spawn(async move { source.fetch_records(&sheet).await })
        });
        let results = join_all(tasks).await;

        let mut fetched = Vec::with_capacity(results.len());
        let mut first_error = None;
        for ((sheet, spec), result) in self.context.sources.iter().zip(results) {
            let result = result.unwrap_or_else(|e| {
                Err(TrackerError::FetchFailed {
                    source_name: sheet.name.clone(),
                    cause: e.to_string(),
                })
            });
            match result {
                Ok(records) => {
                    tracing::debug!("Fetched {} rows from {}", records.len(), sheet.name);
                    fetched.push((spec.clone(), records));
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(fetched),
        }
    }

    async fn run(&mut self) -> Result<(), TrackerError> {
        let inputs = self.fetch_all().await?;
        let aggregation = aggregate(&inputs, self.context.window)?;
        self.status.send_modify(|s| s.sources = aggregation.reports.clone());
        let mut chart = aggregation.chart;
        chart.celebrations = self.context.celebrate(&chart);
        self.renderer
            .show(&chart)
            .map_err(|e| TrackerError::RenderFailed(e.to_string()))
    }
}

pub struct RefreshLoop {
    cycle: CycleRunner,
    commands: mpsc::Receiver<RefreshCommand>,
}

impl RefreshLoop {
    pub fn new(
        context: RefreshContext,
        source: Arc<dyn SheetSource>,
        surface: Arc<dyn ChartSurface>,
    ) -> (Self, RefreshHandle) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (status_tx, status_rx) = watch::channel(RefreshStatus::default());
        let refresh_loop = Self {
            cycle: CycleRunner {
                context,
                source,
                renderer: ChartRenderer::new(surface),
                status: status_tx,
            },
            commands: command_rx,
        };
        let handle = RefreshHandle {
            commands: command_tx,
            status: status_rx,
        };
        (refresh_loop, handle)
    }

    fn publish(&self, state: RefreshState) {
        self.cycle.status.send_modify(|s| s.state = state);
    }

    /// One Fetch -> Transform -> Render pass
    ///
    /// Nothing is drawn unless every source was fetched and the window had data.
    pub async fn run_cycle(&mut self) -> Result<(), TrackerError> {
        self.cycle.run().await
    }

    pub fn next_delay(&self, outcome: &Result<(), TrackerError>) -> Duration {
        match outcome {
            Ok(()) => self.cycle.context.delays.success(),
            Err(_) => self.cycle.context.delays.failure(),
        }
    }

    /// Drain commands queued during a cycle; `None` means stop
    fn take_pending(&mut self) -> Option<bool> {
        let mut pending = false;
        loop {
            match self.commands.try_recv() {
                Ok(RefreshCommand::Refresh) => pending = true,
                Ok(RefreshCommand::Exit) | Err(TryRecvError::Disconnected) => return None,
                Err(TryRecvError::Empty) => return Some(pending),
            }
        }
    }

    /// Reads commands while a cycle is in flight; resolves only on exit
    async fn until_exit(commands: &mut mpsc::Receiver<RefreshCommand>, pending: &mut bool) {
        while let Some(RefreshCommand::Refresh) = commands.recv().await {
            *pending = true;
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            "Refresh loop started with {} sources",
            self.cycle.context.sources.len()
        );

        loop {
            self.publish(RefreshState::Rendering);
            let mut pending = false;
            // An exit abandons the cycle; nothing is drawn from a dropped cycle
            let outcome = tokio::select! {
                outcome = self.cycle.run() => outcome,
                _ = Self::until_exit(&mut self.commands, &mut pending) => {
                    tracing::info!("Exit requested during refresh");
                    break;
                }
            };
            let delay = self.next_delay(&outcome);

            let reason = match &outcome {
                Ok(()) => {
                    self.cycle.status.send_modify(|s| {
                        s.cycles += 1;
                        s.last_error = None;
                        s.last_success = Some(Utc::now());
                    });
                    None
                }
                Err(e) => {
                    if e.is_retryable() {
                        tracing::warn!("Refresh failed, retrying in {:?}: {}", delay, e);
                    } else {
                        tracing::error!("Refresh failed, retrying in {:?}: {}", delay, e);
                    }
                    let reason = e.to_string();
                    self.cycle.status.send_modify(|s| {
                        s.cycles += 1;
                        s.last_error = Some(reason.clone());
                        s.state = RefreshState::Failed {
                            reason: reason.clone(),
                        };
                    });
                    Some(reason)
                }
            };

            // Triggers that arrived while rendering collapse into one more cycle
            match self.take_pending() {
                None => break,
                Some(queued) if queued || pending => {
                    tracing::debug!("Running queued refresh");
                    continue;
                }
                Some(_) => {}
            }

            self.publish(RefreshState::Armed { delay, reason });
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                command = self.commands.recv() => match command {
                    Some(RefreshCommand::Refresh) => tracing::info!("Manual refresh requested"),
                    Some(RefreshCommand::Exit) | None => break,
                },
            }
            self.publish(RefreshState::Idle);
        }

        self.cycle.renderer.clear();
        self.publish(RefreshState::Stopped);
        tracing::info!("Refresh loop stopped");
    }
}

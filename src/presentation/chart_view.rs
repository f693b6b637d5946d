// Mapper from chart and loop state to what the HTTP surface shows
use crate::application::aggregation::SourceReport;
use crate::application::refresh_loop::{RefreshState, RefreshStatus};
use crate::domain::chart::ClusteredChart;
use crate::infrastructure::chart_board::DrawnChart;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

const BAR_WIDTH: usize = 40;

#[derive(Debug, Serialize)]
pub struct ChartDto {
    pub id: u64,
    pub drawn_at: DateTime<Utc>,
    pub title: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub categories: Vec<SeriesDto>,
    pub agents: Vec<AgentDto>,
    pub celebrations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SeriesDto {
    pub label: String,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AgentDto {
    pub name: String,
    pub counts: Vec<u32>,
}

#[derive(Debug, Serialize)]
pub struct StatusDto {
    pub state: &'static str,
    pub delay_secs: Option<u64>,
    pub reason: Option<String>,
    pub cycles: u64,
    pub last_error: Option<String>,
    pub last_success: Option<DateTime<Utc>>,
    pub charts_drawn: u64,
    pub sources: Vec<SourceDto>,
}

#[derive(Debug, Serialize)]
pub struct SourceDto {
    pub name: String,
    pub kept: usize,
    pub dropped: usize,
}

pub fn chart_to_dto(drawn: DrawnChart) -> ChartDto {
    let chart = drawn.chart;
    ChartDto {
        id: drawn.id,
        drawn_at: drawn.drawn_at,
        title: chart.title,
        window_start: chart.window.start,
        window_end: chart.window.end,
        categories: chart
            .categories
            .into_iter()
            .map(|c| SeriesDto {
                label: c.label,
                color: c.color,
            })
            .collect(),
        agents: chart
            .agents
            .into_iter()
            .map(|a| AgentDto {
                name: a.name,
                counts: a.counts,
            })
            .collect(),
        celebrations: chart.celebrations,
    }
}

fn source_to_dto(report: SourceReport) -> SourceDto {
    SourceDto {
        kept: report.kept,
        dropped: report.dropped(),
        name: report.name,
    }
}

pub fn status_to_dto(status: RefreshStatus, charts_drawn: u64) -> StatusDto {
    let (state, delay_secs, reason) = match status.state {
        RefreshState::Idle => ("idle", None, None),
        RefreshState::Rendering => ("rendering", None, None),
        RefreshState::Failed { reason } => ("failed", None, Some(reason)),
        RefreshState::Armed { delay, reason } => ("armed", Some(delay.as_secs()), reason),
        RefreshState::Stopped => ("stopped", None, None),
    };
    StatusDto {
        state,
        delay_secs,
        reason,
        cycles: status.cycles,
        last_error: status.last_error,
        last_success: status.last_success,
        charts_drawn,
        sources: status.sources.into_iter().map(source_to_dto).collect(),
    }
}

/// Clustered bar chart as text: one block per agent, one bar per category
pub fn render_text(chart: &ClusteredChart) -> String {
    let max = chart.max_count().max(1) as usize;
    let label_width = chart
        .categories
        .iter()
        .map(|c| c.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!("{}\n", chart.title);
    for agent in &chart.agents {
        out.push_str(&format!("\n{} ({})\n", agent.name, agent.total()));
        for (idx, category) in chart.categories.iter().enumerate() {
            let count = agent.count(idx) as usize;
            let mut len = count * BAR_WIDTH / max;
            if count > 0 && len == 0 {
                len = 1;
            }
            out.push_str(&format!(
                "  {:<width$} {} {}\n",
                category.label,
                "#".repeat(len),
                count,
                width = label_width
            ));
        }
    }
    if !chart.celebrations.is_empty() {
        out.push_str(&format!("\nCongratulations: {}\n", chart.celebrations.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::AgentSummary;
    use crate::domain::chart::{CategorySeries, DateWindow};
    use std::time::Duration;

    fn chart() -> ClusteredChart {
        let window = DateWindow::new(
            NaiveDate::from_ymd_opt(2024, 10, 13).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 30).unwrap(),
        );
        let series = |label: &str| CategorySeries {
            label: label.to_string(),
            color: None,
        };
        ClusteredChart::new(
            window,
            vec![series("Sales"), series("Proposals")],
            vec![
                AgentSummary { name: "Alice".to_string(), counts: vec![40, 1] },
                AgentSummary { name: "Bob".to_string(), counts: vec![0, 20] },
            ],
        )
    }

    #[test]
    fn test_render_text_scales_bars() {
        let text = render_text(&chart());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Agent Sales and Proposals from October 13, 2024 to January 30, 2025");
        assert_eq!(lines[2], "Alice (41)");
        assert_eq!(lines[3], format!("  Sales     {} 40", "#".repeat(40)));
        assert_eq!(lines[4], "  Proposals # 1");
        assert_eq!(lines[6], "Bob (20)");
        assert_eq!(lines[7], "  Sales      0");
        assert_eq!(lines[8], format!("  Proposals {} 20", "#".repeat(20)));
    }

    #[test]
    fn test_status_dto() {
        let dto = status_to_dto(RefreshStatus {
            state: RefreshState::Armed {
                delay: Duration::from_secs(5),
                reason: Some("boom".to_string()),
            },
            cycles: 3,
            last_error: Some("boom".to_string()),
            last_success: None,
            sources: vec![SourceReport {
                name: "Sales Sheet".to_string(),
                kept: 4,
                blank_names: 1,
                bad_dates: 2,
                outside_window: 3,
            }],
        }, 7);
        assert_eq!(dto.state, "armed");
        assert_eq!(dto.delay_secs, Some(5));
        assert_eq!(dto.reason.as_deref(), Some("boom"));
        assert_eq!(dto.cycles, 3);
        assert_eq!(dto.charts_drawn, 7);
        assert_eq!(dto.sources[0].dropped, 6);
    }
}

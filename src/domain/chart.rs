// Chart domain model
use super::agent::AgentSummary;
use super::error::long_date;
use chrono::NaiveDate;
use serde::Deserialize;

/// Inclusive date range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    pub label: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusteredChart {
    pub title: String,
    pub window: DateWindow,
    pub categories: Vec<CategorySeries>,
    pub agents: Vec<AgentSummary>,
    pub celebrations: Vec<String>,
}

impl ClusteredChart {
    pub fn new(window: DateWindow, categories: Vec<CategorySeries>, agents: Vec<AgentSummary>) -> Self {
        let title = Self::format_title(&categories, &window);
        Self {
            title,
            window,
            categories,
            agents,
            celebrations: Vec::new(),
        }
    }

    // "Agent Sales, Installations, and Proposals from October 13, 2024 to January 30, 2025"
    fn format_title(categories: &[CategorySeries], window: &DateWindow) -> String {
        let labels: Vec<&str> = categories.iter().map(|c| c.label.as_str()).collect();
        let joined = match labels.as_slice() {
            [] => "Progress".to_string(),
            [one] => one.to_string(),
            [a, b] => format!("{a} and {b}"),
            [init @ .., last] => format!("{}, and {}", init.join(", "), last),
        };
        format!(
            "Agent {} from {} to {}",
            joined,
            long_date(&window.start),
            long_date(&window.end)
        )
    }

    pub fn max_count(&self) -> u32 {
        self.agents
            .iter()
            .flat_map(|a| a.counts.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(label: &str) -> CategorySeries {
        CategorySeries {
            label: label.to_string(),
            color: None,
        }
    }

    #[test]
    fn test_window_is_inclusive() {
        let window = DateWindow::new(ymd(2024, 10, 13), ymd(2025, 1, 30));
        assert!(window.contains(ymd(2024, 10, 13)));
        assert!(window.contains(ymd(2025, 1, 30)));
        assert!(!window.contains(ymd(2024, 10, 12)));
        assert!(!window.contains(ymd(2025, 1, 31)));
    }

    #[test]
    fn test_title() {
        let window = DateWindow::new(ymd(2024, 10, 13), ymd(2025, 1, 30));
        let chart = ClusteredChart::new(
            window,
            vec![series("Sales"), series("Installations"), series("Proposals")],
            Vec::new(),
        );
        assert_eq!(
            chart.title,
            "Agent Sales, Installations, and Proposals from October 13, 2024 to January 30, 2025"
        );

        let chart = ClusteredChart::new(window, vec![series("Sales")], Vec::new());
        assert!(chart.title.starts_with("Agent Sales from"));
        assert_eq!(chart.max_count(), 0);
    }
}

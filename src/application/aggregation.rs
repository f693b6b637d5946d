// Aggregation - turns fetched record sets into one chart-ready summary
use crate::domain::agent::{normalize_name, outer_join};
use crate::domain::chart::{CategorySeries, ClusteredChart, DateWindow};
use crate::domain::error::TrackerError;
use crate::domain::record::{RecordSet, Scalar};
use crate::infrastructure::config::SourceConfig;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// How to read one record set: which columns carry the agent and the date
#[derive(Debug, Clone)]
pub struct SourceSpec {
    pub name: String,
    pub category: String,
    pub color: Option<String>,
    pub name_column: String,
    pub date_column: String,
    pub date_format: String,
}

impl From<&SourceConfig> for SourceSpec {
    fn from(cfg: &SourceConfig) -> Self {
        Self {
            name: cfg.name.clone(),
            category: cfg.category.clone(),
            color: cfg.color.clone(),
            name_column: cfg.name_column.clone(),
            date_column: cfg.date_column.clone(),
            date_format: cfg.date_format.clone(),
        }
    }
}

/// Row accounting for one source in one cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceReport {
    pub name: String,
    pub kept: usize,
    pub blank_names: usize,
    pub bad_dates: usize,
    pub outside_window: usize,
}

impl SourceReport {
    pub fn dropped(&self) -> usize {
        self.blank_names + self.bad_dates + self.outside_window
    }
}

#[derive(Debug, Clone)]
pub struct Aggregation {
    pub chart: ClusteredChart,
    pub reports: Vec<SourceReport>,
}

/// Parses a date cell with a source-specific format; failures yield `None`
pub fn parse_date(value: &Scalar, format: &str) -> Option<NaiveDate> {
    match value {
        Scalar::Date(d) => Some(*d),
        Scalar::Text(text) => NaiveDate::parse_from_str(text.trim(), format).ok(),
        Scalar::Empty | Scalar::Number(_) => None,
    }
}

fn count_by_agent(
    spec: &SourceSpec,
    records: &RecordSet,
    window: &DateWindow,
) -> Result<(BTreeMap<String, u32>, SourceReport), TrackerError> {
    let missing = |column: &str| TrackerError::MissingColumn {
        source_name: spec.name.clone(),
        column: column.to_string(),
    };
    let name_idx = records
        .column_index(&spec.name_column)
        .ok_or_else(|| missing(&spec.name_column))?;
    let date_idx = records
        .column_index(&spec.date_column)
        .ok_or_else(|| missing(&spec.date_column))?;

    let mut report = SourceReport {
        name: spec.name.clone(),
        ..Default::default()
    };
    let mut counts = BTreeMap::new();

    for row in records.rows() {
        let agent = normalize_name(&row[name_idx].to_string());
        if agent.is_empty() {
            report.blank_names += 1;
            continue;
        }
        let Some(date) = parse_date(&row[date_idx], &spec.date_format) else {
            report.bad_dates += 1;
            continue;
        };
        if !window.contains(date) {
            report.outside_window += 1;
            continue;
        }
        report.kept += 1;
        *counts.entry(agent).or_insert(0) += 1;
    }

    Ok((counts, report))
}

/// Normalize, date-filter, group and outer-join every source into one chart
pub fn aggregate(
    inputs: &[(SourceSpec, RecordSet)],
    window: DateWindow,
) -> Result<Aggregation, TrackerError> {
    let mut per_category = Vec::with_capacity(inputs.len());
    let mut reports = Vec::with_capacity(inputs.len());

    for (spec, records) in inputs {
        let (counts, report) = count_by_agent(spec, records, &window)?;
        tracing::debug!(
            "{}: kept {} rows, dropped {}",
            spec.name,
            report.kept,
            report.dropped()
        );
        if report.blank_names + report.bad_dates > 0 {
            tracing::warn!(
                "{}: dropped {} rows with blank names and {} rows with unparsable dates",
                spec.name,
                report.blank_names,
                report.bad_dates
            );
        }
        per_category.push(counts);
        reports.push(report);
    }

    if per_category.iter().all(|c| c.is_empty()) {
        return Err(TrackerError::NoDataInWindow {
            start: window.start,
            end: window.end,
        });
    }

    let categories = inputs
        .iter()
        .map(|(spec, _)| CategorySeries {
            label: spec.category.clone(),
            color: spec.color.clone(),
        })
        .collect();
    let agents = outer_join(&per_category);

    Ok(Aggregation {
        chart: ClusteredChart::new(window, categories, agents),
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window() -> DateWindow {
        DateWindow::new(ymd(2024, 10, 13), ymd(2025, 1, 30))
    }

    fn spec(name: &str, category: &str, date_column: &str, date_format: &str) -> SourceSpec {
        SourceSpec {
            name: name.to_string(),
            category: category.to_string(),
            color: None,
            name_column: "Agent Name".to_string(),
            date_column: date_column.to_string(),
            date_format: date_format.to_string(),
        }
    }

    fn records(date_column: &str, rows: &[(&str, &str)]) -> RecordSet {
        RecordSet::new(
            vec!["Agent Name".to_string(), date_column.to_string()],
            rows.iter()
                .map(|(agent, date)| vec![Scalar::from_raw(agent), Scalar::from_raw(date)])
                .collect(),
        )
    }

    #[test]
    fn test_window_boundaries_scenario() {
        let rows = [
            ("alice", "10/12/2024"),
            ("alice", "10/13/2024"),
            ("alice", "01/30/2025"),
            ("alice", "01/31/2025"),
        ];
        let inputs = vec![
            (spec("Sales Sheet", "Sales", "Date", "%m/%d/%Y"), records("Date", &rows)),
            (
                spec("Installation Sheet", "Installations", "Installed Date", "%m.%d.%Y"),
                records(
                    "Installed Date",
                    &[
                        ("alice", "10.12.2024"),
                        ("alice", "10.13.2024"),
                        ("alice", "01.30.2025"),
                        ("alice", "01.31.2025"),
                    ],
                ),
            ),
            (spec("Third Source Sheet", "Proposals", "Date", "%m/%d/%Y"), records("Date", &rows)),
        ];

        let result = aggregate(&inputs, window()).unwrap();

        assert_eq!(result.chart.agents.len(), 1);
        assert_eq!(result.chart.agents[0].name, "Alice");
        assert_eq!(result.chart.agents[0].counts, vec![2, 2, 2]);
        for report in &result.reports {
            assert_eq!(report.kept, 2);
            assert_eq!(report.outside_window, 2);
        }
    }

    #[test]
    fn test_outer_join_defaults_missing_categories_to_zero() {
        let inputs = vec![
            (
                spec("Sales Sheet", "Sales", "Date", "%m/%d/%Y"),
                records(
                    "Date",
                    &[("Alice", "11/01/2024"), ("alice ", "11/02/2024"), ("ALICE", "11/03/2024")],
                ),
            ),
            (
                spec("Installation Sheet", "Installations", "Date", "%m/%d/%Y"),
                records("Date", &[("bob", "11/01/2024")]),
            ),
            (
                spec("Third Source Sheet", "Proposals", "Date", "%m/%d/%Y"),
                records("Date", &[(" alice", "12/01/2024"), ("Alice", "12/02/2024")]),
            ),
        ];

        let chart = aggregate(&inputs, window()).unwrap().chart;

        assert_eq!(chart.agents.len(), 2);
        assert_eq!(chart.agents[0].name, "Alice");
        assert_eq!(chart.agents[0].counts, vec![3, 0, 2]);
        assert_eq!(chart.agents[1].name, "Bob");
        assert_eq!(chart.agents[1].counts, vec![0, 1, 0]);
        assert_eq!(chart.categories.len(), 3);
    }

    #[test]
    fn test_blank_names_and_bad_dates_are_dropped_and_counted() {
        let inputs = vec![(
            spec("Sales Sheet", "Sales", "Date", "%m/%d/%Y"),
            records(
                "Date",
                &[
                    ("   ", "11/01/2024"),
                    ("", "11/01/2024"),
                    ("carl", "not a date"),
                    ("carl", ""),
                    ("carl", "2024-11-01"),
                    ("carl", "11/05/2024"),
                ],
            ),
        )];

        let result = aggregate(&inputs, window()).unwrap();

        let report = &result.reports[0];
        assert_eq!(report.blank_names, 2);
        assert_eq!(report.bad_dates, 3);
        assert_eq!(report.kept, 1);
        assert_eq!(report.dropped(), 5);
        assert_eq!(result.chart.agents[0].counts, vec![1]);
    }

    #[test]
    fn test_empty_window_signals_no_data() {
        let inputs = vec![
            (
                spec("Sales Sheet", "Sales", "Date", "%m/%d/%Y"),
                records("Date", &[("alice", "01/01/2020")]),
            ),
            (spec("Other", "Proposals", "Date", "%m/%d/%Y"), records("Date", &[])),
        ];

        let err = aggregate(&inputs, window()).unwrap_err();
        assert!(matches!(err, TrackerError::NoDataInWindow { .. }));
    }

    #[test]
    fn test_missing_column_fails() {
        let inputs = vec![(
            spec("Installation Sheet", "Installations", "Installed Date", "%m.%d.%Y"),
            records("Date", &[("alice", "10.20.2024")]),
        )];

        let err = aggregate(&inputs, window()).unwrap_err();
        match err {
            TrackerError::MissingColumn { source_name, column } => {
                assert_eq!(source_name, "Installation Sheet");
                assert_eq!(column, "Installed Date");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_parse_date_accepts_typed_dates() {
        let d = ymd(2024, 12, 1);
        assert_eq!(parse_date(&Scalar::Date(d), "%m/%d/%Y"), Some(d));
        assert_eq!(parse_date(&Scalar::Number(45000.0), "%m/%d/%Y"), None);
        assert_eq!(
            parse_date(&Scalar::Text(" 12/01/2024 ".to_string()), "%m/%d/%Y"),
            Some(d)
        );
    }
}

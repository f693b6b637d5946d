// HTTP request handlers for the table editor
use crate::application::table_service::{TableRow, TableService, TableView, ROW_NUMBER_COLUMN};
use crate::presentation::app_state::AppState;
use crate::presentation::http_response::{text_response, ApiError, ApiResult};
use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Deserialize)]
pub struct ViewQuery {
    /// Comma-separated column list
    pub columns: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub column: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Deserialize)]
pub struct CellEdit {
    pub column: String,
    pub value: String,
}

#[derive(Deserialize)]
pub struct RowEdit {
    pub values: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct TableDto {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Flattens a view with the row number as the first column
pub fn view_to_dto(view: TableView) -> TableDto {
    let mut columns = Vec::with_capacity(view.columns.len() + 1);
    columns.push(ROW_NUMBER_COLUMN.to_string());
    columns.extend(view.columns);
    let rows = view
        .rows
        .into_iter()
        .map(|TableRow { row_number, values }| {
            let mut row = Vec::with_capacity(values.len() + 1);
            row.push(row_number.to_string());
            row.extend(values);
            row
        })
        .collect();
    TableDto { columns, rows }
}

fn table(state: &AppState) -> ApiResult<&Mutex<TableService>> {
    state
        .table
        .as_ref()
        .ok_or_else(|| ApiError::not_configured("Table"))
}

pub async fn view_table(
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TableDto>> {
    let service = table(&state)?.lock().await;
    let columns: Option<Vec<String>> = query.columns.map(|c| {
        c.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    });
    Ok(Json(view_to_dto(service.view(columns.as_deref()))))
}

pub async fn search_table(
    Query(query): Query<SearchQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TableDto>> {
    let service = table(&state)?.lock().await;
    let view = service.search(&query.column, &query.query, query.case_sensitive)?;
    Ok(Json(view_to_dto(view)))
}

pub async fn search_report(
    Query(query): Query<SearchQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Response> {
    let service = table(&state)?.lock().await;
    let view = service.search(&query.column, &query.query, query.case_sensitive)?;
    Ok(text_response(service.format_results(&view)))
}

pub async fn edit_cell(
    Path(row): Path<usize>,
    State(state): State<Arc<AppState>>,
    Json(edit): Json<CellEdit>,
) -> ApiResult<Json<TableDto>> {
    let mut service = table(&state)?.lock().await;
    service.edit_cell(row, &edit.column, &edit.value)?;
    let view = service.view(None);
    Ok(Json(view_to_dto(TableView {
        rows: view.rows.into_iter().filter(|r| r.row_number == row).collect(),
        ..view
    })))
}

pub async fn edit_row(
    Path(row): Path<usize>,
    State(state): State<Arc<AppState>>,
    Json(edit): Json<RowEdit>,
) -> ApiResult<Json<TableDto>> {
    let mut service = table(&state)?.lock().await;
    service.edit_row(row, &edit.values)?;
    let view = service.view(None);
    Ok(Json(view_to_dto(TableView {
        rows: view.rows.into_iter().filter(|r| r.row_number == row).collect(),
        ..view
    })))
}

/// The "Save Changes" button
pub async fn save_table(State(state): State<Arc<AppState>>) -> ApiResult<Json<serde_json::Value>> {
    let service = table(&state)?.lock().await;
    service.save()?;
    Ok(Json(serde_json::json!({
        "message": "Changes saved, header preserved.",
        "rows": service.table().len(),
        "path": service.path().display().to_string(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_to_dto_prepends_row_number() {
        let dto = view_to_dto(TableView {
            columns: vec!["Email".to_string()],
            rows: vec![TableRow {
                row_number: 4,
                values: vec!["a@x.test".to_string()],
            }],
        });
        assert_eq!(dto.columns, vec!["Row Number".to_string(), "Email".to_string()]);
        assert_eq!(dto.rows, vec![vec!["4".to_string(), "a@x.test".to_string()]]);
    }
}

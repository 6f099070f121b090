use crate::buckets;
use crate::duration::FormatPolicy;
use crate::errors::AppError;
use crate::extract::{JsonBody, QueryParams};
use crate::filter::{self, ListQuery};
use crate::models::{
    AppData, CalendarResponse, DashboardResponse, ImportResponse, ListParams, MonthBucket, Record, RecordInput,
    RecordView, Tag, YearQuery,
};
use crate::state::AppState;
use crate::stats::build_dashboard_at;
use crate::storage::persist_data;
use crate::store;
use crate::transfer;
use crate::ui::render_index;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use chrono::{DateTime, Datelike, Local, Utc};
use tracing::{info, warn};

pub async fn index() -> Html<String> {
    Html(render_index())
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_records(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<RecordView>>, AppError> {
    let query = ListQuery::from(params);
    let now = Utc::now();
    let data = state.data.lock().await;
    let shown = filter::apply_at(&data.records, &query, now)
        .into_iter()
        .map(|record| to_view(record, now))
        .collect();
    Ok(Json(shown))
}

pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecordView>, AppError> {
    let data = state.data.lock().await;
    let record = data
        .records
        .iter()
        .find(|record| record.id == id)
        .ok_or_else(|| missing(&id))?;
    Ok(Json(to_view(record, Utc::now())))
}

pub async fn create_record(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RecordInput>,
) -> Result<(StatusCode, Json<RecordView>), AppError> {
    let now = Utc::now();
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let record = store::create_record(&mut next, payload, now)?;
    persist_data(&state.data_path, &next).await?;
    *data = next;

    info!("created record {} ({})", record.id, record.title);
    Ok((StatusCode::CREATED, Json(to_view(&record, now))))
}

pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<RecordInput>,
) -> Result<Json<RecordView>, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let record = store::update_record(&mut next, &id, payload)?.ok_or_else(|| missing(&id))?;
    persist_data(&state.data_path, &next).await?;
    *data = next;

    info!("updated record {id}");
    Ok(Json(to_view(&record, Utc::now())))
}

pub async fn resolve_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecordView>, AppError> {
    let now = Utc::now();
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let (record, changed) = store::resolve_record(&mut next, &id, now).ok_or_else(|| missing(&id))?;
    if changed {
        persist_data(&state.data_path, &next).await?;
        *data = next;
        info!("resolved record {id}");
    }
    Ok(Json(to_view(&record, now)))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    if !store::delete_record(&mut next, &id) {
        return Err(missing(&id));
    }
    persist_data(&state.data_path, &next).await?;
    *data = next;

    info!("deleted record {id}");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_tags(State(state): State<AppState>) -> Json<Vec<Tag>> {
    let data = state.data.lock().await;
    Json(store::unique_tags(&data.records))
}

pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let data = state.data.lock().await;
    Json(build_dashboard_at(&data.records, Utc::now()))
}

pub async fn monthly(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<YearQuery>,
) -> Json<Vec<MonthBucket>> {
    let data = state.data.lock().await;
    Json(buckets::monthly_totals(&data.records, query.year, Utc::now(), &Local))
}

pub async fn calendar(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<YearQuery>,
) -> Json<CalendarResponse> {
    let now = Utc::now();
    let data = state.data.lock().await;
    let years = buckets::years(&data.records, now, &Local);
    let year = query
        .year
        .or_else(|| years.first().copied())
        .unwrap_or_else(|| Local::now().year());
    let days = buckets::calendar_days(&data.records, year, now, &Local);
    Json(CalendarResponse { years, year, days })
}

pub async fn export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let data = state.data.lock().await;
    let body = transfer::export_json(&data.records).map_err(AppError::internal)?;
    let filename = transfer::export_filename(Local::now().date_naive());

    info!("exported {} records", data.records.len());
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    ))
}

/// Replaces the whole log. Nothing changes unless every element validates and the write succeeds.
pub async fn import(State(state): State<AppState>, body: Bytes) -> Result<Json<ImportResponse>, AppError> {
    let records = transfer::parse_import(&body).inspect_err(|err| warn!("rejected import: {err}"))?;
    let imported = records.len();

    let mut data = state.data.lock().await;
    let next = AppData {
        records,
        users: data.users.clone(),
    };
    persist_data(&state.data_path, &next).await?;
    *data = next;

    info!("imported {imported} records");
    Ok(Json(ImportResponse { imported }))
}

fn to_view(record: &Record, now: DateTime<Utc>) -> RecordView {
    let elapsed = record.elapsed_at(now);
    RecordView {
        record: record.clone(),
        status: record.status(),
        elapsed,
        duration: elapsed.format(FormatPolicy::Detailed),
    }
}

fn missing(id: &str) -> AppError {
    AppError::not_found(format!("record '{id}' not found"))
}

use crate::errors::AppError;
use crate::models::{
    CalendarDay, CalendarResponse, DayRecord, DayResponse, ReloadResponse, SaveDayRequest,
    StatsResponse,
};
use crate::state::AppState;
use crate::stats::{build_stats, classify, date_key, parse_key, today};
use crate::store::normalize_notes;
use crate::ui::{render_dashboard, Banner, DashboardView};
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct IndexParams {
    month: Option<String>,
    selected: Option<String>,
    saved: Option<String>,
    error: Option<String>,
}

pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Html<String> {
    let selected = params
        .selected
        .as_deref()
        .and_then(parse_key)
        .unwrap_or_else(today);
    let month = params
        .month
        .as_deref()
        .and_then(parse_month)
        .or_else(|| selected.with_day(1))
        .unwrap_or(selected);

    let banner = if params.saved.is_some() {
        Some(Banner::Saved(date_key(selected)))
    } else if params.error.is_some() {
        Some(Banner::SaveFailed)
    } else {
        None
    };

    let data = state.data.lock().await;
    let stats = build_stats(&data, &state.track_from);
    let record = data.days.get(&date_key(selected)).cloned();

    Html(render_dashboard(&DashboardView {
        data: &data,
        stats: &stats,
        month,
        selected,
        record: record.as_ref(),
        banner,
        guest: state.source.is_guest(),
        track_from: &state.track_from,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SaveDayForm {
    date: String,
    // Checkboxes submit "on" when ticked and nothing otherwise.
    gym_completed: Option<String>,
    diet_maintained: Option<String>,
    gym_notes: Option<String>,
    diet_notes: Option<String>,
}

pub async fn save_day_form(
    State(state): State<AppState>,
    Form(form): Form<SaveDayForm>,
) -> Redirect {
    // Only a canonical key may reach the redirect location: Redirect::to
    // panics on strings that are not valid header values.
    let Some(date) = parse_key(&form.date) else {
        return Redirect::to("/?error=1");
    };
    let key = date_key(date);

    let record = DayRecord {
        gym_completed: form.gym_completed.is_some(),
        diet_maintained: form.diet_maintained.is_some(),
        gym_notes: normalize_notes(form.gym_notes),
        diet_notes: normalize_notes(form.diet_notes),
    };

    match apply_save(&state, &key, record).await {
        Ok(_) => Redirect::to(&format!("/?selected={key}&saved=1")),
        // Prior state stays untouched; the form re-renders for a retry.
        Err(_) => Redirect::to(&format!("/?selected={key}&error=1")),
    }
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayResponse>, AppError> {
    if parse_key(&date).is_none() {
        return Err(AppError::bad_request("date must be a YYYY-MM-DD calendar date"));
    }
    let data = state.data.lock().await;
    let record = data.days.get(&date).cloned();
    Ok(Json(to_day_response(date, record)))
}

pub async fn save_day(
    State(state): State<AppState>,
    Json(payload): Json<SaveDayRequest>,
) -> Result<Json<DayResponse>, AppError> {
    let record = DayRecord {
        gym_completed: payload.gym_completed,
        diet_maintained: payload.diet_maintained,
        gym_notes: normalize_notes(payload.gym_notes),
        diet_notes: normalize_notes(payload.diet_notes),
    };
    let saved = apply_save(&state, &payload.date, record).await?;
    Ok(Json(to_day_response(payload.date, Some(saved))))
}

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    from: Option<String>,
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<StatsResponse>, AppError> {
    let cutoff = match params.from {
        Some(from) if parse_key(&from).is_some() => from,
        Some(_) => {
            return Err(AppError::bad_request("from must be a YYYY-MM-DD calendar date"));
        }
        None => state.track_from.clone(),
    };
    let data = state.data.lock().await;
    Ok(Json(build_stats(&data, &cutoff)))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<CalendarResponse>, AppError> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Err(AppError::bad_request("month must be a valid year/month pair"));
    };

    let data = state.data.lock().await;
    let mut days = Vec::new();
    let mut date = first;
    while date.month() == month {
        days.push(CalendarDay {
            date: date_key(date),
            status: classify(&data, date),
        });
        date += Duration::days(1);
    }

    Ok(Json(CalendarResponse { year, month, days }))
}

pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, AppError> {
    let days = state.reload().await?;
    Ok(Json(ReloadResponse { days }))
}

/// Shared save path: validates the key, writes through the source, then
/// overwrites the cached map entry. A failed write leaves the map as-is.
async fn apply_save(
    state: &AppState,
    key: &str,
    record: DayRecord,
) -> Result<DayRecord, AppError> {
    if parse_key(key).is_none() {
        return Err(AppError::bad_request("date must be a YYYY-MM-DD calendar date"));
    }

    // The remote upsert is a lookup-then-write; the map lock is held across
    // it so overlapping saves for the same key serialize instead of both
    // taking the insert branch.
    let mut data = state.data.lock().await;
    state.source.upsert(key, &record).await?;
    data.days.insert(key.to_string(), record.clone());
    info!(date = key, "saved tracking data");
    Ok(record)
}

fn to_day_response(date: String, record: Option<DayRecord>) -> DayResponse {
    match record {
        Some(record) => DayResponse {
            date,
            tracked: true,
            gym_completed: record.gym_completed,
            diet_maintained: record.diet_maintained,
            gym_notes: record.gym_notes,
            diet_notes: record.diet_notes,
        },
        None => DayResponse {
            date,
            tracked: false,
            gym_completed: false,
            diet_maintained: false,
            gym_notes: None,
            diet_notes: None,
        },
    }
}

fn parse_month(value: &str) -> Option<NaiveDate> {
    parse_key(&format!("{value}-01"))
}

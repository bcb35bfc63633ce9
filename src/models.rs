use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One calendar day's tracking outcome. The date lives in the map key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DayRecord {
    pub gym_completed: bool,
    pub diet_maintained: bool,
    /// `None` means "no note"; never an empty string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gym_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diet_notes: Option<String>,
}

/// All tracked days, keyed by canonical `YYYY-MM-DD` local-date key.
/// A missing key means "not tracked", which is distinct from a record
/// with both habits false.
#[derive(Debug, Clone, Default)]
pub struct TrackingData {
    pub days: BTreeMap<String, DayRecord>,
}

/// How a calendar day is presented. Exactly one applies per date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Perfect,
    GymOnly,
    DietOnly,
    Skipped,
    Untracked,
}

#[derive(Debug, Deserialize)]
pub struct SaveDayRequest {
    pub date: String,
    #[serde(default)]
    pub gym_completed: bool,
    #[serde(default)]
    pub diet_maintained: bool,
    pub gym_notes: Option<String>,
    pub diet_notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayResponse {
    pub date: String,
    pub tracked: bool,
    pub gym_completed: bool,
    pub diet_maintained: bool,
    pub gym_notes: Option<String>,
    pub diet_notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_days: u32,
    pub total_days_excluding_sundays: u32,
    pub gym_days: u32,
    pub diet_days: u32,
    pub perfect_days: u32,
    pub gym_only_days: u32,
    pub gym_success_rate: u32,
    pub diet_success_rate: u32,
    pub perfect_day_rate: u32,
    pub current_gym_streak: u32,
    pub current_diet_streak: u32,
    pub current_perfect_streak: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: String,
    pub status: DayStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub days: usize,
}

use crate::models::{DayRecord, TrackingData};
use crate::remote::RemoteStore;
use crate::stats::date_key;
use chrono::NaiveDate;
use rand::Rng;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no signed-in user and not in guest mode")]
    SourceUnavailable,
    #[error("failed to read tracking data: {0}")]
    ReadFailed(String),
    #[error("failed to write tracking data: {0}")]
    WriteFailed(String),
    // Reserved for future record validation at the adapter boundary.
    #[error("invalid tracking data: {0}")]
    Validation(String),
}

/// Where day records come from. Guest mode serves synthetic in-memory data;
/// the remote source talks to the hosted row store.
pub enum TrackingSource {
    Guest,
    Remote(RemoteStore),
}

impl TrackingSource {
    pub fn is_guest(&self) -> bool {
        matches!(self, TrackingSource::Guest)
    }

    /// Fetch or generate every record with date >= `cutoff`.
    pub async fn load(&self, cutoff: &str) -> Result<TrackingData, StoreError> {
        match self {
            TrackingSource::Guest => {
                let data = generate_sample_data();
                info!(days = data.days.len(), "generated guest sample data");
                Ok(data)
            }
            TrackingSource::Remote(remote) => remote.fetch_range(cutoff).await,
        }
    }

    /// Write or overwrite the record for `date_key`. Last-write-wins, so
    /// retrying the same pair is safe. The guest source has nothing to
    /// persist; the caller overwrites its in-memory map entry either way.
    pub async fn upsert(&self, date_key: &str, record: &DayRecord) -> Result<(), StoreError> {
        match self {
            TrackingSource::Guest => Ok(()),
            TrackingSource::Remote(remote) => remote.upsert(date_key, record).await,
        }
    }
}

/// Empty and whitespace-only notes collapse to "no note".
pub fn normalize_notes(input: Option<String>) -> Option<String> {
    input
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

const SAMPLE_GYM_NOTE: &str = "Great workout!";
const SAMPLE_DIET_NOTE: &str = "Stayed on track";

const SAMPLE_YEAR: i32 = 2025;
const SAMPLE_MONTH: u32 = 5;

/// Synthetic guest-mode data over a fixed one-month window (May 2025).
/// Each day is present with p=0.7; absence means "not tracked". Per
/// present day: gym true with p=0.7, diet true with p=0.6, notes present
/// with p=0.3 and p=0.2. The probabilities are the contract, not exact
/// sequences.
pub fn generate_sample_data() -> TrackingData {
    let mut rng = rand::rng();
    let mut data = TrackingData::default();

    for day in 1..=31 {
        let Some(date) = NaiveDate::from_ymd_opt(SAMPLE_YEAR, SAMPLE_MONTH, day) else {
            continue;
        };
        if !rng.random_bool(0.7) {
            continue;
        }
        let record = DayRecord {
            gym_completed: rng.random_bool(0.7),
            diet_maintained: rng.random_bool(0.6),
            gym_notes: rng.random_bool(0.3).then(|| SAMPLE_GYM_NOTE.to_string()),
            diet_notes: rng.random_bool(0.2).then(|| SAMPLE_DIET_NOTE.to_string()),
        };
        data.days.insert(date_key(date), record);
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::parse_key;

    #[test]
    fn notes_normalization() {
        assert_eq!(normalize_notes(None), None);
        assert_eq!(normalize_notes(Some("".to_string())), None);
        assert_eq!(normalize_notes(Some("  ".to_string())), None);
        assert_eq!(
            normalize_notes(Some("Great set".to_string())),
            Some("Great set".to_string())
        );
        assert_eq!(
            normalize_notes(Some("  padded  ".to_string())),
            Some("padded".to_string())
        );
    }

    #[test]
    fn sample_data_stays_inside_the_window() {
        let data = generate_sample_data();
        let start = NaiveDate::from_ymd_opt(SAMPLE_YEAR, SAMPLE_MONTH, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(SAMPLE_YEAR, SAMPLE_MONTH, 31).unwrap();
        for key in data.days.keys() {
            let date = parse_key(key).expect("sample keys are canonical");
            assert!(date >= start && date <= end, "out of window: {key}");
        }
    }

    #[test]
    fn sample_notes_use_the_fixed_strings() {
        let data = generate_sample_data();
        for record in data.days.values() {
            if let Some(note) = &record.gym_notes {
                assert_eq!(note, SAMPLE_GYM_NOTE);
            }
            if let Some(note) = &record.diet_notes {
                assert_eq!(note, SAMPLE_DIET_NOTE);
            }
        }
    }

    #[tokio::test]
    async fn guest_upsert_is_a_no_op_success() {
        let source = TrackingSource::Guest;
        let record = DayRecord::default();
        assert!(source.upsert("2025-05-10", &record).await.is_ok());
    }
}

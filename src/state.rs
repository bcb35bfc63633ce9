use crate::models::TrackingData;
use crate::store::{StoreError, TrackingSource};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<TrackingSource>,
    /// Inclusive lower bound for the statistics view, canonical key form.
    pub track_from: String,
    pub data: Arc<Mutex<TrackingData>>,
    load_generation: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(source: TrackingSource, track_from: String, data: TrackingData) -> Self {
        Self {
            source: Arc::new(source),
            track_from,
            data: Arc::new(Mutex::new(data)),
            load_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Re-fetch from the source and replace the cached map wholesale.
    /// Returns the number of days now cached. A reload superseded by a
    /// newer one discards its response instead of clobbering newer state.
    pub async fn reload(&self) -> Result<usize, StoreError> {
        let generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let fresh = self.source.load(&self.track_from).await?;
        let days = fresh.days.len();

        let mut guard = self.data.lock().await;
        if self.load_generation.load(Ordering::SeqCst) == generation {
            *guard = fresh;
            Ok(days)
        } else {
            debug!(generation, "discarding stale load response");
            Ok(guard.days.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayRecord;

    #[test]
    fn state_is_cheap_to_clone_and_shares_the_map() {
        let state = AppState::new(
            TrackingSource::Guest,
            "2025-05-01".to_string(),
            TrackingData::default(),
        );
        let other = state.clone();
        {
            let mut guard = state.data.try_lock().unwrap();
            guard
                .days
                .insert("2025-05-10".to_string(), DayRecord::default());
        }
        assert_eq!(other.data.try_lock().unwrap().days.len(), 1);
    }

    #[tokio::test]
    async fn reload_replaces_the_cached_map() {
        let state = AppState::new(
            TrackingSource::Guest,
            "2025-05-01".to_string(),
            TrackingData::default(),
        );
        let days = state.reload().await.unwrap();
        assert_eq!(state.data.lock().await.days.len(), days);
    }
}

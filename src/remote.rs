use crate::models::{DayRecord, TrackingData};
use crate::store::StoreError;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

const TABLE: &str = "tracking_data";

/// Thin client for the hosted row store (PostgREST-style API). One row per
/// (user, date); the adapter never sees transport or schema details beyond
/// this module.
pub struct RemoteStore {
    client: Client,
    base_url: String,
    api_key: String,
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrackingRow {
    date: String,
    gym: bool,
    diet: bool,
    gym_notes: Option<String>,
    diet_notes: Option<String>,
}

#[derive(Debug, Serialize)]
struct RowBody<'a> {
    user_id: &'a str,
    date: &'a str,
    gym: bool,
    diet: bool,
    gym_notes: Option<&'a str>,
    diet_notes: Option<&'a str>,
    updated_at: String,
}

impl RemoteStore {
    /// `user_id` is `None` when no session is active; every operation then
    /// reports the source as unavailable instead of guessing an identity.
    pub fn new(base_url: String, api_key: String, user_id: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            user_id,
        }
    }

    fn user(&self) -> Result<&str, StoreError> {
        self.user_id.as_deref().ok_or(StoreError::SourceUnavailable)
    }

    fn table_url(&self) -> String {
        format!("{}/{TABLE}", self.base_url)
    }

    /// All rows for the active user with date >= `cutoff`, most recent
    /// first, folded into the uniform per-day map.
    pub async fn fetch_range(&self, cutoff: &str) -> Result<TrackingData, StoreError> {
        let user = self.user()?;
        let rows: Vec<TrackingRow> = self
            .client
            .get(self.table_url())
            .query(&[
                ("user_id", format!("eq.{user}")),
                ("date", format!("gte.{cutoff}")),
                ("order", "date.desc".to_string()),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|err| StoreError::ReadFailed(err.to_string()))?
            .error_for_status()
            .map_err(|err| StoreError::ReadFailed(err.to_string()))?
            .json()
            .await
            .map_err(|err| StoreError::ReadFailed(err.to_string()))?;

        let data = rows_to_data(rows);
        info!(days = data.days.len(), "loaded tracking data from remote store");
        Ok(data)
    }

    /// Update-by-id when a row for (user, date) already exists, insert
    /// otherwise. Overwrite semantics make retries with the same pair
    /// last-write-wins safe.
    pub async fn upsert(&self, date_key: &str, record: &DayRecord) -> Result<(), StoreError> {
        let user = self.user()?.to_string();
        let body = RowBody {
            user_id: &user,
            date: date_key,
            gym: record.gym_completed,
            diet: record.diet_maintained,
            gym_notes: record.gym_notes.as_deref(),
            diet_notes: record.diet_notes.as_deref(),
            updated_at: Utc::now().to_rfc3339(),
        };

        match self.find_row_id(&user, date_key).await? {
            Some(id) => {
                self.client
                    .patch(self.table_url())
                    .query(&[("id", format!("eq.{id}"))])
                    .header("apikey", &self.api_key)
                    .bearer_auth(&self.api_key)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|err| StoreError::WriteFailed(err.to_string()))?
                    .error_for_status()
                    .map_err(|err| StoreError::WriteFailed(err.to_string()))?;
            }
            None => {
                let mut insert = json!(body);
                insert["created_at"] = json!(Utc::now().to_rfc3339());
                self.client
                    .post(self.table_url())
                    .header("apikey", &self.api_key)
                    .bearer_auth(&self.api_key)
                    .json(&insert)
                    .send()
                    .await
                    .map_err(|err| StoreError::WriteFailed(err.to_string()))?
                    .error_for_status()
                    .map_err(|err| StoreError::WriteFailed(err.to_string()))?;
            }
        }
        Ok(())
    }

    async fn find_row_id(&self, user: &str, date_key: &str) -> Result<Option<String>, StoreError> {
        #[derive(Deserialize)]
        struct IdRow {
            id: String,
        }

        let rows: Vec<IdRow> = self
            .client
            .get(self.table_url())
            .query(&[
                ("user_id", format!("eq.{user}")),
                ("date", format!("eq.{date_key}")),
                ("select", "id".to_string()),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|err| StoreError::ReadFailed(err.to_string()))?
            .error_for_status()
            .map_err(|err| StoreError::ReadFailed(err.to_string()))?
            .json()
            .await
            .map_err(|err| StoreError::ReadFailed(err.to_string()))?;

        Ok(rows.into_iter().next().map(|row| row.id))
    }
}

fn rows_to_data(rows: Vec<TrackingRow>) -> TrackingData {
    let mut data = TrackingData::default();
    for row in rows {
        data.days.insert(
            row.date,
            DayRecord {
                gym_completed: row.gym,
                diet_maintained: row.diet,
                gym_notes: row.gym_notes.filter(|n| !n.is_empty()),
                diet_notes: row.diet_notes.filter(|n| !n.is_empty()),
            },
        );
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_fold_into_day_records_with_empty_notes_dropped() {
        let payload = r#"[
            {"id": "a1", "date": "2025-05-23", "gym": true, "diet": false,
             "gym_notes": "Great set", "diet_notes": ""},
            {"id": "a2", "date": "2025-05-22", "gym": false, "diet": true,
             "gym_notes": null, "diet_notes": "Stayed on track"}
        ]"#;
        let rows: Vec<TrackingRow> = serde_json::from_str(payload).unwrap();
        let data = rows_to_data(rows);

        let first = &data.days["2025-05-23"];
        assert!(first.gym_completed);
        assert_eq!(first.gym_notes.as_deref(), Some("Great set"));
        assert_eq!(first.diet_notes, None);
        let second = &data.days["2025-05-22"];
        assert!(second.diet_maintained);
        assert_eq!(second.diet_notes.as_deref(), Some("Stayed on track"));
    }

    #[tokio::test]
    async fn missing_user_reports_source_unavailable() {
        let store = RemoteStore::new("http://localhost:9".to_string(), "key".to_string(), None);
        let err = store.fetch_range("2025-05-01").await.unwrap_err();
        assert!(matches!(err, StoreError::SourceUnavailable));
    }
}

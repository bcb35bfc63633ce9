use crate::stats::parse_key;
use std::env;
use tracing::warn;

const DEFAULT_TRACK_FROM: &str = "2025-05-01";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Default cutoff for the statistics view, canonical key form.
    pub track_from: String,
    /// Absent means guest mode with synthetic data.
    pub remote: Option<RemoteConfig>,
}

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    /// No user id means no active session: the remote source stays
    /// configured but every operation reports it unavailable.
    pub user_id: Option<String>,
}

pub fn from_env() -> Config {
    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let track_from = match env::var("TRACK_FROM") {
        Ok(value) if parse_key(&value).is_some() => value,
        Ok(value) => {
            warn!("TRACK_FROM {value:?} is not a YYYY-MM-DD date, using {DEFAULT_TRACK_FROM}");
            DEFAULT_TRACK_FROM.to_string()
        }
        Err(_) => DEFAULT_TRACK_FROM.to_string(),
    };

    let remote = match (env::var("REMOTE_BASE_URL"), env::var("REMOTE_API_KEY")) {
        (Ok(base_url), Ok(api_key)) => Some(RemoteConfig {
            base_url,
            api_key,
            user_id: env::var("REMOTE_USER_ID").ok(),
        }),
        (Ok(_), Err(_)) => {
            warn!("REMOTE_BASE_URL set without REMOTE_API_KEY, falling back to guest mode");
            None
        }
        _ => None,
    };

    Config {
        port,
        track_from,
        remote,
    }
}

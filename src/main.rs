use habit_tracker::config;
use habit_tracker::models::TrackingData;
use habit_tracker::remote::RemoteStore;
use habit_tracker::store::TrackingSource;
use habit_tracker::AppState;
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = config::from_env();

    let source = match config.remote {
        Some(remote) => {
            info!(base_url = %remote.base_url, "using remote tracking store");
            TrackingSource::Remote(RemoteStore::new(
                remote.base_url,
                remote.api_key,
                remote.user_id,
            ))
        }
        None => {
            info!("no remote store configured, running in guest mode");
            TrackingSource::Guest
        }
    };

    // A failed initial load starts the dashboard empty; /api/reload can
    // retry once the remote store is reachable again.
    let data = match source.load(&config.track_from).await {
        Ok(data) => data,
        Err(err) => {
            error!("initial load failed: {err}");
            TrackingData::default()
        }
    };

    let state = AppState::new(source, config.track_from, data);
    let app = habit_tracker::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

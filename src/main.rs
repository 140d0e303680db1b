//! Headless gameday runner: keeps one event's snapshot live against the backend
//! and logs every change until interrupted.

use std::{env, sync::Arc};

use anyhow::Context;
use futures::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gameday_core::{
    Collaborators, Coordinator,
    config::AppConfig,
    dao::{
        http::{HttpApiClient, HttpConfig},
        location::StaticLocationService,
        websocket::WebSocketConnector,
    },
    dto::check_in::Coordinates,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let event_id = env::var("GAMEDAY_EVENT_ID").context("GAMEDAY_EVENT_ID must be set")?;
    let token = env::var("GAMEDAY_API_TOKEN").ok();
    let auto_check_in = env::var("GAMEDAY_AUTO_CHECK_IN")
        .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    let config = AppConfig::load();

    let mut http_config =
        HttpConfig::new(&config.api_base_url).with_request_timeout(config.request_timeout);
    let mut connector = WebSocketConnector::new(&config.realtime_base_url);
    if let Some(token) = token.as_deref() {
        http_config = http_config.with_bearer_token(token);
        connector = connector.with_bearer_token(token);
    }
    let api = Arc::new(HttpApiClient::new(http_config).context("building REST client")?);

    let location = match static_position()? {
        Some(coordinates) => StaticLocationService::new(coordinates),
        None => StaticLocationService::unavailable(),
    };

    let coordinator = Coordinator::new(
        event_id,
        Collaborators {
            events: api.clone(),
            check_ins: api.clone(),
            activations: api.clone(),
            leaderboards: api,
            location: Arc::new(location),
            realtime: Arc::new(connector),
        },
        config.timings(),
    );

    let mut snapshots = coordinator.snapshot_stream();
    let logger = tokio::spawn(async move {
        while let Some(snapshot) = snapshots.next().await {
            match serde_json::to_string(&snapshot.summary()) {
                Ok(summary) => info!(%summary, "snapshot updated"),
                Err(err) => warn!(error = %err, "failed to encode snapshot summary"),
            }
        }
    });

    coordinator.on_appear().await;
    info!(event_id = coordinator.event_id(), "gameday session running");

    if auto_check_in {
        match coordinator.start_check_in().await {
            Some(outcome) => info!(?outcome, "check-in finished"),
            None => warn!("check-in not started"),
        }
    }

    shutdown_signal().await?;
    coordinator.on_disappear().await;
    logger.abort();

    Ok(())
}

/// Fixed position for check-in, read from `GAMEDAY_LATITUDE` / `GAMEDAY_LONGITUDE`.
fn static_position() -> anyhow::Result<Option<Coordinates>> {
    let (Ok(latitude), Ok(longitude)) = (env::var("GAMEDAY_LATITUDE"), env::var("GAMEDAY_LONGITUDE"))
    else {
        return Ok(None);
    };

    Ok(Some(Coordinates {
        latitude: latitude.parse().context("parsing GAMEDAY_LATITUDE")?,
        longitude: longitude.parse().context("parsing GAMEDAY_LONGITUDE")?,
        accuracy: 0.0,
    }))
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,gameday_core=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("installing Ctrl+C handler")?;
    }

    Ok(())
}

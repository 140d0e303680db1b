//! Application-level configuration loading, including the coordinator timings.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the runner looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/gameday.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GAMEDAY_CONFIG_PATH";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_REALTIME_BASE_URL: &str = "ws://localhost:8080/ws";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_BEACON_SCAN_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_BEACON_CONFIRM_PAUSE_MS: u64 = 800;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Durations driving the coordinator's background work and check-in flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamedayTimings {
    /// Cadence of the fallback poller.
    pub poll_interval: Duration,
    /// Upper bound on waiting for a venue beacon reading.
    pub beacon_scan_timeout: Duration,
    /// Pause in `beaconFound` so the confirmation can be seen.
    pub beacon_confirm_pause: Duration,
}

impl Default for GamedayTimings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            beacon_scan_timeout: Duration::from_millis(DEFAULT_BEACON_SCAN_TIMEOUT_MS),
            beacon_confirm_pause: Duration::from_millis(DEFAULT_BEACON_CONFIRM_PAUSE_MS),
        }
    }
}

/// Immutable runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the REST API.
    pub api_base_url: String,
    /// Base URL of the push endpoint.
    pub realtime_base_url: String,
    /// Per-request timeout for REST calls.
    pub request_timeout: Duration,
    timings: GamedayTimings,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        api = %app_config.api_base_url,
                        poll_interval_secs = app_config.timings.poll_interval.as_secs(),
                        "loaded gameday config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Timings handed to the coordinator.
    pub fn timings(&self) -> GamedayTimings {
        self.timings
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    api_base_url: Option<String>,
    realtime_base_url: Option<String>,
    poll_interval_secs: Option<u64>,
    beacon_scan_timeout_ms: Option<u64>,
    beacon_confirm_pause_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        // A zero poll interval would spin; treat it as unset.
        let poll_interval_secs = value
            .poll_interval_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

        Self {
            api_base_url: value
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.into()),
            realtime_base_url: value
                .realtime_base_url
                .unwrap_or_else(|| DEFAULT_REALTIME_BASE_URL.into()),
            request_timeout: Duration::from_secs(
                value
                    .request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            timings: GamedayTimings {
                poll_interval: Duration::from_secs(poll_interval_secs),
                beacon_scan_timeout: Duration::from_millis(
                    value
                        .beacon_scan_timeout_ms
                        .unwrap_or(DEFAULT_BEACON_SCAN_TIMEOUT_MS),
                ),
                beacon_confirm_pause: Duration::from_millis(
                    value
                        .beacon_confirm_pause_ms
                        .unwrap_or(DEFAULT_BEACON_CONFIRM_PAUSE_MS),
                ),
            },
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> AppConfig {
        serde_json::from_str::<RawConfig>(raw).unwrap().into()
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("{}");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.timings(), GamedayTimings::default());
        assert_eq!(config.timings().poll_interval, Duration::from_secs(60));
    }

    #[test]
    fn overrides_are_applied() {
        let config = parse(
            r#"{
                "apiBaseUrl": "https://api.example.com",
                "pollIntervalSecs": 30,
                "beaconScanTimeoutMs": 2000,
                "beaconConfirmPauseMs": 0
            }"#,
        );

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.realtime_base_url, DEFAULT_REALTIME_BASE_URL);
        assert_eq!(config.timings().poll_interval, Duration::from_secs(30));
        assert_eq!(
            config.timings().beacon_scan_timeout,
            Duration::from_millis(2000)
        );
        assert_eq!(config.timings().beacon_confirm_pause, Duration::ZERO);
    }

    #[test]
    fn zero_poll_interval_falls_back_to_default() {
        let config = parse(r#"{"pollIntervalSecs": 0}"#);
        assert_eq!(config.timings().poll_interval, Duration::from_secs(60));
    }
}

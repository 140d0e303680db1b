mod client;
/// Client settings.
pub mod config;

pub use client::HttpApiClient;
pub use config::HttpConfig;

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Settings for the whole service, loaded once at startup.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub site: SiteConfig,
    pub geocoder: GeocoderConfig,
    pub rate_limit: RateLimitConfig,
    pub alerts: AlertsConfig,
}

/// Arc-wrapped so every subsystem can hold a clone.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// PEM certificate and key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials; `None` for unauthenticated engines such as `mem://`.
    pub credentials: Option<DatabaseCredentials>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Extra `EnvFilter` directives, e.g. `dayqhi_alerts=debug`.
    pub filter: Option<String>,
    /// Enables rolling file output when set.
    pub directory: Option<PathBuf>,
    pub json: bool,
}

/// Document-level settings for the HTML shell.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub description: String,
    pub font: FontConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    pub subsets: Vec<String>,
}

/// Nominatim-compatible search endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests: u32,
    pub window_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Distance from a reading within which an alert location matches.
    pub radius_km: f64,
    pub channel_capacity: usize,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 3000, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mem://".to_owned(),
            namespace: "dayqhi".to_owned(),
            database: "aqhi".to_owned(),
            credentials: None,
        }
    }
}

impl Default for DatabaseCredentials {
    fn default() -> Self {
        Self { username: "root".to_owned(), password: "root".to_owned() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), filter: None, directory: None, json: false }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "DayQHI".to_owned(),
            description: "Subscribe to real-time alerts for your local AQHI".to_owned(),
            font: FontConfig::default(),
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { family: "Inter".to_owned(), subsets: vec!["latin".to_owned()] }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: "https://nominatim.openstreetmap.org".to_owned(),
            user_agent: concat!("dayqhi/", env!("CARGO_PKG_VERSION")).to_owned(),
            timeout_seconds: 10,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { enabled: true, requests: 60, window_seconds: 60 }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self { radius_km: 25.0, channel_capacity: 256 }
    }
}

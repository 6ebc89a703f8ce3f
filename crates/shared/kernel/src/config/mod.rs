use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix for environment overrides, e.g. `DAYQHI__DATABASE__URL`.
pub const ENV_PREFIX: &str = "DAYQHI";

#[dayqhi_derive::dayqhi_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration file and overlays `DAYQHI__*` environment variables.
///
/// The file (default `server`, any extension the `config` crate understands) is required.
/// Nested keys use a double underscore: `DAYQHI__RATE_LIMIT__REQUESTS=10` sets
/// `rate_limit.requests`.
///
/// # Errors
/// Fails when the file is missing or the merged values do not match `T`.
///
/// # Example
/// ```rust
/// use dayqhi_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    info!(path = %effective_path.display(), "Loading configuration");

    let config = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

use anyhow::Context;
use dayqhi::domain::config::{ApiConfig, LoggingConfig};
use dayqhi::kernel::config::load_config;
use dayqhi_logger::{Logger, parse_level};
use dayqhi_server::Server;

fn init_logger(cfg: &LoggingConfig) -> anyhow::Result<Logger> {
    let mut builder =
        Logger::builder().name(env!("CARGO_PKG_NAME")).level(parse_level(&cfg.level)?);
    if let Some(filter) = &cfg.filter {
        builder = builder.env_filter(filter);
    }

    let logger = match &cfg.directory {
        Some(directory) => builder.path(directory.clone()).json(cfg.json).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}

#[dayqhi_runtime::main(high_performance)]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig =
        load_config(Some("server")).context("Critical: Configuration is malformed")?;
    let _log = init_logger(&cfg.logging)?;

    Server::builder().config(cfg).build().await?.run().await
}

use anyhow::Context;
use ninja_kernel::config::SettingsLoader;
use ninja_logger::{LevelFilter, Logger};
use ninja_server::Server;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loader = SettingsLoader::new();
    let env_file = loader.env_file_in_use().map(|path| path.display().to_string());
    let settings = loader.load().context("Critical: Configuration is malformed")?;

    let (level, directives) = if settings.debug {
        (LevelFilter::DEBUG, "hyper=info,sqlx=debug,tower_http=debug")
    } else {
        (LevelFilter::INFO, "hyper=warn,sqlx=warn")
    };
    let mut logger = Logger::builder(env!("CARGO_PKG_NAME")).level(level).directives(directives);
    if let Some(dir) = &settings.log_dir {
        logger = logger.file(dir).json(settings.log_json);
    }
    let _log = logger.init()?;

    info!(env_file = env_file.as_deref().unwrap_or("none"), ?settings, "Settings loaded");

    Server::builder().settings(settings).build().await?.run().await
}

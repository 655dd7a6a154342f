use anyhow::Result;
use clap::Parser;
use taskdesk::{cli, util, Config};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Must happen before anything asks for a path
    util::init_data_dir(cli.data_dir.clone());

    // Logging comes up before the config is read so that config problems are
    // reported. RUST_LOG wins over the configured filter.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let initial = env_filter.unwrap_or_else(|| EnvFilter::new(Config::default().log.filter));
    let (filter, filter_handle) = reload::Layer::new(initial);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load();

    if !from_env {
        match EnvFilter::try_new(&config.log.filter) {
            Ok(configured) => {
                if let Err(e) = filter_handle.reload(configured) {
                    tracing::warn!(error = %e, "Failed to apply configured log filter");
                }
            }
            Err(e) => tracing::warn!(
                filter = %config.log.filter,
                error = %e,
                "Invalid log filter in config, keeping the default"
            ),
        }
    }

    cli::run(cli.into_command(), config).await
}

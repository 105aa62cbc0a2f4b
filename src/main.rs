//! hnetdb - HNET node registry

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hnetdb::cli::App;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let app = App::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(app.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    app.run().await
}

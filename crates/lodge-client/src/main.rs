use clap::Parser;

use lodge_client_lib::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lodge_client_lib::init_tracing();

    let cli = Cli::parse();
    tracing::debug!(?cli, "Starting {} client v{}", lodge_shared::constants::APP_NAME, env!("CARGO_PKG_VERSION"));

    cli::run(cli).await
}

use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    version,
    about = "HTTP service computing windowed statistics over sensor timeseries"
)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "TSCOMPUTE_HOST", default_value = "0.0.0.0")]
    host: IpAddr,
    #[arg(long, env = "TSCOMPUTE_PORT", default_value_t = 8060)]
    port: u16,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    tscompute_server::http::server(SocketAddr::new(cli.host, cli.port)).await
}

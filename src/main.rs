use clap::Parser;
use media_resolver_lib::{run, ResolverConfig};
use std::net::{IpAddr, SocketAddr};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Resolve social video links to direct media URLs and relay downloads
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Log filter, overrides RUST_LOG (e.g. "media_resolver_lib=debug")
    #[arg(long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = match &cli.log {
        Some(directives) => tracing_subscriber::EnvFilter::try_new(directives)?,
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "media_resolver_lib=info,media_resolver=info,tower_http=info".into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ResolverConfig::from_env();
    run(config, SocketAddr::new(cli.host, cli.port)).await
}

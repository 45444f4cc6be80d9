use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use http_server::config::DEFAULT_PORT;
use http_server::{Config, ReadStrategy, Server};

#[derive(Parser, Debug)]
#[command(name = "http-server")]
#[command(about = "A small HTTP/1.1 server with persistent connections", long_about = None)]
struct Args {
    /// Directory served under /files/
    #[arg(long, default_value = ".")]
    directory: PathBuf,

    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// `incremental` keeps connections alive, `bulk` answers one request per connection
    #[arg(long, default_value_t = ReadStrategy::Incremental)]
    read_strategy: ReadStrategy,

    #[arg(long, default_value_t = tracing::Level::INFO)]
    log_level: tracing::Level,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();
    info!("starting server.");

    let config = Config {
        directory: args.directory,
        addr: SocketAddr::new(args.host, args.port),
        read_strategy: args.read_strategy,
    };
    let server = Server::bind(&config).await?;
    server.run().await
}

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task;
use tracing::{debug, info, info_span, Instrument};

use crate::config::{Config, ReadStrategy};
use crate::connection;
use crate::handlers;
use crate::router::Router;

/// Accepts TCP connections and serves each one on its own task.
pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
    read_strategy: ReadStrategy,
}

impl Server {
    /// Binds `config.addr` and builds the route table from `config`.
    pub async fn bind(config: &Config) -> anyhow::Result<Self> {
        Self::bind_with_router(config, handlers::routes(config)).await
    }

    pub async fn bind_with_router(config: &Config, router: Router) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.addr).await?;
        let addr = listener.local_addr()?;
        info!(
            ip = addr.ip().to_string(),
            port = addr.port(),
            directory = %config.directory.display(),
            strategy = %config.read_strategy,
            "bound tcp server."
        );
        Ok(Self {
            listener,
            router: Arc::new(router),
            read_strategy: config.read_strategy,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop. Accept failures are logged and skipped, so this
    /// only returns if the task is dropped.
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(error) => {
                    debug!(?error, "failed to accept tcp stream.");
                    continue;
                }
            };
            info!(addr = addr.to_string(), "successfully accepted new tcp stream.");

            let router = Arc::clone(&self.router);
            let strategy = self.read_strategy;
            let span = info_span!("connection", http.ip = %addr);
            task::spawn(
                async move {
                    if let Err(error) = connection::serve(stream, &router, strategy).await {
                        debug!(?error, "connection ended with an error.");
                    }
                }
                .instrument(span),
            );
        }
    }
}

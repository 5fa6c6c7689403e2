use std::{
    future::Future,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use anyhow::{Context, Result};
use tokio::{
    net::{TcpListener, TcpStream},
    select,
};
use tracing::{Instrument, info, info_span, warn};

use crate::{
    connection,
    registry::{ConnectionId, Registry},
};

/// Accepts clients and gives each one its own connection task.
pub struct Server {
    listener: TcpListener,
    registry: Arc<Registry>,
    next_id: AtomicU64,
}

impl Server {
    pub fn new(listener: TcpListener) -> Self {
        Self {
            listener,
            registry: Arc::new(Registry::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        Ok(Self::new(listener))
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared handle to the name registry, for inspecting who is connected.
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);

        loop {
            select! {
                _ = &mut shutdown => {
                    info!("server shutting down");
                    break;
                }
                accept_result = self.listener.accept() => {
                    self.handle_accept_result(accept_result);
                }
            }
        }

        Ok(())
    }

    pub async fn run_until_ctrl_c(self) -> Result<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
            }
        })
        .await
    }

    fn handle_accept_result(&self, result: std::io::Result<(TcpStream, SocketAddr)>) {
        match result {
            Ok((stream, peer)) => self.spawn_connection(stream, peer),
            Err(err) => warn!(error = ?err, "failed to accept connection"),
        }
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr) {
        let id = self.next_id();
        let registry = Arc::clone(&self.registry);
        info!(id, %peer, "client connected");

        let span = info_span!("connection", id, %peer);
        tokio::spawn(
            async move {
                if let Err(err) = connection::serve(stream, id, registry).await {
                    warn!(error = ?err, "client connection closed with error");
                }
            }
            .instrument(span),
        );
    }

    fn next_id(&self) -> ConnectionId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

use std::{io, sync::Arc, time::Duration};

use anyhow::Result;
use tokio::{
    io::{AsyncBufRead, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    sync::mpsc,
    time::timeout,
};
use tracing::{debug, info, warn};

use crate::{
    frame::{read_frame, write_frame},
    message::{Message, Request},
    outbox::{OUTBOX_CAPACITY, Outbox},
    registry::{ConnectionId, RegisterError, Registry},
    router::Router,
};

/// How long a closing connection waits for queued payloads to reach a client
/// that has stopped reading.
const WRITER_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Unregistered,
    Active { name: String },
    Closed,
}

/// Whether the read loop should keep going after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close,
}

/// Server-side state of one client connection.
///
/// The first frame becomes the connection's name. Later frames are parsed as
/// `destination:content` and routed. Once closed, the connection's registry
/// entry is gone and further frames are ignored.
pub struct Connection {
    id: ConnectionId,
    state: ConnectionState,
    registry: Arc<Registry>,
    router: Router,
    outbox: Outbox,
}

impl Connection {
    pub fn new(id: ConnectionId, registry: Arc<Registry>, outbox: Outbox) -> Self {
        let router = Router::new(Arc::clone(&registry));
        Self {
            id,
            state: ConnectionState::Unregistered,
            registry,
            router,
            outbox,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn name(&self) -> Option<&str> {
        match &self.state {
            ConnectionState::Active { name } => Some(name),
            _ => None,
        }
    }

    pub async fn handle_frame(&mut self, frame: String) -> Flow {
        match &self.state {
            ConnectionState::Unregistered => self.register(frame).await,
            ConnectionState::Active { name } => {
                let sender = name.clone();
                self.dispatch(sender, &frame).await
            }
            ConnectionState::Closed => Flow::Close,
        }
    }

    async fn register(&mut self, name: String) -> Flow {
        match self
            .registry
            .register(&name, self.id, self.outbox.clone())
            .await
        {
            Ok(()) => {
                info!(id = self.id, %name, "client registered");
                self.state = ConnectionState::Active { name };
                Flow::Continue
            }
            Err(RegisterError::NameTaken) => {
                warn!(id = self.id, %name, "rejecting registration, name already in use");
                self.state = ConnectionState::Closed;
                Flow::Close
            }
        }
    }

    async fn dispatch(&mut self, sender: String, frame: &str) -> Flow {
        match Request::parse(frame) {
            Some(Request::Leave) => {
                self.close().await;
                Flow::Close
            }
            Some(Request::Send {
                destination,
                content,
            }) => {
                self.router
                    .route(Message {
                        sender,
                        destination,
                        content,
                    })
                    .await;
                Flow::Continue
            }
            None => {
                debug!(id = self.id, %sender, "dropping frame without destination");
                Flow::Continue
            }
        }
    }

    /// Moves to `Closed`, releasing the registered name. Safe to call repeatedly.
    pub async fn close(&mut self) {
        match std::mem::replace(&mut self.state, ConnectionState::Closed) {
            ConnectionState::Active { name } => {
                self.registry.unregister(&name, self.id).await;
                info!(id = self.id, %name, "client disconnected");
            }
            ConnectionState::Unregistered => {
                info!(id = self.id, "client disconnected before registering");
            }
            ConnectionState::Closed => {}
        }
    }
}

/// Runs one connection to completion: reads frames, routes them, and tears the
/// transport down once the peer leaves, errors, or sends the leave keyword.
pub async fn serve<S>(stream: S, id: ConnectionId, registry: Arc<Registry>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (reader, writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let (outbox, inbox) = Outbox::channel(OUTBOX_CAPACITY);
    let mut writer_task = tokio::spawn(drain_outbox(writer, inbox));

    let mut connection = Connection::new(id, registry, outbox);
    let result = read_loop(&mut connection, &mut reader).await;
    connection.close().await;

    // The writer stops once every outbox handle is gone, then shuts the stream down.
    drop(connection);
    match timeout(WRITER_GRACE, &mut writer_task).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(id, error = ?err, "connection writer task failed"),
        Err(_) => {
            debug!(id, "client stopped reading, abandoning queued payloads");
            writer_task.abort();
        }
    }

    result.map_err(Into::into)
}

async fn read_loop<R>(connection: &mut Connection, reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    while let Some(frame) = read_frame(reader).await? {
        if connection.handle_frame(frame).await == Flow::Close {
            break;
        }
    }
    Ok(())
}

async fn drain_outbox<W>(mut writer: W, mut inbox: mpsc::Receiver<String>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(payload) = inbox.recv().await {
        if let Err(err) = write_frame(&mut writer, &payload).await {
            debug!(?err, "failed to deliver message to client");
            break;
        }
    }

    if let Err(err) = writer.shutdown().await {
        debug!(?err, "failed to shut down client stream");
    }
}

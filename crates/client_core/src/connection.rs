//! Transport lifecycle for the simulation server websocket.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use futures::{SinkExt, StreamExt};
use shared::domain::{ConnectionState, ServerAddress, SimulationState};
use tokio::{
    net::TcpStream,
    sync::{mpsc, Mutex},
    task::JoinHandle,
};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{protocol::CloseFrame, Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{error, info, warn};

use crate::{
    client::ClientCore, error::TransportError, presentation::PresentationPort,
    session::SessionState,
};

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportPhase {
    Connecting,
    Open,
    Closed,
}

/// How a live transport ended. Only logging and presentation tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportClose {
    Clean(Option<String>),
    Error(String),
}

/// A connect that has claimed an epoch but not finished its handshake.
pub(crate) struct PendingConnect {
    epoch: u64,
    address: ServerAddress,
    url: String,
}

/// Runs the websocket handshake for a pending connect, bounded by
/// [`CONNECT_TIMEOUT`].
pub(crate) async fn open(pending: &PendingConnect) -> Result<WsStream, String> {
    match tokio::time::timeout(CONNECT_TIMEOUT, connect_async(pending.url.as_str())).await {
        Ok(Ok((ws_stream, _))) => Ok(ws_stream),
        Ok(Err(err)) => Err(err.to_string()),
        Err(_) => Err(format!("timed out after {}s", CONNECT_TIMEOUT.as_secs())),
    }
}

struct TransportLink {
    outbound: mpsc::UnboundedSender<Message>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl TransportLink {
    /// Hard replace: queued frames may or may not reach the server.
    fn shutdown(self) {
        let _ = self.outbound.send(Message::Close(None));
        self.reader.abort();
        drop(self.outbound);
        drop(self.writer);
    }
}

pub struct ConnectionManager {
    presenter: Arc<dyn PresentationPort>,
    phase: TransportPhase,
    link: Option<TransportLink>,
    address: Option<ServerAddress>,
    // Bumped on every connect/disconnect so events from a torn-down
    // transport are ignored.
    epoch: u64,
}

impl ConnectionManager {
    pub fn new(presenter: Arc<dyn PresentationPort>) -> Self {
        Self {
            presenter,
            phase: TransportPhase::Closed,
            link: None,
            address: None,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> TransportPhase {
        self.phase
    }

    pub fn address(&self) -> Option<&ServerAddress> {
        self.address.as_ref()
    }

    /// First half of a connect: drops any live transport and claims a new
    /// epoch. The handshake itself runs without the core lock.
    pub(crate) fn begin_connect(
        &mut self,
        session: &mut SessionState,
        address: &ServerAddress,
    ) -> Result<PendingConnect, TransportError> {
        self.teardown(session);
        self.address = Some(address.clone());

        let url = match address.to_url() {
            Ok(url) => url,
            Err(err) => {
                self.presenter.on_transport_error(&err.to_string());
                return Err(err.into());
            }
        };

        self.phase = TransportPhase::Connecting;
        info!(%address, epoch = self.epoch, "ws: connecting to simulation server");
        Ok(PendingConnect {
            epoch: self.epoch,
            address: address.clone(),
            url: url.to_string(),
        })
    }

    /// Second half of a connect. A handshake that was overtaken by a
    /// disconnect or a newer connect is discarded without touching state.
    pub(crate) fn finish_connect(
        &mut self,
        session: &mut SessionState,
        pending: PendingConnect,
        outcome: Result<WsStream, String>,
        core: Weak<Mutex<ClientCore>>,
    ) -> Result<(), TransportError> {
        if pending.epoch != self.epoch {
            info!(address = %pending.address, epoch = pending.epoch, "ws: discarding superseded connect");
            if let Ok(mut ws_stream) = outcome {
                tokio::spawn(async move {
                    let _ = ws_stream.close(None).await;
                });
            }
            return Err(TransportError::Superseded {
                address: pending.address.to_string(),
            });
        }

        let ws_stream = match outcome {
            Ok(ws_stream) => ws_stream,
            Err(reason) => return Err(self.connect_failed(session, &pending.address, reason)),
        };

        self.link = Some(spawn_link(ws_stream, core, pending.epoch));
        self.phase = TransportPhase::Open;
        info!(address = %pending.address, epoch = pending.epoch, "ws: connected to simulation server");
        session.set_connection(ConnectionState::Connected);
        session.set_simulation(SimulationState::Unknown);
        Ok(())
    }

    /// Explicit close requested by the operator.
    pub(crate) fn disconnect(&mut self, session: &mut SessionState) {
        if self.teardown(session) {
            info!(address = ?self.address, "ws: connection closed by client");
        } else {
            session.set_connection(ConnectionState::Disconnected);
            session.set_simulation(SimulationState::Unknown);
        }
    }

    /// The send primitive. Frames are queued to the writer task in order.
    /// A writer that has already stopped counts as a transport failure.
    pub(crate) fn send(
        &mut self,
        session: &mut SessionState,
        payload: String,
    ) -> Result<(), TransportError> {
        if session.connection() != ConnectionState::Connected {
            return Err(TransportError::NotConnected);
        }
        let link = self.link.as_ref().ok_or(TransportError::NotConnected)?;
        if link.outbound.send(Message::Text(payload)).is_err() {
            let epoch = self.epoch;
            self.on_transport_closed(
                session,
                epoch,
                TransportClose::Error("websocket writer stopped".into()),
            );
            return Err(TransportError::Closed);
        }
        Ok(())
    }

    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch && self.link.is_some()
    }

    pub(crate) fn on_transport_closed(
        &mut self,
        session: &mut SessionState,
        epoch: u64,
        close: TransportClose,
    ) {
        if !self.is_current(epoch) {
            return;
        }
        if let Some(link) = self.link.take() {
            drop(link.outbound);
            drop(link.writer);
        }
        self.phase = TransportPhase::Closed;
        session.set_connection(ConnectionState::Disconnected);
        session.set_simulation(SimulationState::Unknown);

        match close {
            TransportClose::Clean(reason) => {
                info!(address = ?self.address, reason = ?reason, "ws: connection closed cleanly");
            }
            TransportClose::Error(description) => {
                warn!(address = ?self.address, %description, "ws: connection interrupted");
                self.presenter.on_transport_error(&description);
            }
        }
    }

    /// Returns whether a live transport was dropped (and the state reset).
    fn teardown(&mut self, session: &mut SessionState) -> bool {
        self.epoch = self.epoch.wrapping_add(1);
        self.phase = TransportPhase::Closed;
        let Some(link) = self.link.take() else {
            return false;
        };
        info!(address = ?self.address, "ws: tearing down previous transport");
        link.shutdown();
        session.set_connection(ConnectionState::Disconnected);
        session.set_simulation(SimulationState::Unknown);
        true
    }

    #[cfg(test)]
    pub(crate) async fn stop_writer(&mut self) {
        if let Some(link) = self.link.as_mut() {
            link.writer.abort();
            let _ = (&mut link.writer).await;
        }
    }

    fn connect_failed(
        &mut self,
        session: &mut SessionState,
        address: &ServerAddress,
        reason: String,
    ) -> TransportError {
        error!(%address, %reason, "ws: failed to connect to simulation server");
        self.phase = TransportPhase::Closed;
        session.set_connection(ConnectionState::Disconnected);
        session.set_simulation(SimulationState::Unknown);
        let err = TransportError::Connect {
            address: address.to_string(),
            reason,
        };
        self.presenter.on_transport_error(&err.to_string());
        err
    }
}

fn spawn_link(ws_stream: WsStream, core: Weak<Mutex<ClientCore>>, epoch: u64) -> TransportLink {
    let (mut ws_writer, ws_reader) = ws_stream.split();
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    let writer_core = core.clone();
    let writer = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let closing = matches!(message, Message::Close(_));
            if let Err(err) = ws_writer.send(message).await {
                warn!(epoch, error = %err, "ws: send failed");
                report_closed(
                    &writer_core,
                    epoch,
                    TransportClose::Error(format!("websocket send failed: {err}")),
                )
                .await;
                break;
            }
            if closing {
                break;
            }
        }
    });
    let reader = tokio::spawn(read_loop(ws_reader, core, epoch));

    TransportLink {
        outbound,
        reader,
        writer,
    }
}

async fn read_loop(
    mut ws_reader: futures::stream::SplitStream<WsStream>,
    core: Weak<Mutex<ClientCore>>,
    epoch: u64,
) {
    loop {
        let next = ws_reader.next().await;
        let Some(core) = core.upgrade() else {
            return;
        };
        let mut guard = core.lock().await;
        let ClientCore {
            session,
            connection,
            dispatcher,
        } = &mut *guard;
        if !connection.is_current(epoch) {
            return;
        }

        let close = match next {
            Some(Ok(Message::Text(text))) => {
                let _ = dispatcher.dispatch_text(session, &text);
                continue;
            }
            Some(Ok(Message::Binary(bytes))) => {
                dispatcher.dispatch_binary(bytes.len());
                continue;
            }
            Some(Ok(Message::Close(frame))) => TransportClose::Clean(frame.map(close_reason)),
            Some(Ok(_)) => continue,
            Some(Err(err)) => TransportClose::Error(format!("websocket receive failed: {err}")),
            None => TransportClose::Error("websocket stream ended without a close frame".into()),
        };
        connection.on_transport_closed(session, epoch, close);
        return;
    }
}

/// Routes a failure seen outside the read loop through the same
/// epoch-checked close path.
async fn report_closed(core: &Weak<Mutex<ClientCore>>, epoch: u64, close: TransportClose) {
    let Some(core) = core.upgrade() else {
        return;
    };
    let mut guard = core.lock().await;
    let ClientCore {
        session,
        connection,
        ..
    } = &mut *guard;
    connection.on_transport_closed(session, epoch, close);
}

fn close_reason(frame: CloseFrame<'_>) -> String {
    if frame.reason.is_empty() {
        format!("code {}", u16::from(frame.code))
    } else {
        format!("code {}: {}", u16::from(frame.code), frame.reason)
    }
}

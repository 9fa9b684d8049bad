use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::{
    domain::{ServerAddress, SimulationState},
    protocol::OutboundCommand,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    builder::{self, CommandRequest},
    connection::{ConnectionManager, TransportPhase},
    dispatcher::MessageDispatcher,
    error::{CommandError, TransportError},
    gate,
    presentation::PresentationPort,
    session::{SessionSnapshot, SessionState},
};

/// Everything that must be touched by one event at a time.
pub(crate) struct ClientCore {
    pub(crate) session: SessionState,
    pub(crate) connection: ConnectionManager,
    pub(crate) dispatcher: MessageDispatcher,
}

/// Operator-facing entry points, implemented by [`SimulationClient`].
#[async_trait]
pub trait SimulationHandle: Send + Sync {
    async fn connect(&self, address: &ServerAddress) -> Result<()>;
    async fn change_address(&self, address: &ServerAddress) -> Result<()>;
    async fn disconnect(&self);
    async fn configure_session(&self, model_file: &str, experiment_name: &str);
    async fn snapshot(&self) -> SessionSnapshot;
    async fn issue(&self, request: CommandRequest) -> Result<OutboundCommand, CommandError>;
}

#[derive(Clone)]
pub struct SimulationClient {
    core: Arc<Mutex<ClientCore>>,
    presenter: Arc<dyn PresentationPort>,
}

impl SimulationClient {
    pub fn new(presenter: Arc<dyn PresentationPort>) -> Self {
        let core = ClientCore {
            session: SessionState::new(Arc::clone(&presenter)),
            connection: ConnectionManager::new(Arc::clone(&presenter)),
            dispatcher: MessageDispatcher::new(Arc::clone(&presenter)),
        };
        Self {
            core: Arc::new(Mutex::new(core)),
            presenter,
        }
    }

    /// The core lock is released while the handshake runs, so snapshots and
    /// disconnects stay responsive during a slow connect.
    pub async fn connect(&self, address: &ServerAddress) -> Result<(), TransportError> {
        let pending = {
            let mut guard = self.core.lock().await;
            let ClientCore {
                session,
                connection,
                ..
            } = &mut *guard;
            connection.begin_connect(session, address)?
        };

        let outcome = crate::connection::open(&pending).await;

        let mut guard = self.core.lock().await;
        let ClientCore {
            session,
            connection,
            ..
        } = &mut *guard;
        connection.finish_connect(session, pending, outcome, Arc::downgrade(&self.core))
    }

    /// Replaces the live transport. Any experiment state is discarded.
    pub async fn change_address(&self, address: &ServerAddress) -> Result<(), TransportError> {
        {
            let guard = self.core.lock().await;
            let snapshot = guard.session.get();
            if matches!(
                snapshot.simulation,
                SimulationState::Running | SimulationState::Paused
            ) {
                warn!(
                    simulation = %snapshot.simulation,
                    exp_id = ?snapshot.session.experiment_id,
                    %address,
                    "session: reconnecting while an experiment is active; its state is discarded"
                );
            }
        }
        self.connect(address).await
    }

    pub async fn disconnect(&self) {
        let mut guard = self.core.lock().await;
        let ClientCore {
            session,
            connection,
            ..
        } = &mut *guard;
        connection.disconnect(session);
    }

    pub async fn configure_session(&self, model_file: &str, experiment_name: &str) {
        let mut guard = self.core.lock().await;
        guard.session.set_session_params(model_file, experiment_name);
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.core.lock().await.session.get()
    }

    pub async fn transport_phase(&self) -> TransportPhase {
        self.core.lock().await.connection.phase()
    }

    pub async fn address(&self) -> Option<ServerAddress> {
        self.core.lock().await.connection.address().cloned()
    }

    /// Gate, build and send one command against the current session.
    pub async fn issue(&self, request: CommandRequest) -> Result<OutboundCommand, CommandError> {
        let mut guard = self.core.lock().await;
        let ClientCore {
            session,
            connection,
            ..
        } = &mut *guard;
        let snapshot = session.get();

        let variant = match gate::evaluate(request.kind(), &snapshot) {
            Ok(variant) => variant,
            Err(rejection) => {
                info!(
                    command = %request.kind(),
                    connection = %snapshot.connection,
                    simulation = %snapshot.simulation,
                    reason = %rejection,
                    "gate: command rejected"
                );
                self.presenter.on_command_rejected(&rejection);
                return Err(rejection.into());
            }
        };

        let command = builder::build(variant, &request, &snapshot.session)?;
        let payload = command.to_json().map_err(TransportError::from)?;
        if let Err(err) = connection.send(session, payload) {
            // A closed writer has already been reported by the close path.
            if !matches!(err, TransportError::Closed) {
                self.presenter.on_transport_error(&err.to_string());
            }
            return Err(err.into());
        }
        info!(
            command = command.type_name(),
            exp_id = ?command.exp_id(),
            "ws: command sent"
        );
        self.presenter.on_outbound_message(&command);
        Ok(command)
    }

    pub async fn load(&self) -> Result<OutboundCommand, CommandError> {
        self.issue(CommandRequest::Load).await
    }

    pub async fn play(&self) -> Result<OutboundCommand, CommandError> {
        self.issue(CommandRequest::Play).await
    }

    pub async fn pause(&self) -> Result<OutboundCommand, CommandError> {
        self.issue(CommandRequest::Pause).await
    }

    pub async fn stop(&self) -> Result<OutboundCommand, CommandError> {
        self.issue(CommandRequest::Stop).await
    }

    pub async fn expression(&self, expr: &str) -> Result<OutboundCommand, CommandError> {
        self.issue(CommandRequest::Expression {
            expr: expr.to_string(),
        })
        .await
    }

    pub async fn ask(
        &self,
        action: &str,
        agent: &str,
        args: &str,
    ) -> Result<OutboundCommand, CommandError> {
        self.issue(CommandRequest::Ask {
            action: action.to_string(),
            agent: agent.to_string(),
            args: args.to_string(),
        })
        .await
    }

    pub async fn step(&self, nb_step: u32) -> Result<OutboundCommand, CommandError> {
        self.issue(CommandRequest::Step { nb_step }).await
    }

    pub async fn step_back(&self, nb_step: u32) -> Result<OutboundCommand, CommandError> {
        self.issue(CommandRequest::StepBack { nb_step }).await
    }
}

#[async_trait]
impl SimulationHandle for SimulationClient {
    async fn connect(&self, address: &ServerAddress) -> Result<()> {
        SimulationClient::connect(self, address)
            .await
            .with_context(|| format!("failed to connect to simulation server at {address}"))
    }

    async fn change_address(&self, address: &ServerAddress) -> Result<()> {
        SimulationClient::change_address(self, address)
            .await
            .with_context(|| format!("failed to reconnect to simulation server at {address}"))
    }

    async fn disconnect(&self) {
        SimulationClient::disconnect(self).await
    }

    async fn configure_session(&self, model_file: &str, experiment_name: &str) {
        SimulationClient::configure_session(self, model_file, experiment_name).await
    }

    async fn snapshot(&self) -> SessionSnapshot {
        SimulationClient::snapshot(self).await
    }

    async fn issue(&self, request: CommandRequest) -> Result<OutboundCommand, CommandError> {
        SimulationClient::issue(self, request).await
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;

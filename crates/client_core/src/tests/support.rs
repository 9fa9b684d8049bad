use std::sync::{Arc, Mutex};

use shared::{
    domain::{ConnectionState, ExperimentId, SimulationState},
    protocol::{InboundMessage, OutboundCommand},
};

use crate::{
    error::{CommandRejection, MalformedInbound},
    presentation::{ClientEvent, PresentationPort},
    session::{Session, SessionSnapshot, SessionState},
};

/// Presenter that keeps every callback in order.
#[derive(Default)]
pub(crate) struct RecordingPresenter {
    events: Mutex<Vec<ClientEvent>>,
}

impl RecordingPresenter {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn events(&self) -> Vec<ClientEvent> {
        self.events.lock().expect("recorder lock").clone()
    }

    pub(crate) fn clear(&self) {
        self.events.lock().expect("recorder lock").clear();
    }

    fn push(&self, event: ClientEvent) {
        self.events.lock().expect("recorder lock").push(event);
    }
}

impl PresentationPort for RecordingPresenter {
    fn on_connection_state_changed(&self, state: ConnectionState) {
        self.push(ClientEvent::ConnectionStateChanged(state));
    }

    fn on_simulation_state_changed(&self, state: SimulationState) {
        self.push(ClientEvent::SimulationStateChanged(state));
    }

    fn on_outbound_message(&self, command: &OutboundCommand) {
        self.push(ClientEvent::Outbound(command.clone()));
    }

    fn on_inbound_message(&self, message: &InboundMessage) {
        self.push(ClientEvent::Inbound(message.clone()));
    }

    fn on_transport_error(&self, description: &str) {
        self.push(ClientEvent::TransportError(description.to_string()));
    }

    fn on_session_changed(&self, session: &Session) {
        self.push(ClientEvent::SessionChanged(session.clone()));
    }

    fn on_command_rejected(&self, rejection: &CommandRejection) {
        self.push(ClientEvent::CommandRejected(rejection.clone()));
    }

    fn on_malformed_inbound(&self, error: &MalformedInbound) {
        self.push(ClientEvent::MalformedInbound(error.clone()));
    }
}

pub(crate) fn snapshot(
    connection: ConnectionState,
    simulation: SimulationState,
    experiment_id: Option<&str>,
    load_params: bool,
) -> SessionSnapshot {
    SessionSnapshot {
        connection,
        simulation,
        session: Session {
            experiment_id: experiment_id.map(ExperimentId::new),
            model_file: load_params.then(|| "models/flood.gaml".to_string()),
            experiment_name: load_params.then(|| "flood_sim".to_string()),
        },
    }
}

pub(crate) fn state_with(
    presenter: Arc<RecordingPresenter>,
    connection: ConnectionState,
    simulation: SimulationState,
) -> SessionState {
    let mut state = SessionState::new(presenter.clone());
    state.set_connection(connection);
    state.set_simulation(simulation);
    presenter.clear();
    state
}

//! Observer port the core reports through. Rendering, styling and timeline
//! layout belong to the implementor.

use chrono::{DateTime, Utc};
use shared::{
    domain::{ConnectionState, SimulationState},
    protocol::{InboundMessage, OutboundCommand},
};
use tokio::sync::broadcast;

use crate::{
    error::{CommandRejection, MalformedInbound},
    session::Session,
};

pub trait PresentationPort: Send + Sync {
    fn on_connection_state_changed(&self, state: ConnectionState);
    fn on_simulation_state_changed(&self, state: SimulationState);
    fn on_outbound_message(&self, command: &OutboundCommand);
    fn on_inbound_message(&self, message: &InboundMessage);
    fn on_transport_error(&self, description: &str);

    fn on_session_changed(&self, _session: &Session) {}
    fn on_command_rejected(&self, _rejection: &CommandRejection) {}
    fn on_malformed_inbound(&self, _error: &MalformedInbound) {}
}

pub struct NullPresenter;

impl PresentationPort for NullPresenter {
    fn on_connection_state_changed(&self, _state: ConnectionState) {}
    fn on_simulation_state_changed(&self, _state: SimulationState) {}
    fn on_outbound_message(&self, _command: &OutboundCommand) {}
    fn on_inbound_message(&self, _message: &InboundMessage) {}
    fn on_transport_error(&self, _description: &str) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    ConnectionStateChanged(ConnectionState),
    SimulationStateChanged(SimulationState),
    SessionChanged(Session),
    Outbound(OutboundCommand),
    Inbound(InboundMessage),
    CommandRejected(CommandRejection),
    MalformedInbound(MalformedInbound),
    TransportError(String),
}

#[derive(Debug, Clone)]
pub struct TimelineEvent {
    pub at: DateTime<Utc>,
    pub event: ClientEvent,
}

/// Fans presentation callbacks out to any number of subscribers.
pub struct BroadcastPresenter {
    events: broadcast::Sender<TimelineEvent>,
}

impl BroadcastPresenter {
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self { events }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<TimelineEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ClientEvent) {
        // No subscribers is not an error; the event is simply dropped.
        let _ = self.events.send(TimelineEvent {
            at: Utc::now(),
            event,
        });
    }
}

impl Default for BroadcastPresenter {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl PresentationPort for BroadcastPresenter {
    fn on_connection_state_changed(&self, state: ConnectionState) {
        self.emit(ClientEvent::ConnectionStateChanged(state));
    }

    fn on_simulation_state_changed(&self, state: SimulationState) {
        self.emit(ClientEvent::SimulationStateChanged(state));
    }

    fn on_outbound_message(&self, command: &OutboundCommand) {
        self.emit(ClientEvent::Outbound(command.clone()));
    }

    fn on_inbound_message(&self, message: &InboundMessage) {
        self.emit(ClientEvent::Inbound(message.clone()));
    }

    fn on_transport_error(&self, description: &str) {
        self.emit(ClientEvent::TransportError(description.to_string()));
    }

    fn on_session_changed(&self, session: &Session) {
        self.emit(ClientEvent::SessionChanged(session.clone()));
    }

    fn on_command_rejected(&self, rejection: &CommandRejection) {
        self.emit(ClientEvent::CommandRejected(rejection.clone()));
    }

    fn on_malformed_inbound(&self, error: &MalformedInbound) {
        self.emit(ClientEvent::MalformedInbound(error.clone()));
    }
}

#[cfg(test)]
#[path = "tests/presentation_tests.rs"]
mod tests;

use std::sync::Arc;

use serde::Serialize;
use shared::domain::{ConnectionState, ExperimentId, SimulationState};
use tracing::debug;

use crate::presentation::PresentationPort;

/// Model, experiment and server-assigned identifier currently in use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub experiment_id: Option<ExperimentId>,
    pub model_file: Option<String>,
    pub experiment_name: Option<String>,
}

impl Session {
    pub fn has_load_parameters(&self) -> bool {
        self.model_file.is_some() && self.experiment_name.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub connection: ConnectionState,
    pub simulation: SimulationState,
    pub session: Session,
}

/// The single mutable record of connection and simulation status. Every
/// setter reports the change to the presentation port before returning.
pub struct SessionState {
    current: SessionSnapshot,
    observer: Arc<dyn PresentationPort>,
}

impl SessionState {
    pub fn new(observer: Arc<dyn PresentationPort>) -> Self {
        Self {
            current: SessionSnapshot::default(),
            observer,
        }
    }

    pub fn get(&self) -> SessionSnapshot {
        self.current.clone()
    }

    pub fn connection(&self) -> ConnectionState {
        self.current.connection
    }

    pub fn simulation(&self) -> SimulationState {
        self.current.simulation
    }

    pub fn session(&self) -> &Session {
        &self.current.session
    }

    pub fn set_connection(&mut self, state: ConnectionState) {
        debug!(from = %self.current.connection, to = %state, "session: connection state");
        self.current.connection = state;
        self.observer.on_connection_state_changed(state);
    }

    pub fn set_simulation(&mut self, state: SimulationState) {
        debug!(from = %self.current.simulation, to = %state, "session: simulation state");
        self.current.simulation = state;
        self.observer.on_simulation_state_changed(state);
    }

    pub fn set_experiment_id(&mut self, id: ExperimentId) {
        self.current.session.experiment_id = Some(id);
        self.observer.on_session_changed(&self.current.session);
    }

    /// Blank values leave the corresponding parameter unset.
    pub fn set_session_params(&mut self, model_file: &str, experiment_name: &str) {
        self.current.session.model_file = non_blank(model_file);
        self.current.session.experiment_name = non_blank(experiment_name);
        self.observer.on_session_changed(&self.current.session);
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;

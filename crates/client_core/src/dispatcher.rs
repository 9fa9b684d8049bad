use std::sync::Arc;

use serde_json::Value;
use shared::{
    domain::SimulationState,
    protocol::{InboundFrame, InboundKind, InboundMessage},
};
use tracing::{debug, warn};

use crate::{error::MalformedInbound, presentation::PresentationPort, session::SessionState};

/// Parses one text frame into the inbound schema.
pub fn parse(frame: &str) -> Result<InboundMessage, MalformedInbound> {
    let raw: Value =
        serde_json::from_str(frame).map_err(|err| MalformedInbound::NotJson(err.to_string()))?;
    if !raw.is_object() {
        return Err(MalformedInbound::NotAnObject);
    }
    let parsed: InboundFrame = serde_json::from_value(raw.clone())
        .map_err(|err| MalformedInbound::MissingType(err.to_string()))?;
    Ok(InboundMessage::from_frame(parsed, raw))
}

/// Applies server reports to the session and forwards every message to the
/// presentation layer.
pub struct MessageDispatcher {
    presenter: Arc<dyn PresentationPort>,
}

impl MessageDispatcher {
    pub fn new(presenter: Arc<dyn PresentationPort>) -> Self {
        Self { presenter }
    }

    pub fn dispatch_text(
        &self,
        state: &mut SessionState,
        frame: &str,
    ) -> Result<InboundMessage, MalformedInbound> {
        match parse(frame) {
            Ok(message) => {
                self.apply(state, &message);
                Ok(message)
            }
            Err(err) => {
                self.reject(&err);
                Err(err)
            }
        }
    }

    pub fn dispatch_binary(&self, len: usize) -> MalformedInbound {
        let err = MalformedInbound::Binary(len);
        self.reject(&err);
        err
    }

    pub fn apply(&self, state: &mut SessionState, message: &InboundMessage) {
        if let Some(id) = &message.exp_id {
            state.set_experiment_id(id.clone());
        }
        if message.kind == InboundKind::SimulationStatus {
            let status = message
                .status_content()
                .map(SimulationState::from_status_content)
                .unwrap_or_default();
            debug!(
                exp_id = ?message.exp_id,
                %status,
                "ws: simulation status report"
            );
            state.set_simulation(status);
        }
        self.presenter.on_inbound_message(message);
    }

    fn reject(&self, err: &MalformedInbound) {
        warn!(error = %err, "ws: malformed message from simulation server");
        self.presenter.on_malformed_inbound(err);
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;

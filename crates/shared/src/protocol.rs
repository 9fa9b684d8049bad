use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ExperimentId;

/// Text the server expects in the `content` field of an expression request.
pub const EXPRESSION_CONTENT: &str = "Send an expression";

/// Requests sent to the simulation server. The `type` tag selects the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundCommand {
    Load {
        model: String,
        experiment: String,
    },
    Reload {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exp_id: Option<ExperimentId>,
    },
    Play {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exp_id: Option<ExperimentId>,
    },
    Stop {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exp_id: Option<ExperimentId>,
    },
    Pause {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exp_id: Option<ExperimentId>,
    },
    Expression {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exp_id: Option<ExperimentId>,
        expr: String,
    },
    Ask {
        action: String,
        agent: String,
        args: String,
    },
    Step {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exp_id: Option<ExperimentId>,
        nb_step: u32,
    },
    StepBack {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exp_id: Option<ExperimentId>,
        nb_step: u32,
    },
}

impl OutboundCommand {
    /// Value of the `type` field on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Reload { .. } => "reload",
            Self::Play { .. } => "play",
            Self::Stop { .. } => "stop",
            Self::Pause { .. } => "pause",
            Self::Expression { .. } => "expression",
            Self::Ask { .. } => "ask",
            Self::Step { .. } => "step",
            Self::StepBack { .. } => "stepBack",
        }
    }

    pub fn exp_id(&self) -> Option<&ExperimentId> {
        match self {
            Self::Reload { exp_id }
            | Self::Play { exp_id }
            | Self::Stop { exp_id }
            | Self::Pause { exp_id }
            | Self::Expression { exp_id, .. }
            | Self::Step { exp_id, .. }
            | Self::StepBack { exp_id, .. } => exp_id.as_ref(),
            Self::Load { .. } | Self::Ask { .. } => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Message kinds the server reports back. Unknown kinds are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InboundKind {
    SimulationStatus,
    CommandExecutedSuccessfully,
    UnableToExecuteRequest,
    GamaServerError,
    MalformedRequest,
    ConnectionSuccessful,
    Unrecognized(String),
}

impl InboundKind {
    pub fn from_type(value: &str) -> Self {
        match value {
            "SimulationStatus" => Self::SimulationStatus,
            "CommandExecutedSuccessfully" => Self::CommandExecutedSuccessfully,
            "UnableToExecuteRequest" => Self::UnableToExecuteRequest,
            "GamaServerError" => Self::GamaServerError,
            "MalformedRequest" => Self::MalformedRequest,
            "ConnectionSuccessful" => Self::ConnectionSuccessful,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::SimulationStatus => "SimulationStatus",
            Self::CommandExecutedSuccessfully => "CommandExecutedSuccessfully",
            Self::UnableToExecuteRequest => "UnableToExecuteRequest",
            Self::GamaServerError => "GamaServerError",
            Self::MalformedRequest => "MalformedRequest",
            Self::ConnectionSuccessful => "ConnectionSuccessful",
            Self::Unrecognized(other) => other,
        }
    }
}

impl fmt::Display for InboundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape every server frame is expected to have before classification.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub exp_id: Option<Value>,
    #[serde(default)]
    pub content: Option<Value>,
}

/// A parsed server message. `raw` keeps the full frame for display.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub kind: InboundKind,
    pub exp_id: Option<ExperimentId>,
    pub content: Option<Value>,
    pub raw: Value,
}

impl InboundMessage {
    pub fn from_frame(frame: InboundFrame, raw: Value) -> Self {
        Self {
            kind: InboundKind::from_type(&frame.kind),
            exp_id: frame.exp_id.as_ref().and_then(experiment_id_from_value),
            content: frame.content.filter(|value| !value.is_null()),
            raw,
        }
    }

    /// Status text carried by a `SimulationStatus` report, if any.
    pub fn status_content(&self) -> Option<&str> {
        match self.kind {
            InboundKind::SimulationStatus => self.content.as_ref().and_then(Value::as_str),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self.kind,
            InboundKind::UnableToExecuteRequest
                | InboundKind::GamaServerError
                | InboundKind::MalformedRequest
        )
    }
}

// The server has emitted identifiers both as strings and as bare numbers.
fn experiment_id_from_value(value: &Value) -> Option<ExperimentId> {
    match value {
        Value::String(text) if !text.is_empty() => Some(ExperimentId(text.clone())),
        Value::Number(number) => Some(ExperimentId(number.to_string())),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;

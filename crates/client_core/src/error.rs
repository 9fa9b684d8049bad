use shared::{domain::SimulationState, error::ProtocolError};
use thiserror::Error;

use crate::gate::{CommandKind, CommandVariant};

/// Local refusal to issue a command. Nothing is sent when one of these is
/// produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandRejection {
    #[error("simulation server is not connected")]
    NotConnected,
    #[error("could not send {command}: {reason}")]
    NotEligible {
        command: CommandKind,
        state: SimulationState,
        reason: &'static str,
    },
    #[error("could not send Load or Reload: the model file or the experiment name is undefined")]
    IncompleteSession { command: CommandKind },
}

impl CommandRejection {
    /// Operator-facing reason, without the command prefix.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotConnected => "not connected",
            Self::NotEligible { reason, .. } => reason,
            Self::IncompleteSession { .. } => "the model file or the experiment name is undefined",
        }
    }

    pub fn command(&self) -> Option<CommandKind> {
        match self {
            Self::NotConnected => None,
            Self::NotEligible { command, .. } | Self::IncompleteSession { command } => {
                Some(*command)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("{command} requires field {field} which is not set")]
    MissingField {
        command: &'static str,
        field: &'static str,
    },
    #[error("{request} request cannot be built as {variant:?}")]
    VariantMismatch {
        request: CommandKind,
        variant: CommandVariant,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInbound {
    #[error("frame is not valid JSON: {0}")]
    NotJson(String),
    #[error("frame is not a JSON object")]
    NotAnObject,
    #[error("frame has no string `type` field: {0}")]
    MissingType(String),
    #[error("binary frames are not part of the protocol ({0} bytes)")]
    Binary(usize),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    InvalidAddress(#[from] ProtocolError),
    #[error("failed to connect websocket {address}: {reason}")]
    Connect { address: String, reason: String },
    #[error("no live connection to the simulation server")]
    NotConnected,
    #[error("connection closed before the message could be queued")]
    Closed,
    #[error("connect to {address} was overtaken by a newer connect or a disconnect")]
    Superseded { address: String },
    #[error("failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure of a command entry point on the client facade.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Rejected(#[from] CommandRejection),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CommandError {
    pub fn rejection(&self) -> Option<&CommandRejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

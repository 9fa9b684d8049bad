use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ProtocolError;

pub const DEFAULT_SCHEME: &str = "ws";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1000;

/// Identifier the simulation server assigns to a loaded experiment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentId(pub String);

impl ExperimentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    Connected,
    #[default]
    Disconnected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => f.write_str("CONNECTED"),
            Self::Disconnected => f.write_str("DISCONNECTED"),
        }
    }
}

/// Remote experiment status as last reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulationState {
    #[default]
    Unknown,
    None,
    NotReady,
    Paused,
    Running,
}

impl SimulationState {
    pub const ALL: [SimulationState; 5] = [
        Self::Unknown,
        Self::None,
        Self::NotReady,
        Self::Paused,
        Self::Running,
    ];

    /// Maps the `content` of a `SimulationStatus` report. Anything the server
    /// might add later lands on `Unknown`.
    pub fn from_status_content(content: &str) -> Self {
        match content {
            "NONE" => Self::None,
            "NOTREADY" => Self::NotReady,
            "PAUSED" => Self::Paused,
            "RUNNING" => Self::Running,
            _ => Self::Unknown,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::None => "NONE",
            Self::NotReady => "NOTREADY",
            Self::Paused => "PAUSED",
            Self::Running => "RUNNING",
        }
    }

    /// True when an experiment exists on the server side.
    pub fn has_experiment(&self) -> bool {
        matches!(self, Self::NotReady | Self::Paused | Self::Running)
    }
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAddress {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Default for ServerAddress {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.into(),
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Accepts a port typed by an operator, e.g. `"1000"`.
    pub fn with_port_text(host: impl Into<String>, port: &str) -> Result<Self, ProtocolError> {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ProtocolError::InvalidPort(port.to_string()))?;
        Ok(Self::new(host, port))
    }

    pub fn to_url(&self) -> Result<Url, ProtocolError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ProtocolError::EmptyHost);
        }
        if self.scheme != "ws" && self.scheme != "wss" {
            return Err(ProtocolError::UnsupportedScheme(self.scheme.clone()));
        }
        let raw = format!("{}://{}:{}", self.scheme, host, self.port);
        Url::parse(&raw).map_err(|err| ProtocolError::InvalidAddress {
            address: raw,
            reason: err.to_string(),
        })
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("host must not be empty")]
    EmptyHost,
    #[error("invalid port: {0:?}")]
    InvalidPort(String),
    #[error("unsupported scheme {0:?}, expected ws or wss")]
    UnsupportedScheme(String),
    #[error("invalid server address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },
}

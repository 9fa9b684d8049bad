//! Session and command-gating core for driving a remote simulation server
//! over a websocket.

pub mod builder;
pub mod client;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod gate;
pub mod presentation;
pub mod session;

pub use builder::CommandRequest;
pub use client::{SimulationClient, SimulationHandle};
pub use connection::{ConnectionManager, TransportPhase};
pub use dispatcher::MessageDispatcher;
pub use error::{BuildError, CommandError, CommandRejection, MalformedInbound, TransportError};
pub use gate::{CommandKind, CommandVariant};
pub use presentation::{
    BroadcastPresenter, ClientEvent, NullPresenter, PresentationPort, TimelineEvent,
};
pub use session::{Session, SessionSnapshot, SessionState};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

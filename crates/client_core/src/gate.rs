//! Command eligibility. Decisions read only the current snapshot and never
//! mutate it.

use std::fmt;

use shared::domain::{ConnectionState, SimulationState};

use crate::{error::CommandRejection, session::SessionSnapshot};

use shared::domain::SimulationState::{Paused, Running};

/// What the operator asked for. `Load` resolves to a load or a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Load,
    Play,
    Pause,
    Stop,
    Expression,
    Ask,
    Step,
    StepBack,
}

impl CommandKind {
    pub const ALL: [CommandKind; 8] = [
        Self::Load,
        Self::Play,
        Self::Pause,
        Self::Stop,
        Self::Expression,
        Self::Ask,
        Self::Step,
        Self::StepBack,
    ];

    /// Simulation states in which the command may be issued.
    pub fn allowed_states(&self) -> &'static [SimulationState] {
        match self {
            Self::Load => &SimulationState::ALL,
            Self::Play => &[Paused],
            Self::Pause => &[Running],
            Self::Stop | Self::Expression | Self::Ask | Self::Step | Self::StepBack => {
                &[Running, Paused]
            }
        }
    }

    fn ineligible_reason(&self) -> &'static str {
        match self {
            Self::Play => "the simulation is not currently loaded nor paused",
            _ => "the simulation is not currently running",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Load => "Load",
            Self::Play => "Play",
            Self::Pause => "Pause",
            Self::Stop => "Stop",
            Self::Expression => "Expression",
            Self::Ask => "Ask",
            Self::Step => "Step",
            Self::StepBack => "Step Back",
        };
        f.write_str(label)
    }
}

/// Outbound variant chosen for an allowed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandVariant {
    Load,
    Reload,
    Play,
    Stop,
    Pause,
    Expression,
    Ask,
    Step,
    StepBack,
}

/// Load while nothing is loaded, reload once the server holds an experiment.
pub fn load_variant(state: SimulationState) -> CommandVariant {
    if state.has_experiment() {
        CommandVariant::Reload
    } else {
        CommandVariant::Load
    }
}

pub fn evaluate(
    kind: CommandKind,
    snapshot: &SessionSnapshot,
) -> Result<CommandVariant, CommandRejection> {
    if snapshot.connection == ConnectionState::Disconnected {
        return Err(CommandRejection::NotConnected);
    }

    let state = snapshot.simulation;
    if !kind.allowed_states().contains(&state) {
        return Err(CommandRejection::NotEligible {
            command: kind,
            state,
            reason: kind.ineligible_reason(),
        });
    }

    let variant = match kind {
        CommandKind::Load => {
            if !snapshot.session.has_load_parameters() {
                return Err(CommandRejection::IncompleteSession { command: kind });
            }
            load_variant(state)
        }
        CommandKind::Play => CommandVariant::Play,
        CommandKind::Pause => CommandVariant::Pause,
        CommandKind::Stop => CommandVariant::Stop,
        CommandKind::Expression => CommandVariant::Expression,
        CommandKind::Ask => CommandVariant::Ask,
        CommandKind::Step => CommandVariant::Step,
        CommandKind::StepBack => CommandVariant::StepBack,
    };
    Ok(variant)
}

#[cfg(test)]
#[path = "tests/gate_tests.rs"]
mod tests;

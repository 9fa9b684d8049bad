//! Pure mapping from an allowed command to its wire payload.

use shared::protocol::{OutboundCommand, EXPRESSION_CONTENT};

use crate::{
    error::BuildError,
    gate::{CommandKind, CommandVariant},
    session::Session,
};

/// An operator command together with the ad-hoc fields typed at trigger time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandRequest {
    Load,
    Play,
    Pause,
    Stop,
    Expression {
        expr: String,
    },
    Ask {
        action: String,
        agent: String,
        args: String,
    },
    Step {
        nb_step: u32,
    },
    StepBack {
        nb_step: u32,
    },
}

impl CommandRequest {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Load => CommandKind::Load,
            Self::Play => CommandKind::Play,
            Self::Pause => CommandKind::Pause,
            Self::Stop => CommandKind::Stop,
            Self::Expression { .. } => CommandKind::Expression,
            Self::Ask { .. } => CommandKind::Ask,
            Self::Step { .. } => CommandKind::Step,
            Self::StepBack { .. } => CommandKind::StepBack,
        }
    }
}

pub fn build(
    variant: CommandVariant,
    request: &CommandRequest,
    session: &Session,
) -> Result<OutboundCommand, BuildError> {
    let exp_id = session.experiment_id.clone();
    let command = match (variant, request) {
        (CommandVariant::Load, CommandRequest::Load) => OutboundCommand::Load {
            model: required(&session.model_file, "load", "model")?,
            experiment: required(&session.experiment_name, "load", "experiment")?,
        },
        (CommandVariant::Reload, CommandRequest::Load) => OutboundCommand::Reload { exp_id },
        (CommandVariant::Play, CommandRequest::Play) => OutboundCommand::Play { exp_id },
        (CommandVariant::Pause, CommandRequest::Pause) => OutboundCommand::Pause { exp_id },
        (CommandVariant::Stop, CommandRequest::Stop) => OutboundCommand::Stop { exp_id },
        (CommandVariant::Expression, CommandRequest::Expression { expr }) => {
            OutboundCommand::Expression {
                content: EXPRESSION_CONTENT.to_string(),
                exp_id,
                expr: expr.clone(),
            }
        }
        (
            CommandVariant::Ask,
            CommandRequest::Ask {
                action,
                agent,
                args,
            },
        ) => OutboundCommand::Ask {
            action: action.clone(),
            agent: agent.clone(),
            args: args.clone(),
        },
        (CommandVariant::Step, CommandRequest::Step { nb_step }) => OutboundCommand::Step {
            exp_id,
            nb_step: *nb_step,
        },
        (CommandVariant::StepBack, CommandRequest::StepBack { nb_step }) => {
            OutboundCommand::StepBack {
                exp_id,
                nb_step: *nb_step,
            }
        }
        (variant, request) => {
            return Err(BuildError::VariantMismatch {
                request: request.kind(),
                variant,
            })
        }
    };
    Ok(command)
}

fn required(
    value: &Option<String>,
    command: &'static str,
    field: &'static str,
) -> Result<String, BuildError> {
    value
        .clone()
        .ok_or(BuildError::MissingField { command, field })
}

#[cfg(test)]
#[path = "tests/builder_tests.rs"]
mod tests;

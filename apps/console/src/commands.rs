//! Operator input parsing for the console.

use client_core::CommandRequest;
use shared::{domain::ServerAddress, error::ProtocolError};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  connect                         connect to the configured address
  address <host> <port>           reconnect to another simulation server
  experiment <model_file> <name>  set the model and experiment to load
  load                            load, or reload once an experiment exists
  play | pause | stop             experiment lifecycle
  expr <expression>               evaluate an expression in the experiment
  ask <action> <agent> [args]     run an agent action, args as a JSON map
  step [n] | stepback [n]         advance or rewind n steps (default 1)
  status                          print connection and simulation state
  disconnect | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Connect,
    Address(ServerAddress),
    Experiment {
        model_file: String,
        experiment_name: String,
    },
    Issue(CommandRequest),
    Status,
    Disconnect,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command {0:?}, type `help` for the list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("step count must be a positive integer, got {0:?}")]
    InvalidStepCount(String),
    #[error(transparent)]
    Address(#[from] ProtocolError),
}

/// Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, InputError> {
    let line = line.trim();
    let Some((word, rest)) = split_word(line) else {
        return Ok(None);
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "connect" => ConsoleCommand::Connect,
        "address" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(host), Some(port), None) => {
                    ConsoleCommand::Address(ServerAddress::with_port_text(host, port)?)
                }
                _ => return Err(InputError::Usage("address <host> <port>")),
            }
        }
        "experiment" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(model_file), Some(experiment_name), None) => ConsoleCommand::Experiment {
                    model_file: model_file.to_string(),
                    experiment_name: experiment_name.to_string(),
                },
                _ => return Err(InputError::Usage("experiment <model_file> <name>")),
            }
        }
        "load" | "reload" => ConsoleCommand::Issue(CommandRequest::Load),
        "play" => ConsoleCommand::Issue(CommandRequest::Play),
        "pause" => ConsoleCommand::Issue(CommandRequest::Pause),
        "stop" => ConsoleCommand::Issue(CommandRequest::Stop),
        "expr" | "expression" => {
            if rest.is_empty() {
                return Err(InputError::Usage("expr <expression>"));
            }
            ConsoleCommand::Issue(CommandRequest::Expression {
                expr: rest.to_string(),
            })
        }
        "ask" => {
            let Some((action, rest)) = split_word(rest) else {
                return Err(InputError::Usage("ask <action> <agent> [args]"));
            };
            let Some((agent, args)) = split_word(rest) else {
                return Err(InputError::Usage("ask <action> <agent> [args]"));
            };
            ConsoleCommand::Issue(CommandRequest::Ask {
                action: action.to_string(),
                agent: agent.to_string(),
                args: if args.is_empty() { "{}" } else { args }.to_string(),
            })
        }
        "step" => ConsoleCommand::Issue(CommandRequest::Step {
            nb_step: step_count(rest)?,
        }),
        "stepback" | "step_back" => ConsoleCommand::Issue(CommandRequest::StepBack {
            nb_step: step_count(rest)?,
        }),
        "status" => ConsoleCommand::Status,
        "disconnect" => ConsoleCommand::Disconnect,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(InputError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn split_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest.trim())),
        None => Some((text, "")),
    }
}

fn step_count(text: &str) -> Result<u32, InputError> {
    if text.is_empty() {
        return Ok(1);
    }
    match text.parse::<u32>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(InputError::InvalidStepCount(text.to_string())),
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;

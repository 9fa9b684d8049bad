//! Request/response timeline written to stdout.

use client_core::{ClientEvent, TimelineEvent};
use tokio::{sync::broadcast, task::JoinHandle};

pub fn render(entry: &TimelineEvent) -> String {
    let stamp = entry.at.format("%H:%M:%S%.3f");
    let body = match &entry.event {
        ClientEvent::ConnectionStateChanged(state) => format!("connection: {state}"),
        ClientEvent::SimulationStateChanged(state) => format!("simulation: {state}"),
        ClientEvent::SessionChanged(session) => format!(
            "session: model={} experiment={} exp_id={}",
            session.model_file.as_deref().unwrap_or("-"),
            session.experiment_name.as_deref().unwrap_or("-"),
            session
                .experiment_id
                .as_ref()
                .map(|id| id.as_str())
                .unwrap_or("-"),
        ),
        ClientEvent::Outbound(command) => format!(
            ">> sending message of type {}\n{}",
            command.type_name(),
            serde_json::to_string_pretty(command).unwrap_or_default()
        ),
        ClientEvent::Inbound(message) => format!(
            "<< receiving message of type {}{}\n{}",
            message.kind,
            if message.is_error() { " (error)" } else { "" },
            serde_json::to_string_pretty(&message.raw).unwrap_or_default()
        ),
        ClientEvent::CommandRejected(rejection) => format!("!! {rejection}"),
        ClientEvent::MalformedInbound(err) => {
            format!("!! an error occurred when parsing the last message from the server: {err}")
        }
        ClientEvent::TransportError(description) => format!("!! transport: {description}"),
    };
    format!("[{stamp}] {body}")
}

pub fn spawn_printer(mut events: broadcast::Receiver<TimelineEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(entry) => println!("{}", render(&entry)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    println!("... {skipped} timeline events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
#[path = "tests/timeline_tests.rs"]
mod tests;

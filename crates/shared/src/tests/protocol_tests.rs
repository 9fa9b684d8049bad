use super::*;
use serde_json::json;

fn exp(id: &str) -> Option<ExperimentId> {
    Some(ExperimentId::new(id))
}

#[test]
fn outbound_commands_use_server_field_names() {
    let cases = vec![
        (
            OutboundCommand::Load {
                model: "/models/predator.gaml".into(),
                experiment: "main".into(),
            },
            json!({"type": "load", "model": "/models/predator.gaml", "experiment": "main"}),
        ),
        (
            OutboundCommand::Reload { exp_id: exp("3") },
            json!({"type": "reload", "exp_id": "3"}),
        ),
        (
            OutboundCommand::Play { exp_id: exp("3") },
            json!({"type": "play", "exp_id": "3"}),
        ),
        (
            OutboundCommand::Stop { exp_id: exp("3") },
            json!({"type": "stop", "exp_id": "3"}),
        ),
        (
            OutboundCommand::Pause { exp_id: exp("3") },
            json!({"type": "pause", "exp_id": "3"}),
        ),
        (
            OutboundCommand::Expression {
                content: EXPRESSION_CONTENT.into(),
                exp_id: exp("3"),
                expr: "length(people)".into(),
            },
            json!({
                "type": "expression",
                "content": "Send an expression",
                "exp_id": "3",
                "expr": "length(people)"
            }),
        ),
        (
            OutboundCommand::Ask {
                action: "spawn".into(),
                agent: "people[0]".into(),
                args: "{\"n\":2}".into(),
            },
            json!({"type": "ask", "action": "spawn", "agent": "people[0]", "args": "{\"n\":2}"}),
        ),
        (
            OutboundCommand::Step {
                exp_id: exp("3"),
                nb_step: 10,
            },
            json!({"type": "step", "exp_id": "3", "nb_step": 10}),
        ),
        (
            OutboundCommand::StepBack {
                exp_id: exp("3"),
                nb_step: 2,
            },
            json!({"type": "stepBack", "exp_id": "3", "nb_step": 2}),
        ),
    ];

    for (command, expected) in cases {
        let encoded = serde_json::to_value(&command).expect("encode");
        assert_eq!(encoded, expected, "wire shape of {}", command.type_name());
        assert_eq!(encoded["type"], command.type_name());

        let decoded: OutboundCommand = serde_json::from_value(encoded).expect("decode");
        assert_eq!(decoded, command);
    }
}

#[test]
fn missing_experiment_id_is_omitted_from_the_wire() {
    let encoded = serde_json::to_value(OutboundCommand::Pause { exp_id: None }).expect("encode");
    assert_eq!(encoded, json!({"type": "pause"}));
}

#[test]
fn inbound_kind_keeps_unknown_type_names() {
    assert_eq!(
        InboundKind::from_type("SimulationStatus"),
        InboundKind::SimulationStatus
    );
    assert_eq!(
        InboundKind::from_type("SimulationOutput"),
        InboundKind::Unrecognized("SimulationOutput".into())
    );
    assert_eq!(InboundKind::from_type("SimulationOutput").as_str(), "SimulationOutput");
}

#[test]
fn inbound_message_normalizes_numeric_experiment_ids() {
    let raw = json!({"type": "SimulationStatus", "exp_id": 7, "content": "PAUSED"});
    let frame: InboundFrame = serde_json::from_value(raw.clone()).expect("frame");
    let message = InboundMessage::from_frame(frame, raw);

    assert_eq!(message.exp_id, exp("7"));
    assert_eq!(message.status_content(), Some("PAUSED"));
    assert!(!message.is_error());
}

#[test]
fn status_content_is_only_read_from_status_reports() {
    let raw = json!({"type": "GamaServerError", "exp_id": "1", "content": "PAUSED"});
    let frame: InboundFrame = serde_json::from_value(raw.clone()).expect("frame");
    let message = InboundMessage::from_frame(frame, raw);

    assert_eq!(message.status_content(), None);
    assert!(message.is_error());
}

use super::*;
use crate::{
    presentation::ClientEvent,
    test_support::{state_with, RecordingPresenter},
};
use shared::domain::{ConnectionState, ExperimentId};

fn setup(simulation: SimulationState) -> (Arc<RecordingPresenter>, SessionState, MessageDispatcher) {
    let presenter = RecordingPresenter::shared();
    let state = state_with(presenter.clone(), ConnectionState::Connected, simulation);
    let dispatcher = MessageDispatcher::new(presenter.clone());
    (presenter, state, dispatcher)
}

#[test]
fn status_report_sets_simulation_and_identifier() {
    let (presenter, mut state, dispatcher) = setup(SimulationState::Unknown);

    let message = dispatcher
        .dispatch_text(
            &mut state,
            r#"{"type":"SimulationStatus","exp_id":"e1","content":"RUNNING"}"#,
        )
        .expect("valid frame");

    assert_eq!(state.simulation(), SimulationState::Running);
    assert_eq!(state.session().experiment_id, Some(ExperimentId::new("e1")));
    assert_eq!(message.kind, InboundKind::SimulationStatus);

    let events = presenter.events();
    assert!(matches!(events[0], ClientEvent::SessionChanged(_)));
    assert_eq!(
        events[1],
        ClientEvent::SimulationStateChanged(SimulationState::Running)
    );
    assert_eq!(events[2], ClientEvent::Inbound(message));
    assert_eq!(events.len(), 3);
}

#[test]
fn unknown_status_content_fails_open() {
    let (_presenter, mut state, dispatcher) = setup(SimulationState::Running);

    dispatcher
        .dispatch_text(
            &mut state,
            r#"{"type":"SimulationStatus","exp_id":"e1","content":"BOGUS"}"#,
        )
        .expect("valid frame");
    assert_eq!(state.simulation(), SimulationState::Unknown);

    dispatcher
        .dispatch_text(&mut state, r#"{"type":"SimulationStatus","exp_id":"e1"}"#)
        .expect("valid frame");
    assert_eq!(state.simulation(), SimulationState::Unknown);
}

#[test]
fn other_kinds_only_update_the_identifier() {
    let (presenter, mut state, dispatcher) = setup(SimulationState::Paused);

    for frame in [
        r#"{"type":"CommandExecutedSuccessfully","exp_id":"9","content":""}"#,
        r#"{"type":"UnableToExecuteRequest","exp_id":"9","content":"Controller is full"}"#,
        r#"{"type":"GamaServerError","exp_id":"9","content":{"message":"boom"}}"#,
        r#"{"type":"SimulationOutput","exp_id":"9","content":"hello"}"#,
    ] {
        dispatcher.dispatch_text(&mut state, frame).expect("valid frame");
    }

    assert_eq!(state.simulation(), SimulationState::Paused);
    assert_eq!(state.session().experiment_id, Some(ExperimentId::new("9")));
    let inbound = presenter
        .events()
        .into_iter()
        .filter(|event| matches!(event, ClientEvent::Inbound(_)))
        .count();
    assert_eq!(inbound, 4);
    assert!(!presenter
        .events()
        .iter()
        .any(|event| matches!(event, ClientEvent::SimulationStateChanged(_))));
}

#[test]
fn messages_without_identifier_keep_the_previous_one() {
    let (_presenter, mut state, dispatcher) = setup(SimulationState::Running);
    state.set_experiment_id(ExperimentId::new("old"));

    dispatcher
        .dispatch_text(&mut state, r#"{"type":"SimulationStatus","content":"NONE"}"#)
        .expect("valid frame");

    assert_eq!(state.simulation(), SimulationState::None);
    assert_eq!(state.session().experiment_id, Some(ExperimentId::new("old")));
}

#[test]
fn malformed_frames_are_reported_without_state_change() {
    let (presenter, mut state, dispatcher) = setup(SimulationState::Running);
    let before = state.get();

    let cases = [
        ("not json at all", "NotJson"),
        ("[1, 2, 3]", "NotAnObject"),
        (r#"{"exp_id":"1","content":"RUNNING"}"#, "MissingType"),
        (r#"{"type":42}"#, "MissingType"),
    ];
    for (frame, expected) in cases {
        let err = dispatcher
            .dispatch_text(&mut state, frame)
            .expect_err("malformed");
        let actual = match err {
            MalformedInbound::NotJson(_) => "NotJson",
            MalformedInbound::NotAnObject => "NotAnObject",
            MalformedInbound::MissingType(_) => "MissingType",
            MalformedInbound::Binary(_) => "Binary",
        };
        assert_eq!(actual, expected, "frame {frame}");
    }

    assert_eq!(state.get(), before);
    let events = presenter.events();
    assert_eq!(events.len(), 4);
    assert!(events
        .iter()
        .all(|event| matches!(event, ClientEvent::MalformedInbound(_))));
}

#[test]
fn binary_frames_are_malformed() {
    let (presenter, _state, dispatcher) = setup(SimulationState::Running);
    assert_eq!(dispatcher.dispatch_binary(4), MalformedInbound::Binary(4));
    assert_eq!(
        presenter.events(),
        vec![ClientEvent::MalformedInbound(MalformedInbound::Binary(4))]
    );
}

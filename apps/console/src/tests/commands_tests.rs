use super::*;

fn parse(line: &str) -> ConsoleCommand {
    parse_line(line).expect("valid").expect("not blank")
}

#[test]
fn blank_lines_are_skipped() {
    assert_eq!(parse_line(""), Ok(None));
    assert_eq!(parse_line("   \t"), Ok(None));
}

#[test]
fn lifecycle_words_map_to_requests() {
    assert_eq!(parse("load"), ConsoleCommand::Issue(CommandRequest::Load));
    assert_eq!(parse("  PLAY "), ConsoleCommand::Issue(CommandRequest::Play));
    assert_eq!(parse("pause"), ConsoleCommand::Issue(CommandRequest::Pause));
    assert_eq!(parse("stop"), ConsoleCommand::Issue(CommandRequest::Stop));
}

#[test]
fn expression_keeps_the_rest_of_the_line() {
    assert_eq!(
        parse("expr length(people where each.is_infected)"),
        ConsoleCommand::Issue(CommandRequest::Expression {
            expr: "length(people where each.is_infected)".into()
        })
    );
    assert_eq!(
        parse_line("expr"),
        Err(InputError::Usage("expr <expression>"))
    );
}

#[test]
fn ask_defaults_to_empty_argument_map() {
    assert_eq!(
        parse("ask evacuate people[2]"),
        ConsoleCommand::Issue(CommandRequest::Ask {
            action: "evacuate".into(),
            agent: "people[2]".into(),
            args: "{}".into(),
        })
    );
    assert_eq!(
        parse(r#"ask move world {"dx": 1, "dy": 2}"#),
        ConsoleCommand::Issue(CommandRequest::Ask {
            action: "move".into(),
            agent: "world".into(),
            args: r#"{"dx": 1, "dy": 2}"#.into(),
        })
    );
    assert!(matches!(parse_line("ask only"), Err(InputError::Usage(_))));
}

#[test]
fn step_counts_default_to_one() {
    assert_eq!(
        parse("step"),
        ConsoleCommand::Issue(CommandRequest::Step { nb_step: 1 })
    );
    assert_eq!(
        parse("stepback 4"),
        ConsoleCommand::Issue(CommandRequest::StepBack { nb_step: 4 })
    );
    assert_eq!(
        parse_line("step 0"),
        Err(InputError::InvalidStepCount("0".into()))
    );
    assert_eq!(
        parse_line("step many"),
        Err(InputError::InvalidStepCount("many".into()))
    );
}

#[test]
fn address_and_experiment_take_two_arguments() {
    assert_eq!(
        parse("address 192.168.1.20 6868"),
        ConsoleCommand::Address(ServerAddress::new("192.168.1.20", 6868))
    );
    assert!(matches!(
        parse_line("address localhost port"),
        Err(InputError::Address(ProtocolError::InvalidPort(_)))
    ));
    assert_eq!(
        parse("experiment /models/flood.gaml flood_sim"),
        ConsoleCommand::Experiment {
            model_file: "/models/flood.gaml".into(),
            experiment_name: "flood_sim".into(),
        }
    );
    assert!(matches!(
        parse_line("experiment only_model"),
        Err(InputError::Usage(_))
    ));
}

#[test]
fn unknown_words_are_reported() {
    assert_eq!(
        parse_line("launch"),
        Err(InputError::Unknown("launch".into()))
    );
}

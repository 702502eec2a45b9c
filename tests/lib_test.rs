//! Library integration tests.

use medic::MedicError;

#[test]
fn error_types_are_public() {
    let err = MedicError::MalformedInput {
        input: "foo>=>1".into(),
        message: "unexpected operator".into(),
    };
    assert!(err.to_string().contains("foo>=>1"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> medic::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use medic::cli::{Cli, Commands};

    let cli = Cli::parse_from(["medic", "logs", "--diagnose", "--json"]);
    assert!(cli.command.is_some());

    if let Some(Commands::Logs(args)) = cli.command {
        assert!(args.diagnose);
        assert!(args.json);
    } else {
        panic!("Expected Logs command");
    }
}

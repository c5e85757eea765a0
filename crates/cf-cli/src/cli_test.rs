use super::*;
use clap::{CommandFactory, Parser};

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_migrate_defaults_to_up() {
    let cli = Cli::try_parse_from(["cf", "migrate"]).unwrap();
    match cli.command {
        Commands::Migrate(args) => {
            assert_eq!(args.direction, None);
            assert_eq!(args.target_version, None);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_migrate_down_with_version() {
    let cli = Cli::try_parse_from(["cf", "migrate", "down", "--version", "Version000003"]).unwrap();
    match cli.command {
        Commands::Migrate(args) => {
            assert_eq!(args.direction, Some(Direction::Down));
            assert_eq!(args.target_version.as_deref(), Some("Version000003"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_global_args_after_subcommand() {
    let cli = Cli::try_parse_from(["cf", "render", "Version000001", "--down", "-p", "proj", "-v"])
        .unwrap();
    assert!(cli.global.verbose);
    assert_eq!(cli.global.project_dir, "proj");
    match cli.command {
        Commands::Render(args) => {
            assert_eq!(args.version, "Version000001");
            assert!(args.down);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_unknown_direction_rejected() {
    assert!(Cli::try_parse_from(["cf", "migrate", "sideways"]).is_err());
}

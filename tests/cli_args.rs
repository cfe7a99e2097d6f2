//! Integration tests for CLI argument handling
//!
//! Tests subcommand parsing and date validation from the command line.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_skyexplorer"))
        .args(args)
        .output()
        .expect("Failed to execute skyexplorer")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("skyexplorer"), "Help should mention skyexplorer");
    assert!(stdout.contains("serve"), "Help should mention serve");
    assert!(stdout.contains("favorites"), "Help should mention favorites");
}

#[test]
fn test_serve_help_lists_environment_settings() {
    let output = run_cli(&["serve", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("NASA_API_KEY"));
    assert!(stdout.contains("APOD_MOCK_MODE"));
}

#[test]
fn test_missing_subcommand_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
}

#[test]
fn test_show_rejects_early_date_before_any_request() {
    let output = run_cli(&["show", "--date", "1990-01-01", "--api-base", "http://127.0.0.1:9"]);
    assert!(!output.status.success(), "Expected early date to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Date too early"),
        "Should explain the date is too early: {}",
        stderr
    );
}

#[test]
fn test_favorites_remove_rejects_garbage_date() {
    let output = run_cli(&["favorites", "remove", "not-a-date"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid date"), "stderr: {}", stderr);
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use skyexplorer::cli::{parse_date_arg, Cli, Command, FavoritesCommand};

    #[test]
    fn test_cli_show_without_date() {
        let cli = Cli::parse_from(["skyexplorer", "show"]);
        match cli.command {
            Command::Show(args) => assert!(args.date.is_none()),
            other => panic!("expected show, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_favorites_add() {
        let cli = Cli::parse_from(["skyexplorer", "favorites", "add", "2024-07-15"]);
        match cli.command {
            Command::Favorites(FavoritesCommand::Add { date, .. }) => {
                assert_eq!(date, "2024-07-15")
            }
            other => panic!("expected favorites add, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_date_arg_accepts_unpadded() {
        assert!(parse_date_arg("2024-7-4").is_ok());
    }

    #[test]
    fn test_parse_date_arg_rejects_garbage() {
        assert!(parse_date_arg("invalid").is_err());
    }
}

//! CLI parse tests.

use clap::Parser;

use super::{Cli, CliCommand, OutputFormat};

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn download_defaults() {
    let cmd = parse(&["rget", "download", "https://example.com/a.bin"]);
    match cmd {
        CliCommand::Download {
            source,
            output,
            dir,
            input,
            mtime,
            timeout,
            update,
        } => {
            assert_eq!(source, "https://example.com/a.bin");
            assert!(output.is_none());
            assert!(dir.is_none());
            assert!(!input);
            assert!(!mtime);
            assert!(timeout.is_none());
            assert!(update.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn download_all_flags() {
    let cmd = parse(&[
        "rget", "dl", "-o", "out.bin", "-d", "downloads", "-m", "-t", "30", "-u", "250",
        "https://example.com/a.bin",
    ]);
    match cmd {
        CliCommand::Download {
            output,
            dir,
            mtime,
            timeout,
            update,
            ..
        } => {
            assert_eq!(output.as_deref(), Some("out.bin"));
            assert_eq!(dir.as_deref(), Some("downloads"));
            assert!(mtime);
            assert_eq!(timeout, Some(30));
            assert_eq!(update, Some(250));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn download_aliases() {
    for alias in ["download", "dl", "d"] {
        let cmd = parse(&["rget", alias, "https://example.com/a.bin"]);
        assert!(matches!(cmd, CliCommand::Download { .. }));
    }
}

#[test]
fn download_input_flag() {
    let cmd = parse(&["rget", "d", "-i", "sources.txt"]);
    match cmd {
        CliCommand::Download { source, input, .. } => {
            assert_eq!(source, "sources.txt");
            assert!(input);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn resolve_formats() {
    let cmd = parse(&["rget", "resolve", "https://example.com/a.bin"]);
    match cmd {
        CliCommand::Resolve { format, .. } => assert_eq!(format, OutputFormat::Text),
        other => panic!("unexpected command: {other:?}"),
    }

    let cmd = parse(&["rget", "ex", "-f", "json", "https://example.com/a.bin"]);
    match cmd {
        CliCommand::Resolve { format, .. } => assert_eq!(format, OutputFormat::Json),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn missing_source_is_a_parse_error() {
    assert!(Cli::try_parse_from(["rget", "download"]).is_err());
}

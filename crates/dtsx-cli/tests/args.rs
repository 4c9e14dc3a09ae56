use clap::Parser;

use dtsx_cli::args::{CliArgs, Command, OnError};

#[test]
fn parses_generate_with_entrypoints_and_flags() {
    let cli = CliArgs::try_parse_from([
        "dtsx",
        "generate",
        "--outDir",
        "dist",
        "--parallel",
        "--onError",
        "abort",
        "src/index.ts",
        "src/util.ts",
    ])
    .expect("flagged generate args should parse");

    let Command::Generate(args) = cli.command else { panic!("expected generate subcommand") };
    assert_eq!(args.outdir.as_deref(), Some(std::path::Path::new("dist")));
    assert!(args.parallel);
    assert!(!args.no_keep_comments);
    assert_eq!(args.on_error, OnError::Abort);
    assert_eq!(
        args.entrypoints,
        vec![std::path::PathBuf::from("src/index.ts"), std::path::PathBuf::from("src/util.ts")]
    );
}

#[test]
fn on_error_defaults_to_skip() {
    let cli = CliArgs::try_parse_from(["dtsx", "generate"]).expect("bare generate should parse");
    let Command::Generate(args) = cli.command else { panic!("expected generate subcommand") };
    assert_eq!(args.on_error, OnError::Skip);
}

#[test]
fn stdin_subcommand_accepts_file_name_override() {
    let cli = CliArgs::try_parse_from(["dtsx", "stdin", "--fileName", "foo.ts"]).expect("stdin args should parse");
    let Command::Stdin(args) = cli.command else { panic!("expected stdin subcommand") };
    assert_eq!(args.file_name, "foo.ts");
}

#[test]
fn global_project_flag_is_visible_to_every_subcommand() {
    let cli = CliArgs::try_parse_from(["dtsx", "--project", "dtsx.config.json", "watch"])
        .expect("global flag before subcommand should parse");
    assert_eq!(cli.project.as_deref(), Some(std::path::Path::new("dtsx.config.json")));
    assert!(matches!(cli.command, Command::Watch(_)));
}

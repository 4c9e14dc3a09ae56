//! End-to-end test of the generate path against a real temp directory,
//! exercising discovery, `process_source`, and output writing together.

use std::fs;

use dtsx_cli::config::ResolvedSettings;
use dtsx_cli::driver::run_with_settings;

fn settings(entrypoints: Vec<std::path::PathBuf>, root: std::path::PathBuf) -> ResolvedSettings {
    ResolvedSettings {
        root,
        outdir: None,
        entrypoints,
        exclude: Vec::new(),
        clean: false,
        dry_run: false,
        stats: false,
        progress: false,
        diff: false,
        validate: true,
        parallel: false,
        concurrency: None,
        keep_comments: true,
        import_order: Vec::new(),
        on_error: dtsx_cli::args::OnError::Skip,
        format: dtsx_cli::args::OutputFormat::Text,
    }
}

#[test]
fn generates_declaration_file_alongside_source() {
    let dir = tempfile::tempdir().unwrap();
    let src_path = dir.path().join("mod.ts");
    fs::write(&src_path, "export const port: number = 3000;\n").unwrap();

    let stats = run_with_settings(&settings(vec![dir.path().to_path_buf()], dir.path().to_path_buf())).unwrap();
    assert_eq!(stats.processed, 1);
    assert_eq!(stats.failed, 0);

    let dts = fs::read_to_string(dir.path().join("mod.d.ts")).unwrap();
    assert!(dts.contains("export declare const port: number;"));
}

#[test]
fn existing_declaration_files_are_not_rediscovered_as_sources() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("types.d.ts"), "export declare const x: number;\n").unwrap();
    fs::write(dir.path().join("index.ts"), "export const y = 1;\n").unwrap();

    let stats = run_with_settings(&settings(vec![dir.path().to_path_buf()], dir.path().to_path_buf())).unwrap();
    assert_eq!(stats.processed, 1);
}

#[test]
fn unparseable_source_is_skipped_not_fatal_by_default() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.ts"), "123;\n").unwrap();
    fs::write(dir.path().join("ok.ts"), "export const y = 1;\n").unwrap();

    let stats = run_with_settings(&settings(vec![dir.path().to_path_buf()], dir.path().to_path_buf())).unwrap();
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.processed, 1);
}

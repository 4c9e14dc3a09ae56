use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// CLI arguments for the dtsx binary.
#[derive(Parser, Debug)]
#[command(name = "dtsx", version, about = "Generate .d.ts files under the isolated-declarations discipline")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to dtsx.config.json or a directory containing it.
    #[arg(short = 'p', long = "project", global = true)]
    pub project: Option<PathBuf>,

    /// Set the minimum log level (error, warn, info, debug, trace).
    #[arg(long = "logLevel", alias = "log-level", global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk entrypoints and emit a `.d.ts` file next to each source file.
    Generate(GenerateArgs),
    /// Watch the project root and regenerate declarations on change.
    Watch(GenerateArgs),
    /// Read one file from stdin, emit its declaration text to stdout.
    Stdin(StdinArgs),
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    // ==================== Input/Output ====================
    /// Root directory to resolve entrypoints and excludes against.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Files or directories to scan for `.ts`/`.tsx` sources.
    #[arg(value_name = "ENTRYPOINT")]
    pub entrypoints: Vec<PathBuf>,

    /// Write generated files under this directory instead of alongside sources.
    #[arg(long = "outDir", alias = "out-dir")]
    pub outdir: Option<PathBuf>,

    /// Glob patterns to exclude from discovery (repeatable).
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Delete previously generated `.d.ts` files under `outDir` before generating.
    #[arg(long)]
    pub clean: bool,

    // ==================== Run mode ====================
    /// Report what would be written without touching the filesystem.
    #[arg(long = "dryRun", alias = "dry-run")]
    pub dry_run: bool,

    /// Print a per-run summary (files processed, pruned imports, elapsed time).
    #[arg(long)]
    pub stats: bool,

    /// Render a progress indicator while processing files.
    #[arg(long)]
    pub progress: bool,

    /// Print a colorized unified diff instead of writing output files.
    #[arg(long)]
    pub diff: bool,

    /// Parse generated output back and fail if it doesn't round-trip.
    #[arg(long)]
    pub validate: bool,

    // ==================== Concurrency ====================
    /// Process files across a `rayon` thread pool.
    #[arg(long)]
    pub parallel: bool,

    /// Thread pool size when `--parallel` is set (defaults to available parallelism).
    #[arg(long)]
    pub concurrency: Option<usize>,

    // ==================== Emit behavior ====================
    /// Strip leading comments from declarations instead of preserving them.
    #[arg(long = "noKeepComments", alias = "no-keep-comments")]
    pub no_keep_comments: bool,

    /// Priority order for import specifiers in generated output (repeatable).
    #[arg(long = "importOrder", alias = "import-order", value_delimiter = ',')]
    pub import_order: Vec<String>,

    // ==================== Error handling ====================
    /// What to do when a file fails to process: `skip` (default) or `abort`.
    #[arg(long = "onError", alias = "on-error", default_value = "skip")]
    pub on_error: OnError,

    // ==================== Reporting ====================
    /// Format for `--stats` output: `text` (default) or `json`.
    #[arg(long = "format")]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum, Default)]
pub enum OnError {
    #[default]
    Skip,
    Abort,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct StdinArgs {
    /// File name to report in diagnostics (the content itself still comes from stdin).
    #[arg(long = "fileName", alias = "file-name", default_value = "stdin.ts")]
    pub file_name: String,

    /// Strip leading comments from declarations instead of preserving them.
    #[arg(long = "noKeepComments", alias = "no-keep-comments")]
    pub no_keep_comments: bool,
}

impl StdinArgs {
    pub fn keep_comments(&self) -> bool {
        !self.no_keep_comments
    }
}

//! Batch generation: discover sources, run `process_source` over each, and
//! write (or diff, or dry-run-report) the resulting `.d.ts` text. Mirrors the
//! compiler driver's file-level continue-on-error shape, scaled down to a
//! single pure transform instead of a full bind/check/emit pipeline.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use dtsx_core::process_source;
use rayon::prelude::*;
use similar::{ChangeTag, TextDiff};

use crate::args::{GenerateArgs, OnError, OutputFormat, StdinArgs};
use crate::config::{ResolvedSettings, load_config, resolve_settings};
use crate::discovery::{build_exclude_set, discover_sources, output_path_for};

pub struct RunStats {
    pub processed: usize,
    pub failed: usize,
    pub written: usize,
}

pub fn run_generate(args: &GenerateArgs, project: Option<&Path>) -> Result<RunStats> {
    let config = load_config(project)?;
    let settings = resolve_settings(config.as_ref(), args);
    run_with_settings(&settings)
}

pub fn run_with_settings(settings: &ResolvedSettings) -> Result<RunStats> {
    let start = Instant::now();
    let exclude = build_exclude_set(&settings.exclude)?;
    let sources = discover_sources(&settings.entrypoints, &exclude)?;

    if settings.clean && !settings.dry_run {
        clean_outputs(&sources, settings)?;
    }

    let results: Vec<Result<FileOutcome>> = if settings.parallel {
        if let Some(n) = settings.concurrency {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            pool.install(|| sources.par_iter().map(|path| process_one(path, settings)).collect())
        } else {
            sources.par_iter().map(|path| process_one(path, settings)).collect()
        }
    } else {
        sources.iter().map(|path| process_one(path, settings)).collect()
    };

    let mut processed = 0usize;
    let mut failed = 0usize;
    let mut written = 0usize;

    for (path, result) in sources.iter().zip(results.into_iter()) {
        match result {
            Ok(outcome) => {
                processed += 1;
                if settings.progress {
                    eprintln!("{} {}", "ok".green(), path.display());
                }
                if outcome.wrote {
                    written += 1;
                }
            }
            Err(err) => {
                failed += 1;
                eprintln!("{} {}: {err:#}", "error".red(), path.display());
                if settings.on_error == OnError::Abort {
                    bail!("aborting after failure in {}", path.display());
                }
            }
        }
    }

    if settings.stats {
        let elapsed = start.elapsed();
        match settings.format {
            OutputFormat::Text => eprintln!("{processed} processed, {failed} failed, {written} written in {elapsed:.2?}"),
            OutputFormat::Json => eprintln!(
                r#"{{"processed":{processed},"failed":{failed},"written":{written},"elapsedMs":{}}}"#,
                elapsed.as_millis()
            ),
        }
    }

    Ok(RunStats { processed, failed, written })
}

struct FileOutcome {
    wrote: bool,
}

fn process_one(path: &Path, settings: &ResolvedSettings) -> Result<FileOutcome> {
    let source = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path.to_string_lossy().into_owned();
    let result = process_source(&source, &file_name, settings.keep_comments, &settings.import_order)
        .map_err(|err| anyhow::anyhow!("{file_name}: {err}"))?;

    if settings.validate {
        if let Some(e) = dtsx_parser::parse_program(&result.dts).errors.first() {
            bail!("generated declarations do not parse: {}", e.message);
        }
    }

    let out_path = output_path_for(path, &settings.root, settings.outdir.as_deref());

    if settings.diff {
        print_diff(&out_path, &result.dts);
        return Ok(FileOutcome { wrote: false });
    }

    if settings.dry_run {
        eprintln!("{} {}", "would write".yellow(), out_path.display());
        return Ok(FileOutcome { wrote: false });
    }

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&out_path, &result.dts).with_context(|| format!("failed to write {}", out_path.display()))?;
    Ok(FileOutcome { wrote: true })
}

fn print_diff(out_path: &Path, new_text: &str) {
    let old_text = fs::read_to_string(out_path).unwrap_or_default();
    let diff = TextDiff::from_lines(&old_text, new_text);
    println!("--- {}", out_path.display());
    println!("+++ {}", out_path.display());
    for change in diff.iter_all_changes() {
        let line = change.to_string();
        match change.tag() {
            ChangeTag::Delete => print!("{}{}", "-".red(), line.red()),
            ChangeTag::Insert => print!("{}{}", "+".green(), line.green()),
            ChangeTag::Equal => print!(" {line}"),
        }
    }
}

fn clean_outputs(sources: &[PathBuf], settings: &ResolvedSettings) -> Result<()> {
    for source in sources {
        let out_path = output_path_for(source, &settings.root, settings.outdir.as_deref());
        if out_path.is_file() {
            fs::remove_file(&out_path).with_context(|| format!("failed to remove {}", out_path.display()))?;
        }
    }
    Ok(())
}

/// Read one file from stdin, emit its `.d.ts` text to stdout.
pub fn run_stdin(args: &StdinArgs) -> Result<()> {
    let mut source = String::new();
    io::stdin().read_to_string(&mut source).context("failed to read stdin")?;
    let result = process_source(&source, &args.file_name, args.keep_comments(), &[])
        .map_err(|err| anyhow::anyhow!("{}: {err}", args.file_name))?;
    io::stdout().write_all(result.dts.as_bytes()).context("failed to write stdout")?;
    Ok(())
}

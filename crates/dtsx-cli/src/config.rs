//! `dtsx.config.json` loading and CLI-flag merging. File values act as
//! defaults; flags passed on the command line always win, mirroring the
//! tsconfig load-then-override pattern the driver uses for compiler options.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::args::{GenerateArgs, OnError, OutputFormat};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DtsxConfig {
    pub root: Option<PathBuf>,
    pub outdir: Option<PathBuf>,
    #[serde(default)]
    pub entrypoints: Vec<PathBuf>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub clean: bool,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub stats: bool,
    #[serde(default)]
    pub progress: bool,
    #[serde(default)]
    pub diff: bool,
    #[serde(default)]
    pub validate: bool,
    #[serde(default)]
    pub parallel: bool,
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub watch: bool,
    pub keep_comments: Option<bool>,
    #[serde(default)]
    pub import_order: Vec<String>,
    pub log_level: Option<String>,
    pub output_format: Option<String>,
}

/// Load `dtsx.config.json`, either from an explicit path or a directory
/// containing it. Returns `None` when no config file is present — every
/// field then falls back to the CLI default.
pub fn load_config(project: Option<&Path>) -> Result<Option<DtsxConfig>> {
    let Some(path) = resolve_config_path(project) else {
        return Ok(None);
    };
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: DtsxConfig = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(config))
}

fn resolve_config_path(project: Option<&Path>) -> Option<PathBuf> {
    match project {
        Some(p) if p.is_file() => Some(p.to_path_buf()),
        Some(p) => {
            let candidate = p.join("dtsx.config.json");
            candidate.is_file().then_some(candidate)
        }
        None => {
            let candidate = PathBuf::from("dtsx.config.json");
            candidate.is_file().then_some(candidate)
        }
    }
}

/// Compiler-facing settings resolved from config file defaults overridden by
/// explicit CLI flags. `generate` and `watch` share this shape.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub root: PathBuf,
    pub outdir: Option<PathBuf>,
    pub entrypoints: Vec<PathBuf>,
    pub exclude: Vec<String>,
    pub clean: bool,
    pub dry_run: bool,
    pub stats: bool,
    pub progress: bool,
    pub diff: bool,
    pub validate: bool,
    pub parallel: bool,
    pub concurrency: Option<usize>,
    pub keep_comments: bool,
    pub import_order: Vec<String>,
    pub on_error: OnError,
    pub format: OutputFormat,
}

pub fn resolve_settings(config: Option<&DtsxConfig>, args: &GenerateArgs) -> ResolvedSettings {
    let root = args
        .root
        .clone()
        .or_else(|| config.and_then(|c| c.root.clone()))
        .unwrap_or_else(|| PathBuf::from("."));

    let mut entrypoints = args.entrypoints.clone();
    if entrypoints.is_empty() {
        if let Some(c) = config {
            entrypoints = c.entrypoints.clone();
        }
    }
    if entrypoints.is_empty() {
        entrypoints.push(root.clone());
    }

    let mut exclude = args.exclude.clone();
    if exclude.is_empty() {
        if let Some(c) = config {
            exclude = c.exclude.clone();
        }
    }

    let mut import_order = args.import_order.clone();
    if import_order.is_empty() {
        if let Some(c) = config {
            import_order = c.import_order.clone();
        }
    }

    ResolvedSettings {
        root,
        outdir: args.outdir.clone().or_else(|| config.and_then(|c| c.outdir.clone())),
        entrypoints,
        exclude,
        clean: args.clean || config.is_some_and(|c| c.clean),
        dry_run: args.dry_run || config.is_some_and(|c| c.dry_run),
        stats: args.stats || config.is_some_and(|c| c.stats),
        progress: args.progress || config.is_some_and(|c| c.progress),
        diff: args.diff || config.is_some_and(|c| c.diff),
        validate: args.validate || config.is_some_and(|c| c.validate),
        parallel: args.parallel || config.is_some_and(|c| c.parallel),
        concurrency: args.concurrency.or_else(|| config.and_then(|c| c.concurrency)),
        keep_comments: config.and_then(|c| c.keep_comments).unwrap_or(!args.no_keep_comments),
        import_order,
        on_error: args.on_error,
        format: args
            .format
            .or_else(|| config.and_then(|c| c.output_format.as_deref().and_then(parse_output_format)))
            .unwrap_or_default(),
    }
}

fn parse_output_format(s: &str) -> Option<OutputFormat> {
    match s {
        "text" => Some(OutputFormat::Text),
        "json" => Some(OutputFormat::Json),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_entrypoints_take_precedence_over_config() {
        let config = DtsxConfig { entrypoints: vec![PathBuf::from("from-config")], ..Default::default() };
        let args = GenerateArgs { entrypoints: vec![PathBuf::from("from-cli")], ..Default::default() };
        let resolved = resolve_settings(Some(&config), &args);
        assert_eq!(resolved.entrypoints, vec![PathBuf::from("from-cli")]);
    }

    #[test]
    fn config_fills_entrypoints_when_cli_omits_them() {
        let config = DtsxConfig { entrypoints: vec![PathBuf::from("src")], ..Default::default() };
        let args = GenerateArgs::default();
        let resolved = resolve_settings(Some(&config), &args);
        assert_eq!(resolved.entrypoints, vec![PathBuf::from("src")]);
    }

    #[test]
    fn config_output_format_is_used_when_cli_omits_it() {
        let config = DtsxConfig { output_format: Some("json".to_string()), ..Default::default() };
        let args = GenerateArgs::default();
        let resolved = resolve_settings(Some(&config), &args);
        assert_eq!(resolved.format, OutputFormat::Json);
    }

    #[test]
    fn cli_format_overrides_config() {
        let config = DtsxConfig { output_format: Some("json".to_string()), ..Default::default() };
        let args = GenerateArgs { format: Some(OutputFormat::Text), ..Default::default() };
        let resolved = resolve_settings(Some(&config), &args);
        assert_eq!(resolved.format, OutputFormat::Text);
    }

    #[test]
    fn missing_config_falls_back_to_root_as_entrypoint() {
        let args = GenerateArgs { root: Some(PathBuf::from("proj")), ..Default::default() };
        let resolved = resolve_settings(None, &args);
        assert_eq!(resolved.entrypoints, vec![PathBuf::from("proj")]);
    }
}

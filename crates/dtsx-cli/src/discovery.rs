//! Entrypoint discovery: walk each configured entrypoint and collect
//! `.ts`/`.tsx` sources, skipping declaration files and excluded globs.

use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

pub fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Walk `entrypoints`, returning every `.ts`/`.tsx` source file not matched
/// by `exclude` and not already a declaration file. Files are deduplicated
/// and returned in a stable, sorted order so batch runs are deterministic.
pub fn discover_sources(entrypoints: &[PathBuf], exclude: &GlobSet) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entrypoint in entrypoints {
        if entrypoint.is_file() {
            if is_source_file(entrypoint) && !exclude.is_match(entrypoint) {
                found.push(entrypoint.clone());
            }
            continue;
        }
        for entry in WalkDir::new(entrypoint).into_iter().filter_map(Result::ok) {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_source_file(path) || exclude.is_match(path) {
                continue;
            }
            found.push(path.to_path_buf());
        }
    }
    found.sort();
    found.dedup();
    Ok(found)
}

fn is_source_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.ends_with(".d.ts") || name.ends_with(".d.tsx") {
        return false;
    }
    matches!(path.extension().and_then(|e| e.to_str()), Some("ts") | Some("tsx"))
}

/// Where a source file's generated declaration should be written:
/// alongside the source when `outdir` is `None`, or mirrored under
/// `outdir` relative to `root` otherwise.
pub fn output_path_for(source: &Path, root: &Path, outdir: Option<&Path>) -> PathBuf {
    let stem_path = strip_ts_extension(source);
    let Some(outdir) = outdir else {
        return with_dts_extension(&stem_path);
    };
    let relative = stem_path.strip_prefix(root).unwrap_or(&stem_path);
    with_dts_extension(&outdir.join(relative))
}

fn strip_ts_extension(path: &Path) -> PathBuf {
    path.with_extension("")
}

fn with_dts_extension(path: &Path) -> PathBuf {
    let mut name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
    name.push_str(".d.ts");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_files_are_never_treated_as_sources() {
        assert!(!is_source_file(Path::new("a.d.ts")));
        assert!(is_source_file(Path::new("a.ts")));
        assert!(is_source_file(Path::new("a.tsx")));
        assert!(!is_source_file(Path::new("a.js")));
    }

    #[test]
    fn output_path_mirrors_into_outdir_when_set() {
        let out = output_path_for(Path::new("src/foo/bar.ts"), Path::new("src"), Some(Path::new("dist")));
        assert_eq!(out, PathBuf::from("dist/foo/bar.d.ts"));
    }

    #[test]
    fn output_path_sits_alongside_source_without_outdir() {
        let out = output_path_for(Path::new("src/foo/bar.ts"), Path::new("src"), None);
        assert_eq!(out, PathBuf::from("src/foo/bar.d.ts"));
    }

    #[test]
    fn exclude_globs_filter_matching_paths() {
        let set = build_exclude_set(&["**/*.test.ts".to_string()]).unwrap();
        assert!(set.is_match(Path::new("src/foo.test.ts")));
        assert!(!set.is_match(Path::new("src/foo.ts")));
    }
}

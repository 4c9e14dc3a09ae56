//! Watch mode: re-run generation whenever a source file under the resolved
//! root changes. Debounces bursts of filesystem events (editors frequently
//! emit several writes per save) into a single regeneration pass.

use std::path::Path;
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::args::GenerateArgs;
use crate::config::{load_config, resolve_settings};
use crate::driver::run_with_settings;

const DEBOUNCE: Duration = Duration::from_millis(200);

pub fn run_watch(args: &GenerateArgs, project: Option<&Path>) -> Result<()> {
    let config = load_config(project)?;
    let settings = resolve_settings(config.as_ref(), args);

    tracing::info!(root = %settings.root.display(), "dtsx: starting watch mode");
    run_with_settings(&settings).ok();

    let (tx, rx) = channel::<notify::Result<Event>>();
    let mut watcher: RecommendedWatcher =
        notify::recommended_watcher(tx).context("failed to create filesystem watcher")?;
    watcher.watch(&settings.root, RecursiveMode::Recursive).context("failed to watch root")?;

    loop {
        let first = match rx.recv() {
            Ok(event) => event,
            Err(_) => break,
        };
        let mut relevant = event_touches_source(&first);
        // Drain any additional events that arrive within the debounce window
        // so a single save (which may fire several write/rename events)
        // triggers one regeneration instead of several.
        loop {
            match rx.recv_timeout(DEBOUNCE) {
                Ok(event) => relevant |= event_touches_source(&event),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            }
        }
        if !relevant {
            continue;
        }
        tracing::debug!("dtsx: change detected, regenerating");
        if let Err(err) = run_with_settings(&settings) {
            eprintln!("error: {err:#}");
        }
    }

    Ok(())
}

fn event_touches_source(event: &notify::Result<Event>) -> bool {
    let Ok(event) = event else { return false };
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)) {
        return false;
    }
    event.paths.iter().any(|p| {
        let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
        !name.ends_with(".d.ts") && matches!(p.extension().and_then(|e| e.to_str()), Some("ts") | Some("tsx"))
    })
}

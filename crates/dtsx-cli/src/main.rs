use clap::Parser;
use tracing_subscriber::EnvFilter;

use dtsx_cli::args::CliArgs;
use dtsx_cli::config::load_config;

fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();
    let config_log_level = load_config(cli.project.as_deref()).ok().flatten().and_then(|c| c.log_level);
    init_tracing(cli.log_level.as_deref().or(config_log_level.as_deref()));

    if let Err(err) = dtsx_cli::run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
    Ok(())
}

/// stderr-only subscriber (stdout is reserved for `stdin` mode's emitted
/// declaration text) honoring `RUST_LOG`, with `--logLevel` (or the config
/// file's `logLevel`) as a fallback default when `RUST_LOG` isn't set.
fn init_tracing(log_level: Option<&str>) {
    let default_directive = log_level.unwrap_or("warn");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

//! Host for `dtsx-core`: argument parsing, config loading, file discovery,
//! parallel batching, watch mode, and diff/progress rendering. `dtsx-core`
//! never touches stdio or the filesystem; everything in this crate resolves
//! down to calls into its single pure entry point, `process_source`.

pub mod args;
pub mod config;
pub mod discovery;
pub mod driver;
pub mod watch;

use anyhow::Result;

use args::{CliArgs, Command};

pub fn run(cli: CliArgs) -> Result<()> {
    match &cli.command {
        Command::Generate(args) => {
            driver::run_generate(args, cli.project.as_deref())?;
            Ok(())
        }
        Command::Watch(args) => watch::run_watch(args, cli.project.as_deref()),
        Command::Stdin(args) => driver::run_stdin(args),
    }
}

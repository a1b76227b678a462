mod convert;
mod inspect;
mod utils;

use std::process::ExitCode;

use crate::cli::{Cli, Commands, GlobalOptions};
use vectorize::VectorizeResult;

/// The main function to run the command based on CLI input.
pub fn run(cli: Cli) -> VectorizeResult<ExitCode> {
    let Cli { global, command } = cli;
    dispatch(&global, command)
}

/// Dispatch the command to the appropriate handler.
fn dispatch(global: &GlobalOptions, command: Commands) -> VectorizeResult<ExitCode> {
    match command {
        Commands::Inspect(cmd) => inspect::run(global, cmd),
        Commands::Convert(cmd) => convert::run(global, cmd),
    }
}

use std::process::ExitCode;

use vectorize::VectorizeResult;

use crate::cli::{GlobalOptions, InspectCommand};

use super::utils::build_vectorizer;

/// The main function to run the inspect command.
pub fn run(global: &GlobalOptions, cmd: InspectCommand) -> VectorizeResult<ExitCode> {
    let vectorizer = build_vectorizer(global, (&cmd).into())?;
    let options = vectorizer.inspect(&cmd.input)?;
    println!("{}", serde_json::to_string_pretty(&options)?);
    Ok(ExitCode::SUCCESS)
}

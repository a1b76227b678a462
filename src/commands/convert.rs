use std::process::ExitCode;

use tracing::warn;
use vectorize::{BitmapTracer, OptionSelection, VectorizationOption, VectorizeResult, convert_directory};

use crate::cli::{ConvertCommand, GlobalOptions};

use super::utils::{build_vectorizer, derive_svg_path, format_colors};

/// The main function to run the convert command.
pub fn run(global: &GlobalOptions, cmd: ConvertCommand) -> VectorizeResult<ExitCode> {
    let vectorizer = build_vectorizer(global, (&cmd).into())?;
    let selection = match cmd.level {
        Some(level) => OptionSelection::Fixed(VectorizationOption {
            level,
            colors: cmd.colors.clone(),
        }),
        None => OptionSelection::Auto(cmd.option),
    };

    if cmd.input.is_dir() {
        if cmd.output.is_some() {
            warn!("--output is ignored when converting a directory");
        }
        let report = convert_directory(&vectorizer, &cmd.input, &selection)?;
        println!(
            "Done: {} succeeded, {} failed",
            report.succeeded_count(),
            report.failed_count()
        );
        for (path, message) in &report.failed {
            println!("  failed {}: {message}", path.display());
        }
        if report.succeeded_count() > 0 {
            println!("SVG files saved to {}", report.output_dir.display());
        }
        return Ok(if report.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    vectorizer.tracer().check_available()?;
    let option = selection.resolve(&vectorizer, &cmd.input)?;
    println!(
        "Using level {} with colors [{}]",
        option.level,
        format_colors(&option.colors)
    );

    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| derive_svg_path(&cmd.input));
    vectorizer.convert_file(&cmd.input, &output_path, &option)?;
    println!("SVG saved to {}", output_path.display());

    Ok(ExitCode::SUCCESS)
}

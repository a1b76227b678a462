use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use vectorize::{Color, ConversionSettings, MAX_LEVEL, PotraceOptions, RemapOptions};

/// Command line interface definition.
#[derive(Parser, Debug)]
#[command(author, version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// potrace binary name or path
    #[arg(long, env = "VECTORIZE_POTRACE", default_value = "potrace", global = true)]
    pub potrace: PathBuf,
    /// Seconds before a single potrace run is killed
    #[arg(long, default_value_t = 60, global = true)]
    pub timeout: u64,
    /// Tracing backend used for every layer
    #[arg(long, value_enum, default_value_t = TracerArg::Potrace, global = true)]
    pub tracer: TracerArg,
}

impl From<&GlobalOptions> for PotraceOptions {
    fn from(global: &GlobalOptions) -> Self {
        PotraceOptions::default()
            .with_binary(global.potrace.clone())
            .with_timeout(Duration::from_secs(global.timeout))
    }
}

/// Tracing backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TracerArg {
    /// External potrace binary
    Potrace,
    /// In-process VTracer (needs the `vectorizer-vtracer` feature)
    Vtracer,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the suggested vectorization options for a PNG as JSON
    Inspect(InspectCommand),
    /// Convert a PNG, or every PNG in a directory, to SVG
    Convert(ConvertCommand),
}

#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Input PNG path
    pub input: PathBuf,
    /// Number of dominant colors to extract
    #[arg(long = "palette-size", default_value_t = 5)]
    pub palette_size: usize,
}

impl From<&InspectCommand> for ConversionSettings {
    fn from(cmd: &InspectCommand) -> Self {
        ConversionSettings::default().with_palette_size(cmd.palette_size)
    }
}

#[derive(Args, Debug)]
pub struct ConvertCommand {
    /// Input PNG file, or a directory of PNG files
    pub input: PathBuf,
    /// Output SVG path for a single file (defaults to input name with `.svg`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Index of the inspected option to use; past the end picks the last one
    #[arg(long, default_value_t = 0, conflicts_with = "level")]
    pub option: usize,
    /// Posterization level to use instead of an inspected option
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_LEVEL as i64))]
    pub level: Option<u32>,
    /// Color for an explicit level (repeatable; level 1 paints with the first)
    #[arg(long = "color", value_name = "HEX", value_parser = parse_color, requires = "level")]
    pub colors: Vec<Color>,
    /// Binarization threshold for level 1, in percent of full brightness
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: u8,
    /// Seed for pixel sampling and color clustering
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<&ConvertCommand> for ConversionSettings {
    fn from(cmd: &ConvertCommand) -> Self {
        ConversionSettings::default()
            .with_threshold_percent(cmd.threshold)
            .with_remap(RemapOptions {
                seed: cmd.seed,
                ..RemapOptions::default()
            })
    }
}

fn parse_color(value: &str) -> Result<Color, String> {
    value.parse::<Color>().map_err(|err| err.to_string())
}

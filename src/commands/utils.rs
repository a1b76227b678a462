use std::path::{Path, PathBuf};

use vectorize::{
    BitmapTracer, Color, ConversionSettings, PotraceTracer, VectorizeError, VectorizeResult, Vectorizer,
};

use crate::cli::{GlobalOptions, TracerArg};

/// The convenience function to build a Vectorizer from the global options and conversion settings.
pub fn build_vectorizer(
    global: &GlobalOptions,
    settings: ConversionSettings,
) -> VectorizeResult<Vectorizer<Box<dyn BitmapTracer>>> {
    let tracer: Box<dyn BitmapTracer> = match global.tracer {
        TracerArg::Potrace => Box::new(PotraceTracer::new(global.into())),
        #[cfg(feature = "vectorizer-vtracer")]
        TracerArg::Vtracer => Box::new(vectorize::VtracerTracer::default()),
        #[cfg(not(feature = "vectorizer-vtracer"))]
        TracerArg::Vtracer => {
            return Err(VectorizeError::ToolUnavailable {
                tool: "vtracer".to_string(),
                reason: "built without the `vectorizer-vtracer` feature".to_string(),
            });
        }
    };
    Ok(Vectorizer::new(tracer).with_settings(settings))
}

/// Derive an SVG file path by changing the extension to "svg".
pub fn derive_svg_path(input: &Path) -> PathBuf {
    let mut path = input.to_path_buf();
    path.set_extension("svg");
    path
}

/// Colors as a comma-separated hex list for terminal output.
pub fn format_colors(colors: &[Color]) -> String {
    colors
        .iter()
        .map(|c| c.to_hex())
        .collect::<Vec<_>>()
        .join(", ")
}

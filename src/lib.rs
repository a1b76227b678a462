pub mod advisor;
pub mod batch;
pub mod cluster;
pub mod color;
pub mod config;
pub mod error;
pub mod layer;
pub mod normalize;
pub mod remap;
pub mod sampler;
pub mod solid;
mod svg;
pub mod vectorizer;

pub use advisor::{VectorizationOption, advise};
pub use batch::{BatchReport, OptionSelection, convert_directory};
pub use color::Color;
pub use config::{ConversionSettings, PotraceOptions, RemapOptions};
pub use error::{VectorizeError, VectorizeResult};
pub use layer::MAX_LEVEL;
pub use sampler::{PixelGrid, load_pixels};
pub use vectorizer::BitmapTracer;
pub use vectorizer::potrace::PotraceTracer;
#[cfg(feature = "vectorizer-vtracer")]
pub use vectorizer::vtracer::{TraceOptions, VtracerTracer};

use std::path::Path;

use tracing::{debug, info};

use crate::layer::{posterize_layers, stack_layers};
use crate::normalize::finalize;
use crate::remap::{replace_black, replace_colors};
use crate::sampler::dominant_palette;
use crate::solid::resolve_solid;

/// Entry point for inspecting images and converting them to SVG.
#[derive(Debug, Clone)]
pub struct Vectorizer<T> {
    tracer: T,
    settings: ConversionSettings,
}

impl Vectorizer<PotraceTracer> {
    /// A vectorizer that traces with the `potrace` binary.
    pub fn potrace(options: PotraceOptions) -> Self {
        Self::new(PotraceTracer::new(options))
    }
}

impl<T: BitmapTracer> Vectorizer<T> {
    pub fn new(tracer: T) -> Self {
        Self {
            tracer,
            settings: ConversionSettings::default(),
        }
    }

    /// Replace the conversion settings.
    pub fn with_settings(mut self, settings: ConversionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    /// Propose vectorization options for the image at `path`, lowest level first.
    pub fn inspect(&self, path: impl AsRef<Path>) -> VectorizeResult<Vec<VectorizationOption>> {
        let grid = load_pixels(path.as_ref())?;
        let palette = dominant_palette(
            &grid,
            self.settings.palette_size,
            self.settings.palette_quality,
        );
        debug!(path = %path.as_ref().display(), ?palette, "extracted palette");
        Ok(advise(&palette))
    }

    /// Convert the image at `path` to a finished SVG document.
    pub fn convert(
        &self,
        path: impl AsRef<Path>,
        option: &VectorizationOption,
    ) -> VectorizeResult<String> {
        let grid = load_pixels(path.as_ref())?;
        self.convert_grid(&grid, option)
    }

    /// Convert already decoded pixels to a finished SVG document.
    ///
    /// Level 1 traces a single threshold layer and paints it with the
    /// option's first color. Higher levels trace one layer per gray band and
    /// map the resulting grays back onto the source image's colors.
    pub fn convert_grid(
        &self,
        grid: &PixelGrid,
        option: &VectorizationOption,
    ) -> VectorizeResult<String> {
        let level = option.level.clamp(1, MAX_LEVEL);
        let layers = posterize_layers(grid, level, self.settings.threshold_percent);
        debug!(level, layers = layers.len(), tracer = self.tracer.name(), "tracing layers");

        let traced = layers
            .iter()
            .map(|layer| Ok((layer.opacity, self.tracer.trace(&layer.bitmap)?)))
            .collect::<VectorizeResult<Vec<_>>>()?;
        let stacked = stack_layers(grid.width(), grid.height(), &traced)?;

        let solid = resolve_solid(&stacked, level != 1, grid.width(), grid.height());
        let colored = if level == 1 {
            match option.colors.first() {
                Some(&color) => replace_black(&solid, color),
                None => solid,
            }
        } else {
            replace_colors(&solid, grid, &self.settings.remap)
        };

        finalize(&colored)
    }

    /// Convert `input` and write the SVG document to `output`.
    pub fn convert_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        option: &VectorizationOption,
    ) -> VectorizeResult<()> {
        let svg = self.convert(input.as_ref(), option)?;
        std::fs::write(output.as_ref(), svg)?;
        info!(
            input = %input.as_ref().display(),
            output = %output.as_ref().display(),
            level = option.level,
            "wrote SVG"
        );
        Ok(())
    }
}

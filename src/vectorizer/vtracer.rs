use image::{GrayImage, Luma};
use visioncortex::PathSimplifyMode;
use vtracer::{ColorImage, ColorMode, Config, Hierarchical, convert};

use crate::{VectorizeError, VectorizeResult};

use super::BitmapTracer;

/// Options for tracing a layer bitmap with VTracer.
#[derive(Debug, Clone)]
pub struct TraceOptions {
    pub tracer_mode: PathSimplifyMode,
    pub tracer_filter_speckle: usize,
    pub tracer_corner_threshold: i32,
    pub tracer_length_threshold: f64,
    pub tracer_max_iterations: usize,
    pub tracer_splice_threshold: i32,
    pub tracer_path_precision: Option<u32>,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            tracer_mode: PathSimplifyMode::Spline,
            tracer_filter_speckle: 4,
            tracer_corner_threshold: 60,
            tracer_length_threshold: 4.0,
            tracer_max_iterations: 10,
            tracer_splice_threshold: 45,
            tracer_path_precision: Some(2),
        }
    }
}

/// In-process tracer built on VTracer's binary mode.
#[derive(Debug, Clone, Default)]
pub struct VtracerTracer {
    options: TraceOptions,
}

impl VtracerTracer {
    pub fn new(options: TraceOptions) -> Self {
        Self { options }
    }

    fn config(&self) -> Config {
        let options = &self.options;
        Config {
            color_mode: ColorMode::Binary,
            hierarchical: Hierarchical::Stacked,
            mode: options.tracer_mode,
            filter_speckle: options.tracer_filter_speckle,
            // color quantization does not apply to binary mode
            color_precision: 6,
            layer_difference: 16,
            corner_threshold: options.tracer_corner_threshold,
            length_threshold: options.tracer_length_threshold,
            max_iterations: options.tracer_max_iterations,
            splice_threshold: options.tracer_splice_threshold,
            path_precision: options.tracer_path_precision,
        }
    }
}

impl BitmapTracer for VtracerTracer {
    fn name(&self) -> &str {
        "vtracer"
    }

    fn check_available(&self) -> VectorizeResult<()> {
        Ok(())
    }

    fn trace(&self, bitmap: &GrayImage) -> VectorizeResult<String> {
        let svg_file = convert(bitmap_to_color_image(bitmap), self.config())
            .map_err(VectorizeError::Trace)?;
        Ok(svg_file.to_string())
    }
}

/// Expand a gray bitmap into the opaque RGBA buffer VTracer reads.
fn bitmap_to_color_image(bitmap: &GrayImage) -> ColorImage {
    let (width, height) = bitmap.dimensions();
    let mut pixels = Vec::with_capacity(4 * width as usize * height as usize);
    for Luma([value]) in bitmap.pixels() {
        pixels.extend_from_slice(&[*value, *value, *value, 255]);
    }
    ColorImage {
        pixels,
        width: width as usize,
        height: height as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traces_square() {
        let bitmap = GrayImage::from_fn(32, 32, |x, y| {
            if (8..24).contains(&x) && (8..24).contains(&y) { Luma([0]) } else { Luma([255]) }
        });
        let svg = VtracerTracer::default().trace(&bitmap).unwrap();
        let paths = crate::layer::extract_paths(&svg).unwrap();
        assert!(!paths.is_empty());
    }

    #[test]
    fn color_image_is_opaque_rgba() {
        let bitmap = GrayImage::from_raw(2, 1, vec![0, 255]).unwrap();
        let image = bitmap_to_color_image(&bitmap);
        assert_eq!(image.pixels, vec![0, 0, 0, 255, 255, 255, 255, 255]);
    }
}

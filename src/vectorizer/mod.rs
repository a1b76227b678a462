use image::GrayImage;

use crate::VectorizeResult;

/// A trait representing an algorithm that can turn a binary bitmap into SVG paths.
///
/// Black pixels (0) are foreground. The returned document may use any
/// coordinate transform as long as it is expressed through `transform`
/// attributes on the paths or their ancestors.
pub trait BitmapTracer {
    /// Human-readable tracer name used in logs and errors.
    fn name(&self) -> &str;

    /// Fail early when the tracer cannot run, e.g. a missing binary.
    fn check_available(&self) -> VectorizeResult<()>;

    fn trace(&self, bitmap: &GrayImage) -> VectorizeResult<String>;
}

impl<T: BitmapTracer + ?Sized> BitmapTracer for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn check_available(&self) -> VectorizeResult<()> {
        (**self).check_available()
    }

    fn trace(&self, bitmap: &GrayImage) -> VectorizeResult<String> {
        (**self).trace(bitmap)
    }
}

impl<T: BitmapTracer + ?Sized> BitmapTracer for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn check_available(&self) -> VectorizeResult<()> {
        (**self).check_available()
    }

    fn trace(&self, bitmap: &GrayImage) -> VectorizeResult<String> {
        (**self).trace(bitmap)
    }
}

pub mod potrace;
#[cfg(feature = "vectorizer-vtracer")]
pub mod vtracer;

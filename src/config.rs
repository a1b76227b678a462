use std::path::PathBuf;
use std::time::Duration;

/// Options for a single image conversion.
#[derive(Debug, Clone)]
pub struct ConversionSettings {
    /// Binarization threshold in percent of full brightness, used for level 1 tracing.
    pub threshold_percent: u8,
    /// Number of dominant colors extracted when inspecting an image.
    pub palette_size: usize,
    /// Every n-th eligible pixel is used for palette extraction (1 = all pixels).
    pub palette_quality: usize,
    /// Options for mapping traced colors back onto the source image.
    pub remap: RemapOptions,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            threshold_percent: 50,
            palette_size: 5,
            palette_quality: 1,
            remap: RemapOptions::default(),
        }
    }
}

impl ConversionSettings {
    /// Set the binarization threshold (0-100).
    pub fn with_threshold_percent(mut self, threshold_percent: u8) -> Self {
        self.threshold_percent = threshold_percent.min(100);
        self
    }

    /// Set the number of dominant colors used for inspection.
    pub fn with_palette_size(mut self, palette_size: usize) -> Self {
        self.palette_size = palette_size;
        self
    }

    /// Replace the color remapping options.
    pub fn with_remap(mut self, remap: RemapOptions) -> Self {
        self.remap = remap;
        self
    }
}

/// Options for clustering source pixels and remapping SVG colors.
#[derive(Debug, Clone)]
pub struct RemapOptions {
    /// Upper bound on sampled source pixels.
    pub sample_size: usize,
    /// Upper bound on the number of clusters.
    pub max_clusters: usize,
    /// Seed shared by pixel sampling and clustering.
    pub seed: u64,
    /// Number of clustering runs; the lowest-score run wins.
    pub n_init: u64,
    pub max_iter: usize,
    pub converge: f32,
}

impl Default for RemapOptions {
    fn default() -> Self {
        Self {
            sample_size: 1000,
            max_clusters: 5,
            seed: 42,
            n_init: 10,
            max_iter: 20,
            converge: 1e-4,
        }
    }
}

/// Options for invoking the potrace binary.
#[derive(Debug, Clone)]
pub struct PotraceOptions {
    /// Binary name or path.
    pub binary: PathBuf,
    /// Curve optimization tolerance passed as `--opttolerance`.
    pub opt_tolerance: f64,
    /// The child is killed and the trace fails once this elapses.
    pub timeout: Duration,
}

impl Default for PotraceOptions {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("potrace"),
            opt_tolerance: 0.5,
            timeout: Duration::from_secs(60),
        }
    }
}

impl PotraceOptions {
    /// Use a specific potrace binary.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the timeout for a single potrace run.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

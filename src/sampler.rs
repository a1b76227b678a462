use std::path::Path;

use image::{ColorType, DynamicImage, RgbImage, RgbaImage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

use crate::cluster::{KmeansParams, kmeans};
use crate::color::Color;
use crate::{VectorizeError, VectorizeResult};

/// Pixels with alpha at or below this value are ignored when sampling.
pub const SAMPLE_ALPHA_THRESHOLD: u8 = 128;
/// Pixels with alpha below this value are ignored when extracting a palette.
const PALETTE_MIN_ALPHA: u8 = 125;
/// Pixels brighter than this on every channel are ignored when extracting a palette.
const PALETTE_WHITE_CUTOFF: u8 = 250;
const PALETTE_SEED: u64 = 0;

/// Decoded image as interleaved 8-bit RGB or RGBA samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<u8>,
    source_grayscale: bool,
}

impl PixelGrid {
    /// Build a grid from a decoded image, converting to RGB or RGBA as needed.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let color = image.color();
        let source_grayscale = matches!(
            color,
            ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16
        );
        if color.has_alpha() {
            Self::from_rgba(image.into_rgba8(), source_grayscale)
        } else {
            Self::from_rgb(image.into_rgb8(), source_grayscale)
        }
    }

    fn from_rgb(image: RgbImage, source_grayscale: bool) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            channels: 3,
            data: image.into_raw(),
            source_grayscale,
        }
    }

    fn from_rgba(image: RgbaImage, source_grayscale: bool) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            channels: 4,
            data: image.into_raw(),
            source_grayscale,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 3 for RGB, 4 for RGBA.
    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// Whether the decoded file was grayscale (with or without alpha).
    pub fn is_source_grayscale(&self) -> bool {
        self.source_grayscale
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Color and alpha of the pixel at a row-major index.
    pub fn pixel(&self, index: usize) -> (Color, u8) {
        let base = index * self.channels;
        let px = &self.data[base..base + self.channels];
        let alpha = if self.has_alpha() { px[3] } else { u8::MAX };
        (Color::new(px[0], px[1], px[2]), alpha)
    }

    /// Row-major iterator over `(color, alpha)`; alpha is 255 without an alpha channel.
    pub fn pixels(&self) -> impl Iterator<Item = (Color, u8)> + '_ {
        let has_alpha = self.has_alpha();
        self.data.chunks_exact(self.channels).map(move |px| {
            let alpha = if has_alpha { px[3] } else { u8::MAX };
            (Color::new(px[0], px[1], px[2]), alpha)
        })
    }
}

/// Decode an image file into a [`PixelGrid`].
pub fn load_pixels(path: impl AsRef<Path>) -> VectorizeResult<PixelGrid> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|source| VectorizeError::UnreadableImage {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(PixelGrid::from_dynamic(image))
}

/// Draw up to `max_samples` pixels uniformly without replacement.
///
/// Translucent pixels (alpha at or below [`SAMPLE_ALPHA_THRESHOLD`]) are
/// dropped from the drawn set, so fewer colors than `max_samples` may come back.
pub fn sample_pixels(grid: &PixelGrid, max_samples: usize, seed: u64) -> Vec<Color> {
    let total = grid.pixel_count();
    let indices: Vec<usize> = if total > max_samples {
        let mut rng = StdRng::seed_from_u64(seed);
        index::sample(&mut rng, total, max_samples).into_vec()
    } else {
        (0..total).collect()
    };

    indices
        .into_iter()
        .map(|i| grid.pixel(i))
        .filter(|(_, alpha)| *alpha > SAMPLE_ALPHA_THRESHOLD)
        .map(|(color, _)| color)
        .collect()
}

/// Up to `count` dominant colors, most common first.
///
/// Mostly transparent and near-white pixels are skipped, and every
/// `quality`-th remaining pixel is clustered.
pub fn dominant_palette(grid: &PixelGrid, count: usize, quality: usize) -> Vec<Color> {
    let eligible: Vec<Color> = grid
        .pixels()
        .step_by(quality.max(1))
        .filter(|(color, alpha)| {
            let near_white = color.r > PALETTE_WHITE_CUTOFF
                && color.g > PALETTE_WHITE_CUTOFF
                && color.b > PALETTE_WHITE_CUTOFF;
            *alpha >= PALETTE_MIN_ALPHA && !near_white
        })
        .map(|(color, _)| color)
        .collect();

    let params = KmeansParams {
        seed: PALETTE_SEED,
        ..Default::default()
    };
    let Some(clusters) = kmeans(&eligible, count, &params) else {
        return Vec::new();
    };

    let mut ranked: Vec<(Color, usize)> = clusters
        .centroids
        .into_iter()
        .zip(clusters.sizes)
        .collect();
    // stable: equal populations keep centroid order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().map(|(color, _)| color).collect()
}

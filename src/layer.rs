use image::{GrayImage, Luma};
use imageproc::contrast::{ThresholdType, threshold as ip_threshold};

use crate::color::{combine_opacity, composite_over_white};
use crate::sampler::PixelGrid;
use crate::svg::{escape_attr, parse_document};
use crate::VectorizeResult;

/// Highest posterization level; more bands than luma values add nothing.
pub const MAX_LEVEL: u32 = 256;

/// Smallest gap between the opacities of two neighbouring layers.
const OPACITY_STEP: f64 = 0.001;

/// One binary bitmap to trace, with the opacity its traced paths are drawn at.
///
/// Black pixels (0) are foreground, white pixels (255) are background.
#[derive(Debug, Clone)]
pub struct Layer {
    pub bitmap: GrayImage,
    pub opacity: f64,
}

impl Layer {
    /// Whether the bitmap has any foreground pixel at all.
    pub fn is_empty(&self) -> bool {
        self.bitmap.pixels().all(|px| px[0] != 0)
    }
}

/// Composite the grid over white and reduce it to luma.
pub fn luma_image(grid: &PixelGrid) -> GrayImage {
    let width = grid.width();
    GrayImage::from_fn(width, grid.height(), |x, y| {
        let (color, alpha) = grid.pixel((y * width + x) as usize);
        let visible = if alpha == u8::MAX {
            color
        } else {
            composite_over_white(color, alpha as f64 / 255.0)
        };
        Luma([visible.luma()])
    })
}

/// Split an image into the stacked layers of a posterization with `level` tones.
///
/// Level 1 yields a single opaque layer binarized at `threshold_percent`.
/// Higher levels yield `level - 1` nested layers, widest first, whose stacked
/// opacities reproduce each band's gray tone. Layers without foreground are
/// dropped. Levels above [`MAX_LEVEL`] are treated as [`MAX_LEVEL`].
pub fn posterize_layers(grid: &PixelGrid, level: u32, threshold_percent: u8) -> Vec<Layer> {
    let level = level.min(MAX_LEVEL);
    let gray = luma_image(grid);

    if level <= 1 {
        let cutoff = threshold_percent.min(100) as u32 * 255 / 100;
        if cutoff == 0 {
            return Vec::new();
        }
        let layer = Layer {
            bitmap: ip_threshold(&gray, (cutoff - 1) as u8, ThresholdType::Binary),
            opacity: 1.0,
        };
        return if layer.is_empty() { Vec::new() } else { vec![layer] };
    }

    let opacities = layer_opacities(level);
    (0..level - 1)
        .rev()
        .zip(opacities)
        .map(|(band, opacity)| Layer {
            bitmap: ip_threshold(&gray, band_cutoff(band, level), ThresholdType::Binary),
            opacity,
        })
        .filter(|layer| !layer.is_empty())
        .collect()
}

/// Highest luma that still belongs to `band` or a darker one.
fn band_cutoff(band: u32, level: u32) -> u8 {
    let upper = ((u64::from(band) + 1) * 256).div_ceil(u64::from(level));
    (upper - 1).min(255) as u8
}

/// Darkness in `[0, 1]` of the gray tone representing `band`.
fn band_darkness(band: u32, level: u32) -> f64 {
    let tone = band * (256 / level);
    1.0 - tone.min(255) as f64 / 255.0
}

/// Opacities of layers `level - 2` (widest) down to `0` (darkest).
///
/// Each layer gets the opacity that brings the stack under it to its band's
/// darkness, rounded to three decimals and kept strictly increasing until it
/// saturates at 1.
fn layer_opacities(level: u32) -> Vec<f64> {
    let mut opacities = Vec::with_capacity(level as usize - 1);
    let mut stacked = 0.0;
    for band in (0..level - 1).rev() {
        let target = band_darkness(band, level);
        let needed = if stacked >= 1.0 {
            1.0
        } else {
            1.0 - (1.0 - target) / (1.0 - stacked)
        };
        let mut opacity = round3(needed.clamp(0.0, 1.0));
        if let Some(&previous) = opacities.last() {
            if opacity <= previous {
                opacity = round3(previous + OPACITY_STEP).min(1.0);
            }
        }
        stacked = combine_opacity(stacked, opacity);
        opacities.push(opacity);
    }
    opacities
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// A traced `<path>` with the transforms of its ancestors folded in.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedPath {
    pub d: String,
    pub transform: Option<String>,
}

/// Collect every `<path>` from tracer output.
pub fn extract_paths(svg: &str) -> VectorizeResult<Vec<TracedPath>> {
    let doc = parse_document(svg)?;
    let paths = doc
        .descendants()
        .filter(|node| node.has_tag_name("path"))
        .filter_map(|node| {
            let d = node.attribute("d")?.trim();
            if d.is_empty() {
                return None;
            }
            let mut transforms: Vec<&str> = node
                .ancestors()
                .filter_map(|n| n.attribute("transform"))
                .collect();
            transforms.reverse();
            let transform = (!transforms.is_empty()).then(|| transforms.join(" "));
            Some(TracedPath {
                d: d.to_string(),
                transform,
            })
        })
        .collect();
    Ok(paths)
}

/// Stack traced layers, widest first, into one opacity-layered SVG document.
pub fn stack_layers(width: u32, height: u32, traced: &[(f64, String)]) -> VectorizeResult<String> {
    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\">\n"
    );
    for (opacity, svg) in traced {
        let paths = extract_paths(svg)?;
        if paths.is_empty() {
            continue;
        }
        out.push_str("<g fill=\"#000000\" stroke=\"none\">\n");
        for path in paths {
            out.push_str("<path d=\"");
            out.push_str(&escape_attr(&path.d));
            out.push('"');
            if let Some(transform) = &path.transform {
                out.push_str(" transform=\"");
                out.push_str(&escape_attr(transform));
                out.push('"');
            }
            out.push_str(&format!(" fill-opacity=\"{opacity:.3}\"/>\n"));
        }
        out.push_str("</g>\n");
    }
    out.push_str("</svg>\n");
    Ok(out)
}

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::cluster::{KmeansParams, kmeans};
use crate::color::{Color, hex_to_rgb};
use crate::config::RemapOptions;
use crate::sampler::{PixelGrid, sample_pixels};

static PAINT_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\s(?:fill|stroke)=")(#(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{3}))(")"#)
        .expect("valid regex")
});

/// Distinct fill and stroke colors in document order.
pub fn svg_colors(svg: &str) -> Vec<Color> {
    let mut colors: Vec<Color> = Vec::new();
    for caps in PAINT_COLOR_RE.captures_iter(svg) {
        if let Ok(color) = hex_to_rgb(&caps[2]) {
            if !colors.contains(&color) {
                colors.push(color);
            }
        }
    }
    colors
}

/// Nearest color by RGB distance; the first of equally near candidates wins.
pub fn nearest_color(color: Color, candidates: &[Color]) -> Option<Color> {
    let mut best: Option<(Color, f64)> = None;
    for &candidate in candidates {
        let distance = color.distance(candidate);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Rewrite fill and stroke colors through `mapping` in a single pass.
///
/// Colors missing from `mapping` are left as written.
pub fn rewrite_colors(svg: &str, mapping: &HashMap<Color, Color>) -> String {
    PAINT_COLOR_RE
        .replace_all(svg, |caps: &Captures| {
            match hex_to_rgb(&caps[2]).ok().and_then(|c| mapping.get(&c)) {
                Some(target) => format!("{}{target}{}", &caps[1], &caps[3]),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Map every traced color onto the nearest of the source image's clustered colors.
///
/// Grayscale sources and images without opaque pixels are returned unchanged.
pub fn replace_colors(svg: &str, grid: &PixelGrid, options: &RemapOptions) -> String {
    if grid.is_source_grayscale() {
        debug!("grayscale source, keeping traced colors");
        return svg.to_string();
    }

    let traced = svg_colors(svg);
    if traced.is_empty() {
        return svg.to_string();
    }

    let sample = sample_pixels(grid, options.sample_size, options.seed);
    let k = traced.len().min(options.max_clusters);
    let Some(clusters) = kmeans(&sample, k, &KmeansParams::from(options)) else {
        debug!("no opaque pixels to sample, keeping traced colors");
        return svg.to_string();
    };

    let mapping: HashMap<Color, Color> = traced
        .iter()
        .filter_map(|&color| Some((color, nearest_color(color, &clusters.centroids)?)))
        .collect();
    debug!(
        traced = traced.len(),
        centroids = clusters.centroids.len(),
        "remapping traced colors"
    );
    rewrite_colors(svg, &mapping)
}

/// Recolor a single-color trace: black fills and strokes become `color`.
pub fn replace_black(svg: &str, color: Color) -> String {
    let mapping = HashMap::from([(Color::BLACK, color)]);
    rewrite_colors(svg, &mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    const RED: Color = Color::new(255, 0, 0);
    const BLUE: Color = Color::new(0, 0, 255);

    fn two_tone_grid() -> PixelGrid {
        let image = RgbImage::from_fn(20, 20, |x, _| {
            if x < 10 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) }
        });
        PixelGrid::from_dynamic(DynamicImage::ImageRgb8(image))
    }

    const TRACED: &str = r##"<svg><g fill="#000000" stroke="none"><path d="M1 1" fill="#b2b2b2" stroke-width="1" stroke="#B2B2B2"/><path d="M2 2" fill="#333"/></g></svg>"##;

    mod svg_colors {
        use super::*;

        #[test]
        fn distinct_in_document_order() {
            assert_eq!(
                svg_colors(TRACED),
                vec![Color::BLACK, Color::new(0xb2, 0xb2, 0xb2), Color::new(0x33, 0x33, 0x33)]
            );
        }

        #[test]
        fn ignores_non_paint_text() {
            let svg = r##"<svg><path id="#abcdef" d="M1 1" fill="#010203"/></svg>"##;
            assert_eq!(svg_colors(svg), vec![Color::new(1, 2, 3)]);
        }
    }

    mod nearest_color {
        use super::*;

        #[test]
        fn picks_closest() {
            let near = nearest_color(Color::new(250, 10, 10), &[BLUE, RED]);
            assert_eq!(near, Some(RED));
        }

        #[test]
        fn ties_go_to_first() {
            let gray = Color::new(128, 128, 128);
            let a = Color::new(118, 128, 128);
            let b = Color::new(138, 128, 128);
            assert_eq!(nearest_color(gray, &[a, b]), Some(a));
            assert_eq!(nearest_color(gray, &[b, a]), Some(b));
        }

        #[test]
        fn no_candidates() {
            assert_eq!(nearest_color(RED, &[]), None);
        }
    }

    mod replace_colors {
        use super::*;

        #[test]
        fn dark_and_light_map_to_source_colors() {
            // blue has the lower luma, so darker traced grays sit closer to it in RGB
            let svg = r##"<svg><path d="M1 1" fill="#202020"/><path d="M2 2" fill="#e0e0e0"/></svg>"##;
            let out = replace_colors(svg, &two_tone_grid(), &RemapOptions::default());
            let colors = svg_colors(&out);
            assert!(colors.iter().all(|c| *c == RED || *c == BLUE), "{out}");
        }

        #[test]
        fn grayscale_source_passthrough() {
            let gray = GrayImage::from_pixel(4, 4, Luma([40]));
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("gray.png");
            gray.save(&path).unwrap();
            let grid = crate::sampler::load_pixels(&path).unwrap();

            assert_eq!(replace_colors(TRACED, &grid, &RemapOptions::default()), TRACED);
        }

        #[test]
        fn fully_transparent_source_passthrough() {
            let image = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 0]));
            let grid = PixelGrid::from_dynamic(DynamicImage::ImageRgba8(image));
            assert_eq!(replace_colors(TRACED, &grid, &RemapOptions::default()), TRACED);
        }

        #[test]
        fn replaced_colors_are_not_replaced_again() {
            let mapping = HashMap::from([(RED, BLUE), (BLUE, RED)]);
            let svg = r##"<path fill="#ff0000" stroke="#0000ff"/>"##;
            assert_eq!(
                rewrite_colors(svg, &mapping),
                r##"<path fill="#0000ff" stroke="#ff0000"/>"##
            );
        }
    }

    mod replace_black {
        use super::*;

        #[test]
        fn black_paint_takes_color() {
            let svg = r##"<g fill="#000000" stroke="none"><path d="M0 0" fill="#000"/></g>"##;
            assert_eq!(
                replace_black(svg, Color::new(0x12, 0x34, 0x56)),
                r##"<g fill="#123456" stroke="none"><path d="M0 0" fill="#123456"/></g>"##
            );
        }
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// every paint color after remapping is one of the cluster centers
            #[test]
            fn output_colors_within_centroids(
                grays in proptest::collection::vec(any::<u8>(), 1..6),
                seed in 0u64..1000
            ) {
                let body: String = grays
                    .iter()
                    .map(|g| format!(r##"<path d="M0 0" fill="#{g:02x}{g:02x}{g:02x}"/>"##))
                    .collect();
                let svg = format!("<svg>{body}</svg>");
                let grid = two_tone_grid();
                let options = RemapOptions { seed, ..Default::default() };

                let out = replace_colors(&svg, &grid, &options);

                let sample = sample_pixels(&grid, options.sample_size, options.seed);
                let k = svg_colors(&svg).len().min(options.max_clusters);
                let clusters = kmeans(&sample, k, &KmeansParams::from(&options)).unwrap();
                for color in svg_colors(&out) {
                    prop_assert!(clusters.centroids.contains(&color));
                }
            }
        }
    }
}

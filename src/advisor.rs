use serde::Serialize;

use crate::color::{Color, HslComponents};

/// A dominant color lighter than this is treated as the image background.
const BACKGROUND_LIGHTNESS: f32 = 0.80;
/// A last palette entry darker than this marks a black-and-white image.
const BLACK_LIGHTNESS: f32 = 0.05;
/// Summed adjacent hue deltas (degrees) below this count as a single hue.
const MONOCHROME_HUE_DELTA: f32 = 5.0;
/// Summed adjacent lightness deltas below this count as a single tone.
const MONOCHROME_LIGHTNESS_DELTA: f32 = 0.2;
const MAX_LEVEL: usize = 4;

/// A posterization level together with the colors to seed it with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VectorizationOption {
    pub level: u32,
    pub colors: Vec<Color>,
}

impl VectorizationOption {
    /// A single-color trace filled with `color`.
    pub fn monochrome(color: Color) -> Self {
        Self {
            level: 1,
            colors: vec![color],
        }
    }
}

/// Propose vectorization options from a dominance-ordered palette.
///
/// Options come back in increasing level order.
pub fn advise(palette: &[Color]) -> Vec<VectorizationOption> {
    let mut colors: Vec<Color> = palette.to_vec();
    let mut hsl: Vec<HslComponents> = colors.iter().map(|c| c.to_hsl()).collect();

    if hsl.first().is_some_and(|first| first.lightness > BACKGROUND_LIGHTNESS) && hsl.len() > 1 {
        colors.remove(0);
        hsl.remove(0);
    }

    let Some(last) = hsl.last() else {
        return vec![VectorizationOption::monochrome(Color::BLACK)];
    };

    let black_and_white = last.lightness < BLACK_LIGHTNESS || last.saturation == 0.0;
    if black_and_white {
        return vec![VectorizationOption::monochrome(Color::BLACK)];
    }

    let (hue_delta, lightness_delta) = hsl.windows(2).fold((0.0f32, 0.0f32), |(h, l), pair| {
        (
            h + (pair[0].hue - pair[1].hue).abs(),
            l + (pair[0].lightness - pair[1].lightness).abs(),
        )
    });

    if hue_delta < MONOCHROME_HUE_DELTA && lightness_delta < MONOCHROME_LIGHTNESS_DELTA {
        let tint = colors[colors.len() - 1];
        return vec![VectorizationOption::monochrome(tint)];
    }

    (1..=colors.len().min(MAX_LEVEL))
        .map(|level| VectorizationOption {
            level: level as u32,
            colors: colors[..level].to_vec(),
        })
        .collect()
}

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::color::{Color, combine_opacity, composite_over_white};

static BLACK_FILL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s+fill="black""#).expect("valid regex"));
static OPACITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\s)fill-opacity="([0-9.]+)""#).expect("valid regex"));
static STROKE_NONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s+stroke="none""#).expect("valid regex"));
static PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<path\b[^>]*?(?:/>|>\s*</path>)"#).expect("valid regex")
});
static PATH_DATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\sd="([^"]*)""#).expect("valid regex"));
static CANVAS_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[Mm]\s*0\s+([0-9]+(?:\.[0-9]+)?)\s*[lL]([-0-9.\s]*)").expect("valid regex")
});
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?[0-9]+(?:\.[0-9]+)?").expect("valid regex"));
static GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<g\b([^>]*?)(/?)>"#).expect("valid regex"));
static PAINT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s+(?:fill|fill-opacity|stroke|stroke-width)="[^"]*""#).expect("valid regex")
});

/// Path units per pixel a canvas rectangle may be written in: plain pixels,
/// or potrace's tenths of a pixel under its `scale(0.1)` transform.
const CANVAS_UNIT_SCALES: [f64; 2] = [1.0, 10.0];

/// Distinct opacities, densest first, each paired with its rendered opacity.
///
/// A layer at opacity `p` is drawn over every layer that is equally or less
/// opaque, so its rendered opacity is `p` combined with all of those.
pub fn true_opacities(values: &[f64]) -> Vec<(f64, f64)> {
    let mut distinct: Vec<f64> = values.to_vec();
    distinct.sort_by(|a, b| b.total_cmp(a));
    distinct.dedup();

    (0..distinct.len())
        .map(|i| {
            let stacked = distinct[i + 1..]
                .iter()
                .fold(distinct[i], |acc, &lighter| combine_opacity(acc, lighter));
            (distinct[i], stacked)
        })
        .collect()
}

/// Replace opacity-layered black shapes with solid gray fills.
///
/// With `stroke`, every shape also gets a one-unit stroke in its fill color
/// so neighbouring shapes close their anti-aliasing seams. Background
/// rectangles spanning the whole `width` x `height` canvas are dropped and
/// every group is forced to an opaque black fill without stroke.
pub fn resolve_solid(svg: &str, stroke: bool, width: u32, height: u32) -> String {
    let svg = BLACK_FILL_RE.replace_all(svg, "");

    let values: Vec<f64> = OPACITY_RE
        .captures_iter(&svg)
        .filter_map(|caps| caps[2].parse().ok())
        .collect();
    if values.is_empty() {
        return svg.into_owned();
    }

    let solids: Vec<(f64, Color)> = true_opacities(&values)
        .into_iter()
        .map(|(value, opacity)| (value, composite_over_white(Color::BLACK, opacity)))
        .collect();
    debug!(layers = solids.len(), "resolved layer opacities");

    let mut svg = OPACITY_RE
        .replace_all(&svg, |caps: &Captures| {
            let solid = caps[2]
                .parse::<f64>()
                .ok()
                .and_then(|value| solids.iter().find(|(v, _)| *v == value));
            match solid {
                Some((_, color)) if stroke => format!(
                    "{}fill=\"{color}\" stroke-width=\"1\" stroke=\"{color}\"",
                    &caps[1]
                ),
                Some((_, color)) => format!("{}fill=\"{color}\"", &caps[1]),
                None => caps[0].to_string(),
            }
        })
        .into_owned();

    if stroke {
        svg = STROKE_NONE_RE.replace_all(&svg, "").into_owned();
    }

    let (svg, removed) = remove_canvas_artifacts(&svg, width, height);
    if removed > 0 {
        warn!(removed, "removed paths spanning the whole canvas");
    }

    force_group_paint(&svg)
}

/// Drop `<path>` elements whose data is the tracer's full-canvas rectangle,
/// `M0 <h> l0 -<h> <w> 0 ...` with `h` and `w` matching the canvas.
/// Returns the rewritten document and the removal count.
pub fn remove_canvas_artifacts(svg: &str, width: u32, height: u32) -> (String, usize) {
    let mut removed = 0;
    let out = PATH_RE.replace_all(svg, |caps: &Captures| {
        let element = &caps[0];
        if PATH_DATA_RE
            .captures(element)
            .is_some_and(|data| is_canvas_rectangle(&data[1], width, height))
        {
            removed += 1;
            String::new()
        } else {
            element.to_string()
        }
    });
    (out.into_owned(), removed)
}

/// Whether `d` starts at the bottom-left corner, climbs the full canvas
/// height and then runs the full canvas width. Potrace may split either edge
/// into several segments.
fn is_canvas_rectangle(d: &str, width: u32, height: u32) -> bool {
    let Some(caps) = CANVAS_PATH_RE.captures(d) else {
        return false;
    };
    let Ok(start) = caps[1].parse::<f64>() else {
        return false;
    };
    let numbers: Vec<f64> = NUMBER_RE
        .find_iter(&caps[2])
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    let mut segments = numbers.chunks_exact(2).map(|pair| (pair[0], pair[1])).peekable();

    let mut rise = 0.0;
    while let Some((_, dy)) = segments.next_if(|&(dx, dy)| dx == 0.0 && dy < 0.0) {
        rise -= dy;
    }
    let mut run = 0.0;
    while let Some((dx, _)) = segments.next_if(|&(dx, dy)| dy == 0.0 && dx > 0.0) {
        run += dx;
    }

    let same = |a: f64, b: f64| (a - b).abs() < 1e-6;
    rise > 0.0
        && same(rise, start)
        && CANVAS_UNIT_SCALES.iter().any(|&scale| {
            same(rise, f64::from(height) * scale) && same(run, f64::from(width) * scale)
        })
}

fn force_group_paint(svg: &str) -> String {
    GROUP_RE
        .replace_all(svg, |caps: &Captures| {
            let attrs = PAINT_ATTR_RE.replace_all(&caps[1], "");
            format!("<g{attrs} fill=\"#000000\" stroke=\"none\"{}>", &caps[2])
        })
        .into_owned()
}

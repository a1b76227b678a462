use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::svg::{canvas_size, format_length, parse_document};
use crate::{VectorizeError, VectorizeResult};

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static BETWEEN_TAGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("valid regex"));
static SIZED_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<svg xmlns="http://www\.w3\.org/2000/svg" width="(\d+)" height="(\d+)">"#)
        .expect("valid regex")
});
static SVG_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<svg\b[^>]*?(/?)>").expect("valid regex"));

/// Collapse whitespace runs and drop whitespace between tags.
pub fn compact(svg: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(svg, " ");
    BETWEEN_TAGS_RE
        .replace_all(&collapsed, "><")
        .trim()
        .to_string()
}

/// Swap the fixed `width`/`height` of a stacked document for a `viewBox`.
///
/// Documents with any other root header are returned unchanged.
pub fn to_view_box(svg: &str) -> String {
    SIZED_HEADER_RE
        .replace(svg, |caps: &Captures| {
            format!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
                &caps[1], &caps[2]
            )
        })
        .into_owned()
}

/// Put a white rectangle covering the canvas behind everything else.
pub fn add_background(svg: &str) -> VectorizeResult<String> {
    let doc = parse_document(svg)?;
    let (width, height) = canvas_size(&doc)
        .ok_or_else(|| VectorizeError::MalformedSvg("svg root has no dimensions".to_string()))?;
    let rect = format!(
        r##"<rect x="0" y="0" width="{}" height="{}" fill="#ffffff"/>"##,
        format_length(width),
        format_length(height)
    );

    let start = SVG_START_RE
        .captures(svg)
        .ok_or_else(|| VectorizeError::MalformedSvg("missing <svg> start tag".to_string()))?;
    let tag = start.get(0).map_or(0..0, |whole| whole.range());
    let self_closing = !start[1].is_empty();

    let mut out = String::with_capacity(svg.len() + rect.len() + 8);
    if self_closing {
        let open = &svg[tag.start..tag.end - 2];
        out.push_str(&svg[..tag.start]);
        out.push_str(open.trim_end());
        out.push('>');
        out.push_str(&rect);
        out.push_str("</svg>");
    } else {
        out.push_str(&svg[..tag.end]);
        out.push_str(&rect);
    }
    out.push_str(&svg[tag.end..]);
    Ok(out)
}

/// Compact the document, switch it to a `viewBox` and add the white background.
pub fn finalize(svg: &str) -> VectorizeResult<String> {
    add_background(&to_view_box(&compact(svg)))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod compact {
        use super::*;

        mod unit {
            use super::*;

            #[test]
            fn strips_layout_whitespace() {
                let svg = "  <svg>\n  <g>\n\t<path d=\"M0  0\n L1 1\"/>\n</g>\n</svg>\n";
                assert_eq!(compact(svg), "<svg><g><path d=\"M0 0 L1 1\"/></g></svg>");
            }
        }

        mod prop {
            use super::*;
            use proptest::prelude::*;

            proptest! {
                #[test]
                fn idempotent(svg in r#"[<>a-z0-9 \t\n="/]{0,80}"#) {
                    let once = compact(&svg);
                    prop_assert_eq!(compact(&once), once);
                }
            }
        }
    }

    mod to_view_box {
        use super::*;

        #[test]
        fn rewrites_sized_header() {
            let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="80"><g/></svg>"#;
            assert_eq!(
                to_view_box(svg),
                r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 80"><g/></svg>"#
            );
        }

        #[test]
        fn other_headers_unchanged() {
            let svg = r#"<svg version="1.0" xmlns="http://www.w3.org/2000/svg" width="10pt" height="10pt"></svg>"#;
            assert_eq!(to_view_box(svg), svg);
        }
    }

    mod add_background {
        use super::*;

        #[test]
        fn rect_is_first_child() {
            let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 80"><g/></svg>"#;
            assert_eq!(
                add_background(svg).unwrap(),
                r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 80"><rect x="0" y="0" width="100" height="80" fill="#ffffff"/><g/></svg>"##
            );
        }

        #[test]
        fn uses_width_and_height() {
            let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="12.5pt" height="4"></svg>"#;
            let out = add_background(svg).unwrap();
            assert!(out.contains(r##"width="12.5" height="4" fill="#ffffff""##));
        }

        #[test]
        fn self_closing_root_gains_children() {
            let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 3 3"/>"#;
            assert_eq!(
                add_background(svg).unwrap(),
                r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 3 3"><rect x="0" y="0" width="3" height="3" fill="#ffffff"/></svg>"##
            );
        }

        #[test]
        fn without_dimensions_is_malformed() {
            let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><g/></svg>"#;
            assert!(matches!(add_background(svg), Err(VectorizeError::MalformedSvg(_))));
        }
    }

    mod finalize {
        use super::*;

        #[test]
        fn compact_view_box_and_background() {
            let svg = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"4\" height=\"2\">\n<g fill=\"#000000\" stroke=\"none\">\n<path d=\"M0 0\" fill=\"#ff0000\"/>\n</g>\n</svg>\n";
            assert_eq!(
                finalize(svg).unwrap(),
                r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 4 2"><rect x="0" y="0" width="4" height="2" fill="#ffffff"/><g fill="#000000" stroke="none"><path d="M0 0" fill="#ff0000"/></g></svg>"##
            );
        }
    }
}

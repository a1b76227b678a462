use roxmltree::{Document, ParsingOptions};

use crate::{VectorizeError, VectorizeResult};

/// Parse SVG text, accepting the DOCTYPE that potrace writes.
pub(crate) fn parse_document(svg: &str) -> VectorizeResult<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(svg, options).map_err(|err| VectorizeError::MalformedSvg(err.to_string()))
}

/// Canvas size of the root `<svg>`, from `width`/`height` or else from `viewBox`.
///
/// Unit suffixes such as `pt` or `px` are ignored.
pub(crate) fn canvas_size(doc: &Document<'_>) -> Option<(f64, f64)> {
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return None;
    }

    let width = root.attribute("width").and_then(parse_length);
    let height = root.attribute("height").and_then(parse_length);
    if let (Some(w), Some(h)) = (width, height) {
        return Some((w, h));
    }

    let view_box: Vec<f64> = root
        .attribute("viewBox")?
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match view_box.as_slice() {
        &[_, _, w, h] => Some((w, h)),
        _ => None,
    }
}

fn parse_length(value: &str) -> Option<f64> {
    let number = value.trim().trim_end_matches(|c: char| c.is_ascii_alphabetic());
    number.parse().ok()
}

/// Format a dimension without a trailing `.0` for whole numbers.
pub(crate) fn format_length(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Escape text for use inside a double-quoted attribute value.
pub(crate) fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const POTRACE_HEADER: &str = r#"<?xml version="1.0" standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 20010904//EN"
 "http://www.w3.org/TR/2001/REC-SVG-20010904/DTD/svg10.dtd">
<svg version="1.0" xmlns="http://www.w3.org/2000/svg"
 width="40.000000pt" height="30.000000pt" viewBox="0 0 40.000000 30.000000"
 preserveAspectRatio="xMidYMid meet">
</svg>"#;

    #[test]
    fn parses_potrace_doctype() {
        let doc = parse_document(POTRACE_HEADER).unwrap();
        assert_eq!(canvas_size(&doc), Some((40.0, 30.0)));
    }

    #[test]
    fn falls_back_to_view_box() {
        let doc = parse_document(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 12 7"/>"#)
            .unwrap();
        assert_eq!(canvas_size(&doc), Some((12.0, 7.0)));
    }

    #[test]
    fn no_dimensions() {
        let doc = parse_document(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).unwrap();
        assert_eq!(canvas_size(&doc), None);
    }

    #[test]
    fn broken_markup_is_malformed() {
        let err = parse_document("<svg><g></svg>").unwrap_err();
        assert!(matches!(err, VectorizeError::MalformedSvg(_)));
    }

    #[test]
    fn whole_lengths_have_no_fraction() {
        assert_eq!(format_length(40.0), "40");
        assert_eq!(format_length(12.5), "12.5");
    }
}

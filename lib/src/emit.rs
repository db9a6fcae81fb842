use std::fmt::{self, Write};

use htmlize::{escape_attribute, escape_text};
use log::debug;
use roxmltree::Document;

use crate::{Label, LabelConfig, LabelError};

/// Formats a coordinate with at most `precision` decimals, without trailing zeros
pub fn format_coordinate(value: f64, precision: usize) -> String {
    let mut formatted = format!("{value:.precision$}");
    if formatted.contains('.') {
        formatted.truncate(formatted.trim_end_matches('0').trim_end_matches('.').len());
    }
    if formatted == "-0" {
        formatted.remove(0);
    }
    formatted
}

/// Text content of a label: the region name, followed by its count if enabled
pub fn label_text(label: &Label, config: &LabelConfig) -> String {
    match label.count.filter(|_| config.show_counts) {
        Some(count) if label.name.is_empty() => count.to_string(),
        Some(count) => format!("{}{}{}", label.name, config.count_separator, count),
        None => label.name.clone(),
    }
}

pub fn write_text_element<W: Write>(
    label: &Label,
    config: &LabelConfig,
    out: &mut W,
) -> fmt::Result {
    write!(
        out,
        r#"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="central" class="{}""#,
        format_coordinate(label.anchor.x, config.precision),
        format_coordinate(label.anchor.y, config.precision),
        escape_attribute(config.class.as_str()),
    )?;
    if let Some(font_size) = config.font_size {
        write!(out, r#" font-size="{font_size}""#)?;
    }
    if let Some(id) = &label.id {
        write!(out, r#" data-region="{}""#, escape_attribute(id.as_str()))?;
    }
    write!(
        out,
        ">{}</text>",
        escape_text(label_text(label, config).as_str())
    )
}

/// Writes a `<g>` holding one `<text>` per label, one element per line
pub fn write_label_group<W: Write>(
    labels: &[Label],
    config: &LabelConfig,
    out: &mut W,
) -> fmt::Result {
    writeln!(
        out,
        r#"  <g class="{}s">"#,
        escape_attribute(config.class.as_str())
    )?;
    for label in labels {
        out.write_str("    ")?;
        write_text_element(label, config, out)?;
        out.write_char('\n')?;
    }
    writeln!(out, "  </g>")
}

/// A standalone overlay document, for labels that did not come from an SVG map
pub fn overlay_document(labels: &[Label], config: &LabelConfig) -> String {
    let mut out = String::from("<svg xmlns=\"http://www.w3.org/2000/svg\">\n");
    write_label_group(labels, config, &mut out).expect("writing to a String cannot fail");
    out.push_str("</svg>\n");
    out
}

/// Inserts a label group as the last child of the map's root `<svg>` element.
///
/// The rest of the source is copied through untouched.
pub fn splice_labels(
    source: &str,
    labels: &[Label],
    config: &LabelConfig,
) -> Result<String, LabelError> {
    let doc = Document::parse(source)?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(LabelError::NotSvg(root.tag_name().name().to_owned()));
    }

    let mut group = String::from("\n");
    write_label_group(labels, config, &mut group).expect("writing to a String cannot fail");

    let range = root.range();
    let element = &source[range.clone()];
    let mut spliced = String::with_capacity(source.len() + group.len() + 8);
    match element.rfind("</") {
        Some(closing) => {
            let at = range.start + closing;
            let before = source[..at].trim_end_matches([' ', '\t']);
            // Reuse the line break in front of the closing tag, if there is one
            spliced.push_str(before.strip_suffix('\n').unwrap_or(before));
            spliced.push_str(&group);
            spliced.push_str(&source[at..]);
        }
        None => {
            // <svg .../> has nowhere to put children, so open it up
            let qualified_name = element[1..]
                .split(|c: char| c.is_whitespace() || c == '/' || c == '>')
                .next()
                .unwrap_or("svg");
            let self_closing = element.trim_end_matches('>').trim_end_matches('/');
            spliced.push_str(&source[..range.start]);
            spliced.push_str(self_closing.trim_end());
            spliced.push('>');
            spliced.push_str(&group);
            write!(spliced, "</{qualified_name}>").expect("writing to a String cannot fail");
            spliced.push_str(&source[range.end..]);
        }
    }
    debug!("Spliced {} labels into the document", labels.len());
    Ok(spliced)
}

/// Anchors as a JSON array, with coordinates rounded to the configured precision
pub fn labels_to_json(labels: &[Label], config: &LabelConfig) -> serde_json::Value {
    let round = |value: f64| {
        let scale = 10f64.powi(config.precision.min(15) as i32);
        (value * scale).round() / scale + 0.
    };
    labels
        .iter()
        .map(|label| {
            serde_json::json!({
                "id": label.id,
                "name": label.name,
                "count": label.count,
                "text": label_text(label, config),
                "x": round(label.anchor.x),
                "y": round(label.anchor.y),
            })
        })
        .collect()
}

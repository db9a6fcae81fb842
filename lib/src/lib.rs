/// Estimates where a path's label should go from the positions its commands visit
mod anchor;
/// Finds the regions of an SVG map and turns them into labels
mod converter;
/// Renders labels as SVG text or JSON
mod emit;
mod error;
/// Lenient tokenizer for SVG path data
pub mod path;
/// Cursor over path commands, based on [Turtle graphics](https://en.wikipedia.org/wiki/Turtle_graphics)
mod turtle;

pub use anchor::{
    apply_command, apply_segment, bounding_box, estimate, label_anchor, strict_estimate,
    strict_label_anchor, Estimate,
};
#[cfg(feature = "serde")]
pub use converter::regions_from_json;
pub use converter::{
    label_document, label_regions, label_regions_strict, regions_from_document, Counts, Label,
    LabelConfig, Region,
};
pub use emit::{
    format_coordinate, label_text, labels_to_json, overlay_document, splice_labels,
    write_label_group, write_text_element,
};
pub use error::LabelError;
pub use lyon_geom::{Box2D, Point};
pub use turtle::{BoundsTurtle, Cursor, Turtle};

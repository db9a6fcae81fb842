use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("could not parse SVG document: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("expected an <svg> root element, found <{0}>")]
    NotSvg(String),
    #[error("invalid path data in region {region}: {source}")]
    Path {
        region: String,
        source: svgtypes::Error,
    },
    #[error("could not read region data: {0}")]
    Json(#[from] serde_json::Error),
}

use crate::types::{BoundingBox, NodeId, WayId};

use thiserror::Error;

/// Every failure the render pipeline can produce.
///
/// None of these are recoverable for the map being rendered: the pipeline stops at the first
/// one and nothing is written.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed input at byte {position}: {reason}")]
    MalformedInput { position: u64, reason: String },

    #[error("<{element}> element is missing its '{attribute}' attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("node {node} has an invalid '{attribute}' value: {value:?}")]
    InvalidCoordinate {
        node: NodeId,
        attribute: &'static str,
        value: String,
    },

    #[error("cannot compute the bounds of a map without nodes")]
    EmptyGraph,

    #[error("cannot project onto degenerate bounds {0}")]
    DegenerateBounds(BoundingBox),

    #[error("way {way} references node {node}, which does not exist")]
    DanglingReference { way: WayId, node: NodeId },

    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvasSize { width: u32, height: u32 },

    #[error("failed to draw label {label:?}: {reason}")]
    Label { label: String, reason: String },

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error was caused by the map data rather than by the environment.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Error::Encode(_) | Error::Io(_) | Error::Label { .. })
    }
}

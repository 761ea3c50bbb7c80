use thiserror::Error;

/// Errors raised by the annotation core.
///
/// None of these are fatal: a failed load leaves the canvas cleared, an unknown
/// shape leaves the scene untouched, and the UI reports the message inline.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The image bytes could not be retrieved
    #[error("failed to fetch image from {url}: {reason}")]
    ImageFetch { url: String, reason: String },

    /// The bytes were retrieved but are not a decodable image
    #[error("failed to decode image from {url}: {source}")]
    ImageDecode {
        url: String,
        #[source]
        source: image::ImageError,
    },

    /// A toolbar asked for a shape this editor does not know
    #[error("unknown shape kind: {0:?}")]
    InvalidShapeKind(String),

    /// Encoding the flattened raster failed
    #[error("failed to encode export: {0}")]
    Export(#[from] image::ImageError),

    /// The surface was used after teardown
    #[error("canvas surface has been torn down")]
    SurfaceTornDown,
}

pub type EditorResult<T> = Result<T, EditorError>;

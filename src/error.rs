use thiserror::Error;

/// Everything that can go wrong while building or rendering a scene.
///
/// The first three variants come from the linear algebra kernel. The rest
/// belong to scene setup and to the pixel-dispatch scheduler.
#[derive(Debug, Error)]
pub enum TracerError {
    #[error("matrix is not invertible (determinant is approximately zero)")]
    NotInvertible,

    #[error("cannot normalize a zero-length vector")]
    DegenerateVector,

    #[error("operation requires vectors (w = 0), got a point")]
    InvalidOperand,

    #[error("invalid camera: {0}")]
    InvalidCamera(String),

    #[error("world has no light sources")]
    NoLights,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("pixel worker {id} is no longer running")]
    WorkerGone { id: usize },

    #[error("worker pool disconnected after {received} of {expected} pixels")]
    WorkerDisconnected { received: usize, expected: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),
}

pub type Result<T> = std::result::Result<T, TracerError>;

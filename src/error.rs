use crate::grid::Position;
use thiserror::Error;

/// Errors raised by grid mutation and search setup.
///
/// Every check happens before anything is mutated or any search state is
/// allocated, so an `Err` always leaves the grid exactly as it was.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GridError {
    /// Start or end is missing, identical to the other, or a barrier.
    #[error("invalid endpoints: {reason}")]
    InvalidEndpoints { reason: String },

    /// A position outside `[0, size) x [0, size)`.
    #[error("position {position} is outside the {size}x{size} grid")]
    OutOfBounds { position: Position, size: usize },

    /// Passability changed since the last neighbor refresh.
    #[error("neighbor caches are stale; refresh the grid before searching")]
    StaleNeighbors,

    #[error("grid size must be at least 1")]
    EmptyGrid,

    #[error("grid size {size} is too large")]
    TooLarge { size: usize },

    /// A text layout could not be parsed.
    #[error("layout line {line}: {reason}")]
    Layout { line: usize, reason: String },

    #[error("cannot parse position from {0:?}, expected \"row,col\"")]
    ParsePosition(String),
}

impl GridError {
    pub(crate) fn endpoints(reason: impl Into<String>) -> Self {
        GridError::InvalidEndpoints {
            reason: reason.into(),
        }
    }
}

/// Errors from setting up and running a search from the command line.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("cannot read map {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Grid(#[from] GridError),
}

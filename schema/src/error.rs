use thiserror::Error;

/// Every failure here ends the decode session. There is no per-node recovery.
#[derive(Debug, Error)]
pub enum NbtError {
    #[error("Unexpected end of stream: needed {needed} bytes, {available} available")]
    UnexpectedEndOfStream {
        needed:    usize,
        available: usize,
    },

    #[error("Read of {requested} bytes exceeds the window capacity of {capacity} bytes")]
    RequestExceedsCapacity {
        requested: usize,
        capacity:  usize,
    },

    #[error("Unknown tag kind {0} (0x{0:02x})")]
    UnknownTagKind(u8),

    #[error("Source read failure: {0}")]
    SourceReadFailure(#[source] std::io::Error),

    #[error("Tags nested deeper than {0} levels")]
    DepthLimitExceeded(usize),

    #[error("Output error: {0}")]
    Output(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NbtError>;

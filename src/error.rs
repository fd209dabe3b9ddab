use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure conditions surfaced by the sequence core and the on-disk finder.
#[derive(Debug, Error)]
pub enum Error {
    /// Text did not match the grammar of the thing being parsed.
    #[error("failed to parse {what} {input:?}")]
    Parse { what: &'static str, input: String },

    /// Range parameters violate validity (reversed bounds, bad step or
    /// interleave combination, frame number outside 32 bits).
    #[error("invalid frame range: {reason}")]
    InvalidRange { reason: &'static str },

    /// An operation required combine-compatible paddings and got none.
    #[error("mismatched padding")]
    PaddingMismatch,

    /// Index or frame query outside the set.
    #[error("{what} {value} out of range")]
    OutOfRange { what: &'static str, value: i64 },

    /// A setter argument violates its structural requirement.
    #[error("{0}")]
    InvalidField(&'static str),

    /// Merge invoked on sequences with differing prefix or suffix.
    #[error("cannot merge {left:?} with {right:?}: prefix or suffix does not match")]
    MergeMismatch { left: String, right: String },

    /// The directory walk behind sequence discovery failed.
    #[error("directory walk failed")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    pub(crate) fn parse(what: &'static str, input: &str) -> Self {
        Error::Parse {
            what,
            input: input.to_string(),
        }
    }

    pub(crate) fn index_out_of_range(index: i64) -> Self {
        Error::OutOfRange {
            what: "index",
            value: index,
        }
    }

    pub(crate) fn frame_out_of_range(frame: i32) -> Self {
        Error::OutOfRange {
            what: "frame",
            value: frame as i64,
        }
    }
}

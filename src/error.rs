/// Error type shared by the coordinate, parsing, assembly and rendering layers
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// Interval, point or child frame does not fit inside its coordinate space
    #[error("invalid range [{start}, {end}) for coordinate space of length {length}")]
    InvalidRange {
        start: i64,
        end: i64,
        length: usize,
    },

    /// Projection between two spaces whose parent chains never meet
    #[error("coordinate spaces have no common ancestor")]
    UnrelatedSpace,

    /// Malformed decode path or aligner report
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Matched decode segments and aligner domain blocks must pair up one to one
    #[error("{segments} matched segments but {blocks} aligner domain blocks")]
    BlockCountMismatch { segments: usize, blocks: usize },

    /// Unknown stream name, or a level the stream does not have
    #[error("invalid stream: {name}")]
    InvalidStream { name: String },
}

pub type Result<T> = std::result::Result<T, AlignError>;

impl AlignError {
    pub fn invalid_range(start: i64, end: i64, length: usize) -> Self {
        Self::InvalidRange { start, end, length }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn invalid_stream(name: impl Into<String>) -> Self {
        Self::InvalidStream { name: name.into() }
    }
}

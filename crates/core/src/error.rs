use std::io;
use std::path::PathBuf;

/// Everything that can end a single conversion attempt.
///
/// None of these are retried internally. A failed conversion never yields a
/// partial result.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no point cloud found at '{}' (tried .off and .ply)", base.display())]
    FileNotFound { base: PathBuf },

    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("header declares no '{0}' vertex property")]
    MissingPositionProperty(&'static str),

    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("vertex data truncated: expected {expected} records, stream ended after {decoded}")]
    TruncatedData { expected: u32, decoded: u32 },

    #[error("vertex {index} is malformed: {reason}")]
    InvalidVertex { index: u32, reason: String },

    #[error("capacity must be at least 1 point per group")]
    InvalidCapacity,

    #[error("scale must be finite, got {0}")]
    InvalidScale(f32),

    #[error("conversion cancelled after {decoded} records")]
    Cancelled { decoded: u32 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Payload-free discriminant of [`ParseError`], for hosts that only branch on
/// the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FileNotFound,
    MalformedHeader,
    MissingPositionProperty,
    UnsupportedEncoding,
    TruncatedData,
    InvalidVertex,
    InvalidCapacity,
    InvalidScale,
    Cancelled,
    Io,
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::FileNotFound { .. } => ErrorKind::FileNotFound,
            ParseError::MalformedHeader(_) => ErrorKind::MalformedHeader,
            ParseError::MissingPositionProperty(_) => ErrorKind::MissingPositionProperty,
            ParseError::UnsupportedEncoding(_) => ErrorKind::UnsupportedEncoding,
            ParseError::TruncatedData { .. } => ErrorKind::TruncatedData,
            ParseError::InvalidVertex { .. } => ErrorKind::InvalidVertex,
            ParseError::InvalidCapacity => ErrorKind::InvalidCapacity,
            ParseError::InvalidScale(_) => ErrorKind::InvalidScale,
            ParseError::Cancelled { .. } => ErrorKind::Cancelled,
            ParseError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

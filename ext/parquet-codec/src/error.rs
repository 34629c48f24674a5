use thiserror::Error;

/// Core error type for codec and schema operations
#[derive(Error, Debug)]
pub enum ParquetError {
    /// IO errors from the underlying reader or writer
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a declared value or sub-stream was complete
    #[error("Unexpected end of stream: {0}")]
    UnexpectedEof(String),

    /// Invalid length framing, e.g. a negative length prefix
    #[error("Framing error: {0}")]
    Framing(String),

    /// A value did not match the configured fixed length
    #[error("Length mismatch: the byte array should be {expected} bytes but is {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Stream contents are internally inconsistent
    #[error("Corrupt stream: {0}")]
    Corrupt(String),

    /// Schema-related errors
    #[error("Schema error: {0}")]
    Schema(String),

    /// A definition or repetition level does not fit in 16 bits
    #[error("Max {kind} level {level} is out of range")]
    LevelOverflow { kind: LevelKind, level: usize },

    /// Invalid argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unsupported operation errors
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Which of the two Dremel levels overflowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKind {
    Definition,
    Repetition,
}

impl std::fmt::Display for LevelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelKind::Definition => f.write_str("definition"),
            LevelKind::Repetition => f.write_str("repetition"),
        }
    }
}

/// Result type alias for codec and schema operations
pub type Result<T> = std::result::Result<T, ParquetError>;

impl ParquetError {
    /// Create a new unexpected end of stream error
    pub fn eof<S: Into<String>>(msg: S) -> Self {
        ParquetError::UnexpectedEof(msg.into())
    }

    /// Create a new framing error
    pub fn framing<S: Into<String>>(msg: S) -> Self {
        ParquetError::Framing(msg.into())
    }

    /// Create a new corruption error
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        ParquetError::Corrupt(msg.into())
    }

    /// Create a new schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        ParquetError::Schema(msg.into())
    }

    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        ParquetError::InvalidArgument(msg.into())
    }

    /// Create a new unsupported operation error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        ParquetError::Unsupported(msg.into())
    }
}

/// Extension trait that turns a short read into [`ParquetError::UnexpectedEof`]
pub trait EofContext<T> {
    /// Map `io::ErrorKind::UnexpectedEof` to an end-of-stream error with context
    fn eof_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T>;
}

impl<T> EofContext<T> for std::io::Result<T> {
    fn eof_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ParquetError::UnexpectedEof(f().into())
            } else {
                ParquetError::Io(e)
            }
        })
    }
}

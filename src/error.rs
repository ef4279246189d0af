use thiserror::Error;

/// Failure reported by a value codec.
///
/// [`CodecError::InsufficientBits`] is a distinguishable kind, not a detail:
/// the interpreter treats it as "buffer and wait for more input" while every
/// other kind is a genuine decode or encode failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The input did not contain enough bits to decode a whole value.
    #[error("insufficient bits: needed {needed}, available {available}")]
    InsufficientBits {
        /// Bits required to make progress.
        needed: u64,
        /// Bits that were actually available.
        available: u64,
    },

    /// Any other codec failure.
    #[error("{0}")]
    Message(String),
}

impl CodecError {
    /// An [`CodecError::InsufficientBits`] error.
    pub fn insufficient_bits(needed: u64, available: u64) -> Self {
        Self::InsufficientBits { needed, available }
    }

    /// A general codec error with the given message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Whether this error means "more input is required".
    pub fn is_insufficient_bits(&self) -> bool {
        matches!(self, Self::InsufficientBits { .. })
    }
}

/// Terminal failure of an interpreted decode or encode sequence.
///
/// Errors are not per-element: the consumer observes the output sequence
/// ending in one of these, after which nothing further is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A value codec failed while decoding.
    #[error("decoding failed: {0}")]
    Decode(CodecError),

    /// A value codec failed while encoding.
    #[error("encoding failed: {0}")]
    Encode(CodecError),

    /// Input ended while bits were still buffered mid-element.
    ///
    /// Raised only by the `*_complete` decoder variants. `cause` carries the
    /// most recent insufficient-bits error when one was observed, so the
    /// exact shortfall is reported.
    #[error("premature end of input{}", .cause.as_ref().map(|c| format!(": {c}")).unwrap_or_default())]
    PrematureEnd {
        /// The insufficient-bits error from the last decode attempt, if any.
        cause: Option<CodecError>,
    },
}

use thiserror::Error;

/// Errors raised by [`ByteBuffer`](super::ByteBuffer) operations.
///
/// A failing operation never mutates the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
  #[error("Buffer underflow: required {required} bytes, remaining {remaining}")]
  Underflow { required: usize, remaining: usize },
  #[error("Buffer overflow: required {required} bytes, remaining {remaining}")]
  Overflow { required: usize, remaining: usize },
  #[error("Invalid state: {0}")]
  InvalidState(&'static str),
  #[error("Position {position} out of bounds: limit is {limit}")]
  PositionOutOfBounds { position: usize, limit: usize },
  #[error("Limit {limit} out of bounds: capacity is {capacity}")]
  LimitOutOfBounds { limit: usize, capacity: usize },
  #[error("Index {index} with width {width} out of bounds: limit is {limit}")]
  IndexOutOfBounds { index: usize, width: usize, limit: usize },
  #[error("Malformed length field {length}: remaining {remaining} bytes")]
  MalformedLength { length: i64, remaining: usize },
  #[error("Invalid UTF-16 string payload")]
  InvalidUtf16,
  #[error("String too long: {0} UTF-16 code units")]
  StringTooLong(usize),
}

impl BufferError {
  /// Returns `true` when the error stems from a corrupt length or string payload
  /// rather than from insufficient space.
  pub fn is_malformed(&self) -> bool {
    matches!(self, BufferError::MalformedLength { .. } | BufferError::InvalidUtf16)
  }
}

static_assertions::assert_impl_all!(BufferError: Send, Sync);

use bytewire_utils_rs::BufferError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializationError {
  #[error(transparent)]
  Buffer(#[from] BufferError),
  #[error("Unknown type: {0}")]
  UnknownType(String),
  #[error("No serializer registered for value type: {0}")]
  UnregisteredType(String),
  #[error("Type mismatch: expected {expected}, actual {actual}")]
  TypeMismatch { expected: String, actual: String },
  #[error("Malformed record: {0}")]
  MalformedRecord(String),
  #[error("Char {0:?} does not fit in a single UTF-16 code unit")]
  CharOutOfRange(char),
  #[error("Serialization failed: {0}")]
  SerializationFailed(String),
  #[error("Deserialization failed: {0}")]
  DeserializationFailed(String),
}

impl SerializationError {
  pub fn unknown_type(type_name: impl Into<String>) -> Self {
    SerializationError::UnknownType(type_name.into())
  }

  pub fn malformed(reason: impl Into<String>) -> Self {
    SerializationError::MalformedRecord(reason.into())
  }

  pub fn serialization(message: impl Into<String>) -> Self {
    SerializationError::SerializationFailed(message.into())
  }

  pub fn deserialization(message: impl Into<String>) -> Self {
    SerializationError::DeserializationFailed(message.into())
  }

  /// Whether the record bytes themselves are corrupt, either at the record level
  /// or in a length-prefixed field inside it.
  pub fn is_malformed_record(&self) -> bool {
    match self {
      SerializationError::MalformedRecord(_) => true,
      SerializationError::Buffer(err) => err.is_malformed(),
      _ => false,
    }
  }
}

static_assertions::assert_impl_all!(SerializationError: Send, Sync);

use std::any::{Any, TypeId};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

use bytewire_utils_rs::ByteBuffer;

use super::SerializationError;

/// Encodes and decodes the payload of one value type.
///
/// Handlers are stateless: they only move bytes between the value and the
/// buffer and never see the record's type identifier.
pub trait Serializer<T>: Send + Sync {
  fn write(&self, buffer: &mut ByteBuffer, value: &T) -> Result<(), SerializationError>;
  fn read(&self, buffer: &mut ByteBuffer) -> Result<T, SerializationError>;
}

/// Type-erased handler as stored in a [`SerializerRegistry`](super::SerializerRegistry).
pub trait SerializerAny: Send + Sync {
  /// Wire identifier written at the head of every record this handler produces.
  fn type_name(&self) -> &str;

  /// The Rust type this handler accepts and produces.
  fn value_type_id(&self) -> TypeId;

  fn write_any(&self, buffer: &mut ByteBuffer, value: &dyn Any) -> Result<(), SerializationError>;

  fn read_any(&self, buffer: &mut ByteBuffer) -> Result<Box<dyn Any + Send + Sync>, SerializationError>;
}

impl Debug for dyn SerializerAny {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SerializerAny")
      .field("type_name", &self.type_name())
      .finish()
  }
}

// `&dyn Any` carries no readable type name.
const UNKNOWN_VALUE_TYPE: &str = "unknown";

/// Binds a [`Serializer<T>`] to a wire identifier and erases `T`.
pub struct TypedSerializer<T, S> {
  type_name: String,
  serializer: S,
  _phantom: PhantomData<fn() -> T>,
}

impl<T, S> TypedSerializer<T, S>
where
  T: Any + Send + Sync,
  S: Serializer<T>, {
  pub fn new(type_name: impl Into<String>, serializer: S) -> Self {
    Self {
      type_name: type_name.into(),
      serializer,
      _phantom: PhantomData,
    }
  }

  pub fn serializer(&self) -> &S {
    &self.serializer
  }
}

impl<T, S> SerializerAny for TypedSerializer<T, S>
where
  T: Any + Send + Sync,
  S: Serializer<T>, {
  fn type_name(&self) -> &str {
    &self.type_name
  }

  fn value_type_id(&self) -> TypeId {
    TypeId::of::<T>()
  }

  fn write_any(&self, buffer: &mut ByteBuffer, value: &dyn Any) -> Result<(), SerializationError> {
    let value = value
      .downcast_ref::<T>()
      .ok_or_else(|| SerializationError::TypeMismatch {
        expected: std::any::type_name::<T>().to_string(),
        actual: UNKNOWN_VALUE_TYPE.to_string(),
      })?;
    self.serializer.write(buffer, value)
  }

  fn read_any(&self, buffer: &mut ByteBuffer) -> Result<Box<dyn Any + Send + Sync>, SerializationError> {
    self
      .serializer
      .read(buffer)
      .map(|value| Box::new(value) as Box<dyn Any + Send + Sync>)
  }
}

/// A value type that is its own handler.
///
/// [`Serialization::write_self`](super::Serialization::write_self) calls
/// [`SelfSerializing::write_to`] directly instead of consulting the registry.
/// Registering the type (explicitly, or lazily on first write) lets the read
/// path resolve [`SelfSerializing::TYPE_NAME`] back to [`SelfSerializing::read_from`].
pub trait SelfSerializing: Any + Send + Sync + Sized {
  const TYPE_NAME: &'static str;

  fn write_to(&self, buffer: &mut ByteBuffer) -> Result<(), SerializationError>;

  fn read_from(buffer: &mut ByteBuffer) -> Result<Self, SerializationError>;
}

/// Adapts a [`SelfSerializing`] type to [`Serializer`].
pub struct SelfSerializer<T> {
  _phantom: PhantomData<fn() -> T>,
}

impl<T> Default for SelfSerializer<T> {
  fn default() -> Self {
    Self { _phantom: PhantomData }
  }
}

impl<T: SelfSerializing> Serializer<T> for SelfSerializer<T> {
  fn write(&self, buffer: &mut ByteBuffer, value: &T) -> Result<(), SerializationError> {
    value.write_to(buffer)
  }

  fn read(&self, buffer: &mut ByteBuffer) -> Result<T, SerializationError> {
    T::read_from(buffer)
  }
}


use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use bytewire_utils_rs::ByteBuffer;

use super::{SelfSerializer, SelfSerializing, SerializationError, SerializerAny, SerializerRegistry, TypedSerializer};
use crate::config::Config;

/// Width in bytes of the framing length field written by [`Serialization::write_length`].
pub const LENGTH_LENGTH: usize = 4;

/// A value reconstructed from a record, tagged with the identifier it was read under.
pub struct DecodedValue {
  type_name: String,
  value: Box<dyn Any + Send + Sync>,
}

impl DecodedValue {
  pub fn type_name(&self) -> &str {
    &self.type_name
  }

  pub fn is<T: Any>(&self) -> bool {
    self.value.is::<T>()
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    self.value.downcast_ref::<T>()
  }

  pub fn downcast<T: Any>(self) -> Result<T, SerializationError> {
    let type_name = self.type_name;
    self
      .value
      .downcast::<T>()
      .map(|value| *value)
      .map_err(|_| SerializationError::TypeMismatch {
        expected: std::any::type_name::<T>().to_string(),
        actual: type_name,
      })
  }

  pub fn into_inner(self) -> (String, Box<dyn Any + Send + Sync>) {
    (self.type_name, self.value)
  }
}

impl Debug for DecodedValue {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DecodedValue")
      .field("type_name", &self.type_name)
      .finish_non_exhaustive()
  }
}

/// Writes and reads self-describing records against a [`SerializerRegistry`].
///
/// Each record operation is atomic from the caller's side: on success the
/// buffer position moves from the record start to the record end, on failure
/// it is put back at the record start.
#[derive(Debug, Clone)]
pub struct Serialization {
  registry: SerializerRegistry,
  config: Config,
}

impl Default for Serialization {
  fn default() -> Self {
    Self::from_config(Config::default())
  }
}

impl Serialization {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_config(config: Config) -> Self {
    let registry = if config.is_register_builtins() {
      SerializerRegistry::with_builtins()
    } else {
      SerializerRegistry::new()
    };
    Self { registry, config }
  }

  pub fn with_registry(registry: SerializerRegistry, config: Config) -> Self {
    Self { registry, config }
  }

  pub fn registry(&self) -> &SerializerRegistry {
    &self.registry
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Allocates a buffer of the configured default capacity.
  pub fn allocate_buffer(&self) -> ByteBuffer {
    ByteBuffer::new(self.config.get_default_buffer_capacity())
  }

  /// Encodes `value` as one record using the handler registered for `T`.
  pub fn write<T: Any>(&self, buffer: &mut ByteBuffer, value: &T) -> Result<(), SerializationError> {
    let serializer = self
      .registry
      .find_by_type::<T>()
      .ok_or_else(|| SerializationError::UnregisteredType(std::any::type_name::<T>().to_string()))?;
    self.write_record(buffer, serializer.as_ref(), value)
  }

  /// Encodes a type-erased value, resolving the handler from its runtime type.
  pub fn write_any(&self, buffer: &mut ByteBuffer, value: &dyn Any) -> Result<(), SerializationError> {
    let type_id = value.type_id();
    let serializer = self
      .registry
      .find_by_type_id(type_id)
      .ok_or_else(|| SerializationError::UnregisteredType(format!("{:?}", type_id)))?;
    self.write_record(buffer, serializer.as_ref(), value)
  }

  /// Encodes a value that is its own handler; the registry is not consulted.
  ///
  /// With [`Config::is_auto_register_self_serializing`] on, the first write of
  /// an unregistered `T` installs a handler for [`SelfSerializing::TYPE_NAME`]
  /// so that the read path can resolve it. An existing entry is never replaced.
  pub fn write_self<T: SelfSerializing>(&self, buffer: &mut ByteBuffer, value: &T) -> Result<(), SerializationError> {
    self.install_self_serializing::<T>();
    let start = buffer.position();
    let result = Self::encode_self(buffer, value);
    rollback_on_error(buffer, start, result)?;
    tracing::trace!(
      "Record written: type_name = {}, start = {}, end = {}",
      T::TYPE_NAME,
      start,
      buffer.position()
    );
    Ok(())
  }

  fn install_self_serializing<T: SelfSerializing>(&self) {
    if !self.config.is_auto_register_self_serializing() || self.registry.contains(T::TYPE_NAME) {
      return;
    }
    let serializer = TypedSerializer::new(T::TYPE_NAME, SelfSerializer::<T>::default());
    if self.registry.register_if_absent(Arc::new(serializer)) {
      tracing::debug!("Installed self-serializing handler: type_name = {}", T::TYPE_NAME);
    }
  }

  fn write_record(
    &self,
    buffer: &mut ByteBuffer,
    serializer: &dyn SerializerAny,
    value: &dyn Any,
  ) -> Result<(), SerializationError> {
    let start = buffer.position();
    let result = Self::encode(buffer, serializer, value);
    rollback_on_error(buffer, start, result)?;
    tracing::trace!(
      "Record written: type_name = {}, start = {}, end = {}",
      serializer.type_name(),
      start,
      buffer.position()
    );
    Ok(())
  }

  fn encode(buffer: &mut ByteBuffer, serializer: &dyn SerializerAny, value: &dyn Any) -> Result<(), SerializationError> {
    buffer.write_string(serializer.type_name())?;
    serializer.write_any(buffer, value)
  }

  fn encode_self<T: SelfSerializing>(buffer: &mut ByteBuffer, value: &T) -> Result<(), SerializationError> {
    buffer.write_string(T::TYPE_NAME)?;
    value.write_to(buffer)
  }

  /// Decodes the next record, whatever its type.
  pub fn read_any(&self, buffer: &mut ByteBuffer) -> Result<DecodedValue, SerializationError> {
    let start = buffer.position();
    let result = self.decode(buffer);
    let decoded = rollback_on_error(buffer, start, result)?;
    tracing::trace!(
      "Record read: type_name = {}, start = {}, end = {}",
      decoded.type_name(),
      start,
      buffer.position()
    );
    Ok(decoded)
  }

  /// Decodes the next record and checks that it holds a `T`.
  ///
  /// A record of another type fails with [`SerializationError::TypeMismatch`]
  /// and is left in place.
  pub fn read<T: Any>(&self, buffer: &mut ByteBuffer) -> Result<T, SerializationError> {
    let start = buffer.position();
    let result = self.read_any(buffer).and_then(DecodedValue::downcast::<T>);
    rollback_on_error(buffer, start, result)
  }

  fn decode(&self, buffer: &mut ByteBuffer) -> Result<DecodedValue, SerializationError> {
    let type_name = self.read_type_name(buffer)?;
    let Some(serializer) = self.registry.find(&type_name) else {
      tracing::warn!("Unknown type in record: type_name = {}", type_name);
      return Err(SerializationError::UnknownType(type_name));
    };
    let value = serializer.read_any(buffer)?;
    Ok(DecodedValue { type_name, value })
  }

  fn read_type_name(&self, buffer: &mut ByteBuffer) -> Result<String, SerializationError> {
    if buffer.remaining() >= LENGTH_LENGTH {
      let length = buffer.get_i32_at(buffer.position())?;
      let max = self.config.get_max_type_name_length();
      if matches!(usize::try_from(length), Ok(length) if length > max) {
        return Err(SerializationError::malformed(format!(
          "type identifier length {} exceeds {}",
          length, max
        )));
      }
    }
    Ok(buffer.read_string()?)
  }

  /// Writes a framing length field, independent of any record.
  pub fn write_length(&self, buffer: &mut ByteBuffer, length: usize) -> Result<(), SerializationError> {
    Ok(buffer.put_i32(frame_length(length)?)?)
  }

  /// Reads a framing length field. A negative length, or one larger than what
  /// remains after the field, is a malformed record and consumes nothing.
  pub fn read_length(&self, buffer: &mut ByteBuffer) -> Result<usize, SerializationError> {
    let start = buffer.position();
    let length = buffer.get_i32()?;
    let remaining = buffer.remaining();
    match usize::try_from(length) {
      Ok(length) if length <= remaining => Ok(length),
      _ => {
        buffer.set_position(start)?;
        Err(SerializationError::malformed(format!(
          "frame length {} with {} bytes remaining",
          length, remaining
        )))
      }
    }
  }

  /// Width of the framing length field, for callers reserving space before the
  /// payload size is known.
  pub fn length_length(&self) -> usize {
    LENGTH_LENGTH
  }

  /// Writes a framing length followed by one record; the length is the
  /// record's size in bytes and is filled in once the record is complete.
  pub fn write_framed<T: Any>(&self, buffer: &mut ByteBuffer, value: &T) -> Result<(), SerializationError> {
    self.encode_framed(buffer, |buffer| self.write(buffer, value))
  }

  /// [`Serialization::write_framed`] for a value that is its own handler,
  /// installing the handler the same way [`Serialization::write_self`] does.
  pub fn write_framed_self<T: SelfSerializing>(
    &self,
    buffer: &mut ByteBuffer,
    value: &T,
  ) -> Result<(), SerializationError> {
    self.encode_framed(buffer, |buffer| self.write_self(buffer, value))
  }

  fn encode_framed<F>(&self, buffer: &mut ByteBuffer, write_record: F) -> Result<(), SerializationError>
  where
    F: FnOnce(&mut ByteBuffer) -> Result<(), SerializationError>, {
    let start = buffer.position();
    let result = self
      .write_length(buffer, 0)
      .and_then(|_| write_record(buffer))
      .and_then(|_| {
        let length = buffer.position() - start - LENGTH_LENGTH;
        Ok(buffer.put_i32_at(start, frame_length(length)?)?)
      });
    rollback_on_error(buffer, start, result)
  }

  /// Reads a frame written by [`Serialization::write_framed`]. The record may
  /// not read past its frame, and must consume all of it.
  pub fn read_framed<T: Any>(&self, buffer: &mut ByteBuffer) -> Result<T, SerializationError> {
    let start = buffer.position();
    let result = self.decode_framed(buffer);
    rollback_on_error(buffer, start, result)
  }

  fn decode_framed<T: Any>(&self, buffer: &mut ByteBuffer) -> Result<T, SerializationError> {
    let length = self.read_length(buffer)?;
    let end = buffer.position() + length;
    let limit = buffer.limit();
    buffer.set_limit(end)?;
    let result = self.read::<T>(buffer);
    buffer.set_limit(limit)?;
    let value = result?;
    if buffer.position() != end {
      return Err(SerializationError::malformed(format!(
        "frame of {} bytes has {} trailing bytes",
        length,
        end - buffer.position()
      )));
    }
    Ok(value)
  }
}

fn frame_length(length: usize) -> Result<i32, SerializationError> {
  i32::try_from(length).map_err(|_| SerializationError::malformed(format!("frame length {} exceeds i32::MAX", length)))
}

fn rollback_on_error<R>(
  buffer: &mut ByteBuffer,
  start: usize,
  result: Result<R, SerializationError>,
) -> Result<R, SerializationError> {
  if result.is_err() {
    buffer.set_position(start)?;
  }
  result
}

static_assertions::assert_impl_all!(Serialization: Send, Sync);
static_assertions::assert_impl_all!(DecodedValue: Send);

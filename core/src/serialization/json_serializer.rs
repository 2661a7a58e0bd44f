use std::marker::PhantomData;

use bytewire_utils_rs::ByteBuffer;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{SerializationError, Serializer};

/// Handler for any serde type. The payload is the value's JSON text, written
/// as a regular length-prefixed buffer string.
pub struct JsonSerializer<T> {
  _phantom: PhantomData<fn() -> T>,
}

impl<T> JsonSerializer<T> {
  pub fn new() -> Self {
    Self { _phantom: PhantomData }
  }
}

impl<T> Default for JsonSerializer<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Serializer<T> for JsonSerializer<T>
where
  T: Serialize + DeserializeOwned, {
  fn write(&self, buffer: &mut ByteBuffer, value: &T) -> Result<(), SerializationError> {
    let json = serde_json::to_string(value).map_err(|e| SerializationError::serialization(e.to_string()))?;
    Ok(buffer.write_string(&json)?)
  }

  fn read(&self, buffer: &mut ByteBuffer) -> Result<T, SerializationError> {
    let start = buffer.position();
    let json = buffer.read_string()?;
    match serde_json::from_str(&json) {
      Ok(value) => Ok(value),
      Err(e) => {
        buffer.set_position(start)?;
        Err(SerializationError::deserialization(e.to_string()))
      }
    }
  }
}

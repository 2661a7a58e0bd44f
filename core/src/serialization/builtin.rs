
use std::sync::Arc;

use bytewire_utils_rs::ByteBuffer;
use once_cell::sync::Lazy;

use super::type_names;
use super::{SerializationError, Serializer, SerializerAny, TypedSerializer};

macro_rules! primitive_serializer {
  ($name:ident, $ty:ty, $get:ident, $put:ident) => {
    #[derive(Debug, Clone, Copy, Default)]
    pub struct $name;

    impl Serializer<$ty> for $name {
      fn write(&self, buffer: &mut ByteBuffer, value: &$ty) -> Result<(), SerializationError> {
        Ok(buffer.$put(*value)?)
      }

      fn read(&self, buffer: &mut ByteBuffer) -> Result<$ty, SerializationError> {
        Ok(buffer.$get()?)
      }
    }
  };
}

primitive_serializer!(BooleanSerializer, bool, get_bool, put_bool);
primitive_serializer!(ByteSerializer, i8, get_i8, put_i8);
primitive_serializer!(ShortSerializer, i16, get_i16, put_i16);
primitive_serializer!(IntSerializer, i32, get_i32, put_i32);
primitive_serializer!(LongSerializer, i64, get_i64, put_i64);
primitive_serializer!(FloatSerializer, f32, get_f32, put_f32);
primitive_serializer!(DoubleSerializer, f64, get_f64, put_f64);

/// One UTF-16 code unit, the payload of a `char` record.
///
/// Any unit round-trips, including half of a surrogate pair. Conversions to
/// and from Rust `char` are only defined for the Basic Multilingual Plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CodeUnit(pub u16);

impl CodeUnit {
  pub fn value(self) -> u16 {
    self.0
  }

  pub fn is_surrogate(self) -> bool {
    (0xD800..=0xDFFF).contains(&self.0)
  }

  /// The scalar value this unit encodes on its own, or `None` for a surrogate half.
  pub fn to_char(self) -> Option<char> {
    char::from_u32(u32::from(self.0))
  }
}

impl From<u16> for CodeUnit {
  fn from(unit: u16) -> Self {
    CodeUnit(unit)
  }
}

impl TryFrom<char> for CodeUnit {
  type Error = SerializationError;

  fn try_from(value: char) -> Result<Self, Self::Error> {
    let mut units = [0u16; 2];
    match value.encode_utf16(&mut units) {
      [unit] => Ok(CodeUnit(*unit)),
      _ => Err(SerializationError::CharOutOfRange(value)),
    }
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CodeUnitSerializer;

impl Serializer<CodeUnit> for CodeUnitSerializer {
  fn write(&self, buffer: &mut ByteBuffer, value: &CodeUnit) -> Result<(), SerializationError> {
    Ok(buffer.put_char(value.0)?)
  }

  fn read(&self, buffer: &mut ByteBuffer) -> Result<CodeUnit, SerializationError> {
    Ok(CodeUnit(buffer.get_char()?))
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl Serializer<String> for StringSerializer {
  fn write(&self, buffer: &mut ByteBuffer, value: &String) -> Result<(), SerializationError> {
    Ok(buffer.write_string(value)?)
  }

  fn read(&self, buffer: &mut ByteBuffer) -> Result<String, SerializationError> {
    Ok(buffer.read_string()?)
  }
}

static BUILTIN_SERIALIZERS: Lazy<Vec<Arc<dyn SerializerAny>>> = Lazy::new(|| {
  let serializers: Vec<Arc<dyn SerializerAny>> = vec![
    Arc::new(TypedSerializer::new(type_names::BOOLEAN, BooleanSerializer)),
    Arc::new(TypedSerializer::new(type_names::BYTE, ByteSerializer)),
    Arc::new(TypedSerializer::new(type_names::CHAR, CodeUnitSerializer)),
    Arc::new(TypedSerializer::new(type_names::SHORT, ShortSerializer)),
    Arc::new(TypedSerializer::new(type_names::INT, IntSerializer)),
    Arc::new(TypedSerializer::new(type_names::LONG, LongSerializer)),
    Arc::new(TypedSerializer::new(type_names::FLOAT, FloatSerializer)),
    Arc::new(TypedSerializer::new(type_names::DOUBLE, DoubleSerializer)),
    Arc::new(TypedSerializer::new(type_names::STRING, StringSerializer)),
  ];
  tracing::debug!("Built-in serializer table initialized: {} entries", serializers.len());
  serializers
});

/// Handlers for the primitive types, built once per process and shared by every registry.
pub fn builtin_serializers() -> &'static [Arc<dyn SerializerAny>] {
  &BUILTIN_SERIALIZERS
}

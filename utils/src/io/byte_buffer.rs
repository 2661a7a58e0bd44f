#[cfg(test)]
mod tests;

use super::BufferError;

/// Width in bytes of the signed length prefix written before every string.
pub const STRING_LENGTH_WIDTH: usize = 4;

const CODE_UNIT_WIDTH: usize = 2;

/// A fixed-capacity byte window addressed by a cursor.
///
/// The cursor is the `(position, limit, mark)` triple. Relative reads and writes
/// happen at `position` and may not cross `limit`; `limit` never exceeds the
/// capacity chosen at construction. The following always holds between calls:
///
/// ```text
/// 0 <= mark <= position <= limit <= capacity
/// ```
///
/// Multi-byte primitives are big-endian. Every get/put checks the remaining
/// space up front and either completes or leaves the buffer unchanged.
///
/// Cursor state is mutated by every call, so a buffer is driven through
/// `&mut self` by one owner at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteBuffer {
  bytes: Box<[u8]>,
  position: usize,
  limit: usize,
  mark: Option<usize>,
}

impl ByteBuffer {
  /// Allocates a zeroed buffer ready for writing: `position == 0`, `limit == capacity`.
  pub fn new(capacity: usize) -> Self {
    Self {
      bytes: vec![0u8; capacity].into_boxed_slice(),
      position: 0,
      limit: capacity,
      mark: None,
    }
  }

  /// Adopts existing bytes ready for reading; capacity and limit equal `bytes.len()`.
  pub fn wrap(bytes: Vec<u8>) -> Self {
    let capacity = bytes.len();
    Self {
      bytes: bytes.into_boxed_slice(),
      position: 0,
      limit: capacity,
      mark: None,
    }
  }

  /// Number of bytes a string occupies on the wire: the length prefix plus two
  /// bytes per UTF-16 code unit.
  pub fn string_width(value: &str) -> usize {
    STRING_LENGTH_WIDTH + value.encode_utf16().count() * CODE_UNIT_WIDTH
  }

  pub fn capacity(&self) -> usize {
    self.bytes.len()
  }

  pub fn position(&self) -> usize {
    self.position
  }

  /// Moves the cursor. A mark above the new position is discarded.
  pub fn set_position(&mut self, position: usize) -> Result<(), BufferError> {
    if position > self.limit {
      return Err(BufferError::PositionOutOfBounds {
        position,
        limit: self.limit,
      });
    }
    self.position = position;
    if matches!(self.mark, Some(mark) if mark > position) {
      self.mark = None;
    }
    Ok(())
  }

  pub fn limit(&self) -> usize {
    self.limit
  }

  /// Changes the operational upper bound.
  ///
  /// A position beyond the new limit is clamped down to it, and a mark beyond
  /// it is discarded.
  pub fn set_limit(&mut self, limit: usize) -> Result<(), BufferError> {
    if limit > self.capacity() {
      return Err(BufferError::LimitOutOfBounds {
        limit,
        capacity: self.capacity(),
      });
    }
    self.limit = limit;
    if self.position > limit {
      self.position = limit;
    }
    if matches!(self.mark, Some(mark) if mark > limit) {
      self.mark = None;
    }
    Ok(())
  }

  /// The saved position, if [`ByteBuffer::mark`] was called since the last invalidation.
  pub fn mark_position(&self) -> Option<usize> {
    self.mark
  }

  /// Saves the current position.
  pub fn mark(&mut self) -> &mut Self {
    self.mark = Some(self.position);
    self
  }

  /// Restores the position saved by [`ByteBuffer::mark`] and unsets the mark.
  pub fn reset(&mut self) -> Result<&mut Self, BufferError> {
    let mark = self.mark.take().ok_or(BufferError::InvalidState("mark is not set"))?;
    self.position = mark;
    Ok(self)
  }

  /// Prepares for writing from scratch.
  pub fn clear(&mut self) -> &mut Self {
    self.position = 0;
    self.limit = self.capacity();
    self.mark = None;
    self
  }

  /// Switches from writing to reading what was just written.
  pub fn flip(&mut self) -> &mut Self {
    self.limit = self.position;
    self.position = 0;
    self.mark = None;
    self
  }

  /// Re-reads from the start without touching the limit.
  pub fn rewind(&mut self) -> &mut Self {
    self.position = 0;
    self.mark = None;
    self
  }

  pub fn remaining(&self) -> usize {
    self.limit - self.position
  }

  pub fn has_remaining(&self) -> bool {
    self.position < self.limit
  }

  /// The whole backing store, regardless of the cursor.
  pub fn as_slice(&self) -> &[u8] {
    &self.bytes
  }

  /// The bytes between position and limit.
  pub fn remaining_slice(&self) -> &[u8] {
    &self.bytes[self.position..self.limit]
  }

  pub fn into_inner(self) -> Vec<u8> {
    self.bytes.into_vec()
  }

  fn ensure_readable(&self, required: usize) -> Result<(), BufferError> {
    let remaining = self.remaining();
    if remaining < required {
      return Err(BufferError::Underflow { required, remaining });
    }
    Ok(())
  }

  fn ensure_writable(&self, required: usize) -> Result<(), BufferError> {
    let remaining = self.remaining();
    if remaining < required {
      return Err(BufferError::Overflow { required, remaining });
    }
    Ok(())
  }

  fn ensure_index(&self, index: usize, width: usize) -> Result<(), BufferError> {
    match index.checked_add(width) {
      Some(end) if end <= self.limit => Ok(()),
      _ => Err(BufferError::IndexOutOfBounds {
        index,
        width,
        limit: self.limit,
      }),
    }
  }

  // Callers must have checked `index + N <= limit`.
  fn peek<const N: usize>(&self, index: usize) -> [u8; N] {
    let mut raw = [0u8; N];
    raw.copy_from_slice(&self.bytes[index..index + N]);
    raw
  }

  fn take<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
    self.ensure_readable(N)?;
    let raw = self.peek::<N>(self.position);
    self.position += N;
    Ok(raw)
  }

  fn push<const N: usize>(&mut self, raw: [u8; N]) -> Result<(), BufferError> {
    self.ensure_writable(N)?;
    self.bytes[self.position..self.position + N].copy_from_slice(&raw);
    self.position += N;
    Ok(())
  }

  pub fn get_i8(&mut self) -> Result<i8, BufferError> {
    let [byte] = self.take::<1>()?;
    Ok(byte as i8)
  }

  pub fn put_i8(&mut self, value: i8) -> Result<(), BufferError> {
    self.push([value as u8])
  }

  /// Reads one byte; only `1` decodes as `true`.
  pub fn get_bool(&mut self) -> Result<bool, BufferError> {
    let [byte] = self.take::<1>()?;
    Ok(byte == 1)
  }

  pub fn put_bool(&mut self, value: bool) -> Result<(), BufferError> {
    self.push([u8::from(value)])
  }

  pub fn get_i16(&mut self) -> Result<i16, BufferError> {
    Ok(i16::from_be_bytes(self.take::<2>()?))
  }

  pub fn put_i16(&mut self, value: i16) -> Result<(), BufferError> {
    self.push(value.to_be_bytes())
  }

  /// Reads one UTF-16 code unit.
  pub fn get_char(&mut self) -> Result<u16, BufferError> {
    Ok(u16::from_be_bytes(self.take::<2>()?))
  }

  /// Writes one UTF-16 code unit.
  pub fn put_char(&mut self, value: u16) -> Result<(), BufferError> {
    self.push(value.to_be_bytes())
  }

  /// Reads a big-endian `i32`: the leading byte carries the sign, the
  /// remaining three are taken as unsigned.
  pub fn get_i32(&mut self) -> Result<i32, BufferError> {
    Ok(i32::from_be_bytes(self.take::<4>()?))
  }

  /// Writes bits 31..24 first and bits 7..0 last.
  pub fn put_i32(&mut self, value: i32) -> Result<(), BufferError> {
    self.push(value.to_be_bytes())
  }

  pub fn get_i64(&mut self) -> Result<i64, BufferError> {
    Ok(i64::from_be_bytes(self.take::<8>()?))
  }

  pub fn put_i64(&mut self, value: i64) -> Result<(), BufferError> {
    self.push(value.to_be_bytes())
  }

  /// Reads the raw IEEE-754 bits written by [`ByteBuffer::put_f32`]; NaN payloads survive.
  pub fn get_f32(&mut self) -> Result<f32, BufferError> {
    Ok(f32::from_bits(self.get_i32()? as u32))
  }

  pub fn put_f32(&mut self, value: f32) -> Result<(), BufferError> {
    self.put_i32(value.to_bits() as i32)
  }

  pub fn get_f64(&mut self) -> Result<f64, BufferError> {
    Ok(f64::from_bits(self.get_i64()? as u64))
  }

  pub fn put_f64(&mut self, value: f64) -> Result<(), BufferError> {
    self.put_i64(value.to_bits() as i64)
  }

  /// Fills `dst` from the buffer.
  pub fn get_bytes(&mut self, dst: &mut [u8]) -> Result<(), BufferError> {
    self.ensure_readable(dst.len())?;
    let end = self.position + dst.len();
    dst.copy_from_slice(&self.bytes[self.position..end]);
    self.position = end;
    Ok(())
  }

  pub fn put_bytes(&mut self, src: &[u8]) -> Result<(), BufferError> {
    self.ensure_writable(src.len())?;
    let end = self.position + src.len();
    self.bytes[self.position..end].copy_from_slice(src);
    self.position = end;
    Ok(())
  }

  /// Absolute read; the cursor does not move.
  pub fn get_i32_at(&self, index: usize) -> Result<i32, BufferError> {
    self.ensure_index(index, 4)?;
    Ok(i32::from_be_bytes(self.peek::<4>(index)))
  }

  /// Absolute write; the cursor does not move.
  pub fn put_i32_at(&mut self, index: usize, value: i32) -> Result<(), BufferError> {
    self.ensure_index(index, 4)?;
    self.bytes[index..index + 4].copy_from_slice(&value.to_be_bytes());
    Ok(())
  }

  /// Writes a length-prefixed string.
  ///
  /// The prefix counts UTF-16 code units, not bytes, and each unit takes two
  /// bytes. Existing peers depend on this accounting.
  pub fn write_string(&mut self, value: &str) -> Result<(), BufferError> {
    let units = value.encode_utf16().count();
    let length = i32::try_from(units).map_err(|_| BufferError::StringTooLong(units))?;
    let required = units
      .checked_mul(CODE_UNIT_WIDTH)
      .and_then(|payload| payload.checked_add(STRING_LENGTH_WIDTH))
      .ok_or(BufferError::StringTooLong(units))?;
    self.ensure_writable(required)?;

    self.put_i32(length)?;
    for unit in value.encode_utf16() {
      self.put_char(unit)?;
    }
    Ok(())
  }

  /// Reads a string written by [`ByteBuffer::write_string`].
  ///
  /// A negative length, or one that claims more units than remain, is reported
  /// as [`BufferError::MalformedLength`] without consuming anything.
  pub fn read_string(&mut self) -> Result<String, BufferError> {
    self.ensure_readable(STRING_LENGTH_WIDTH)?;
    let length = i32::from_be_bytes(self.peek::<4>(self.position));
    let available = self.remaining() - STRING_LENGTH_WIDTH;
    let malformed = BufferError::MalformedLength {
      length: i64::from(length),
      remaining: available,
    };
    let units = usize::try_from(length).map_err(|_| malformed.clone())?;
    let width = match units.checked_mul(CODE_UNIT_WIDTH) {
      Some(width) if width <= available => width,
      _ => return Err(malformed),
    };

    let start = self.position + STRING_LENGTH_WIDTH;
    let code_units = self.bytes[start..start + width]
      .chunks_exact(CODE_UNIT_WIDTH)
      .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
      .collect::<Vec<_>>();
    let value = String::from_utf16(&code_units).map_err(|_| BufferError::InvalidUtf16)?;
    self.position = start + width;
    Ok(value)
  }
}

static_assertions::assert_impl_all!(ByteBuffer: Send, Sync);

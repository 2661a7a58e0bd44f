use super::*;
use rstest::*;

fn assert_cursor_invariant(buffer: &ByteBuffer) {
  if let Some(mark) = buffer.mark_position() {
    assert!(mark <= buffer.position(), "mark {} > position {}", mark, buffer.position());
  }
  assert!(buffer.position() <= buffer.limit());
  assert!(buffer.limit() <= buffer.capacity());
}

#[test]
fn test_new_buffer_is_ready_for_writing() {
  let buffer = ByteBuffer::new(16);
  assert_eq!(buffer.capacity(), 16);
  assert_eq!(buffer.position(), 0);
  assert_eq!(buffer.limit(), 16);
  assert_eq!(buffer.mark_position(), None);
  assert_eq!(buffer.remaining(), 16);
}

#[test]
fn test_wrap_exposes_all_bytes_for_reading() {
  let mut buffer = ByteBuffer::wrap(vec![0x00, 0x00, 0x01, 0x00]);
  assert_eq!(buffer.capacity(), 4);
  assert_eq!(buffer.limit(), 4);
  assert_eq!(buffer.get_i32().unwrap(), 256);
  assert!(!buffer.has_remaining());
}

#[test]
fn test_put_i32_writes_most_significant_byte_first() {
  let mut buffer = ByteBuffer::new(8);
  buffer.put_i32(0x0102_0304).unwrap();
  buffer.put_i32(-2).unwrap();
  assert_eq!(buffer.as_slice(), &[0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0xFF, 0xFE]);
}

#[test]
fn test_get_i32_sign_extends_only_the_leading_byte() {
  let mut buffer = ByteBuffer::wrap(vec![0x80, 0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0xFF]);
  assert_eq!(buffer.get_i32().unwrap(), i32::MIN + 1);
  assert_eq!(buffer.get_i32().unwrap(), 0x00FF_FFFF);
}

#[test]
fn test_short_and_long_layouts() {
  let mut buffer = ByteBuffer::new(10);
  buffer.put_i16(-0x1234).unwrap();
  buffer.put_i64(0x0102_0304_0506_0708).unwrap();
  assert_eq!(
    buffer.as_slice(),
    &[0xED, 0xCC, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]
  );
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(-1)]
#[case(i16::MIN)]
#[case(i16::MAX)]
#[case(-300)]
fn test_i16_round_trip(#[case] value: i16) {
  let mut buffer = ByteBuffer::new(2);
  buffer.put_i16(value).unwrap();
  buffer.flip();
  assert_eq!(buffer.get_i16().unwrap(), value);
}

#[rstest]
#[case(0)]
#[case(42)]
#[case(-42)]
#[case(i32::MIN)]
#[case(i32::MAX)]
#[case(-65_536)]
fn test_i32_round_trip(#[case] value: i32) {
  let mut buffer = ByteBuffer::new(4);
  buffer.put_i32(value).unwrap();
  buffer.flip();
  assert_eq!(buffer.get_i32().unwrap(), value);
}

#[rstest]
#[case(0)]
#[case(-1)]
#[case(i64::MIN)]
#[case(i64::MAX)]
#[case(-4_294_967_296)]
fn test_i64_round_trip(#[case] value: i64) {
  let mut buffer = ByteBuffer::new(8);
  buffer.put_i64(value).unwrap();
  buffer.flip();
  assert_eq!(buffer.get_i64().unwrap(), value);
}

#[rstest]
#[case(0x4048_F5C3)]
#[case(0x8000_0000)]
#[case(0x7FC0_1234)]
#[case(0xFF80_0000)]
#[case(0x0000_0001)]
fn test_f32_preserves_bit_pattern(#[case] bits: u32) {
  let mut buffer = ByteBuffer::new(4);
  buffer.put_f32(f32::from_bits(bits)).unwrap();
  assert_eq!(buffer.as_slice(), &bits.to_be_bytes());
  buffer.flip();
  assert_eq!(buffer.get_f32().unwrap().to_bits(), bits);
}

#[rstest]
#[case(0x4009_21FB_5444_2D18)]
#[case(0x8000_0000_0000_0000)]
#[case(0x7FF8_0000_DEAD_BEEF)]
fn test_f64_preserves_bit_pattern(#[case] bits: u64) {
  let mut buffer = ByteBuffer::new(8);
  buffer.put_f64(f64::from_bits(bits)).unwrap();
  buffer.flip();
  assert_eq!(buffer.get_f64().unwrap().to_bits(), bits);
}

#[test]
fn test_byte_bool_and_char() {
  let mut buffer = ByteBuffer::new(6);
  buffer.put_i8(-128).unwrap();
  buffer.put_bool(true).unwrap();
  buffer.put_bool(false).unwrap();
  buffer.put_i8(2).unwrap();
  buffer.put_char(0x00E9).unwrap();
  assert_eq!(buffer.as_slice(), &[0x80, 0x01, 0x00, 0x02, 0x00, 0xE9]);

  buffer.flip();
  assert_eq!(buffer.get_i8().unwrap(), -128);
  assert!(buffer.get_bool().unwrap());
  assert!(!buffer.get_bool().unwrap());
  // Only the value 1 decodes as true.
  assert!(!buffer.get_bool().unwrap());
  assert_eq!(buffer.get_char().unwrap(), 0x00E9);
}

#[test]
fn test_get_i32_underflow_leaves_buffer_untouched() {
  let mut buffer = ByteBuffer::wrap(vec![1, 2, 3, 4, 5]);
  buffer.set_position(2).unwrap();
  let snapshot = buffer.clone();

  let err = buffer.get_i32().unwrap_err();
  assert_eq!(
    err,
    BufferError::Underflow {
      required: 4,
      remaining: 3
    }
  );
  assert_eq!(buffer, snapshot);
  assert_eq!(buffer.position(), 2);
}

#[test]
fn test_put_i64_overflow_leaves_buffer_untouched() {
  let mut buffer = ByteBuffer::new(7);
  let snapshot = buffer.clone();

  let err = buffer.put_i64(-1).unwrap_err();
  assert_eq!(
    err,
    BufferError::Overflow {
      required: 8,
      remaining: 7
    }
  );
  assert_eq!(buffer, snapshot);
}

#[test]
fn test_reads_stop_at_limit_not_capacity() {
  let mut buffer = ByteBuffer::new(8);
  buffer.set_limit(2).unwrap();
  assert!(matches!(buffer.get_i32(), Err(BufferError::Underflow { .. })));
  assert!(matches!(buffer.put_i32(1), Err(BufferError::Overflow { .. })));
  assert_eq!(buffer.position(), 0);
}

#[test]
fn test_bytes_round_trip() {
  let mut buffer = ByteBuffer::new(4);
  buffer.put_bytes(&[9, 8, 7]).unwrap();
  assert!(matches!(buffer.put_bytes(&[1, 2]), Err(BufferError::Overflow { .. })));
  buffer.flip();

  let mut dst = [0u8; 3];
  buffer.get_bytes(&mut dst).unwrap();
  assert_eq!(dst, [9, 8, 7]);
  let mut too_big = [0u8; 1];
  assert!(matches!(buffer.get_bytes(&mut too_big), Err(BufferError::Underflow { .. })));
}

#[test]
fn test_write_string_width_accounting() {
  let mut buffer = ByteBuffer::new(16);
  buffer.write_string("ab").unwrap();
  assert_eq!(buffer.position(), 8);
  assert_eq!(ByteBuffer::string_width("ab"), 8);
  assert_eq!(&buffer.as_slice()[..8], &[0, 0, 0, 2, 0, b'a', 0, b'b']);

  buffer.flip();
  assert_eq!(buffer.read_string().unwrap(), "ab");
  assert_eq!(buffer.position(), buffer.limit());
}

#[test]
fn test_string_length_counts_utf16_code_units() {
  let value = "é😀";
  let mut buffer = ByteBuffer::new(32);
  buffer.write_string(value).unwrap();
  // One unit for the accented letter, a surrogate pair for the emoji.
  assert_eq!(buffer.get_i32_at(0).unwrap(), 3);
  assert_eq!(buffer.position(), 4 + 3 * 2);

  buffer.flip();
  assert_eq!(buffer.read_string().unwrap(), value);
}

#[test]
fn test_empty_string() {
  let mut buffer = ByteBuffer::new(4);
  buffer.write_string("").unwrap();
  buffer.flip();
  assert_eq!(buffer.read_string().unwrap(), "");
}

#[test]
fn test_write_string_overflow_writes_nothing() {
  let mut buffer = ByteBuffer::new(6);
  let err = buffer.write_string("ab").unwrap_err();
  assert_eq!(
    err,
    BufferError::Overflow {
      required: 8,
      remaining: 6
    }
  );
  assert_eq!(buffer.position(), 0);
  assert_eq!(buffer.as_slice(), &[0u8; 6]);
}

#[rstest]
#[case(-1)]
#[case(i32::MIN)]
#[case(3)]
#[case(i32::MAX)]
fn test_read_string_rejects_malformed_length(#[case] length: i32) {
  let mut bytes = length.to_be_bytes().to_vec();
  bytes.extend_from_slice(&[0, b'a', 0, b'b']);
  let mut buffer = ByteBuffer::wrap(bytes);

  let err = buffer.read_string().unwrap_err();
  assert!(err.is_malformed());
  assert_eq!(
    err,
    BufferError::MalformedLength {
      length: i64::from(length),
      remaining: 4
    }
  );
  assert_eq!(buffer.position(), 0);
}

#[test]
fn test_read_string_rejects_lone_surrogate() {
  let mut buffer = ByteBuffer::wrap(vec![0, 0, 0, 1, 0xD8, 0x00]);
  assert_eq!(buffer.read_string().unwrap_err(), BufferError::InvalidUtf16);
  assert_eq!(buffer.position(), 0);
}

#[test]
fn test_mark_and_reset() {
  let mut buffer = ByteBuffer::new(8);
  buffer.put_i16(1).unwrap();
  buffer.mark();
  buffer.put_i32(7).unwrap();
  assert_eq!(buffer.mark_position(), Some(2));

  buffer.reset().unwrap();
  assert_eq!(buffer.position(), 2);
  assert_eq!(buffer.mark_position(), None);
  assert_eq!(buffer.reset().unwrap_err(), BufferError::InvalidState("mark is not set"));
}

#[test]
fn test_reset_without_mark_fails() {
  let mut buffer = ByteBuffer::new(4);
  assert!(matches!(buffer.reset(), Err(BufferError::InvalidState(_))));
}

#[test]
fn test_set_position_validates_and_drops_stale_mark() {
  let mut buffer = ByteBuffer::new(8);
  buffer.set_limit(4).unwrap();
  assert_eq!(
    buffer.set_position(5).unwrap_err(),
    BufferError::PositionOutOfBounds { position: 5, limit: 4 }
  );

  buffer.set_position(3).unwrap();
  buffer.mark();
  buffer.set_position(4).unwrap();
  assert_eq!(buffer.mark_position(), Some(3));
  buffer.set_position(1).unwrap();
  assert_eq!(buffer.mark_position(), None);
}

#[test]
fn test_set_limit_clamps_position_and_drops_mark() {
  let mut buffer = ByteBuffer::new(8);
  buffer.set_position(6).unwrap();
  buffer.mark();
  buffer.set_limit(3).unwrap();
  assert_eq!(buffer.limit(), 3);
  assert_eq!(buffer.position(), 3);
  assert_eq!(buffer.mark_position(), None);

  assert_eq!(
    buffer.set_limit(9).unwrap_err(),
    BufferError::LimitOutOfBounds { limit: 9, capacity: 8 }
  );
  assert_eq!(buffer.limit(), 3);
}

#[test]
fn test_flip_clear_rewind() {
  let mut buffer = ByteBuffer::new(8);
  buffer.put_i32(5).unwrap();
  buffer.mark();
  buffer.flip();
  assert_eq!((buffer.position(), buffer.limit(), buffer.mark_position()), (0, 4, None));

  buffer.get_i16().unwrap();
  buffer.mark();
  buffer.rewind();
  assert_eq!((buffer.position(), buffer.limit(), buffer.mark_position()), (0, 4, None));

  buffer.get_i16().unwrap();
  buffer.mark();
  buffer.clear();
  assert_eq!((buffer.position(), buffer.limit(), buffer.mark_position()), (0, 8, None));
}

#[test]
fn test_flip_read_clear_flip_keeps_written_span() {
  let original = [0xCA, 0xFE, 0xBA, 0xBE, 0x01];
  let mut buffer = ByteBuffer::new(8);
  buffer.put_bytes(&original).unwrap();
  buffer.flip();

  let mut read = vec![0u8; buffer.limit()];
  buffer.get_bytes(&mut read).unwrap();
  assert_eq!(read, original);

  buffer.clear().flip();
  assert_eq!(&buffer.as_slice()[..original.len()], &original);
  buffer.set_limit(original.len()).unwrap();
  assert_eq!(buffer.remaining_slice(), &original);
}

#[test]
fn test_cursor_invariant_holds_across_operations() {
  let mut buffer = ByteBuffer::new(12);
  assert_cursor_invariant(&buffer);

  buffer.put_i32(1).unwrap();
  assert_cursor_invariant(&buffer);
  buffer.mark();
  assert_cursor_invariant(&buffer);
  buffer.put_i64(2).unwrap();
  assert_cursor_invariant(&buffer);
  buffer.set_limit(6).unwrap();
  assert_cursor_invariant(&buffer);
  buffer.set_position(5).unwrap();
  assert_cursor_invariant(&buffer);
  buffer.reset().unwrap();
  assert_cursor_invariant(&buffer);
  buffer.mark();
  buffer.set_position(0).unwrap();
  assert_cursor_invariant(&buffer);
  buffer.set_limit(12).unwrap();
  buffer.set_position(12).unwrap();
  buffer.mark();
  buffer.flip();
  assert_cursor_invariant(&buffer);
  buffer.set_limit(0).unwrap();
  assert_cursor_invariant(&buffer);
  buffer.rewind();
  buffer.clear();
  assert_cursor_invariant(&buffer);
}

#[test]
fn test_absolute_i32_access_does_not_move_cursor() {
  let mut buffer = ByteBuffer::new(8);
  buffer.put_i32(0).unwrap();
  buffer.put_i32_at(0, 77).unwrap();
  assert_eq!(buffer.position(), 4);
  assert_eq!(buffer.get_i32_at(0).unwrap(), 77);
  assert_eq!(
    buffer.get_i32_at(5).unwrap_err(),
    BufferError::IndexOutOfBounds {
      index: 5,
      width: 4,
      limit: 8
    }
  );
  assert!(buffer.put_i32_at(usize::MAX, 1).is_err());
}

#[test]
fn test_into_inner_returns_backing_store() {
  let mut buffer = ByteBuffer::new(2);
  buffer.put_i16(0x0A0B).unwrap();
  assert_eq!(buffer.into_inner(), vec![0x0A, 0x0B]);
}

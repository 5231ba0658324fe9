//! Bounds-checked, single-pass reader over one inbound message body.

use thiserror::Error;

/// Errors raised while reading fields out of a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WireError {
    /// A read would run past the end of the buffer.
    #[error("read of {requested} bytes at offset {position} exceeds buffer ({available} bytes left)")]
    OutOfBounds {
        position: usize,
        requested: usize,
        available: usize,
    },
}

pub type WireResult<T> = Result<T, WireError>;

/// Sequential little-endian reader.
///
/// Every read advances the cursor by the width of the field. A failed read
/// leaves the position untouched; callers are expected to abandon the
/// message rather than retry.
#[derive(Debug)]
pub struct WireCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> WireCursor<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Current offset from the start of the body.
    pub const fn position(&self) -> usize {
        self.position
    }

    pub const fn bytes_remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.position)
    }

    pub const fn is_empty(&self) -> bool {
        self.bytes_remaining() == 0
    }

    pub fn read_u8(&mut self) -> WireResult<u8> {
        Ok(self.take::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> WireResult<i8> {
        Ok(i8::from_le_bytes(self.take::<1>()?))
    }

    pub fn read_u16(&mut self) -> WireResult<u16> {
        Ok(u16::from_le_bytes(self.take::<2>()?))
    }

    pub fn read_i16(&mut self) -> WireResult<i16> {
        Ok(i16::from_le_bytes(self.take::<2>()?))
    }

    pub fn read_u32(&mut self) -> WireResult<u32> {
        Ok(u32::from_le_bytes(self.take::<4>()?))
    }

    pub fn read_i32(&mut self) -> WireResult<i32> {
        Ok(i32::from_le_bytes(self.take::<4>()?))
    }

    /// Skips `count` bytes (card slots, refine levels and other fields the
    /// model has no use for).
    pub fn skip(&mut self, count: usize) -> WireResult<()> {
        self.ensure(count)?;
        self.position += count;
        Ok(())
    }

    fn ensure(&self, requested: usize) -> WireResult<()> {
        let available = self.bytes_remaining();
        if requested > available {
            return Err(WireError::OutOfBounds {
                position: self.position,
                requested,
                available,
            });
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> WireResult<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.position..self.position + N]);
        self.position += N;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u8_and_i8() {
        let bytes = [42u8, 255, 128];
        let mut cursor = WireCursor::new(&bytes);

        assert_eq!(cursor.read_u8(), Ok(42));
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.read_i8(), Ok(-1));
        assert_eq!(cursor.read_i8(), Ok(-128));
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_read_16_bit_little_endian() {
        let bytes = [0x01, 0x02, 0xFF, 0xFF, 0x00, 0x80];
        let mut cursor = WireCursor::new(&bytes);

        assert_eq!(cursor.read_u16(), Ok(0x0201));
        assert_eq!(cursor.read_i16(), Ok(-1));
        assert_eq!(cursor.read_i16(), Ok(-32768));
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn test_read_32_bit_little_endian() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut cursor = WireCursor::new(&bytes);

        assert_eq!(cursor.read_u32(), Ok(0x0403_0201));
        assert_eq!(cursor.read_i32(), Ok(-1));
        assert_eq!(cursor.bytes_remaining(), 0);
    }

    #[test]
    fn test_mixed_reads_and_skip() {
        let bytes = [
            0x42, // u8
            0xAA, 0xBB, 0xCC, // skipped
            0x34, 0x12, // u16
            0x78, 0x56, 0x34, 0x12, // u32
        ];
        let mut cursor = WireCursor::new(&bytes);

        assert_eq!(cursor.read_u8(), Ok(0x42));
        cursor.skip(3).unwrap();
        assert_eq!(cursor.read_u16(), Ok(0x1234));
        assert_eq!(cursor.read_u32(), Ok(0x1234_5678));
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_out_of_bounds_reports_position() {
        let bytes = [0x01, 0x02, 0x03];
        let mut cursor = WireCursor::new(&bytes);
        cursor.read_u16().unwrap();

        assert_eq!(
            cursor.read_i32(),
            Err(WireError::OutOfBounds {
                position: 2,
                requested: 4,
                available: 1,
            })
        );
        // Failed reads do not move the cursor.
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.read_u8(), Ok(0x03));
    }

    #[test]
    fn test_skip_past_end_fails() {
        let bytes = [0u8; 4];
        let mut cursor = WireCursor::new(&bytes);
        assert!(matches!(
            cursor.skip(5),
            Err(WireError::OutOfBounds { requested: 5, .. })
        ));
        assert_eq!(cursor.bytes_remaining(), 4);
    }

    #[test]
    fn test_empty_buffer() {
        let mut cursor = WireCursor::new(&[]);
        assert!(cursor.is_empty());
        assert!(cursor.read_u8().is_err());
        assert!(cursor.skip(0).is_ok());
    }

    #[test]
    fn error_display_mentions_sizes() {
        let err = WireError::OutOfBounds {
            position: 7,
            requested: 2,
            available: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("2 bytes"));
        assert!(msg.contains("offset 7"));
        assert!(msg.contains("1 bytes left"));
    }
}

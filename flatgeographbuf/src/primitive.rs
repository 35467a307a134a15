//! Little-endian primitive codec.
//!
//! Every multi-byte integer and float in this format is little-endian;
//! signed integers are two's complement; UTF-8 strings carry no BOM and no
//! null terminator, with their byte length carried separately. This module
//! is the single place that knows that.

use crate::error::FggReadError;

/// A read-only cursor over a borrowed byte slice.
///
/// Reads advance the cursor and fail with [`FggReadError::Truncated`] rather
/// than panicking once the buffer is exhausted - there is no other way for a
/// malformed or cut-off tile to surface itself.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], FggReadError> {
        if self.remaining() < len {
            return Err(FggReadError::Truncated {
                needed: len,
                available: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.bytes[start..self.pos])
    }

    pub fn read_u8(&mut self) -> Result<u8, FggReadError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, FggReadError> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool, FggReadError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16, FggReadError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_i16(&mut self) -> Result<i16, FggReadError> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, FggReadError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, FggReadError> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_u64(&mut self) -> Result<u64, FggReadError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    pub fn read_i64(&mut self) -> Result<i64, FggReadError> {
        Ok(self.read_u64()? as i64)
    }

    pub fn read_f32(&mut self) -> Result<f32, FggReadError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, FggReadError> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Reads `len` raw bytes, copied out of the source buffer.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, FggReadError> {
        Ok(self.take(len)?.to_vec())
    }

    /// Reads `len` raw bytes as a borrowed slice, without copying.
    ///
    /// Callers must not retain this past the next cursor operation if they
    /// need it to outlive the source buffer's lifetime; see the borrow
    /// discussion in the crate's module docs.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], FggReadError> {
        self.take(len)
    }

    /// Reads a `[len: u32][bytes]`-framed raw byte array.
    pub fn read_length_prefixed_bytes(&mut self) -> Result<Vec<u8>, FggReadError> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }

    /// Reads a `[len: u32][utf-8 bytes]`-framed string.
    ///
    /// Invalid UTF-8 is replaced lossily rather than rejected outright; the
    /// format does not define a dedicated encoding error for this case.
    pub fn read_length_prefixed_string(&mut self) -> Result<String, FggReadError> {
        let bytes = self.read_length_prefixed_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads a `[len: u16][utf-8 bytes]`-framed string (used for column names).
    pub fn read_short_length_prefixed_string(&mut self) -> Result<String, FggReadError> {
        let len = self.read_u16()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Appends `value` (a `[len: u32][bytes]`-framed byte array) to `out`.
pub fn write_length_prefixed_bytes(out: &mut Vec<u8>, value: &[u8]) {
    out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    out.extend_from_slice(value);
}

/// Appends `value` (a `[len: u32][utf-8 bytes]`-framed string) to `out`.
pub fn write_length_prefixed_str(out: &mut Vec<u8>, value: &str) {
    write_length_prefixed_bytes(out, value.as_bytes());
}

/// Appends `value` (a `[len: u16][utf-8 bytes]`-framed string) to `out`.
pub fn write_short_length_prefixed_str(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(&(value.len() as u16).to_le_bytes());
    out.extend_from_slice(value.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_fixed_width_primitives() {
        let mut out = Vec::new();
        out.extend_from_slice(&42u8.to_le_bytes());
        out.extend_from_slice(&(-5i8).to_le_bytes());
        out.extend_from_slice(&1234u16.to_le_bytes());
        out.extend_from_slice(&(-1234i16).to_le_bytes());
        out.extend_from_slice(&123_456_789u32.to_le_bytes());
        out.extend_from_slice(&(-123_456_789i32).to_le_bytes());
        out.extend_from_slice(&123_456_789_012u64.to_le_bytes());
        out.extend_from_slice(&(-123_456_789_012i64).to_le_bytes());
        out.extend_from_slice(&3.14f32.to_le_bytes());
        out.extend_from_slice(&2.71828f64.to_le_bytes());

        let mut cur = Cursor::new(&out);
        assert_eq!(cur.read_u8().unwrap(), 42);
        assert_eq!(cur.read_i8().unwrap(), -5);
        assert_eq!(cur.read_u16().unwrap(), 1234);
        assert_eq!(cur.read_i16().unwrap(), -1234);
        assert_eq!(cur.read_u32().unwrap(), 123_456_789);
        assert_eq!(cur.read_i32().unwrap(), -123_456_789);
        assert_eq!(cur.read_u64().unwrap(), 123_456_789_012);
        assert_eq!(cur.read_i64().unwrap(), -123_456_789_012);
        assert!((cur.read_f32().unwrap() - 3.14f32).abs() < f32::EPSILON);
        assert!((cur.read_f64().unwrap() - 2.71828f64).abs() < f64::EPSILON);
        assert!(cur.is_empty());
    }

    #[test]
    fn truncated_read_fails_instead_of_panicking() {
        let buf = [1u8, 2, 3];
        let mut cur = Cursor::new(&buf);
        let err = cur.read_u32().unwrap_err();
        assert!(matches!(
            err,
            FggReadError::Truncated {
                needed: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn length_prefixed_strings_round_trip() {
        let mut out = Vec::new();
        write_length_prefixed_str(&mut out, "hello world");
        write_short_length_prefixed_str(&mut out, "weight");

        let mut cur = Cursor::new(&out);
        assert_eq!(cur.read_length_prefixed_string().unwrap(), "hello world");
        assert_eq!(cur.read_short_length_prefixed_string().unwrap(), "weight");
    }
}

//! Endian-aware reading of fixed-width integers and floats out of a byte
//! buffer.

use byteorder::ByteOrder;

use crate::transfer_syntax::Endianness;

/// Reads fixed-width values at absolute positions in a borrowed byte buffer,
/// interpreting them as either little endian or big endian depending on the
/// active transfer syntax. Reads that would extend past the end of the buffer
/// return an error. There is no internal state beyond the endianness, so a
/// byte reader is freely copyable.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ByteReader {
  endianness: Endianness,
}

impl ByteReader {
  /// Creates a new byte reader with the given endianness.
  ///
  pub fn new(endianness: Endianness) -> Self {
    Self { endianness }
  }

  /// Returns the endianness of this byte reader.
  ///
  pub fn endianness(&self) -> Endianness {
    self.endianness
  }

  /// Reads a `u16` at the given position in the buffer.
  ///
  #[allow(clippy::result_unit_err)]
  pub fn read_u16(&self, bytes: &[u8], position: usize) -> Result<u16, ()> {
    let data = checked_slice(bytes, position, 2)?;

    match self.endianness {
      Endianness::LittleEndian => Ok(byteorder::LittleEndian::read_u16(data)),
      Endianness::BigEndian => Ok(byteorder::BigEndian::read_u16(data)),
    }
  }

  /// Reads an `i16` at the given position in the buffer.
  ///
  #[allow(clippy::result_unit_err)]
  pub fn read_i16(&self, bytes: &[u8], position: usize) -> Result<i16, ()> {
    let data = checked_slice(bytes, position, 2)?;

    match self.endianness {
      Endianness::LittleEndian => Ok(byteorder::LittleEndian::read_i16(data)),
      Endianness::BigEndian => Ok(byteorder::BigEndian::read_i16(data)),
    }
  }

  /// Reads a `u32` at the given position in the buffer.
  ///
  #[allow(clippy::result_unit_err)]
  pub fn read_u32(&self, bytes: &[u8], position: usize) -> Result<u32, ()> {
    let data = checked_slice(bytes, position, 4)?;

    match self.endianness {
      Endianness::LittleEndian => Ok(byteorder::LittleEndian::read_u32(data)),
      Endianness::BigEndian => Ok(byteorder::BigEndian::read_u32(data)),
    }
  }

  /// Reads an `i32` at the given position in the buffer.
  ///
  #[allow(clippy::result_unit_err)]
  pub fn read_i32(&self, bytes: &[u8], position: usize) -> Result<i32, ()> {
    let data = checked_slice(bytes, position, 4)?;

    match self.endianness {
      Endianness::LittleEndian => Ok(byteorder::LittleEndian::read_i32(data)),
      Endianness::BigEndian => Ok(byteorder::BigEndian::read_i32(data)),
    }
  }

  /// Reads an `f32` at the given position in the buffer.
  ///
  #[allow(clippy::result_unit_err)]
  pub fn read_f32(&self, bytes: &[u8], position: usize) -> Result<f32, ()> {
    let data = checked_slice(bytes, position, 4)?;

    match self.endianness {
      Endianness::LittleEndian => Ok(byteorder::LittleEndian::read_f32(data)),
      Endianness::BigEndian => Ok(byteorder::BigEndian::read_f32(data)),
    }
  }

  /// Reads an `f64` at the given position in the buffer.
  ///
  #[allow(clippy::result_unit_err)]
  pub fn read_f64(&self, bytes: &[u8], position: usize) -> Result<f64, ()> {
    let data = checked_slice(bytes, position, 8)?;

    match self.endianness {
      Endianness::LittleEndian => Ok(byteorder::LittleEndian::read_f64(data)),
      Endianness::BigEndian => Ok(byteorder::BigEndian::read_f64(data)),
    }
  }
}

/// Returns the `width` bytes starting at `position`, or an error if that range
/// extends past the end of the buffer.
///
fn checked_slice(
  bytes: &[u8],
  position: usize,
  width: usize,
) -> Result<&[u8], ()> {
  if width > bytes.len() || position > bytes.len() - width {
    return Err(());
  }

  Ok(&bytes[position..position + width])
}

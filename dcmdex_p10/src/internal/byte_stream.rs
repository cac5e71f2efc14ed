use std::rc::Rc;

use dcmdex_core::transfer_syntax::Endianness;
use dcmdex_core::ByteReader;

/// A byte stream over an in-memory buffer of DICOM P10 data. The stream
/// tracks a cursor position, interprets multi-byte reads with the endianness
/// of the active transfer syntax, and accumulates the warnings recorded while
/// parsing.
///
/// The buffer is shared by reference counting so that data sets built while
/// reading the stream can index into it without copying. Bounded sub-ranges
/// of the stream (sequence items, the instance body) are walked by passing an
/// explicit end position rather than by carving out sub-streams, which keeps
/// every recorded offset absolute.
///
#[derive(Debug)]
pub struct ByteStream {
  buffer: Rc<Vec<u8>>,
  byte_reader: ByteReader,
  position: usize,
  warnings: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ByteStreamError {
  /// A read was not performed because it would go past the end of the byte
  /// stream.
  DataEnd,

  /// A seek was not performed because its target lies outside the byte
  /// stream.
  SeekInvalid,
}

impl ByteStream {
  /// Creates a new byte stream over the given buffer, positioned at its
  /// start.
  ///
  pub fn new(buffer: Rc<Vec<u8>>, endianness: Endianness) -> ByteStream {
    ByteStream {
      buffer,
      byte_reader: ByteReader::new(endianness),
      position: 0,
      warnings: vec![],
    }
  }

  /// Returns a shared reference to the buffer this stream reads from.
  ///
  pub fn buffer(&self) -> Rc<Vec<u8>> {
    self.buffer.clone()
  }

  /// Returns the total size in bytes of the stream.
  ///
  pub fn size(&self) -> usize {
    self.buffer.len()
  }

  /// Returns the current position of the stream.
  ///
  pub fn position(&self) -> usize {
    self.position
  }

  /// Returns the number of bytes between the current position and the end of
  /// the stream.
  ///
  pub fn bytes_remaining(&self) -> usize {
    self.buffer.len() - self.position
  }

  /// Returns the byte reader that reads on this stream use.
  ///
  pub fn byte_reader(&self) -> ByteReader {
    self.byte_reader
  }

  /// Changes the endianness used by subsequent reads. Endianness is state at
  /// stream scope: it changes when the transfer syntax for the instance body
  /// is resolved, and temporarily around sub-parses that are mandated to be
  /// little endian.
  ///
  pub fn set_endianness(&mut self, endianness: Endianness) {
    self.byte_reader = ByteReader::new(endianness);
  }

  /// Moves the stream position by the given signed offset. Fails if the
  /// target position lies outside `[0, size]`.
  ///
  pub fn seek(&mut self, offset: i64) -> Result<(), ByteStreamError> {
    let target = self.position as i64 + offset;

    if target < 0 || target > self.buffer.len() as i64 {
      return Err(ByteStreamError::SeekInvalid);
    }

    self.position = target as usize;

    Ok(())
  }

  /// Reads a `u16` at the current position and advances past it.
  ///
  pub fn read_u16(&mut self) -> Result<u16, ByteStreamError> {
    let value = self
      .byte_reader
      .read_u16(&self.buffer, self.position)
      .map_err(|_| ByteStreamError::DataEnd)?;

    self.position += 2;

    Ok(value)
  }

  /// Reads a `u32` at the current position and advances past it.
  ///
  pub fn read_u32(&mut self) -> Result<u32, ByteStreamError> {
    let value = self
      .byte_reader
      .read_u32(&self.buffer, self.position)
      .map_err(|_| ByteStreamError::DataEnd)?;

    self.position += 4;

    Ok(value)
  }

  /// Reads `byte_count` raw bytes at the current position and advances past
  /// them.
  ///
  pub fn read_bytes(
    &mut self,
    byte_count: usize,
  ) -> Result<Vec<u8>, ByteStreamError> {
    if byte_count > self.bytes_remaining() {
      return Err(ByteStreamError::DataEnd);
    }

    let bytes = self.buffer[self.position..self.position + byte_count].to_vec();

    self.position += byte_count;

    Ok(bytes)
  }

  /// Consumes `byte_count` bytes and returns the string they contain, cut at
  /// the first NUL byte. Everything after the first NUL is discarded from the
  /// string but is still consumed from the stream.
  ///
  pub fn read_fixed_string(
    &mut self,
    byte_count: usize,
  ) -> Result<String, ByteStreamError> {
    let bytes = self.read_bytes(byte_count)?;

    let bytes = match bytes.iter().position(|b| *b == 0) {
      Some(nul) => &bytes[..nul],
      None => bytes.as_slice(),
    };

    Ok(String::from_utf8_lossy(bytes).into_owned())
  }

  /// Appends a warning to the stream's warning log. This never fails; one log
  /// is threaded through the entire parse and copied onto the finished data
  /// set.
  ///
  pub fn add_warning(&mut self, warning: String) {
    self.warnings.push(warning);
  }

  /// Takes ownership of the accumulated warnings, leaving the log empty.
  ///
  pub fn take_warnings(&mut self) -> Vec<String> {
    std::mem::take(&mut self.warnings)
  }

  /// Returns the accumulated warnings.
  ///
  pub fn warnings(&self) -> &[String] {
    &self.warnings
  }

  /// Replaces the warning log, used to carry warnings over when the parse
  /// switches to an inflated buffer.
  ///
  pub fn set_warnings(&mut self, warnings: Vec<String>) {
    self.warnings = warnings;
  }
}

use dcmdex_core::{DataElementTag, ValueRepresentation};

use crate::internal::byte_stream::{ByteStream, ByteStreamError};
use crate::internal::value_length::ValueLength;

/// Describes the header for a single DICOM data element, specifically its tag,
/// VR, and length in bytes. The VR is optional because implicit VR data and
/// the item and delimitation tags don't carry one.
///
pub struct DataElementHeader {
  pub tag: DataElementTag,
  pub vr: Option<ValueRepresentation>,
  pub length: ValueLength,
}

impl std::fmt::Display for DataElementHeader {
  /// Converts a data element header to a human-readable string in the format
  /// `"(GROUP,ELEMENT) VR"`, e.g. `"(0008,0020) DA"`.
  ///
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self.vr {
      Some(vr) => write!(f, "{} {}", self.tag, vr),
      _ => write!(f, "{}", self.tag),
    }
  }
}

/// The two possibilities for the size of the value length for a VR stored in
/// the DICOM P10 format.
///
pub enum ValueLengthSize {
  U16,
  U32,
}

impl DataElementHeader {
  /// Returns the size of the value length for a VR stored in the DICOM P10
  /// format.
  ///
  pub fn value_length_size(vr: ValueRepresentation) -> ValueLengthSize {
    match vr {
      ValueRepresentation::AgeString
      | ValueRepresentation::ApplicationEntity
      | ValueRepresentation::AttributeTag
      | ValueRepresentation::CodeString
      | ValueRepresentation::Date
      | ValueRepresentation::DateTime
      | ValueRepresentation::DecimalString
      | ValueRepresentation::FloatingPointDouble
      | ValueRepresentation::FloatingPointSingle
      | ValueRepresentation::IntegerString
      | ValueRepresentation::LongString
      | ValueRepresentation::LongText
      | ValueRepresentation::PersonName
      | ValueRepresentation::ShortString
      | ValueRepresentation::ShortText
      | ValueRepresentation::SignedLong
      | ValueRepresentation::SignedShort
      | ValueRepresentation::Time
      | ValueRepresentation::UniqueIdentifier
      | ValueRepresentation::UnsignedLong
      | ValueRepresentation::UnsignedShort => ValueLengthSize::U16,

      ValueRepresentation::OtherByteString
      | ValueRepresentation::OtherDoubleString
      | ValueRepresentation::OtherFloatString
      | ValueRepresentation::OtherLongString
      | ValueRepresentation::OtherVeryLongString
      | ValueRepresentation::OtherWordString
      | ValueRepresentation::Sequence
      | ValueRepresentation::SignedVeryLong
      | ValueRepresentation::UniversalResourceIdentifier
      | ValueRepresentation::Unknown
      | ValueRepresentation::UnlimitedCharacters
      | ValueRepresentation::UnlimitedText
      | ValueRepresentation::UnsignedVeryLong => ValueLengthSize::U32,
    }
  }
}

/// Reads a data element tag at the stream's current position: two `u16`s,
/// group then element, in the stream's active endianness.
///
pub fn read_tag(
  stream: &mut ByteStream,
) -> Result<DataElementTag, ByteStreamError> {
  let group = stream.read_u16()?;
  let element = stream.read_u16()?;

  Ok(DataElementTag::new(group, element))
}

/// Reads the data element tag at the stream's current position without
/// advancing the stream.
///
pub fn peek_tag(
  stream: &mut ByteStream,
) -> Result<DataElementTag, ByteStreamError> {
  let tag = read_tag(stream)?;

  stream.seek(-4)?;

  Ok(tag)
}

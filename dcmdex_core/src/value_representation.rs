//! DICOM value representations (VRs).
//!
//! See [section 6.2](https://dicom.nema.org/medical/dicom/current/output/chtml/part05/sect_6.2.html)
//! of the DICOM specification for VR definitions.

/// All DICOM value representations (VRs).
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValueRepresentation {
  AgeString,
  ApplicationEntity,
  AttributeTag,
  CodeString,
  Date,
  DateTime,
  DecimalString,
  FloatingPointDouble,
  FloatingPointSingle,
  IntegerString,
  LongString,
  LongText,
  OtherByteString,
  OtherDoubleString,
  OtherFloatString,
  OtherLongString,
  OtherVeryLongString,
  OtherWordString,
  PersonName,
  Sequence,
  ShortString,
  ShortText,
  SignedLong,
  SignedShort,
  SignedVeryLong,
  Time,
  UniqueIdentifier,
  UniversalResourceIdentifier,
  Unknown,
  UnlimitedCharacters,
  UnlimitedText,
  UnsignedLong,
  UnsignedShort,
  UnsignedVeryLong,
}

impl std::fmt::Display for ValueRepresentation {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    f.write_str(unsafe { std::str::from_utf8_unchecked(&self.to_bytes()) })
  }
}

impl ValueRepresentation {
  /// Converts a two-byte character representation, e.g. `b"DA"`, into a value
  /// representation.
  ///
  #[allow(clippy::result_unit_err)]
  pub fn from_bytes(bytes: &[u8]) -> Result<Self, ()> {
    match bytes {
      b"AE" => Ok(ValueRepresentation::ApplicationEntity),
      b"AS" => Ok(ValueRepresentation::AgeString),
      b"AT" => Ok(ValueRepresentation::AttributeTag),
      b"CS" => Ok(ValueRepresentation::CodeString),
      b"DA" => Ok(ValueRepresentation::Date),
      b"DS" => Ok(ValueRepresentation::DecimalString),
      b"DT" => Ok(ValueRepresentation::DateTime),
      b"FD" => Ok(ValueRepresentation::FloatingPointDouble),
      b"FL" => Ok(ValueRepresentation::FloatingPointSingle),
      b"IS" => Ok(ValueRepresentation::IntegerString),
      b"LO" => Ok(ValueRepresentation::LongString),
      b"LT" => Ok(ValueRepresentation::LongText),
      b"OB" => Ok(ValueRepresentation::OtherByteString),
      b"OD" => Ok(ValueRepresentation::OtherDoubleString),
      b"OF" => Ok(ValueRepresentation::OtherFloatString),
      b"OL" => Ok(ValueRepresentation::OtherLongString),
      b"OV" => Ok(ValueRepresentation::OtherVeryLongString),
      b"OW" => Ok(ValueRepresentation::OtherWordString),
      b"PN" => Ok(ValueRepresentation::PersonName),
      b"SH" => Ok(ValueRepresentation::ShortString),
      b"SL" => Ok(ValueRepresentation::SignedLong),
      b"SQ" => Ok(ValueRepresentation::Sequence),
      b"SS" => Ok(ValueRepresentation::SignedShort),
      b"ST" => Ok(ValueRepresentation::ShortText),
      b"SV" => Ok(ValueRepresentation::SignedVeryLong),
      b"TM" => Ok(ValueRepresentation::Time),
      b"UC" => Ok(ValueRepresentation::UnlimitedCharacters),
      b"UI" => Ok(ValueRepresentation::UniqueIdentifier),
      b"UL" => Ok(ValueRepresentation::UnsignedLong),
      b"UN" => Ok(ValueRepresentation::Unknown),
      b"UR" => Ok(ValueRepresentation::UniversalResourceIdentifier),
      b"US" => Ok(ValueRepresentation::UnsignedShort),
      b"UT" => Ok(ValueRepresentation::UnlimitedText),
      b"UV" => Ok(ValueRepresentation::UnsignedVeryLong),

      _ => Err(()),
    }
  }

  /// Converts a value representation to its two-byte character representation.
  ///
  pub fn to_bytes(&self) -> [u8; 2] {
    *match self {
      ValueRepresentation::AgeString => b"AS",
      ValueRepresentation::ApplicationEntity => b"AE",
      ValueRepresentation::AttributeTag => b"AT",
      ValueRepresentation::CodeString => b"CS",
      ValueRepresentation::Date => b"DA",
      ValueRepresentation::DateTime => b"DT",
      ValueRepresentation::DecimalString => b"DS",
      ValueRepresentation::FloatingPointDouble => b"FD",
      ValueRepresentation::FloatingPointSingle => b"FL",
      ValueRepresentation::IntegerString => b"IS",
      ValueRepresentation::LongString => b"LO",
      ValueRepresentation::LongText => b"LT",
      ValueRepresentation::OtherByteString => b"OB",
      ValueRepresentation::OtherDoubleString => b"OD",
      ValueRepresentation::OtherFloatString => b"OF",
      ValueRepresentation::OtherLongString => b"OL",
      ValueRepresentation::OtherVeryLongString => b"OV",
      ValueRepresentation::OtherWordString => b"OW",
      ValueRepresentation::PersonName => b"PN",
      ValueRepresentation::Sequence => b"SQ",
      ValueRepresentation::ShortString => b"SH",
      ValueRepresentation::ShortText => b"ST",
      ValueRepresentation::SignedLong => b"SL",
      ValueRepresentation::SignedShort => b"SS",
      ValueRepresentation::SignedVeryLong => b"SV",
      ValueRepresentation::Time => b"TM",
      ValueRepresentation::UniqueIdentifier => b"UI",
      ValueRepresentation::UniversalResourceIdentifier => b"UR",
      ValueRepresentation::Unknown => b"UN",
      ValueRepresentation::UnlimitedCharacters => b"UC",
      ValueRepresentation::UnlimitedText => b"UT",
      ValueRepresentation::UnsignedLong => b"UL",
      ValueRepresentation::UnsignedShort => b"US",
      ValueRepresentation::UnsignedVeryLong => b"UV",
    }
  }

  /// Returns the human-readable name of a value representation, e.g.
  /// `CodeString`, `AttributeTag`.
  ///
  pub fn name(&self) -> &'static str {
    match self {
      ValueRepresentation::AgeString => "AgeString",
      ValueRepresentation::ApplicationEntity => "ApplicationEntity",
      ValueRepresentation::AttributeTag => "AttributeTag",
      ValueRepresentation::CodeString => "CodeString",
      ValueRepresentation::Date => "Date",
      ValueRepresentation::DateTime => "DateTime",
      ValueRepresentation::DecimalString => "DecimalString",
      ValueRepresentation::FloatingPointDouble => "FloatingPointDouble",
      ValueRepresentation::FloatingPointSingle => "FloatingPointSingle",
      ValueRepresentation::IntegerString => "IntegerString",
      ValueRepresentation::LongString => "LongString",
      ValueRepresentation::LongText => "LongText",
      ValueRepresentation::OtherByteString => "OtherByteString",
      ValueRepresentation::OtherDoubleString => "OtherDoubleString",
      ValueRepresentation::OtherFloatString => "OtherFloatString",
      ValueRepresentation::OtherLongString => "OtherLongString",
      ValueRepresentation::OtherVeryLongString => "OtherVeryLongString",
      ValueRepresentation::OtherWordString => "OtherWordString",
      ValueRepresentation::PersonName => "PersonName",
      ValueRepresentation::Sequence => "Sequence",
      ValueRepresentation::ShortString => "ShortString",
      ValueRepresentation::ShortText => "ShortText",
      ValueRepresentation::SignedLong => "SignedLong",
      ValueRepresentation::SignedShort => "SignedShort",
      ValueRepresentation::SignedVeryLong => "SignedVeryLong",
      ValueRepresentation::Time => "Time",
      ValueRepresentation::UniqueIdentifier => "UniqueIdentifier",
      ValueRepresentation::UniversalResourceIdentifier => {
        "UniversalResourceIdentifier"
      }
      ValueRepresentation::Unknown => "Unknown",
      ValueRepresentation::UnlimitedCharacters => "UnlimitedCharacters",
      ValueRepresentation::UnlimitedText => "UnlimitedText",
      ValueRepresentation::UnsignedLong => "UnsignedLong",
      ValueRepresentation::UnsignedShort => "UnsignedShort",
      ValueRepresentation::UnsignedVeryLong => "UnsignedVeryLong",
    }
  }

  /// Returns whether a value representation stores string data.
  ///
  pub fn is_string(self) -> bool {
    self == ValueRepresentation::AgeString
      || self == ValueRepresentation::ApplicationEntity
      || self == ValueRepresentation::CodeString
      || self == ValueRepresentation::Date
      || self == ValueRepresentation::DateTime
      || self == ValueRepresentation::DecimalString
      || self == ValueRepresentation::IntegerString
      || self == ValueRepresentation::LongString
      || self == ValueRepresentation::LongText
      || self == ValueRepresentation::PersonName
      || self == ValueRepresentation::ShortString
      || self == ValueRepresentation::ShortText
      || self == ValueRepresentation::Time
      || self == ValueRepresentation::UniqueIdentifier
      || self == ValueRepresentation::UniversalResourceIdentifier
      || self == ValueRepresentation::UnlimitedCharacters
      || self == ValueRepresentation::UnlimitedText
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_bytes_test() {
    assert_eq!(
      ValueRepresentation::from_bytes(b"PN"),
      Ok(ValueRepresentation::PersonName)
    );

    assert_eq!(ValueRepresentation::from_bytes(b"XY"), Err(()));
    assert_eq!(ValueRepresentation::from_bytes(b"\x00\x00"), Err(()));
  }

  #[test]
  fn to_bytes_round_trip_test() {
    for vr in [
      ValueRepresentation::OtherByteString,
      ValueRepresentation::Sequence,
      ValueRepresentation::UniqueIdentifier,
      ValueRepresentation::Unknown,
    ] {
      assert_eq!(ValueRepresentation::from_bytes(&vr.to_bytes()), Ok(vr));
    }
  }

  #[test]
  fn to_string_test() {
    assert_eq!(ValueRepresentation::DecimalString.to_string(), "DS");
    assert_eq!(ValueRepresentation::Sequence.to_string(), "SQ");
  }

  #[test]
  fn is_string_test() {
    assert!(ValueRepresentation::PersonName.is_string());
    assert!(ValueRepresentation::UniqueIdentifier.is_string());

    assert!(!ValueRepresentation::OtherByteString.is_string());
    assert!(!ValueRepresentation::Sequence.is_string());
  }
}

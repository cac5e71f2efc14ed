//! A data element descriptor that locates, types, and delimits one encoded
//! value inside the buffer it was parsed from. Data element descriptors are
//! usually stored in a [`DataSet`] which maps data element tags to them.

use crate::{DataElementTag, DataError, DataSet, ValueRepresentation};

/// A single data element parsed out of DICOM P10 data. Rather than owning a
/// copy of its value, a data element records where the value lives in the
/// source buffer:
///
/// 1. Binary elements cover the byte range
///    `[data_offset, data_offset + length)`.
///
/// 2. Sequence elements additionally carry their parsed items, each of which
///    holds a nested data set.
///
/// 3. Encapsulated pixel data elements carry the basic offset table and one
///    descriptor per fragment.
///
/// For elements that were stored with the undefined length sentinel
/// `0xFFFFFFFF`, `length` holds the computed distance from `data_offset` to
/// the byte following the last value byte, i.e. delimiters consumed by the
/// parser are excluded, and `had_undefined_length` is set.
///
#[derive(Clone, Debug, PartialEq)]
pub struct DataElement {
  pub tag: DataElementTag,
  pub vr: Option<ValueRepresentation>,
  pub length: usize,
  pub data_offset: usize,
  pub had_undefined_length: bool,
  pub value: DataElementValue,
}

/// The three shapes a data element's value can take. Most elements are plain
/// binary values; only sequences and encapsulated pixel data carry extra
/// structure.
///
#[derive(Clone, Debug, PartialEq)]
pub enum DataElementValue {
  Binary,

  Sequence {
    items: Vec<SequenceItem>,
  },

  EncapsulatedPixelData {
    basic_offset_table: Vec<u32>,
    fragments: Vec<PixelDataFragment>,
  },
}

/// One item of a sequence: a nested data set together with the byte range it
/// was parsed from. `length` excludes the item delimitation item for
/// undefined-length items.
///
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceItem {
  pub data_offset: usize,
  pub length: usize,
  pub had_undefined_length: bool,
  pub data_set: DataSet,
}

/// One fragment of encapsulated pixel data. `offset` is measured from the end
/// of the basic offset table item, such that the first fragment's item tag is
/// at offset zero; this is the coordinate system the basic offset table's
/// entries use. `position` is the absolute buffer offset of the fragment's
/// first data byte, with the item tag and length field excluded.
///
#[derive(Clone, Debug, PartialEq)]
pub struct PixelDataFragment {
  pub offset: usize,
  pub position: usize,
  pub length: usize,
}

impl DataElement {
  /// Creates a new binary data element descriptor.
  ///
  pub fn new(
    tag: DataElementTag,
    vr: Option<ValueRepresentation>,
    length: usize,
    data_offset: usize,
    had_undefined_length: bool,
  ) -> Self {
    Self {
      tag,
      vr,
      length,
      data_offset,
      had_undefined_length,
      value: DataElementValue::Binary,
    }
  }

  /// Returns whether this data element holds a sequence.
  ///
  pub fn is_sequence(&self) -> bool {
    matches!(self.value, DataElementValue::Sequence { .. })
  }

  /// Returns the items of this data element's sequence. Returns an error if
  /// the element does not hold a sequence.
  ///
  pub fn sequence_items(&self) -> Result<&[SequenceItem], DataError> {
    match &self.value {
      DataElementValue::Sequence { items } => Ok(items),

      _ => Err(DataError::ValueNotPresent { tag: self.tag }),
    }
  }

  /// Returns the basic offset table and fragment descriptors of this data
  /// element's encapsulated pixel data. Returns an error if the element does
  /// not hold encapsulated pixel data.
  ///
  pub fn encapsulated_pixel_data(
    &self,
  ) -> Result<(&[u32], &[PixelDataFragment]), DataError> {
    match &self.value {
      DataElementValue::EncapsulatedPixelData {
        basic_offset_table,
        fragments,
      } => Ok((basic_offset_table, fragments)),

      _ => Err(DataError::ValueNotPresent { tag: self.tag }),
    }
  }
}

impl std::fmt::Display for DataElement {
  /// Converts a data element to a human-readable string in the format
  /// `"(GROUP,ELEMENT) VR, N bytes"`, e.g. `"(0010,0010) PN, 8 bytes"`.
  ///
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self.vr {
      Some(vr) => write!(f, "{} {}, {} bytes", self.tag, vr, self.length),
      None => write!(f, "{}, {} bytes", self.tag, self.length),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sequence_items_test() {
    let element = DataElement::new(
      DataElementTag::new(0x0010, 0x0010),
      Some(ValueRepresentation::PersonName),
      8,
      142,
      false,
    );

    assert_eq!(
      element.sequence_items(),
      Err(DataError::ValueNotPresent {
        tag: element.tag
      })
    );
  }

  #[test]
  fn to_string_test() {
    let element = DataElement::new(
      DataElementTag::new(0x0010, 0x0010),
      Some(ValueRepresentation::PersonName),
      8,
      142,
      false,
    );

    assert_eq!(element.to_string(), "(0010,0010) PN, 8 bytes");
  }
}

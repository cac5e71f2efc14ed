//! A DICOM data set, defined as a map of data element tags to data element
//! descriptors that index into the buffer the data set was parsed from.

pub mod print;

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::{
  ByteReader, DataElement, DataElementTag, DataElementValue, DataError,
  DataSetPrintOptions,
};

/// A DICOM data set: a mapping of data element tags to data element
/// descriptors, together with the buffer those descriptors index into, the
/// byte reader strategy in effect for the data set's transfer syntax, and the
/// warnings accumulated while parsing.
///
/// A data set is populated once by a single parse and is read-only
/// thereafter. The buffer is shared with any nested sequence item data sets,
/// so cloning a data set never copies value bytes.
///
#[derive(Clone, Debug, PartialEq)]
pub struct DataSet {
  buffer: Rc<Vec<u8>>,
  byte_reader: ByteReader,
  elements: BTreeMap<DataElementTag, DataElement>,
  warnings: Vec<String>,
}

impl DataSet {
  /// Returns a new empty data set over the given buffer.
  ///
  pub fn new(buffer: Rc<Vec<u8>>, byte_reader: ByteReader) -> Self {
    Self {
      buffer,
      byte_reader,
      elements: BTreeMap::new(),
      warnings: vec![],
    }
  }

  /// Returns the buffer this data set's elements index into.
  ///
  pub fn buffer(&self) -> &[u8] {
    &self.buffer
  }

  /// Returns the byte reader in effect for this data set.
  ///
  pub fn byte_reader(&self) -> ByteReader {
    self.byte_reader
  }

  /// Returns the number of data elements in a data set.
  ///
  pub fn size(&self) -> usize {
    self.elements.len()
  }

  /// Returns whether a data set is empty and contains no data elements.
  ///
  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }

  /// Returns whether a data element with the specified tag exists in a data
  /// set.
  ///
  pub fn has(&self, tag: DataElementTag) -> bool {
    self.elements.contains_key(&tag)
  }

  /// Returns the data element with the specified tag, if present.
  ///
  pub fn get(&self, tag: DataElementTag) -> Option<&DataElement> {
    self.elements.get(&tag)
  }

  /// Inserts a data element into a data set under its tag. If there is
  /// already an element for the tag then it is replaced.
  ///
  pub fn insert(&mut self, element: DataElement) {
    self.elements.insert(element.tag, element);
  }

  /// Merges the data elements and warnings of another data set into this one.
  /// On tag collision the element from `other` wins.
  ///
  pub fn merge(&mut self, other: DataSet) {
    self.elements.extend(other.elements);
    self.warnings.extend(other.warnings);
  }

  /// Returns the tags of the data elements in this data set, in order.
  ///
  pub fn tags(&self) -> Vec<DataElementTag> {
    self.elements.keys().copied().collect()
  }

  /// Returns an iterator over the data elements in this data set, in tag
  /// order.
  ///
  pub fn iter(&self) -> impl Iterator<Item = &DataElement> {
    self.elements.values()
  }

  /// Returns the warnings recorded while this data set was parsed, in the
  /// order they occurred.
  ///
  pub fn warnings(&self) -> &[String] {
    &self.warnings
  }

  /// Appends a warning to this data set's warning list.
  ///
  pub fn add_warning(&mut self, warning: String) {
    self.warnings.push(warning);
  }

  /// Replaces this data set's warning list.
  ///
  pub fn set_warnings(&mut self, warnings: Vec<String>) {
    self.warnings = warnings;
  }

  /// Returns the data element with the specified tag, or a 'Tag not present'
  /// error.
  ///
  pub fn element(
    &self,
    tag: DataElementTag,
  ) -> Result<&DataElement, DataError> {
    self
      .elements
      .get(&tag)
      .ok_or(DataError::TagNotPresent { tag })
  }

  /// Returns the value bytes of the binary data element with the specified
  /// tag. Fails for sequences and encapsulated pixel data, and for elements
  /// whose recorded value range lies outside the buffer.
  ///
  pub fn element_bytes(
    &self,
    tag: DataElementTag,
  ) -> Result<&[u8], DataError> {
    let element = self.element(tag)?;

    match element.value {
      DataElementValue::Binary => (),
      _ => return Err(DataError::ValueNotPresent { tag }),
    };

    let end = element
      .data_offset
      .checked_add(element.length)
      .filter(|end| *end <= self.buffer.len())
      .ok_or_else(|| DataError::ValueInvalid {
        tag,
        details: "Value extends past the end of the buffer".to_string(),
      })?;

    Ok(&self.buffer[element.data_offset..end])
  }

  /// Returns the `u16` at the given value index of the data element with the
  /// specified tag.
  ///
  pub fn get_u16(
    &self,
    tag: DataElementTag,
    index: usize,
  ) -> Result<u16, DataError> {
    let (bytes, offset) = self.value_offset(tag, index, 2)?;

    self
      .byte_reader
      .read_u16(bytes, offset)
      .map_err(|_| DataError::IndexOutOfRange { tag, index })
  }

  /// Returns the `i16` at the given value index of the data element with the
  /// specified tag.
  ///
  pub fn get_i16(
    &self,
    tag: DataElementTag,
    index: usize,
  ) -> Result<i16, DataError> {
    let (bytes, offset) = self.value_offset(tag, index, 2)?;

    self
      .byte_reader
      .read_i16(bytes, offset)
      .map_err(|_| DataError::IndexOutOfRange { tag, index })
  }

  /// Returns the `u32` at the given value index of the data element with the
  /// specified tag.
  ///
  pub fn get_u32(
    &self,
    tag: DataElementTag,
    index: usize,
  ) -> Result<u32, DataError> {
    let (bytes, offset) = self.value_offset(tag, index, 4)?;

    self
      .byte_reader
      .read_u32(bytes, offset)
      .map_err(|_| DataError::IndexOutOfRange { tag, index })
  }

  /// Returns the `i32` at the given value index of the data element with the
  /// specified tag.
  ///
  pub fn get_i32(
    &self,
    tag: DataElementTag,
    index: usize,
  ) -> Result<i32, DataError> {
    let (bytes, offset) = self.value_offset(tag, index, 4)?;

    self
      .byte_reader
      .read_i32(bytes, offset)
      .map_err(|_| DataError::IndexOutOfRange { tag, index })
  }

  /// Returns the `f32` at the given value index of the data element with the
  /// specified tag.
  ///
  pub fn get_f32(
    &self,
    tag: DataElementTag,
    index: usize,
  ) -> Result<f32, DataError> {
    let (bytes, offset) = self.value_offset(tag, index, 4)?;

    self
      .byte_reader
      .read_f32(bytes, offset)
      .map_err(|_| DataError::IndexOutOfRange { tag, index })
  }

  /// Returns the `f64` at the given value index of the data element with the
  /// specified tag.
  ///
  pub fn get_f64(
    &self,
    tag: DataElementTag,
    index: usize,
  ) -> Result<f64, DataError> {
    let (bytes, offset) = self.value_offset(tag, index, 8)?;

    self
      .byte_reader
      .read_f64(bytes, offset)
      .map_err(|_| DataError::IndexOutOfRange { tag, index })
  }

  /// Returns the data element tag stored in the value of the data element
  /// with the specified tag, i.e. reads an `AttributeTag` value.
  ///
  pub fn get_attribute_tag(
    &self,
    tag: DataElementTag,
  ) -> Result<DataElementTag, DataError> {
    let bytes = self.element_bytes(tag)?;

    let group = self
      .byte_reader
      .read_u16(bytes, 0)
      .map_err(|_| DataError::IndexOutOfRange { tag, index: 0 })?;
    let element = self
      .byte_reader
      .read_u16(bytes, 2)
      .map_err(|_| DataError::IndexOutOfRange { tag, index: 0 })?;

    Ok(DataElementTag::new(group, element))
  }

  /// Returns the string value of the data element with the specified tag,
  /// trimmed of whitespace on both sides. When an index is given the value is
  /// first split on backslashes and the requested component returned. This is
  /// the trimming appropriate to VRs such as `DS`, `IS`, `AE`, `CS`, `SH`,
  /// and `LO`; use [`Self::get_text`] for VRs that preserve leading
  /// whitespace.
  ///
  pub fn get_string(
    &self,
    tag: DataElementTag,
    index: Option<usize>,
  ) -> Result<String, DataError> {
    let value = self.element_string(tag)?;

    match index {
      Some(index) => match value.split('\\').nth(index) {
        Some(value) => Ok(value.trim().to_string()),
        None => Err(DataError::IndexOutOfRange { tag, index }),
      },

      None => Ok(value.trim().to_string()),
    }
  }

  /// Returns the string value of the data element with the specified tag,
  /// trimmed of trailing whitespace only. This is the trimming appropriate to
  /// VRs such as `DT`, `PN`, `TM`, `LT`, `ST`, and `UT`, where leading
  /// whitespace is significant.
  ///
  pub fn get_text(
    &self,
    tag: DataElementTag,
    index: Option<usize>,
  ) -> Result<String, DataError> {
    let value = self.element_string(tag)?;

    match index {
      Some(index) => match value.split('\\').nth(index) {
        Some(value) => Ok(value.trim_end().to_string()),
        None => Err(DataError::IndexOutOfRange { tag, index }),
      },

      None => Ok(value.trim_end().to_string()),
    }
  }

  /// Returns the number of backslash-separated values in the string value of
  /// the data element with the specified tag. An empty value has zero values.
  ///
  pub fn num_string_values(
    &self,
    tag: DataElementTag,
  ) -> Result<usize, DataError> {
    let value = self.element_string(tag)?;

    if value.is_empty() {
      return Ok(0);
    }

    Ok(value.split('\\').count())
  }

  /// Parses the string value at the given index of the data element with the
  /// specified tag as a float, i.e. reads a `DecimalString` value.
  ///
  pub fn get_float_string(
    &self,
    tag: DataElementTag,
    index: usize,
  ) -> Result<f64, DataError> {
    let value = self.get_string(tag, Some(index))?;

    value
      .parse::<f64>()
      .map_err(|_| DataError::ValueInvalid {
        tag,
        details: format!("Decimal string \"{}\" is invalid", value),
      })
  }

  /// Parses the string value at the given index of the data element with the
  /// specified tag as an integer, i.e. reads an `IntegerString` value.
  ///
  pub fn get_int_string(
    &self,
    tag: DataElementTag,
    index: usize,
  ) -> Result<i64, DataError> {
    let value = self.get_string(tag, Some(index))?;

    value
      .parse::<i64>()
      .map_err(|_| DataError::ValueInvalid {
        tag,
        details: format!("Integer string \"{}\" is invalid", value),
      })
  }

  /// Prints a data set to stdout formatted for readability.
  ///
  pub fn print(&self) {
    self.print_with_options(&DataSetPrintOptions::default())
  }

  /// Prints a data set to stdout formatted for readability using the given
  /// print options.
  ///
  pub fn print_with_options(&self, print_options: &DataSetPrintOptions) {
    let mut callback = |s: String| println!("{}", s);

    print::data_set_to_lines(self, print_options, &mut callback, 0);
  }

  /// Converts a data set to a list of lines of text formatted for
  /// readability. Each line is passed to the callback.
  ///
  pub fn to_lines(
    &self,
    print_options: &DataSetPrintOptions,
    callback: &mut impl FnMut(String),
  ) {
    print::data_set_to_lines(self, print_options, callback, 0);
  }

  /// Returns the string value of a data element with trailing NUL bytes and
  /// everything after the first NUL discarded, matching how fixed strings are
  /// read off the wire.
  ///
  fn element_string(&self, tag: DataElementTag) -> Result<&str, DataError> {
    let bytes = self.element_bytes(tag)?;

    let bytes = match bytes.iter().position(|b| *b == 0) {
      Some(nul) => &bytes[..nul],
      None => bytes,
    };

    std::str::from_utf8(bytes).map_err(|_| DataError::ValueInvalid {
      tag,
      details: "String bytes are not valid UTF-8".to_string(),
    })
  }

  /// Bounds-checks an indexed fixed-width read into an element's value bytes
  /// and returns the value bytes along with the offset to read at.
  ///
  fn value_offset(
    &self,
    tag: DataElementTag,
    index: usize,
    width: usize,
  ) -> Result<(&[u8], usize), DataError> {
    let bytes = self.element_bytes(tag)?;

    let offset = index
      .checked_mul(width)
      .and_then(|offset| offset.checked_add(width).map(|end| (offset, end)))
      .filter(|(_, end)| *end <= bytes.len())
      .map(|(offset, _)| offset)
      .ok_or(DataError::IndexOutOfRange { tag, index })?;

    Ok((bytes, offset))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::transfer_syntax::Endianness;
  use crate::ValueRepresentation;

  fn test_data_set(value_bytes: &[u8]) -> (DataSet, DataElementTag) {
    let tag = DataElementTag::new(0x0028, 0x0010);

    let mut data_set = DataSet::new(
      Rc::new(value_bytes.to_vec()),
      ByteReader::new(Endianness::LittleEndian),
    );

    data_set.insert(DataElement::new(
      tag,
      Some(ValueRepresentation::UnsignedShort),
      value_bytes.len(),
      0,
      false,
    ));

    (data_set, tag)
  }

  #[test]
  fn get_u16_test() {
    let (data_set, tag) = test_data_set(&[0x34, 0x12, 0xCD, 0xAB]);

    assert_eq!(data_set.get_u16(tag, 0), Ok(0x1234));
    assert_eq!(data_set.get_u16(tag, 1), Ok(0xABCD));
    assert_eq!(
      data_set.get_u16(tag, 2),
      Err(DataError::IndexOutOfRange { tag, index: 2 })
    );
  }

  #[test]
  fn get_u16_missing_tag_test() {
    let (data_set, _) = test_data_set(&[0, 0]);
    let other_tag = DataElementTag::new(0x0028, 0x0011);

    assert_eq!(
      data_set.get_u16(other_tag, 0),
      Err(DataError::TagNotPresent { tag: other_tag })
    );
  }

  #[test]
  fn get_string_test() {
    let (data_set, tag) = test_data_set(b"ORIGINAL\\PRIMARY ");

    assert_eq!(
      data_set.get_string(tag, None),
      Ok("ORIGINAL\\PRIMARY".to_string())
    );
    assert_eq!(data_set.get_string(tag, Some(0)), Ok("ORIGINAL".to_string()));
    assert_eq!(data_set.get_string(tag, Some(1)), Ok("PRIMARY".to_string()));
    assert_eq!(
      data_set.get_string(tag, Some(2)),
      Err(DataError::IndexOutOfRange { tag, index: 2 })
    );
  }

  #[test]
  fn get_string_stops_at_nul_test() {
    let (data_set, tag) = test_data_set(b"1.2.840.10008.1.2\0");

    assert_eq!(
      data_set.get_string(tag, None),
      Ok("1.2.840.10008.1.2".to_string())
    );
  }

  #[test]
  fn get_text_preserves_leading_whitespace_test() {
    let (data_set, tag) = test_data_set(b"  indented  ");

    assert_eq!(data_set.get_text(tag, None), Ok("  indented".to_string()));
    assert_eq!(data_set.get_string(tag, None), Ok("indented".to_string()));
  }

  #[test]
  fn num_string_values_test() {
    let (data_set, tag) = test_data_set(b"1\\2\\3");
    assert_eq!(data_set.num_string_values(tag), Ok(3));

    let (data_set, tag) = test_data_set(b"");
    assert_eq!(data_set.num_string_values(tag), Ok(0));
  }

  #[test]
  fn get_float_string_test() {
    let (data_set, tag) = test_data_set(b"1.5\\-0.25 ");

    assert_eq!(data_set.get_float_string(tag, 0), Ok(1.5));
    assert_eq!(data_set.get_float_string(tag, 1), Ok(-0.25));
    assert!(data_set.get_float_string(tag, 2).is_err());
  }

  #[test]
  fn get_int_string_test() {
    let (data_set, tag) = test_data_set(b"+12\\-7");

    assert_eq!(data_set.get_int_string(tag, 0), Ok(12));
    assert_eq!(data_set.get_int_string(tag, 1), Ok(-7));
  }

  #[test]
  fn get_attribute_tag_test() {
    let (data_set, tag) = test_data_set(&[0x10, 0x00, 0x20, 0x00]);

    assert_eq!(
      data_set.get_attribute_tag(tag),
      Ok(DataElementTag::new(0x0010, 0x0020))
    );
  }

  #[test]
  fn merge_test() {
    let buffer = Rc::new(vec![1u8, 0, 2, 0]);
    let byte_reader = ByteReader::new(Endianness::LittleEndian);
    let tag = DataElementTag::new(0x0028, 0x0010);
    let vr = Some(ValueRepresentation::UnsignedShort);

    let mut a = DataSet::new(buffer.clone(), byte_reader);
    a.insert(DataElement::new(tag, vr, 2, 0, false));
    a.add_warning("first".to_string());

    let mut b = DataSet::new(buffer, byte_reader);
    b.insert(DataElement::new(tag, vr, 2, 2, false));
    b.add_warning("second".to_string());

    a.merge(b);

    assert_eq!(a.size(), 1);
    assert_eq!(a.get_u16(tag, 0), Ok(2));
    assert_eq!(a.warnings(), &["first".to_string(), "second".to_string()]);
  }
}

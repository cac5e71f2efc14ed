//! Provides the [`DataError`] type that describes the errors that can occur
//! when reading values out of a data set.

use crate::{DataElementTag, DcmdexError};

/// An error that occurred when retrieving a value from a data set. An error
/// can be one of the following types:
///
/// 1. **Tag not present**. The requested tag was not present in the data set.
///
/// 2. **Value not present**. The requested kind of value is not present on the
///    data element, e.g. a numeric read was attempted on a sequence.
///
/// 3. **Index out of range**. The requested index lies outside the element's
///    value, e.g. the third `u16` of a four-byte value.
///
/// 4. **Value invalid**. There was an error decoding the value's bytes, e.g. a
///    string value with invalid UTF-8, or a decimal string that doesn't parse
///    as a number.
///
#[derive(Clone, Debug, PartialEq)]
pub enum DataError {
  TagNotPresent {
    tag: DataElementTag,
  },
  ValueNotPresent {
    tag: DataElementTag,
  },
  IndexOutOfRange {
    tag: DataElementTag,
    index: usize,
  },
  ValueInvalid {
    tag: DataElementTag,
    details: String,
  },
}

impl std::fmt::Display for DataError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    let error = match self {
      DataError::TagNotPresent { tag } => {
        format!("Tag not present: {}", tag)
      }
      DataError::ValueNotPresent { tag } => {
        format!("Value not present at {}", tag)
      }
      DataError::IndexOutOfRange { tag, index } => {
        format!("Index {} out of range at {}", index, tag)
      }
      DataError::ValueInvalid { tag, details } => {
        format!("Invalid value at {}, details: {}", tag, details)
      }
    };

    write!(f, "DICOM Data Error: {}", error)
  }
}

impl DataError {
  /// Returns the name of the error as a human-readable string.
  ///
  pub fn name(&self) -> &'static str {
    match self {
      DataError::TagNotPresent { .. } => "Tag not present",
      DataError::ValueNotPresent { .. } => "Value not present",
      DataError::IndexOutOfRange { .. } => "Index out of range",
      DataError::ValueInvalid { .. } => "Invalid value",
    }
  }

  /// Returns whether this error is a 'Tag not present' error.
  ///
  pub fn is_tag_not_present(&self) -> bool {
    matches!(self, DataError::TagNotPresent { .. })
  }
}

impl DcmdexError for DataError {
  /// Returns lines of text that describe a data error in a human-readable
  /// format.
  ///
  fn to_lines(&self, task_description: &str) -> Vec<String> {
    let mut lines = vec![];

    lines.push(format!("DICOM data error {}", task_description));
    lines.push("".to_string());
    lines.push(format!("  Error: {}", self.name()));

    match self {
      DataError::TagNotPresent { tag }
      | DataError::ValueNotPresent { tag }
      | DataError::ValueInvalid { tag, .. } => {
        lines.push(format!("  Tag: {}", tag));
      }

      DataError::IndexOutOfRange { tag, index } => {
        lines.push(format!("  Tag: {}", tag));
        lines.push(format!("  Index: {}", index));
      }
    };

    if let DataError::ValueInvalid { details, .. } = self {
      lines.push(format!("  Details: {}", details));
    }

    lines
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn to_string_test() {
    assert_eq!(
      DataError::TagNotPresent {
        tag: DataElementTag::new(0x0010, 0x0010)
      }
      .to_string(),
      "DICOM Data Error: Tag not present: (0010,0010)"
    );
  }

  #[test]
  fn is_tag_not_present_test() {
    assert!(DataError::TagNotPresent {
      tag: DataElementTag::PIXEL_DATA
    }
    .is_tag_not_present());

    assert!(!DataError::ValueNotPresent {
      tag: DataElementTag::PIXEL_DATA
    }
    .is_tag_not_present());
  }
}

//! Decodes the DICOM Part 10 (P10) binary format used to store and transmit
//! DICOM-based medical imaging information, producing a data set that indexes
//! every data element's value inside the source buffer.

pub mod p10_error;
pub mod p10_parse;

mod internal;

pub use p10_error::P10Error;
pub use p10_parse::{
  parse, parse_returning_data_set_on_error, parse_with_config, ParseConfig,
};

/// Returns whether the given bytes contain DICOM P10 data by checking for the
/// presence of the `DICM` prefix at offset 128.
///
pub fn is_valid_bytes(bytes: &[u8]) -> bool {
  if bytes.len() < 132 {
    return false;
  }

  bytes[128..132] == *b"DICM"
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn is_valid_bytes_test() {
    let mut bytes = vec![0u8; 132];

    assert!(!is_valid_bytes(&bytes));

    bytes[128..132].copy_from_slice(b"DICM");

    assert!(is_valid_bytes(&bytes));
    assert!(!is_valid_bytes(&bytes[0..131]));
  }
}

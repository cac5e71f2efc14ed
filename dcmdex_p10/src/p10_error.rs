//! Defines the type used to describe errors that can occur when parsing DICOM
//! P10 data.

use dcmdex_core::DcmdexError;

/// An error that occurred when parsing DICOM P10 data.
///
#[derive(Clone, Debug, PartialEq)]
pub enum P10Error {
  /// This error occurs when the supplied data specifies a DICOM transfer
  /// syntax that isn't supported.
  TransferSyntaxNotSupported { transfer_syntax_uid: String },

  /// This error occurs when the supplied data is structurally invalid, e.g.
  /// the DICM prefix is missing with no fallback transfer syntax configured,
  /// an item tag is absent where the format requires one, or an explicit VR
  /// is unrecognized.
  DataInvalid {
    when: String,
    details: String,
    offset: usize,
  },

  /// This error occurs when the end of the supplied data is reached while
  /// parsing at a point where truncation isn't tolerable. This means the
  /// provided data is malformed or truncated.
  DataEndedUnexpectedly { when: String, offset: usize },

  /// This error occurs when the configured maximum sequence depth is exceeded
  /// during parsing. The maximum guards against pathological inputs
  /// exhausting the call stack.
  MaximumExceeded { details: String, offset: usize },
}

impl std::fmt::Display for P10Error {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "DICOM P10 error: {}", self.name())
  }
}

impl P10Error {
  /// Returns the name of the error as a human-readable string.
  ///
  pub fn name(&self) -> String {
    match self {
      P10Error::TransferSyntaxNotSupported { .. } => {
        "Transfer syntax not supported".to_string()
      }
      P10Error::DataInvalid { .. } => "Invalid data".to_string(),
      P10Error::DataEndedUnexpectedly { .. } => {
        "Unexpected end of data".to_string()
      }
      P10Error::MaximumExceeded { .. } => "Maximum exceeded".to_string(),
    }
  }
}

impl DcmdexError for P10Error {
  /// Returns lines of text that describe a DICOM P10 error in a
  /// human-readable format.
  ///
  fn to_lines(&self, task_description: &str) -> Vec<String> {
    let mut lines = vec![];

    lines.push(format!("DICOM P10 error {}", task_description));
    lines.push("".to_string());
    lines.push(format!("  Error: {}", self.name()));

    match self {
      P10Error::DataInvalid { when, .. }
      | P10Error::DataEndedUnexpectedly { when, .. } => {
        lines.push(format!("  When: {}", when));
      }

      _ => (),
    };

    match self {
      P10Error::TransferSyntaxNotSupported {
        transfer_syntax_uid,
      } => {
        lines.push(format!("  Transfer syntax UID: {}", transfer_syntax_uid));
      }

      P10Error::DataInvalid { details, .. }
      | P10Error::MaximumExceeded { details, .. } => {
        lines.push(format!("  Details: {}", details));
      }

      _ => (),
    };

    match self {
      P10Error::DataInvalid { offset, .. }
      | P10Error::DataEndedUnexpectedly { offset, .. }
      | P10Error::MaximumExceeded { offset, .. } => {
        lines.push(format!("  Offset: 0x{:X}", offset));
      }

      _ => (),
    };

    lines
  }
}

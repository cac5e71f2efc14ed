//! Dcmdex decodes DICOM P10 files, the binary container used to store and
//! transmit DICOM-based medical imaging information, into fully indexed data
//! sets: every data element is described by its tag, VR, and the exact byte
//! range its value occupies in the source buffer.

/// Provides core DICOM concepts including data sets, data element
/// descriptors, data element tags, value representations, and transfer
/// syntaxes.
///
/// This module is a re-export of the `dcmdex_core` crate.
///
pub mod core {
  pub use dcmdex_core::*;
}

/// Decodes the DICOM Part 10 (P10) binary format into an indexed data set.
///
/// This module is a re-export of the `dcmdex_p10` crate.
///
pub mod p10 {
  pub use dcmdex_p10::*;
}

mod integration_tests;

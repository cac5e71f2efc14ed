//! Provides core DICOM concepts including data sets, data element
//! descriptors, data element tags, value representations, and transfer
//! syntaxes.

pub mod byte_reader;
pub mod data_element;
pub mod data_element_tag;
pub mod data_error;
pub mod data_set;
pub mod error;
pub mod transfer_syntax;
pub mod utils;
pub mod value_representation;

pub use byte_reader::ByteReader;
pub use data_element::{
  DataElement, DataElementValue, PixelDataFragment, SequenceItem,
};
pub use data_element_tag::DataElementTag;
pub use data_error::DataError;
pub use data_set::print::DataSetPrintOptions;
pub use data_set::DataSet;
pub use error::DcmdexError;
pub use transfer_syntax::TransferSyntax;
pub use value_representation::ValueRepresentation;

//! Parses in-memory DICOM P10 data into a fully indexed data set.
//!
//! The parser walks the binary stream exactly once and records, for every
//! data element it encounters, where that element's value lives in the
//! buffer. Value bytes are never copied: sequences hold nested data sets that
//! index into the same buffer, and encapsulated pixel data is indexed as a
//! basic offset table plus one descriptor per fragment. Non-fatal anomalies
//! such as trailing bytes or non-zero delimiter lengths are collected as
//! warnings on the returned data set.

use std::io::Read;
use std::rc::Rc;

use dcmdex_core::transfer_syntax::{Endianness, VrSerialization};
use dcmdex_core::{
  utils, ByteReader, DataElement, DataElementTag, DataElementValue, DataSet,
  PixelDataFragment, SequenceItem, TransferSyntax, ValueRepresentation,
};

use crate::internal::byte_stream::{ByteStream, ByteStreamError};
use crate::internal::data_element_header::{
  self, DataElementHeader, ValueLengthSize,
};
use crate::internal::value_length::ValueLength;
use crate::P10Error;

/// Configuration used when parsing DICOM P10 data.
///
pub struct ParseConfig {
  /// A tag in canonical string form, e.g. `"x7fe00010"`. When a data element
  /// with this tag is encountered, parsing stops immediately after inserting
  /// it, leaving any later elements unread. An invalid tag string is not an
  /// error; it simply never matches.
  ///
  /// By default there is no until tag.
  ///
  pub until_tag: Option<String>,

  /// The transfer syntax UID to use when the supplied data has no DICM
  /// prefix, or has File Meta Information that doesn't specify a transfer
  /// syntax. Without a fallback, such data fails to parse.
  ///
  /// By default there is no fallback transfer syntax.
  ///
  pub fallback_transfer_syntax_uid: Option<String>,

  /// A callback that supplies the VR for a tag when parsing implicit VR data.
  /// When present, the callback is also authoritative for deciding whether an
  /// implicit VR data element is a sequence, replacing the peek-based
  /// detection.
  ///
  pub vr_callback:
    Option<Box<dyn Fn(DataElementTag) -> Option<ValueRepresentation>>>,

  /// A replacement for the built-in raw Deflate inflation used by the
  /// deflated transfer syntax. The callback receives the whole buffer and the
  /// offset at which the deflated instance body starts, and returns the full
  /// buffer to continue parsing: the unchanged bytes up to that offset
  /// followed by the inflated body.
  ///
  pub inflater:
    Option<Box<dyn Fn(&[u8], usize) -> Result<Vec<u8>, String>>>,

  /// The maximum sequence nesting depth. Data nested deeper than this fails
  /// to parse rather than risk exhausting the call stack.
  ///
  /// The default is 64.
  ///
  pub max_sequence_depth: u32,
}

impl Default for ParseConfig {
  fn default() -> Self {
    Self {
      until_tag: None,
      fallback_transfer_syntax_uid: None,
      vr_callback: None,
      inflater: None,
      max_sequence_depth: 64,
    }
  }
}

/// Parses DICOM P10 data into an in-memory data set.
///
pub fn parse(bytes: Vec<u8>) -> Result<DataSet, P10Error> {
  parse_with_config(bytes, &ParseConfig::default())
}

/// Parses DICOM P10 data into an in-memory data set using the given parse
/// config.
///
pub fn parse_with_config(
  bytes: Vec<u8>,
  config: &ParseConfig,
) -> Result<DataSet, P10Error> {
  match parse_returning_data_set_on_error(bytes, config) {
    Ok(data_set) => Ok(data_set),
    Err((e, _)) => Err(e),
  }
}

/// Parses DICOM P10 data into an in-memory data set. In the case of an error
/// occurring during the parse both the error and the data set as populated at
/// the time of the error are returned.
///
/// This allows the data that was successfully indexed prior to the error to
/// still be inspected. For an error inside the File Meta Information this is
/// the partial meta data set.
///
pub fn parse_returning_data_set_on_error(
  bytes: Vec<u8>,
  config: &ParseConfig,
) -> Result<DataSet, (P10Error, Box<DataSet>)> {
  let buffer = Rc::new(bytes);

  // The File Meta Information is always explicit VR little endian
  let stream = ByteStream::new(buffer.clone(), Endianness::LittleEndian);

  let mut parser = P10Parser {
    stream,
    config,
    until_tag: config
      .until_tag
      .as_deref()
      .and_then(|tag| DataElementTag::from_canonical_string(tag).ok()),
    sequence_depth: 0,
    until_tag_reached: false,
  };

  let meta_data_set = parser.read_file_meta_information()?;

  // Resolve the transfer syntax for the instance body. A missing or empty
  // '(0002,0010) Transfer Syntax UID' falls back to the configured UID when
  // there is one, and is fatal otherwise.
  let transfer_syntax_uid = match meta_data_set
    .get_string(DataElementTag::TRANSFER_SYNTAX_UID, None)
  {
    Ok(uid) if !uid.is_empty() => uid,

    _ => match &config.fallback_transfer_syntax_uid {
      Some(uid) => uid.clone(),

      None => {
        let error = P10Error::DataInvalid {
          when: "Reading File Meta Information".to_string(),
          details: "The mandatory '(0002,0010) Transfer Syntax UID' data \
            element is missing"
            .to_string(),
          offset: parser.stream.position(),
        };

        return Err(parser.fail_with_data_set(error, meta_data_set));
      }
    },
  };

  let transfer_syntax = match TransferSyntax::from_uid(&transfer_syntax_uid) {
    Ok(transfer_syntax) => transfer_syntax,

    Err(()) => {
      let error = P10Error::TransferSyntaxNotSupported {
        transfer_syntax_uid,
      };

      return Err(parser.fail_with_data_set(error, meta_data_set));
    }
  };

  // A deflated instance body is inflated into a new buffer made of the
  // unchanged header bytes followed by the inflated body. Meta element
  // offsets stay valid because the prefix is byte-identical.
  let body_start = parser.stream.position();

  if transfer_syntax.is_deflated && body_start < parser.stream.size() {
    let full_buffer = match inflate_full_buffer(&buffer, body_start, config) {
      Ok(full_buffer) => full_buffer,
      Err(error) => {
        return Err(parser.fail_with_data_set(error, meta_data_set))
      }
    };

    let warnings = parser.stream.take_warnings();

    let mut stream =
      ByteStream::new(Rc::new(full_buffer), transfer_syntax.endianness);
    stream.set_warnings(warnings);

    if let Err(e) = stream.seek(body_start as i64) {
      let error =
        map_byte_stream_error(e, "Seeking to the inflated body", &stream);

      parser.stream = stream;

      return Err(parser.fail_with_data_set(error, meta_data_set));
    }

    parser.stream = stream;
  } else {
    parser.stream.set_endianness(transfer_syntax.endianness);
  }

  let mut data_set =
    DataSet::new(parser.stream.buffer(), parser.stream.byte_reader());

  let ends_at = parser.stream.size();

  if let Err(error) = parser.read_data_set_elements(
    &mut data_set,
    transfer_syntax.vr_serialization,
    ends_at,
  ) {
    data_set.merge(meta_data_set);

    return Err(parser.fail_with_data_set(error, data_set));
  }

  // Body elements first, then the meta header elements, which win should a
  // tag somehow collide
  data_set.merge(meta_data_set);
  data_set.set_warnings(parser.stream.take_warnings());

  Ok(data_set)
}

/// The state of an in-progress DICOM P10 parse: the byte stream being walked,
/// the active config, and the current sequence nesting depth.
///
struct P10Parser<'a> {
  stream: ByteStream,
  config: &'a ParseConfig,
  until_tag: Option<DataElementTag>,
  sequence_depth: u32,
  until_tag_reached: bool,
}

impl P10Parser<'_> {
  /// Reads the File Meta Information into a data set: the 128-byte preamble,
  /// the `DICM` prefix, then group 0002 data elements in explicit VR little
  /// endian. On return the stream is positioned at the start of the instance
  /// body.
  ///
  /// On error the partially populated meta data set is returned alongside
  /// the error.
  ///
  fn read_file_meta_information(
    &mut self,
  ) -> Result<DataSet, (P10Error, Box<DataSet>)> {
    let mut data_set = DataSet::new(
      self.stream.buffer(),
      ByteReader::new(Endianness::LittleEndian),
    );

    // Buffers too small to hold the preamble and prefix can only be parsed
    // when a fallback transfer syntax is available
    if self.stream.size() <= 132
      && self.config.fallback_transfer_syntax_uid.is_none()
    {
      let error = P10Error::DataInvalid {
        when: "Reading file header".to_string(),
        details: "Not a valid DICOM P10 file: the file is too small to \
          contain the 'DICM' prefix"
          .to_string(),
        offset: 0,
      };

      return Err(self.fail_with_data_set(error, data_set));
    }

    let has_dicm_prefix = if self.stream.size() > 132 {
      let prefix = match self
        .stream
        .seek(128)
        .and_then(|_| self.stream.read_fixed_string(4))
      {
        Ok(prefix) => prefix,
        Err(e) => {
          let error =
            map_byte_stream_error(e, "Reading file header", &self.stream);

          return Err(self.fail_with_data_set(error, data_set));
        }
      };

      prefix == "DICM"
    } else {
      false
    };

    if !has_dicm_prefix {
      if self.config.fallback_transfer_syntax_uid.is_some() {
        // Rewind so the whole buffer parses as the instance body. The
        // returned meta data set holds a synthesized zero-length transfer
        // syntax element; the UID that is applied comes from the fallback.
        let position = self.stream.position();
        if let Err(e) = self.stream.seek(-(position as i64)) {
          let error =
            map_byte_stream_error(e, "Reading file header", &self.stream);

          return Err(self.fail_with_data_set(error, data_set));
        }

        data_set.insert(DataElement::new(
          DataElementTag::TRANSFER_SYNTAX_UID,
          Some(ValueRepresentation::UniqueIdentifier),
          0,
          0,
          false,
        ));

        return Ok(data_set);
      }

      let error = P10Error::DataInvalid {
        when: "Reading file header".to_string(),
        details: "Not a valid DICOM P10 file: the 'DICM' prefix was not \
          found at offset 128"
          .to_string(),
        offset: 128,
      };

      return Err(self.fail_with_data_set(error, data_set));
    }

    // Read group 0002 data elements until the next element's tag would leave
    // the group. The peek leaves the stream at the start of the first body
    // element.
    let last_meta_tag = DataElementTag::new(0x0002, 0xFFFF);

    while !self.until_tag_reached && self.stream.bytes_remaining() >= 8 {
      let tag = match data_element_header::peek_tag(&mut self.stream) {
        Ok(tag) => tag,
        Err(e) => {
          let error = map_byte_stream_error(
            e,
            "Reading File Meta Information",
            &self.stream,
          );

          return Err(self.fail_with_data_set(error, data_set));
        }
      };

      if tag > last_meta_tag {
        break;
      }

      let element = match self.read_data_element(VrSerialization::VrExplicit)
      {
        Ok(element) => element,
        Err(error) => return Err(self.fail_with_data_set(error, data_set)),
      };

      data_set.insert(element);
    }

    Ok(data_set)
  }

  /// Reads data elements into the given data set until the end position is
  /// reached or the until tag has been inserted. Fewer than 8 bytes remaining
  /// cannot hold another element header and are consumed with a warning.
  ///
  fn read_data_set_elements(
    &mut self,
    data_set: &mut DataSet,
    vr_serialization: VrSerialization,
    ends_at: usize,
  ) -> Result<(), P10Error> {
    while !self.until_tag_reached && self.stream.position() < ends_at {
      let bytes_remaining = ends_at - self.stream.position();

      if bytes_remaining < 8 {
        self.stream.add_warning(format!(
          "{} trailing bytes at end of dataset",
          bytes_remaining
        ));

        self.stream.seek(bytes_remaining as i64).map_err(|e| {
          map_byte_stream_error(e, "Skipping trailing bytes", &self.stream)
        })?;

        break;
      }

      let element = self.read_data_element(vr_serialization)?;

      data_set.insert(element);
    }

    Ok(())
  }

  /// Reads a single data element, including its value, which for sequences
  /// and encapsulated pixel data means recursing into the nested structure.
  ///
  fn read_data_element(
    &mut self,
    vr_serialization: VrSerialization,
  ) -> Result<DataElement, P10Error> {
    match vr_serialization {
      VrSerialization::VrImplicit => self.read_data_element_implicit(),
      VrSerialization::VrExplicit => self.read_data_element_explicit(),
    }
  }

  /// Reads a data element in implicit VR serialization: tag, `u32` length,
  /// then the value. The VR, if any, comes from the configured VR callback.
  ///
  fn read_data_element_implicit(&mut self) -> Result<DataElement, P10Error> {
    let tag = data_element_header::read_tag(&mut self.stream).map_err(|e| {
      map_byte_stream_error(e, "Reading data element header", &self.stream)
    })?;

    let length = ValueLength::new(self.stream.read_u32().map_err(|e| {
      map_byte_stream_error(e, "Reading data element header", &self.stream)
    })?);

    let vr = self
      .config
      .vr_callback
      .as_ref()
      .and_then(|callback| callback(tag));

    let mut element = DataElement::new(
      tag,
      vr,
      length.to_u32() as usize,
      self.stream.position(),
      length.is_undefined(),
    );

    if self.until_tag == Some(tag) {
      self.until_tag_reached = true;
      return Ok(element);
    }

    if self.is_implicit_sequence(&element)?
      && (!tag.is_private() || element.had_undefined_length)
    {
      self.read_sequence_items(&mut element, VrSerialization::VrImplicit)?;

      // Sequence-shaped private data is walked so the stream advances
      // correctly, but its items are not exposed
      if tag.is_private() {
        element.value = DataElementValue::Binary;
      }

      return Ok(element);
    }

    if element.had_undefined_length {
      self.find_item_delimitation_item(&mut element)?;
      return Ok(element);
    }

    self.stream.seek(element.length as i64).map_err(|e| {
      map_byte_stream_error(e, "Skipping data element value", &self.stream)
    })?;

    Ok(element)
  }

  /// Decides whether an implicit VR data element is a sequence. A configured
  /// VR callback is authoritative; otherwise the decision is made by peeking
  /// the next tag for an item or sequence delimitation tag.
  ///
  fn is_implicit_sequence(
    &mut self,
    element: &DataElement,
  ) -> Result<bool, P10Error> {
    if self.config.vr_callback.is_some() {
      return Ok(element.vr == Some(ValueRepresentation::Sequence));
    }

    if self.stream.bytes_remaining() < 4 {
      self.stream.add_warning(format!(
        "End of data encountered while checking whether data element {} is \
        a sequence",
        element.tag
      ));

      return Ok(false);
    }

    let next_tag =
      data_element_header::peek_tag(&mut self.stream).map_err(|e| {
        map_byte_stream_error(e, "Peeking for a sequence", &self.stream)
      })?;

    Ok(
      next_tag == DataElementTag::ITEM
        || next_tag == DataElementTag::SEQUENCE_DELIMITATION_ITEM,
    )
  }

  /// Reads a data element in explicit VR serialization: tag, 2-byte VR, a 2-
  /// or 4-byte length depending on the VR, then the value.
  ///
  fn read_data_element_explicit(&mut self) -> Result<DataElement, P10Error> {
    let tag = data_element_header::read_tag(&mut self.stream).map_err(|e| {
      map_byte_stream_error(e, "Reading data element header", &self.stream)
    })?;

    let vr_offset = self.stream.position();

    let vr_bytes = self.stream.read_bytes(2).map_err(|e| {
      map_byte_stream_error(e, "Reading data element VR", &self.stream)
    })?;

    let vr = ValueRepresentation::from_bytes(&vr_bytes).map_err(|_| {
      P10Error::DataInvalid {
        when: "Reading data element VR".to_string(),
        details: format!(
          "Unrecognized VR {} for data element {}",
          utils::inspect_u8_slice(&vr_bytes, 2),
          tag
        ),
        offset: vr_offset,
      }
    })?;

    // VRs with a 32-bit length have two reserved bytes before the length
    let length = match DataElementHeader::value_length_size(vr) {
      ValueLengthSize::U32 => {
        self.stream.seek(2).map_err(|e| {
          map_byte_stream_error(
            e,
            "Reading data element header",
            &self.stream,
          )
        })?;

        ValueLength::new(self.stream.read_u32().map_err(|e| {
          map_byte_stream_error(e, "Reading data element header", &self.stream)
        })?)
      }

      ValueLengthSize::U16 => ValueLength::Defined {
        length: self.stream.read_u16().map_err(|e| {
          map_byte_stream_error(e, "Reading data element header", &self.stream)
        })? as u32,
      },
    };

    let mut element = DataElement::new(
      tag,
      Some(vr),
      length.to_u32() as usize,
      self.stream.position(),
      length.is_undefined(),
    );

    if self.until_tag == Some(tag) {
      self.until_tag_reached = true;
      return Ok(element);
    }

    match (vr, length) {
      (ValueRepresentation::Sequence, _) => {
        self.read_sequence_items(&mut element, VrSerialization::VrExplicit)?;
      }

      (_, ValueLength::Undefined) if tag == DataElementTag::PIXEL_DATA => {
        self.read_encapsulated_pixel_data(&mut element)?;
      }

      // Per DICOM Correction Proposal CP-246, a UN value of undefined length
      // holds an implicit VR little endian data set regardless of the
      // enclosing transfer syntax.
      // Ref: https://dicom.nema.org/dicom/cp/cp246_01.pdf
      (ValueRepresentation::Unknown, ValueLength::Undefined) => {
        let endianness = self.stream.byte_reader().endianness();

        self.stream.set_endianness(Endianness::LittleEndian);

        let result =
          self.read_sequence_items(&mut element, VrSerialization::VrImplicit);

        self.stream.set_endianness(endianness);

        result?;
      }

      (_, ValueLength::Undefined) => {
        self.find_item_delimitation_item(&mut element)?;
      }

      (_, ValueLength::Defined { length }) => {
        self.stream.seek(length as i64).map_err(|e| {
          map_byte_stream_error(
            e,
            "Skipping data element value",
            &self.stream,
          )
        })?;
      }
    }

    Ok(element)
  }

  /// Reads the items of a sequence data element. On success the element's
  /// value holds the parsed items, and for an undefined-length sequence the
  /// element's length has been set to the span of its items, excluding the
  /// sequence delimitation item.
  ///
  fn read_sequence_items(
    &mut self,
    element: &mut DataElement,
    vr_serialization: VrSerialization,
  ) -> Result<(), P10Error> {
    if self.sequence_depth >= self.config.max_sequence_depth {
      return Err(P10Error::MaximumExceeded {
        details: "Maximum allowed sequence depth reached".to_string(),
        offset: self.stream.position(),
      });
    }

    self.sequence_depth += 1;

    let mut items = vec![];

    let result = if element.had_undefined_length {
      self.read_sequence_items_undefined_length(
        element,
        &mut items,
        vr_serialization,
      )
    } else {
      self.read_sequence_items_defined_length(
        element,
        &mut items,
        vr_serialization,
      )
    };

    self.sequence_depth -= 1;

    result?;

    element.value = DataElementValue::Sequence { items };

    Ok(())
  }

  fn read_sequence_items_defined_length(
    &mut self,
    element: &DataElement,
    items: &mut Vec<SequenceItem>,
    vr_serialization: VrSerialization,
  ) -> Result<(), P10Error> {
    let ends_at = element.data_offset + element.length;

    while !self.until_tag_reached && self.stream.position() < ends_at {
      items.push(self.read_sequence_item(vr_serialization)?);
    }

    Ok(())
  }

  fn read_sequence_items_undefined_length(
    &mut self,
    element: &mut DataElement,
    items: &mut Vec<SequenceItem>,
    vr_serialization: VrSerialization,
  ) -> Result<(), P10Error> {
    loop {
      if self.until_tag_reached {
        return Ok(());
      }

      if self.stream.bytes_remaining() < 8 {
        self.stream.add_warning(format!(
          "End of data encountered before the sequence delimitation item \
          for data element {}",
          element.tag
        ));

        element.length = self.stream.size() - element.data_offset;

        return Ok(());
      }

      let next_tag =
        data_element_header::peek_tag(&mut self.stream).map_err(|e| {
          map_byte_stream_error(e, "Reading sequence", &self.stream)
        })?;

      if next_tag == DataElementTag::SEQUENCE_DELIMITATION_ITEM {
        element.length = self.stream.position() - element.data_offset;

        self.consume_delimiter("Sequence delimitation item")?;

        return Ok(());
      }

      items.push(self.read_sequence_item(vr_serialization)?);
    }
  }

  /// Reads one item of a sequence: the item header, then a nested data set
  /// across the item's range. A defined-length item spans exactly its stated
  /// range; an undefined-length item runs to its item delimitation item.
  ///
  fn read_sequence_item(
    &mut self,
    vr_serialization: VrSerialization,
  ) -> Result<SequenceItem, P10Error> {
    let header_offset = self.stream.position();

    let tag = data_element_header::read_tag(&mut self.stream).map_err(|e| {
      map_byte_stream_error(e, "Reading sequence item", &self.stream)
    })?;

    if tag != DataElementTag::ITEM {
      return Err(P10Error::DataInvalid {
        when: "Reading sequence item".to_string(),
        details: format!(
          "Expected the item tag {} but found {}",
          DataElementTag::ITEM,
          tag
        ),
        offset: header_offset,
      });
    }

    let length = ValueLength::new(self.stream.read_u32().map_err(|e| {
      map_byte_stream_error(e, "Reading sequence item", &self.stream)
    })?);

    let data_offset = self.stream.position();

    let mut data_set =
      DataSet::new(self.stream.buffer(), self.stream.byte_reader());

    match length {
      ValueLength::Defined { length } => {
        let length = length as usize;

        self.read_data_set_elements(
          &mut data_set,
          vr_serialization,
          data_offset + length,
        )?;

        Ok(SequenceItem {
          data_offset,
          length,
          had_undefined_length: false,
          data_set,
        })
      }

      ValueLength::Undefined => {
        let mut length = 0;

        loop {
          if self.until_tag_reached {
            break;
          }

          if self.stream.bytes_remaining() < 8 {
            self.stream.add_warning(format!(
              "End of data encountered before the item delimitation item \
              for the item at offset 0x{:X}",
              header_offset
            ));

            length = self.stream.size() - data_offset;

            break;
          }

          let next_tag = data_element_header::peek_tag(&mut self.stream)
            .map_err(|e| {
              map_byte_stream_error(e, "Reading sequence item", &self.stream)
            })?;

          if next_tag == DataElementTag::ITEM_DELIMITATION_ITEM {
            length = self.stream.position() - data_offset;

            self.consume_delimiter("Item delimitation item")?;

            break;
          }

          let element = self.read_data_element(vr_serialization)?;

          data_set.insert(element);
        }

        Ok(SequenceItem {
          data_offset,
          length,
          had_undefined_length: true,
          data_set,
        })
      }
    }
  }

  /// Scans forward on `u16` alignment for the item delimitation item that
  /// terminates an undefined-length data element, and sets the element's
  /// length to the span of the value bytes before it. The delimiter is
  /// consumed but excluded from the length. If the end of the data is reached
  /// first, the element's length runs to the end of the buffer.
  ///
  fn find_item_delimitation_item(
    &mut self,
    element: &mut DataElement,
  ) -> Result<(), P10Error> {
    loop {
      if self.stream.bytes_remaining() < 8 {
        self.stream.add_warning(format!(
          "End of data encountered before the item delimitation item for \
          data element {}",
          element.tag
        ));

        element.length = self.stream.size() - element.data_offset;

        self.stream.seek(self.stream.bytes_remaining() as i64).map_err(
          |e| {
            map_byte_stream_error(
              e,
              "Scanning for the item delimitation item",
              &self.stream,
            )
          },
        )?;

        return Ok(());
      }

      let group = self.stream.read_u16().map_err(|e| {
        map_byte_stream_error(
          e,
          "Scanning for the item delimitation item",
          &self.stream,
        )
      })?;

      if group != 0xFFFE {
        continue;
      }

      let delimiter_offset = self.stream.position() - 2;

      let element_number = self.stream.read_u16().map_err(|e| {
        map_byte_stream_error(
          e,
          "Scanning for the item delimitation item",
          &self.stream,
        )
      })?;

      if element_number != 0xE00D {
        continue;
      }

      let delimiter_length = self.stream.read_u32().map_err(|e| {
        map_byte_stream_error(
          e,
          "Scanning for the item delimitation item",
          &self.stream,
        )
      })?;

      if delimiter_length != 0 {
        self.stream.add_warning(format!(
          "Item delimitation item at offset 0x{:X} has a non-zero length \
          of {} bytes",
          delimiter_offset, delimiter_length
        ));
      }

      element.length = delimiter_offset - element.data_offset;

      return Ok(());
    }
  }

  /// Indexes the content of an encapsulated pixel data element: the basic
  /// offset table item followed by one item per fragment, terminated by a
  /// sequence delimitation item. Fragment offsets are measured from the end
  /// of the basic offset table item, matching the coordinate system of the
  /// table's entries.
  ///
  fn read_encapsulated_pixel_data(
    &mut self,
    element: &mut DataElement,
  ) -> Result<(), P10Error> {
    let table_offset = self.stream.position();

    let tag = data_element_header::read_tag(&mut self.stream).map_err(|e| {
      map_byte_stream_error(
        e,
        "Reading encapsulated pixel data",
        &self.stream,
      )
    })?;

    if tag != DataElementTag::ITEM {
      return Err(P10Error::DataInvalid {
        when: "Reading encapsulated pixel data".to_string(),
        details: format!(
          "Expected the basic offset table item tag {} but found {}",
          DataElementTag::ITEM,
          tag
        ),
        offset: table_offset,
      });
    }

    let table_length = self.stream.read_u32().map_err(|e| {
      map_byte_stream_error(
        e,
        "Reading encapsulated pixel data",
        &self.stream,
      )
    })? as usize;

    let mut basic_offset_table = Vec::with_capacity(table_length / 4);

    for _ in 0..table_length / 4 {
      basic_offset_table.push(self.stream.read_u32().map_err(|e| {
        map_byte_stream_error(e, "Reading basic offset table", &self.stream)
      })?);
    }

    if table_length % 4 != 0 {
      self.stream.add_warning(format!(
        "Basic offset table at offset 0x{:X} has a length of {} bytes, \
        which is not a multiple of four",
        table_offset, table_length
      ));

      self.stream.seek((table_length % 4) as i64).map_err(|e| {
        map_byte_stream_error(e, "Reading basic offset table", &self.stream)
      })?;
    }

    let base_position = self.stream.position();

    let mut fragments = vec![];

    loop {
      if self.stream.bytes_remaining() < 8 {
        self.stream.add_warning(format!(
          "End of data encountered before the sequence delimitation item \
          for data element {}",
          element.tag
        ));

        element.length = self.stream.position() - element.data_offset;

        break;
      }

      let item_offset = self.stream.position();

      let tag = data_element_header::read_tag(&mut self.stream).map_err(
        |e| {
          map_byte_stream_error(
            e,
            "Reading encapsulated pixel data item",
            &self.stream,
          )
        },
      )?;

      let mut length = self.stream.read_u32().map_err(|e| {
        map_byte_stream_error(
          e,
          "Reading encapsulated pixel data item",
          &self.stream,
        )
      })? as usize;

      if tag == DataElementTag::SEQUENCE_DELIMITATION_ITEM {
        element.length = item_offset - element.data_offset;

        // The delimiter's length is normally zero but is honored if not
        let skip = std::cmp::min(length, self.stream.bytes_remaining());
        self.stream.seek(skip as i64).map_err(|e| {
          map_byte_stream_error(
            e,
            "Reading encapsulated pixel data item",
            &self.stream,
          )
        })?;

        break;
      }

      if tag != DataElementTag::ITEM {
        self.stream.add_warning(format!(
          "Unexpected data element {} inside encapsulated pixel data, \
          capturing it as a fragment",
          tag
        ));

        length = std::cmp::min(length, self.stream.bytes_remaining());
      }

      let position = self.stream.position();

      fragments.push(PixelDataFragment {
        offset: position - base_position - 8,
        position,
        length,
      });

      self.stream.seek(length as i64).map_err(|e| {
        map_byte_stream_error(
          e,
          "Reading encapsulated pixel data fragment",
          &self.stream,
        )
      })?;
    }

    element.value = DataElementValue::EncapsulatedPixelData {
      basic_offset_table,
      fragments,
    };

    Ok(())
  }

  /// Consumes an 8-byte delimiter whose tag has already been peeked, with a
  /// warning if its length field is non-zero.
  ///
  fn consume_delimiter(&mut self, name: &str) -> Result<(), P10Error> {
    let offset = self.stream.position();

    data_element_header::read_tag(&mut self.stream).map_err(|e| {
      map_byte_stream_error(e, "Reading delimiter", &self.stream)
    })?;

    let length = self.stream.read_u32().map_err(|e| {
      map_byte_stream_error(e, "Reading delimiter", &self.stream)
    })?;

    if length != 0 {
      self.stream.add_warning(format!(
        "{} at offset 0x{:X} has a non-zero length of {} bytes",
        name, offset, length
      ));
    }

    Ok(())
  }

  /// Moves the stream's warnings onto a data set that is about to be
  /// returned alongside an error.
  ///
  fn fail_with_data_set(
    &mut self,
    error: P10Error,
    mut data_set: DataSet,
  ) -> (P10Error, Box<DataSet>) {
    data_set.set_warnings(self.stream.take_warnings());

    (error, Box::new(data_set))
  }
}

/// Produces the full buffer for a deflated transfer syntax: the unchanged
/// bytes up to the body start, followed by the raw-inflated instance body.
///
fn inflate_full_buffer(
  buffer: &[u8],
  body_start: usize,
  config: &ParseConfig,
) -> Result<Vec<u8>, P10Error> {
  if let Some(inflater) = &config.inflater {
    return inflater(buffer, body_start).map_err(|details| {
      P10Error::DataInvalid {
        when: "Inflating deflated transfer syntax data".to_string(),
        details,
        offset: body_start,
      }
    });
  }

  let mut full_buffer = buffer[..body_start].to_vec();

  let mut decoder = flate2::read::DeflateDecoder::new(&buffer[body_start..]);

  decoder.read_to_end(&mut full_buffer).map_err(|e| {
    P10Error::DataInvalid {
      when: "Inflating deflated transfer syntax data".to_string(),
      details: e.to_string(),
      offset: body_start,
    }
  })?;

  Ok(full_buffer)
}

/// Takes an error from the byte stream and maps it through to a P10 error.
///
fn map_byte_stream_error(
  error: ByteStreamError,
  when: &str,
  stream: &ByteStream,
) -> P10Error {
  let offset = stream.position();

  match error {
    ByteStreamError::DataEnd | ByteStreamError::SeekInvalid => {
      P10Error::DataEndedUnexpectedly {
        when: when.to_string(),
        offset,
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn p10_header(transfer_syntax_uid: &str) -> Vec<u8> {
    let mut bytes = vec![0u8; 128];
    bytes.extend_from_slice(b"DICM");

    let mut uid = transfer_syntax_uid.as_bytes().to_vec();
    if uid.len() % 2 == 1 {
      uid.push(0);
    }

    bytes.extend_from_slice(&[0x02, 0x00, 0x10, 0x00]);
    bytes.extend_from_slice(b"UI");
    bytes.extend_from_slice(&(uid.len() as u16).to_le_bytes());
    bytes.extend_from_slice(&uid);

    bytes
  }

  #[test]
  fn not_a_dicom_file_test() {
    let result = parse(b"not a DICOM file".to_vec());

    assert_eq!(
      result,
      Err(P10Error::DataInvalid {
        when: "Reading file header".to_string(),
        details: "Not a valid DICOM P10 file: the file is too small to \
          contain the 'DICM' prefix"
          .to_string(),
        offset: 0,
      })
    );
  }

  #[test]
  fn missing_dicm_prefix_test() {
    let mut bytes = vec![0u8; 256];
    bytes[128..132].copy_from_slice(b"DICL");

    assert_eq!(
      parse(bytes),
      Err(P10Error::DataInvalid {
        when: "Reading file header".to_string(),
        details: "Not a valid DICOM P10 file: the 'DICM' prefix was not \
          found at offset 128"
          .to_string(),
        offset: 128,
      })
    );
  }

  #[test]
  fn meta_header_only_test() {
    let data_set = parse(p10_header("1.2.840.10008.1.2")).unwrap();

    assert_eq!(data_set.size(), 1);
    assert!(data_set.warnings().is_empty());

    let element = data_set
      .get(DataElementTag::TRANSFER_SYNTAX_UID)
      .unwrap();

    assert_eq!(element.vr, Some(ValueRepresentation::UniqueIdentifier));
    assert_eq!(element.length, 18);

    assert_eq!(
      data_set.get_string(DataElementTag::TRANSFER_SYNTAX_UID, None),
      Ok("1.2.840.10008.1.2".to_string())
    );
  }

  #[test]
  fn missing_transfer_syntax_test() {
    let mut bytes = vec![0u8; 128];
    bytes.extend_from_slice(b"DICM");

    // A meta header containing only '(0002,0001) File Meta Information
    // Version'
    bytes.extend_from_slice(&[0x02, 0x00, 0x01, 0x00]);
    bytes.extend_from_slice(b"OB");
    bytes.extend_from_slice(&[0x00, 0x00]);
    bytes.extend_from_slice(&2u32.to_le_bytes());
    bytes.extend_from_slice(&[0x00, 0x01]);

    let result = parse(bytes);

    assert_eq!(
      result,
      Err(P10Error::DataInvalid {
        when: "Reading File Meta Information".to_string(),
        details: "The mandatory '(0002,0010) Transfer Syntax UID' data \
          element is missing"
          .to_string(),
        offset: 146,
      })
    );
  }

  #[test]
  fn unsupported_transfer_syntax_test() {
    let result = parse(p10_header("1.2.3.4"));

    assert_eq!(
      result,
      Err(P10Error::TransferSyntaxNotSupported {
        transfer_syntax_uid: "1.2.3.4".to_string(),
      })
    );
  }

  #[test]
  fn fallback_transfer_syntax_test() {
    // An implicit VR little endian data set with no preamble or meta header:
    // '(0008,0018)' with a 4-byte value
    let mut bytes = vec![];
    bytes.extend_from_slice(&[0x08, 0x00, 0x18, 0x00]);
    bytes.extend_from_slice(&4u32.to_le_bytes());
    bytes.extend_from_slice(b"1.2\0");

    let config = ParseConfig {
      fallback_transfer_syntax_uid: Some("1.2.840.10008.1.2".to_string()),
      ..Default::default()
    };

    let data_set = parse_with_config(bytes, &config).unwrap();

    assert!(data_set.has(DataElementTag::TRANSFER_SYNTAX_UID));
    assert_eq!(
      data_set.get_string(DataElementTag::new(0x0008, 0x0018), None),
      Ok("1.2".to_string())
    );
  }

  #[test]
  fn trailing_bytes_warning_test() {
    let mut bytes = p10_header("1.2.840.10008.1.2.1");
    bytes.extend_from_slice(&[1, 2, 3]);

    let data_set = parse(bytes).unwrap();

    assert_eq!(
      data_set.warnings(),
      &["3 trailing bytes at end of dataset".to_string()]
    );
  }

  #[test]
  fn invalid_until_tag_never_matches_test() {
    let config = ParseConfig {
      until_tag: Some("not a tag".to_string()),
      ..Default::default()
    };

    let data_set =
      parse_with_config(p10_header("1.2.840.10008.1.2.1"), &config).unwrap();

    assert_eq!(data_set.size(), 1);
  }

  #[test]
  fn unrecognized_vr_test() {
    let mut bytes = p10_header("1.2.840.10008.1.2.1");
    bytes.extend_from_slice(&[0x08, 0x00, 0x18, 0x00]);
    bytes.extend_from_slice(b"QQ");
    bytes.extend_from_slice(&0u16.to_le_bytes());

    let result = parse(bytes);

    assert!(matches!(
      result,
      Err(P10Error::DataInvalid { ref when, .. })
        if when == "Reading data element VR"
    ));
  }
}

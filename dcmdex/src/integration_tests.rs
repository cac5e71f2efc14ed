// Integration tests for dcmdex
#[cfg(test)]
mod tests {
  use std::io::Write;

  use dcmdex_core::*;
  use dcmdex_p10::*;

  /// Returns the 128-byte preamble, the `DICM` prefix, and a File Meta
  /// Information group containing the given transfer syntax UID.
  ///
  fn meta_header(transfer_syntax_uid: &str) -> Vec<u8> {
    let mut bytes = vec![0u8; 128];
    bytes.extend_from_slice(b"DICM");

    let mut uid = transfer_syntax_uid.as_bytes().to_vec();
    if uid.len() % 2 == 1 {
      uid.push(0);
    }

    bytes.extend(explicit_le_element(0x0002, 0x0010, b"UI", &uid));

    bytes
  }

  /// Encodes an explicit VR little endian data element that uses a 16-bit
  /// length field.
  ///
  fn explicit_le_element(
    group: u16,
    element: u16,
    vr: &[u8; 2],
    value: &[u8],
  ) -> Vec<u8> {
    let mut bytes = vec![];
    bytes.extend_from_slice(&group.to_le_bytes());
    bytes.extend_from_slice(&element.to_le_bytes());
    bytes.extend_from_slice(vr);
    bytes.extend_from_slice(&(value.len() as u16).to_le_bytes());
    bytes.extend_from_slice(value);

    bytes
  }

  /// Encodes the 12-byte header of an explicit VR little endian data element
  /// that uses a 32-bit length field preceded by two reserved bytes.
  ///
  fn explicit_le_header_large(
    group: u16,
    element: u16,
    vr: &[u8; 2],
    length: u32,
  ) -> Vec<u8> {
    let mut bytes = vec![];
    bytes.extend_from_slice(&group.to_le_bytes());
    bytes.extend_from_slice(&element.to_le_bytes());
    bytes.extend_from_slice(vr);
    bytes.extend_from_slice(&[0, 0]);
    bytes.extend_from_slice(&length.to_le_bytes());

    bytes
  }

  /// Encodes the 8-byte header of an implicit VR little endian data element.
  ///
  fn implicit_le_header(group: u16, element: u16, length: u32) -> Vec<u8> {
    let mut bytes = vec![];
    bytes.extend_from_slice(&group.to_le_bytes());
    bytes.extend_from_slice(&element.to_le_bytes());
    bytes.extend_from_slice(&length.to_le_bytes());

    bytes
  }

  fn implicit_le_element(group: u16, element: u16, value: &[u8]) -> Vec<u8> {
    let mut bytes = implicit_le_header(group, element, value.len() as u32);
    bytes.extend_from_slice(value);

    bytes
  }

  fn item_header(length: u32) -> Vec<u8> {
    implicit_le_header(0xFFFE, 0xE000, length)
  }

  fn item_delimiter(length: u32) -> Vec<u8> {
    implicit_le_header(0xFFFE, 0xE00D, length)
  }

  fn sequence_delimiter(length: u32) -> Vec<u8> {
    implicit_le_header(0xFFFE, 0xE0DD, length)
  }

  /// Asserts that every element in the data set, recursively, indexes a byte
  /// range that lies inside the buffer.
  ///
  fn assert_offsets_in_bounds(data_set: &DataSet) {
    let buffer_size = data_set.buffer().len();

    for element in data_set.iter() {
      assert!(element.data_offset + element.length <= buffer_size);

      if let Ok(items) = element.sequence_items() {
        for item in items {
          assert!(item.data_offset + item.length <= buffer_size);
          assert_offsets_in_bounds(&item.data_set);
        }
      }

      if let Ok((_, fragments)) = element.encapsulated_pixel_data() {
        for fragment in fragments {
          assert!(fragment.position + fragment.length <= buffer_size);
        }
      }
    }
  }

  #[test]
  fn defined_length_sequence_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2.1");
    let body_start = bytes.len();

    let item_content =
      explicit_le_element(0x0010, 0x0010, b"PN", b"DOE^JOHN");

    bytes.extend(explicit_le_header_large(0x0008, 0x1110, b"SQ", 8 + 16));
    bytes.extend(item_header(16));
    bytes.extend(&item_content);

    let data_set = parse(bytes).unwrap();

    assert!(data_set.warnings().is_empty());
    assert_offsets_in_bounds(&data_set);

    let sq = data_set.get(DataElementTag::new(0x0008, 0x1110)).unwrap();

    assert_eq!(sq.vr, Some(ValueRepresentation::Sequence));
    assert_eq!(sq.data_offset, body_start + 12);
    assert_eq!(sq.length, 24);
    assert!(!sq.had_undefined_length);

    let items = sq.sequence_items().unwrap();
    assert_eq!(items.len(), 1);

    let item = &items[0];
    assert_eq!(item.data_offset, body_start + 20);
    assert_eq!(item.length, 16);
    assert!(!item.had_undefined_length);

    let name_tag = DataElementTag::new(0x0010, 0x0010);
    let name = item.data_set.get(name_tag).unwrap();

    assert_eq!(name.vr, Some(ValueRepresentation::PersonName));
    assert_eq!(name.length, 8);
    assert_eq!(name.data_offset, item.data_offset + 8);

    assert_eq!(
      item.data_set.get_text(name_tag, None),
      Ok("DOE^JOHN".to_string())
    );
  }

  #[test]
  fn undefined_length_sequence_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2.1");
    let body_start = bytes.len();

    bytes.extend(explicit_le_header_large(
      0x0008, 0x1110, b"SQ", 0xFFFF_FFFF,
    ));
    bytes.extend(item_header(16));
    bytes.extend(explicit_le_element(0x0010, 0x0010, b"PN", b"DOE^JOHN"));
    bytes.extend(sequence_delimiter(0));

    let data_set = parse(bytes).unwrap();

    assert!(data_set.warnings().is_empty());
    assert_offsets_in_bounds(&data_set);

    let sq = data_set.get(DataElementTag::new(0x0008, 0x1110)).unwrap();

    // The sequence's length spans its items and excludes the consumed
    // delimiter
    assert_eq!(sq.data_offset, body_start + 12);
    assert_eq!(sq.length, 24);
    assert!(sq.had_undefined_length);

    assert_eq!(sq.sequence_items().unwrap().len(), 1);
  }

  #[test]
  fn undefined_length_item_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2.1");

    bytes.extend(explicit_le_header_large(
      0x0008, 0x1110, b"SQ", 0xFFFF_FFFF,
    ));
    bytes.extend(item_header(0xFFFF_FFFF));
    bytes.extend(explicit_le_element(0x0010, 0x0010, b"PN", b"DOE^JOHN"));
    bytes.extend(item_delimiter(0));
    bytes.extend(sequence_delimiter(0));

    let data_set = parse(bytes).unwrap();

    assert!(data_set.warnings().is_empty());

    let sq = data_set.get(DataElementTag::new(0x0008, 0x1110)).unwrap();
    let items = sq.sequence_items().unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].length, 16);
    assert!(items[0].had_undefined_length);

    // Item content plus the item's delimitation item
    assert_eq!(sq.length, 8 + 16 + 8);

    assert_eq!(
      items[0]
        .data_set
        .get_text(DataElementTag::new(0x0010, 0x0010), None),
      Ok("DOE^JOHN".to_string())
    );
  }

  #[test]
  fn encapsulated_pixel_data_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2.4.50");
    let body_start = bytes.len();

    bytes.extend(explicit_le_header_large(
      0x7FE0, 0x0010, b"OB", 0xFFFF_FFFF,
    ));

    // Basic offset table for two frames, the second starting at the second
    // fragment
    bytes.extend(item_header(8));
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&12u32.to_le_bytes());

    // Three fragments of 4, 6, and 2 bytes
    bytes.extend(item_header(4));
    bytes.extend_from_slice(&[1, 2, 3, 4]);
    bytes.extend(item_header(6));
    bytes.extend_from_slice(&[5, 6, 7, 8, 9, 10]);
    bytes.extend(item_header(2));
    bytes.extend_from_slice(&[11, 12]);

    bytes.extend(sequence_delimiter(0));

    let data_set = parse(bytes).unwrap();

    assert!(data_set.warnings().is_empty());
    assert_offsets_in_bounds(&data_set);

    let pixel_data = data_set.get(DataElementTag::PIXEL_DATA).unwrap();
    let data_offset = body_start + 12;

    assert_eq!(pixel_data.data_offset, data_offset);
    assert!(pixel_data.had_undefined_length);
    assert_eq!(pixel_data.length, 52);

    let (basic_offset_table, fragments) =
      pixel_data.encapsulated_pixel_data().unwrap();

    assert_eq!(basic_offset_table, &[0, 12]);

    let base = data_offset + 16;

    assert_eq!(
      fragments,
      &[
        PixelDataFragment {
          offset: 0,
          position: base + 8,
          length: 4
        },
        PixelDataFragment {
          offset: 12,
          position: base + 20,
          length: 6
        },
        PixelDataFragment {
          offset: 26,
          position: base + 34,
          length: 2
        },
      ]
    );
  }

  #[test]
  fn encapsulated_pixel_data_unexpected_tag_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2.4.50");

    bytes.extend(explicit_le_header_large(
      0x7FE0, 0x0010, b"OB", 0xFFFF_FFFF,
    ));

    bytes.extend(item_header(0));

    bytes.extend(item_header(2));
    bytes.extend_from_slice(&[1, 2]);

    // A tag that is neither an item nor the sequence delimiter, with a length
    // far past the end of the buffer
    bytes.extend(implicit_le_header(0x0010, 0x0010, 0xFFFF));
    bytes.extend_from_slice(&[3, 4]);

    let data_set = parse(bytes).unwrap();

    let pixel_data = data_set.get(DataElementTag::PIXEL_DATA).unwrap();
    let (_, fragments) = pixel_data.encapsulated_pixel_data().unwrap();

    // The unexpected block is captured as a best-effort fragment with its
    // length clamped to the remaining buffer
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[1].length, 2);

    assert_eq!(pixel_data.length, 8 + 10 + 10);

    assert_eq!(data_set.warnings().len(), 2);
    assert!(data_set.warnings()[0].contains("Unexpected data element"));
    assert!(data_set.warnings()[1].contains("End of data"));
  }

  #[test]
  fn implicit_sequence_detection_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2");

    bytes.extend(implicit_le_header(0x0008, 0x1115, 8 + 16));
    bytes.extend(item_header(16));
    bytes.extend(implicit_le_element(0x0010, 0x0010, b"DOE^JOHN"));

    let data_set = parse(bytes).unwrap();

    assert!(data_set.warnings().is_empty());
    assert_offsets_in_bounds(&data_set);

    let sq = data_set.get(DataElementTag::new(0x0008, 0x1115)).unwrap();

    assert_eq!(sq.vr, None);
    assert!(sq.is_sequence());

    let items = sq.sequence_items().unwrap();
    assert_eq!(items.len(), 1);

    let name_tag = DataElementTag::new(0x0010, 0x0010);

    assert_eq!(items[0].data_set.get(name_tag).unwrap().vr, None);
    assert_eq!(
      items[0].data_set.get_text(name_tag, None),
      Ok("DOE^JOHN".to_string())
    );
  }

  #[test]
  fn implicit_vr_callback_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2");

    bytes.extend(implicit_le_element(0x0010, 0x0010, b"DOE^JOHN"));

    let config = ParseConfig {
      vr_callback: Some(Box::new(|tag| {
        if tag == DataElementTag::new(0x0010, 0x0010) {
          Some(ValueRepresentation::PersonName)
        } else {
          None
        }
      })),
      ..Default::default()
    };

    let data_set = parse_with_config(bytes, &config).unwrap();

    assert_eq!(
      data_set.get(DataElementTag::new(0x0010, 0x0010)).unwrap().vr,
      Some(ValueRepresentation::PersonName)
    );
  }

  #[test]
  fn implicit_undefined_length_element_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2");
    let body_start = bytes.len();

    // A private data element of undefined length whose value is bounded by
    // an item delimitation item
    bytes.extend(implicit_le_header(0x0009, 0x0001, 0xFFFF_FFFF));
    bytes.extend_from_slice(b"ABCDEF");
    bytes.extend(item_delimiter(0));

    let data_set = parse(bytes).unwrap();

    assert!(data_set.warnings().is_empty());

    let element = data_set.get(DataElementTag::new(0x0009, 0x0001)).unwrap();

    assert_eq!(element.data_offset, body_start + 8);
    assert_eq!(element.length, 6);
    assert!(element.had_undefined_length);

    assert_eq!(data_set.element_bytes(element.tag), Ok(b"ABCDEF".as_slice()));
  }

  #[test]
  fn delimiter_with_nonzero_length_warns_test() {
    let body = |delimiter_length: u32| {
      let mut bytes = meta_header("1.2.840.10008.1.2");
      bytes.extend(implicit_le_header(0x0009, 0x0001, 0xFFFF_FFFF));
      bytes.extend_from_slice(b"ABCDEF");
      bytes.extend(item_delimiter(delimiter_length));
      bytes
    };

    let clean = parse(body(0)).unwrap();
    let tolerated = parse(body(4)).unwrap();

    // The element map is unchanged, only the warning list differs
    assert_eq!(clean.tags(), tolerated.tags());

    for tag in clean.tags() {
      let a = clean.get(tag).unwrap();
      let b = tolerated.get(tag).unwrap();

      assert_eq!((a.vr, a.length, a.data_offset), (b.vr, b.length, b.data_offset));
    }

    assert!(clean.warnings().is_empty());
    assert_eq!(tolerated.warnings().len(), 1);
    assert!(tolerated.warnings()[0].contains("non-zero length"));
  }

  #[test]
  fn unknown_vr_undefined_length_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2.1");
    let body_start = bytes.len();

    // Per CP-246 the UN element's content is an implicit VR little endian
    // data set
    bytes.extend(explicit_le_header_large(
      0x0008, 0x1111, b"UN", 0xFFFF_FFFF,
    ));
    bytes.extend(item_header(16));
    bytes.extend(implicit_le_element(0x0010, 0x0010, b"DOE^JOHN"));
    bytes.extend(sequence_delimiter(0));

    let data_set = parse(bytes).unwrap();

    let element = data_set.get(DataElementTag::new(0x0008, 0x1111)).unwrap();

    assert_eq!(element.vr, Some(ValueRepresentation::Unknown));
    assert_eq!(element.data_offset, body_start + 12);
    assert_eq!(element.length, 24);
    assert!(element.is_sequence());

    let items = element.sequence_items().unwrap();

    assert_eq!(
      items[0]
        .data_set
        .get_text(DataElementTag::new(0x0010, 0x0010), None),
      Ok("DOE^JOHN".to_string())
    );
  }

  #[test]
  fn explicit_big_endian_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2.2");

    bytes.extend_from_slice(&[0x00, 0x28, 0x00, 0x10]);
    bytes.extend_from_slice(b"US");
    bytes.extend_from_slice(&[0x00, 0x02]);
    bytes.extend_from_slice(&[0x01, 0x02]);

    let data_set = parse(bytes).unwrap();

    let rows_tag = DataElementTag::new(0x0028, 0x0010);

    assert_eq!(data_set.get(rows_tag).unwrap().length, 2);
    assert_eq!(data_set.get_u16(rows_tag, 0), Ok(0x0102));
  }

  #[test]
  fn deflated_transfer_syntax_test() {
    let mut body = vec![];
    body.extend(explicit_le_element(0x0010, 0x0010, b"PN", b"DOE^JOHN"));

    let mut encoder = flate2::write::DeflateEncoder::new(
      Vec::new(),
      flate2::Compression::default(),
    );
    encoder.write_all(&body).unwrap();
    let deflated = encoder.finish().unwrap();

    let mut bytes = meta_header("1.2.840.10008.1.2.1.99");
    bytes.extend(deflated);

    let data_set = parse(bytes).unwrap();

    assert!(data_set.warnings().is_empty());
    assert_offsets_in_bounds(&data_set);

    assert_eq!(
      data_set.get_text(DataElementTag::new(0x0010, 0x0010), None),
      Ok("DOE^JOHN".to_string())
    );

    // The meta header elements remain readable out of the inflated buffer
    assert_eq!(
      data_set.get_string(DataElementTag::TRANSFER_SYNTAX_UID, None),
      Ok("1.2.840.10008.1.2.1.99".to_string())
    );
  }

  #[test]
  fn custom_inflater_test() {
    let plain_body = explicit_le_element(0x0010, 0x0010, b"PN", b"DOE^JOHN");

    let mut bytes = meta_header("1.2.840.10008.1.2.1.99");
    bytes.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD]);

    let config = ParseConfig {
      inflater: Some(Box::new(move |buffer: &[u8], body_start: usize| {
        let mut full_buffer = buffer[..body_start].to_vec();
        full_buffer.extend_from_slice(&plain_body);

        Ok(full_buffer)
      })),
      ..Default::default()
    };

    let data_set = parse_with_config(bytes, &config).unwrap();

    assert_eq!(
      data_set.get_text(DataElementTag::new(0x0010, 0x0010), None),
      Ok("DOE^JOHN".to_string())
    );
  }

  #[test]
  fn until_tag_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2.1");

    bytes.extend(explicit_le_element(0x0008, 0x0018, b"UI", b"1.2\0"));
    bytes.extend(explicit_le_element(0x0010, 0x0010, b"PN", b"DOE^JOHN"));

    let config = ParseConfig {
      until_tag: Some("x00080018".to_string()),
      ..Default::default()
    };

    let data_set = parse_with_config(bytes, &config).unwrap();

    assert!(data_set.has(DataElementTag::new(0x0008, 0x0018)));
    assert!(!data_set.has(DataElementTag::new(0x0010, 0x0010)));

    assert_eq!(
      data_set.get_string(DataElementTag::new(0x0008, 0x0018), None),
      Ok("1.2".to_string())
    );
  }

  #[test]
  fn sequence_depth_limit_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2.1");

    bytes.extend(explicit_le_header_large(0x0008, 0x1115, b"SQ", 8 + 12));
    bytes.extend(item_header(12));
    bytes.extend(explicit_le_header_large(0x0008, 0x1140, b"SQ", 0));

    // The default depth limit accepts this nesting
    assert!(parse(bytes.clone()).is_ok());

    let config = ParseConfig {
      max_sequence_depth: 1,
      ..Default::default()
    };

    assert!(matches!(
      parse_with_config(bytes, &config),
      Err(P10Error::MaximumExceeded { .. })
    ));
  }

  #[test]
  fn reparse_is_identical_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2.1");

    bytes.extend(explicit_le_header_large(0x0008, 0x1110, b"SQ", 8 + 16));
    bytes.extend(item_header(16));
    bytes.extend(explicit_le_element(0x0010, 0x0010, b"PN", b"DOE^JOHN"));

    let first = parse(bytes.clone()).unwrap();
    let second = parse(bytes).unwrap();

    assert_eq!(first, second);
  }

  #[test]
  fn accessors_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2.1");

    bytes.extend(explicit_le_element(
      0x0018, 0x9087, b"FD", &2.5f64.to_le_bytes(),
    ));
    bytes.extend(explicit_le_element(
      0x0020, 0x9165, b"AT", &[0x20, 0x00, 0x13, 0x90],
    ));
    bytes.extend(explicit_le_element(0x0028, 0x0008, b"IS", b"3 "));
    bytes.extend(explicit_le_element(
      0x0028, 0x0010, b"US", &[0x01, 0x00, 0x02, 0x00],
    ));
    bytes.extend(explicit_le_element(0x0028, 0x0030, b"DS", b"0.5\\0.25"));
    bytes.extend(explicit_le_element(0x0028, 0x0106, b"SS", &[0xFF, 0xFF]));

    let data_set = parse(bytes).unwrap();

    assert_eq!(
      data_set.get_f64(DataElementTag::new(0x0018, 0x9087), 0),
      Ok(2.5)
    );

    assert_eq!(
      data_set.get_attribute_tag(DataElementTag::new(0x0020, 0x9165)),
      Ok(DataElementTag::new(0x0020, 0x9013))
    );

    assert_eq!(
      data_set.get_int_string(DataElementTag::new(0x0028, 0x0008), 0),
      Ok(3)
    );

    let rows_tag = DataElementTag::new(0x0028, 0x0010);
    assert_eq!(data_set.get_u16(rows_tag, 0), Ok(1));
    assert_eq!(data_set.get_u16(rows_tag, 1), Ok(2));

    let spacing_tag = DataElementTag::new(0x0028, 0x0030);
    assert_eq!(data_set.num_string_values(spacing_tag), Ok(2));
    assert_eq!(data_set.get_float_string(spacing_tag, 0), Ok(0.5));
    assert_eq!(data_set.get_float_string(spacing_tag, 1), Ok(0.25));

    assert_eq!(
      data_set.get_i16(DataElementTag::new(0x0028, 0x0106), 0),
      Ok(-1)
    );
  }

  #[test]
  fn print_to_lines_test() {
    let mut bytes = meta_header("1.2.840.10008.1.2.1");

    bytes.extend(explicit_le_header_large(0x0008, 0x1110, b"SQ", 8 + 16));
    bytes.extend(item_header(16));
    bytes.extend(explicit_le_element(0x0010, 0x0010, b"PN", b"DOE^JOHN"));

    let data_set = parse(bytes).unwrap();

    let print_options = DataSetPrintOptions {
      styled: false,
      max_width: 100,
    };

    let mut lines = vec![];
    data_set.to_lines(&print_options, &mut |line| lines.push(line));

    assert!(lines.iter().any(|line| line.contains("(0008,1110) SQ")));
    assert!(lines.iter().any(|line| line.contains("DOE^JOHN")));
  }
}

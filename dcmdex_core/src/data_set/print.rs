use std::io::IsTerminal;

use unicode_segmentation::UnicodeSegmentation;

use crate::{
  utils, DataElement, DataElementTag, DataElementValue, DataSet,
  ValueRepresentation,
};

/// Configurable options used when printing a data set to stdout.
///
#[derive(Clone, Debug, PartialEq)]
pub struct DataSetPrintOptions {
  /// Whether to include styling such as colored text and bold text. This
  /// should only be used when printing to a terminal that supports color.
  ///
  /// By default this is set based on automatically detecting whether the
  /// output stream supports color.
  pub styled: bool,

  /// The maximum output width for the printed data set. Lines that exceed
  /// this length will be truncated with an ellipsis character.
  ///
  /// By default this is set based on automatically detecting the stdout
  /// terminal's width.
  pub max_width: usize,
}

#[cfg(not(target_arch = "wasm32"))]
fn terminal_width() -> Option<usize> {
  if let Some((terminal_size::Width(width), _)) = terminal_size::terminal_size()
  {
    Some(width as usize)
  } else {
    None
  }
}

#[cfg(target_arch = "wasm32")]
fn terminal_width() -> Option<usize> {
  None
}

impl DataSetPrintOptions {
  /// Constructs new data set print options and auto-detects output settings
  /// when possible.
  ///
  pub fn new() -> Self {
    let is_terminal = std::io::stdout().is_terminal();
    let color_support =
      supports_color::on(supports_color::Stream::Stdout).is_some();

    Self {
      styled: is_terminal && color_support,
      max_width: terminal_width().unwrap_or(80),
    }
  }

  /// Sets the [`DataSetPrintOptions::styled`] value.
  ///
  pub fn styled(self, styled: bool) -> Self {
    Self { styled, ..self }
  }

  /// Sets the [`DataSetPrintOptions::max_width`] value.
  ///
  pub fn max_width(self, max_width: usize) -> Self {
    Self { max_width, ..self }
  }
}

impl Default for DataSetPrintOptions {
  fn default() -> Self {
    Self::new()
  }
}

/// Recursively prints a data set to stdout using the specified print options.
///
pub fn data_set_to_lines(
  data_set: &DataSet,
  print_options: &DataSetPrintOptions,
  callback: &mut impl FnMut(String),
  indent: usize,
) {
  for element in data_set.iter() {
    let (header, header_width) = format_data_element_prefix(
      element.tag,
      element.vr,
      Some(element.length),
      Some(element.data_offset),
      indent,
      print_options,
    );

    match &element.value {
      // For sequences, recursively print their items
      DataElementValue::Sequence { items } => {
        callback(header);

        for item in items.iter() {
          callback(
            format_data_element_prefix(
              DataElementTag::ITEM,
              None,
              Some(item.length),
              Some(item.data_offset),
              indent + 1,
              print_options,
            )
            .0,
          );

          data_set_to_lines(
            &item.data_set,
            print_options,
            callback,
            indent + 2,
          );
        }

        callback(
          format_data_element_prefix(
            DataElementTag::SEQUENCE_DELIMITATION_ITEM,
            None,
            None,
            None,
            indent,
            print_options,
          )
          .0,
        );
      }

      // For encapsulated pixel data, print one row per fragment
      DataElementValue::EncapsulatedPixelData { fragments, .. } => {
        callback(header);

        for fragment in fragments.iter() {
          callback(
            format_data_element_prefix(
              DataElementTag::ITEM,
              None,
              Some(fragment.length),
              Some(fragment.position),
              indent + 1,
              print_options,
            )
            .0,
          );
        }

        callback(
          format_data_element_prefix(
            DataElementTag::SEQUENCE_DELIMITATION_ITEM,
            None,
            None,
            None,
            indent,
            print_options,
          )
          .0,
        );
      }

      DataElementValue::Binary => {
        let value_max_width = std::cmp::max(
          print_options.max_width.saturating_sub(header_width),
          10,
        );

        callback(format!(
          "{header}{}",
          value_to_string(data_set, element, value_max_width)
        ));
      }
    }
  }
}

/// Formats details for a data element for display on stdout, excluding its
/// value. Returns the string to display along with the number of printable
/// characters.
///
pub fn format_data_element_prefix(
  tag: DataElementTag,
  vr: Option<ValueRepresentation>,
  length: Option<usize>,
  data_offset: Option<usize>,
  indent: usize,
  print_options: &DataSetPrintOptions,
) -> (String, usize) {
  let tag_text = tag.to_string();
  let vr_text = vr.map(|vr| vr.to_string());

  let location = match (length, data_offset) {
    (Some(length), Some(data_offset)) => {
      format!("[{length:6} bytes @ 0x{data_offset:08X}] ")
    }
    (Some(length), None) => format!("[{length:6} bytes] "),
    _ => "".to_string(),
  };

  let mut width = indent * 2 + tag_text.len() + 1 + location.len();
  if let Some(vr_text) = &vr_text {
    width += vr_text.len() + 1;
  }

  // Style tag in blue, VR in green, and the location in cyan
  let (tag_text, vr_text, location) = if print_options.styled {
    (
      text_blue(&tag_text),
      vr_text.map(|vr_text| text_green(&vr_text)),
      text_cyan_and_reset(&location),
    )
  } else {
    (tag_text, vr_text, location)
  };

  let empty = "";
  let s = match vr_text {
    Some(vr_text) => format!(
      "{empty:indent$}{tag_text} {vr_text} {location}",
      indent = indent * 2
    ),
    None => {
      format!("{empty:indent$}{tag_text} {location}", indent = indent * 2)
    }
  };

  (s, width)
}

/// Formats a preview of a data element's value: quoted text for string VRs
/// and a hex inspection for everything else, truncated on grapheme
/// boundaries to the available width.
///
fn value_to_string(
  data_set: &DataSet,
  element: &DataElement,
  max_width: usize,
) -> String {
  let preview = match element.vr {
    Some(vr) if vr.is_string() => match data_set.get_text(element.tag, None) {
      Ok(value) => format!("\"{}\"", value),
      Err(_) => "<error reading value>".to_string(),
    },

    _ => match data_set.element_bytes(element.tag) {
      Ok(bytes) => utils::inspect_u8_slice(bytes, max_width / 3),
      Err(_) => "<error reading value>".to_string(),
    },
  };

  let graphemes = preview.graphemes(true).collect::<Vec<_>>();

  if graphemes.len() > max_width {
    format!(
      "{} …",
      graphemes[0..max_width.saturating_sub(2)].concat()
    )
  } else {
    preview
  }
}

// Simple helpers for coloring and styling text on the terminal. These are used
// instead of a 3rd party crate because the requirements are very simple and the
// functions below are also more efficient due to avoiding unnecessary resets.

fn text_blue(s: &str) -> String {
  format!("\u{001b}[34m{}", s)
}

fn text_cyan_and_reset(s: &str) -> String {
  format!("\u{001b}[36m{}\u{001b}[0m", s)
}

fn text_green(s: &str) -> String {
  format!("\u{001b}[32m{}", s)
}

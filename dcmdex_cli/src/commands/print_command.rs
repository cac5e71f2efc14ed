use clap::Args;

use dcmdex::core::*;
use dcmdex::p10::*;

pub const ABOUT: &str = "Prints the content of a DICOM P10 file";

#[derive(Args)]
pub struct PrintArgs {
  input_filename: String,

  #[arg(
    long,
    short,
    help = "\
      The maximum width in characters of the printed output. By default this \
      is set to the width of the active terminal, or 80 characters if the \
      terminal width can't be detected.",
    value_parser = clap::value_parser!(u32).range(0..10000),
  )]
  max_width: Option<u32>,

  #[arg(
    long,
    short,
    help = "\
      Whether to print output using color and bold text. By default this is \
      set based on whether there is an active output terminal that supports \
      colored output."
  )]
  styled: Option<bool>,

  #[arg(
    long,
    help = "\
      The transfer syntax UID to assume when the input file has no 'DICM' \
      prefix and no File Meta Information."
  )]
  fallback_transfer_syntax: Option<String>,
}

pub fn run(args: &PrintArgs) -> Result<(), ()> {
  // Apply any print option arguments
  let mut print_options = DataSetPrintOptions::default();
  if let Some(max_width) = args.max_width {
    print_options = print_options.max_width(max_width as usize);
  }
  if let Some(styled) = args.styled {
    print_options = print_options.styled(styled);
  }

  let config = ParseConfig {
    fallback_transfer_syntax_uid: args.fallback_transfer_syntax.clone(),
    ..ParseConfig::default()
  };

  match perform_print(&args.input_filename, &config, &print_options) {
    Ok(()) => Ok(()),

    Err(e) => {
      e.print(&format!("printing \"{}\"", args.input_filename));

      Err(())
    }
  }
}

fn perform_print(
  input_filename: &str,
  config: &ParseConfig,
  print_options: &DataSetPrintOptions,
) -> Result<(), P10Error> {
  let bytes = std::fs::read(input_filename).map_err(|e| {
    P10Error::DataInvalid {
      when: "Reading input file".to_string(),
      details: e.to_string(),
      offset: 0,
    }
  })?;

  let data_set = parse_with_config(bytes, config)?;

  data_set.print_with_options(print_options);

  for warning in data_set.warnings() {
    eprintln!("Warning: {}", warning);
  }

  Ok(())
}

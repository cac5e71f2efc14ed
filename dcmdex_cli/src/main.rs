//! Entry point for Dcmdex's CLI tool.

mod commands;

use clap::{Parser, Subcommand};

use commands::print_command;

#[derive(Parser)]
#[command(
  name = "dcmdex",
  bin_name = "dcmdex",
  version = env!("CARGO_PKG_VERSION"),
  about = "Dcmdex is a CLI app for inspecting the content of DICOM P10 files",
  max_term_width = 80
)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  #[command(about = print_command::ABOUT)]
  Print(print_command::PrintArgs),
}

fn main() -> Result<(), ()> {
  let cli = Cli::parse();

  match &cli.command {
    Commands::Print(args) => print_command::run(args),
  }
}

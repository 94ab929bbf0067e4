//! CLI driver: assembles a source listing, then executes the binary it just
//! produced. A thin composition of the two library phases; each phase remains
//! independently callable with only its own paths.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use hexad::bytecode::assemble_file;
use hexad::machine::run_file;

#[derive(Parser, Debug)]
#[command(
  name = "hexad",
  version,
  about = "Assemble a textual instruction listing and execute the binary",
  long_about = "Assemble a textual instruction listing into six-byte records, then execute \
                the records against a 100-cell memory and dump the requested range.\n\n\
                Rejected source lines are reported and skipped; a bounds violation during \
                execution is fatal and exits nonzero, with the partial dump still written."
)]
struct Cli {
  /// Assembly source, one `<mnemonic> <int> <int>` instruction per line.
  input_file: PathBuf,

  /// Where to write the binary instruction stream.
  output_bin: PathBuf,

  /// Where to write the assembly trace log.
  log_file: PathBuf,

  /// First address of the memory dump range.
  #[arg(value_parser = clap::value_parser!(u64).range(0..100))]
  memory_range_start: u64,

  /// Last address of the memory dump range, inclusive.
  #[arg(value_parser = clap::value_parser!(u64).range(0..100))]
  memory_range_end: u64,

  /// Where to write the memory dump.
  result_file: PathBuf,
}

fn main() {
  let cli = Cli::parse();

  if cli.memory_range_start > cli.memory_range_end {
    eprintln!(
      "memory range start {} exceeds end {}",
      cli.memory_range_start, cli.memory_range_end
    );
    process::exit(2);
  }

  let assembly = match assemble_file(&cli.input_file, &cli.output_bin, &cli.log_file) {
    Ok(assembly) => assembly,
    Err(error) => {
      eprintln!("{}", error);
      process::exit(1);
    }
  };
  println!(
    "Assembly complete: {} instructions encoded to {}, log saved to {}",
    assembly.trace.len(),
    cli.output_bin.display(),
    cli.log_file.display()
  );

  let outcome = run_file(
    &cli.output_bin,
    cli.memory_range_start as usize,
    cli.memory_range_end as usize,
    &cli.result_file,
  );
  if let Err(error) = outcome {
    eprintln!("{}", error);
    process::exit(1);
  }
  println!("Execution complete: results saved to {}", cli.result_file.display());
}

//! End-to-end tests over the two file-level phases: assemble a listing to real
//! artifacts, execute the binary, and inspect what landed on disk.

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use hexad::bytecode::{assemble_file, RECORD_SIZE};
use hexad::machine::{run_file, Machine};

struct Workspace {
  _dir: TempDir,
  source: PathBuf,
  binary: PathBuf,
  log: PathBuf,
  result: PathBuf,
}

fn workspace(source_text: &str) -> Workspace {
  let dir = TempDir::new().expect("failed to create a temporary directory");
  let source = dir.path().join("program.asm");
  fs::write(&source, source_text).expect("failed to write the source listing");

  Workspace {
    source,
    binary: dir.path().join("program.bin"),
    log: dir.path().join("program.log"),
    result: dir.path().join("program.result"),
    _dir: dir,
  }
}

#[test]
fn assemble_then_run_is_deterministic() {
  let text = "load_const 0 10\n\
              load_const 1 3\n\
              read_mem 2 0\n\
              load_const 10 2\n\
              sgn 10 3\n";

  let first = workspace(text);
  assemble_file(&first.source, &first.binary, &first.log).unwrap();
  run_file(&first.binary, 0, 99, &first.result).unwrap();

  let second = workspace(text);
  assemble_file(&second.source, &second.binary, &second.log).unwrap();
  run_file(&second.binary, 0, 99, &second.result).unwrap();

  assert_eq!(fs::read(&first.binary).unwrap(), fs::read(&second.binary).unwrap());
  assert_eq!(
    fs::read_to_string(&first.result).unwrap(),
    fs::read_to_string(&second.result).unwrap()
  );
  assert_eq!(
    fs::read_to_string(&first.log).unwrap(),
    fs::read_to_string(&second.log).unwrap()
  );
}

#[test]
fn the_binary_artifact_is_record_aligned() {
  let work = workspace("load_const 0 1\nbogus 1 2\nsgn 0 1\n");
  let assembly = assemble_file(&work.source, &work.binary, &work.log).unwrap();

  // One rejection, two survivors; the artifact length reflects survivors only.
  assert_eq!(assembly.diagnostics.len(), 1);
  let bytes = fs::read(&work.binary).unwrap();
  assert_eq!(bytes.len(), 2 * RECORD_SIZE);
  assert_eq!(bytes, assembly.binary);
}

#[test]
fn the_log_artifact_lists_each_encoded_instruction() {
  let work = workspace("load_const 0 10\nread_mem 1 0\n");
  assemble_file(&work.source, &work.binary, &work.log).unwrap();

  let log = fs::read_to_string(&work.log).unwrap();
  assert!(log.contains("command"));
  assert!(log.contains("binary"));
  assert!(log.contains("load_const 0 10"));
  assert!(log.contains("E9 00 00 0A 00 00"));
  assert!(log.contains("read_mem 1 0"));
  assert!(log.contains("80 01 00 00 00 00"));
}

#[test]
fn the_result_artifact_covers_the_requested_range() {
  let work = workspace("load_const 0 5\nload_const 5 7\nsgn 0 1\n");
  assemble_file(&work.source, &work.binary, &work.log).unwrap();
  run_file(&work.binary, 0, 5, &work.result).unwrap();

  let result = fs::read_to_string(&work.result).unwrap();
  assert!(result.contains("Memory Address"));
  assert!(result.contains("Value"));
  // Six data rows, addresses ascending 0..=5.
  let data_rows: Vec<&str> = result
    .lines()
    .filter(|line| line.contains('│'))
    .skip(1) // header row
    .collect();
  assert_eq!(data_rows.len(), 6);
}

#[test]
fn a_vector_of_values_is_signed_elementwise() {
  // Adapted from the original acceptance program: write a vector, then store
  // sign(element) for each element through a pointer cell.
  let text = "load_const 0 10\n\
              load_const 1 0\n\
              load_const 2 15\n\
              load_const 20 0\n\
              sgn 20 10\n\
              load_const 20 1\n\
              sgn 20 11\n\
              load_const 20 2\n\
              sgn 20 12\n";

  let work = workspace(text);
  let assembly = assemble_file(&work.source, &work.binary, &work.log).unwrap();
  assert!(assembly.diagnostics.is_empty());

  let mut machine = Machine::new();
  machine.execute(&fs::read(&work.binary).unwrap()).unwrap();
  assert_eq!(machine.memory()[10..13], [1, 0, 1]);
}

#[test]
fn a_fatal_run_still_writes_the_partial_dump() {
  let text = "load_const 0 10\n\
              load_const 1 150\n\
              sgn 1 2\n\
              load_const 3 9\n";

  let work = workspace(text);
  assemble_file(&work.source, &work.binary, &work.log).unwrap();

  let outcome = run_file(&work.binary, 0, 3, &work.result);
  assert!(outcome.is_err());

  // The dump exists and reflects everything written before the abort.
  let result = fs::read_to_string(&work.result).unwrap();
  assert!(result.contains("10"));
  assert!(result.contains("150"));

  let mut machine = Machine::new();
  let run = machine.execute(&fs::read(&work.binary).unwrap());
  assert!(run.is_err());
  assert_eq!(machine.memory()[0], 10);
  assert_eq!(machine.memory()[1], 150);
  assert_eq!(machine.memory()[3], 0);
}

#[test]
fn rejected_lines_do_not_shift_the_survivors() {
  let clean = workspace("load_const 0 1\nload_const 1 2\n");
  let noisy = workspace("load_const 0 1\nload_const 50 -7\nflurb 0 0\nload_const 1 2\n");

  assemble_file(&clean.source, &clean.binary, &clean.log).unwrap();
  let noisy_assembly = assemble_file(&noisy.source, &noisy.binary, &noisy.log).unwrap();

  assert_eq!(noisy_assembly.diagnostics.len(), 2);
  assert_eq!(fs::read(&clean.binary).unwrap(), fs::read(&noisy.binary).unwrap());
}

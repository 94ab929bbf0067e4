/*!
  The human readable textual form of bytecode is called assembly: one
  instruction per line, `<mnemonic> <int> <int>`, whitespace separated. Blank
  lines are skipped, and `#` starts a comment that runs to the end of the
  line. This module parses assembly, validates operand ranges, and drives the
  whole text -> binary + trace phase.

  A bad line never aborts assembly. Each rejected line becomes a diagnostic
  naming the line and the offense, and the surviving instructions are encoded
  in source order with no gaps. Only I/O can fail the phase.
*/

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::fs;
use std::fs::File;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use nom::{
  bytes::complete::take_while1,
  character::complete::{char as one_char, digit1, space0, space1},
  combinator::{all_consuming, map_res, opt, recognize},
  sequence::{delimited, pair, preceded, tuple},
  IResult,
};
use prettytable::Table;
use thiserror::Error;

use crate::address::{Address, BoundsViolation};
use crate::bytecode::{encode_instruction, Instruction, Opcode, RECORD_SIZE};

/// Outcome of parsing one source line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParsedLine<'a> {
  /// A well formed instruction with in-range operands.
  Instruction(Instruction),
  /// The mnemonic does not name an operation.
  NotAnOperation {
    line: u32,
    name: &'a str
  },
  /// The line does not fit the `<mnemonic> <int> <int>` shape.
  Malformed {
    line: u32,
    text: &'a str
  },
  /// An address operand outside the memory store.
  AddressOutOfRange {
    line: u32,
    text: &'a str,
    violation: BoundsViolation
  },
  /// A constant that does not fit `load_const`'s unsigned 16 bit field.
  ConstantOutOfRange {
    line: u32,
    text: &'a str,
    constant: i64
  },
}

impl<'a> Display for ParsedLine<'a> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      ParsedLine::Instruction(instruction) => {
        write!(f, "{}", instruction)
      }
      ParsedLine::NotAnOperation { line, name } => {
        write!(f, "Error on line {}: {} is not an operation.", line, name)
      }
      ParsedLine::Malformed { line, text } => {
        write!(f, "Error on line {}: cannot parse `{}` as `<mnemonic> <int> <int>`.", line, text)
      }
      ParsedLine::AddressOutOfRange { line, text, violation } => {
        write!(f, "Error on line {}: `{}`: {}.", line, text, violation)
      }
      ParsedLine::ConstantOutOfRange { line, text, constant } => {
        write!(f,
          "Error on line {}: `{}`: constant {} does not fit in an unsigned 16 bit field.",
          line, text, constant
        )
      }
    }
  }
}

fn mnemonic(input: &str) -> IResult<&str, &str> {
  take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn integer(input: &str) -> IResult<&str, i64> {
  map_res(
    recognize(pair(opt(one_char('-')), digit1)),
    |out: &str| out.parse::<i64>()
  )(input)
}

fn instruction_line(input: &str) -> IResult<&str, (&str, i64, i64)> {
  all_consuming(delimited(
    space0,
    tuple((mnemonic, preceded(space1, integer), preceded(space1, integer))),
    space0,
  ))(input)
}

/// Turns a shape-valid line into an instruction, or into the rejection that
/// names what was wrong with it.
fn classify<'a>(line: u32, text: &'a str, name: &'a str, a: i64, b: i64) -> ParsedLine<'a> {
  let opcode = match Opcode::from_str(name) {
    Ok(opcode) => opcode,
    Err(_) => return ParsedLine::NotAnOperation { line, name },
  };

  let instruction = match opcode {

    Opcode::LoadConst => {
      let address = match Address::new(a) {
        Ok(address) => address,
        Err(violation) => return ParsedLine::AddressOutOfRange { line, text, violation },
      };
      let constant = match u16::try_from(b) {
        Ok(constant) => constant,
        Err(_) => return ParsedLine::ConstantOutOfRange { line, text, constant: b },
      };
      Instruction::LoadConst { address, constant }
    }

    Opcode::ReadMem => match both_addresses(a, b) {
      Ok((dest, src)) => Instruction::ReadMem { dest, src },
      Err(violation) => return ParsedLine::AddressOutOfRange { line, text, violation },
    },

    Opcode::WriteMem => match both_addresses(a, b) {
      Ok((src, dest)) => Instruction::WriteMem { src, dest },
      Err(violation) => return ParsedLine::AddressOutOfRange { line, text, violation },
    },

    Opcode::Sgn => match both_addresses(a, b) {
      Ok((src, dest)) => Instruction::Sgn { src, dest },
      Err(violation) => return ParsedLine::AddressOutOfRange { line, text, violation },
    },

  };

  ParsedLine::Instruction(instruction)
}

fn both_addresses(a: i64, b: i64) -> Result<(Address, Address), BoundsViolation> {
  Ok((Address::new(a)?, Address::new(b)?))
}

/// Parses a whole assembly listing, one `ParsedLine` per instruction-bearing
/// source line. Recoverable errors are part of the output, never a failure.
pub fn parse_assembly(text: &str) -> Vec<ParsedLine<'_>> {
  let mut parsed = Vec::new();

  for (index, raw) in text.lines().enumerate() {
    let line = index as u32 + 1;

    let source = match raw.find('#') {
      Some(comment_start) => &raw[..comment_start],
      None => raw,
    };
    let source = source.trim();
    if source.is_empty() {
      continue;
    }

    match instruction_line(source) {
      Ok((_rest, (name, a, b))) => parsed.push(classify(line, source, name, a, b)),
      Err(_) => parsed.push(ParsedLine::Malformed { line, text: source }),
    }
  }

  parsed
}

/// One successfully encoded instruction paired with its wire bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TraceRow {
  pub command : String,
  pub record  : [u8; RECORD_SIZE],
}

impl TraceRow {
  /// Hex rendering of the record, two uppercase digits per byte.
  pub fn hex(&self) -> String {
    self.record
      .iter()
      .map(|byte| format!("{:02X}", byte))
      .collect::<Vec<String>>()
      .join(" ")
  }
}

/// Product of one assembly phase: the binary stream plus its audit trail.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assembly {
  pub binary      : Vec<u8>,
  pub trace       : Vec<TraceRow>,
  pub diagnostics : Vec<String>,
}

impl Assembly {
  /// Renders the trace as the two column log table.
  pub fn trace_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*crate::TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubl->"command", ubl->"binary"]);

    for trace_row in &self.trace {
      table.add_row(row![l->trace_row.command, l->trace_row.hex()]);
    }
    table
  }
}

/**
  Assembles a source listing. Rejected lines are reported through
  `diagnostics` and omitted from the stream; the relative order of the
  surviving instructions is preserved, so the stream is always a gapless
  concatenation of records.
*/
pub fn assemble(text: &str) -> Assembly {
  let mut binary = Vec::new();
  let mut trace = Vec::new();
  let mut diagnostics = Vec::new();

  for syntax in parse_assembly(text) {
    match syntax {
      ParsedLine::Instruction(instruction) => {
        let record = encode_instruction(&instruction);
        binary.extend_from_slice(&record);
        trace.push(TraceRow { command: instruction.to_string(), record });
      }
      rejected => diagnostics.push(rejected.to_string()),
    }
  }

  Assembly { binary, trace, diagnostics }
}

/// A fatal assembly failure. Bad source lines are never fatal; only I/O is.
#[derive(Debug, Error)]
pub enum AssembleError {
  #[error("{}: {}", .path.display(), .source)]
  Io {
    path: PathBuf,
    #[source] source: io::Error
  },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> AssembleError + '_ {
  move |source| AssembleError::Io { path: path.to_path_buf(), source }
}

/**
  Runs the whole text -> binary phase against the filesystem: reads `input`,
  writes the record stream to `binary_path` and the trace table to `log_path`.
  Diagnostics for rejected lines go to stderr.
*/
pub fn assemble_file(
    input       : &Path,
    binary_path : &Path,
    log_path    : &Path
  ) -> Result<Assembly, AssembleError>
{
  let text = fs::read_to_string(input).map_err(io_error(input))?;

  let assembly = assemble(&text);
  for diagnostic in &assembly.diagnostics {
    eprintln!("{}", diagnostic);
  }

  fs::write(binary_path, &assembly.binary).map_err(io_error(binary_path))?;

  let mut log = File::create(log_path).map_err(io_error(log_path))?;
  write!(log, "{}", assembly.trace_table()).map_err(io_error(log_path))?;

  Ok(assembly)
}

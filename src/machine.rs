//! Structures and functions for the virtual machine that executes the binary
//! instruction stream against the memory store.

use std::fs;
use std::fs::File;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};

use prettytable::Table;
use thiserror::Error;

use crate::address::{Address, BoundsViolation, MEMORY_SIZE};
use crate::bytecode::{try_decode_instruction, DecodeError, Instruction, RECORD_SIZE};

/// The value type of one memory cell. Cells are signed so that `sgn` can
/// store its -1 result; constants still enter memory through an unsigned
/// 16 bit field.
pub type Cell = i32;

/// A fatal run error. The interpreter never recovers mid-stream: memory
/// effects are cumulative, so nothing executed after a bad access can be
/// trusted.
#[derive(Debug, Error)]
pub enum RunError {
  /// A record that could not be decoded, at the byte offset where it sits.
  #[error("at byte offset {offset}: {source}")]
  Decode {
    offset: usize,
    #[source] source: DecodeError
  },
  /// An indirection that left the memory store, at the byte offset of the
  /// instruction that attempted it.
  #[error("at byte offset {offset}: {source}")]
  Bounds {
    offset: usize,
    #[source] source: BoundsViolation
  },
  #[error("{}: {}", .path.display(), .source)]
  Io {
    path: PathBuf,
    #[source] source: io::Error
  },
}

/// One interpreter run's worth of state: the memory store and the program
/// counter. A fresh `Machine` is zeroed; nothing persists between runs except
/// through the result artifact.
pub struct Machine {
  memory : [Cell; MEMORY_SIZE],
  pc     : usize,
}

impl Machine {

  pub fn new() -> Machine {
    Machine {
      memory : [0; MEMORY_SIZE],
      pc     : 0,
    }
  }

  /// The current contents of the memory store.
  pub fn memory(&self) -> &[Cell; MEMORY_SIZE] {
    &self.memory
  }

  fn load(&self, address: Address) -> Cell {
    self.memory[address.idx()]
  }

  fn store(&mut self, address: Address, value: Cell) {
    self.memory[address.idx()] = value;
  }

  /// One step of indirection: the value at `address`, revalidated as an
  /// address itself.
  fn indirect(&self, address: Address) -> Result<Address, BoundsViolation> {
    Address::new(i64::from(self.load(address)))
  }

  /**
    Runs the fetch-decode-execute loop over the whole stream. Execution halts
    cleanly once fewer than `RECORD_SIZE` bytes remain. An undecodable record
    or a bounds violation aborts the run; memory written before the abort is
    left intact for the partial dump.
  */
  pub fn execute(&mut self, code: &[u8]) -> Result<(), RunError> {
    while self.pc + RECORD_SIZE <= code.len() {
      let record = &code[self.pc..self.pc + RECORD_SIZE];

      let instruction = try_decode_instruction(record)
        .map_err(|source| RunError::Decode { offset: self.pc, source })?;

      self.step(&instruction)
        .map_err(|source| RunError::Bounds { offset: self.pc, source })?;

      self.pc += RECORD_SIZE;
    }
    Ok(())
  }

  fn step(&mut self, instruction: &Instruction) -> Result<(), BoundsViolation> {
    match *instruction {

      Instruction::LoadConst { address, constant } => {
        self.store(address, Cell::from(constant));
        #[cfg(feature = "trace_computation")]
        println!("load_const: {} = {}", address, constant);
      }

      Instruction::ReadMem { dest, src } => {
        let value = self.load(src);
        self.store(dest, value);
        #[cfg(feature = "trace_computation")]
        println!("read_mem: {} = {} = {}", dest, src, value);
      }

      Instruction::WriteMem { src, dest } => {
        let from = self.indirect(src)?;
        let to = self.indirect(dest)?;
        let value = self.load(from);
        self.store(to, value);
        #[cfg(feature = "trace_computation")]
        println!("write_mem: M[{}] = M[{}] -> {} = {}", dest, src, to, value);
      }

      Instruction::Sgn { src, dest } => {
        let from = self.indirect(src)?;
        let value = self.load(from).signum();
        self.store(dest, value);
        #[cfg(feature = "trace_computation")]
        println!("sgn: {} = sign({}) = {}", dest, from, value);
      }

    }
    Ok(())
  }

  /**
    Renders one row per address in the inclusive `[start, end]` range.

    The range is the caller's responsibility: both endpoints must lie inside
    the memory store and `start <= end`. The CLI driver validates this before
    calling; the library does not.
  */
  pub fn dump_table(&self, start: usize, end: usize) -> Table {
    let mut table = Table::new();

    table.set_format(*crate::TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Memory Address", ubl->"Value"]);

    for address in start..=end {
      table.add_row(row![r->address, l->self.memory[address]]);
    }
    table
  }

}

impl Default for Machine {
  fn default() -> Machine {
    Machine::new()
  }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> RunError + '_ {
  move |source| RunError::Io { path: path.to_path_buf(), source }
}

/**
  Runs the whole binary -> result phase against the filesystem: reads the
  record stream from `binary_path`, executes it on a fresh machine, and writes
  the `[start, end]` memory dump to `result_path`.

  The dump is written even after an aborted run, so cells stored before a
  violation remain auditable; the error is still returned.
*/
pub fn run_file(
    binary_path : &Path,
    start       : usize,
    end         : usize,
    result_path : &Path
  ) -> Result<(), RunError>
{
  let code = fs::read(binary_path).map_err(io_error(binary_path))?;

  let mut machine = Machine::new();
  let outcome = machine.execute(&code);

  let mut result = File::create(result_path).map_err(io_error(result_path))?;
  write!(result, "{}", machine.dump_table(start, end)).map_err(io_error(result_path))?;

  outcome
}

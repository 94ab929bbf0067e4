//! A bounds-checked index into the machine's memory store, with some convenience
//! functions.

use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Number of cells in the memory store.
pub const MEMORY_SIZE: usize = 100;

// `AddressValue` is `u16`, as an address travels as an unsigned 16 bit operand field.
pub type AddressValue = u16;

/// An attempted reference to a cell outside the memory store. Carries the raw
/// value so diagnostics can name the offender, signed or not.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
#[error("address {} is outside the memory range 0..={}", .0, MEMORY_SIZE - 1)]
pub struct BoundsViolation(pub i64);

/// An index into the memory store. Construction through `new` is the single
/// bounds check shared by the assembler, the record decoder, and runtime
/// indirection.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Address(AddressValue);

impl Address {

  pub fn new(value: i64) -> Result<Address, BoundsViolation> {
    if value >= 0 && (value as usize) < MEMORY_SIZE {
      Ok(Address(value as AddressValue))
    } else {
      Err(BoundsViolation(value))
    }
  }

  /// Converts the address to an index into the memory vector.
  pub fn idx(self) -> usize {
    self.0 as usize
  }

  /// The address as it travels inside an instruction operand field.
  pub fn value(self) -> AddressValue {
    self.0
  }

}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "M[{}]", self.0)
  }
}

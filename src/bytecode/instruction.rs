use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumString};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::address::Address;

/**
  Opcodes of the virtual machine.

  The discriminants are the opcode byte values of the wire format, so a raw
  opcode byte converts to a variant with `Opcode::try_from` and back with
  `code()`. The `strum` derives map each variant to its snake_case mnemonic in
  both directions, which is all the assembler needs to recognize source text.
*/
#[derive(
StrumDisplay, EnumString, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,       Eq, PartialEq,    Debug,         Hash
)]
#[repr(u8)]
#[strum(serialize_all = "snake_case")]
pub enum Opcode {
  WriteMem  = 112,   // write_mem( src, dest )
  ReadMem   = 128,   // read_mem( dest, src )
  Sgn       = 206,   // sgn( src, dest )
  LoadConst = 233,   // load_const( address, constant )
}

impl Opcode {
  pub fn code(self) -> u8 {
    Into::<u8>::into(self)
  }
}

/// Holds the unencoded components of an instruction. The set is closed: one
/// variant per opcode, operands typed for how the opcode uses them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  /// `memory[address] = constant`
  LoadConst {
    address  : Address,
    constant : u16
  },
  /// `memory[dest] = memory[src]`
  ReadMem {
    dest : Address,
    src  : Address
  },
  /// `memory[memory[dest]] = memory[memory[src]]` (both operands indirect)
  WriteMem {
    src  : Address,
    dest : Address
  },
  /// `memory[dest] = sign(memory[memory[src]])`
  Sgn {
    src  : Address,
    dest : Address
  },
}

impl Instruction {
  pub fn opcode(&self) -> Opcode {
    match self {
      Instruction::LoadConst { .. } => Opcode::LoadConst,
      Instruction::ReadMem   { .. } => Opcode::ReadMem,
      Instruction::WriteMem  { .. } => Opcode::WriteMem,
      Instruction::Sgn       { .. } => Opcode::Sgn,
    }
  }
}

// Renders exactly as written in assembly source, which is also how the trace
// artifact's `command` column reads.
impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Instruction::LoadConst { address, constant } => {
        write!(f, "{} {} {}", Opcode::LoadConst, address.value(), constant)
      }

      Instruction::ReadMem { dest, src } => {
        write!(f, "{} {} {}", Opcode::ReadMem, dest.value(), src.value())
      }

      Instruction::WriteMem { src, dest } => {
        write!(f, "{} {} {}", Opcode::WriteMem, src.value(), dest.value())
      }

      Instruction::Sgn { src, dest } => {
        write!(f, "{} {} {}", Opcode::Sgn, src.value(), dest.value())
      }

    }
  }
}


#[cfg(test)]
mod tests {
  use std::convert::TryFrom;
  use std::str::FromStr;

  use super::*;

  #[test]
  fn opcode_bytes_round_trip() {
    for &opcode in &[Opcode::WriteMem, Opcode::ReadMem, Opcode::Sgn, Opcode::LoadConst] {
      assert_eq!(Opcode::try_from(opcode.code()).ok(), Some(opcode));
    }
    assert_eq!(Opcode::LoadConst.code(), 233);
    assert_eq!(Opcode::ReadMem.code(), 128);
    assert_eq!(Opcode::WriteMem.code(), 112);
    assert_eq!(Opcode::Sgn.code(), 206);
  }

  #[test]
  fn mnemonics_round_trip() {
    assert_eq!(Opcode::from_str("load_const"), Ok(Opcode::LoadConst));
    assert_eq!(Opcode::from_str("read_mem"), Ok(Opcode::ReadMem));
    assert_eq!(Opcode::from_str("write_mem"), Ok(Opcode::WriteMem));
    assert_eq!(Opcode::from_str("sgn"), Ok(Opcode::Sgn));
    assert!(Opcode::from_str("halt").is_err());
    assert_eq!(Opcode::Sgn.to_string(), "sgn");
  }

  #[test]
  fn instructions_render_as_assembly() {
    let address = Address::new(3).unwrap();
    let instruction = Instruction::LoadConst { address, constant: 41 };
    assert_eq!(instruction.to_string(), "load_const 3 41");
    assert_eq!(instruction.opcode(), Opcode::LoadConst);
  }
}

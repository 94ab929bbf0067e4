/*!
  This module is responsible for the encoding and decoding of binary instruction
  records, and for the bit-field packer both are built on.
*/
use std::convert::TryFrom;

use thiserror::Error;

use super::{Instruction, Opcode};
use crate::address::{Address, BoundsViolation};

/// Width of one instruction record in bytes.
pub const RECORD_SIZE: usize = 6;

/// Bit offset of operand A within the packed record.
pub const OPERAND_A_OFFSET: u32 = 8;
/// Bit offset of operand B within the packed record.
pub const OPERAND_B_OFFSET: u32 = 24;

/// How `pack_fields` treats a value wider than its field.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Packing {
  /// Shift-or the values exactly as given. An oversized value bleeds into the
  /// neighboring field.
  Raw,
  /// Reject any value that does not fit between its offset and the start of
  /// the next field, or the end of the record for the last field.
  Checked,
}

/// A value rejected by `Packing::Checked`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
#[error("value {value} does not fit in the {width} bit field at bit offset {offset}")]
pub struct FieldOverflow {
  pub value  : u64,
  pub offset : u32,
  pub width  : u32,
}

/**
  Packs an opcode byte and an ordered list of `(value, bit offset)` pairs into
  the little-endian encoding of `opcode | Σ(value << offset)`, truncated to
  `size` bytes.

  Fields must be listed in ascending offset order, with every offset below
  `size * 8`. Under `Packing::Checked` each field's width is the distance to
  the next field's offset; under `Packing::Raw` nothing is masked or checked,
  which reproduces the silently-corrupting encoder this format descends from.
*/
pub fn pack_fields(
    opcode  : u8,
    fields  : &[(u64, u32)],
    size    : usize,
    packing : Packing
  ) -> Result<Vec<u8>, FieldOverflow>
{
  if packing == Packing::Checked {
    for (i, &(value, offset)) in fields.iter().enumerate() {
      let next_offset = match fields.get(i + 1) {
        Some(&(_, next)) => next,
        None             => size as u32 * 8,
      };
      let width = next_offset.saturating_sub(offset);
      if width < 64 && value >> width != 0 {
        return Err(FieldOverflow { value, offset, width });
      }
    }
  }

  let mut bits = u128::from(opcode);
  for &(value, offset) in fields {
    bits |= u128::from(value) << offset;
  }

  Ok(bits.to_le_bytes()[..size].to_vec())
}

/**
  Encodes the instruction into one wire record. Operand ranges are enforced by
  the `Instruction` type itself, so encoding cannot fail or corrupt a
  neighboring field.
*/
pub fn encode_instruction(instruction: &Instruction) -> [u8; RECORD_SIZE] {
  let (opcode, operand_a, operand_b) = match *instruction {

    Instruction::LoadConst { address, constant } =>
      (Opcode::LoadConst, address.value(), constant),

    Instruction::ReadMem { dest, src } =>
      (Opcode::ReadMem, dest.value(), src.value()),

    Instruction::WriteMem { src, dest } =>
      (Opcode::WriteMem, src.value(), dest.value()),

    Instruction::Sgn { src, dest } =>
      (Opcode::Sgn, src.value(), dest.value()),

  };

  let bits = u64::from(opcode.code())
           | u64::from(operand_a) << OPERAND_A_OFFSET
           | u64::from(operand_b) << OPERAND_B_OFFSET;

  let mut record = [0u8; RECORD_SIZE];
  record.copy_from_slice(&bits.to_le_bytes()[..RECORD_SIZE]);
  record
}

/// A record that cannot be decoded. Any of these aborts an interpreter run.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
pub enum DecodeError {
  /// The opcode byte does not name an operation.
  #[error("unknown opcode {0:#04X}")]
  UnknownOpcode(u8),
  /// Fewer than `RECORD_SIZE` bytes were presented for decoding.
  #[error("truncated instruction record of {0} bytes")]
  Truncated(usize),
  /// A direct operand names a cell outside the memory store.
  #[error(transparent)]
  OutOfBounds(#[from] BoundsViolation),
}

/// Decodes one wire record back into an `Instruction`, re-validating address
/// operands against the memory store.
pub fn try_decode_instruction(record: &[u8]) -> Result<Instruction, DecodeError> {
  if record.len() < RECORD_SIZE {
    return Err(DecodeError::Truncated(record.len()));
  }

  let opcode = Opcode::try_from(record[0])
    .map_err(|_| DecodeError::UnknownOpcode(record[0]))?;
  let operand_a = u16::from_le_bytes([record[1], record[2]]);
  let operand_b = u16::from_le_bytes([record[3], record[4]]);

  let instruction = match opcode {

    Opcode::LoadConst => Instruction::LoadConst {
      address: Address::new(i64::from(operand_a))?,
      constant: operand_b,
    },

    Opcode::ReadMem => Instruction::ReadMem {
      dest: Address::new(i64::from(operand_a))?,
      src: Address::new(i64::from(operand_b))?,
    },

    Opcode::WriteMem => Instruction::WriteMem {
      src: Address::new(i64::from(operand_a))?,
      dest: Address::new(i64::from(operand_b))?,
    },

    Opcode::Sgn => Instruction::Sgn {
      src: Address::new(i64::from(operand_a))?,
      dest: Address::new(i64::from(operand_b))?,
    },

  };

  Ok(instruction)
}

/*!

  The VM uses 6 byte little-endian instruction records. Every record has the
  same shape regardless of opcode, so the stream can be walked without a
  length table. The sizes of the record components are as follows:

    Opcode:     8 bits, byte 0
    Operand A: 16 bits, bytes 1-2, little-endian
    Operand B: 16 bits, bytes 3-4, little-endian
    Padding:    8 bits, byte 5, always zero

  A valid stream is a concatenation of records, so its length is a multiple of
  six. There is no header, magic number, or version field; the format is
  positional only.

  One design decision that needed to be made is whether the decoded form keeps
  the opcode and raw operand words separate or pairs each opcode with typed
  operands. The instruction set is closed and tiny, so `Instruction` carries
  one variant per opcode with operands already validated as `Address` values
  where the opcode treats them as addresses. The interpreter then dispatches
  on the variant alone, and an out-of-range direct operand is caught at decode
  time rather than mid-execution.

*/

mod assembly;
mod binary;
mod instruction;

pub use assembly::{assemble, assemble_file, parse_assembly, Assembly, AssembleError,
                   ParsedLine, TraceRow};
pub use binary::{encode_instruction, pack_fields, try_decode_instruction, DecodeError,
                 FieldOverflow, Packing, OPERAND_A_OFFSET, OPERAND_B_OFFSET, RECORD_SIZE};
pub use instruction::{Instruction, Opcode};

/*!

  An assembler and interpreter for a six-byte fixed-width instruction set.

  The crate is two independently callable phases joined only by the binary
  artifact that flows between them:

  ```text
  source text -> [`bytecode::assemble`] -> binary stream + trace table ->⋯

  ⋯-> [`machine::Machine::execute`] -> final memory state -> memory-dump table
  ```

  The assembler recovers from bad source lines (each rejection is reported and
  the line is omitted), while the interpreter aborts on the first bounds
  violation: memory effects are cumulative, so nothing executed after a bad
  access can be trusted.

*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod bytecode;
pub mod machine;

use prettytable::format as TableFormat;

lazy_static! {
  /// Shared style for the trace and memory-dump tables.
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

/*!

  Intcode has a single word type, a signed 64 bit integer, used for instructions, parameters,
  and data alike. Instructions are not stored as such: they are decoded from the word at the
  instruction pointer each time it is executed. An instruction word is laid out in decimal:

    ...[Mode 3][Mode 2][Mode 1][Opcode:2 digits]

  The two low decimal digits are the opcode. Each further digit, least significant first, is the
  addressing mode of the corresponding parameter, with absent digits meaning position mode. The
  parameters themselves are the words immediately following the instruction word.

  Since an instruction's modes are only meaningful relative to its operation, an enum is only
  used for the operation itself, and `Instruction` pairs it with a fixed array of modes.

*/

mod assembly;
mod instruction;
mod parameter;

pub use assembly::{disassemble, format_program, parse_program};
pub use instruction::{Instruction, Mode, Operation, MAX_PARAMETERS};
pub use parameter::{effective_address, read_value, Parameter};

pub type Word = i64;

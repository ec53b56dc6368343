/*!
  An Intcode virtual machine. Programs are flat sequences of integers that are decoded and
  executed in place, with positional, immediate and relative addressing, memory that grows on
  demand, and buffered input and output. A machine pauses when it needs input it has not been
  given, so several machines can be chained into a feedback ring (see `amplifier`).
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;
extern crate strum;
extern crate strum_macros;

pub mod address;
pub mod amplifier;
pub mod bytecode;
pub mod config;
pub mod error;
pub mod io;
pub mod machine;
pub mod memory;

pub use address::Address;
pub use amplifier::{max_thruster_signal, permutations, AmplifierRing};
pub use bytecode::{disassemble, format_program, parse_program, Instruction, Mode, Operation, Word};
pub use config::MachineConfig;
pub use error::{Error, Result};
pub use machine::{find_noun_verb, Machine, Status};
pub use memory::Memory;

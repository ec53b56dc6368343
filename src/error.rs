//! Errors raised by the machine, the program loader, and the amplifier ring. None of them are
//! recoverable by the machine itself. Pausing for input is a status, not an error.

use thiserror::Error;

use crate::bytecode::Word;
use crate::machine::Status;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
  #[error("invalid opcode {opcode} in instruction word {word}")]
  InvalidOpcode {
    word   : Word,
    opcode : Word
  },

  #[error("invalid addressing mode {0}")]
  InvalidAddressingMode(Word),

  #[error("invalid address {0}")]
  InvalidAddress(Word),

  #[error("operation `{operation}` not allowed while {status}")]
  InvalidState {
    operation : &'static str,
    status    : Status
  },

  #[error("arithmetic overflow: {lhs} {operator} {rhs}")]
  ArithmeticOverflow {
    lhs      : Word,
    operator : char,
    rhs      : Word
  },

  #[error("step limit of {0} instructions exceeded")]
  StepLimitExceeded(u64),

  #[error("amplifier ring deadlocked: every live stage is waiting for input")]
  Deadlock,

  #[error("the last amplifier halted without emitting a value")]
  NoOutput,

  #[error("invalid phase settings: {0}")]
  InvalidPhases(String),

  #[error("could not parse program text near `{0}`")]
  Parse(String),
}

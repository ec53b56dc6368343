use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, IntoStaticStr, EnumString, EnumIter};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::bytecode::Word;
use crate::error::{Error, Result};

/// No operation takes more parameters than this.
pub const MAX_PARAMETERS: usize = 3;

/**
  Opcodes of the virtual machine.

  The discriminant of each variant is its numeric opcode, so a decoded opcode converts to an
  `Operation` with `TryFrom` and an `Operation` converts back with `code()`. The parameter layout
  of each operation is given by `Operation::reads()` and `Operation::writes()`: every operation
  reads its first `reads()` parameters and writes through the one after them, if any.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug,  Hash
)]
#[repr(u8)]
pub enum Operation {
  Add                = 1,  // add( a, b, c )
  Multiply           = 2,  // multiply( a, b, c )
  Store              = 3,  // store( a )
  Output             = 4,  // output( a )
  JumpIfTrue         = 5,  // jump_if_true( a, b )
  JumpIfFalse        = 6,  // jump_if_false( a, b )
  LessThan           = 7,  // less_than( a, b, c )
  Equals             = 8,  // equals( a, b, c )
  AdjustRelativeBase = 9,  // adjust_relative_base( a )
  Halt               = 99, // halt
}

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Number of parameters read as values.
  pub fn reads(&self) -> usize {
    match self {
      | Operation::Add
      | Operation::Multiply
      | Operation::JumpIfTrue
      | Operation::JumpIfFalse
      | Operation::LessThan
      | Operation::Equals             => 2,

      | Operation::Output
      | Operation::AdjustRelativeBase => 1,

      | Operation::Store
      | Operation::Halt               => 0,
    }
  }

  /// Number of parameters used as write targets, either zero or one.
  pub fn writes(&self) -> usize {
    match self {
      | Operation::Add
      | Operation::Multiply
      | Operation::Store
      | Operation::LessThan
      | Operation::Equals => 1,
      _                   => 0
    }
  }

  pub fn arity(&self) -> usize {
    self.reads() + self.writes()
  }

  /// Width of the whole instruction in words, the default instruction pointer advance.
  pub fn width(&self) -> usize {
    1 + self.arity()
  }
}

/// How a raw parameter word is interpreted.
#[derive(
StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug,  Hash
)]
#[repr(u8)]
pub enum Mode {
  /// The parameter is the address of the value.
  Position  = 0,
  /// The parameter is the value.
  Immediate = 1,
  /// The parameter plus the relative base is the address of the value.
  Relative  = 2,
}

impl Mode {
  fn from_digit(digit: Word) -> Result<Mode> {
    u8::try_from(digit)
      .ok()
      .and_then(|d| Mode::try_from(d).ok())
      .ok_or(Error::InvalidAddressingMode(digit))
  }
}

/// An operation together with the addressing mode of each of its parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
  pub operation : Operation,
  modes         : [Mode; MAX_PARAMETERS],
}

impl Instruction {

  /**
    Splits an instruction word into its opcode, the two low decimal digits, and the modes of its
    parameters, the remaining digits read least significant first. Digits beyond those present
    in the word are mode 0. Only as many digits as the operation has parameters are examined.
  */
  pub fn decode(word: Word) -> Result<Instruction> {
    let opcode = word % 100;
    let operation =
      u8::try_from(opcode)
        .ok()
        .and_then(|code| Operation::try_from(code).ok())
        .ok_or(Error::InvalidOpcode { word, opcode })?;

    let mut modes = [Mode::Position; MAX_PARAMETERS];
    let mut digits = word / 100;
    for slot in modes.iter_mut().take(operation.arity()) {
      *slot = Mode::from_digit(digits % 10)?;
      digits /= 10;
    }

    Ok(Instruction { operation, modes })
  }

  /// The instruction word this instruction decodes from, with no superfluous mode digits.
  pub fn encode(&self) -> Word {
    self.modes()
        .iter()
        .rev()
        .fold(0, |acc, mode| acc * 10 + Into::<u8>::into(*mode) as Word)
        * 100
        + self.operation.code() as Word
  }

  /// One mode per parameter of the operation.
  pub fn modes(&self) -> &[Mode] {
    &self.modes[..self.operation.arity()]
  }

  pub fn mode(&self, parameter: usize) -> Mode {
    self.modes()[parameter]
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}({})",
      self.operation,
      self.modes()
          .iter()
          .map(|mode| format!("{}", mode))
          .collect::<Vec<String>>()
          .join(", ")
    )
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;
  use strum::IntoEnumIterator;

  #[test]
  fn decodes_opcode_and_modes() {
    let instruction = Instruction::decode(1002).unwrap();
    assert_eq!(instruction.operation, Operation::Multiply);
    assert_eq!(instruction.modes(), &[Mode::Position, Mode::Immediate, Mode::Position]);
  }

  #[test]
  fn missing_mode_digits_are_position() {
    let instruction = Instruction::decode(7).unwrap();
    assert_eq!(instruction.modes(), &[Mode::Position; 3]);

    let instruction = Instruction::decode(109).unwrap();
    assert_eq!(instruction.operation, Operation::AdjustRelativeBase);
    assert_eq!(instruction.modes(), &[Mode::Immediate]);
  }

  #[test]
  fn halt_has_no_modes() {
    let instruction = Instruction::decode(99).unwrap();
    assert_eq!(instruction.operation, Operation::Halt);
    assert!(instruction.modes().is_empty());
    assert_eq!(instruction.operation.width(), 1);
  }

  #[test]
  fn unknown_opcodes_are_rejected() {
    assert_eq!(Instruction::decode(42), Err(Error::InvalidOpcode { word: 42, opcode: 42 }));
    assert_eq!(Instruction::decode(0), Err(Error::InvalidOpcode { word: 0, opcode: 0 }));
    assert_eq!(Instruction::decode(-1), Err(Error::InvalidOpcode { word: -1, opcode: -1 }));
  }

  #[test]
  fn unknown_mode_digits_are_rejected() {
    assert_eq!(Instruction::decode(301), Err(Error::InvalidAddressingMode(3)));
    // Digits past the last parameter are never examined.
    assert!(Instruction::decode(3_00_104).is_ok());
  }

  #[test]
  fn widths_follow_the_opcode_table() {
    let widths: Vec<(u8, usize)> = Operation::iter().map(|op| (op.code(), op.width())).collect();
    assert_eq!(
      widths,
      vec![(1, 4), (2, 4), (3, 2), (4, 2), (5, 3), (6, 3), (7, 4), (8, 4), (9, 2), (99, 1)]
    );
  }

  #[test]
  fn encode_inverts_decode() {
    for word in &[1, 1002, 21107, 204, 1105, 99, 203] {
      assert_eq!(Instruction::decode(*word).unwrap().encode(), *word);
    }
  }

  #[test]
  fn operations_have_names() {
    assert_eq!(Operation::from_str("JumpIfTrue"), Ok(Operation::JumpIfTrue));
    assert_eq!(format!("{}", Instruction::decode(1101).unwrap()), "Add(Immediate, Immediate, Position)");
  }
}

/*!
  Resolution of instruction parameters. A raw parameter word means different things depending on
  its addressing mode:

    Position:  the word is an address
    Immediate: the word is the value itself
    Relative:  the word plus the relative base is an address

  Write targets must name an address, so immediate mode is invalid for them.
*/

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use crate::address::Address;
use crate::bytecode::{Mode, Word};
use crate::error::{Error, Result};
use crate::memory::Memory;

/// Computes the address a write-target (or memory reference) parameter names.
pub fn effective_address(mode: Mode, raw_value: Word, relative_base: Word) -> Result<Address> {
  match mode {
    Mode::Position  => Address::try_from(raw_value),
    Mode::Relative  => {
      let target =
        raw_value
          .checked_add(relative_base)
          .ok_or(Error::ArithmeticOverflow { lhs: raw_value, operator: '+', rhs: relative_base })?;
      Address::try_from(target)
    }
    Mode::Immediate => Err(Error::InvalidAddressingMode(Mode::Immediate as Word)),
  }
}

/// Computes the value a read parameter denotes.
pub fn read_value(mode: Mode, raw_value: Word, relative_base: Word, memory: &Memory) -> Result<Word> {
  match mode {
    Mode::Immediate => Ok(raw_value),
    mode            => Ok(memory.value_at(&effective_address(mode, raw_value, relative_base)?)),
  }
}

/// A raw parameter word paired with its mode, used for disassembly.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Parameter {
  pub mode  : Mode,
  pub value : Word,
}

impl Display for Parameter {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.mode {
      Mode::Position                     => write!(f, "[{}]", self.value),
      Mode::Immediate                    => write!(f, "{}", self.value),
      Mode::Relative if self.value < 0   => write!(f, "[rb{}]", self.value),
      Mode::Relative                     => write!(f, "[rb+{}]", self.value),
    }
  }
}

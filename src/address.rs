//! A validated, non-negative memory address with some convenience functions.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::ops::Add;

use crate::bytecode::Word;
use crate::error::Error;

// `AddressNumberType` is `usize`, as it is naturally an index into a memory store.
pub type AddressNumberType = usize;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct Address(AddressNumberType);

impl Address {
  pub fn new(idx: AddressNumberType) -> Address {
    Address(idx)
  }

  /// Converts the address to an index into memory.
  pub fn idx(&self) -> AddressNumberType {
    self.0
  }
}

/// Words name addresses directly in position and relative mode. Negative words do not.
impl TryFrom<Word> for Address {
  type Error = Error;

  fn try_from(word: Word) -> Result<Address, Error> {
    match AddressNumberType::try_from(word) {
      Ok(idx) => Ok(Address(idx)),
      Err(_)  => Err(Error::InvalidAddress(word))
    }
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "MEM[{}]", self.0)
  }
}

// Increment an address
impl Add<AddressNumberType> for Address {
  type Output = Address;
  fn add(self, rhs: AddressNumberType) -> Address {
    Address(self.0 + rhs)
  }
}

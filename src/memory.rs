//! The machine's memory store: conceptually infinite, every cell starting at zero.

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use prettytable::Table;

use crate::address::{Address, AddressNumberType};
use crate::bytecode::Word;
use crate::error::Result;
use crate::machine::TABLE_DISPLAY_FORMAT;

/// Writes more than this many cells past the end of the dense store go to the sparse overflow map
/// instead of resizing the vector.
pub const MAX_DENSE_GROWTH: AddressNumberType = 1 << 16;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Memory {
  dense    : Vec<Word>,
  overflow : BTreeMap<AddressNumberType, Word>,
}

impl Memory {

  pub fn new(program: &[Word]) -> Memory {
    Memory {
      dense    : program.to_vec(),
      overflow : BTreeMap::new(),
    }
  }

  /// Reads the word at a raw (possibly negative) address.
  pub fn read(&self, address: Word) -> Result<Word> {
    Ok(self.value_at(&Address::try_from(address)?))
  }

  /// Writes the word at a raw (possibly negative) address.
  pub fn write(&mut self, address: Word, value: Word) -> Result<()> {
    self.set_value_at(&Address::try_from(address)?, value);
    Ok(())
  }

  pub fn value_at(&self, address: &Address) -> Word {
    match self.dense.get(address.idx()) {
      Some(word) => *word,
      None       => self.overflow.get(&address.idx()).copied().unwrap_or(0)
    }
  }

  /**
    Sets the value at the given address, dynamically growing the dense store if the address is
    near its end. Far addresses land in the overflow map so that one distant write does not
    allocate everything in between.
  */
  pub fn set_value_at(&mut self, address: &Address, value: Word) {
    let idx = address.idx();

    if idx < self.dense.len() {
      self.dense[idx] = value;
    } else if idx - self.dense.len() <= MAX_DENSE_GROWTH {
      self.dense.resize(idx + 1, 0);
      self.dense[idx] = value;
      self.absorb_overflow();
    } else {
      self.overflow.insert(idx, value);
    }
  }

  /// Moves overflow cells the dense store has grown over back into it.
  fn absorb_overflow(&mut self) {
    let len = self.dense.len();
    let absorbed: Vec<AddressNumberType> =
      self.overflow.range(..len).map(|(idx, _)| *idx).collect();

    for idx in absorbed {
      if let Some(value) = self.overflow.remove(&idx) {
        self.dense[idx] = value;
      }
    }
  }

  /// One past the highest address that has ever been written or loaded.
  pub fn extent(&self) -> AddressNumberType {
    match self.overflow.keys().next_back() {
      Some(idx) => idx + 1,
      None      => self.dense.len()
    }
  }

  /// Iterates over every non-zero cell in address order.
  pub fn nonzero_cells(&self) -> impl Iterator<Item = (Address, Word)> + '_ {
    self.dense
        .iter()
        .enumerate()
        .map(|(idx, word)| (idx, *word))
        .chain(self.overflow.iter().map(|(idx, word)| (*idx, *word)))
        .filter(|(_, word)| *word != 0)
        .map(|(idx, word)| (Address::new(idx), word))
  }

  pub fn make_table(&self, highlight: Option<Address>) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (address, word) in self.nonzero_cells() {
      match Some(address) == highlight {
        true  => table.add_row(row![r->format!("* --> {} =", address), word]),
        false => table.add_row(row![r->format!("{} =", address), word]),
      };
    }
    table
  }
}

impl Display for Memory {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.make_table(None))
  }
}

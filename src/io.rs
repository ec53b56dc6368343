//! The machine's input and output channels.
//!
//! Execution is single threaded, so neither channel blocks: an empty input queue makes the
//! machine pause instead, and output simply accumulates until the caller looks at it.

use std::collections::VecDeque;

use crate::bytecode::Word;

/// A first in, first out queue of words waiting to be consumed by `Store` instructions.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InputQueue {
  queue: VecDeque<Word>,
}

impl InputQueue {
  pub fn new(initial: &[Word]) -> InputQueue {
    InputQueue { queue: initial.iter().copied().collect() }
  }

  /// Appends values at the tail, preserving their order.
  pub fn extend(&mut self, values: &[Word]) {
    self.queue.extend(values.iter().copied());
  }

  /// Consumes the value at the head.
  pub fn pop(&mut self) -> Option<Word> {
    self.queue.pop_front()
  }

  pub fn len(&self) -> usize {
    self.queue.len()
  }

  pub fn is_empty(&self) -> bool {
    self.queue.is_empty()
  }
}

/**
  Everything the machine has emitted, in order. The full history stays available as a snapshot,
  while `take` hands out each value once, oldest first, for callers that consume output
  incrementally.
*/
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OutputLog {
  history : Vec<Word>,
  taken   : usize,
}

impl OutputLog {
  pub fn new() -> OutputLog {
    OutputLog::default()
  }

  pub fn push(&mut self, value: Word) {
    self.history.push(value);
  }

  pub fn history(&self) -> &[Word] {
    &self.history
  }

  pub fn last(&self) -> Option<Word> {
    self.history.last().copied()
  }

  /// Values emitted but not yet taken.
  pub fn pending(&self) -> &[Word] {
    &self.history[self.taken..]
  }

  pub fn take(&mut self) -> Option<Word> {
    let value = self.history.get(self.taken).copied();
    if value.is_some() {
      self.taken += 1;
    }
    value
  }

  pub fn take_all(&mut self) -> Vec<Word> {
    let pending = self.pending().to_vec();
    self.taken = self.history.len();
    pending
  }
}

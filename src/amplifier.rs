/*!
  A ring of machines running the same program, each one's output wired into the next one's input
  and the last one's output wired back into the first. Each stage is first given a phase setting,
  then the first stage is given the initial signal.

  Stages depend on each other cyclically, so none of them can simply run to completion. Instead
  the ring is driven round-robin: a stage is resumed whenever its predecessor has emitted values
  it has not yet been given, and skipped otherwise. The ring is done when the last stage halts. A
  full round in which no stage could be resumed while the last stage is still alive is a deadlock.
*/

use tracing::debug;

use crate::bytecode::Word;
use crate::error::{Error, Result};
use crate::machine::Machine;

pub struct AmplifierRing {
  stages         : Vec<Machine>,
  /// For each stage, how many of its predecessor's outputs it has been given.
  forwarded      : Vec<usize>,
  initial_signal : Word,
  started        : bool,
}

impl AmplifierRing {

  /// One stage per phase setting, each loaded with its own copy of `program`.
  pub fn new(program: &[Word], phases: &[Word]) -> Result<AmplifierRing> {
    if phases.is_empty() {
      return Err(Error::InvalidPhases("a ring needs at least one stage".to_string()));
    }

    Ok(AmplifierRing {
      stages         : phases.iter().map(|phase| Machine::new(program, &[*phase])).collect(),
      forwarded      : vec![0; phases.len()],
      initial_signal : 0,
      started        : false,
    })
  }

  /// The value fed to the first stage after its phase setting. Defaults to zero.
  pub fn with_initial_signal(mut self, signal: Word) -> AmplifierRing {
    self.initial_signal = signal;
    self
  }

  pub fn stages(&self) -> &[Machine] {
    &self.stages
  }

  fn predecessor(&self, stage: usize) -> usize {
    (stage + self.stages.len() - 1) % self.stages.len()
  }

  fn last(&self) -> &Machine {
    // A ring always has at least one stage.
    &self.stages[self.stages.len() - 1]
  }

  /// Drives the ring until the last stage halts and returns the last value it emitted.
  pub fn run(&mut self) -> Result<Word> {
    if !self.started {
      self.started = true;
      for stage in self.stages.iter_mut() {
        stage.run()?;
      }
      if !self.stages[0].is_halted() {
        self.stages[0].resume(&[self.initial_signal])?;
      }
    }

    let mut round = 0;
    while !self.last().is_halted() {
      round += 1;
      let mut progressed = false;

      for stage in 0..self.stages.len() {
        if self.stages[stage].is_halted() {
          continue;
        }

        let fresh = self.stages[self.predecessor(stage)].outputs()[self.forwarded[stage]..].to_vec();
        if fresh.is_empty() {
          continue;
        }

        self.forwarded[stage] += fresh.len();
        let status = self.stages[stage].resume(&fresh)?;
        debug!(round, stage, forwarded = fresh.len(), %status, "resumed amplifier");
        progressed = true;
      }

      if !progressed && !self.last().is_halted() {
        return Err(Error::Deadlock);
      }
    }

    self.last().last_output().ok_or(Error::NoOutput)
  }
}

/// Every ordering of `values`, in the order Heap's algorithm generates them.
pub fn permutations(values: &[Word]) -> Vec<Vec<Word>> {
  fn generate(k: usize, values: &mut Vec<Word>, out: &mut Vec<Vec<Word>>) {
    if k <= 1 {
      out.push(values.clone());
      return;
    }
    for i in 0..k - 1 {
      generate(k - 1, values, out);
      match k % 2 == 0 {
        true  => values.swap(i, k - 1),
        false => values.swap(0, k - 1),
      }
    }
    generate(k - 1, values, out);
  }

  let mut values = values.to_vec();
  let mut out = vec![];
  generate(values.len(), &mut values, &mut out);
  out
}

/**
  Runs a ring for every ordering of `phase_values` and returns the highest signal the last stage
  produced, together with the phase order that produced it. Ties keep the first ordering found.
*/
pub fn max_thruster_signal(program: &[Word], phase_values: &[Word]) -> Result<(Word, Vec<Word>)> {
  if phase_values.is_empty() {
    return Err(Error::InvalidPhases("no phase values given".to_string()));
  }

  let mut orderings = permutations(phase_values).into_iter();
  let first = orderings.next().unwrap_or_default();
  let mut best = (AmplifierRing::new(program, &first)?.run()?, first);

  for phases in orderings {
    let signal = AmplifierRing::new(program, &phases)?.run()?;
    if signal > best.0 {
      best = (signal, phases);
    }
  }

  Ok(best)
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  const SERIES: [Word; 17] = [3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0];

  #[test]
  fn series_ring_passes_the_signal_once() {
    let mut ring = AmplifierRing::new(&SERIES, &[4, 3, 2, 1, 0]).unwrap();
    assert_eq!(ring.run(), Ok(43210));
    assert!(ring.stages().iter().all(Machine::is_halted));
  }

  #[test]
  fn initial_signal_is_configurable() {
    let mut ring = AmplifierRing::new(&SERIES, &[0]).unwrap().with_initial_signal(7);
    // A single stage computes 10 * signal + phase.
    assert_eq!(ring.run(), Ok(70));
  }

  #[test]
  fn empty_rings_are_rejected() {
    assert!(matches!(AmplifierRing::new(&SERIES, &[]), Err(Error::InvalidPhases(_))));
    assert_eq!(
      max_thruster_signal(&SERIES, &[]),
      Err(Error::InvalidPhases("no phase values given".to_string()))
    );
  }

  #[test]
  fn waiting_on_a_halted_predecessor_is_a_deadlock() {
    // Every stage reads its phase and a signal, emits nothing, and asks for more input.
    let program = [3, 9, 3, 9, 3, 9, 99, 0, 0, 0];
    let mut ring = AmplifierRing::new(&program, &[1, 2]).unwrap();
    assert_eq!(ring.run(), Err(Error::Deadlock));
  }

  #[test]
  fn silent_last_stage_has_no_output() {
    let program = [3, 5, 99, 0, 0, 0];
    let mut ring = AmplifierRing::new(&program, &[1]).unwrap();
    assert_eq!(ring.run(), Err(Error::NoOutput));
  }

  #[test]
  fn permutations_are_complete_and_distinct() {
    let all = permutations(&[5, 6, 7, 8, 9]);
    assert_eq!(all.len(), 120);
    let distinct: HashSet<Vec<Word>> = all.into_iter().collect();
    assert_eq!(distinct.len(), 120);
    assert_eq!(permutations(&[]), vec![Vec::<Word>::new()]);
  }

  #[test]
  fn finds_the_best_series_ordering() {
    assert_eq!(max_thruster_signal(&SERIES, &[0, 1, 2, 3, 4]), Ok((43210, vec![4, 3, 2, 1, 0])));
  }
}

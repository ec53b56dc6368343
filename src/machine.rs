//! Structures and functions for the Intcode machine: the fetch-decode-execute loop, its registers,
//! and its pausable execution model.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};
use strum_macros::Display as StrumDisplay;
use tracing::{debug, info, trace};

use crate::address::Address;
use crate::bytecode::{effective_address, read_value, Instruction, Operation, Word};
use crate::config::MachineConfig;
use crate::error::{Error, Result};
use crate::io::{InputQueue, OutputLog};
use crate::memory::Memory;

/**
  The execution status of a machine.

  ```text
  Running ──(Store, no input)──> AwaitingInput ──(resume)──> Running
     └──(Halt)──> Halted
  ```
  `Halted` is terminal.
*/
#[derive(StrumDisplay, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Status {
  Running,
  AwaitingInput,
  Halted,
}

/// What the instruction pointer does after an instruction executes.
enum Flow {
  Advance,
  Jump(Address),
  Pause,
}

pub struct Machine {
  // Memory store, exclusively owned
  memory : Memory,

  // Registers //
  ip            : Address, // Instruction pointer
  relative_base : Word,    // Added to relative mode parameters
  status        : Status,

  // I/O channels //
  input  : InputQueue,
  output : OutputLog,

  config : MachineConfig,
  steps  : u64, // Instructions executed so far
}

impl Machine {

  // region Construction and accessors

  /// Loads `program` at address zero with `initial_input` queued, first element consumed first.
  pub fn new(program: &[Word], initial_input: &[Word]) -> Machine {
    Machine::with_config(program, initial_input, MachineConfig::default())
  }

  pub fn with_config(program: &[Word], initial_input: &[Word], config: MachineConfig) -> Machine {
    Machine {
      memory        :  Memory::new(program),
      ip            :  Address::default(),
      relative_base :  0,
      status        :  Status::Running,
      input         :  InputQueue::new(initial_input),
      output        :  OutputLog::new(),
      config,
      steps         :  0,
    }
  }

  pub fn status(&self) -> Status {
    self.status
  }

  pub fn is_halted(&self) -> bool {
    self.status == Status::Halted
  }

  pub fn instruction_pointer(&self) -> Address {
    self.ip
  }

  pub fn relative_base(&self) -> Word {
    self.relative_base
  }

  pub fn steps(&self) -> u64 {
    self.steps
  }

  /// Every value emitted so far, in emission order.
  pub fn outputs(&self) -> &[Word] {
    self.output.history()
  }

  pub fn last_output(&self) -> Option<Word> {
    self.output.last()
  }

  /// Takes the oldest output value not taken before.
  pub fn take_output(&mut self) -> Option<Word> {
    self.output.take()
  }

  /// Takes every output value not taken before.
  pub fn drain_outputs(&mut self) -> Vec<Word> {
    self.output.take_all()
  }

  /// Number of input values queued but not yet consumed.
  pub fn pending_input(&self) -> usize {
    self.input.len()
  }

  pub fn peek(&self, address: Word) -> Result<Word> {
    self.memory.read(address)
  }

  /// Patches memory, typically before the first `run`.
  pub fn poke(&mut self, address: Word, value: Word) -> Result<()> {
    self.memory.write(address, value)
  }

  // endregion

  // region Execution

  /**
    Executes instructions until the machine halts or waits for input.

    A fatal error stops execution at the failing instruction but leaves the status `Running`: the
    instruction pointer still names that instruction and none of its writes have happened, so
    running again fails the same way.
  */
  pub fn run(&mut self) -> Result<Status> {
    while self.status == Status::Running {
      self.step()?;
    }
    Ok(self.status)
  }

  /// Queues `values` as input and continues execution.
  pub fn resume(&mut self, values: &[Word]) -> Result<Status> {
    if self.status == Status::Halted {
      return Err(Error::InvalidState { operation: "resume", status: self.status });
    }

    self.input.extend(values);
    if self.status == Status::AwaitingInput {
      debug!(ip = self.ip.idx(), queued = self.input.len(), "resuming");
      self.status = Status::Running;
    }
    self.run()
  }

  /**
    Executes exactly one instruction, or pauses at a `Store` with no input available. Returns the
    resulting status. Only a running machine can step; a paused one must be resumed. On error
    the machine is left as it was before the call.
  */
  pub fn step(&mut self) -> Result<Status> {
    if self.status != Status::Running {
      return Err(Error::InvalidState { operation: "step", status: self.status });
    }
    if let Some(limit) = self.config.step_limit {
      if self.steps >= limit {
        return Err(Error::StepLimitExceeded(limit));
      }
    }

    let instruction = Instruction::decode(self.memory.value_at(&self.ip))?;
    trace!(ip = self.ip.idx(), rb = self.relative_base, %instruction, "step");

    match self.execute(&instruction)? {
      Flow::Advance       => self.ip = self.ip + instruction.operation.width(),
      Flow::Jump(address) => self.ip = address,
      Flow::Pause         => {
        debug!(ip = self.ip.idx(), "awaiting input");
        self.status = Status::AwaitingInput;
      }
    }
    self.steps += 1;

    #[cfg(feature = "trace_computation")] println!("{}", self);

    Ok(self.status)
  }

  fn execute(&mut self, instruction: &Instruction) -> Result<Flow> {
    match instruction.operation {

      Operation::Add => {
        let (a, b) = (self.read(instruction, 0)?, self.read(instruction, 1)?);
        let sum = a.checked_add(b).ok_or(Error::ArithmeticOverflow { lhs: a, operator: '+', rhs: b })?;
        self.write(instruction, 2, sum)?;
        Ok(Flow::Advance)
      }

      Operation::Multiply => {
        let (a, b) = (self.read(instruction, 0)?, self.read(instruction, 1)?);
        let product = a.checked_mul(b).ok_or(Error::ArithmeticOverflow { lhs: a, operator: '*', rhs: b })?;
        self.write(instruction, 2, product)?;
        Ok(Flow::Advance)
      }

      Operation::Store => {
        // Resolve first so that a malformed target fails even when there is no input.
        let target = self.target(instruction, 0)?;
        match self.input.pop() {
          Some(value) => {
            self.memory.set_value_at(&target, value);
            Ok(Flow::Advance)
          }
          None => Ok(Flow::Pause)
        }
      }

      Operation::Output => {
        let value = self.read(instruction, 0)?;
        if self.config.echo_output {
          info!(value, "output");
        }
        self.output.push(value);
        Ok(Flow::Advance)
      }

      Operation::JumpIfTrue | Operation::JumpIfFalse => {
        let condition = self.read(instruction, 0)? != 0;
        let target = self.read(instruction, 1)?;
        match condition == (instruction.operation == Operation::JumpIfTrue) {
          true  => Ok(Flow::Jump(Address::try_from(target)?)),
          false => Ok(Flow::Advance)
        }
      }

      Operation::LessThan => {
        let (a, b) = (self.read(instruction, 0)?, self.read(instruction, 1)?);
        self.write(instruction, 2, (a < b) as Word)?;
        Ok(Flow::Advance)
      }

      Operation::Equals => {
        let (a, b) = (self.read(instruction, 0)?, self.read(instruction, 1)?);
        self.write(instruction, 2, (a == b) as Word)?;
        Ok(Flow::Advance)
      }

      Operation::AdjustRelativeBase => {
        let offset = self.read(instruction, 0)?;
        self.relative_base =
          self.relative_base
              .checked_add(offset)
              .ok_or(Error::ArithmeticOverflow { lhs: self.relative_base, operator: '+', rhs: offset })?;
        Ok(Flow::Advance)
      }

      Operation::Halt => {
        debug!(ip = self.ip.idx(), steps = self.steps + 1, "halted");
        self.status = Status::Halted;
        Ok(Flow::Advance)
      }

    }
  }

  /// The raw word of the given parameter of the instruction at the instruction pointer.
  fn raw(&self, parameter: usize) -> Word {
    self.memory.value_at(&(self.ip + 1 + parameter))
  }

  fn read(&self, instruction: &Instruction, parameter: usize) -> Result<Word> {
    read_value(instruction.mode(parameter), self.raw(parameter), self.relative_base, &self.memory)
  }

  fn target(&self, instruction: &Instruction, parameter: usize) -> Result<Address> {
    effective_address(instruction.mode(parameter), self.raw(parameter), self.relative_base)
  }

  fn write(&mut self, instruction: &Instruction, parameter: usize, value: Word) -> Result<()> {
    let target = self.target(instruction, parameter)?;
    self.memory.set_value_at(&target, value);
    Ok(())
  }

  // endregion

  // region Caller conveniences

  /**
    Runs `program` to completion with `noun` at address 1 and `verb` at address 2, returning the
    word left at address 0. The program must not ask for input.
  */
  pub fn run_with_patch(program: &[Word], noun: Word, verb: Word) -> Result<Word> {
    let mut machine = Machine::new(program, &[]);
    machine.poke(1, noun)?;
    machine.poke(2, verb)?;

    match machine.run()? {
      Status::Halted => machine.peek(0),
      status         => Err(Error::InvalidState { operation: "run_with_patch", status })
    }
  }

  // endregion

}

/**
  Searches nouns and verbs in `0..=99` for a pair that makes `program` leave `target` at address 0.
  Pairs for which the program fails are skipped.
*/
pub fn find_noun_verb(program: &[Word], target: Word) -> Option<(Word, Word)> {
  for noun in 0..=99 {
    for verb in 0..=99 {
      match Machine::run_with_patch(program, noun, verb) {
        Ok(value) if value == target => return Some((noun, verb)),
        Ok(_)                        => {}
        Err(e)                       => trace!(noun, verb, error = %e, "patched program failed"),
      }
    }
  }
  None
}

lazy_static! {
  pub static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
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

impl Machine {
  fn make_register_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);
    table.add_row(row![r->"IP =", self.ip]);
    table.add_row(row![r->"RB =", self.relative_base]);
    table.add_row(row![r->"Input =", format!("{} queued", self.input.len())]);
    table.add_row(row![r->"Output =", format!("{} emitted", self.output.history().len())]);
    table.add_row(row![r->"Steps =", self.steps]);
    table
  }
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let r_table = self.make_register_table();
    let m_table = self.memory.make_table(Some(self.ip));

    let mut combined_table = table!([r_table, m_table]);

    combined_table.set_titles(row![ub->"Registers", ub->"Memory"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "Status: {}\n{}", self.status, combined_table)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_and_multiply_write_in_place() {
    let mut machine = Machine::new(&[1, 0, 0, 0, 99], &[]);
    assert_eq!(machine.run(), Ok(Status::Halted));
    assert_eq!(machine.peek(0), Ok(2));

    let mut machine = Machine::new(&[2, 4, 4, 5, 99, 0], &[]);
    machine.run().unwrap();
    assert_eq!(machine.peek(5), Ok(9801));
  }

  #[test]
  fn self_modifying_program() {
    let mut machine = Machine::new(&[1, 1, 1, 4, 99, 5, 6, 0, 99], &[]);
    machine.run().unwrap();
    assert_eq!(machine.peek(0), Ok(30));
    assert_eq!(machine.peek(4), Ok(2));
  }

  #[test]
  fn store_pauses_without_advancing() {
    let mut machine = Machine::new(&[3, 5, 4, 5, 99, 0], &[]);
    assert_eq!(machine.step(), Ok(Status::AwaitingInput));
    assert_eq!(machine.instruction_pointer(), Address::new(0));
    assert_eq!(
      machine.step(),
      Err(Error::InvalidState { operation: "step", status: Status::AwaitingInput })
    );
    assert_eq!(machine.resume(&[17]), Ok(Status::Halted));
    assert_eq!(machine.outputs(), &[17]);
  }

  #[test]
  fn resume_after_halt_is_an_error() {
    let mut machine = Machine::new(&[99], &[]);
    machine.run().unwrap();
    assert_eq!(
      machine.resume(&[1]),
      Err(Error::InvalidState { operation: "resume", status: Status::Halted })
    );
    assert_eq!(machine.instruction_pointer(), Address::new(1));
  }

  #[test]
  fn resume_on_a_fresh_machine_just_runs() {
    let mut machine = Machine::new(&[3, 0, 4, 0, 99], &[]);
    assert_eq!(machine.resume(&[5]), Ok(Status::Halted));
    assert_eq!(machine.outputs(), &[5]);
  }

  #[test]
  fn jumps_set_the_pointer() {
    // Prints 0 if the input was zero, 1 otherwise.
    let program = [3, 3, 1105, -1, 9, 1101, 0, 0, 12, 4, 12, 99, 1];
    let mut machine = Machine::new(&program, &[0]);
    machine.run().unwrap();
    assert_eq!(machine.outputs(), &[0]);

    let mut machine = Machine::new(&program, &[5]);
    machine.run().unwrap();
    assert_eq!(machine.outputs(), &[1]);
  }

  #[test]
  fn negative_jump_targets_are_invalid() {
    let mut machine = Machine::new(&[1105, 1, -4, 99], &[]);
    assert_eq!(machine.run(), Err(Error::InvalidAddress(-4)));
  }

  #[test]
  fn immediate_write_targets_are_invalid() {
    let mut machine = Machine::new(&[10001, 0, 0, 0, 99], &[]);
    assert_eq!(machine.run(), Err(Error::InvalidAddressingMode(1)));

    let mut machine = Machine::new(&[103, 0, 99], &[]);
    assert_eq!(machine.run(), Err(Error::InvalidAddressingMode(1)));
  }

  #[test]
  fn unknown_opcodes_stop_execution() {
    let mut machine = Machine::new(&[1101, 1, 1, 0, 42], &[]);
    assert_eq!(machine.run(), Err(Error::InvalidOpcode { word: 42, opcode: 42 }));
    assert_eq!(machine.peek(0), Ok(2));
  }

  #[test]
  fn failed_runs_leave_the_machine_at_the_failing_instruction() {
    let program = [1101, 1, 1, 9, 1101, Word::MAX, 1, 0, 99, 0];
    let overflow = Error::ArithmeticOverflow { lhs: Word::MAX, operator: '+', rhs: 1 };

    let mut machine = Machine::new(&program, &[]);
    assert_eq!(machine.run(), Err(overflow.clone()));
    assert_eq!(machine.status(), Status::Running);
    assert_eq!(machine.instruction_pointer(), Address::new(4));
    assert_eq!(machine.steps(), 1);
    assert_eq!(machine.peek(0), Ok(1101));
    assert_eq!(machine.peek(9), Ok(2));

    assert_eq!(machine.run(), Err(overflow));
    assert_eq!(machine.instruction_pointer(), Address::new(4));
    assert_eq!(machine.steps(), 1);
  }

  #[test]
  fn relative_base_adjusts() {
    let program = [109, 19, 204, -34, 99];

    let mut machine = Machine::new(&program, &[]);
    machine.relative_base = 2000;
    machine.poke(1985, 1234).unwrap();
    machine.run().unwrap();
    assert_eq!(machine.relative_base(), 2019);
    assert_eq!(machine.outputs(), &[1234]);

    // From a base of zero the same program reads below address zero.
    let mut machine = Machine::new(&program, &[]);
    assert_eq!(machine.run(), Err(Error::InvalidAddress(-15)));
  }

  #[test]
  fn overflow_is_reported() {
    let mut machine = Machine::new(&[1102, Word::MAX, 2, 0, 99], &[]);
    assert_eq!(
      machine.run(),
      Err(Error::ArithmeticOverflow { lhs: Word::MAX, operator: '*', rhs: 2 })
    );
  }

  #[test]
  fn step_limit_stops_infinite_loops() {
    let config = MachineConfig::new().step_limit(100);
    let mut machine = Machine::with_config(&[1105, 1, 0], &[], config);
    assert_eq!(machine.run(), Err(Error::StepLimitExceeded(100)));
    assert_eq!(machine.steps(), 100);
  }

  #[test]
  fn outputs_can_be_taken_incrementally() {
    let mut machine = Machine::new(&[104, 1, 104, 2, 3, 0, 104, 3, 99], &[]);
    assert_eq!(machine.run(), Ok(Status::AwaitingInput));
    assert_eq!(machine.take_output(), Some(1));
    machine.resume(&[0]).unwrap();
    assert_eq!(machine.drain_outputs(), vec![2, 3]);
    assert_eq!(machine.take_output(), None);
    assert_eq!(machine.outputs(), &[1, 2, 3]);
  }

  #[test]
  fn patched_runs_report_address_zero() {
    let program = [1, 0, 0, 0, 99, 3, 4];
    assert_eq!(Machine::run_with_patch(&program, 5, 6), Ok(7));
    // Noun 2, verb 7 adds MEM[2] to the unwritten MEM[7] and is found first.
    assert_eq!(find_noun_verb(&program, 7), Some((2, 7)));
    assert_eq!(find_noun_verb(&program, 1_000), None);
  }

  #[test]
  fn display_lists_registers_and_memory() {
    let mut machine = Machine::new(&[1101, 2, 3, 7, 99], &[]);
    machine.run().unwrap();
    let text = format!("{}", machine);
    assert!(text.starts_with("Status: Halted"));
    assert!(text.contains("MEM[7]"));
  }
}

//! Run-time settings of a machine. Compile-time tracing is the `trace_computation` feature.

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MachineConfig {
  /// Log every output value at `info` level as it is emitted.
  pub echo_output : bool,
  /// Fail with `Error::StepLimitExceeded` after this many instructions in total.
  pub step_limit  : Option<u64>,
}

impl MachineConfig {
  pub fn new() -> MachineConfig {
    MachineConfig::default()
  }

  pub fn echo_output(mut self, echo_output: bool) -> MachineConfig {
    self.echo_output = echo_output;
    self
  }

  pub fn step_limit(mut self, limit: u64) -> MachineConfig {
    self.step_limit = Some(limit);
    self
  }
}

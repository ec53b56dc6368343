use tracing_subscriber::EnvFilter;

use intcode::{disassemble, max_thruster_signal, parse_program, Machine, MachineConfig, Result};

// The feedback loop sample from the amplifier exercise.
const FEEDBACK_PROGRAM: &str =
  "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5\n";

// Compares its input to 8: prints 999 below, 1000 equal, 1001 above.
const COMPARE_PROGRAM: &str =
  "3,21,1008,21,8,20,1005,20,22,107,8,21,20,1006,20,31,1106,0,36,98,0,0,1002,21,125,20,4,20,\
   1105,1,46,104,999,1105,1,46,1101,1000,1,20,4,20,1105,1,46,98,99";

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  #[cfg(feature = "trace_computation")]
  println!("Computation Tracing ENABLED");

  if let Err(e) = demo() {
    eprintln!("Error: {}", e);
    std::process::exit(1);
  }
}

fn demo() -> Result<()> {
  let program = parse_program(COMPARE_PROGRAM)?;
  println!("# Listing");
  for line in disassemble(&program) {
    println!("{}", line);
  }

  for input in 7..=9 {
    let mut machine = Machine::with_config(&program, &[], MachineConfig::new().echo_output(true));
    machine.run()?;
    machine.resume(&[input])?;
    println!("compare({}) = {:?}", input, machine.outputs());
  }
  println!();

  let program = parse_program(FEEDBACK_PROGRAM)?;
  let (signal, phases) = max_thruster_signal(&program, &[5, 6, 7, 8, 9])?;
  println!("Highest thruster signal {} from phases {:?}", signal, phases);

  Ok(())
}

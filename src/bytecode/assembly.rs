/*!
  Textual forms of a program. Programs are stored as comma separated decimal words, which
  `parse_program` reads. `disassemble` goes the other way, rendering memory as a listing of
  human readable instructions using the `strum` derives of `Operation`.
*/

use nom::{
  branch::alt,
  character::complete::{char as one_char, digit1, multispace0},
  combinator::{all_consuming, map_res, opt, recognize},
  multi::separated_list0,
  sequence::{delimited, pair},
  IResult
};

use crate::bytecode::{Instruction, Parameter, Word};
use crate::error::{Error, Result};

/// How much of the unparsed text is quoted in a parse error.
const ERROR_CONTEXT_LENGTH: usize = 16;

fn word_p(input: &str) -> IResult<&str, Word> {
  map_res(
    recognize(pair(opt(alt((one_char('-'), one_char('+')))), digit1)),
    |out: &str| out.parse::<Word>()
  )(input)
}

fn program_p(input: &str) -> IResult<&str, Vec<Word>> {
  all_consuming(
    separated_list0(delimited(multispace0, one_char(','), multispace0), word_p)
  )(input)
}

/**
  Parses comma separated decimal words. Whitespace around the whole text, such as a trailing
  newline, and around the commas is ignored. Anything else that is not a word is an error quoting
  the text where parsing stopped.
*/
pub fn parse_program(text: &str) -> Result<Vec<Word>> {
  match program_p(text.trim()) {
    Ok((_rest, words)) => Ok(words),
    | Err(nom::Err::Error(e))
    | Err(nom::Err::Failure(e)) => {
      Err(Error::Parse(e.input.chars().take(ERROR_CONTEXT_LENGTH).collect()))
    }
    Err(nom::Err::Incomplete(_)) => Err(Error::Parse(String::new()))
  }
}

/// Renders a program as comma separated decimal words, the inverse of `parse_program`.
pub fn format_program(program: &[Word]) -> String {
  program
    .iter()
    .map(Word::to_string)
    .collect::<Vec<String>>()
    .join(",")
}

/**
  Renders a program as one line per instruction. Words that do not decode, or whose parameters
  would run off the end of the program, are listed as data.
*/
pub fn disassemble(program: &[Word]) -> Vec<String> {
  let mut lines = vec![];
  let mut address = 0;

  while address < program.len() {
    let word = program[address];
    match Instruction::decode(word) {

      Ok(instruction) if address + instruction.operation.width() <= program.len() => {
        let parameters =
          instruction
            .modes()
            .iter()
            .zip(&program[address + 1..])
            .map(|(mode, value)| format!("{}", Parameter { mode: *mode, value: *value }))
            .collect::<Vec<String>>()
            .join(", ");
        lines.push(format!("{:>5}: {} {}", address, instruction.operation, parameters).trim_end().to_string());
        address += instruction.operation.width();
      }

      _ => {
        lines.push(format!("{:>5}: Data {}", address, word));
        address += 1;
      }

    }
  }
  lines
}

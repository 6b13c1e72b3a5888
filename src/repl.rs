use crate::environment::SharedEnvironment;
use crate::interpreter::TreeWalkInterpreter;
use crate::parser::{
    error::ParserError,
    formatter::{BasicFormatter as BasicProgramFormatter, ProgramFormatter},
    Parser,
};
use crate::value::{
    formatter::{BasicFormatter as BasicValueFormatter, ValueFormatter},
    Object,
};
use std::io::{BufRead, Write};

pub const PROMPT: &str = ">> ";

/// Line oriented session. Every line is parsed on its own while bindings
/// persist in one environment for the lifetime of the session.
#[derive(Debug)]
pub struct Repl {
    prompt: String,
    environment: SharedEnvironment,
    interpreter: TreeWalkInterpreter,
}

impl Repl {
    pub fn new() -> Self {
        Self::with_prompt(PROMPT)
    }

    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            environment: SharedEnvironment::new(),
            interpreter: TreeWalkInterpreter::new(),
        }
    }

    /// Evaluates one line against the session environment. `Ok(None)` means the
    /// line produced no value, as for a `let` binding or a blank line.
    pub fn eval_line(&mut self, line: &str) -> Result<Option<Object>, Vec<ParserError>> {
        let mut parser = Parser::new(line);
        let program = parser.parse_program();
        if !parser.errors().is_empty() {
            return Err(parser.errors().to_vec());
        }
        Ok(self
            .interpreter
            .eval_program(&program, &mut self.environment))
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> std::io::Result<()> {
        let program_formatter = BasicProgramFormatter;
        let value_formatter = BasicValueFormatter;
        let mut lines = input.lines();

        loop {
            write!(output, "{}", self.prompt)?;
            output.flush()?;

            let Some(line) = lines.next() else {
                break;
            };
            match self.eval_line(&line?) {
                Ok(Some(value)) => writeln!(output, "{}", value_formatter.format(&value))?,
                Ok(None) => {}
                Err(errors) => {
                    for error in errors.iter() {
                        writeln!(output, "{}", program_formatter.format_error(error))?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod line_map;
pub mod parser;
pub mod value;

use std::io::{self, BufRead, Write};

use error::{EvalError, ParseError};

/// What went wrong running a source file, wrapping whichever pipeline
/// stage failed. The CLI driver matches on this to decide the process
/// exit code; library embedders get the underlying error untouched.
#[derive(Debug)]
pub enum RunError {
    Parse(ParseError),
    Eval(EvalError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Parse(_) => write!(f, "parse failed"),
            RunError::Eval(e) => write!(f, "{}", e),
        }
    }
}

impl From<ParseError> for RunError {
    fn from(err: ParseError) -> Self {
        RunError::Parse(err)
    }
}

impl From<EvalError> for RunError {
    fn from(err: EvalError) -> Self {
        RunError::Eval(err)
    }
}

/// Parses and runs a whole Noh program, reading `scanNum`/`scanStr` input
/// from `input` and writing `print` output to `output`. This is the one
/// entry point both the `noh` binary and tests drive the interpreter
/// through.
pub fn run_source<'a>(
    source: &str,
    input: Box<dyn BufRead + 'a>,
    output: Box<dyn Write + 'a>,
) -> Result<(), RunError> {
    let module = parser::Parser::parse(source)?;
    let mut evaluator = eval::Evaluator::new(&module, input, output)?;
    evaluator.run()?;
    Ok(())
}

/// Convenience wrapper over [`run_source`] that wires up real stdin/stdout.
pub fn run_source_with_stdio(source: &str) -> Result<(), RunError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_source(
        source,
        Box::new(io::BufReader::new(stdin)),
        Box::new(stdout),
    )
}

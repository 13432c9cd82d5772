// Noh -- a small scripting language
//
// Licensed under the GNU General Public License, version 3 or later.
// See the LICENSE file in the root of this repository.

//! Error types for both pipeline stages.

use snafu::Snafu;

use crate::line_map::{Pos, Span};
use crate::value::ValueKind;

/// A parse failure. The parser as a whole only ever surfaces a single
/// failure -- there is no error recovery -- but it carries span and
/// position information so that an embedder can produce a precise message
/// even though the CLI driver only prints "parse failed".
#[derive(Debug, PartialEq, Eq, Snafu)]
#[snafu(display("{} at line {}, column {}", message, pos.start.line, pos.start.column))]
pub struct ParseError {
    pub span: Span,
    pub pos: std::ops::Range<Pos>,
    pub message: String,
}

/// Every fatal condition the evaluator can hit. There is no recoverable
/// error path exposed to Noh programs -- any of these terminates the
/// program immediately, per the language's error-handling design.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum EvalError {
    #[snafu(display("unknown identifier `{}`", name))]
    UnknownIdentifier { name: String },

    #[snafu(display(
        "type mismatch: expected {:?}, found {:?} for `{}`",
        expected,
        found,
        name
    ))]
    TypeMismatch {
        name: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[snafu(display(
        "function `{}` called with {} argument(s), expected {}",
        name,
        got,
        expected
    ))]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[snafu(display("call to unknown function `{}`", name))]
    UnknownFunction { name: String },

    #[snafu(display("`{}` is already defined in this scope", name))]
    Redeclaration { name: String },

    #[snafu(display("`{}` is a reserved word and cannot name a function or variable", name))]
    ReservedName { name: String },

    #[snafu(display("no entry function: `main` must take no parameters"))]
    MainTakesArguments,

    #[snafu(display("function `{}` is defined more than once", name))]
    DuplicateFunction { name: String },

    #[snafu(display("division by zero"))]
    DivisionByZero,

    #[snafu(display("modulo by zero"))]
    ModuloByZero,

    #[snafu(display("tuple index {} out of range (length {})", index, len))]
    IndexOutOfRange { index: i64, len: usize },

    #[snafu(display("indexing requires a tuple on the left-hand side"))]
    NotATuple,

    #[snafu(display("`break` used outside of a loop"))]
    BreakOutsideLoop,

    #[snafu(display("`continue` used outside of a loop"))]
    ContinueOutsideLoop,

    #[snafu(display("unexpected end of input while reading a value"))]
    UnexpectedEof,

    #[snafu(display("failed to parse a number from input"))]
    InvalidNumberInput,
}

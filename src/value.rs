// Noh -- a small scripting language
//
// Licensed under the GNU General Public License, version 3 or later.
// See the LICENSE file in the root of this repository.

//! Runtime values.
//!
//! A runtime value is a three-way tagged union. Values are produced by
//! evaluating expression nodes and are stored directly in scope frames --
//! there is no need to re-wrap results into AST nodes the way the
//! original C++ implementation does, since the value kinds already carry
//! their own type tag.

use std::fmt;

use crate::error::EvalError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
    Tuple(Vec<Value>),
}

/// The tag of a [`Value`], without its payload. Used purely for error
/// messages (`"expected Int, found Str"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Str,
    Tuple,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Int => write!(f, "Int"),
            ValueKind::Str => write!(f, "Str"),
            ValueKind::Tuple => write!(f, "Tuple"),
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Str(_) => ValueKind::Str,
            Value::Tuple(_) => ValueKind::Tuple,
        }
    }

    /// Coerce into an integer, or fail with a `TypeMismatch` attributed to
    /// `name` (used for both identifier lookups and general expressions,
    /// where `name` is a descriptive label rather than a binding name).
    pub fn as_int(&self, name: &str) -> Result<i64, EvalError> {
        match self {
            Value::Int(v) => Ok(*v),
            other => Err(EvalError::TypeMismatch {
                name: name.to_string(),
                expected: ValueKind::Int,
                found: other.kind(),
            }),
        }
    }

    pub fn as_str(&self, name: &str) -> Result<&str, EvalError> {
        match self {
            Value::Str(v) => Ok(v),
            other => Err(EvalError::TypeMismatch {
                name: name.to_string(),
                expected: ValueKind::Str,
                found: other.kind(),
            }),
        }
    }

    pub fn as_tuple(&self, name: &str) -> Result<&[Value], EvalError> {
        match self {
            Value::Tuple(v) => Ok(v),
            other => Err(EvalError::TypeMismatch {
                name: name.to_string(),
                expected: ValueKind::Tuple,
                found: other.kind(),
            }),
        }
    }

    /// Render this value for `print`, one line, no trailing newline (the
    /// caller adds it).
    pub fn display(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Str(v) => v.clone(),
            Value::Tuple(items) => {
                let rendered: Vec<String> = items.iter().map(Value::display).collect();
                format!("[{}]", rendered.join(", "))
            }
        }
    }
}

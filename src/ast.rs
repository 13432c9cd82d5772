// Noh -- a small scripting language
//
// Licensed under the GNU General Public License, version 3 or later.
// See the LICENSE file in the root of this repository.

//! The abstract syntax tree produced by the parser.
//!
//! Every node is a plain enum/struct variant -- no base class, no downcasting.
//! Each node carries its source [`Span`] alongside its data so that the
//! evaluator can produce precise diagnostics without re-deriving positions.

use crate::line_map::Span;

/// Wraps a piece of AST data together with the span of source text it came
/// from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub data: T,
}

impl<T> Spanned<T> {
    pub fn new(span: Span, data: T) -> Self {
        Self { span, data }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub funcs: Vec<Func>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Func {
    pub name: Spanned<String>,
    pub params: Vec<Spanned<String>>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub callee: Spanned<String>,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
    /// Synthetic tuple-indexing operator. Never produced by the parser --
    /// the parser always emits `Expr::Call` for `ident(expr)`; the
    /// evaluator rewrites a call to a non-function name into `IdxAt` once
    /// it knows the function table (see `eval::Evaluator::call`).
    IdxAt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Number(i64),
    Str(String),
    Ident(String),
    Tuple(Vec<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call(Call),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    pub from: Expr,
    pub to: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    Break,
    Continue,
    Exit,
    Return,
    Print,
    ScanNum,
    ScanStr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Builtin {
    pub kind: BuiltinKind,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_body: Vec<Stmt>,
    pub else_body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForStmt {
    pub var: Spanned<String>,
    pub range: Range,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Assign { name: Spanned<String>, value: Expr },
    ReAssign { name: Spanned<String>, value: Expr },
    Builtin(Spanned<Builtin>),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Call(Spanned<Call>),
}

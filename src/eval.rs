// Noh -- a small scripting language
//
// Licensed under the GNU General Public License, version 3 or later.
// See the LICENSE file in the root of this repository.

//! The tree-walking evaluator.
//!
//! Where the original interpreter this is descended from keeps a handful
//! of process-wide mutable flags (`exit`, `return`, `break`, `continue`)
//! and checks them after every statement, this evaluator threads the same
//! information through return values instead: [`Flow`] for the three
//! flags a loop or function body can observe directly, and [`Signal`] for
//! `exit`, which is modelled as a control value that unwinds through `?`
//! all the way back to [`Evaluator::run`] rather than being polled.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use crate::ast::*;
use crate::error::EvalError;
use crate::value::Value;

/// What a statement (or a whole block of them) did, from the point of
/// view of whatever is running it next.
#[derive(Debug)]
enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// `exit` bypasses `Flow` entirely: it must unwind through every loop,
/// `if`, and function-call boundary on the way out, which is exactly
/// what `?` does for an `Err`. Ordinary evaluation errors ride the same
/// channel so every helper only has to propagate one type.
#[derive(Debug)]
enum Signal {
    Exit,
    Error(EvalError),
}

impl From<EvalError> for Signal {
    fn from(err: EvalError) -> Self {
        Signal::Error(err)
    }
}

type EvalResult<T> = Result<T, Signal>;

/// Names a Noh program may not use for a function or a variable, mirroring
/// the original interpreter's `builtin` set (`eval_noh.hpp`). A few of
/// these (`num`, `str`, `then`, `end`) are not actual keywords in this
/// grammar and so lex as plain identifiers; they are still off-limits.
const RESERVED_NAMES: &[&str] = &[
    "break", "continue", "exit", "return", "print", "scanNum", "scanStr", "var", "num", "str",
    "fn", "if", "then", "else", "end", "while", "for",
];

fn check_not_reserved(name: &str) -> Result<(), EvalError> {
    if RESERVED_NAMES.contains(&name) {
        return Err(EvalError::ReservedName {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[derive(Default)]
struct Frame {
    vars: HashMap<String, Value>,
}

/// Executes one [`Module`] against one source of stdin-like input and one
/// sink for stdout-like output. Kept generic over both so tests can swap
/// in an in-memory buffer instead of the real streams.
pub struct Evaluator<'a> {
    functions: HashMap<&'a str, &'a Func>,
    entry: Option<&'a Func>,
    scopes: Vec<Frame>,
    barrier: usize,
    input: Box<dyn BufRead + 'a>,
    output: Box<dyn Write + 'a>,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        module: &'a Module,
        input: Box<dyn BufRead + 'a>,
        output: Box<dyn Write + 'a>,
    ) -> Result<Self, EvalError> {
        let mut functions = HashMap::new();
        for func in &module.funcs {
            check_not_reserved(&func.name.data)?;
            for param in &func.params {
                check_not_reserved(&param.data)?;
            }
            if functions.insert(func.name.data.as_str(), func).is_some() {
                return Err(EvalError::DuplicateFunction {
                    name: func.name.data.clone(),
                });
            }
        }

        let entry = match functions.get("main") {
            Some(main_func) => {
                if !main_func.params.is_empty() {
                    return Err(EvalError::MainTakesArguments);
                }
                Some(*main_func)
            }
            None => module.funcs.iter().find(|f| f.params.is_empty()),
        };

        Ok(Evaluator {
            functions,
            entry,
            scopes: Vec::new(),
            barrier: 0,
            input,
            output,
        })
    }

    /// Runs the entry function to completion, or does nothing if the
    /// module has none.
    pub fn run(&mut self) -> Result<(), EvalError> {
        let entry = match self.entry {
            Some(f) => f,
            None => return Ok(()),
        };
        match self.call_function(entry, Vec::new()) {
            Ok(_) => Ok(()),
            Err(Signal::Exit) => Ok(()),
            Err(Signal::Error(err)) => Err(err),
        }
    }

    // -- calling -----------------------------------------------------

    fn call_function(&mut self, func: &'a Func, args: Vec<Value>) -> EvalResult<Value> {
        if args.len() != func.params.len() {
            return Err(Signal::Error(EvalError::ArityMismatch {
                name: func.name.data.clone(),
                expected: func.params.len(),
                got: args.len(),
            }));
        }

        log::trace!("call {}: pushing barrier at depth {}", func.name.data, self.scopes.len());

        let saved_barrier = self.barrier;
        let new_barrier = self.scopes.len();

        let mut frame = Frame::default();
        for (param, arg) in func.params.iter().zip(args) {
            frame.vars.insert(param.data.clone(), arg);
        }
        self.scopes.push(frame);
        self.barrier = new_barrier;

        let flow = self.exec_block(&func.body);

        self.scopes.truncate(new_barrier);
        self.barrier = saved_barrier;

        log::trace!("call {}: returned, barrier restored to depth {}", func.name.data, saved_barrier);

        match flow? {
            Flow::Normal => Ok(Value::Int(0)),
            Flow::Return(value) => Ok(value),
            Flow::Break => Err(Signal::Error(EvalError::BreakOutsideLoop)),
            Flow::Continue => Err(Signal::Error(EvalError::ContinueOutsideLoop)),
        }
    }

    fn eval_call(&mut self, call: &Call) -> EvalResult<Value> {
        let name = &call.callee.data;
        if let Some(func) = self.functions.get(name.as_str()).copied() {
            let args = call
                .args
                .iter()
                .map(|a| self.eval_expr(a))
                .collect::<EvalResult<Vec<_>>>()?;
            return self.call_function(func, args);
        }

        // Synthetic indexing: `tup(i)` where `tup` isn't a function name.
        if call.args.len() == 1 {
            let rewritten = Expr::Binary {
                op: BinaryOp::IdxAt,
                lhs: Box::new(Expr::Ident(name.clone())),
                rhs: Box::new(call.args[0].clone()),
            };
            return self.eval_expr(&rewritten);
        }

        Err(Signal::Error(EvalError::UnknownFunction { name: name.clone() }))
    }

    // -- statements ----------------------------------------------------

    fn exec_block(&mut self, stmts: &[Stmt]) -> EvalResult<Flow> {
        for stmt in stmts {
            let flow = self.exec_stmt(stmt)?;
            if !matches!(flow, Flow::Normal) {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<Flow> {
        match stmt {
            Stmt::Assign { name, value } => {
                check_not_reserved(&name.data)?;
                let value = self.eval_expr(value)?;
                let frame = self
                    .scopes
                    .last_mut()
                    .expect("a frame is always present while executing a function body");
                if frame.vars.contains_key(&name.data) {
                    return Err(Signal::Error(EvalError::Redeclaration {
                        name: name.data.clone(),
                    }));
                }
                frame.vars.insert(name.data.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::ReAssign { name, value } => {
                let value = self.eval_expr(value)?;
                self.set_existing(&name.data, value)?;
                Ok(Flow::Normal)
            }
            Stmt::Builtin(b) => self.exec_builtin(&b.data),
            Stmt::If(s) => self.exec_if(s),
            Stmt::While(s) => self.exec_while(s),
            Stmt::For(s) => self.exec_for(s),
            Stmt::Call(c) => {
                self.eval_call(&c.data)?;
                Ok(Flow::Normal)
            }
        }
    }

    fn exec_if(&mut self, s: &IfStmt) -> EvalResult<Flow> {
        let cond = self.eval_expr(&s.cond)?.as_int("if condition")?;
        let body = if cond != 0 { &s.then_body } else { &s.else_body };
        self.scopes.push(Frame::default());
        let flow = self.exec_block(body);
        self.scopes.pop();
        flow
    }

    fn exec_while(&mut self, s: &WhileStmt) -> EvalResult<Flow> {
        self.scopes.push(Frame::default());
        let result = loop {
            let cond = match self.eval_expr(&s.cond).and_then(|v| v.as_int("while condition").map_err(Signal::from)) {
                Ok(cond) => cond,
                Err(signal) => break Err(signal),
            };
            if cond == 0 {
                break Ok(Flow::Normal);
            }
            self.scopes
                .last_mut()
                .expect("just pushed")
                .vars
                .clear();
            match self.exec_block(&s.body) {
                Ok(Flow::Normal) | Ok(Flow::Continue) => continue,
                Ok(Flow::Break) => break Ok(Flow::Normal),
                Ok(Flow::Return(v)) => break Ok(Flow::Return(v)),
                Err(signal) => break Err(signal),
            }
        };
        self.scopes.pop();
        result
    }

    fn exec_for(&mut self, s: &ForStmt) -> EvalResult<Flow> {
        check_not_reserved(&s.var.data)?;
        let from = self.eval_expr(&s.range.from)?.as_int("for range start")?;
        let to = self.eval_expr(&s.range.to)?.as_int("for range end")?;

        let mut frame = Frame::default();
        frame.vars.insert(s.var.data.clone(), Value::Int(from));
        self.scopes.push(frame);

        let result = loop {
            let current = self
                .scopes
                .last()
                .expect("just pushed")
                .vars
                .get(&s.var.data)
                .expect("loop variable is always bound in its own frame")
                .as_int(&s.var.data);
            let current = match current {
                Ok(v) => v,
                Err(e) => break Err(Signal::from(e)),
            };
            if current >= to {
                break Ok(Flow::Normal);
            }
            match self.exec_block(&s.body) {
                Ok(Flow::Normal) | Ok(Flow::Continue) => {
                    let slot = self
                        .scopes
                        .last_mut()
                        .expect("just pushed")
                        .vars
                        .get_mut(&s.var.data)
                        .expect("loop variable is always bound in its own frame");
                    *slot = Value::Int(current.wrapping_add(1));
                    continue;
                }
                Ok(Flow::Break) => break Ok(Flow::Normal),
                Ok(Flow::Return(v)) => break Ok(Flow::Return(v)),
                Err(signal) => break Err(signal),
            }
        };
        self.scopes.pop();
        result
    }

    fn exec_builtin(&mut self, b: &Builtin) -> EvalResult<Flow> {
        match b.kind {
            BuiltinKind::Break => Ok(Flow::Break),
            BuiltinKind::Continue => Ok(Flow::Continue),
            BuiltinKind::Exit => Err(Signal::Exit),
            BuiltinKind::Return => {
                let value = self.eval_expr(&b.args[0])?;
                Ok(Flow::Return(value))
            }
            BuiltinKind::Print => {
                let mut rendered = Vec::with_capacity(b.args.len());
                for arg in &b.args {
                    rendered.push(self.eval_expr(arg)?.display());
                }
                for line in rendered {
                    writeln!(self.output, "{}", line).expect("failed to write to output");
                }
                Ok(Flow::Normal)
            }
            BuiltinKind::ScanNum => {
                let name = scan_target(&b.args[0]);
                let token = self.read_token().map_err(Signal::from)?;
                let value: i64 = token.parse().map_err(|_| EvalError::InvalidNumberInput)?;
                self.set_existing(name, Value::Int(value))?;
                Ok(Flow::Normal)
            }
            BuiltinKind::ScanStr => {
                let name = scan_target(&b.args[0]);
                let token = self.read_token().map_err(Signal::from)?;
                self.set_existing(name, Value::Str(token))?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Reads one whitespace-delimited token from the input stream.
    fn read_token(&mut self) -> Result<String, EvalError> {
        let mut token = String::new();
        loop {
            let mut byte = [0u8; 1];
            match self.input.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    let ch = byte[0] as char;
                    if ch.is_whitespace() {
                        if token.is_empty() {
                            continue;
                        }
                        break;
                    }
                    token.push(ch);
                }
                Err(_) => return Err(EvalError::UnexpectedEof),
            }
        }
        if token.is_empty() {
            return Err(EvalError::UnexpectedEof);
        }
        Ok(token)
    }

    // -- expressions -----------------------------------------------------

    fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Number(n) => Ok(Value::Int(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Ident(name) => Ok(self.lookup(name)?),
            Expr::Tuple(items) => {
                let values = items
                    .iter()
                    .map(|e| self.eval_expr(e))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::Tuple(values))
            }
            Expr::Unary { op, operand } => {
                let value = self.eval_expr(operand)?.as_int("unary operand")?;
                let result = match op {
                    UnaryOp::Not => (value == 0) as i64,
                    UnaryOp::Neg => value.wrapping_neg(),
                    UnaryOp::BitNot => !value,
                };
                Ok(Value::Int(result))
            }
            Expr::Binary { op, lhs, rhs } => self.eval_binary(*op, lhs, rhs),
            Expr::Call(call) => self.eval_call(call),
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> EvalResult<Value> {
        if op == BinaryOp::IdxAt {
            let tuple = self.eval_expr(lhs)?;
            let index = self.eval_expr(rhs)?.as_int("tuple index")?;
            let items = match &tuple {
                Value::Tuple(items) => items,
                _ => return Err(Signal::Error(EvalError::NotATuple)),
            };
            if index < 0 || index as usize >= items.len() {
                return Err(Signal::Error(EvalError::IndexOutOfRange {
                    index,
                    len: items.len(),
                }));
            }
            return Ok(items[index as usize].clone());
        }

        // All operators below `&&`/`||` are strict: both sides are always
        // evaluated, left before right, regardless of the operator.
        let lhs = self.eval_expr(lhs)?.as_int("binary operand")?;
        let rhs = self.eval_expr(rhs)?.as_int("binary operand")?;
        let result = match op {
            BinaryOp::Add => lhs.wrapping_add(rhs),
            BinaryOp::Sub => lhs.wrapping_sub(rhs),
            BinaryOp::Mul => lhs.wrapping_mul(rhs),
            BinaryOp::Div => {
                if rhs == 0 {
                    return Err(Signal::Error(EvalError::DivisionByZero));
                }
                lhs.wrapping_div(rhs)
            }
            BinaryOp::Mod => {
                if rhs == 0 {
                    return Err(Signal::Error(EvalError::ModuloByZero));
                }
                lhs.wrapping_rem(rhs)
            }
            BinaryOp::Eq => (lhs == rhs) as i64,
            BinaryOp::NotEq => (lhs != rhs) as i64,
            BinaryOp::Lt => (lhs < rhs) as i64,
            BinaryOp::Gt => (lhs > rhs) as i64,
            BinaryOp::LtEq => (lhs <= rhs) as i64,
            BinaryOp::GtEq => (lhs >= rhs) as i64,
            BinaryOp::And => ((lhs != 0) && (rhs != 0)) as i64,
            BinaryOp::Or => ((lhs != 0) || (rhs != 0)) as i64,
            BinaryOp::IdxAt => unreachable!("handled above"),
        };
        Ok(Value::Int(result))
    }

    // -- scope stack -----------------------------------------------------

    fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        for frame in self.scopes[self.barrier..].iter().rev() {
            if let Some(value) = frame.vars.get(name) {
                return Ok(value.clone());
            }
        }
        Err(EvalError::UnknownIdentifier {
            name: name.to_string(),
        })
    }

    fn set_existing(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        let barrier = self.barrier;
        for frame in self.scopes[barrier..].iter_mut().rev() {
            if let Some(slot) = frame.vars.get_mut(name) {
                if slot.kind() != value.kind() {
                    return Err(EvalError::TypeMismatch {
                        name: name.to_string(),
                        expected: slot.kind(),
                        found: value.kind(),
                    });
                }
                *slot = value;
                return Ok(());
            }
        }
        Err(EvalError::UnknownIdentifier {
            name: name.to_string(),
        })
    }
}

fn scan_target(expr: &Expr) -> &str {
    match expr {
        Expr::Ident(name) => name,
        _ => unreachable!("the parser only ever emits Ident args for scanNum/scanStr"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::Evaluator;
    use crate::parser::Parser;

    fn run(source: &str, stdin: &str) -> String {
        let module = Parser::parse(source).expect("test program should parse");
        let mut output = Vec::new();
        {
            let input = Box::new(Cursor::new(stdin.as_bytes().to_vec()));
            let mut evaluator = Evaluator::new(&module, input, Box::new(&mut output))
                .expect("test program should pass validation");
            evaluator.run().expect("test program should run to completion");
        }
        String::from_utf8(output).unwrap()
    }

    fn run_err(source: &str) -> String {
        let module = Parser::parse(source).expect("test program should parse");
        let mut output = Vec::new();
        let input = Box::new(Cursor::new(Vec::new()));
        match Evaluator::new(&module, input, Box::new(&mut output)) {
            Err(e) => return e.to_string(),
            Ok(mut evaluator) => evaluator.run().expect_err("expected a fatal error").to_string(),
        }
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(
            run("fn main() { var a = 2; var b = 3; print(a + b * 4); }", ""),
            "14\n"
        );
    }

    #[test]
    fn string_escapes_and_print() {
        assert_eq!(
            run(r#"fn main() { var s = "hi\n"; print(s); print("bye"); }"#, ""),
            "hi\n\nbye\n"
        );
    }

    #[test]
    fn while_loop_counts() {
        assert_eq!(
            run("fn main() { var i = 0; while i < 3 { print(i); i = i + 1; } }", ""),
            "0\n1\n2\n"
        );
    }

    #[test]
    fn for_loop_with_continue() {
        assert_eq!(
            run(
                "fn main() { for k in 1..4 { if k == 2 { continue; } print(k); } }",
                ""
            ),
            "1\n3\n"
        );
    }

    #[test]
    fn function_call_with_return() {
        assert_eq!(
            run("fn add(x, y) { return x + y; } fn main() { print(add(40, 2)); }", ""),
            "42\n"
        );
    }

    #[test]
    fn tuple_construction_and_indexing() {
        assert_eq!(
            run(
                "fn main() { var t = [10, 20, 30]; print(t(0)); print(t(2)); }",
                ""
            ),
            "10\n30\n"
        );
    }

    #[test]
    fn redeclaration_in_top_frame_is_fatal() {
        let err = run_err("fn main() { var a = 1; var a = 2; }");
        assert!(err.contains("already defined"), "{}", err);
    }

    #[test]
    fn reassign_type_mismatch_is_fatal() {
        let err = run_err(r#"fn main() { var a = 1; a = "x"; }"#);
        assert!(err.contains("type mismatch"), "{}", err);
    }

    #[test]
    fn division_by_zero_is_fatal() {
        let err = run_err("fn main() { print(1 / 0); }");
        assert!(err.contains("division by zero"), "{}", err);
    }

    #[test]
    fn for_loop_redeclaring_same_var_each_iteration_is_fatal() {
        // The for-loop's frame is NOT cleared between iterations (unlike
        // while), so a fresh `var` in the body only survives one trip.
        let err = run_err("fn main() { for i in 0..3 { var x = i; } }");
        assert!(err.contains("already defined"), "{}", err);
    }

    #[test]
    fn while_loop_clears_bindings_between_iterations() {
        assert_eq!(
            run(
                "fn main() { var i = 0; while i < 3 { var x = i; print(x); i = i + 1; } }",
                ""
            ),
            "0\n1\n2\n"
        );
    }

    #[test]
    fn exit_unwinds_through_nested_calls() {
        assert_eq!(
            run(
                "fn deep() { print(1); exit; print(2); } fn main() { deep(); print(3); }",
                ""
            ),
            "1\n"
        );
    }

    #[test]
    fn scan_num_reads_into_existing_binding() {
        assert_eq!(
            run("fn main() { var n = 0; scanNum(n); print(n + 1); }", "41\n"),
            "42\n"
        );
    }

    #[test]
    fn call_used_as_statement_discards_return_value() {
        assert_eq!(
            run("fn six() { return 6; } fn main() { six(); print(1); }", ""),
            "1\n"
        );
    }

    #[test]
    fn no_main_and_no_zero_arg_function_is_a_silent_no_op() {
        assert_eq!(run("fn needs_args(x) { print(x); }", ""), "");
    }

    #[test]
    fn reserved_word_as_variable_name_is_fatal() {
        // `num` isn't a live keyword in this grammar -- it lexes as a plain
        // identifier -- but it's still reserved, per the original
        // interpreter's `builtin` set.
        let err = run_err("fn main() { var num = 1; }");
        assert!(err.contains("reserved"), "{}", err);
    }

    #[test]
    fn reserved_word_as_function_name_is_fatal() {
        let err = run_err("fn end() { } fn main() { }");
        assert!(err.contains("reserved"), "{}", err);
    }

    #[test]
    fn reserved_word_as_for_loop_variable_is_fatal() {
        let err = run_err("fn main() { for str in 0..2 { } }");
        assert!(err.contains("reserved"), "{}", err);
    }

    #[test]
    fn break_outside_loop_is_fatal_not_a_crash() {
        let err = run_err("fn main() { break; }");
        assert!(err.contains("break"), "{}", err);
    }

    #[test]
    fn bare_return_defaults_to_zero() {
        assert_eq!(
            run("fn f() { return; } fn main() { print(f()); }", ""),
            "0\n"
        );
    }

    #[test]
    fn unary_operators() {
        assert_eq!(
            run("fn main() { print(!0); print(-5); print(~0); }", ""),
            "1\n-5\n-1\n"
        );
    }

    #[test]
    fn logical_operators_are_strict_not_short_circuit() {
        // Both sides are always evaluated; there's no side-effecting
        // expression form in Noh to observe this directly, but the result
        // must still be correct for every combination.
        assert_eq!(
            run("fn main() { print(0 && 1); print(1 || 0); print(1 && 1); }", ""),
            "0\n1\n1\n"
        );
    }

    #[test]
    fn function_call_scope_does_not_see_caller_locals() {
        let err = run_err("fn f() { print(outer); } fn main() { var outer = 1; f(); }");
        assert!(err.contains("unknown identifier"), "{}", err);
    }

    #[test]
    fn indexing_a_non_tuple_is_fatal() {
        let err = run_err("fn main() { var n = 5; print(n(0)); }");
        assert!(err.contains("tuple"), "{}", err);
    }

    #[test]
    fn tuple_index_out_of_range_is_fatal() {
        let err = run_err("fn main() { var t = [1, 2]; print(t(5)); }");
        assert!(err.contains("out of range"), "{}", err);
    }

    #[test]
    fn arity_mismatch_is_fatal() {
        let err = run_err("fn add(x, y) { return x + y; } fn main() { print(add(1)); }");
        assert!(err.contains("argument"), "{}", err);
    }

    #[test]
    fn nested_scope_does_not_leak_into_outer_frame() {
        assert_eq!(
            run(
                "fn main() { var a = 1; if 1 { var a = 2; print(a); } print(a); }",
                ""
            ),
            "2\n1\n"
        );
    }
}

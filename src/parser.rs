// Noh -- a small scripting language
//
// Licensed under the GNU General Public License, version 3 or later.
// See the LICENSE file in the root of this repository.

//! A hand-written, precedence-climbing recursive-descent parser over the
//! token stream produced by [`crate::lexer`].
//!
//! Whitespace and comments are already gone by the time tokens reach here
//! (the lexer skips them). The grammar is exactly the one in the language
//! specification: a statement grammar on top of a five-level operator
//! precedence expression grammar (`&&`/`||` loosest, unary tightest).

use std::fmt::Display;
use std::iter::Peekable;
use std::str::FromStr;

use logos::Logos;

use crate::ast::*;
use crate::error::ParseError;
use crate::line_map::{LineMap, Span};
use crate::lexer::Token;

#[cfg(test)]
mod expect_tests;

pub type Parse<T> = Result<T, ParseError>;

/// Operator precedence, lowest to highest. Mirrors the `E1`..`E5` ladder
/// in the grammar: `E1` is `UNARY`, `E5` is `LOGICAL`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
struct Prec(u8);

impl Prec {
    const LOWEST: Prec = Prec(0);
    const LOGICAL: Prec = Prec(1);
    const COMPARISON: Prec = Prec(2);
    const ADDITIVE: Prec = Prec(3);
    const MULTIPLICATIVE: Prec = Prec(4);
    const UNARY: Prec = Prec(5);

    fn succ(self) -> Prec {
        Prec(self.0 + 1)
    }
}

pub struct Parser<'a> {
    source: &'a str,
    stream: Peekable<logos::SpannedIter<'a, Token>>,
    line_map: LineMap<'a>,
}

impl<'a> Parser<'a> {
    pub fn parse(source: &'a str) -> Parse<Module> {
        Parser::new(source).parse_module()
    }

    fn new(source: &'a str) -> Self {
        Parser {
            source,
            stream: Token::lexer(source).spanned().peekable(),
            line_map: LineMap::new(source),
        }
    }

    // -- token-stream helpers --------------------------------------------

    fn peek(&mut self) -> (Option<Token>, Span) {
        match self.stream.peek().cloned() {
            Some((tok, span)) => (Some(tok), span),
            None => (None, self.eof()),
        }
    }

    fn consume(&mut self) -> Option<(Token, Span)> {
        self.stream.next()
    }

    fn eof(&self) -> Span {
        self.source.len()..self.source.len()
    }

    fn expect(&mut self, expected: Token) -> Parse<Span> {
        match self.consume() {
            Some((tok, span)) if tok == expected => Ok(span),
            Some((tok, span)) => Err(self.expected_but_got(span, &[expected], Some(tok))),
            None => Err(self.expected_but_got(self.eof(), &[expected], None)),
        }
    }

    fn make_error(&self, span: Span, message: String) -> ParseError {
        ParseError {
            pos: self.line_map.span_to_pos(&span),
            span,
            message,
        }
    }

    fn expected_but_got(&self, span: Span, expected: &[Token], got: Option<Token>) -> ParseError {
        match got {
            Some(got) => self.make_error(span, format!("expected one of {:?}, found {:?}", expected, got)),
            None => self.make_error(span, format!("expected one of {:?}, found end of input", expected)),
        }
    }

    fn expected_str(&self, span: Span, what: &str, got: Option<Token>) -> ParseError {
        match got {
            Some(got) => self.make_error(span, format!("expected {}, found {:?}", what, got)),
            None => self.make_error(span, format!("expected {}, found end of input", what)),
        }
    }

    fn parse_ident(&mut self) -> Parse<Spanned<String>> {
        let span = self.expect(Token::Ident)?;
        Ok(Spanned::new(span.clone(), self.source[span].to_string()))
    }

    // -- module / func -----------------------------------------------------

    fn parse_module(&mut self) -> Parse<Module> {
        let mut funcs = Vec::new();
        while self.peek().0.is_some() {
            funcs.push(self.parse_func()?);
        }
        Ok(Module { funcs })
    }

    fn parse_func(&mut self) -> Parse<Func> {
        self.expect(Token::Fn)?;
        let name = self.parse_ident()?;
        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if self.peek().0 != Some(Token::RParen) {
            params.push(self.parse_ident()?);
            while self.peek().0 == Some(Token::Comma) {
                self.consume();
                params.push(self.parse_ident()?);
            }
        }
        self.expect(Token::RParen)?;
        self.expect(Token::LBrace)?;
        let mut body = Vec::new();
        while self.peek().0 != Some(Token::RBrace) {
            body.push(self.parse_stmt()?);
        }
        self.expect(Token::RBrace)?;
        Ok(Func { name, params, body })
    }

    // -- statements ----------------------------------------------------

    fn parse_stmt(&mut self) -> Parse<Stmt> {
        match self.peek().0 {
            Some(
                Token::Break
                | Token::Continue
                | Token::Exit
                | Token::Return
                | Token::Print
                | Token::ScanNum
                | Token::ScanStr,
            ) => self.parse_builtin(),
            Some(Token::If) => Ok(Stmt::If(self.parse_if()?)),
            Some(Token::While) => Ok(Stmt::While(self.parse_while()?)),
            Some(Token::For) => Ok(Stmt::For(self.parse_for()?)),
            Some(Token::Var) => self.parse_assign(),
            Some(Token::Ident) => self.parse_reassign_or_call(),
            Some(other) => Err(self.expected_str(self.peek().1, "a statement", Some(other))),
            None => Err(self.expected_str(self.eof(), "a statement", None)),
        }
    }

    fn parse_assign(&mut self) -> Parse<Stmt> {
        self.expect(Token::Var)?;
        let name = self.parse_ident()?;
        self.expect(Token::Eq)?;
        let value = self.parse_expr()?;
        self.expect(Token::Semi)?;
        Ok(Stmt::Assign { name, value })
    }

    fn parse_reassign_or_call(&mut self) -> Parse<Stmt> {
        let name = self.parse_ident()?;
        match self.peek().0 {
            Some(Token::Eq) => {
                self.consume();
                let value = self.parse_expr()?;
                self.expect(Token::Semi)?;
                Ok(Stmt::ReAssign { name, value })
            }
            Some(Token::LParen) => {
                let call = self.parse_call_args(name)?;
                self.expect(Token::Semi)?;
                Ok(Stmt::Call(call))
            }
            other => Err(self.expected_str(self.peek().1, "`=` or `(`", other)),
        }
    }

    fn parse_call_args(&mut self, callee: Spanned<String>) -> Parse<Spanned<Call>> {
        let start = callee.span.start;
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if self.peek().0 != Some(Token::RParen) {
            args.push(self.parse_expr()?);
            while self.peek().0 == Some(Token::Comma) {
                self.consume();
                args.push(self.parse_expr()?);
            }
        }
        let end_span = self.expect(Token::RParen)?;
        Ok(Spanned::new(
            start..end_span.end,
            Call { callee, args },
        ))
    }

    fn parse_builtin(&mut self) -> Parse<Stmt> {
        let (tok, span) = self.consume().expect("dispatch already peeked a builtin token");
        let builtin = match tok {
            Token::Break => Builtin {
                kind: BuiltinKind::Break,
                args: Vec::new(),
            },
            Token::Continue => Builtin {
                kind: BuiltinKind::Continue,
                args: Vec::new(),
            },
            Token::Exit => Builtin {
                kind: BuiltinKind::Exit,
                args: Vec::new(),
            },
            Token::Return => {
                let value = if self.peek().0 == Some(Token::Semi) {
                    Expr::Number(0)
                } else {
                    self.parse_expr()?
                };
                Builtin {
                    kind: BuiltinKind::Return,
                    args: vec![value],
                }
            }
            Token::Print => {
                self.expect(Token::LParen)?;
                let mut args = vec![self.parse_expr()?];
                while self.peek().0 == Some(Token::Comma) {
                    self.consume();
                    args.push(self.parse_expr()?);
                }
                self.expect(Token::RParen)?;
                Builtin {
                    kind: BuiltinKind::Print,
                    args,
                }
            }
            Token::ScanNum => {
                self.expect(Token::LParen)?;
                let ident = self.parse_ident()?;
                self.expect(Token::RParen)?;
                Builtin {
                    kind: BuiltinKind::ScanNum,
                    args: vec![Expr::Ident(ident.data)],
                }
            }
            Token::ScanStr => {
                self.expect(Token::LParen)?;
                let ident = self.parse_ident()?;
                self.expect(Token::RParen)?;
                Builtin {
                    kind: BuiltinKind::ScanStr,
                    args: vec![Expr::Ident(ident.data)],
                }
            }
            other => unreachable!("dispatch only routes builtin tokens here, got {:?}", other),
        };
        let end = self.expect(Token::Semi)?;
        Ok(Stmt::Builtin(Spanned::new(span.start..end.end, builtin)))
    }

    fn parse_if(&mut self) -> Parse<IfStmt> {
        self.expect(Token::If)?;
        let cond = self.parse_expr()?;
        self.expect(Token::LBrace)?;
        let mut then_body = Vec::new();
        while self.peek().0 != Some(Token::RBrace) {
            then_body.push(self.parse_stmt()?);
        }
        self.expect(Token::RBrace)?;

        let mut else_body = Vec::new();
        if self.peek().0 == Some(Token::Else) {
            self.consume();
            self.expect(Token::LBrace)?;
            while self.peek().0 != Some(Token::RBrace) {
                else_body.push(self.parse_stmt()?);
            }
            self.expect(Token::RBrace)?;
        }

        Ok(IfStmt {
            cond,
            then_body,
            else_body,
        })
    }

    fn parse_while(&mut self) -> Parse<WhileStmt> {
        self.expect(Token::While)?;
        let cond = self.parse_expr()?;
        self.expect(Token::LBrace)?;
        let mut body = Vec::new();
        while self.peek().0 != Some(Token::RBrace) {
            body.push(self.parse_stmt()?);
        }
        self.expect(Token::RBrace)?;
        Ok(WhileStmt { cond, body })
    }

    fn parse_for(&mut self) -> Parse<ForStmt> {
        self.expect(Token::For)?;
        let var = self.parse_ident()?;
        self.expect(Token::In)?;
        let from = self.parse_expr()?;
        self.expect(Token::DotDot)?;
        let to = self.parse_expr()?;
        self.expect(Token::LBrace)?;
        let mut body = Vec::new();
        while self.peek().0 != Some(Token::RBrace) {
            body.push(self.parse_stmt()?);
        }
        self.expect(Token::RBrace)?;
        Ok(ForStmt {
            var,
            range: Range { from, to },
            body,
        })
    }

    // -- expressions -----------------------------------------------------

    fn parse_expr(&mut self) -> Parse<Expr> {
        self.parse_prec(Prec::LOWEST)
    }

    fn parse_prec(&mut self, min_prec: Prec) -> Parse<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let (token, span) = self.peek();
            let (op, prec) = match token {
                Some(Token::AndAnd) if min_prec <= Prec::LOGICAL => (BinaryOp::And, Prec::LOGICAL),
                Some(Token::OrOr) if min_prec <= Prec::LOGICAL => (BinaryOp::Or, Prec::LOGICAL),
                Some(Token::EqEq) if min_prec <= Prec::COMPARISON => (BinaryOp::Eq, Prec::COMPARISON),
                Some(Token::NotEq) if min_prec <= Prec::COMPARISON => (BinaryOp::NotEq, Prec::COMPARISON),
                Some(Token::Lt) if min_prec <= Prec::COMPARISON => (BinaryOp::Lt, Prec::COMPARISON),
                Some(Token::Gt) if min_prec <= Prec::COMPARISON => (BinaryOp::Gt, Prec::COMPARISON),
                Some(Token::LtEq) if min_prec <= Prec::COMPARISON => (BinaryOp::LtEq, Prec::COMPARISON),
                Some(Token::GtEq) if min_prec <= Prec::COMPARISON => (BinaryOp::GtEq, Prec::COMPARISON),
                Some(Token::Plus) if min_prec <= Prec::ADDITIVE => (BinaryOp::Add, Prec::ADDITIVE),
                Some(Token::Minus) if min_prec <= Prec::ADDITIVE => (BinaryOp::Sub, Prec::ADDITIVE),
                Some(Token::Star) if min_prec <= Prec::MULTIPLICATIVE => {
                    (BinaryOp::Mul, Prec::MULTIPLICATIVE)
                }
                Some(Token::Slash) if min_prec <= Prec::MULTIPLICATIVE => {
                    (BinaryOp::Div, Prec::MULTIPLICATIVE)
                }
                Some(Token::Percent) if min_prec <= Prec::MULTIPLICATIVE => {
                    (BinaryOp::Mod, Prec::MULTIPLICATIVE)
                }
                _ => break,
            };
            let _ = span;
            self.consume();
            let right = self.parse_prec(prec.succ())?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }
        Ok(left)
    }

    /// `E1 := Factor | "!" Factor | "-" Factor | "~" Factor`
    fn parse_unary(&mut self) -> Parse<Expr> {
        match self.peek().0 {
            Some(Token::Bang) => {
                self.consume();
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(self.parse_unary()?),
                })
            }
            Some(Token::Minus) => {
                self.consume();
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(self.parse_unary()?),
                })
            }
            Some(Token::Tilde) => {
                self.consume();
                Ok(Expr::Unary {
                    op: UnaryOp::BitNot,
                    operand: Box::new(self.parse_unary()?),
                })
            }
            _ => self.parse_factor(),
        }
    }

    fn parse_factor(&mut self) -> Parse<Expr> {
        let (token, span) = match self.peek() {
            (None, span) => return Err(self.expected_str(span, "an expression", None)),
            (Some(token), span) => (token, span),
        };
        match token {
            Token::LitNumber => self.parse_number(),
            Token::LitString => self.parse_string(),
            Token::LBracket => self.parse_tuple(),
            Token::LParen => {
                self.consume();
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Ident => {
                let name = self.parse_ident()?;
                if self.peek().0 == Some(Token::LParen) {
                    Ok(Expr::Call(self.parse_call_args(name)?.data))
                } else {
                    Ok(Expr::Ident(name.data))
                }
            }
            other => Err(self.expected_str(span, "an expression", Some(other))),
        }
    }

    fn parse_native<T: FromStr>(&mut self, token: Token) -> Parse<(Span, T)>
    where
        T::Err: Display,
    {
        let span = self.expect(token)?;
        match self.source[span.clone()].parse::<T>() {
            Ok(value) => Ok((span, value)),
            Err(err) => Err(self.make_error(span, format!("{}", err))),
        }
    }

    fn parse_number(&mut self) -> Parse<Expr> {
        let (_, value) = self.parse_native::<i64>(Token::LitNumber)?;
        Ok(Expr::Number(value))
    }

    fn parse_tuple(&mut self) -> Parse<Expr> {
        self.expect(Token::LBracket)?;
        let mut items = Vec::new();
        if self.peek().0 != Some(Token::RBracket) {
            items.push(self.parse_expr()?);
            while self.peek().0 == Some(Token::Comma) {
                self.consume();
                items.push(self.parse_expr()?);
            }
        }
        self.expect(Token::RBracket)?;
        Ok(Expr::Tuple(items))
    }

    /// Resolves backslash escapes in a string literal's interior, exactly
    /// as the original implementation does: `\0 \a \b \f \n \r \t \v \\`
    /// map to their control byte, any other escape just drops the
    /// backslash.
    fn parse_string(&mut self) -> Parse<Expr> {
        let span = self.expect(Token::LitString)?;
        let lit = &self.source[span.clone()];
        debug_assert!(lit.len() >= 2, "lexer only produces quoted strings");
        let inner = &lit[1..lit.len() - 1];

        let mut data = String::new();
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            if ch != '\\' {
                data.push(ch);
                continue;
            }
            match chars.next() {
                Some('0') => data.push('\0'),
                Some('a') => data.push('\u{7}'),
                Some('b') => data.push('\u{8}'),
                Some('f') => data.push('\u{c}'),
                Some('n') => data.push('\n'),
                Some('r') => data.push('\r'),
                Some('t') => data.push('\t'),
                Some('v') => data.push('\u{b}'),
                Some('\\') => data.push('\\'),
                Some(other) => data.push(other),
                None => {}
            }
        }
        Ok(Expr::Str(data))
    }
}

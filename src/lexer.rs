// Noh -- a small scripting language
//
// Licensed under the GNU General Public License, version 3 or later.
// See the LICENSE file in the root of this repository.

use logos::Logos;

// Re-exports
pub use crate::line_map::Span;

#[derive(Logos, Debug, PartialEq, Clone, Copy)]
pub enum Token {
    // Keywords
    #[token("fn")]
    Fn,
    #[token("var")]
    Var,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("exit")]
    Exit,
    #[token("return")]
    Return,
    #[token("print")]
    Print,
    #[token("scanNum")]
    ScanNum,
    #[token("scanStr")]
    ScanStr,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("=")]
    Eq,
    #[token("..")]
    DotDot,

    // Punctuation
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,

    // Grouping
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Entities
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // Literals
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    LitString,
    #[regex(r"[0-9]+")]
    LitNumber,

    #[error]
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)]
    Error,
}

#[cfg(test)]
mod tests {
    use super::Token;
    use logos::Logos;

    fn assert_lexable(input: &str) {
        let mut lexer = Token::lexer(input);
        while let Some(tok) = lexer.next() {
            if let Token::Error = tok {
                panic!("could not lex {:?} at {:?}", lexer.slice(), lexer.span())
            }
        }
    }

    #[test]
    fn keywords_and_idents() {
        assert_lexable("fn main() { var a = 1; if a { return a; } else { exit; } }");
    }

    #[test]
    fn operators() {
        assert_lexable("a == b != c <= d >= e < f > g && h || i");
    }

    #[test]
    fn numbers_and_strings() {
        let mut lexer = Token::lexer(r#"42 "hi\n" tup(0) [1, 2]"#);
        let tokens: Vec<_> = std::iter::from_fn(|| lexer.next()).collect();
        assert_eq!(
            tokens,
            vec![
                Token::LitNumber,
                Token::LitString,
                Token::Ident,
                Token::LParen,
                Token::LitNumber,
                Token::RParen,
                Token::LBracket,
                Token::LitNumber,
                Token::Comma,
                Token::LitNumber,
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn range_dots_dont_collide_with_numbers() {
        let mut lexer = Token::lexer("1..4");
        let tokens: Vec<_> = std::iter::from_fn(|| lexer.next()).collect();
        assert_eq!(
            tokens,
            vec![Token::LitNumber, Token::DotDot, Token::LitNumber]
        );
    }

    #[test]
    fn line_comment_is_skipped() {
        let mut lexer = Token::lexer("1 // trailing comment\n+ 2");
        let tokens: Vec<_> = std::iter::from_fn(|| lexer.next()).collect();
        assert_eq!(tokens, vec![Token::LitNumber, Token::Plus, Token::LitNumber]);
    }
}

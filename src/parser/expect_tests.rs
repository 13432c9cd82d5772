// Noh -- a small scripting language
//
// Licensed under the GNU General Public License, version 3 or later.
// See the LICENSE file in the root of this repository.

//! AST snapshot tests. These pin down the exact shape the parser produces
//! for representative programs, the same way the lexer/parser crate this
//! one is descended from pins its own grammar down.

use expect_test::{expect, Expect};

use super::Parser;

fn check(source: &str, expected: Expect) {
    let module = Parser::parse(source).expect("source is expected to parse");
    expected.assert_eq(&format!("{:#?}", module));
}

#[test]
fn empty_main() {
    check(
        "fn main() { }",
        expect![[r#"
            Module {
                funcs: [
                    Func {
                        name: Spanned {
                            span: 3..7,
                            data: "main",
                        },
                        params: [],
                        body: [],
                    },
                ],
            }"#]],
    );
}

#[test]
fn arithmetic_precedence() {
    check(
        "fn main() { var a = 1 + 2 * 3; }",
        expect![[r#"
            Module {
                funcs: [
                    Func {
                        name: Spanned {
                            span: 3..7,
                            data: "main",
                        },
                        params: [],
                        body: [
                            Assign {
                                name: Spanned {
                                    span: 17..18,
                                    data: "a",
                                },
                                value: Binary {
                                    op: Add,
                                    lhs: Number(
                                        1,
                                    ),
                                    rhs: Binary {
                                        op: Mul,
                                        lhs: Number(
                                            2,
                                        ),
                                        rhs: Number(
                                            3,
                                        ),
                                    },
                                },
                            },
                        ],
                    },
                ],
            }"#]],
    );
}

#[test]
fn call_with_single_arg_is_a_call_node_not_index() {
    // The parser can't yet know whether `tup` is a function or a tuple
    // variable; it always emits Expr::Call here. The evaluator resolves
    // the ambiguity once the function table is known.
    check(
        "fn main() { print(tup(0)); }",
        expect![[r#"
            Module {
                funcs: [
                    Func {
                        name: Spanned {
                            span: 3..7,
                            data: "main",
                        },
                        params: [],
                        body: [
                            Builtin(
                                Spanned {
                                    span: 12..27,
                                    data: Builtin {
                                        kind: Print,
                                        args: [
                                            Call(
                                                Call {
                                                    callee: Spanned {
                                                        span: 18..21,
                                                        data: "tup",
                                                    },
                                                    args: [
                                                        Number(
                                                            0,
                                                        ),
                                                    ],
                                                },
                                            ),
                                        ],
                                    },
                                },
                            ),
                        ],
                    },
                ],
            }"#]],
    );
}

#[test]
fn if_else_and_while() {
    check(
        "fn main() { if a < b { a = a + 1; } else { break; } while a { continue; } }",
        expect![[r#"
            Module {
                funcs: [
                    Func {
                        name: Spanned {
                            span: 3..7,
                            data: "main",
                        },
                        params: [],
                        body: [
                            If(
                                IfStmt {
                                    cond: Binary {
                                        op: Lt,
                                        lhs: Ident(
                                            "a",
                                        ),
                                        rhs: Ident(
                                            "b",
                                        ),
                                    },
                                    then_body: [
                                        ReAssign {
                                            name: Spanned {
                                                span: 24..25,
                                                data: "a",
                                            },
                                            value: Binary {
                                                op: Add,
                                                lhs: Ident(
                                                    "a",
                                                ),
                                                rhs: Number(
                                                    1,
                                                ),
                                            },
                                        },
                                    ],
                                    else_body: [
                                        Builtin(
                                            Spanned {
                                                span: 44..50,
                                                data: Builtin {
                                                    kind: Break,
                                                    args: [],
                                                },
                                            },
                                        ),
                                    ],
                                },
                            ),
                            While(
                                WhileStmt {
                                    cond: Ident(
                                        "a",
                                    ),
                                    body: [
                                        Builtin(
                                            Spanned {
                                                span: 64..73,
                                                data: Builtin {
                                                    kind: Continue,
                                                    args: [],
                                                },
                                            },
                                        ),
                                    ],
                                },
                            ),
                        ],
                    },
                ],
            }"#]],
    );
}

#[test]
fn for_range_and_tuple_literal() {
    check(
        "fn main() { for i in 0..3 { var t = [1, 2]; } }",
        expect![[r#"
            Module {
                funcs: [
                    Func {
                        name: Spanned {
                            span: 3..7,
                            data: "main",
                        },
                        params: [],
                        body: [
                            For(
                                ForStmt {
                                    var: Spanned {
                                        span: 16..17,
                                        data: "i",
                                    },
                                    range: Range {
                                        from: Number(
                                            0,
                                        ),
                                        to: Number(
                                            3,
                                        ),
                                    },
                                    body: [
                                        Assign {
                                            name: Spanned {
                                                span: 36..37,
                                                data: "t",
                                            },
                                            value: Tuple(
                                                [
                                                    Number(
                                                        1,
                                                    ),
                                                    Number(
                                                        2,
                                                    ),
                                                ],
                                            ),
                                        },
                                    ],
                                },
                            ),
                        ],
                    },
                ],
            }"#]],
    );
}

#[test]
fn string_escapes_are_resolved() {
    check(
        r#"fn main() { print("a\nb"); }"#,
        expect![[r#"
            Module {
                funcs: [
                    Func {
                        name: Spanned {
                            span: 3..7,
                            data: "main",
                        },
                        params: [],
                        body: [
                            Builtin(
                                Spanned {
                                    span: 12..27,
                                    data: Builtin {
                                        kind: Print,
                                        args: [
                                            Str(
                                                "a\nb",
                                            ),
                                        ],
                                    },
                                },
                            ),
                        ],
                    },
                ],
            }"#]],
    );
}

#[test]
fn missing_semicolon_is_a_parse_error() {
    let err = Parser::parse("fn main() { var a = 1 }").unwrap_err();
    assert_eq!(err.pos.start.line, 1);
}

#[test]
fn return_without_expr_defaults_to_zero() {
    check(
        "fn main() { return; }",
        expect![[r#"
            Module {
                funcs: [
                    Func {
                        name: Spanned {
                            span: 3..7,
                            data: "main",
                        },
                        params: [],
                        body: [
                            Builtin(
                                Spanned {
                                    span: 12..20,
                                    data: Builtin {
                                        kind: Return,
                                        args: [
                                            Number(
                                                0,
                                            ),
                                        ],
                                    },
                                },
                            ),
                        ],
                    },
                ],
            }"#]],
    );
}

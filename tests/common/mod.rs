// Shared helpers for the integration tests
#![allow(dead_code)]

use jmmc::ast::*;
use jmmc::{Config, Diagnostic};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn analyze(spec: NodeSpec) -> jmmc::wash::SemanticsResult {
    init_logger();
    jmmc::analyze(Ast::from_spec(&spec), &Config::default()).expect("analysis should not fail fatally")
}

pub fn errors(diagnostics: &[Diagnostic]) -> Vec<&Diagnostic> {
    diagnostics.iter().filter(|d| d.is_error()).collect()
}

/// `class <name> { <members> }` with no imports or superclass
pub fn single_class(name: &str, members: Vec<NodeSpec>) -> NodeSpec {
    program(vec![], class(name, None, members))
}

/// A class with one `int` method built from `body`
pub fn int_method_class(body: Vec<NodeSpec>) -> NodeSpec {
    single_class("Test", vec![method(TypeName::int(), "run", vec![], body)])
}

/// Scenario A: `class Point { int x; int getX() { return x; } }`
pub fn point_class() -> NodeSpec {
    single_class(
        "Point",
        vec![
            field(TypeName::int(), "x"),
            method(TypeName::int(), "getX", vec![], vec![ret(ident("x").at(1, 30))]),
        ],
    )
}

/// Sum of `0..n` with a counting loop, printed through an imported class
pub fn summing_program() -> NodeSpec {
    program(
        vec![import("io")],
        class(
            "Sum",
            None,
            vec![
                method(
                    TypeName::int(),
                    "sum",
                    vec![arg(TypeName::int(), "n")],
                    vec![
                        var(TypeName::int(), "i"),
                        var(TypeName::int(), "acc"),
                        assign("i", int(0)),
                        assign("acc", int(0)),
                        while_loop(
                            binary(BinOp::Lt, ident("i"), ident("n")),
                            vec![
                                assign("acc", binary(BinOp::Add, ident("acc"), ident("i"))),
                                assign("i", binary(BinOp::Add, ident("i"), int(1))),
                            ],
                        ),
                        ret(ident("acc")),
                    ],
                ),
                main_method(vec![
                    var(TypeName::class("Sum"), "s"),
                    var(TypeName::int(), "r"),
                    assign("s", new_object("Sum")),
                    assign("r", call(ident("s"), "sum", vec![int(10)])),
                    expr_stmt(call(ident("io"), "println", vec![ident("r")])),
                ]),
            ],
        ),
    )
}

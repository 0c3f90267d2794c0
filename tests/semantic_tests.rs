mod common;

use common::*;
use jmmc::ast::*;
use jmmc::wash::{Type, TypeOrigin};
use jmmc::{Config, Stage};

#[test]
fn point_class_symbol_table() {
    let result = analyze(point_class());
    assert!(result.is_accepted(), "{:?}", result.diagnostics);

    let symtab = &result.symtab;
    assert_eq!(symtab.class_name(), "Point");
    assert_eq!(symtab.fields().len(), 1);
    assert_eq!(symtab.fields()[0].name, "x");
    assert_eq!(symtab.method_names(), &["getX"]);
    assert_eq!(symtab.return_type("getX"), Some(&Type::int()));
    assert!(symtab.parameters("getX").unwrap().is_empty());
}

#[test]
fn boolean_and_type_checks() {
    let result = analyze(single_class(
        "Flags",
        vec![method(
            TypeName::boolean(),
            "f",
            vec![],
            vec![
                var(TypeName::boolean(), "b"),
                assign("b", binary(BinOp::And, boolean(true), boolean(false))),
                ret(ident("b")),
            ],
        )],
    ));
    assert!(result.is_accepted(), "{:?}", result.diagnostics);
}

#[test]
fn string_into_int_is_one_diagnostic_and_still_lowers() {
    let result = analyze(int_method_class(vec![
        var(TypeName::int(), "a"),
        assign("a", string("hello")).at(4, 9),
        ret(ident("a")),
    ]));
    let errs = errors(&result.diagnostics);
    assert_eq!(errs.len(), 1, "{:?}", result.diagnostics);
    assert_eq!(errs[0].stage, Stage::Semantic);
    assert_eq!((errs[0].line, errs[0].column), (4, 9));
    assert!(errs[0].message.contains("incompatible types"));

    // The driver would stop here, but lowering the rejected tree must not fail
    assert!(jmmc::to_ir(&result, &Config::default()).is_ok());
}

#[test]
fn returning_this_as_own_class() {
    let result = analyze(single_class(
        "Node",
        vec![method(TypeName::class("Node"), "me", vec![], vec![ret(this())])],
    ));
    assert!(result.is_accepted(), "{:?}", result.diagnostics);
}

#[test]
fn every_violation_is_reported() {
    let result = analyze(int_method_class(vec![
        var(TypeName::int(), "a"),
        var(TypeName::int_array(), "xs"),
        assign("a", binary(BinOp::Add, int(1), boolean(true))),
        assign("a", index(ident("a"), int(0))),
        while_loop(int(1), vec![]),
        assign("missing", int(3)),
        ret(ident("a")),
    ]));
    let messages: Vec<&str> = errors(&result.diagnostics).iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages.len(), 4, "{:?}", messages);
    assert!(messages[0].contains("operator + requires int operands"));
    assert!(messages[1].contains("array access requires int[]"));
    assert!(messages[2].contains("condition must be boolean"));
    assert!(messages[3].contains("cannot find variable 'missing'"));
}

#[test]
fn main_cannot_use_instance_members() {
    let result = analyze(single_class(
        "App",
        vec![
            field(TypeName::int(), "count"),
            main_method(vec![
                var(TypeName::int(), "n"),
                assign("n", ident("count")),
                expr_stmt(call(this(), "run", vec![])),
            ]),
        ],
    ));
    let messages: Vec<String> = errors(&result.diagnostics).iter().map(|d| d.message.clone()).collect();
    assert!(messages.iter().any(|m| m.contains("non-static field 'count'")), "{:?}", messages);
    assert!(messages.iter().any(|m| m.contains("'this' cannot be used in a static method")), "{:?}", messages);
}

#[test]
fn duplicate_declarations() {
    let result = analyze(single_class(
        "Dup",
        vec![
            field(TypeName::int(), "x"),
            field(TypeName::boolean(), "x"),
            method(TypeName::int(), "f", vec![arg(TypeName::int(), "p")], vec![var(TypeName::int(), "p"), ret(int(0))]),
            method(TypeName::int(), "f", vec![], vec![ret(int(1))]),
        ],
    ));
    let messages: Vec<String> = errors(&result.diagnostics).iter().map(|d| d.message.clone()).collect();
    assert_eq!(messages.len(), 3, "{:?}", messages);
    assert!(messages.iter().any(|m| m.contains("field 'x' is already defined")));
    assert!(messages.iter().any(|m| m.contains("already defined as a parameter")));
    assert!(messages.iter().any(|m| m.contains("method 'f' is already defined")));
    // First declaration wins
    assert_eq!(result.symtab.field("x").unwrap().ty, Type::int());
    assert_eq!(result.symtab.parameters("f").unwrap().len(), 1);
}

#[test]
fn own_method_arity_is_checked() {
    let result = analyze(single_class(
        "Calc",
        vec![
            method(TypeName::int(), "twice", vec![arg(TypeName::int(), "v")], vec![ret(binary(
                BinOp::Mul,
                ident("v"),
                int(2),
            ))]),
            method(TypeName::int(), "run", vec![], vec![ret(call(this(), "twice", vec![int(1), int(2)]))]),
        ],
    ));
    let errs = errors(&result.diagnostics);
    assert_eq!(errs.len(), 1, "{:?}", result.diagnostics);
    assert!(errs[0].message.contains("expects 1 argument(s), found 2"));
}

#[test]
fn superclass_and_import_members_are_trusted() {
    let result = analyze(program(
        vec![import("java.util.Scanner")],
        class(
            "Reader",
            Some("Base"),
            vec![
                field(TypeName::class("Scanner"), "scanner"),
                method(
                    TypeName::int(),
                    "read",
                    vec![],
                    vec![
                        var(TypeName::int(), "v"),
                        // Inherited from Base, which is not visible
                        assign("v", call(this(), "inherited", vec![])),
                        // Import-typed result into a primitive
                        assign("v", call(ident("scanner"), "nextInt", vec![])),
                        ret(ident("v")),
                    ],
                ),
            ],
        ),
    ));
    assert!(result.is_accepted(), "{:?}", result.diagnostics);
    let field = result.symtab.field("scanner").unwrap();
    assert_eq!(result.symtab.tag_origin(field.ty.clone()).origin, TypeOrigin::Import);
}

#[test]
fn undeclared_method_without_superclass() {
    let result = analyze(int_method_class(vec![ret(call(this(), "nope", vec![]))]));
    let errs = errors(&result.diagnostics);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].message.contains("method 'nope' is not declared"));
}

#[test]
fn void_and_missing_returns() {
    let result = analyze(single_class(
        "R",
        vec![
            method(TypeName::void(), "v", vec![], vec![ret(int(1))]),
            method(TypeName::int(), "i", vec![], vec![ret_void()]),
        ],
    ));
    assert_eq!(errors(&result.diagnostics).len(), 2, "{:?}", result.diagnostics);
}

#[test]
fn declared_types_must_name_visible_classes() {
    let result = analyze(program(
        vec![import("java.util.Scanner")],
        class(
            "A",
            None,
            vec![
                field(TypeName::class("Mystery"), "m").at(2, 5),
                field(TypeName::class("Scanner"), "ok"),
                method(
                    TypeName::int(),
                    "f",
                    vec![arg(TypeName::class("Ghost"), "g")],
                    vec![
                        var(TypeName::class("Phantom"), "p"),
                        var(TypeName::new("boolean", true), "flags"),
                        var(TypeName::class("A"), "self_ref"),
                        ret(int(1)),
                    ],
                ),
            ],
        ),
    ));
    let messages: Vec<&str> = errors(&result.diagnostics).iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages.len(), 4, "{:?}", messages);
    assert!(messages.contains(&"cannot find class 'Mystery'"));
    assert!(messages.contains(&"cannot find class 'Ghost'"));
    assert!(messages.contains(&"cannot find class 'Phantom'"));
    assert!(messages.contains(&"arrays of boolean are not supported"));
    assert!(result.diagnostics.iter().all(|d| d.stage == Stage::Semantic));
}

#[test]
fn unknown_field_type_stops_before_code_generation() {
    init_logger();
    let spec = single_class(
        "A",
        vec![
            field(TypeName::class("Mystery"), "m"),
            method(TypeName::int(), "f", vec![], vec![ret(int(1))]),
        ],
    );
    let output = jmmc::compile(Ast::from_spec(&spec), &Config::default()).unwrap();
    assert!(!output.is_success());
    assert!(output.bytecode.is_none());
    assert_eq!(errors(output.diagnostics()).len(), 1);
}

#[test]
fn instance_method_through_class_name() {
    let result = analyze(single_class(
        "A",
        vec![
            method(TypeName::int(), "foo", vec![], vec![ret(int(1))]),
            method(
                TypeName::int(),
                "bar",
                vec![],
                vec![
                    var(TypeName::int(), "x"),
                    assign("x", call(class_ref("A"), "foo", vec![])),
                    assign("x", call(ident("A"), "foo", vec![])),
                    // Through the receiver is fine
                    ret(call(this(), "foo", vec![])),
                ],
            ),
        ],
    ));
    let errs = errors(&result.diagnostics);
    assert_eq!(errs.len(), 2, "{:?}", result.diagnostics);
    for err in errs {
        assert_eq!(err.message, "non-static method 'foo' cannot be referenced from a static context");
    }
}

#[test]
fn variable_named_like_the_class_is_a_value() {
    let result = analyze(single_class(
        "A",
        vec![
            method(TypeName::int(), "foo", vec![], vec![ret(int(1))]),
            method(
                TypeName::int(),
                "bar",
                vec![arg(TypeName::class("A"), "A")],
                vec![ret(call(ident("A"), "foo", vec![]))],
            ),
        ],
    ));
    assert!(result.is_accepted(), "{:?}", result.diagnostics);
}

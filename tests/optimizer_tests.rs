mod common;

use common::*;
use jmmc::ast::*;
use jmmc::ir::{Instr, Rhs};
use jmmc::optimizer::{eval_expr, ConstEnv, ConstFolder, Value};
use jmmc::{Config, Severity, Stage};
use proptest::prelude::*;

fn optimized(spec: NodeSpec) -> jmmc::wash::SemanticsResult {
    let mut result = analyze(spec);
    assert!(result.is_accepted(), "{:?}", result.diagnostics);
    jmmc::optimize(&mut result, &Config::default().with_optimize(true)).unwrap();
    result
}

/// Expression under the last `return` of the first method
fn returned_expr(ast: &Ast) -> NodeId {
    let class = ast.class_decl().unwrap();
    let method = ast.children(class)[0];
    let ret = *ast.children(method).last().unwrap();
    ast.children(ret)[0]
}

#[test]
fn arithmetic_assignment_becomes_one_literal_move() {
    let result = optimized(int_method_class(vec![
        var(TypeName::int(), "a"),
        assign("a", binary(BinOp::Add, int(2), binary(BinOp::Mul, int(3), int(4)))),
        ret(ident("a")),
    ]));
    let ir = jmmc::to_ir(&result, &Config::default()).unwrap();
    let run = ir.class.method("run").unwrap();

    assert!(ir.text.contains("a.i32 :=.i32 14.i32;"), "{}", ir.text);
    assert!(!run
        .instructions
        .iter()
        .any(|i| matches!(i, Instr::Assign { rhs: Rhs::Binary { .. }, .. })));
}

#[test]
fn boolean_and_folds_to_false() {
    let result = optimized(single_class(
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
    assert_eq!(result.ast.kind(returned_expr(&result.ast)), &NodeKind::False);
}

#[test]
fn straight_line_propagation_keeps_return_value() {
    let body = vec![
        var(TypeName::int(), "a"),
        var(TypeName::int(), "b"),
        var(TypeName::int(), "c"),
        assign("a", int(7)),
        assign("b", binary(BinOp::Mul, ident("a"), int(3))),
        assign("a", binary(BinOp::Sub, ident("b"), ident("a"))),
        assign("c", paren(binary(BinOp::Div, ident("a"), int(4)))),
        ret(binary(BinOp::Add, ident("c"), ident("b"))),
    ];
    // a = 7, b = 21, a = 14, c = 3, return 24
    let result = optimized(int_method_class(body));
    assert_eq!(result.ast.kind(returned_expr(&result.ast)), &NodeKind::Integer { value: 24 });
}

#[test]
fn branches_keep_only_agreed_constants() {
    let result = optimized(single_class(
        "Pick",
        vec![method(
            TypeName::int(),
            "pick",
            vec![arg(TypeName::boolean(), "flag")],
            vec![
                var(TypeName::int(), "a"),
                var(TypeName::int(), "b"),
                if_else(
                    ident("flag"),
                    vec![assign("a", int(1)), assign("b", int(5))],
                    vec![assign("a", int(2)), assign("b", int(5))],
                ),
                ret(binary(BinOp::Add, ident("a"), ident("b"))),
            ],
        )],
    ));
    let ret = returned_expr(&result.ast);
    assert_eq!(result.ast.kind(ret), &NodeKind::BinaryOp { op: BinOp::Add });
    let children = result.ast.children(ret);
    assert_eq!(result.ast.kind(children[0]), &NodeKind::Identifier { name: "a".into() });
    assert_eq!(result.ast.kind(children[1]), &NodeKind::Integer { value: 5 });
}

#[test]
fn converging_loop_exit_value_is_known() {
    let result = optimized(int_method_class(vec![
        var(TypeName::int(), "i"),
        assign("i", int(0)),
        while_loop(binary(BinOp::Lt, ident("i"), int(5)), vec![assign(
            "i",
            binary(BinOp::Add, ident("i"), int(1)),
        )]),
        ret(ident("i")),
    ]));
    assert_eq!(result.ast.kind(returned_expr(&result.ast)), &NodeKind::Integer { value: 5 });

    // The loop itself still reads `i`
    let ir = jmmc::to_ir(&result, &Config::default()).unwrap();
    assert!(ir.text.contains("i.i32 :=.i32 i.i32 +.i32 1.i32;"), "{}", ir.text);
}

#[test]
fn loop_with_unknown_bound_is_left_alone() {
    let mut result = analyze(summing_program());
    jmmc::optimize(&mut result, &Config::default().with_optimize(true)).unwrap();
    assert_eq!(
        result.ast.kind(returned_expr(&result.ast)),
        &NodeKind::Identifier { name: "acc".into() }
    );
}

#[test]
fn division_by_zero_is_a_warning_not_a_fold() {
    let result = optimized(int_method_class(vec![ret(binary(BinOp::Div, int(1), int(0)))]));
    assert!(result.is_accepted());
    let warnings: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].stage, Stage::Optimization);
    assert_eq!(
        result.ast.kind(returned_expr(&result.ast)),
        &NodeKind::BinaryOp { op: BinOp::Div }
    );
}

#[test]
fn optimize_is_a_no_op_when_disabled() {
    let mut result = analyze(int_method_class(vec![ret(binary(BinOp::Add, int(1), int(2)))]));
    assert_eq!(jmmc::optimize(&mut result, &Config::default()).unwrap(), 0);
    assert_eq!(
        result.ast.kind(returned_expr(&result.ast)),
        &NodeKind::BinaryOp { op: BinOp::Add }
    );
}

fn int_expr() -> impl Strategy<Value = NodeSpec> {
    let leaf = (-300i32..300).prop_map(int);
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| binary(BinOp::Add, l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| binary(BinOp::Sub, l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| binary(BinOp::Mul, l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| binary(BinOp::Div, l, r)),
            inner.prop_map(paren),
        ]
    })
}

fn bool_expr() -> impl Strategy<Value = NodeSpec> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(boolean),
        (int_expr(), int_expr()).prop_map(|(l, r)| binary(BinOp::Lt, l, r)),
        (int_expr(), int_expr()).prop_map(|(l, r)| binary(BinOp::Gt, l, r)),
    ];
    leaf.prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| binary(BinOp::And, l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| binary(BinOp::Or, l, r)),
            inner.prop_map(not),
        ]
    })
}

/// Fold `return <expr>` twice; the second pass must find nothing to do
fn check_fold(expr: NodeSpec) -> Result<(), TestCaseError> {
    let mut ast = Ast::from_spec(&ret(expr));
    let root = ast.root();
    let expected = eval_expr(&ast, ast.children(root)[0], &ConstEnv::new());
    let mut diagnostics = Vec::new();

    let mut folder = ConstFolder::new();
    folder.fold(&mut ast, root, &mut diagnostics).unwrap();
    let once = ast.to_spec(ast.children(root)[0]);
    prop_assert_eq!(folder.fold(&mut ast, root, &mut diagnostics).unwrap(), 0);
    prop_assert_eq!(&ast.to_spec(ast.children(root)[0]), &once);

    if let Some(value) = expected {
        prop_assert_eq!(Value::from_kind(&once.kind), Some(value));
    }
    Ok(())
}

proptest! {
    #[test]
    fn folding_is_idempotent_for_int_expressions(expr in int_expr()) {
        check_fold(expr)?;
    }

    #[test]
    fn folding_is_idempotent_for_bool_expressions(expr in bool_expr()) {
        check_fold(expr)?;
    }
}

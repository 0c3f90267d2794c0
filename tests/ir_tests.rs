mod common;

use common::*;
use jmmc::ast::*;
use jmmc::ir::{Instr, IrType, Operand};
use jmmc::optimizer::{defs, uses, Liveness};
use jmmc::Config;
use std::collections::HashSet;

fn lower(spec: NodeSpec) -> jmmc::ir::IrResult {
    let result = analyze(spec);
    assert!(result.is_accepted(), "{:?}", result.diagnostics);
    jmmc::to_ir(&result, &Config::default()).unwrap()
}

#[test]
fn class_text_layout() {
    let ir = lower(summing_program());
    let expected_prefix = "\
import io;

Sum {

.construct Sum().V {
    invokespecial(this, \"<init>\").V;
}

.method public sum(n.i32).i32 {
";
    assert!(ir.text.starts_with(expected_prefix), "{}", ir.text);
    assert!(ir.text.contains(".method public static main(args.array.String).V {"));
    assert!(ir.text.contains("    invokestatic(io, \"println\", r.i32).V;"));
    assert!(ir.text.trim_end().ends_with('}'));
}

#[test]
fn fields_and_superclass_in_header() {
    let ir = lower(program(
        vec![],
        class(
            "Counter",
            Some("Base"),
            vec![
                field(TypeName::int(), "count"),
                field(TypeName::int_array(), "history"),
                method(TypeName::int(), "get", vec![], vec![ret(ident("count"))]),
            ],
        ),
    ));
    assert!(ir.text.contains("Counter extends Base {"));
    assert!(ir.text.contains(".field private count.i32;"));
    assert!(ir.text.contains(".field private history.array.i32;"));
    assert!(ir.text.contains("t0.i32 :=.i32 getfield(this, count.i32).i32;"));
    assert!(ir.text.contains("ret.i32 t0.i32;"));
}

#[test]
fn temporaries_are_assigned_once() {
    let ir = lower(summing_program());
    for method in &ir.class.methods {
        let mut seen = HashSet::new();
        for instr in &method.instructions {
            if let Instr::Assign { dest, .. } = instr {
                if dest.name.starts_with('t') && dest.name[1..].chars().all(|c| c.is_ascii_digit()) {
                    assert!(seen.insert(dest.name.clone()), "{} assigned twice in {}", dest.name, method.name);
                }
            }
        }
    }
}

#[test]
fn arrays_lower_to_indexed_access() {
    let ir = lower(int_method_class(vec![
        var(TypeName::int_array(), "xs"),
        assign("xs", new_array(int(3))),
        array_assign("xs", int(0), int(7)),
        ret(binary(BinOp::Add, index(ident("xs"), int(0)), length(ident("xs")))),
    ]));
    let lines: Vec<String> = ir.class.method("run").unwrap().instructions.iter().map(Instr::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "xs.array.i32 :=.array.i32 new(array, 3.i32).array.i32;",
            "xs[0.i32].i32 :=.i32 7.i32;",
            "t1.i32 :=.i32 xs[0.i32].i32;",
            "t2.i32 :=.i32 arraylength(xs.array.i32).i32;",
            "t3.i32 :=.i32 t1.i32 +.i32 t2.i32;",
            "ret.i32 t3.i32;",
        ]
    );
}

#[test]
fn negation_and_logic_evaluate_both_sides() {
    let ir = lower(single_class(
        "Logic",
        vec![method(
            TypeName::boolean(),
            "f",
            vec![arg(TypeName::boolean(), "a"), arg(TypeName::boolean(), "b")],
            vec![ret(binary(BinOp::Or, not(ident("a")), ident("b")))],
        )],
    ));
    let f = ir.class.method("f").unwrap();
    let lines: Vec<String> = f.instructions.iter().map(Instr::to_string).collect();
    assert_eq!(
        lines,
        vec!["t0.bool :=.bool !.bool a.bool;", "t1.bool :=.bool t0.bool ||.bool b.bool;", "ret.bool t1.bool;"]
    );
    assert_eq!(f.return_type, IrType::Bool);
}

#[test]
fn use_def_sets_cover_every_instruction() {
    let ir = lower(summing_program());
    for method in &ir.class.methods {
        for instr in &method.instructions {
            let used = uses(instr);
            assert!(!used.contains("this"));
            if let Instr::Assign { dest, .. } = instr {
                assert_eq!(defs(instr).into_iter().collect::<Vec<_>>(), vec![dest.name.clone()]);
            } else {
                assert!(defs(instr).is_empty());
            }
        }
    }
}

#[test]
fn liveness_through_the_summing_loop() {
    let ir = lower(summing_program());
    let sum = ir.class.method("sum").unwrap();
    let live = Liveness::compute(sum).unwrap();

    let ret_at = sum
        .instructions
        .iter()
        .position(|i| matches!(i, Instr::Return(Some(Operand::Var(_)))))
        .unwrap();
    assert_eq!(live.live_in(ret_at).iter().collect::<Vec<_>>(), vec!["acc"]);

    let loop_top = sum
        .instructions
        .iter()
        .position(|i| matches!(i, Instr::Label(l) if l.starts_with("Loop_")))
        .unwrap();
    for var in ["acc", "i", "n"] {
        assert!(live.live_in(loop_top).contains(var), "{} should be live at the loop head", var);
    }
    // Nothing is live before the first instruction except the parameter
    assert_eq!(live.live_in(0).iter().collect::<Vec<_>>(), vec!["n"]);
}

//! Live-variable analysis over one IR method
//!
//! `uses`/`defs` give the variables each instruction reads and writes.
//! Literals, `this` and class references are not variables. The fixpoint is
//! the usual backward one:
//!
//! ```text
//! in[n]  = use[n] ∪ (out[n] − def[n])
//! out[n] = ∪ in[s] for every successor s of n
//! ```

use crate::common::error::{Error, Result};
use crate::ir::{Call, Instr, IrMethod, Operand, Rhs};
use std::collections::{BTreeSet, HashMap};

pub type VarSet = BTreeSet<String>;

fn add_operand(set: &mut VarSet, op: &Operand) {
    if let Operand::Var(v) = op {
        set.insert(v.name.clone());
    }
}

fn add_call(set: &mut VarSet, call: &Call) {
    add_operand(set, &call.target);
    for arg in &call.args {
        add_operand(set, arg);
    }
}

/// Variables read by an instruction
pub fn uses(instr: &Instr) -> VarSet {
    let mut set = VarSet::new();
    match instr {
        Instr::Assign { rhs, .. } => match rhs {
            Rhs::Operand(op) | Rhs::Not(op) | Rhs::ArrayLength(op) | Rhs::NewArray(op) => add_operand(&mut set, op),
            Rhs::Binary { left, right, .. } => {
                add_operand(&mut set, left);
                add_operand(&mut set, right);
            }
            Rhs::Call(call) => add_call(&mut set, call),
            Rhs::GetField { object, .. } => add_operand(&mut set, object),
            Rhs::ArrayLoad { array, index } => {
                set.insert(array.name.clone());
                add_operand(&mut set, index);
            }
            Rhs::NewObject(_) => {}
        },
        Instr::ArrayStore { array, index, value } => {
            // Storing into an element reads the array reference
            set.insert(array.name.clone());
            add_operand(&mut set, index);
            add_operand(&mut set, value);
        }
        Instr::Call(call) => add_call(&mut set, call),
        Instr::PutField { object, value, .. } => {
            add_operand(&mut set, object);
            add_operand(&mut set, value);
        }
        Instr::Return(Some(op)) | Instr::NoOp(op) => add_operand(&mut set, op),
        Instr::Branch { cond, .. } => add_operand(&mut set, cond),
        Instr::Return(None) | Instr::Goto(_) | Instr::Label(_) => {}
    }
    set
}

/// Variables written by an instruction. Fields live outside the frame and
/// are never part of the set.
pub fn defs(instr: &Instr) -> VarSet {
    let mut set = VarSet::new();
    if let Instr::Assign { dest, .. } = instr {
        set.insert(dest.name.clone());
    }
    set
}

#[derive(Debug, Clone)]
pub struct Liveness {
    successors: Vec<Vec<usize>>,
    live_in: Vec<VarSet>,
    live_out: Vec<VarSet>,
}

impl Liveness {
    pub fn compute(method: &IrMethod) -> Result<Self> {
        let instrs = &method.instructions;
        let successors = build_cfg(method)?;
        let use_sets: Vec<VarSet> = instrs.iter().map(uses).collect();
        let def_sets: Vec<VarSet> = instrs.iter().map(defs).collect();
        let mut live_in = vec![VarSet::new(); instrs.len()];
        let mut live_out = vec![VarSet::new(); instrs.len()];

        let mut iterations = 0;
        let mut changed = true;
        while changed {
            changed = false;
            iterations += 1;
            for n in (0..instrs.len()).rev() {
                let out: VarSet = successors[n]
                    .iter()
                    .flat_map(|&s| live_in[s].iter().cloned())
                    .collect();
                let mut inn = use_sets[n].clone();
                inn.extend(out.difference(&def_sets[n]).cloned());
                if inn != live_in[n] || out != live_out[n] {
                    live_in[n] = inn;
                    live_out[n] = out;
                    changed = true;
                }
            }
        }
        log::trace!("liveness: {} converged after {} iteration(s)", method.name, iterations);

        Ok(Self { successors, live_in, live_out })
    }

    pub fn live_in(&self, index: usize) -> &VarSet {
        &self.live_in[index]
    }

    pub fn live_out(&self, index: usize) -> &VarSet {
        &self.live_out[index]
    }

    pub fn successors(&self, index: usize) -> &[usize] {
        &self.successors[index]
    }

    pub fn len(&self) -> usize {
        self.live_in.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live_in.is_empty()
    }
}

/// Successor lists: fall-through unless the instruction terminates, plus the
/// target of any jump
fn build_cfg(method: &IrMethod) -> Result<Vec<Vec<usize>>> {
    let instrs = &method.instructions;
    let labels: HashMap<&str, usize> = instrs
        .iter()
        .enumerate()
        .filter_map(|(i, instr)| match instr {
            Instr::Label(name) => Some((name.as_str(), i)),
            _ => None,
        })
        .collect();
    let target = |label: &str| {
        labels
            .get(label)
            .copied()
            .ok_or_else(|| Error::malformed_ir(&method.name, format!("jump to undefined label {}", label)))
    };

    let mut successors = Vec::with_capacity(instrs.len());
    for (i, instr) in instrs.iter().enumerate() {
        let mut succ = Vec::new();
        if !instr.is_terminator() && i + 1 < instrs.len() {
            succ.push(i + 1);
        }
        match instr {
            Instr::Goto(label) | Instr::Branch { label, .. } => {
                let t = target(label)?;
                if !succ.contains(&t) {
                    succ.push(t);
                }
            }
            _ => {}
        }
        successors.push(succ);
    }
    Ok(successors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinOp;
    use crate::ir::{CallKind, IrType, Var};

    fn set(names: &[&str]) -> VarSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn int(name: &str) -> Operand {
        Operand::var(name, IrType::Int)
    }

    fn method(instructions: Vec<Instr>) -> IrMethod {
        IrMethod {
            name: "m".into(),
            is_static: false,
            params: vec![Var::new("n", IrType::Int)],
            locals: vec![Var::new("i", IrType::Int)],
            return_type: IrType::Int,
            instructions,
        }
    }

    #[test]
    fn test_use_def_cover_calls_and_fields() {
        let call = Instr::Assign {
            dest: Var::new("t0", IrType::Int),
            rhs: Rhs::Call(Call {
                kind: CallKind::Virtual,
                target: Operand::var("o", IrType::Object("A".into())),
                method: "f".into(),
                args: vec![int("a"), Operand::Int(1)],
                params: vec![IrType::Int, IrType::Int],
                ret: IrType::Int,
            }),
        };
        assert_eq!(uses(&call), set(&["a", "o"]));
        assert_eq!(defs(&call), set(&["t0"]));

        let put = Instr::PutField {
            object: Operand::This("A".into()),
            field: Var::new("x", IrType::Int),
            value: int("v"),
        };
        assert_eq!(uses(&put), set(&["v"]));
        assert!(defs(&put).is_empty());

        let store = Instr::ArrayStore {
            array: Var::new("xs", IrType::IntArray),
            index: int("i"),
            value: Operand::Int(3),
        };
        assert_eq!(uses(&store), set(&["i", "xs"]));
        assert!(defs(&store).is_empty());
    }

    #[test]
    fn test_loop_keeps_counter_live() {
        // i := 0; Loop: t0 := i < n; if (!t0) goto End; i := i + 1; goto Loop; End: ret i
        let m = method(vec![
            Instr::Assign { dest: Var::new("i", IrType::Int), rhs: Rhs::Operand(Operand::Int(0)) },
            Instr::Label("Loop_0".into()),
            Instr::Assign {
                dest: Var::new("t0", IrType::Bool),
                rhs: Rhs::Binary { op: BinOp::Lt, left: int("i"), right: int("n") },
            },
            Instr::Branch { cond: Operand::var("t0", IrType::Bool), negate: true, label: "EndLoop_0".into() },
            Instr::Assign {
                dest: Var::new("i", IrType::Int),
                rhs: Rhs::Binary { op: BinOp::Add, left: int("i"), right: Operand::Int(1) },
            },
            Instr::Goto("Loop_0".into()),
            Instr::Label("EndLoop_0".into()),
            Instr::Return(Some(int("i"))),
        ]);
        let live = Liveness::compute(&m).unwrap();

        assert_eq!(live.successors(3), &[4, 6]);
        assert_eq!(live.successors(5), &[1]);
        assert_eq!(live.live_in(0), &set(&["n"]));
        assert_eq!(live.live_out(0), &set(&["i", "n"]));
        assert_eq!(live.live_out(2), &set(&["i", "n", "t0"]));
        assert_eq!(live.live_out(3), &set(&["i", "n"]));
        assert!(live.live_out(7).is_empty());
    }

    #[test]
    fn test_undefined_label_is_an_error() {
        let m = method(vec![Instr::Goto("Nowhere".into())]);
        assert!(matches!(Liveness::compute(&m), Err(Error::MalformedIr { .. })));
    }
}

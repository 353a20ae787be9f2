//! Construction of the three slice predicates and the four Horn rules.
//!
//! For a fixed array type the rules are:
//!
//! ```text
//! initiation: end > start                                  => header(a, b, start, end, 0)
//! exit:       header(a, b, start, end, i) ∧ i >= end - start  => slice(a, b, start, end)
//! guard:      header(a, b, start, end, i) ∧ 0 <= i < end - start => loop(a, b, start, end, i)
//! step:       loop(a, b, start, end, i) ∧ b[i] = a[start + i]  => header(a, b, start, end, i + 1)
//! ```
//!
//! `slice(a, b, start, end)` is derivable iff `b[k] = a[start + k]` for all
//! `k` in `0..end - start`.

use z3::ast::{Array, Ast, Bool, Int};
use z3rro::{horn::HornRule, scope::SmtScope};

use crate::{
    smt::{
        predicates::Predicate,
        symbolic::{SymbolicArray, SymbolicInt, SymbolicVariable},
        symbols::Symbols,
        EncodingCtx,
    },
    ty::SortKind,
};

use super::{SliceData, SlicePredicates, SliceRules};

/// Names of all symbols declared for one tuple sort. The tuple name is part
/// of every name, so different array types never share a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceNames {
    pub a: String,
    pub b: String,
    pub start: String,
    pub end: String,
    pub i: String,
    pub slice: String,
    pub header: String,
    pub r#loop: String,
}

impl SliceNames {
    pub fn new(tuple_name: &str) -> Self {
        SliceNames {
            a: format!("a_{}", tuple_name),
            b: format!("b_{}", tuple_name),
            start: format!("start_{}", tuple_name),
            end: format!("end_{}", tuple_name),
            i: format!("i_{}", tuple_name),
            slice: format!("array_slice_{}", tuple_name),
            header: format!("array_slice_header_{}", tuple_name),
            r#loop: format!("array_slice_loop_{}", tuple_name),
        }
    }

    /// All names, variables first.
    pub fn all(&self) -> [&str; 8] {
        [
            self.a.as_str(),
            self.b.as_str(),
            self.start.as_str(),
            self.end.as_str(),
            self.i.as_str(),
            self.slice.as_str(),
            self.header.as_str(),
            self.r#loop.as_str(),
        ]
    }

    /// Panics if any of the names is already declared.
    fn assert_unclaimed(&self, symbols: &Symbols) {
        for name in self.all() {
            if let Some(kind) = symbols.kind(name) {
                panic!(
                    "cannot encode array slices: {} is already declared as a {:?}",
                    name, kind
                );
            }
        }
    }
}

/// The symbolic variables the slice rules are stated over.
#[derive(Debug, Clone)]
pub struct SliceVariables<'ctx> {
    pub a: SymbolicArray<'ctx>,
    pub b: SymbolicArray<'ctx>,
    pub start: SymbolicInt<'ctx>,
    pub end: SymbolicInt<'ctx>,
    pub i: SymbolicInt<'ctx>,
}

impl<'ctx> SliceVariables<'ctx> {
    fn new(enc: &mut EncodingCtx<'ctx>, array_sort: &SortKind, names: &SliceNames) -> Self {
        let index = SortKind::index();
        SliceVariables {
            a: enc.new_array_variable(array_sort, &names.a),
            b: enc.new_array_variable(array_sort, &names.b),
            start: enc.new_int_variable(&index, &names.start),
            end: enc.new_int_variable(&index, &names.end),
            i: enc.new_int_variable(&index, &names.i),
        }
    }

    /// A scope with the current values of all variables and the range
    /// constraints of the index variables.
    pub fn scope(&self) -> SmtScope<'ctx> {
        let mut scope = SmtScope::new();
        self.a.bind_current(&mut scope);
        self.b.bind_current(&mut scope);
        self.start.bind_current(&mut scope);
        self.end.bind_current(&mut scope);
        self.i.bind_current(&mut scope);
        scope
    }
}

/// Current values of the variables, as used in the rules.
struct Values<'ctx> {
    a: Array<'ctx>,
    b: Array<'ctx>,
    start: Int<'ctx>,
    end: Int<'ctx>,
    i: Int<'ctx>,
}

impl<'ctx> Values<'ctx> {
    fn new(vars: &SliceVariables<'ctx>) -> Self {
        Values {
            a: vars.a.elements(),
            b: vars.b.elements(),
            start: vars.start.value(),
            end: vars.end.value(),
            i: vars.i.value(),
        }
    }

    /// `end - start`, the length of the slice.
    fn length(&self) -> Int<'ctx> {
        Int::sub(self.start.get_ctx(), &[&self.end, &self.start])
    }

    fn slice(&self, slice: &Predicate<'ctx>) -> Bool<'ctx> {
        slice.apply(&[
            &self.a as &dyn Ast<'ctx>,
            &self.b,
            &self.start,
            &self.end,
        ])
    }

    /// Apply `header` or `loop` with the loop index `index`.
    fn at_index(&self, predicate: &Predicate<'ctx>, index: &Int<'ctx>) -> Bool<'ctx> {
        predicate.apply(&[
            &self.a as &dyn Ast<'ctx>,
            &self.b,
            &self.start,
            &self.end,
            index,
        ])
    }
}

/// `end > start => header(a, b, start, end, 0)`
pub fn initiation<'ctx>(vars: &SliceVariables<'ctx>, header: &Predicate<'ctx>) -> HornRule<'ctx> {
    let v = Values::new(vars);
    let zero = Int::from_u64(v.i.get_ctx(), 0);
    HornRule::new(
        "initiation",
        vec![v.end.gt(&v.start)],
        v.at_index(header, &zero),
    )
}

/// `header(a, b, start, end, i) ∧ i >= end - start => slice(a, b, start, end)`
pub fn exit<'ctx>(
    vars: &SliceVariables<'ctx>,
    header: &Predicate<'ctx>,
    slice: &Predicate<'ctx>,
) -> HornRule<'ctx> {
    let v = Values::new(vars);
    HornRule::new(
        "exit",
        vec![v.at_index(header, &v.i), v.i.ge(&v.length())],
        v.slice(slice),
    )
}

/// `header(a, b, start, end, i) ∧ i >= 0 ∧ i < end - start => loop(a, b, start, end, i)`
pub fn guard<'ctx>(
    vars: &SliceVariables<'ctx>,
    header: &Predicate<'ctx>,
    loop_pred: &Predicate<'ctx>,
) -> HornRule<'ctx> {
    let v = Values::new(vars);
    let zero = Int::from_u64(v.i.get_ctx(), 0);
    HornRule::new(
        "guard",
        vec![
            v.at_index(header, &v.i),
            v.i.ge(&zero),
            v.i.lt(&v.length()),
        ],
        v.at_index(loop_pred, &v.i),
    )
}

/// `loop(a, b, start, end, i) ∧ b[i] = a[start + i] => header(a, b, start, end, i + 1)`
pub fn step<'ctx>(
    vars: &SliceVariables<'ctx>,
    loop_pred: &Predicate<'ctx>,
    header: &Predicate<'ctx>,
) -> HornRule<'ctx> {
    let v = Values::new(vars);
    let ctx = v.i.get_ctx();
    let source_index = Int::add(ctx, &[&v.start, &v.i]);
    let elements_equal = v.b.select(&v.i)._eq(&v.a.select(&source_index));
    let next = Int::add(ctx, &[&v.i, &Int::from_u64(ctx, 1)]);
    HornRule::new(
        "step",
        vec![v.at_index(loop_pred, &v.i), elements_equal],
        v.at_index(header, &next),
    )
}

/// Declare all variables and predicates for the array tuple `tuple_name`
/// whose first component has the sort `array_sort`, and build the rules.
///
/// Panics before declaring anything if one of the names is already taken.
pub fn build<'ctx>(
    enc: &mut EncodingCtx<'ctx>,
    array_sort: &SortKind,
    tuple_name: &str,
) -> SliceData<'ctx> {
    let names = SliceNames::new(tuple_name);
    names.assert_unclaimed(enc.symbols());

    let vars = SliceVariables::new(enc, array_sort, &names);

    let slice_domain = vec![
        vars.a.sort().clone(),
        vars.b.sort().clone(),
        vars.start.sort().clone(),
        vars.end.sort().clone(),
    ];
    let slice = enc.declare_predicate(&slice_domain, &names.slice);

    let mut loop_domain = slice_domain;
    loop_domain.push(vars.i.sort().clone());
    let header = enc.declare_predicate(&loop_domain, &names.header);
    let loop_pred = enc.declare_predicate(&loop_domain, &names.r#loop);

    let rules = SliceRules {
        initiation: initiation(&vars, &header),
        exit: exit(&vars, &header, &slice),
        guard: guard(&vars, &header, &loop_pred),
        step: step(&vars, &loop_pred, &header),
    };

    SliceData {
        tuple_name: tuple_name.to_owned(),
        predicates: SlicePredicates {
            slice,
            header,
            r#loop: loop_pred,
        },
        rules,
        scope: vars.scope(),
        variables: vars,
    }
}

//! Symbolic variables. Each variable has a base name and an SSA index; its
//! current value is the Z3 constant `<name>_<index>`.

use z3::{
    ast::{Array, Bool, Dynamic, Int},
    Context, Sort,
};
use z3rro::{scope::SmtScope, BoundedUIntFactory, SmtInvariant};

use crate::ty::SortKind;

/// Common interface of all symbolic variables.
pub trait SymbolicVariable<'ctx> {
    /// The base name of the variable.
    fn name(&self) -> &str;

    /// The sort of the variable in our sort language.
    fn ty(&self) -> &SortKind;

    /// The Z3 sort of the variable's values.
    fn sort(&self) -> &Sort<'ctx>;

    /// The current SSA index.
    fn index(&self) -> usize;

    /// The value at the current SSA index.
    fn current_value(&self) -> Dynamic<'ctx>;

    /// The constraint that the current value has to satisfy, if any.
    fn current_invariant(&self) -> Option<Bool<'ctx>>;

    /// Register the current value and its invariant in `scope`.
    fn bind_current(&self, scope: &mut SmtScope<'ctx>) {
        scope.add_bound(&self.current_value());
        if let Some(invariant) = self.current_invariant() {
            scope.add_constraint(&invariant);
        }
    }
}

#[derive(Debug, Clone)]
struct SsaName {
    name: String,
    index: usize,
}

impl SsaName {
    fn new(name: &str) -> Self {
        SsaName {
            name: name.to_owned(),
            index: 0,
        }
    }

    fn at(&self, index: usize) -> String {
        format!("{}_{}", self.name, index)
    }

    fn current(&self) -> String {
        self.at(self.index)
    }
}

/// An array-valued variable.
#[derive(Debug, Clone)]
pub struct SymbolicArray<'ctx> {
    ctx: &'ctx Context,
    ty: SortKind,
    sort: Sort<'ctx>,
    domain: Sort<'ctx>,
    range: Sort<'ctx>,
    ssa: SsaName,
}

impl<'ctx> SymbolicArray<'ctx> {
    /// Create the variable. `sort` must be the Z3 array sort of `ty`.
    pub(super) fn new(ctx: &'ctx Context, ty: &SortKind, sort: Sort<'ctx>, name: &str) -> Self {
        let domain = sort
            .array_domain()
            .expect("array variables need an array sort");
        let range = sort
            .array_range()
            .expect("array variables need an array sort");
        SymbolicArray {
            ctx,
            ty: ty.clone(),
            sort,
            domain,
            range,
            ssa: SsaName::new(name),
        }
    }

    /// The array at the current SSA index. This is the expression to use in
    /// `select` and `store` operations.
    pub fn elements(&self) -> Array<'ctx> {
        self.value_at_index(self.ssa.index)
    }

    pub fn value_at_index(&self, index: usize) -> Array<'ctx> {
        Array::new_const(self.ctx, self.ssa.at(index), &self.domain, &self.range)
    }

    /// Move to a new SSA version and return its value.
    pub fn increase_index(&mut self) -> Array<'ctx> {
        self.ssa.index += 1;
        self.elements()
    }
}

impl<'ctx> SymbolicVariable<'ctx> for SymbolicArray<'ctx> {
    fn name(&self) -> &str {
        &self.ssa.name
    }

    fn ty(&self) -> &SortKind {
        &self.ty
    }

    fn sort(&self) -> &Sort<'ctx> {
        &self.sort
    }

    fn index(&self) -> usize {
        self.ssa.index
    }

    fn current_value(&self) -> Dynamic<'ctx> {
        Dynamic::from_ast(&self.elements())
    }

    fn current_invariant(&self) -> Option<Bool<'ctx>> {
        None
    }
}

/// An integer-valued variable. Variables of a `uint<N>` sort are constrained
/// to `0..2^N` by their invariant.
#[derive(Debug, Clone)]
pub struct SymbolicInt<'ctx> {
    ctx: &'ctx Context,
    ty: SortKind,
    sort: Sort<'ctx>,
    bounds: Option<BoundedUIntFactory<'ctx>>,
    ssa: SsaName,
}

impl<'ctx> SymbolicInt<'ctx> {
    pub(super) fn new(ctx: &'ctx Context, ty: &SortKind, name: &str) -> Self {
        let bounds = match ty {
            SortKind::UInt(bits) => Some(BoundedUIntFactory::new(ctx, *bits)),
            SortKind::Int => None,
            _ => panic!("integer variables need an integer sort, got {}", ty),
        };
        SymbolicInt {
            ctx,
            ty: ty.clone(),
            sort: Sort::int(ctx),
            bounds,
            ssa: SsaName::new(name),
        }
    }

    /// The integer at the current SSA index.
    pub fn value(&self) -> Int<'ctx> {
        self.value_at_index(self.ssa.index)
    }

    pub fn value_at_index(&self, index: usize) -> Int<'ctx> {
        Int::new_const(self.ctx, self.ssa.at(index))
    }

    /// Move to a new SSA version and return its value.
    pub fn increase_index(&mut self) -> Int<'ctx> {
        self.ssa.index += 1;
        self.value()
    }
}

impl<'ctx> SymbolicVariable<'ctx> for SymbolicInt<'ctx> {
    fn name(&self) -> &str {
        &self.ssa.name
    }

    fn ty(&self) -> &SortKind {
        &self.ty
    }

    fn sort(&self) -> &Sort<'ctx> {
        &self.sort
    }

    fn index(&self) -> usize {
        self.ssa.index
    }

    fn current_value(&self) -> Dynamic<'ctx> {
        Dynamic::from_ast(&self.value())
    }

    fn current_invariant(&self) -> Option<Bool<'ctx>> {
        let factory = self.bounds.as_ref()?;
        factory.unchecked_from_int(self.value()).smt_invariant()
    }
}

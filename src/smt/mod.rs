//! The encoding context: creation of symbolic variables, predicates and
//! sorts for one verification session.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use z3::{Context, DatatypeAccessor, DatatypeBuilder, Sort};

use crate::ty::{SortKind, TupleSort};

use self::{
    predicates::{Predicate, Predicates},
    symbolic::{SymbolicArray, SymbolicInt},
    symbols::{SymbolKind, Symbols},
};

pub mod predicates;
pub mod symbolic;
pub mod symbols;

/// Session-scoped environment that mints symbolic variables and declares
/// predicates. All variable and predicate names are unique within one
/// context; declaring a name twice is an internal error and panics.
pub struct EncodingCtx<'ctx> {
    ctx: &'ctx Context,
    symbols: Symbols,
    predicates: Predicates<'ctx>,
    tuples: RefCell<HashMap<String, Sort<'ctx>>>,
}

impl<'ctx> EncodingCtx<'ctx> {
    pub fn new(ctx: &'ctx Context) -> Self {
        EncodingCtx {
            ctx,
            symbols: Symbols::default(),
            predicates: Predicates::new(ctx),
            tuples: RefCell::new(HashMap::new()),
        }
    }

    /// Get the Z3 context.
    #[must_use]
    pub fn ctx(&self) -> &'ctx Context {
        self.ctx
    }

    #[must_use]
    pub fn predicates(&self) -> &Predicates<'ctx> {
        &self.predicates
    }

    #[must_use]
    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    /// Create a new array-valued variable of sort `ty`.
    ///
    /// Panics if `ty` is not an array sort or the name is taken.
    pub fn new_array_variable(&mut self, ty: &SortKind, name: &str) -> SymbolicArray<'ctx> {
        assert!(ty.is_array(), "expected an array sort for {}, got {}", name, ty);
        self.symbols.claim(name, SymbolKind::Variable);
        let sort = self.sort(ty);
        SymbolicArray::new(self.ctx, ty, sort, name)
    }

    /// Create a new integer-valued variable of sort `ty`.
    ///
    /// Panics if `ty` is not an integer sort or the name is taken.
    pub fn new_int_variable(&mut self, ty: &SortKind, name: &str) -> SymbolicInt<'ctx> {
        assert!(
            ty.is_integer(),
            "expected an integer sort for {}, got {}",
            name,
            ty
        );
        self.symbols.claim(name, SymbolKind::Variable);
        SymbolicInt::new(self.ctx, ty, name)
    }

    /// Declare the predicate `name : domain -> Bool`.
    ///
    /// Panics if the name is taken.
    pub fn declare_predicate(&mut self, domain: &[Sort<'ctx>], name: &str) -> Rc<Predicate<'ctx>> {
        self.symbols.claim(name, SymbolKind::Predicate);
        self.predicates.add(name, domain)
    }

    /// Translate a sort to its Z3 sort. Integers of every width are Z3
    /// integers, arrays are indexed by integers, and tuples become datatypes
    /// with a single constructor.
    pub fn sort(&self, ty: &SortKind) -> Sort<'ctx> {
        match ty {
            SortKind::Bool => Sort::bool(self.ctx),
            SortKind::Int | SortKind::UInt(_) => Sort::int(self.ctx),
            SortKind::Array(element) => {
                Sort::array(self.ctx, &Sort::int(self.ctx), &self.sort(element))
            }
            SortKind::Tuple(tuple) => self.tuple_sort(tuple),
        }
    }

    fn tuple_sort(&self, tuple: &TupleSort) -> Sort<'ctx> {
        if let Some(sort) = self.tuples.borrow().get(&tuple.name) {
            return sort.clone();
        }
        // translating the components can declare nested tuples, so the map
        // must not be borrowed here
        let components: Vec<Sort<'ctx>> = tuple
            .components
            .iter()
            .map(|component| self.sort(component))
            .collect();
        let field_names: Vec<String> = (0..components.len())
            .map(|i| format!("{}_accessor_{}", tuple.name, i))
            .collect();
        let fields = field_names
            .iter()
            .zip(components)
            .map(|(name, sort)| (name.as_str(), DatatypeAccessor::Sort(sort)))
            .collect();
        let datatype = DatatypeBuilder::new(self.ctx, tuple.name.as_str())
            .variant(&tuple.name, fields)
            .finish();
        tracing::trace!(tuple = tuple.name.as_str(), "declare tuple datatype");
        let mut tuples = self.tuples.borrow_mut();
        let sort = tuples
            .entry(tuple.name.clone())
            .or_insert(datatype.sort);
        sort.clone()
    }
}

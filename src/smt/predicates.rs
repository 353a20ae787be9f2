//! Predicates: uninterpreted Boolean-valued functions that Horn rules are
//! stated over.

use std::{fmt, rc::Rc};

use indexmap::IndexMap;
use z3::{
    ast::{Ast, Bool},
    Context, FuncDecl, Sort,
};

/// A named relation over a list of argument sorts. Predicates are identified
/// by their name.
#[derive(Debug)]
pub struct Predicate<'ctx> {
    name: String,
    domain: Vec<Sort<'ctx>>,
    decl: FuncDecl<'ctx>,
}

impl<'ctx> Predicate<'ctx> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &[Sort<'ctx>] {
        &self.domain
    }

    pub fn arity(&self) -> usize {
        self.domain.len()
    }

    pub fn decl(&self) -> &FuncDecl<'ctx> {
        &self.decl
    }

    /// Apply the predicate to the arguments.
    ///
    /// Panics if the number or the sorts of the arguments do not match the
    /// predicate's domain.
    pub fn apply(&self, args: &[&dyn Ast<'ctx>]) -> Bool<'ctx> {
        assert_eq!(
            args.len(),
            self.arity(),
            "predicate {} applied to the wrong number of arguments",
            self.name
        );
        for (position, (arg, sort)) in args.iter().zip(&self.domain).enumerate() {
            assert_eq!(
                &arg.get_sort(),
                sort,
                "argument {} of predicate {} has the wrong sort",
                position,
                self.name
            );
        }
        self.decl
            .apply(args)
            .as_bool()
            .expect("predicates have a Boolean range")
    }
}

impl PartialEq for Predicate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Predicate<'_> {}

impl fmt::Display for Predicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, sort) in self.domain.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", sort)?;
        }
        write!(f, ")")
    }
}

/// Tracks the Z3 declarations of all predicates of an encoding context, in
/// declaration order.
#[derive(Debug)]
pub struct Predicates<'ctx> {
    ctx: &'ctx Context,
    predicates: IndexMap<String, Rc<Predicate<'ctx>>>,
}

impl<'ctx> Predicates<'ctx> {
    pub fn new(ctx: &'ctx Context) -> Self {
        Predicates {
            ctx,
            predicates: IndexMap::new(),
        }
    }

    /// Declare a new predicate `name : domain -> Bool`.
    ///
    /// Panics if a predicate with this name already exists.
    pub fn add(&mut self, name: &str, domain: &[Sort<'ctx>]) -> Rc<Predicate<'ctx>> {
        let domain_refs: Vec<&Sort<'ctx>> = domain.iter().collect();
        let decl = FuncDecl::new(self.ctx, name, &domain_refs, &Sort::bool(self.ctx));
        let predicate = Rc::new(Predicate {
            name: name.to_owned(),
            domain: domain.to_vec(),
            decl,
        });
        let prev = self
            .predicates
            .insert(name.to_owned(), Rc::clone(&predicate));
        assert!(prev.is_none(), "predicate {} is already declared", name);
        predicate
    }

    pub fn get(&self, name: &str) -> Option<&Rc<Predicate<'ctx>>> {
        self.predicates.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Predicate<'ctx>>> {
        self.predicates.values()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

//! The [`SmtScope`] tracks variables and associated constraints to create
//! quantifiers.

use z3::{
    ast::{exists_const, forall_const, Ast, Bool, Dynamic},
    Context, Pattern,
};

use crate::prover::Prover;

/// An SmtScope can be used to construct a quantifier like `forall` or `exists`.
/// The scope has a list of bound expressions (usually just variables) and a
/// list of [`Bool`] constraints.
///
/// Horn rules are stated over the variables of one scope: when a rule is
/// exported (see [`crate::horn::HornSystem`]), it is universally quantified
/// over the scope's bounds and the scope's constraints become additional
/// premises of the rule.
///
/// Since the SmtScopes are used to create quantifiers with the corresponding
/// constraints of the quantified variables, it is important that all variables
/// used in quantifiers along with their constraints (see
/// [`crate::SmtInvariant`]) are added to the SmtScopes.
#[derive(Debug, Clone, Default)]
pub struct SmtScope<'ctx> {
    bounds: Vec<Dynamic<'ctx>>,
    constraints: Vec<Bool<'ctx>>,
}

impl<'ctx> SmtScope<'ctx> {
    /// Create a new SmtScope.
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a new expression to the list of bounds. This is usually just a
    /// variable.
    pub fn add_bound(&mut self, bound: &dyn Ast<'ctx>) {
        self.bounds.push(Dynamic::from_ast(bound));
    }

    /// Add a constraint to the list of constraints in this scope.
    pub fn add_constraint(&mut self, constraint: &Bool<'ctx>) {
        self.constraints.push(constraint.clone());
    }

    /// Directly add this scope to the global scope of the given prover.
    pub fn add_assumptions_to_prover(&self, prover: &mut Prover<'ctx>) {
        // We only need to add the constraints to the prover, any unquantified
        // variables occuring in the bound list are automatically existentially
        // quantified by Z3.
        for constraint in &self.constraints {
            prover.add_assumption(constraint);
        }
    }

    /// Create a new existential quantifier around `body`, quantifying over all
    /// bound expressions in this scope.
    pub fn exists(&self, patterns: &[&Pattern<'ctx>], body: &Bool<'ctx>) -> Bool<'ctx> {
        let ctx = body.get_ctx();
        let body = Bool::and(ctx, &[&self.all_constraints(ctx), body]);
        if self.bounds.is_empty() {
            return body;
        }
        exists_const(ctx, &self.bounds_dyn(), patterns, &body)
    }

    /// Create a new universal quantifier around `body`, quantifying over all
    /// bound expressions in this scope.
    pub fn forall(&self, patterns: &[&Pattern<'ctx>], body: &Bool<'ctx>) -> Bool<'ctx> {
        let ctx = body.get_ctx();
        let body = self.all_constraints(ctx).implies(body);
        if self.bounds.is_empty() {
            return body;
        }
        forall_const(ctx, &self.bounds_dyn(), patterns, &body)
    }

    pub fn get_bounds(&self) -> impl Iterator<Item = &Dynamic<'ctx>> {
        self.bounds.iter()
    }

    pub fn get_constraints(&self) -> impl Iterator<Item = &Bool<'ctx>> {
        self.constraints.iter()
    }

    /// The Z3 Rust API needs the bounds as a vector of `&dyn Ast<'ctx>` and
    /// does not accept a vector of [`Dynamic`] references, so we convert that
    /// here.
    fn bounds_dyn(&self) -> Vec<&dyn Ast<'ctx>> {
        self.bounds
            .iter()
            .map(|bound| {
                let b: &dyn Ast<'ctx> = bound;
                b
            })
            .collect()
    }

    /// Create a conjunction of all constraints in this scope.
    fn all_constraints(&self, ctx: &'ctx Context) -> Bool<'ctx> {
        let constraints_ref: Vec<&Bool<'_>> = self.constraints.iter().collect();
        Bool::and(ctx, &constraints_ref)
    }
}

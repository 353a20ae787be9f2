//! Horn rules and their export to a constrained Horn clause solver.
//!
//! A [`HornRule`] is an implication `b_1 ∧ ... ∧ b_n ⇒ h` where the body
//! atoms `b_i` are predicate applications or constraints, and the head `h` is
//! a single predicate application (or `false` for a query). Rules are stated
//! over free variables; [`HornSystem::add_rule`] closes them universally with
//! an [`SmtScope`].

use std::fmt::{self, Display};

use z3::{
    ast::{Ast, Bool},
    Context, Solver,
};

use crate::{scope::SmtScope, smtlib::Smtlib};

/// A single Horn clause `body ⇒ head`.
#[derive(Debug, Clone)]
pub struct HornRule<'ctx> {
    name: String,
    body: Vec<Bool<'ctx>>,
    head: Bool<'ctx>,
}

impl<'ctx> HornRule<'ctx> {
    pub fn new(name: impl Into<String>, body: Vec<Bool<'ctx>>, head: Bool<'ctx>) -> Self {
        HornRule {
            name: name.into(),
            body,
            head,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &[Bool<'ctx>] {
        &self.body
    }

    pub fn head(&self) -> &Bool<'ctx> {
        &self.head
    }

    /// The conjunction of all body atoms. An empty body is `true`.
    pub fn guard(&self) -> Bool<'ctx> {
        match self.body.as_slice() {
            [] => Bool::from_bool(self.head.get_ctx(), true),
            [atom] => atom.clone(),
            body => {
                let body: Vec<&Bool<'ctx>> = body.iter().collect();
                Bool::and(self.head.get_ctx(), &body)
            }
        }
    }

    /// The rule as a quantifier-free implication.
    pub fn implication(&self) -> Bool<'ctx> {
        self.guard().implies(&self.head)
    }

    /// Universally close the rule over the bounds of `scope`. The scope's
    /// constraints become additional premises.
    pub fn close(&self, scope: &SmtScope<'ctx>) -> Bool<'ctx> {
        scope.forall(&[], &self.implication())
    }
}

impl Display for HornRule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.implication())
    }
}

/// A set of closed Horn rules to be handed to a CHC solver. The rules are
/// asserted on a Z3 [`Solver`] which is only used to print them; this type
/// never checks satisfiability.
#[derive(Debug)]
pub struct HornSystem<'ctx> {
    solver: Solver<'ctx>,
    rules: Vec<String>,
}

impl<'ctx> HornSystem<'ctx> {
    pub fn new(ctx: &'ctx Context) -> Self {
        HornSystem {
            solver: Solver::new(ctx),
            rules: Vec::new(),
        }
    }

    /// Add the rule, universally closed over `scope`.
    pub fn add_rule(&mut self, rule: &HornRule<'ctx>, scope: &SmtScope<'ctx>) {
        tracing::trace!(rule = rule.name(), "add horn rule");
        self.solver.assert(&rule.close(scope));
        self.rules.push(rule.name().to_owned());
    }

    /// Names of all added rules, in insertion order.
    pub fn rule_names(&self) -> &[String] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The system as an SMT-LIB benchmark in the `HORN` logic.
    pub fn to_smtlib(&self) -> Smtlib {
        let mut smtlib = Smtlib::from_solver(&self.solver);
        smtlib.set_logic("HORN");
        smtlib.add_check_sat();
        smtlib
    }
}

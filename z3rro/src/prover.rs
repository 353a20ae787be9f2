//! Not a SAT solver, but a prover. There's a difference.
//!
//! The Horn rules themselves are handed to an external CHC solver. The
//! [`Prover`] is used to check validity of plain first-order facts about the
//! encodings, e.g. that the guards of two rules are complementary.

use std::fmt::Display;

use z3::{ast::Bool, Context, Model, SatResult, Solver};

/// The result of a prove query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProveResult {
    Proof,
    Counterexample,
    Unknown(String),
}

impl Display for ProveResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProveResult::Proof => f.write_str("Proof"),
            ProveResult::Counterexample => f.write_str("Counterexample"),
            ProveResult::Unknown(reason) => {
                f.write_fmt(format_args!("Unknown (reason: {})", reason))
            }
        }
    }
}

/// A prover wraps a SAT solver, but it's used to prove validity of formulas.
/// It's a bit of a more explicit API to distinguish between assumptions for a
/// proof ([`Prover::add_assumption`]) and provables ([`Prover::add_provable`]).
///
/// If no provable was added, [`Prover::check_proof`] returns
/// [`ProveResult::Proof`] without asking the solver.
#[derive(Debug)]
pub struct Prover<'ctx> {
    solver: Solver<'ctx>,
    has_provables: bool,
    /// The last result of a SAT/proof check. It is reset any time the
    /// assertions on the solver are modified.
    last_result: Option<SatResult>,
}

impl<'ctx> Prover<'ctx> {
    pub fn new(ctx: &'ctx Context) -> Self {
        Prover {
            solver: Solver::new(ctx),
            has_provables: false,
            last_result: None,
        }
    }

    /// Get all assertions added to the underlying solver.
    pub fn get_assertions(&self) -> Vec<Bool<'ctx>> {
        self.solver.get_assertions()
    }

    /// Add an assumption to this prover.
    pub fn add_assumption(&mut self, value: &Bool<'ctx>) {
        self.solver.assert(value);
        self.last_result = None;
    }

    /// Add a proof obligation to this prover. It adds the negated formula to
    /// the underlying SAT solver's assertions.
    pub fn add_provable(&mut self, value: &Bool<'ctx>) {
        self.add_assumption(&value.not());
        self.has_provables = true;
    }

    /// Do the SAT check, but consider a check with no provables to be a
    /// [`ProveResult::Proof`].
    pub fn check_proof(&mut self) -> ProveResult {
        if !self.has_provables {
            return ProveResult::Proof;
        }
        match self.check_sat() {
            SatResult::Unsat => ProveResult::Proof,
            SatResult::Sat => ProveResult::Counterexample,
            SatResult::Unknown => ProveResult::Unknown(
                self.solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "unknown".to_owned()),
            ),
        }
    }

    /// Do the regular SAT check.
    pub fn check_sat(&mut self) -> SatResult {
        if let Some(cached_result) = self.last_result {
            return cached_result;
        }
        let res = self.solver.check();
        tracing::trace!(result=?res, "solver check");
        self.last_result = Some(res);
        res
    }

    /// Retrieve the model from the solver after a [`SatResult::Sat`] (or
    /// [`ProveResult::Counterexample`]) result.
    pub fn get_model(&self) -> Option<Model<'ctx>> {
        match self.last_result? {
            SatResult::Sat | SatResult::Unknown => self.solver.get_model(),
            SatResult::Unsat => None,
        }
    }
}

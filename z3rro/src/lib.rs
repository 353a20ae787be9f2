//! Small helpers around the [`z3`] crate that the Horn clause encodings are
//! built with.
//!
//! Rules are stated over free variables that are collected in an
//! [`scope::SmtScope`] together with their range constraints, and a
//! [`horn::HornSystem`] closes every rule universally over its scope before it
//! is printed as an SMT-LIB benchmark. Fixed-width unsigned integers are
//! encoded as Z3 integers with an invariant ([`BoundedUInt`]).

#[macro_use]
pub mod util;
pub mod horn;
pub mod prover;
pub mod scope;
pub mod smtlib;

mod bounded;
pub use bounded::{BoundedUInt, BoundedUIntFactory};


use z3::ast::Bool;

/// Many SMT types have associated _invariants_. These are Boolean constraints
/// that always hold for values.
///
/// For example, our type for bounded unsigned integers ([`crate::BoundedUInt`])
/// uses a representation based on Z3's [`z3::ast::Int`]. All values of that
/// type are non-negative and fit into the type's bit width. This is the
/// invariant provided by this trait's function.
pub trait SmtInvariant<'ctx> {
    /// Return a Boolean expression that specifies whether a value of this type
    /// is valid. May be `None` if there is no invariant.
    fn smt_invariant(&self) -> Option<Bool<'ctx>>;
}

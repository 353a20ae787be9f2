//! Horn clause encoding of the relation "array `b` equals the sub-range
//! `[start, end)` of array `a`".
//!
//! For every array type, [`SliceCache::obtain`] declares three predicates
//! (`slice`, `header`, `loop`) and four Horn rules (see [`rules`]) that
//! define the relation inductively, index by index. The result is cached per
//! tuple sort so that each array type is encoded exactly once per session.

use std::rc::Rc;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, trace_span};
use z3rro::{
    horn::{HornRule, HornSystem},
    scope::SmtScope,
};

use crate::{
    smt::{predicates::Predicate, EncodingCtx},
    ty::{SortKind, TupleSort},
};

pub mod rules;

use self::rules::SliceVariables;

#[cfg(test)]
mod tests;

/// Reasons why a sort cannot be used to encode array slices.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SliceSortError {
    #[error("expected a tuple sort, got {0}")]
    NotATuple(SortKind),
    #[error("tuple sort {0} has no components")]
    EmptyTuple(String),
    #[error("the first component of tuple sort {name} must be an array sort, got {found}")]
    NotAnArray { name: String, found: SortKind },
}

/// A tuple sort whose first component is an array sort.
#[derive(Debug, Clone, Copy)]
pub struct ArrayTuple<'a> {
    tuple: &'a TupleSort,
    array: &'a SortKind,
}

impl<'a> ArrayTuple<'a> {
    /// Check that `sort` is a tuple sort whose first component is an array.
    pub fn from_sort(sort: &'a SortKind) -> Result<Self, SliceSortError> {
        let tuple = sort
            .as_tuple()
            .ok_or_else(|| SliceSortError::NotATuple(sort.clone()))?;
        let array = tuple
            .components
            .first()
            .ok_or_else(|| SliceSortError::EmptyTuple(tuple.name.clone()))?;
        if !array.is_array() {
            return Err(SliceSortError::NotAnArray {
                name: tuple.name.clone(),
                found: array.clone(),
            });
        }
        Ok(ArrayTuple { tuple, array })
    }

    pub fn name(&self) -> &'a str {
        &self.tuple.name
    }

    pub fn tuple(&self) -> &'a TupleSort {
        self.tuple
    }

    pub fn array_sort(&self) -> &'a SortKind {
        self.array
    }
}

/// The predicates of one array type.
#[derive(Debug, Clone)]
pub struct SlicePredicates<'ctx> {
    /// `slice(a, b, start, end)`: `b` is `a[start..end]`.
    pub slice: Rc<Predicate<'ctx>>,
    /// `header(a, b, start, end, i)`: the first `i` elements are equal.
    pub header: Rc<Predicate<'ctx>>,
    /// `loop(a, b, start, end, i)`: like `header`, and `i` is in range.
    pub r#loop: Rc<Predicate<'ctx>>,
}

impl<'ctx> SlicePredicates<'ctx> {
    pub fn iter(&self) -> impl Iterator<Item = &Rc<Predicate<'ctx>>> {
        [&self.slice, &self.header, &self.r#loop].into_iter()
    }
}

/// The Horn rules of one array type.
#[derive(Debug, Clone)]
pub struct SliceRules<'ctx> {
    pub initiation: HornRule<'ctx>,
    pub exit: HornRule<'ctx>,
    pub guard: HornRule<'ctx>,
    pub step: HornRule<'ctx>,
}

impl<'ctx> SliceRules<'ctx> {
    pub fn iter(&self) -> impl Iterator<Item = &HornRule<'ctx>> {
        [&self.initiation, &self.exit, &self.guard, &self.step].into_iter()
    }
}

/// Everything that was created for one array type.
#[derive(Debug)]
pub struct SliceData<'ctx> {
    tuple_name: String,
    pub predicates: SlicePredicates<'ctx>,
    pub rules: SliceRules<'ctx>,
    variables: SliceVariables<'ctx>,
    scope: SmtScope<'ctx>,
}

impl<'ctx> SliceData<'ctx> {
    pub fn tuple_name(&self) -> &str {
        &self.tuple_name
    }

    pub fn variables(&self) -> &SliceVariables<'ctx> {
        &self.variables
    }

    /// The variables the rules are stated over, with the range constraints
    /// of the index variables.
    pub fn scope(&self) -> &SmtScope<'ctx> {
        &self.scope
    }

    /// Add the universally closed rules to `system`.
    pub fn add_to_system(&self, system: &mut HornSystem<'ctx>) {
        for rule in self.rules.iter() {
            system.add_rule(rule, &self.scope);
        }
    }
}

#[derive(Debug)]
struct CacheEntry<'ctx> {
    sort: TupleSort,
    data: Rc<SliceData<'ctx>>,
}

/// Memoizes the slice encodings of one verification session, keyed by the
/// name of the tuple sort.
///
/// The cache belongs to the session that owns the [`EncodingCtx`] its
/// entries were declared in; it must not be used with another context.
#[derive(Debug, Default)]
pub struct SliceCache<'ctx> {
    entries: IndexMap<String, CacheEntry<'ctx>>,
}

impl<'ctx> SliceCache<'ctx> {
    pub fn new() -> Self {
        SliceCache {
            entries: IndexMap::new(),
        }
    }

    /// Get the slice encoding for the array tuple `sort`, creating it in
    /// `enc` if this is the first request for the sort. The returned flag is
    /// `true` iff the encoding was reused.
    ///
    /// Panics if `sort` is not a tuple sort whose first component is an
    /// array sort, or if a different tuple sort with the same name was
    /// encoded before. Both are bugs in the caller. Nothing is declared in
    /// `enc` in that case.
    ///
    /// The symbols of a tuple `T` are `a_T`, `b_T`, `start_T`, `end_T`, `i_T`,
    /// `array_slice_T`, `array_slice_header_T` and `array_slice_loop_T` (see
    /// [`rules::SliceNames`]). Distinct tuple names can still produce the same
    /// symbol, e.g. `T` and `header_T`, and the second of them panics when
    /// its symbols are declared. Callers must keep tuple names collision-free
    /// under these prefixes.
    pub fn obtain(
        &mut self,
        sort: &SortKind,
        enc: &mut EncodingCtx<'ctx>,
    ) -> (bool, Rc<SliceData<'ctx>>) {
        let array_tuple = ArrayTuple::from_sort(sort)
            .unwrap_or_else(|err| panic!("internal error: cannot encode array slices: {}", err));
        let name = array_tuple.name();

        if let Some(entry) = self.entries.get(name) {
            assert_eq!(
                &entry.sort,
                array_tuple.tuple(),
                "internal error: tuple name {} refers to two different sorts",
                name
            );
            debug!(tuple = name, "reusing array slice predicates");
            return (true, Rc::clone(&entry.data));
        }

        let data = {
            let _span = trace_span!("array_slice", tuple = name).entered();
            Rc::new(rules::build(enc, array_tuple.array_sort(), name))
        };
        debug!(tuple = name, "created array slice predicates");
        self.entries.insert(
            name.to_owned(),
            CacheEntry {
                sort: array_tuple.tuple().clone(),
                data: Rc::clone(&data),
            },
        );
        (false, data)
    }

    /// The encoding for the tuple sort with this name, if it was created.
    pub fn get(&self, tuple_name: &str) -> Option<&Rc<SliceData<'ctx>>> {
        self.entries.get(tuple_name).map(|entry| &entry.data)
    }

    /// All encodings in the order they were created.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<SliceData<'ctx>>> {
        self.entries.values().map(|entry| &entry.data)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A Horn system with the rules of all encodings.
    pub fn to_horn_system(&self, enc: &EncodingCtx<'ctx>) -> HornSystem<'ctx> {
        let mut system = HornSystem::new(enc.ctx());
        for data in self.iter() {
            data.add_to_system(&mut system);
        }
        system
    }
}

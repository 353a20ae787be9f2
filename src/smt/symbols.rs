//! Names of the constants and functions declared in an encoding context.

use std::collections::{hash_map::Entry, HashMap};

/// What a declared name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Predicate,
}

/// Tracks all names declared in one [`super::EncodingCtx`]. Variables and
/// predicates share one namespace in the SMT-LIB output, so a name may only
/// be claimed once.
#[derive(Debug, Default)]
pub struct Symbols {
    claimed: HashMap<String, SymbolKind>,
}

impl Symbols {
    /// Claim `name` for a new declaration.
    ///
    /// Panics if the name was already claimed.
    pub fn claim(&mut self, name: &str, kind: SymbolKind) {
        match self.claimed.entry(name.to_owned()) {
            Entry::Occupied(entry) => panic!(
                "cannot declare {:?} {}: name is already declared as a {:?}",
                kind,
                name,
                entry.get()
            ),
            Entry::Vacant(entry) => {
                tracing::trace!(name, ?kind, "claim symbol");
                entry.insert(kind);
            }
        }
    }

    pub fn kind(&self, name: &str) -> Option<SymbolKind> {
        self.claimed.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::{SymbolKind, Symbols};

    #[test]
    fn test_claim() {
        let mut symbols = Symbols::default();
        assert!(symbols.is_empty());
        symbols.claim("a_T", SymbolKind::Variable);
        symbols.claim("array_slice_T", SymbolKind::Predicate);
        assert_eq!(symbols.kind("a_T"), Some(SymbolKind::Variable));
        assert_eq!(symbols.kind("array_slice_T"), Some(SymbolKind::Predicate));
        assert_eq!(symbols.kind("b_T"), None);
        assert_eq!(symbols.len(), 2);
    }

    #[test]
    #[should_panic(expected = "already declared")]
    fn test_claim_twice() {
        let mut symbols = Symbols::default();
        symbols.claim("x", SymbolKind::Variable);
        symbols.claim("x", SymbolKind::Predicate);
    }
}

//! Equivalence ("smushing") bookkeeping
//!
//! A disjoint-set over terms keyed by canonical key. Every merged term points
//! straight at its set representative: when a representative is itself merged
//! away, all of its members are re-pointed at the new representative during the
//! union, so `find` resolves in a single hop from any lookup site.
//!
//! Merges are monotonic. There is no split or undo.

use crate::term::Term;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A set representative with its key precomputed
#[derive(Clone, Debug)]
pub struct Representative {
    pub term: Term,
    pub key: Arc<str>,
}

/// Redirection (member → representative) and alias (representative → members) tables
#[derive(Clone, Debug, Default)]
pub struct Equivalence {
    redirections: FxHashMap<Arc<str>, Representative>,
    aliases: FxHashMap<Arc<str>, Vec<Term>>,
}

impl Equivalence {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no merge has ever happened
    pub fn is_empty(&self) -> bool {
        self.redirections.is_empty()
    }

    /// Number of terms that have been merged into some representative
    pub fn merged_count(&self) -> usize {
        self.redirections.len()
    }

    /// Representative for the term with the given key, if it was merged away
    pub fn find_key(&self, key: &str) -> Option<&Representative> {
        let mut rep = self.redirections.get(key)?;
        // Unions keep members one hop away; the walk only guards the invariant.
        while let Some(next) = self.redirections.get(rep.key.as_ref()) {
            if next.key == rep.key {
                break;
            }
            rep = next;
        }
        Some(rep)
    }

    /// Representative of `term` (the term itself when never merged)
    pub fn find(&self, term: &Term) -> Term {
        if self.is_empty() {
            return term.clone();
        }
        match self.find_key(&term.canonical_key()) {
            Some(rep) => rep.term.clone(),
            None => term.clone(),
        }
    }

    /// Merge `big` into `small`
    ///
    /// Both must already be representatives. Everything aliased to `big`
    /// moves to `small`.
    pub fn union(&mut self, big: &Term, small: &Term) {
        let big_key: Arc<str> = Arc::from(big.canonical_key());
        let small = Representative {
            key: Arc::from(small.canonical_key()),
            term: small.clone(),
        };

        let moved = self.aliases.remove(big_key.as_ref()).unwrap_or_default();
        for member in &moved {
            self.redirections
                .insert(Arc::from(member.canonical_key()), small.clone());
        }
        self.redirections.insert(big_key, small.clone());

        let members = self.aliases.entry(small.key).or_default();
        members.push(big.clone());
        members.extend(moved);
    }

    /// Every term merged into the representative with the given key
    pub fn aliases(&self, representative_key: &str) -> &[Term] {
        self.aliases
            .get(representative_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

//! Per-step statement ordering
//!
//! Before each matching step the remaining statement patterns are prepared
//! against the current bindings: every pattern gets a candidate list from the
//! store and a count of positions still free. The pattern with the fewest
//! free positions, then the shortest candidate list, is matched next.

use crate::binding::Bindings;
use quadstore_core::{Position, Statement, Store};
use std::sync::Arc;

/// A statement pattern ready to be matched
#[derive(Debug)]
pub(crate) struct Prepared<'s> {
    /// Index into the owning pattern's statements
    pub index: usize,
    /// Positions still holding an unbound variable
    pub free: usize,
    pub candidates: &'s [Arc<Statement>],
}

const MATCHED: [Position; 3] = [Position::Subject, Position::Predicate, Position::Object];

/// Pick candidates for `pattern` under `bindings`
///
/// A position is free if it still contains an unbound variable after
/// substitution. Of the remaining positions the shortest index bucket wins,
/// earliest position on ties. A ground term nothing is indexed under yields an
/// empty bucket, so the pattern cannot match. With every position free the
/// whole store is scanned.
pub(crate) fn prepare<'s>(
    store: &'s Store,
    pattern: &Statement,
    index: usize,
    bindings: &Bindings,
) -> Prepared<'s> {
    let mut free = 0;
    let mut best: Option<&'s [Arc<Statement>]> = None;

    for position in MATCHED {
        let term = bindings.substitute(pattern.term(position));
        if term.contains_variable() {
            free += 1;
            continue;
        }
        let bucket = store.bucket(position, &term);
        if best.map_or(true, |b| bucket.len() < b.len()) {
            best = Some(bucket);
        }
    }

    Prepared {
        index,
        free,
        candidates: best.unwrap_or_else(|| store.statements()),
    }
}

/// Order prepared patterns: fewest free positions, then fewest candidates
///
/// The sort is stable, so equally good patterns keep their written order.
pub(crate) fn reorder(prepared: &mut [Prepared<'_>]) {
    prepared.sort_by_key(|p| (p.free, p.candidates.len()));
}

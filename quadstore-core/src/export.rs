//! Read-side helpers for serializers
//!
//! Serializers read statements through [`Store::statements_matching`] and need
//! to know which nodes can be written inline (a blank node referenced exactly
//! once) and which must be written as top-level subjects.

use crate::statement::Statement;
use crate::store::Store;
use crate::term::Term;
use rustc_hash::{FxHashMap, FxHashSet};
use std::io::{self, Write};
use std::sync::Arc;

/// Result of [`root_subjects`]
#[derive(Debug, Default)]
pub struct RootSubjects {
    /// Subjects that need an explicit identifier, in first-seen order
    pub roots: Vec<Term>,
    /// Every subject, in first-seen order
    pub subjects: Vec<Term>,
    /// Incoming reference count per blank node canonical key
    pub incoming: FxHashMap<String, usize>,
}

impl RootSubjects {
    /// Whether `term` can be nested inline under its single referrer
    pub fn is_inline(&self, term: &Term) -> bool {
        term.is_blank() && self.incoming.get(&term.canonical_key()) == Some(&1)
    }
}

/// Statements to export, optionally scoped to one context
pub fn statements_for_export(store: &Store, context: Option<&Term>) -> Vec<Arc<Statement>> {
    store.statements_matching(None, None, None, context, false)
}

/// Compute the root subjects of a set of statements
///
/// A subject is a root unless it is a blank node referenced exactly once.
/// References inside collections and nested formulas count.
pub fn root_subjects(statements: &[Arc<Statement>]) -> RootSubjects {
    let mut result = RootSubjects::default();
    let mut seen: FxHashSet<String> = FxHashSet::default();

    for st in statements {
        count_references(&st.object, &mut result.incoming);
        let key = st.subject.canonical_key();
        if seen.insert(key) {
            result.subjects.push(st.subject.clone());
        }
    }

    let roots = result
        .subjects
        .iter()
        .filter(|s| !result.is_inline(s))
        .cloned()
        .collect();
    result.roots = roots;
    result
}

fn count_references(term: &Term, incoming: &mut FxHashMap<String, usize>) {
    match term {
        Term::BlankNode(_) => *incoming.entry(term.canonical_key()).or_insert(0) += 1,
        Term::Collection(items) => {
            for item in items.iter() {
                count_references(item, incoming);
            }
        }
        Term::Formula(store) => {
            for st in store.statements() {
                count_references(&st.subject, incoming);
                count_references(&st.object, incoming);
            }
        }
        _ => {}
    }
}

/// Write statements one per line in canonical-key form
///
/// A diagnostic dump, not a conforming N-Quads serializer.
pub fn write_nquads<W: Write>(statements: &[Arc<Statement>], writer: &mut W) -> io::Result<()> {
    for st in statements {
        writeln!(writer, "{}", st)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex(name: &str) -> Term {
        Term::named(format!("http://example.org/{}", name))
    }

    #[test]
    fn test_single_reference_blank_is_inline() {
        let mut store = Store::new();
        let addr = store.bnode();
        store.add(ex("alice"), ex("address"), addr.clone(), ex("doc"));
        store.add(addr.clone(), ex("city"), "Paris", ex("doc"));

        let roots = root_subjects(store.statements());
        assert_eq!(roots.subjects.len(), 2);
        assert_eq!(roots.roots, vec![ex("alice")]);
        assert!(roots.is_inline(&addr));
    }

    #[test]
    fn test_shared_and_unreferenced_blanks_are_roots() {
        let mut store = Store::new();
        let shared = store.bnode();
        let orphan = store.bnode();
        store.add(ex("a"), ex("knows"), shared.clone(), ex("doc"));
        store.add(ex("b"), ex("knows"), shared.clone(), ex("doc"));
        store.add(shared.clone(), ex("name"), "S", ex("doc"));
        store.add(orphan.clone(), ex("name"), "O", ex("doc"));

        let roots = root_subjects(store.statements());
        assert!(roots.roots.contains(&shared));
        assert!(roots.roots.contains(&orphan));
        assert_eq!(roots.incoming.get(&shared.canonical_key()), Some(&2));
    }

    #[test]
    fn test_references_inside_collections_count() {
        let mut store = Store::new();
        let item = store.bnode();
        store.add(ex("list"), ex("items"), Term::collection([item.clone()]), ex("doc"));
        store.add(item.clone(), ex("name"), "first", ex("doc"));

        let roots = root_subjects(store.statements());
        assert!(roots.is_inline(&item));
    }

    #[test]
    fn test_export_scoped_to_context() {
        let mut store = Store::new();
        store.add(ex("a"), ex("p"), ex("b"), ex("doc1"));
        store.add(ex("a"), ex("p"), ex("c"), ex("doc2"));

        let scoped = statements_for_export(&store, Some(&ex("doc2")));
        assert_eq!(scoped.len(), 1);

        let mut out = Vec::new();
        write_nquads(&scoped, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<http://example.org/a> <http://example.org/p> <http://example.org/c> <http://example.org/doc2> .\n"
        );
    }
}

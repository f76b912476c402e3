//! Unification of statement patterns with stored statements

use crate::binding::Bindings;
use crate::pattern::GraphPattern;
use quadstore_core::{Statement, Store, Term};
use std::sync::Arc;

/// Unify one pattern term with a stored term, extending `bindings`
///
/// Unbound variables bind to the canonical representative of the stored
/// term. Everything else compares by canonical key, with collections that
/// still hold variables unified element by element.
fn unify_term(
    store: &Store,
    pattern: &Term,
    actual: &Term,
    bindings: &mut Bindings,
    newly_bound: &mut Vec<Arc<str>>,
) -> bool {
    match pattern {
        Term::Variable(name) => match bindings.get(name) {
            Some(bound) => store.canon_key(bound) == store.canon_key(actual),
            None => {
                bindings.insert_shared(name.clone(), store.canon(actual));
                newly_bound.push(name.clone());
                true
            }
        },
        Term::Collection(items) if pattern.contains_variable() => match actual {
            Term::Collection(actual_items) if actual_items.len() == items.len() => items
                .iter()
                .zip(actual_items.iter())
                .all(|(p, a)| unify_term(store, p, a, bindings, newly_bound)),
            _ => false,
        },
        _ => store.canon_key(pattern) == store.canon_key(actual),
    }
}

/// Unify a statement pattern with a candidate statement
///
/// Contexts are not compared. Each variable bound by this step is checked
/// against its constraint in `pattern`, if any. Returns the extended
/// bindings, or `None` when unification or a constraint fails.
pub(crate) fn unify_statement(
    store: &Store,
    pattern: &GraphPattern,
    statement: &Statement,
    candidate: &Statement,
    bindings: &Bindings,
) -> Option<Bindings> {
    let mut out = bindings.clone();
    let mut newly_bound = Vec::new();

    let unified = unify_term(store, &statement.subject, &candidate.subject, &mut out, &mut newly_bound)
        && unify_term(store, &statement.predicate, &candidate.predicate, &mut out, &mut newly_bound)
        && unify_term(store, &statement.object, &candidate.object, &mut out, &mut newly_bound);
    if !unified {
        return None;
    }

    for name in &newly_bound {
        if let (Some(constraint), Some(term)) = (pattern.constraint(name), out.get(name)) {
            if !constraint.test(term) {
                tracing::trace!(variable = %name, value = %term, "constraint rejected binding");
                return None;
            }
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::GreaterThan;
    use quadstore_vocab::{owl, xsd};

    fn ex(name: &str) -> Term {
        Term::named(format!("http://example.org/{}", name))
    }

    fn st(s: Term, p: Term, o: Term) -> Statement {
        Statement::new(s, p, o, ex("doc"))
    }

    #[test]
    fn test_binds_and_checks_repeated_variables() {
        let store = Store::new();
        let pattern = GraphPattern::new();
        let x = Term::variable("x");

        let self_ref = st(x.clone(), ex("knows"), x.clone());
        assert!(unify_statement(&store, &pattern, &self_ref, &st(ex("a"), ex("knows"), ex("a")), &Bindings::new()).is_some());
        assert!(unify_statement(&store, &pattern, &self_ref, &st(ex("a"), ex("knows"), ex("b")), &Bindings::new()).is_none());
    }

    #[test]
    fn test_binds_to_canonical_representative() {
        let mut store = Store::new();
        store.add(ex("b"), Term::named(owl::SAME_AS), ex("a"), ex("doc"));

        let out = unify_statement(
            &store,
            &GraphPattern::new(),
            &st(Term::variable("x"), ex("p"), ex("o")),
            &st(ex("b"), ex("p"), ex("o")),
            &Bindings::new(),
        )
        .unwrap();
        assert_eq!(out.get("x"), Some(&ex("a")));

        // a bound alias still unifies with the representative
        let bound = Bindings::new().with("x", ex("b"));
        assert!(unify_statement(
            &store,
            &GraphPattern::new(),
            &st(Term::variable("x"), ex("p"), ex("o")),
            &st(ex("a"), ex("p"), ex("o")),
            &bound,
        )
        .is_some());
    }

    #[test]
    fn test_collections_unify_elementwise() {
        let store = Store::new();
        let pattern = st(
            ex("l"),
            ex("items"),
            Term::collection([Term::literal("a"), Term::variable("second")]),
        );
        let good = st(ex("l"), ex("items"), Term::collection([Term::literal("a"), Term::literal("b")]));
        let short = st(ex("l"), ex("items"), Term::collection([Term::literal("a")]));

        let out = unify_statement(&store, &GraphPattern::new(), &pattern, &good, &Bindings::new()).unwrap();
        assert_eq!(out.get("second"), Some(&Term::literal("b")));
        assert!(unify_statement(&store, &GraphPattern::new(), &pattern, &short, &Bindings::new()).is_none());
    }

    #[test]
    fn test_constraint_only_on_new_bindings() {
        let store = Store::new();
        let pattern = GraphPattern::new()
            .with_constraint("v", GreaterThan(Term::typed_literal("20", xsd::INTEGER)));
        let statement = st(Term::variable("x"), ex("value"), Term::variable("v"));
        let low = st(ex("b"), ex("value"), Term::typed_literal("10", xsd::INTEGER));

        assert!(unify_statement(&store, &pattern, &statement, &low, &Bindings::new()).is_none());

        // already bound before this step: not re-checked
        let bound = Bindings::new().with("v", Term::typed_literal("10", xsd::INTEGER));
        assert!(unify_statement(&store, &pattern, &statement, &low, &bound).is_some());
    }
}

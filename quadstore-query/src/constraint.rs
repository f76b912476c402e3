//! Per-variable constraints
//!
//! A constraint is attached to a variable of a [`GraphPattern`](crate::GraphPattern)
//! and checked once, at the moment the variable is first bound. A binding that
//! fails its constraint prunes the whole branch.

use quadstore_core::Term;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

/// Predicate over a freshly bound term
pub trait Constraint: Send + Sync {
    fn test(&self, term: &Term) -> bool;
}

impl<F> Constraint for F
where
    F: Fn(&Term) -> bool + Send + Sync,
{
    fn test(&self, term: &Term) -> bool {
        self(term)
    }
}

/// Comparable text of a term: literal value, URI, blank label or key
fn lexical(term: &Term) -> String {
    match term {
        Term::Literal(lit) => lit.value().to_string(),
        Term::NamedNode(uri) => uri.to_string(),
        Term::BlankNode(id) => id.as_str().to_string(),
        _ => term.canonical_key(),
    }
}

fn numeric(term: &Term) -> Option<f64> {
    term.as_literal()?.value().trim().parse::<f64>().ok()
}

/// Order two terms by value
///
/// Numeric when both sides read as numbers, otherwise by lexical text.
/// `None` only for NaN comparisons.
pub fn compare_values(left: &Term, right: &Term) -> Option<Ordering> {
    match (numeric(left), numeric(right)) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => Some(lexical(left).cmp(&lexical(right))),
    }
}

/// Passes terms strictly greater than the bound
#[derive(Debug, Clone)]
pub struct GreaterThan(pub Term);

impl Constraint for GreaterThan {
    fn test(&self, term: &Term) -> bool {
        compare_values(term, &self.0) == Some(Ordering::Greater)
    }
}

/// Passes terms strictly less than the bound
#[derive(Debug, Clone)]
pub struct LessThan(pub Term);

impl Constraint for LessThan {
    fn test(&self, term: &Term) -> bool {
        compare_values(term, &self.0) == Some(Ordering::Less)
    }
}

/// Passes exactly the given term
#[derive(Debug, Clone)]
pub struct Equals(pub Term);

impl Constraint for Equals {
    fn test(&self, term: &Term) -> bool {
        term.same_term(&self.0)
    }
}

/// Passes literals whose value matches a regular expression
#[derive(Clone)]
pub struct Matches(pub Regex);

impl Matches {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Matches)
    }
}

impl fmt::Debug for Matches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Matches").field(&self.0.as_str()).finish()
    }
}

impl Constraint for Matches {
    fn test(&self, term: &Term) -> bool {
        term.as_literal()
            .is_some_and(|lit| self.0.is_match(lit.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadstore_vocab::xsd;

    #[test]
    fn test_numeric_comparison() {
        let twenty = Term::typed_literal("20", xsd::INTEGER);
        assert!(GreaterThan(twenty.clone()).test(&Term::typed_literal("30", xsd::INTEGER)));
        assert!(!GreaterThan(twenty.clone()).test(&Term::typed_literal("10", xsd::INTEGER)));
        assert!(!GreaterThan(twenty.clone()).test(&twenty));
        // 9 < 20 numerically, though "9" > "20" as text
        assert!(LessThan(twenty).test(&Term::literal("9")));
    }

    #[test]
    fn test_lexical_fallback() {
        let bound = Term::literal("m");
        assert!(GreaterThan(bound.clone()).test(&Term::literal("z")));
        assert!(LessThan(bound).test(&Term::named("http://a")));
    }

    #[test]
    fn test_equals_is_exact() {
        let c = Equals(Term::literal("1"));
        assert!(c.test(&Term::literal("1")));
        assert!(!c.test(&Term::typed_literal("1", xsd::INTEGER)));
    }

    #[test]
    fn test_matches_literals_only() {
        let c = Matches::new("^Al").unwrap();
        assert!(c.test(&Term::literal("Alice")));
        assert!(!c.test(&Term::literal("Bob")));
        assert!(!c.test(&Term::named("Alice")));
    }

    #[test]
    fn test_closure_constraint() {
        let c = |t: &Term| t.is_named();
        assert!(Constraint::test(&c, &Term::named("http://example.org/a")));
        assert!(!Constraint::test(&c, &Term::literal("a")));
    }
}

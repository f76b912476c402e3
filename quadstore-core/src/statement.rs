//! Statement: an immutable (subject, predicate, object, context) quad

use crate::term::Term;
use std::fmt;

/// Position of a term within a statement
///
/// Also names the store's four indexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    Subject,
    Predicate,
    Object,
    Context,
}

impl Position {
    /// All positions, in index order
    pub const ALL: [Position; 4] = [
        Position::Subject,
        Position::Predicate,
        Position::Object,
        Position::Context,
    ];

    /// Index slot for this position
    pub fn index(self) -> usize {
        match self {
            Position::Subject => 0,
            Position::Predicate => 1,
            Position::Object => 2,
            Position::Context => 3,
        }
    }
}

/// An immutable quad
///
/// Equality is structural on the four stored (pre-merge) components.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Statement {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    /// Provenance / named graph
    pub context: Term,
}

/// Alias used where the statement is handed to on-add actions
pub type Quad = Statement;

impl Statement {
    pub fn new(subject: Term, predicate: Term, object: Term, context: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
            context,
        }
    }

    /// Term at the given position
    pub fn term(&self, position: Position) -> &Term {
        match position {
            Position::Subject => &self.subject,
            Position::Predicate => &self.predicate,
            Position::Object => &self.object,
            Position::Context => &self.context,
        }
    }

    /// Structural equality of all four components
    pub fn same_statement(&self, other: &Statement) -> bool {
        Position::ALL
            .iter()
            .all(|&pos| self.term(pos).same_term(other.term(pos)))
    }

    /// Key of the whole quad (canonical keys joined N-Quads style)
    pub fn canonical_key(&self) -> String {
        format!(
            "{} {} {} {} .",
            self.subject.canonical_key(),
            self.predicate.canonical_key(),
            self.object.canonical_key(),
            self.context.canonical_key()
        )
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} .",
            self.subject, self.predicate, self.object, self.context
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Statement {
        Statement::new(
            Term::named("http://example.org/alice"),
            Term::named("http://xmlns.com/foaf/0.1/name"),
            Term::literal("Alice"),
            Term::named("http://example.org/doc"),
        )
    }

    #[test]
    fn test_term_by_position() {
        let st = quad();
        assert_eq!(st.term(Position::Object), &Term::literal("Alice"));
        assert_eq!(Position::Context.index(), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            quad().to_string(),
            "<http://example.org/alice> <http://xmlns.com/foaf/0.1/name> \"Alice\" <http://example.org/doc> ."
        );
    }

    #[test]
    fn test_same_statement() {
        let mut other = quad();
        assert!(quad().same_statement(&other));
        other.context = Term::named("http://example.org/other");
        assert!(!quad().same_statement(&other));
    }
}

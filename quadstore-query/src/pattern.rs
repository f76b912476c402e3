//! Graph patterns and queries
//!
//! A [`GraphPattern`] is a small formula of statements, some of whose terms
//! are variables, plus a list of optional sub-patterns and per-variable
//! constraints. A [`Query`] wraps the top-level pattern with initial bindings
//! and execution options.

use crate::binding::Bindings;
use crate::constraint::Constraint;
use crate::options::QueryOptions;
use quadstore_core::{Statement, Store, Term, Value};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Statements to match, optional sub-patterns and constraints
#[derive(Clone)]
pub struct GraphPattern {
    statements: Store,
    optional: Vec<GraphPattern>,
    constraints: FxHashMap<Arc<str>, Arc<dyn Constraint>>,
}

impl Default for GraphPattern {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphPattern {
    /// Create an empty pattern
    ///
    /// Pattern statements live in a bare store: no smushing actions run on
    /// them, so an `owl:sameAs` pattern is matched like any other.
    pub fn new() -> Self {
        Self {
            statements: Store::bare(),
            optional: Vec::new(),
            constraints: FxHashMap::default(),
        }
    }

    /// Add a statement pattern
    ///
    /// Plain strings become literals. Use [`Term::variable`] for variables.
    pub fn add(
        &mut self,
        subject: impl Into<Value>,
        predicate: impl Into<Value>,
        object: impl Into<Value>,
    ) -> &mut Self {
        let context = self.statements.default_graph();
        self.statements.add(subject, predicate, object, context);
        self
    }

    /// Builder form of [`GraphPattern::add`]
    pub fn with(
        mut self,
        subject: impl Into<Value>,
        predicate: impl Into<Value>,
        object: impl Into<Value>,
    ) -> Self {
        self.add(subject, predicate, object);
        self
    }

    /// Attach an OPTIONAL sub-pattern
    pub fn add_optional(&mut self, pattern: GraphPattern) -> &mut Self {
        self.optional.push(pattern);
        self
    }

    pub fn with_optional(mut self, pattern: GraphPattern) -> Self {
        self.optional.push(pattern);
        self
    }

    /// Constrain the value `variable` may be bound to; a leading `?` is ignored
    ///
    /// A second constraint on the same variable replaces the first.
    pub fn constrain(&mut self, variable: &str, constraint: impl Constraint + 'static) -> &mut Self {
        let name = variable.strip_prefix('?').unwrap_or(variable);
        self.constraints.insert(Arc::from(name), Arc::new(constraint));
        self
    }

    pub fn with_constraint(mut self, variable: &str, constraint: impl Constraint + 'static) -> Self {
        self.constrain(variable, constraint);
        self
    }

    pub fn statements(&self) -> &[Arc<Statement>] {
        self.statements.statements()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn optional(&self) -> &[GraphPattern] {
        &self.optional
    }

    pub fn constraint(&self, variable: &str) -> Option<&Arc<dyn Constraint>> {
        self.constraints.get(variable)
    }

    /// Every variable named in this pattern or its optional sub-patterns
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        for st in self.statements() {
            for term in [&st.subject, &st.predicate, &st.object] {
                collect_term_variables(term, out);
            }
        }
        for opt in &self.optional {
            opt.collect_variables(out);
        }
    }
}

fn collect_term_variables(term: &Term, out: &mut BTreeSet<String>) {
    match term {
        Term::Variable(name) => {
            out.insert(name.to_string());
        }
        Term::Collection(items) => {
            for item in items.iter() {
                collect_term_variables(item, out);
            }
        }
        _ => {}
    }
}

impl fmt::Debug for GraphPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut constrained: Vec<&str> = self.constraints.keys().map(|k| k.as_ref()).collect();
        constrained.sort_unstable();
        f.debug_struct("GraphPattern")
            .field("statements", &self.statements())
            .field("optional", &self.optional)
            .field("constrained", &constrained)
            .finish()
    }
}

/// A named pattern with its starting bindings
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub name: Option<String>,
    pub pattern: GraphPattern,
    pub initial_bindings: Bindings,
    pub options: QueryOptions,
}

impl Query {
    pub fn new(pattern: GraphPattern) -> Self {
        Self {
            name: None,
            pattern,
            initial_bindings: Bindings::new(),
            options: QueryOptions::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Pre-bind a variable before matching starts
    pub fn with_binding(mut self, variable: &str, term: Term) -> Self {
        self.initial_bindings.insert(variable, term);
        self
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadstore_vocab::owl;

    fn ex(name: &str) -> Term {
        Term::named(format!("http://example.org/{}", name))
    }

    #[test]
    fn test_pattern_keeps_same_as() {
        let pattern = GraphPattern::new().with(Term::variable("x"), Term::named(owl::SAME_AS), ex("a"));
        assert_eq!(pattern.len(), 1);
    }

    #[test]
    fn test_variables_include_optionals_and_collections() {
        let pattern = GraphPattern::new()
            .with(Term::variable("x"), ex("p"), Term::collection([Term::variable("y")]))
            .with_optional(GraphPattern::new().with(Term::variable("x"), ex("q"), Term::variable("z")));

        let vars: Vec<_> = pattern.variables().into_iter().collect();
        assert_eq!(vars, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_constrain_strips_question_mark() {
        let pattern = GraphPattern::new().with_constraint("?v", |t: &Term| t.is_literal());
        assert!(pattern.constraint("v").is_some());
        assert!(pattern.constraint("?v").is_none());
    }

    #[test]
    fn test_query_builder() {
        let query = Query::new(GraphPattern::new())
            .with_name("people")
            .with_binding("?who", ex("alice"));
        assert_eq!(query.name.as_deref(), Some("people"));
        assert_eq!(query.initial_bindings.get("who"), Some(&ex("alice")));
    }
}

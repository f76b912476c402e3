//! Variable bindings produced by the matcher
//!
//! A [`Bindings`] maps variable names (without the leading `?`) to the terms
//! they were unified with. Names are kept sorted so that printing and
//! serializing a solution is deterministic.

use quadstore_core::Term;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

fn bare_name(name: &str) -> &str {
    name.strip_prefix('?').unwrap_or(name)
}

/// One solution: variable name to bound term
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<Arc<str>, Term>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Term bound to `name`; a leading `?` is ignored
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.values.get(bare_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(bare_name(name))
    }

    /// Bind `name`, replacing any previous value
    pub fn insert(&mut self, name: &str, term: Term) {
        self.values.insert(Arc::from(bare_name(name)), term);
    }

    pub(crate) fn insert_shared(&mut self, name: Arc<str>, term: Term) {
        self.values.insert(name, term);
    }

    /// Builder form of [`Bindings::insert`]
    pub fn with(mut self, name: &str, term: Term) -> Self {
        self.insert(name, term);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Variable names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.values.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Copy every binding of `other` into `self`; `other` wins on conflict
    pub fn merge(&mut self, other: &Bindings) {
        for (name, term) in &other.values {
            self.values.insert(name.clone(), term.clone());
        }
    }

    /// Apply the bindings to `term`
    ///
    /// Bound variables are replaced, also inside collections. Unbound
    /// variables are left as they are.
    pub fn substitute(&self, term: &Term) -> Term {
        match term {
            Term::Variable(name) => self
                .values
                .get(name.as_ref())
                .cloned()
                .unwrap_or_else(|| term.clone()),
            Term::Collection(items) if term.contains_variable() => {
                Term::collection(items.iter().map(|item| self.substitute(item)))
            }
            _ => term.clone(),
        }
    }
}

impl<'a> FromIterator<(&'a str, Term)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (&'a str, Term)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        for (name, term) in iter {
            bindings.insert(name, term);
        }
        bindings
    }
}

/// Serializes as a SPARQL JSON results row: `{"name": {"type": ..., "value": ...}}`
impl Serialize for Bindings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, term) in &self.values {
            map.serialize_entry(name.as_ref(), term)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_mark_is_optional() {
        let mut b = Bindings::new();
        b.insert("?x", Term::named("http://example.org/a"));
        assert!(b.contains("x"));
        assert_eq!(b.get("?x"), b.get("x"));
        assert_eq!(b.names().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut left = Bindings::new()
            .with("a", Term::literal("1"))
            .with("b", Term::literal("2"));
        let right = Bindings::new()
            .with("b", Term::literal("3"))
            .with("c", Term::literal("4"));
        left.merge(&right);

        assert_eq!(left.len(), 3);
        assert_eq!(left.get("b"), Some(&Term::literal("3")));
    }

    #[test]
    fn test_substitute_in_collections() {
        let b = Bindings::new().with("x", Term::literal("1"));
        let list = Term::collection([Term::variable("x"), Term::variable("y")]);

        let out = b.substitute(&list);
        let items = out.as_collection().unwrap();
        assert_eq!(items[0], Term::literal("1"));
        assert!(items[1].is_variable());
    }

    #[test]
    fn test_serialize_sorted_row() {
        let b: Bindings = [
            ("z", Term::literal("last")),
            ("a", Term::named("http://example.org/first")),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_value(&b).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "z"]);
        assert_eq!(json["a"]["type"], "uri");
        assert_eq!(json["z"]["value"], "last");
    }
}

//! GraphSink trait for event-driven ingestion
//!
//! Parsers and importers drive a sink with term and statement events without
//! knowing the concrete destination.
//!
//! # Design
//!
//! Parsers call methods like `term_iri()` and `emit_triple()` on a sink.
//! [`StoreSink`] writes the events straight into a [`Store`], tagging every
//! statement with the document context the sink was opened for.

use crate::error::{Result, StoreError};
use crate::store::Store;
use crate::term::Term;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Opaque term identifier for efficient statement emission
///
/// `TermId` is only valid within a single sink session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TermId(pub(crate) u32);

impl TermId {
    /// Create a new TermId from a raw index.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index value.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Event-driven interface for graph construction
///
/// # Example
///
/// ```
/// use quadstore_core::{GraphSink, Store, StoreSink, Term};
///
/// let mut store = Store::new();
/// let doc = Term::named("http://example.org/doc");
/// let mut sink = StoreSink::new(&mut store, doc);
///
/// let alice = sink.term_iri("http://example.org/alice");
/// let name = sink.term_iri("http://xmlns.com/foaf/0.1/name");
/// let alice_name = sink.term_literal("Alice", None, None);
/// sink.emit_triple(alice, name, alice_name).unwrap();
///
/// assert_eq!(store.len(), 1);
/// ```
pub trait GraphSink {
    /// Called when a base IRI is declared
    fn on_base(&mut self, base_iri: &str);

    /// Called when a prefix is declared
    fn on_prefix(&mut self, prefix: &str, namespace_iri: &str);

    /// Create a named node and return its ID
    ///
    /// The IRI should be fully expanded (not prefixed).
    fn term_iri(&mut self, iri: &str) -> TermId;

    /// Create a blank node term and return its ID
    ///
    /// If `label` is Some, the same label yields the same node for the rest of
    /// the session. If None, a fresh blank node is generated.
    fn term_blank(&mut self, label: Option<&str>) -> TermId;

    /// Create a literal from its lexical form
    fn term_literal(&mut self, value: &str, datatype: Option<&str>, language: Option<&str>) -> TermId;

    /// Create a collection from previously created terms
    fn term_collection(&mut self, items: &[TermId]) -> Result<TermId>;

    /// Emit a statement into the sink's default context
    fn emit_triple(&mut self, subject: TermId, predicate: TermId, object: TermId) -> Result<()>;

    /// Emit a statement with an explicit context
    fn emit_quad(
        &mut self,
        subject: TermId,
        predicate: TermId,
        object: TermId,
        context: TermId,
    ) -> Result<()>;
}

/// A sink that adds statements to a [`Store`]
///
/// Labelled blank nodes are mapped to fresh store blank nodes, one per label
/// per session, so two documents using `_:b0` never collide.
#[derive(Debug)]
pub struct StoreSink<'a> {
    store: &'a mut Store,
    context: Term,
    terms: Vec<Term>,
    blank_labels: FxHashMap<String, TermId>,
    base: Option<String>,
    prefixes: BTreeMap<String, String>,
    emitted: usize,
}

impl<'a> StoreSink<'a> {
    /// Open a sink writing into `store` under the document `context`
    pub fn new(store: &'a mut Store, context: Term) -> Self {
        Self {
            store,
            context,
            terms: Vec::new(),
            blank_labels: FxHashMap::default(),
            base: None,
            prefixes: BTreeMap::new(),
            emitted: 0,
        }
    }

    /// Base IRI declared by the source, if any
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Prefix declarations seen so far (for later export)
    pub fn prefixes(&self) -> &BTreeMap<String, String> {
        &self.prefixes
    }

    /// Number of statements handed to the store (including suppressed ones)
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Get a term by its ID
    pub fn term(&self, id: TermId) -> Result<&Term> {
        self.terms
            .get(id.0 as usize)
            .ok_or(StoreError::UnknownTermId(id.0))
    }

    fn add_term(&mut self, term: Term) -> TermId {
        let id = TermId(self.terms.len() as u32);
        self.terms.push(term);
        id
    }
}

impl GraphSink for StoreSink<'_> {
    fn on_base(&mut self, base_iri: &str) {
        self.base = Some(base_iri.to_string());
    }

    fn on_prefix(&mut self, prefix: &str, namespace_iri: &str) {
        self.prefixes
            .insert(prefix.to_string(), namespace_iri.to_string());
    }

    fn term_iri(&mut self, iri: &str) -> TermId {
        self.add_term(Term::named(iri))
    }

    fn term_blank(&mut self, label: Option<&str>) -> TermId {
        if let Some(l) = label {
            if let Some(&id) = self.blank_labels.get(l) {
                return id;
            }
            let node = self.store.bnode();
            let id = self.add_term(node);
            self.blank_labels.insert(l.to_string(), id);
            return id;
        }
        let node = self.store.bnode();
        self.add_term(node)
    }

    fn term_literal(&mut self, value: &str, datatype: Option<&str>, language: Option<&str>) -> TermId {
        self.add_term(Term::literal_with(value, language, datatype))
    }

    fn term_collection(&mut self, items: &[TermId]) -> Result<TermId> {
        let items = items
            .iter()
            .map(|&id| self.term(id).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(self.add_term(Term::collection(items)))
    }

    fn emit_triple(&mut self, subject: TermId, predicate: TermId, object: TermId) -> Result<()> {
        let context = self.context.clone();
        let s = self.term(subject)?.clone();
        let p = self.term(predicate)?.clone();
        let o = self.term(object)?.clone();
        self.store.add(s, p, o, context);
        self.emitted += 1;
        Ok(())
    }

    fn emit_quad(
        &mut self,
        subject: TermId,
        predicate: TermId,
        object: TermId,
        context: TermId,
    ) -> Result<()> {
        let s = self.term(subject)?.clone();
        let p = self.term(predicate)?.clone();
        let o = self.term(object)?.clone();
        let c = self.term(context)?.clone();
        self.store.add(s, p, o, c);
        self.emitted += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadstore_vocab::{owl, xsd};

    fn doc() -> Term {
        Term::named("http://example.org/doc")
    }

    #[test]
    fn test_store_sink_basic() {
        let mut store = Store::new();
        {
            let mut sink = StoreSink::new(&mut store, doc());
            let s = sink.term_iri("http://example.org/alice");
            let p = sink.term_iri("http://xmlns.com/foaf/0.1/name");
            let o = sink.term_literal("Alice", None, None);
            sink.emit_triple(s, p, o).unwrap();
            assert_eq!(sink.emitted(), 1);
        }

        let st = &store.statements()[0];
        assert_eq!(st.subject.as_uri(), Some("http://example.org/alice"));
        assert_eq!(st.context, doc());
    }

    #[test]
    fn test_blank_labels_are_session_scoped() {
        let mut store = Store::new();
        let mut sink = StoreSink::new(&mut store, doc());

        let b1 = sink.term_blank(Some("b0"));
        let b2 = sink.term_blank(Some("b0"));
        assert_eq!(b1, b2);

        let b3 = sink.term_blank(Some("b1"));
        assert_ne!(b1, b3);

        let anon1 = sink.term_blank(None);
        let anon2 = sink.term_blank(None);
        assert_ne!(sink.term(anon1).unwrap(), sink.term(anon2).unwrap());
    }

    #[test]
    fn test_prefixes_and_base() {
        let mut store = Store::new();
        let mut sink = StoreSink::new(&mut store, doc());

        sink.on_base("http://example.org/");
        sink.on_prefix("foaf", "http://xmlns.com/foaf/0.1/");

        assert_eq!(sink.base(), Some("http://example.org/"));
        assert_eq!(
            sink.prefixes().get("foaf"),
            Some(&"http://xmlns.com/foaf/0.1/".to_string())
        );
    }

    #[test]
    fn test_typed_and_language_literals() {
        let mut store = Store::new();
        let mut sink = StoreSink::new(&mut store, doc());

        let age = sink.term_literal("42", Some(xsd::INTEGER), None);
        let name = sink.term_literal("Alicia", None, Some("es"));

        assert_eq!(sink.term(age).unwrap(), &Term::typed_literal("42", xsd::INTEGER));
        assert_eq!(sink.term(name).unwrap().as_literal().unwrap().language(), Some("es"));
    }

    #[test]
    fn test_collections_and_unknown_ids() {
        let mut store = Store::new();
        let mut sink = StoreSink::new(&mut store, doc());

        let a = sink.term_literal("a", None, None);
        let b = sink.term_literal("b", None, None);
        let list = sink.term_collection(&[a, b]).unwrap();
        assert_eq!(sink.term(list).unwrap().as_collection().unwrap().len(), 2);

        let bogus = TermId::new(99);
        assert_eq!(sink.term_collection(&[bogus]), Err(StoreError::UnknownTermId(99)));
        assert!(sink.emit_triple(a, bogus, b).is_err());
    }

    #[test]
    fn test_sink_goes_through_store_actions() {
        let mut store = Store::new();
        {
            let mut sink = StoreSink::new(&mut store, doc());
            let a = sink.term_iri("http://example.org/a");
            let same = sink.term_iri(owl::SAME_AS);
            let b = sink.term_iri("http://example.org/b");
            sink.emit_triple(b, same, a).unwrap();
        }
        assert!(store.is_empty());
        assert_eq!(
            store.canon(&Term::named("http://example.org/b")),
            Term::named("http://example.org/a")
        );
    }
}

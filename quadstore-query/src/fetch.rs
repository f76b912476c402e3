//! Document fetching seam
//!
//! While matching, the engine looks at each bound subject and object of the
//! remaining statement patterns. If the document holding that term has never
//! been requested, it asks the [`Fetcher`] to load it and suspends the branch
//! until the document settles. Branches that do not touch the document keep
//! running.
//!
//! A fetcher that loads synchronously returns [`DocumentState::Fetched`] (or
//! `Failed`) straight from [`Fetcher::fetch`] and the branch resumes at once.
//! An asynchronous fetcher returns `Requested` and later reports completion
//! through [`QueryExecution::document_ready`](crate::QueryExecution::document_ready).

use quadstore_core::{Store, Term};
use rustc_hash::FxHashMap;

/// Load state of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentState {
    Unrequested,
    Requested,
    Fetched,
    Failed,
}

impl DocumentState {
    /// Fetched or failed: matching can go ahead either way
    pub fn is_settled(self) -> bool {
        matches!(self, DocumentState::Fetched | DocumentState::Failed)
    }
}

/// Loads documents into the store on demand
pub trait Fetcher {
    /// The document `term` belongs to, if it can be fetched at all
    fn document_of(&self, term: &Term) -> Option<Term> {
        term.document()
    }

    fn state(&self, document: &Term) -> DocumentState;

    /// Start loading `document`, which was reached through `requested_by`
    ///
    /// Returns the state after the call.
    fn fetch(&mut self, store: &mut Store, document: &Term, requested_by: &Term) -> DocumentState;
}

/// Fetcher serving documents from memory
///
/// Each document is a list of triples, added to the store with the document
/// as context. Unknown documents fail. In deferred mode `fetch` only records
/// the request and [`MemoryFetcher::complete`] does the loading.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    documents: FxHashMap<String, Vec<(Term, Term, Term)>>,
    states: FxHashMap<String, DocumentState>,
    requests: Vec<Term>,
    deferred: bool,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `fetch` with `Requested` and wait for [`MemoryFetcher::complete`]
    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    pub fn with_document(mut self, document: Term, triples: Vec<(Term, Term, Term)>) -> Self {
        self.documents.insert(document.canonical_key(), triples);
        self
    }

    /// Documents requested so far, in request order
    pub fn requests(&self) -> &[Term] {
        &self.requests
    }

    /// Load a requested document and mark it settled
    ///
    /// Returns the resulting state.
    pub fn complete(&mut self, store: &mut Store, document: &Term) -> DocumentState {
        let key = document.canonical_key();
        let state = match self.documents.get(&key) {
            Some(triples) => {
                for (s, p, o) in triples {
                    store.add(s.clone(), p.clone(), o.clone(), document.clone());
                }
                DocumentState::Fetched
            }
            None => DocumentState::Failed,
        };
        tracing::debug!(document = %document, ?state, "document settled");
        self.states.insert(key, state);
        state
    }
}

impl Fetcher for MemoryFetcher {
    fn state(&self, document: &Term) -> DocumentState {
        self.states
            .get(&document.canonical_key())
            .copied()
            .unwrap_or(DocumentState::Unrequested)
    }

    fn fetch(&mut self, store: &mut Store, document: &Term, requested_by: &Term) -> DocumentState {
        tracing::debug!(document = %document, requested_by = %requested_by, "fetching document");
        self.requests.push(document.clone());
        if self.deferred {
            self.states
                .insert(document.canonical_key(), DocumentState::Requested);
            return DocumentState::Requested;
        }
        self.complete(store, document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex(path: &str) -> Term {
        Term::named(format!("http://example.org/{}", path))
    }

    #[test]
    fn test_document_of_strips_fragment() {
        let fetcher = MemoryFetcher::new();
        assert_eq!(fetcher.document_of(&ex("people#alice")), Some(ex("people")));
        assert_eq!(fetcher.document_of(&Term::literal("x")), None);
    }

    #[test]
    fn test_immediate_fetch_loads_document() {
        let mut store = Store::new();
        let mut fetcher = MemoryFetcher::new()
            .with_document(ex("people"), vec![(ex("people#alice"), ex("name"), Term::literal("Alice"))]);

        assert_eq!(fetcher.state(&ex("people")), DocumentState::Unrequested);
        let state = fetcher.fetch(&mut store, &ex("people"), &ex("people#alice"));
        assert_eq!(state, DocumentState::Fetched);
        assert_eq!(store.len(), 1);
        assert_eq!(store.statements()[0].context, ex("people"));
    }

    #[test]
    fn test_deferred_and_unknown_documents() {
        let mut store = Store::new();
        let mut fetcher = MemoryFetcher::new().deferred();

        let state = fetcher.fetch(&mut store, &ex("missing"), &ex("missing#x"));
        assert_eq!(state, DocumentState::Requested);
        assert!(!state.is_settled());
        assert_eq!(fetcher.requests(), &[ex("missing")]);

        assert_eq!(fetcher.complete(&mut store, &ex("missing")), DocumentState::Failed);
        assert!(fetcher.state(&ex("missing")).is_settled());
        assert!(store.is_empty());
    }
}

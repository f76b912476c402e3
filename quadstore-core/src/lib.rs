//! Embedded in-memory quad store
//!
//! This crate owns the data model and the storage side of the graph database:
//! terms, statements, the four-way indexed store, equivalence merging
//! ("smushing") and the on-add action registry.
//!
//! # Key Design Principles
//!
//! 1. **Canonical keys only** - Every map is keyed by a term's canonical key,
//!    never by identity. See [`Term::canonical_key`].
//!
//! 2. **Merges move buckets, not statements** - `equate` re-homes index buckets
//!    under the surviving representative; stored statements keep the terms they
//!    were added with.
//!
//! 3. **Deterministic smushing** - [`Term::compare_term`] decides which term
//!    survives a merge, independent of argument order.
//!
//! 4. **Empty, not errors** - Lookups against absent buckets return empty
//!    results. Only caller contract violations produce a [`StoreError`].
//!
//! # Example
//!
//! ```
//! use quadstore_core::{Store, Term};
//! use quadstore_vocab::owl;
//!
//! let mut store = Store::new();
//! let doc = Term::named("http://example.org/doc");
//! let alice = Term::named("http://example.org/alice");
//! let me = Term::named("http://example.org/me");
//! let name = Term::named("http://xmlns.com/foaf/0.1/name");
//!
//! store.add(alice.clone(), name.clone(), "Alice", doc.clone());
//! store.add(me.clone(), Term::named(owl::SAME_AS), alice.clone(), doc);
//!
//! let hits = store.statements_matching(Some(&me), Some(&name), None, None, false);
//! assert_eq!(hits.len(), 1);
//! assert_eq!(store.canon(&me), alice);
//! ```

pub mod action;
pub mod coerce;
pub mod equivalence;
pub mod error;
pub mod export;
mod sink;
mod statement;
pub mod store;
mod term;

pub use action::{ActionRef, PropertyAction};
pub use coerce::Value;
pub use error::{Result, StoreError};
pub use sink::{GraphSink, StoreSink, TermId};
pub use statement::{Position, Quad, Statement};
pub use store::{Store, StoreOptions};
pub use term::{BlankId, Literal, Term, TermKind};

//! Graph pattern matching for quadstore-core
//!
//! Queries are graph patterns: statements whose terms may be variables,
//! OPTIONAL sub-patterns, and per-variable constraints. Execution unifies the
//! pattern against a [`Store`](quadstore_core::Store), ordering statements
//! greedily by how constrained they are, and streams solutions to a
//! [`MatchSink`].
//!
//! # Example
//!
//! ```
//! use quadstore_core::{Store, Term};
//! use quadstore_query::{query, GraphPattern, Query};
//!
//! let mut store = Store::new();
//! let doc = Term::named("http://example.org/doc");
//! let name = Term::named("http://xmlns.com/foaf/0.1/name");
//! store.add(Term::named("http://example.org/alice"), name.clone(), "Alice", doc);
//!
//! let pattern = GraphPattern::new().with(Term::variable("who"), name, Term::variable("n"));
//! let rows = query(&mut store, &Query::new(pattern)).unwrap();
//!
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].get("n"), Some(&Term::literal("Alice")));
//! ```
//!
//! Executions are resumable. With a [`Fetcher`] attached, work that needs an
//! unloaded document is parked and [`QueryExecution::run`] returns
//! [`ExecutionStatus::Waiting`]; after the document arrives, call
//! [`QueryExecution::document_ready`] and run again.

pub mod binding;
pub mod constraint;
pub mod error;
pub mod execute;
pub mod fetch;
pub mod options;
pub mod pattern;
mod plan;
mod unify;

pub use binding::Bindings;
pub use constraint::{Constraint, Equals, GreaterThan, LessThan, Matches};
pub use error::{QueryError, Result};
pub use execute::{query, CollectSink, ExecutionStatus, MatchSink, QueryExecution};
pub use fetch::{DocumentState, Fetcher, MemoryFetcher};
pub use options::QueryOptions;
pub use pattern::{GraphPattern, Query};

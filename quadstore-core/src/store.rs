//! Indexed quad store
//!
//! The store keeps a flat list of statements plus four hash indexes, one per
//! statement position, keyed by the canonical key of the component's current
//! equivalence representative. Merging two terms (`equate`) moves index buckets
//! rather than rewriting statements, so stored statements always keep the terms
//! they were added with.
//!
//! # Invariants
//!
//! - Every statement in the flat list is reachable from all four indexes under
//!   `canon` of the corresponding component.
//! - `canon` resolves in one hop (see [`Equivalence`]).
//! - Action registries only grow; merges migrate entries to the survivor.

use crate::action::{
    ActionRef, ActionRegistry, FunctionalPropertyClassAction, InverseFunctionalPropertyClassAction,
    SameAsAction,
};
use crate::coerce::Value;
use crate::equivalence::Equivalence;
use crate::error::{Result, StoreError};
use crate::statement::{Position, Quad, Statement};
use crate::term::Term;
use quadstore_vocab::{owl, rdf, store as reserved};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

type Bucket = Vec<Arc<Statement>>;
type Index = FxHashMap<Arc<str>, Bucket>;

/// Store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Wire the `owl:sameAs`, `owl:FunctionalProperty` and
    /// `owl:InverseFunctionalProperty` actions at construction
    pub builtin_actions: bool,
    /// Prefix for generated blank node ids
    pub blank_prefix: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            builtin_actions: true,
            blank_prefix: "n".to_string(),
        }
    }
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_actions(mut self, enabled: bool) -> Self {
        self.builtin_actions = enabled;
        self
    }

    pub fn with_blank_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.blank_prefix = prefix.into();
        self
    }
}

/// In-memory quad store with equivalence merging and on-add actions
#[derive(Clone)]
pub struct Store {
    statements: Vec<Arc<Statement>>,
    indexes: [Index; 4],
    equivalence: Equivalence,
    property_actions: ActionRegistry,
    class_actions: ActionRegistry,
    options: StoreOptions,
    next_blank: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Store with the built-in OWL actions wired
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Store without any actions (used for pattern graphs)
    pub fn bare() -> Self {
        Self::with_options(StoreOptions::default().with_builtin_actions(false))
    }

    pub fn with_options(options: StoreOptions) -> Self {
        let mut store = Self {
            statements: Vec::new(),
            indexes: Default::default(),
            equivalence: Equivalence::new(),
            property_actions: ActionRegistry::new(),
            class_actions: ActionRegistry::new(),
            options,
            next_blank: 0,
        };
        if store.options.builtin_actions {
            store
                .property_actions
                .register(&Term::named(owl::SAME_AS).canonical_key(), Arc::new(SameAsAction));
            store.class_actions.register(
                &Term::named(owl::FUNCTIONAL_PROPERTY).canonical_key(),
                Arc::new(FunctionalPropertyClassAction),
            );
            store.class_actions.register(
                &Term::named(owl::INVERSE_FUNCTIONAL_PROPERTY).canonical_key(),
                Arc::new(InverseFunctionalPropertyClassAction),
            );
        }
        store
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    // ---------------------------------------------------------------------
    // Factories
    // ---------------------------------------------------------------------

    /// Named node
    pub fn sym(&self, uri: impl AsRef<str>) -> Term {
        Term::named(uri)
    }

    /// Literal with optional language tag or datatype
    pub fn literal(&self, value: impl AsRef<str>, lang: Option<&str>, datatype: Option<&str>) -> Term {
        Term::literal_with(value, lang, datatype)
    }

    /// Fresh blank node, unique within this store
    pub fn bnode(&mut self) -> Term {
        self.next_blank += 1;
        Term::blank(format!("{}{}", self.options.blank_prefix, self.next_blank))
    }

    pub fn variable(&self, name: impl AsRef<str>) -> Term {
        Term::variable(name)
    }

    pub fn collection(&self, items: impl IntoIterator<Item = Term>) -> Term {
        Term::collection(items)
    }

    /// Empty store for building a nested formula
    pub fn formula(&self) -> Store {
        Store::bare()
    }

    /// The context used by [`Store::add_triple`]
    pub fn default_graph(&self) -> Term {
        Term::named(reserved::DEFAULT_GRAPH)
    }

    // ---------------------------------------------------------------------
    // Equivalence
    // ---------------------------------------------------------------------

    /// Current representative of `term`
    pub fn canon(&self, term: &Term) -> Term {
        self.equivalence.find(term)
    }

    /// Canonical key of the current representative of `term`
    pub fn canon_key(&self, term: &Term) -> String {
        let key = term.canonical_key();
        if self.equivalence.is_empty() {
            return key;
        }
        match self.equivalence.find_key(&key) {
            Some(rep) => rep.key.to_string(),
            None => key,
        }
    }

    /// Record that two terms denote the same thing
    ///
    /// The lower term by [`Term::compare_term`] survives, so the outcome does
    /// not depend on argument order. Always returns `true`.
    pub fn equate(&mut self, a: &Term, b: &Term) -> bool {
        let a = self.canon(a);
        let b = self.canon(b);
        match a.compare_term(&b) {
            Ordering::Equal => {}
            Ordering::Less => self.replace_with(&b, &a),
            Ordering::Greater => self.replace_with(&a, &b),
        }
        true
    }

    fn replace_with(&mut self, big: &Term, small: &Term) {
        let big_key = big.canonical_key();
        let small_key = small.canonical_key();
        debug!(big = %big_key, small = %small_key, "merging terms");

        for index in self.indexes.iter_mut() {
            if let Some(moved) = index.remove(big_key.as_str()) {
                match index.get_mut(small_key.as_str()) {
                    Some(bucket) => bucket.extend(moved),
                    None => {
                        index.insert(Arc::from(small_key.as_str()), moved);
                    }
                }
            }
        }

        self.equivalence.union(big, small);
        self.property_actions.migrate(&big_key, &small_key);
        self.class_actions.migrate(&big_key, &small_key);
    }

    /// Every term that has been merged into `term`'s representative
    pub fn aliases(&self, term: &Term) -> Vec<Term> {
        self.equivalence.aliases(&self.canon_key(term)).to_vec()
    }

    /// URIs of `term`'s representative and of everything merged into it
    pub fn uris(&self, term: &Term) -> Vec<Arc<str>> {
        let rep = self.canon(term);
        std::iter::once(&rep)
            .chain(self.equivalence.aliases(&rep.canonical_key()))
            .filter_map(|t| match t {
                Term::NamedNode(uri) => Some(uri.clone()),
                _ => None,
            })
            .collect()
    }

    // ---------------------------------------------------------------------
    // Actions
    // ---------------------------------------------------------------------

    /// Register an action for a predicate and apply it to existing statements
    ///
    /// Existing statements are never removed; the return value reports whether
    /// any retroactive application asked for suppression.
    pub fn new_property_action(&mut self, predicate: &Term, action: ActionRef) -> bool {
        let key = self.canon_key(predicate);
        debug!(predicate = %key, "registering property action");
        self.property_actions.register(&key, action.clone());

        let existing = self.statements_matching(None, Some(predicate), None, None, false);
        self.apply_retroactively(&existing, &action)
    }

    /// Register an action for a class and apply it to existing `rdf:type` statements
    pub fn new_class_action(&mut self, class: &Term, action: ActionRef) -> bool {
        let key = self.canon_key(class);
        debug!(class = %key, "registering class action");
        self.class_actions.register(&key, action.clone());

        let existing =
            self.statements_matching(None, Some(&Term::named(rdf::TYPE)), Some(class), None, false);
        self.apply_retroactively(&existing, &action)
    }

    fn apply_retroactively(&mut self, existing: &[Arc<Statement>], action: &ActionRef) -> bool {
        let mut suppressed = false;
        for st in existing {
            let quad = self.canonical_quad(st);
            suppressed |= action.apply(self, &quad);
        }
        suppressed
    }

    fn canonical_quad(&self, st: &Statement) -> Quad {
        Quad::new(
            self.canon(&st.subject),
            self.canon(&st.predicate),
            self.canon(&st.object),
            self.canon(&st.context),
        )
    }

    // ---------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------

    /// Add a statement
    ///
    /// Raw values are coerced into terms (see [`crate::coerce`]). Returns
    /// `None` when an on-add action suppressed the statement.
    pub fn add(
        &mut self,
        subject: impl Into<Value>,
        predicate: impl Into<Value>,
        object: impl Into<Value>,
        context: impl Into<Value>,
    ) -> Option<Arc<Statement>> {
        self.add_terms(
            Term::from(subject.into()),
            Term::from(predicate.into()),
            Term::from(object.into()),
            Term::from(context.into()),
        )
    }

    /// Add a statement to the default graph
    pub fn add_triple(
        &mut self,
        subject: impl Into<Value>,
        predicate: impl Into<Value>,
        object: impl Into<Value>,
    ) -> Option<Arc<Statement>> {
        let context = self.default_graph();
        self.add(subject, predicate, object, context)
    }

    /// Add a copy of an existing statement
    pub fn add_statement(&mut self, st: &Statement) -> Option<Arc<Statement>> {
        self.add_terms(
            st.subject.clone(),
            st.predicate.clone(),
            st.object.clone(),
            st.context.clone(),
        )
    }

    fn add_terms(&mut self, s: Term, p: Term, o: Term, c: Term) -> Option<Arc<Statement>> {
        let quad = Quad::new(self.canon(&s), self.canon(&p), self.canon(&o), self.canon(&c));
        let predicate_key = quad.predicate.canonical_key();

        let mut actions = self.property_actions.get(&predicate_key);
        if quad.predicate.as_uri() == Some(rdf::TYPE) {
            actions.extend(self.class_actions.get(&quad.object.canonical_key()));
        }

        let mut suppressed = false;
        for action in actions {
            suppressed |= action.apply(self, &quad);
        }
        if suppressed {
            trace!(statement = %quad, "statement suppressed by action");
            return None;
        }

        let st = Arc::new(Statement::new(s, p, o, c));
        for pos in Position::ALL {
            let key = self.canon_key(st.term(pos));
            let index = &mut self.indexes[pos.index()];
            match index.get_mut(key.as_str()) {
                Some(bucket) => bucket.push(st.clone()),
                None => {
                    index.insert(Arc::from(key), vec![st.clone()]);
                }
            }
        }
        self.statements.push(st.clone());
        Some(st)
    }

    /// Remove one statement
    ///
    /// Identity (the same `Arc`) is preferred; otherwise the first structurally
    /// equal statement is removed.
    pub fn remove(&mut self, st: &Statement) -> Result<()> {
        let position = self
            .statements
            .iter()
            .position(|x| std::ptr::eq(Arc::as_ptr(x), st))
            .or_else(|| self.statements.iter().position(|x| x.same_statement(st)))
            .ok_or_else(|| StoreError::StatementNotFound(st.to_string()))?;
        self.remove_at(position);
        Ok(())
    }

    /// Remove every statement matching the pattern, up to `limit`
    ///
    /// Returns the number of statements removed.
    pub fn remove_many(
        &mut self,
        s: Option<&Term>,
        p: Option<&Term>,
        o: Option<&Term>,
        c: Option<&Term>,
        limit: Option<usize>,
    ) -> usize {
        let matches = self.statements_matching(s, p, o, c, false);
        let take = limit.unwrap_or(matches.len()).min(matches.len());
        let mut removed = 0;
        for st in &matches[..take] {
            if let Some(position) = self.statements.iter().position(|x| Arc::ptr_eq(x, st)) {
                self.remove_at(position);
                removed += 1;
            }
        }
        removed
    }

    /// Drop the statement at `position` from the list and from every index
    fn remove_at(&mut self, position: usize) {
        let stored = self.statements.remove(position);
        for pos in Position::ALL {
            let key = self.canon_key(stored.term(pos));
            let index = &mut self.indexes[pos.index()];
            if let Some(bucket) = index.get_mut(key.as_str()) {
                if let Some(i) = bucket.iter().position(|x| Arc::ptr_eq(x, &stored)) {
                    bucket.remove(i);
                }
                if bucket.is_empty() {
                    index.remove(key.as_str());
                }
            }
        }
    }

    /// Remove every statement in one context
    pub fn remove_context(&mut self, context: &Term) -> usize {
        self.remove_many(None, None, None, Some(context), None)
    }

    // ---------------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------------

    /// All statements, in insertion order
    pub fn statements(&self) -> &[Arc<Statement>] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Bucket of statements whose component at `position` is `term` (after `canon`)
    pub fn bucket(&self, position: Position, term: &Term) -> &[Arc<Statement>] {
        self.indexes[position.index()]
            .get(self.canon_key(term).as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Statements matching a pattern; `None` positions are wildcards
    ///
    /// With two or more positions given, the shortest of their index buckets is
    /// scanned (earliest position wins ties) and filtered on the others. This
    /// greedy choice is the only planning the store does.
    pub fn statements_matching(
        &self,
        s: Option<&Term>,
        p: Option<&Term>,
        o: Option<&Term>,
        c: Option<&Term>,
        just_one: bool,
    ) -> Vec<Arc<Statement>> {
        let given: Vec<(Position, String)> = Position::ALL
            .into_iter()
            .zip([s, p, o, c])
            .filter_map(|(pos, term)| term.map(|t| (pos, self.canon_key(t))))
            .collect();

        let limit = |list: &[Arc<Statement>]| -> Vec<Arc<Statement>> {
            if just_one {
                list.iter().take(1).cloned().collect()
            } else {
                list.to_vec()
            }
        };

        match given.as_slice() {
            [] => limit(self.statements.as_slice()),
            [(pos, key)] => self.indexes[pos.index()]
                .get(key.as_str())
                .map(|bucket| limit(bucket.as_slice()))
                .unwrap_or_default(),
            _ => {
                let mut best: Option<(usize, &Bucket)> = None;
                for (i, (pos, key)) in given.iter().enumerate() {
                    let Some(bucket) = self.indexes[pos.index()].get(key.as_str()) else {
                        return Vec::new();
                    };
                    if best.map_or(true, |(_, b)| bucket.len() < b.len()) {
                        best = Some((i, bucket));
                    }
                }
                let Some((best_i, bucket)) = best else {
                    return Vec::new();
                };
                trace!(
                    position = ?given[best_i].0,
                    bucket_len = bucket.len(),
                    "scanning index bucket"
                );

                let mut results = Vec::new();
                for st in bucket {
                    let matches = given.iter().enumerate().all(|(i, (pos, key))| {
                        i == best_i || self.canon_key(st.term(*pos)) == *key
                    });
                    if matches {
                        results.push(st.clone());
                        if just_one {
                            break;
                        }
                    }
                }
                results
            }
        }
    }

    /// Whether any statement matches
    pub fn holds(&self, s: Option<&Term>, p: Option<&Term>, o: Option<&Term>, c: Option<&Term>) -> bool {
        !self.statements_matching(s, p, o, c, true).is_empty()
    }

    /// Value of the first wildcard position (subject, predicate, object, then
    /// context) in the first matching statement
    pub fn any(&self, s: Option<&Term>, p: Option<&Term>, o: Option<&Term>, c: Option<&Term>) -> Option<Term> {
        let wildcard = Self::first_wildcard(s, p, o, c)?;
        self.statements_matching(s, p, o, c, true)
            .first()
            .map(|st| st.term(wildcard).clone())
    }

    /// Like [`Store::any`], but logs when the value is not unique
    pub fn the(&self, s: Option<&Term>, p: Option<&Term>, o: Option<&Term>, c: Option<&Term>) -> Option<Term> {
        let values = self.each(s, p, o, c);
        if values.len() > 1 {
            debug!(count = values.len(), "expected a single value");
        }
        values.into_iter().next()
    }

    /// Values of the first wildcard position across all matching statements
    pub fn each(&self, s: Option<&Term>, p: Option<&Term>, o: Option<&Term>, c: Option<&Term>) -> Vec<Term> {
        let Some(wildcard) = Self::first_wildcard(s, p, o, c) else {
            return Vec::new();
        };
        self.statements_matching(s, p, o, c, false)
            .iter()
            .map(|st| st.term(wildcard).clone())
            .collect()
    }

    fn first_wildcard(
        s: Option<&Term>,
        p: Option<&Term>,
        o: Option<&Term>,
        c: Option<&Term>,
    ) -> Option<Position> {
        Position::ALL
            .into_iter()
            .zip([s, p, o, c])
            .find(|(_, term)| term.is_none())
            .map(|(pos, _)| pos)
    }

    /// Number of statements matching a pattern
    pub fn length(&self, s: Option<&Term>, p: Option<&Term>, o: Option<&Term>, c: Option<&Term>) -> usize {
        self.statements_matching(s, p, o, c, false).len()
    }

    /// Representatives of every context holding at least one statement
    pub fn contexts(&self) -> Vec<Term> {
        let mut contexts: Vec<Term> = self.indexes[Position::Context.index()]
            .values()
            .filter_map(|bucket| bucket.first())
            .map(|st| self.canon(&st.context))
            .collect();
        contexts.sort();
        contexts
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("statements", &self.statements.len())
            .field("merged", &self.equivalence.merged_count())
            .field("property_actions", &self.property_actions)
            .field("class_actions", &self.class_actions)
            .finish()
    }
}

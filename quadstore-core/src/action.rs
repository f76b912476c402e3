//! On-add actions
//!
//! Actions are registered against the canonical key of a predicate (property
//! actions) or of a class (class actions, dispatched for `rdf:type`
//! statements). They run before a statement is indexed and may ask for it to
//! be suppressed.
//!
//! The built-in actions implement the OWL smushing rules:
//! - `owl:sameAs` always merges subject and object and is never indexed
//! - a predicate typed `owl:FunctionalProperty` merges distinct objects seen for
//!   the same subject
//! - a predicate typed `owl:InverseFunctionalProperty` merges distinct subjects
//!   seen for the same object

use crate::statement::Quad;
use crate::store::Store;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Handler run when a statement is added
pub trait PropertyAction: Send + Sync {
    /// Run against a quad whose terms are already canonical
    ///
    /// Returns `true` to suppress indexing of the statement.
    fn apply(&self, store: &mut Store, quad: &Quad) -> bool;
}

impl<F> PropertyAction for F
where
    F: Fn(&mut Store, &Quad) -> bool + Send + Sync,
{
    fn apply(&self, store: &mut Store, quad: &Quad) -> bool {
        self(store, quad)
    }
}

/// Shared handle to an action
pub type ActionRef = Arc<dyn PropertyAction>;

/// Map from canonical key to the actions registered under it
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: FxHashMap<Arc<str>, Vec<ActionRef>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: &str, action: ActionRef) {
        match self.actions.get_mut(key) {
            Some(list) => list.push(action),
            None => {
                self.actions.insert(Arc::from(key), vec![action]);
            }
        }
    }

    /// Snapshot of the actions under `key`
    ///
    /// Cloned so the caller can run them against a mutable store.
    pub fn get(&self, key: &str) -> Vec<ActionRef> {
        self.actions.get(key).cloned().unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.actions.contains_key(key)
    }

    /// Move everything under `from` onto the end of `to`
    pub fn migrate(&mut self, from: &str, to: &str) {
        if let Some(moved) = self.actions.remove(from) {
            match self.actions.get_mut(to) {
                Some(list) => list.extend(moved),
                None => {
                    self.actions.insert(Arc::from(to), moved);
                }
            }
        }
    }

    /// Total number of registered actions
    pub fn len(&self) -> usize {
        self.actions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.actions.iter().map(|(k, v)| (k, v.len())))
            .finish()
    }
}

/// `owl:sameAs`: merge subject and object, never index the assertion
#[derive(Debug, Clone, Copy, Default)]
pub struct SameAsAction;

impl PropertyAction for SameAsAction {
    fn apply(&self, store: &mut Store, quad: &Quad) -> bool {
        store.equate(&quad.subject, &quad.object);
        true
    }
}

/// Class action for `owl:FunctionalProperty`
///
/// Installs [`FunctionalAction`] on the typed predicate. The type assertion
/// itself is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionalPropertyClassAction;

impl PropertyAction for FunctionalPropertyClassAction {
    fn apply(&self, store: &mut Store, quad: &Quad) -> bool {
        store.new_property_action(&quad.subject, Arc::new(FunctionalAction));
        false
    }
}

/// Class action for `owl:InverseFunctionalProperty`
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseFunctionalPropertyClassAction;

impl PropertyAction for InverseFunctionalPropertyClassAction {
    fn apply(&self, store: &mut Store, quad: &Quad) -> bool {
        store.new_property_action(&quad.subject, Arc::new(InverseFunctionalAction));
        false
    }
}

/// Merge a second distinct object seen for the same (subject, predicate)
///
/// Suppresses the new statement after a merge: the stored statement already
/// says the same thing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionalAction;

impl PropertyAction for FunctionalAction {
    fn apply(&self, store: &mut Store, quad: &Quad) -> bool {
        let Some(existing) = store.any(Some(&quad.subject), Some(&quad.predicate), None, None)
        else {
            return false;
        };
        if store.canon(&existing).same_term(&quad.object) {
            return false;
        }
        store.equate(&existing, &quad.object);
        true
    }
}

/// Merge a second distinct subject seen for the same (predicate, object)
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseFunctionalAction;

impl PropertyAction for InverseFunctionalAction {
    fn apply(&self, store: &mut Store, quad: &Quad) -> bool {
        let Some(existing) = store.any(None, Some(&quad.predicate), Some(&quad.object), None)
        else {
            return false;
        };
        if store.canon(&existing).same_term(&quad.subject) {
            return false;
        }
        store.equate(&existing, &quad.subject);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> ActionRef {
        Arc::new(|_: &mut Store, _: &Quad| false)
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ActionRegistry::new();
        assert!(registry.is_empty());

        registry.register("<p>", noop());
        registry.register("<p>", noop());
        assert_eq!(registry.get("<p>").len(), 2);
        assert!(registry.get("<q>").is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_migrate_appends() {
        let mut registry = ActionRegistry::new();
        registry.register("<big>", noop());
        registry.register("<small>", noop());

        registry.migrate("<big>", "<small>");
        assert!(!registry.contains("<big>"));
        assert_eq!(registry.get("<small>").len(), 2);

        // migrating an empty key is a no-op
        registry.migrate("<none>", "<small>");
        assert_eq!(registry.len(), 2);
    }
}

//! RDF term types: named node, blank node, literal, collection, variable, formula
//!
//! Terms are the building blocks of statements. A term can be:
//! - A named node (always an expanded URI)
//! - A blank node (with a store-scoped identifier)
//! - A literal (value + optional language tag + optional datatype)
//! - A collection (ordered list of terms)
//! - A variable (only meaningful inside query patterns)
//! - A formula (a nested, immutable graph store)
//!
//! Every term has a canonical key (see [`Term::canonical_key`]) which is the only
//! thing the store ever hashes. Two terms are the same term exactly when their
//! canonical keys are equal.

use crate::store::Store;
use quadstore_vocab::{rdf, xsd};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Blank node identifier
///
/// Blank node IDs are stable within a store but have no global meaning.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlankId(Arc<str>);

impl BlankId {
    /// Create a blank node ID from a label
    ///
    /// The label should NOT include the `_:` prefix.
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    /// Get the label (without `_:` prefix)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// Literal value with optional language tag and datatype
///
/// A literal with a language tag never carries a datatype, and a plain string
/// never carries `xsd:string` explicitly (it is normalized away at construction
/// so `"a"` and `"a"^^xsd:string` share a key).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    value: Arc<str>,
    language: Option<Arc<str>>,
    datatype: Option<Arc<str>>,
}

impl Literal {
    /// Lexical value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Language tag, if any
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Explicit datatype IRI, if any
    pub fn datatype(&self) -> Option<&str> {
        self.datatype.as_deref()
    }

    /// Effective datatype IRI (`rdf:langString` / `xsd:string` when not explicit)
    pub fn effective_datatype(&self) -> &str {
        match (&self.datatype, &self.language) {
            (Some(dt), _) => dt,
            (None, Some(_)) => rdf::LANG_STRING,
            (None, None) => xsd::STRING,
        }
    }

    /// Whether the datatype is one of the numeric XSD types
    pub fn is_numeric(&self) -> bool {
        self.datatype.as_deref().is_some_and(xsd::is_numeric)
    }

    /// Parse the lexical value as a number, if it looks like one
    pub fn as_f64(&self) -> Option<f64> {
        match self.value.as_ref() {
            "INF" => Some(f64::INFINITY),
            "-INF" => Some(f64::NEG_INFINITY),
            v => v.trim().parse::<f64>().ok(),
        }
    }
}

/// Kind of a term, in the fixed rank order used by [`Term::compare_term`]
///
/// Lower ranks survive equivalence merges, so a blank node merged with a named
/// node always collapses into the named node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TermKind {
    Literal,
    Collection,
    Formula,
    NamedNode,
    BlankNode,
    Variable,
}

/// A term usable in any position of a statement
#[derive(Clone)]
pub enum Term {
    /// Full expanded URI (e.g., "http://xmlns.com/foaf/0.1/Person")
    NamedNode(Arc<str>),

    /// Blank node with a store-scoped identifier
    BlankNode(BlankId),

    /// Literal value
    Literal(Literal),

    /// Ordered list of terms
    Collection(Arc<[Term]>),

    /// Query variable, identified by name (without the `?`)
    Variable(Arc<str>),

    /// Nested graph, quoted as a single term
    Formula(Arc<Store>),
}

impl Term {
    /// Create a named node from an expanded URI
    pub fn named(uri: impl AsRef<str>) -> Self {
        Term::NamedNode(Arc::from(uri.as_ref()))
    }

    /// Create a blank node term
    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::BlankNode(BlankId::new(label))
    }

    /// Create a plain literal
    pub fn literal(value: impl AsRef<str>) -> Self {
        Term::Literal(Literal {
            value: Arc::from(value.as_ref()),
            language: None,
            datatype: None,
        })
    }

    /// Create a language-tagged literal
    pub fn lang_literal(value: impl AsRef<str>, lang: impl AsRef<str>) -> Self {
        Term::Literal(Literal {
            value: Arc::from(value.as_ref()),
            language: Some(Arc::from(lang.as_ref())),
            datatype: None,
        })
    }

    /// Create a typed literal
    ///
    /// `xsd:string` is normalized to a plain literal.
    pub fn typed_literal(value: impl AsRef<str>, datatype: impl AsRef<str>) -> Self {
        let datatype = datatype.as_ref();
        Term::Literal(Literal {
            value: Arc::from(value.as_ref()),
            language: None,
            datatype: (datatype != xsd::STRING).then(|| Arc::from(datatype)),
        })
    }

    /// Create a literal from its parts
    ///
    /// A language tag takes precedence over a datatype.
    pub fn literal_with(value: impl AsRef<str>, lang: Option<&str>, datatype: Option<&str>) -> Self {
        match (lang, datatype) {
            (Some(lang), _) => Term::lang_literal(value, lang),
            (None, Some(dt)) => Term::typed_literal(value, dt),
            (None, None) => Term::literal(value),
        }
    }

    /// Create a collection
    pub fn collection(items: impl IntoIterator<Item = Term>) -> Self {
        Term::Collection(items.into_iter().collect())
    }

    /// Create a variable (the name is stored without a leading `?`)
    pub fn variable(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        Term::Variable(Arc::from(name.strip_prefix('?').unwrap_or(name)))
    }

    /// Wrap a finished store as a formula term
    pub fn formula(store: Store) -> Self {
        Term::Formula(Arc::new(store))
    }

    /// Kind of this term
    pub fn kind(&self) -> TermKind {
        match self {
            Term::NamedNode(_) => TermKind::NamedNode,
            Term::BlankNode(_) => TermKind::BlankNode,
            Term::Literal(_) => TermKind::Literal,
            Term::Collection(_) => TermKind::Collection,
            Term::Variable(_) => TermKind::Variable,
            Term::Formula(_) => TermKind::Formula,
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Term::NamedNode(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Try to get as URI
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Term::NamedNode(uri) => Some(uri),
            _ => None,
        }
    }

    /// Try to get literal components
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Try to get the variable name
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// Try to get collection elements
    pub fn as_collection(&self) -> Option<&[Term]> {
        match self {
            Term::Collection(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get the nested store of a formula
    pub fn as_formula(&self) -> Option<&Store> {
        match self {
            Term::Formula(store) => Some(store),
            _ => None,
        }
    }

    /// Whether this term, or anything nested inside it, is a variable
    pub fn contains_variable(&self) -> bool {
        match self {
            Term::Variable(_) => true,
            Term::Collection(items) => items.iter().any(Term::contains_variable),
            _ => false,
        }
    }

    /// The document a named node lives in (its URI without the fragment)
    pub fn document(&self) -> Option<Term> {
        let uri = self.as_uri()?;
        let doc = uri.split_once('#').map_or(uri, |(doc, _)| doc);
        Some(Term::named(doc))
    }

    /// Stable string encoding of kind and value
    ///
    /// This is the sole key used by the store's maps. Every component is
    /// escaped so that no two distinct terms share a key.
    pub fn canonical_key(&self) -> String {
        let mut out = String::new();
        self.write_key(&mut out);
        out
    }

    fn write_key(&self, out: &mut String) {
        match self {
            Term::NamedNode(uri) => {
                out.push('<');
                escape_component(uri, out);
                out.push('>');
            }
            Term::BlankNode(id) => {
                out.push_str("_:");
                escape_component(id.as_str(), out);
            }
            Term::Literal(lit) => {
                out.push('"');
                escape_into(&lit.value, out);
                out.push('"');
                if let Some(lang) = &lit.language {
                    out.push('@');
                    escape_component(lang, out);
                } else if let Some(dt) = &lit.datatype {
                    out.push_str("^^<");
                    escape_component(dt, out);
                    out.push('>');
                }
            }
            Term::Collection(items) => {
                out.push('(');
                for item in items.iter() {
                    out.push(' ');
                    item.write_key(out);
                }
                out.push_str(" )");
            }
            Term::Variable(name) => {
                out.push('?');
                escape_component(name, out);
            }
            Term::Formula(store) => {
                let mut keys: Vec<String> =
                    store.statements().iter().map(|st| st.canonical_key()).collect();
                keys.sort();
                out.push('{');
                for key in keys {
                    out.push(' ');
                    out.push_str(&key);
                }
                out.push_str(" }");
            }
        }
    }

    /// Total order across all kinds
    ///
    /// Ranks by [`TermKind`] first, then by the kind's natural key.
    pub fn compare_term(&self, other: &Term) -> Ordering {
        match self.kind().cmp(&other.kind()) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match (self, other) {
            (Term::NamedNode(a), Term::NamedNode(b)) => a.cmp(b),
            (Term::BlankNode(a), Term::BlankNode(b)) => a.cmp(b),
            (Term::Variable(a), Term::Variable(b)) => a.cmp(b),
            (Term::Literal(a), Term::Literal(b)) => (&a.value, &a.language, &a.datatype)
                .cmp(&(&b.value, &b.language, &b.datatype)),
            (Term::Collection(a), Term::Collection(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare_term(y) {
                        Ordering::Equal => {}
                        ord => return ord,
                    }
                }
                a.len().cmp(&b.len())
            }
            (Term::Formula(_), Term::Formula(_)) => self.canonical_key().cmp(&other.canonical_key()),
            _ => Ordering::Equal, // Should not happen
        }
    }

    /// Structural equality, ignoring any equivalence merging
    pub fn same_term(&self, other: &Term) -> bool {
        match (self, other) {
            (Term::NamedNode(a), Term::NamedNode(b)) => a == b,
            (Term::BlankNode(a), Term::BlankNode(b)) => a == b,
            (Term::Variable(a), Term::Variable(b)) => a == b,
            (Term::Literal(a), Term::Literal(b)) => a == b,
            (Term::Collection(a), Term::Collection(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.same_term(y))
            }
            (Term::Formula(a), Term::Formula(b)) => {
                Arc::ptr_eq(a, b) || self.canonical_key() == other.canonical_key()
            }
            _ => false,
        }
    }
}

/// Escape an unquoted key component (IRI, blank label, tag, variable name)
///
/// Delimiters of the surrounding key are escaped, so every component ends at
/// its first unescaped delimiter.
fn escape_component(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ' ' => out.push_str("\\s"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '"' | '<' | '>' | '(' | ')' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
}

fn escape_into(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.same_term(other)
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_key().hash(state);
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_term(other)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_key())
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Term({})", self.canonical_key())
    }
}

/// Serializes in the SPARQL 1.1 JSON results term shape
impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Term::Collection(items) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "collection")?;
                map.serialize_entry("value", &CollectionItems(items))?;
                map.end()
            }
            Term::Literal(lit) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", "literal")?;
                map.serialize_entry("value", lit.value())?;
                if let Some(lang) = lit.language() {
                    map.serialize_entry("xml:lang", lang)?;
                }
                if let Some(dt) = lit.datatype() {
                    map.serialize_entry("datatype", dt)?;
                }
                map.end()
            }
            other => {
                let (kind, value) = match other {
                    Term::NamedNode(uri) => ("uri", uri.to_string()),
                    Term::BlankNode(id) => ("bnode", id.as_str().to_string()),
                    Term::Variable(name) => ("variable", name.to_string()),
                    _ => ("formula", other.canonical_key()),
                };
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", kind)?;
                map.serialize_entry("value", &value)?;
                map.end()
            }
        }
    }
}

struct CollectionItems<'a>(&'a [Term]);

impl Serialize for CollectionItems<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for item in self.0 {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_id() {
        let id = BlankId::new("b0");
        assert_eq!(id.as_str(), "b0");
        assert_eq!(format!("{}", id), "_:b0");
    }

    #[test]
    fn test_canonical_keys() {
        assert_eq!(Term::named("http://a.org/x").canonical_key(), "<http://a.org/x>");
        assert_eq!(Term::blank("n1").canonical_key(), "_:n1");
        assert_eq!(Term::literal("hi").canonical_key(), "\"hi\"");
        assert_eq!(Term::lang_literal("hi", "en").canonical_key(), "\"hi\"@en");
        assert_eq!(
            Term::typed_literal("1", xsd::INTEGER).canonical_key(),
            "\"1\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
        assert_eq!(Term::variable("?x").canonical_key(), "?x");
        assert_eq!(
            Term::collection([Term::literal("a"), Term::blank("b")]).canonical_key(),
            "( \"a\" _:b )"
        );
    }

    #[test]
    fn test_literal_keys_distinguish_datatypes() {
        let int = Term::typed_literal("1", xsd::INTEGER);
        let dec = Term::typed_literal("1", xsd::DECIMAL);
        let plain = Term::literal("1");
        assert_ne!(int.canonical_key(), dec.canonical_key());
        assert_ne!(int.canonical_key(), plain.canonical_key());
        assert!(!int.same_term(&dec));
    }

    #[test]
    fn test_xsd_string_is_plain() {
        assert_eq!(Term::typed_literal("a", xsd::STRING), Term::literal("a"));
    }

    #[test]
    fn test_escaping_keeps_keys_unambiguous() {
        let quoted = Term::literal("a\"@en");
        let tagged = Term::lang_literal("a", "en");
        assert_ne!(quoted.canonical_key(), tagged.canonical_key());
        assert_eq!(Term::literal("line\nbreak").canonical_key(), "\"line\\nbreak\"");
    }

    #[test]
    fn test_component_delimiters_are_escaped() {
        let pair = Term::collection([Term::blank("a"), Term::blank("b")]);
        let spliced = Term::collection([Term::blank("a _:b")]);
        assert_ne!(pair.canonical_key(), spliced.canonical_key());
        assert_eq!(spliced.canonical_key(), "( _:a\\s_:b )");

        let iri = Term::named("http://a.org/x> <http://a.org/y");
        assert_eq!(iri.canonical_key(), "<http://a.org/x\\>\\s\\<http://a.org/y>");
        let nested = Term::collection([Term::named("http://a.org/x"), Term::named("http://a.org/y")]);
        assert_ne!(
            Term::collection([iri]).canonical_key(),
            nested.canonical_key()
        );

        let odd_tag = Term::lang_literal("hi", "en )");
        assert_eq!(odd_tag.canonical_key(), "\"hi\"@en\\s\\)");
    }

    #[test]
    fn test_kind_ordering() {
        let lit = Term::literal("z");
        let coll = Term::collection([]);
        let named = Term::named("http://a.org");
        let blank = Term::blank("a");
        let var = Term::variable("a");

        assert_eq!(lit.compare_term(&coll), Ordering::Less);
        assert_eq!(coll.compare_term(&named), Ordering::Less);
        assert_eq!(named.compare_term(&blank), Ordering::Less);
        assert_eq!(blank.compare_term(&var), Ordering::Less);
        assert_eq!(var.compare_term(&lit), Ordering::Greater);
    }

    #[test]
    fn test_same_kind_ordering() {
        let a = Term::named("http://a.org");
        let b = Term::named("http://b.org");
        assert_eq!(a.compare_term(&b), Ordering::Less);
        assert_eq!(b.compare_term(&a), Ordering::Greater);
        assert_eq!(a.compare_term(&a.clone()), Ordering::Equal);

        let short = Term::collection([Term::literal("a")]);
        let long = Term::collection([Term::literal("a"), Term::literal("b")]);
        assert_eq!(short.compare_term(&long), Ordering::Less);
    }

    #[test]
    fn test_document() {
        let me = Term::named("http://example.org/card#me");
        assert_eq!(me.document(), Some(Term::named("http://example.org/card")));
        assert_eq!(Term::blank("x").document(), None);
    }

    #[test]
    fn test_variable_strips_question_mark() {
        assert_eq!(Term::variable("?x"), Term::variable("x"));
        assert_eq!(Term::variable("x").as_variable(), Some("x"));
    }

    #[test]
    fn test_serialize_sparql_json_shape() {
        let json = serde_json::to_value(Term::lang_literal("bonjour", "fr")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "literal", "value": "bonjour", "xml:lang": "fr"})
        );

        let json = serde_json::to_value(Term::named("http://a.org")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "uri", "value": "http://a.org"}));
    }
}

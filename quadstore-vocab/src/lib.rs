//! RDF Vocabulary Constants for the quad store
//!
//! This crate provides a centralized location for the RDF vocabulary IRIs the
//! store and query engine react to.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `owl` - OWL vocabulary (http://www.w3.org/2002/07/owl#)
//! - `store` - IRIs reserved by the store itself

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:langString IRI (datatype of language-tagged literals)
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

    /// rdf:first IRI (RDF list head)
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";

    /// rdf:rest IRI (RDF list tail)
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";

    /// rdf:nil IRI (empty RDF list)
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
}

/// XSD datatype constants
pub mod xsd {
    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:int IRI
    pub const INT: &str = "http://www.w3.org/2001/XMLSchema#int";

    /// xsd:decimal IRI
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    /// xsd:float IRI
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// Check if a datatype IRI is one of the numeric XSD types
    pub fn is_numeric(iri: &str) -> bool {
        matches!(iri, INTEGER | INT | DECIMAL | FLOAT | DOUBLE)
    }
}

/// OWL vocabulary constants
pub mod owl {
    /// owl:sameAs IRI
    pub const SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";

    /// owl:FunctionalProperty IRI
    pub const FUNCTIONAL_PROPERTY: &str = "http://www.w3.org/2002/07/owl#FunctionalProperty";

    /// owl:InverseFunctionalProperty IRI
    pub const INVERSE_FUNCTIONAL_PROPERTY: &str =
        "http://www.w3.org/2002/07/owl#InverseFunctionalProperty";
}

/// IRIs reserved by the store
pub mod store {
    /// Context used for statements added without an explicit context
    pub const DEFAULT_GRAPH: &str = "urn:x-quadstore:default-graph";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_datatypes() {
        assert!(xsd::is_numeric(xsd::INTEGER));
        assert!(xsd::is_numeric(xsd::DECIMAL));
        assert!(xsd::is_numeric(xsd::FLOAT));
        assert!(!xsd::is_numeric(xsd::STRING));
        assert!(!xsd::is_numeric(xsd::DATE_TIME));
    }

    #[test]
    fn test_namespaces_are_consistent() {
        assert!(rdf::TYPE.starts_with("http://www.w3.org/1999/02/22-rdf-syntax-ns#"));
        assert!(owl::SAME_AS.starts_with("http://www.w3.org/2002/07/owl#"));
        assert!(xsd::DATE_TIME.starts_with("http://www.w3.org/2001/XMLSchema#"));
    }
}

//! Literal values

use std::fmt;

use crate::iri::Iri;
use crate::namespace::ns::{rdf, xsd};

/// A runtime value re-materialized from a typed literal
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i32),
    Long(i64),
    Boolean(bool),
    Float(f32),
    Double(f64),
    Text(String),
}

/// An RDF literal: lexical value, optional datatype, optional language tag
///
/// Two literals are equal only when value, datatype and language all match.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    value: String,
    datatype: Option<Iri>,
    language: Option<String>,
}

impl Literal {
    /// Create an untyped literal
    pub fn plain(value: impl Into<String>) -> Self {
        Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// Create a typed literal
    pub fn typed(value: impl Into<String>, datatype: Iri) -> Self {
        Literal {
            value: value.into(),
            datatype: Some(datatype),
            language: None,
        }
    }

    /// Create a language-tagged literal
    pub fn with_language(value: impl Into<String>, language: impl Into<String>) -> Self {
        Literal {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    /// Get the lexical value
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn datatype(&self) -> Option<&Iri> {
        self.datatype.as_ref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// No datatype (a language tag is allowed)
    pub fn is_plain(&self) -> bool {
        self.datatype.is_none()
    }

    pub fn is_xml_literal(&self) -> bool {
        self.datatype.as_ref().map_or(false, |dt| dt.as_str() == rdf::XML_LITERAL)
    }

    /// Typed runtime value.
    ///
    /// Untyped, `xsd:string` and unknown datatypes give the raw text; a known
    /// numeric or boolean datatype whose lexical form does not parse gives
    /// `None`.
    pub fn object(&self) -> Option<LiteralValue> {
        let Some(datatype) = &self.datatype else {
            return Some(LiteralValue::Text(self.value.clone()));
        };
        let lexical = self.value.trim();
        match datatype.as_str() {
            xsd::INT => lexical.parse().ok().map(LiteralValue::Int),
            xsd::LONG | xsd::INTEGER => lexical.parse().ok().map(LiteralValue::Long),
            xsd::BOOLEAN => match lexical {
                "true" | "1" => Some(LiteralValue::Boolean(true)),
                "false" | "0" => Some(LiteralValue::Boolean(false)),
                _ => None,
            },
            xsd::FLOAT => lexical.parse().ok().map(LiteralValue::Float),
            xsd::DOUBLE => lexical.parse().ok().map(LiteralValue::Double),
            _ => Some(LiteralValue::Text(self.value.clone())),
        }
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::typed(value.to_string(), xsd::double())
    }
}

impl From<f32> for Literal {
    fn from(value: f32) -> Self {
        Literal::typed(value.to_string(), xsd::float())
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::typed(value.to_string(), xsd::long())
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::typed(value.to_string(), xsd::int())
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::typed(value.to_string(), xsd::boolean())
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::plain(value)
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::plain(value)
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::writer::ntriples::format_literal(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_literal() {
        let lit = Literal::plain("hello");
        assert_eq!(lit.value(), "hello");
        assert!(lit.is_plain());
        assert_eq!(format!("{}", lit), "\"hello\"");
        assert_eq!(lit.object(), Some(LiteralValue::Text("hello".into())));
    }

    #[test]
    fn test_lang_literal() {
        let lit = Literal::with_language("hello", "en");
        assert_eq!(lit.language(), Some("en"));
        assert_eq!(format!("{}", lit), "\"hello\"@en");
        assert_ne!(lit, Literal::plain("hello"));
        assert_ne!(lit, Literal::with_language("hello", "fr"));
    }

    #[test]
    fn test_from_primitives() {
        let d = Literal::from(1.5f64);
        assert_eq!(d.datatype(), Some(&xsd::double()));
        assert_eq!(d.object(), Some(LiteralValue::Double(1.5)));

        let f = Literal::from(2.5f32);
        assert_eq!(f.datatype(), Some(&xsd::float()));

        let l = Literal::from(7i64);
        assert_eq!(l.object(), Some(LiteralValue::Long(7)));

        let i = Literal::from(-3i32);
        assert_eq!(i.datatype(), Some(&xsd::int()));
        assert_eq!(i.object(), Some(LiteralValue::Int(-3)));

        let b = Literal::from(true);
        assert_eq!(b.value(), "true");
        assert_eq!(b.object(), Some(LiteralValue::Boolean(true)));

        assert!(Literal::from("text").is_plain());
    }

    #[test]
    fn test_object_edge_cases() {
        let bad = Literal::typed("twelve", xsd::int());
        assert_eq!(bad.object(), None);

        let unknown = Literal::typed("x", Iri::parse("http://example.org/dt").unwrap());
        assert_eq!(unknown.object(), Some(LiteralValue::Text("x".into())));

        let integer = Literal::typed(" 42 ", xsd::integer());
        assert_eq!(integer.object(), Some(LiteralValue::Long(42)));
    }
}

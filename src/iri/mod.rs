//! Internationalized resource identifiers
//!
//! [`Iri`] is the identifier type behind every subject, predicate and
//! resource object in the graph. Parsing splits the text with the RFC 3986
//! appendix B grammar and then checks each component against its character
//! profile; non-ASCII characters are kept as-is (RFC 3987).
//!
//! Identifiers whose scheme-specific part does not start with `/` are
//! *opaque* (`urn:isbn:123`, `mailto:a@b`). Blank nodes use the reserved
//! scheme `_`, so `_:b1` parses as an opaque identifier.
//!
//! ```rust
//! use triplekit::iri::Iri;
//!
//! let base = Iri::parse("http://example.org/a/b?q").unwrap();
//! let resolved = base.resolve_str("../c#frag").unwrap();
//! assert_eq!(resolved.as_str(), "http://example.org/c#frag");
//! assert_eq!(base.relativize(&resolved).as_str(), "../c#frag");
//! ```

mod ascii;
mod resolve;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

/// Scheme reserved for blank node identifiers.
pub const BLANK_SCHEME: &str = "_";

/// Identifier syntax errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IriError {
    #[error("invalid scheme '{scheme}' in <{iri}>")]
    InvalidScheme { iri: String, scheme: String },

    #[error("illegal character {ch:?} in {component} at offset {offset} of <{iri}>")]
    IllegalCharacter {
        iri: String,
        component: &'static str,
        ch: char,
        offset: usize,
    },

    #[error("malformed percent escape at offset {offset} of <{iri}>")]
    InvalidPercentEncoding { iri: String, offset: usize },

    #[error("invalid port '{port}' in <{iri}>")]
    InvalidPort { iri: String, port: String },
}

impl IriError {
    /// The text that failed to parse
    pub fn iri(&self) -> &str {
        match self {
            IriError::InvalidScheme { iri, .. }
            | IriError::IllegalCharacter { iri, .. }
            | IriError::InvalidPercentEncoding { iri, .. }
            | IriError::InvalidPort { iri, .. } => iri,
        }
    }
}

/// `[userinfo "@"] host [":" port]`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Authority {
    raw: String,
    userinfo: Option<String>,
    host: Option<String>,
    port: Option<u16>,
}

impl Authority {
    fn parse(iri: &str, raw: &str) -> Result<Self, IriError> {
        let (userinfo, host_port) = match raw.rfind('@') {
            Some(at) => (Some(raw[..at].to_string()), &raw[at + 1..]),
            None => (None, raw),
        };

        let (host, port_text) = if host_port.starts_with('[') {
            match host_port.find(']') {
                Some(end) => (&host_port[..=end], host_port[end + 1..].strip_prefix(':')),
                None => (host_port, None),
            }
        } else {
            match host_port.rfind(':') {
                Some(colon) => (&host_port[..colon], Some(&host_port[colon + 1..])),
                None => (host_port, None),
            }
        };

        let port = match port_text {
            Some(text) if !text.is_empty() => Some(text.parse::<u16>().map_err(|_| {
                IriError::InvalidPort {
                    iri: iri.to_string(),
                    port: text.to_string(),
                }
            })?),
            _ => None,
        };

        Ok(Authority {
            raw: raw.to_string(),
            userinfo,
            host: (!host.is_empty()).then(|| host.to_string()),
            port,
        })
    }
}

/// An absolute or relative IRI reference
///
/// Equality, hashing and ordering compare components: scheme and host
/// case-insensitively, everything else exactly.
#[derive(Clone)]
pub struct Iri {
    text: String,
    scheme: Option<String>,
    opaque: Option<String>,
    authority: Option<Authority>,
    path: Option<String>,
    query: Option<String>,
    fragment: Option<String>,
    ascii: ascii::AsciiCache,
}

fn grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(r"(?s)^(?:([^:/?#]+):)?(?://([^/?#]*))?([^?#]*)(?:\?([^#]*))?(?:#(.*))?$")
            .expect("IRI grammar is a valid pattern")
    })
}

fn is_valid_scheme(scheme: &str) -> bool {
    if scheme == BLANK_SCHEME {
        return true;
    }
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Checks one component against its character profile. `offset` is the
/// byte position of the component inside `iri`.
fn check_component(
    iri: &str,
    text: &str,
    offset: usize,
    component: &'static str,
) -> Result<(), IriError> {
    let bytes = text.as_bytes();
    for (i, ch) in text.char_indices() {
        let illegal = ch.is_ascii_control()
            || matches!(ch, ' ' | '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`')
            || (component != "host" && matches!(ch, '[' | ']'))
            || (component == "fragment" && ch == '#');
        if illegal {
            return Err(IriError::IllegalCharacter {
                iri: iri.to_string(),
                component,
                ch,
                offset: offset + i,
            });
        }
        if ch == '%' {
            let well_formed = bytes.get(i + 1).map_or(false, u8::is_ascii_hexdigit)
                && bytes.get(i + 2).map_or(false, u8::is_ascii_hexdigit);
            if !well_formed {
                return Err(IriError::InvalidPercentEncoding {
                    iri: iri.to_string(),
                    offset: offset + i,
                });
            }
        }
    }
    Ok(())
}

impl Iri {
    /// Parse an absolute or relative IRI reference
    pub fn parse(text: &str) -> Result<Iri, IriError> {
        let caps = grammar()
            .captures(text)
            .ok_or_else(|| IriError::IllegalCharacter {
                iri: text.to_string(),
                component: "iri",
                ch: text.chars().next().unwrap_or('\0'),
                offset: 0,
            })?;

        let scheme = caps.get(1);
        if let Some(scheme) = scheme {
            if !is_valid_scheme(scheme.as_str()) {
                return Err(IriError::InvalidScheme {
                    iri: text.to_string(),
                    scheme: scheme.as_str().to_string(),
                });
            }
        }

        let fragment = match caps.get(5) {
            Some(m) => {
                check_component(text, m.as_str(), m.start(), "fragment")?;
                Some(m.as_str().to_string())
            }
            None => None,
        };

        // Opaque: a scheme followed by something that is not a path root
        if let Some(scheme) = scheme {
            let ssp_end = caps.get(5).map_or(text.len(), |m| m.start() - 1);
            let ssp = &text[scheme.end() + 1..ssp_end];
            if !ssp.is_empty() && !ssp.starts_with('/') {
                check_component(text, ssp, scheme.end() + 1, "scheme-specific part")?;
                return Ok(Iri::assemble(
                    Some(scheme.as_str().to_string()),
                    Some(ssp.to_string()),
                    None,
                    None,
                    None,
                    fragment,
                ));
            }
        }

        let authority = match caps.get(2) {
            Some(m) => {
                let authority = Authority::parse(text, m.as_str())?;
                if let Some(userinfo) = &authority.userinfo {
                    check_component(text, userinfo, m.start(), "userinfo")?;
                }
                check_component(text, m.as_str(), m.start(), "host")?;
                Some(authority)
            }
            None => None,
        };

        let path = caps.get(3).map_or("", |m| m.as_str());
        check_component(text, path, caps.get(3).map_or(0, |m| m.start()), "path")?;

        let query = match caps.get(4) {
            Some(m) => {
                check_component(text, m.as_str(), m.start(), "query")?;
                Some(m.as_str().to_string())
            }
            None => None,
        };

        Ok(Iri::assemble(
            scheme.map(|m| m.as_str().to_string()),
            None,
            authority,
            Some(path.to_string()),
            query,
            fragment,
        ))
    }

    /// Blank node identifier `_:label`
    pub fn blank(label: &str) -> Iri {
        Iri::assemble(
            Some(BLANK_SCHEME.to_string()),
            Some(label.to_string()),
            None,
            None,
            None,
            None,
        )
    }

    /// Term `local` in an `http` vocabulary namespace ending in `#` or `/`.
    /// Both parts are trusted constants, so nothing is checked.
    pub(crate) fn vocabulary(namespace: &str, local: &str) -> Iri {
        let rest = namespace.strip_prefix("http://").unwrap_or(namespace);
        let (host, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
        let authority = Authority {
            raw: host.to_string(),
            userinfo: None,
            host: Some(host.to_string()),
            port: None,
        };
        let (path, fragment) = match path.strip_suffix('#') {
            Some(path) => (path.to_string(), Some(local.to_string())),
            None => (format!("{}{}", path, local), None),
        };
        Iri::assemble(
            Some("http".to_string()),
            None,
            Some(authority),
            Some(path),
            None,
            fragment,
        )
    }

    fn assemble(
        scheme: Option<String>,
        opaque: Option<String>,
        authority: Option<Authority>,
        path: Option<String>,
        query: Option<String>,
        fragment: Option<String>,
    ) -> Iri {
        let mut text = String::new();
        if let Some(scheme) = &scheme {
            text.push_str(scheme);
            text.push(':');
        }
        if let Some(opaque) = &opaque {
            text.push_str(opaque);
        } else {
            if let Some(authority) = &authority {
                text.push_str("//");
                text.push_str(&authority.raw);
            }
            if let Some(path) = &path {
                text.push_str(path);
            }
            if let Some(query) = &query {
                text.push('?');
                text.push_str(query);
            }
        }
        if let Some(fragment) = &fragment {
            text.push('#');
            text.push_str(fragment);
        }

        Iri {
            text,
            scheme,
            opaque,
            authority,
            path,
            query,
            fragment,
            ascii: ascii::AsciiCache::default(),
        }
    }

    /// The full identifier text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Everything between the scheme and the fragment
    pub fn scheme_specific_part(&self) -> &str {
        let start = self.scheme.as_ref().map_or(0, |s| s.len() + 1);
        let end = self
            .fragment
            .as_ref()
            .map_or(self.text.len(), |f| self.text.len() - f.len() - 1);
        &self.text[start..end]
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_ref().map(|a| a.raw.as_str())
    }

    pub fn userinfo(&self) -> Option<&str> {
        self.authority.as_ref().and_then(|a| a.userinfo.as_deref())
    }

    pub fn host(&self) -> Option<&str> {
        self.authority.as_ref().and_then(|a| a.host.as_deref())
    }

    pub fn port(&self) -> Option<u16> {
        self.authority.as_ref().and_then(|a| a.port)
    }

    /// Hierarchical path; `None` for opaque identifiers
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn is_absolute(&self) -> bool {
        self.scheme.is_some()
    }

    pub fn is_opaque(&self) -> bool {
        self.opaque.is_some()
    }

    /// Whether this identifies a blank node (scheme `_`)
    pub fn is_blank(&self) -> bool {
        self.scheme.as_deref() == Some(BLANK_SCHEME)
    }

    /// Local label of a blank node identifier
    pub fn blank_label(&self) -> Option<&str> {
        if self.is_blank() {
            self.opaque.as_deref()
        } else {
            None
        }
    }

    pub fn without_fragment(&self) -> Iri {
        self.replace_fragment(None)
    }

    /// Same identifier with `fragment` in place of any existing fragment
    pub fn with_fragment(&self, fragment: &str) -> Result<Iri, IriError> {
        check_component(fragment, fragment, 0, "fragment")?;
        Ok(self.replace_fragment(Some(fragment.to_string())))
    }

    fn replace_fragment(&self, fragment: Option<String>) -> Iri {
        Iri::assemble(
            self.scheme.clone(),
            self.opaque.clone(),
            self.authority.clone(),
            self.path.clone(),
            self.query.clone(),
            fragment,
        )
    }

    /// Text up to and including the last `#` or `/`
    pub fn namespace(&self) -> &str {
        match self.text.rfind(['#', '/']) {
            Some(pos) => &self.text[..=pos],
            None => &self.text,
        }
    }

    /// Fragment or last path segment
    pub fn local_name(&self) -> &str {
        match self.text.rfind(['#', '/']) {
            Some(pos) => &self.text[pos + 1..],
            None => &self.text,
        }
    }

    fn cmp_hierarchical(&self, other: &Iri) -> Ordering {
        let authority = match (self.host(), other.host()) {
            (Some(h1), Some(h2)) => cmp_opt(self.userinfo(), other.userinfo(), false)
                .then_with(|| cmp_ignore_case(h1, h2))
                .then_with(|| self.port().cmp(&other.port())),
            _ => cmp_opt(self.authority(), other.authority(), false),
        };
        authority
            .then_with(|| cmp_opt(self.path(), other.path(), false))
            .then_with(|| cmp_opt(self.query(), other.query(), false))
            .then_with(|| cmp_opt(self.fragment(), other.fragment(), false))
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// Absent components sort lowest
fn cmp_opt(a: Option<&str>, b: Option<&str>, ignore_case: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) if ignore_case => cmp_ignore_case(a, b),
        (Some(a), Some(b)) => a.cmp(b),
    }
}

impl Ord for Iri {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_opt(self.scheme(), other.scheme(), true).then_with(|| {
            match (self.opaque.as_deref(), other.opaque.as_deref()) {
                (Some(a), Some(b)) => a
                    .cmp(b)
                    .then_with(|| cmp_opt(self.fragment(), other.fragment(), false)),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => self.cmp_hierarchical(other),
            }
        })
    }
}

impl PartialOrd for Iri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Iri {
    fn eq(&self, other: &Self) -> bool {
        // Fast path for the common exact match
        self.text == other.text || self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Iri {}

impl Hash for Iri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.scheme.as_ref().map(|s| s.to_ascii_lowercase()).hash(state);
        self.opaque.hash(state);
        match self.host() {
            Some(host) => {
                self.userinfo().hash(state);
                host.to_ascii_lowercase().hash(state);
                self.port().hash(state);
            }
            None => self.authority().hash(state),
        }
        self.path.hash(state);
        self.query.hash(state);
        self.fragment.hash(state);
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.text)
    }
}

impl FromStr for Iri {
    type Err = IriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Iri::parse(s)
    }
}

impl TryFrom<&str> for Iri {
    type Error = IriError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Iri::parse(s)
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::parse(s).unwrap()
    }

    #[test]
    fn test_components() {
        let i = iri("http://user@Example.org:8080/a/b?x=1#top");
        assert_eq!(i.scheme(), Some("http"));
        assert_eq!(i.authority(), Some("user@Example.org:8080"));
        assert_eq!(i.userinfo(), Some("user"));
        assert_eq!(i.host(), Some("Example.org"));
        assert_eq!(i.port(), Some(8080));
        assert_eq!(i.path(), Some("/a/b"));
        assert_eq!(i.query(), Some("x=1"));
        assert_eq!(i.fragment(), Some("top"));
        assert_eq!(i.scheme_specific_part(), "//user@Example.org:8080/a/b?x=1");
        assert!(i.is_absolute());
        assert!(!i.is_opaque());
    }

    #[test]
    fn test_parse_display_round_trip() {
        for text in [
            "http://example.org/",
            "urn:isbn:0451450523",
            "mailto:joe@example.org",
            "file:///etc/hosts",
            "../relative/path?q#f",
            "#frag",
            "",
            "_:b12",
            "http://[::1]:80/x",
            "http://bücher.example/straße",
        ] {
            let parsed = iri(text);
            assert_eq!(parsed.to_string(), text);
            assert_eq!(iri(&parsed.to_string()), parsed);
        }
    }

    #[test]
    fn test_opaque() {
        let urn = iri("urn:example:a?b#c");
        assert!(urn.is_opaque());
        assert_eq!(urn.path(), None);
        assert_eq!(urn.query(), None);
        assert_eq!(urn.scheme_specific_part(), "example:a?b");
        assert_eq!(urn.fragment(), Some("c"));
    }

    #[test]
    fn test_blank() {
        let b = Iri::blank("b7");
        assert_eq!(b.as_str(), "_:b7");
        assert!(b.is_blank());
        assert_eq!(b.blank_label(), Some("b7"));
        assert_eq!(iri("_:b7"), b);
        assert!(!iri("http://example.org/").is_blank());
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            Iri::parse("http://example.org/a b"),
            Err(IriError::IllegalCharacter { ch: ' ', component: "path", .. })
        ));
        assert!(matches!(
            Iri::parse("http://example.org/<x>"),
            Err(IriError::IllegalCharacter { ch: '<', .. })
        ));
        assert!(matches!(
            Iri::parse("http://example.org/%zz"),
            Err(IriError::InvalidPercentEncoding { offset: 19, .. })
        ));
        assert!(matches!(
            Iri::parse("http://example.org/#a#b"),
            Err(IriError::IllegalCharacter { component: "fragment", .. })
        ));
        assert!(matches!(
            Iri::parse("1http://example.org/"),
            Err(IriError::InvalidScheme { .. })
        ));
        assert!(matches!(
            Iri::parse("http://example.org:99999/"),
            Err(IriError::InvalidPort { .. })
        ));
    }

    #[test]
    fn test_equality_ignores_scheme_and_host_case() {
        let a = iri("HTTP://Example.ORG/Path");
        let b = iri("http://example.org/Path");
        assert_eq!(a, b);
        assert_ne!(b, iri("http://example.org/path"));

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_ordering() {
        // opaque after hierarchical
        assert!(iri("urn:a") > iri("urn:/a"));
        // absent components sort lowest
        assert!(iri("http://a/b") < iri("http://a/b?q"));
        assert!(iri("http://a/b?q") < iri("http://a/b?q#f"));
        assert!(iri("b") < iri("http://a/"));
        assert!(iri("http://a:80/") > iri("http://a/"));
        assert!(iri("http://a/b") < iri("http://a/c"));
        assert!(iri("ftp://z/") < iri("http://a/"));
    }

    #[test]
    fn test_namespace_and_local_name() {
        let i = iri("http://example.org/foo#bar");
        assert_eq!(i.namespace(), "http://example.org/foo#");
        assert_eq!(i.local_name(), "bar");

        let j = iri("http://example.org/path/name");
        assert_eq!(j.namespace(), "http://example.org/path/");
        assert_eq!(j.local_name(), "name");
    }

    #[test]
    fn test_fragment_replacement() {
        let i = iri("http://example.org/doc?x#old");
        assert_eq!(i.without_fragment().as_str(), "http://example.org/doc?x");
        assert_eq!(i.with_fragment("new").unwrap().as_str(), "http://example.org/doc?x#new");
        assert!(i.with_fragment("a b").is_err());
    }
}

//! ASCII-safe projections of an identifier
//!
//! Hosts go through IDNA, the other components through UTF-8
//! percent-encoding of their non-ASCII characters. Each projection is
//! computed on first use and kept for the lifetime of the value.

use std::sync::OnceLock;

use percent_encoding::{utf8_percent_encode, CONTROLS};

use super::Iri;

#[derive(Debug, Clone, Default)]
pub(super) struct AsciiCache {
    userinfo: OnceLock<Option<String>>,
    host: OnceLock<Option<String>>,
    path: OnceLock<Option<String>>,
    query: OnceLock<Option<String>>,
    fragment: OnceLock<Option<String>>,
    full: OnceLock<String>,
}

fn encode_non_ascii(text: &str) -> String {
    utf8_percent_encode(text, CONTROLS).to_string()
}

fn ascii_host(host: &str) -> String {
    if host.is_ascii() {
        return host.to_string();
    }
    match url::Host::parse(host) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => encode_non_ascii(host),
    }
}

impl Iri {
    pub fn ascii_userinfo(&self) -> Option<&str> {
        self.ascii
            .userinfo
            .get_or_init(|| self.userinfo().map(encode_non_ascii))
            .as_deref()
    }

    /// Host with internationalized labels converted to punycode
    pub fn ascii_host(&self) -> Option<&str> {
        self.ascii
            .host
            .get_or_init(|| self.host().map(ascii_host))
            .as_deref()
    }

    pub fn ascii_path(&self) -> Option<&str> {
        self.ascii
            .path
            .get_or_init(|| self.path().map(encode_non_ascii))
            .as_deref()
    }

    pub fn ascii_query(&self) -> Option<&str> {
        self.ascii
            .query
            .get_or_init(|| self.query().map(encode_non_ascii))
            .as_deref()
    }

    pub fn ascii_fragment(&self) -> Option<&str> {
        self.ascii
            .fragment
            .get_or_init(|| self.fragment().map(encode_non_ascii))
            .as_deref()
    }

    /// The whole identifier as a URI (RFC 3986) string
    pub fn to_ascii_string(&self) -> &str {
        self.ascii.full.get_or_init(|| {
            if self.as_str().is_ascii() {
                return self.as_str().to_string();
            }

            let mut out = String::with_capacity(self.as_str().len() * 2);
            if let Some(scheme) = self.scheme() {
                out.push_str(scheme);
                out.push(':');
            }
            if let Some(opaque) = &self.opaque {
                out.push_str(&encode_non_ascii(opaque));
            } else {
                if self.authority().is_some() {
                    out.push_str("//");
                    if let Some(userinfo) = self.ascii_userinfo() {
                        out.push_str(userinfo);
                        out.push('@');
                    }
                    if let Some(host) = self.ascii_host() {
                        out.push_str(host);
                    }
                    if let Some(port) = self.port() {
                        out.push(':');
                        out.push_str(&port.to_string());
                    }
                }
                if let Some(path) = self.ascii_path() {
                    out.push_str(path);
                }
                if let Some(query) = self.ascii_query() {
                    out.push('?');
                    out.push_str(query);
                }
            }
            if let Some(fragment) = self.ascii_fragment() {
                out.push('#');
                out.push_str(fragment);
            }
            out
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_projection() {
        let i = Iri::parse("http://bücher.example/straße?q=ü#frag").unwrap();
        assert_eq!(i.ascii_host(), Some("xn--bcher-kva.example"));
        assert_eq!(i.ascii_path(), Some("/stra%C3%9Fe"));
        assert_eq!(i.ascii_query(), Some("q=%C3%BC"));
        assert_eq!(i.ascii_fragment(), Some("frag"));
        assert_eq!(
            i.to_ascii_string(),
            "http://xn--bcher-kva.example/stra%C3%9Fe?q=%C3%BC#frag"
        );
    }

    #[test]
    fn test_ascii_identifier_is_unchanged() {
        let i = Iri::parse("http://Example.org/a%20b").unwrap();
        assert_eq!(i.to_ascii_string(), "http://Example.org/a%20b");
        assert_eq!(i.ascii_host(), Some("Example.org"));
    }

    #[test]
    fn test_opaque_projection() {
        let i = Iri::parse("urn:x:café").unwrap();
        assert_eq!(i.to_ascii_string(), "urn:x:caf%C3%A9");
        assert_eq!(i.ascii_path(), None);
    }
}

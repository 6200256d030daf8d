//! Reference resolution and relativization (RFC 3986 section 5)

use std::borrow::Cow;

use super::{Iri, IriError};

impl Iri {
    /// Resolve `reference` against this identifier as base.
    ///
    /// Absolute references come back unchanged, as does every reference
    /// when the base is opaque. A reference with no authority, path or
    /// query addresses the base document itself and only swaps the
    /// fragment.
    pub fn resolve(&self, reference: &Iri) -> Iri {
        if reference.is_absolute() || self.is_opaque() {
            return reference.clone();
        }

        let ref_path = reference.path().unwrap_or("");
        if reference.authority.is_none() && ref_path.is_empty() && reference.query.is_none() {
            return self.replace_fragment(reference.fragment.clone());
        }

        let (authority, path) = if reference.authority.is_some() {
            (reference.authority.clone(), remove_dot_segments(ref_path))
        } else if ref_path.is_empty() {
            (self.authority.clone(), self.path().unwrap_or("").to_string())
        } else if ref_path.starts_with('/') {
            (self.authority.clone(), remove_dot_segments(ref_path))
        } else {
            (self.authority.clone(), remove_dot_segments(&self.merge(ref_path)))
        };

        Iri::assemble(
            self.scheme.clone(),
            None,
            authority,
            Some(path),
            reference.query.clone(),
            reference.fragment.clone(),
        )
    }

    /// Parse `reference` and resolve it against this base
    pub fn resolve_str(&self, reference: &str) -> Result<Iri, IriError> {
        Ok(self.resolve(&Iri::parse(reference)?))
    }

    /// Express `target` relative to this base.
    ///
    /// Returns `target` unchanged when either side is opaque, when scheme or
    /// authority differ, or when the target does not live under the base
    /// directory.
    pub fn relativize(&self, target: &Iri) -> Iri {
        if self.is_opaque() || target.is_opaque() {
            return target.clone();
        }
        let same_scheme = match (self.scheme(), target.scheme()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };
        let same_authority = match (self.authority(), target.authority()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };
        if !same_scheme || !same_authority {
            return target.clone();
        }

        let base_path = remove_dot_segments(self.path().unwrap_or(""));
        let target_path = remove_dot_segments(target.path().unwrap_or(""));

        let relative = if base_path == target_path {
            if target.query.is_some() || self.query.is_none() {
                String::new()
            } else {
                // Drop the base query by naming the last segment
                match target_path.rfind('/') {
                    Some(slash) if slash + 1 < target_path.len() => {
                        guard_colon(&target_path[slash + 1..])
                    }
                    _ => "./".to_string(),
                }
            }
        } else {
            let directory = base_directory(&base_path, self.authority.is_some());
            match target_path.strip_prefix(directory) {
                Some("") => "./".to_string(),
                Some(rest) => guard_colon(rest),
                None => return target.clone(),
            }
        };

        Iri::assemble(
            None,
            None,
            None,
            Some(relative),
            target.query.clone(),
            target.fragment.clone(),
        )
    }

    fn merge(&self, reference_path: &str) -> String {
        let base_path = self.path().unwrap_or("");
        if self.authority.is_some() && base_path.is_empty() {
            format!("/{reference_path}")
        } else {
            match base_path.rfind('/') {
                Some(slash) => format!("{}{}", &base_path[..=slash], reference_path),
                None => reference_path.to_string(),
            }
        }
    }
}

fn base_directory(path: &str, has_authority: bool) -> &str {
    if path.is_empty() && has_authority {
        return "/";
    }
    match path.rfind('/') {
        Some(slash) => &path[..=slash],
        None => "",
    }
}

/// A first segment containing `:` would read as a scheme
fn guard_colon(relative: &str) -> String {
    let first_segment = relative.split('/').next().unwrap_or("");
    if first_segment.contains(':') {
        format!("./{relative}")
    } else {
        relative.to_string()
    }
}

/// RFC 3986 section 5.2.4, normalizing percent escapes in every segment
/// that survives.
pub(crate) fn remove_dot_segments(path: &str) -> String {
    let mut input = path;
    let mut output = String::with_capacity(path.len());

    while !input.is_empty() {
        if let Some(rest) = input.strip_prefix("../") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix("./") {
            input = rest;
        } else if input.starts_with("/./") {
            input = &input[2..];
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") {
            input = &input[3..];
            pop_segment(&mut output);
        } else if input == "/.." {
            input = "/";
            pop_segment(&mut output);
        } else if input == "." || input == ".." {
            input = "";
        } else {
            let start = usize::from(input.starts_with('/'));
            let end = input[start..]
                .find('/')
                .map_or(input.len(), |i| i + start);
            output.push_str(&input[..start]);
            output.push_str(&normalize_segment(&input[start..end]));
            input = &input[end..];
        }
    }

    output
}

fn pop_segment(output: &mut String) {
    match output.rfind('/') {
        Some(slash) => output.truncate(slash),
        None => output.clear(),
    }
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Decodes escapes of unreserved ASCII and upper-cases all others
fn normalize_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains('%') {
        return Cow::Borrowed(segment);
    }

    let bytes = segment.as_bytes();
    let mut out = String::with_capacity(segment.len());
    let mut last = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push_str(&segment[last..i]);
                let decoded = hi * 16 + lo;
                if decoded.is_ascii_alphanumeric() || matches!(decoded, b'-' | b'.' | b'_' | b'~') {
                    out.push(decoded as char);
                } else {
                    out.push('%');
                    out.push(bytes[i + 1].to_ascii_uppercase() as char);
                    out.push(bytes[i + 2].to_ascii_uppercase() as char);
                }
                i += 3;
                last = i;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&segment[last..]);
    Cow::Owned(out)
}

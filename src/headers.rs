use std::fmt;
use std::hash::{Hash, Hasher};

use crate::message::CRLF;

/// A header field name. Comparison and hashing ignore ASCII case, but the
/// spelling it was created with is kept for serialization.
#[derive(Debug, Clone)]
pub struct HeaderName(String);

impl HeaderName {
    pub fn new<N: Into<String>>(src: N) -> Self {
        Self(src.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for HeaderName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for HeaderName {}

impl PartialEq<str> for HeaderName {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl Hash for HeaderName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Header fields of a message, at most one value per name.
///
/// Entries keep insertion order, so serialization is deterministic. Setting a
/// name that is already present (in any casing) replaces the old entry in place.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(HeaderName, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set<N: AsRef<str>, V: Into<String>>(&mut self, name: N, value: V) {
        let name = HeaderName::new(name.as_ref());
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => *entry = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if `name` is present and, when `candidates` is non-empty, its value
    /// equals one of them exactly.
    pub fn matches(&self, name: &str, candidates: &[&str]) -> bool {
        match self.get(name) {
            Some(value) => candidates.is_empty() || candidates.iter().any(|c| *c == value),
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &str)> {
        self.entries.iter().map(|(n, v)| (n, v.as_str()))
    }

    /// Renders `Name: value` lines, each one terminated by CRLF.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.entries
            .iter()
            .map(|(n, v)| format!("{}: {}{}", n, v, CRLF))
            .collect::<String>()
            .into_bytes()
    }
}

impl PartialEq for Headers {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.get(name.as_str()) == Some(value))
    }
}

impl Eq for Headers {}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

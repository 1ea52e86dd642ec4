use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Bytes that appear unescaped in the text form of a name component.
fn is_unescaped(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'~' | b'-')
}

/// Hierarchical content name.
///
/// A `Name` is an ordered sequence of opaque, non-empty byte-string
/// components. Components carry no character-set assumption; ordering and
/// equality are component-wise on raw bytes.
///
/// The canonical text form is `/<c1>/<c2>/...`, with every byte outside
/// `[A-Za-z0-9._~-]` percent-escaped as `%XX` (uppercase hex). The empty
/// name renders as `/`. Because `%` and `/` are always escaped inside
/// components, [`Name::parse`] inverts [`Name::to_uri`] exactly.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Name {
    components: Vec<Vec<u8>>,
}

impl Name {
    /// The empty name (zero components).
    pub fn empty() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Build a name from raw components. Empty components are rejected:
    /// they would collide with the empty name in the text form.
    pub fn from_components<I, C>(components: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        let components: Vec<Vec<u8>> = components.into_iter().map(Into::into).collect();
        if components.iter().any(|c| c.is_empty()) {
            return Err(TypeError::InvalidUri("empty name component".into()));
        }
        Ok(Self { components })
    }

    /// Parse the canonical text form. The input must start with `/`.
    pub fn parse(uri: &str) -> Result<Self, TypeError> {
        let rest = uri
            .strip_prefix('/')
            .ok_or_else(|| TypeError::InvalidUri(format!("missing leading '/': {uri}")))?;
        if rest.is_empty() {
            return Ok(Self::empty());
        }
        let mut components = Vec::new();
        for raw in rest.split('/') {
            if raw.is_empty() {
                return Err(TypeError::InvalidUri("empty name component".into()));
            }
            components.push(unescape(raw)?);
        }
        Ok(Self { components })
    }

    /// Canonical text form of this name.
    pub fn to_uri(&self) -> String {
        if self.components.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for component in &self.components {
            out.push('/');
            for &b in component {
                if is_unescaped(b) {
                    out.push(b as char);
                } else {
                    out.push_str(&format!("%{b:02X}"));
                }
            }
        }
        out
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if this name has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The raw components, in order.
    pub fn components(&self) -> &[Vec<u8>] {
        &self.components
    }
}

fn unescape(raw: &str) -> Result<Vec<u8>, TypeError> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16));
            let lo = bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16));
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    out.push((hi * 16 + lo) as u8);
                    i += 3;
                }
                _ => return Err(TypeError::InvalidEscape { offset: i }),
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uri())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.to_uri())
    }
}

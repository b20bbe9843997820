//! Composite URL encoding and decoding.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

const SEPARATOR: char = ';';

static NAMED_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_-]+)=(.*)$").expect("named segment pattern compiles")
});

static ROUTER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("router name pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositeUrlError {
    #[error("composite URL has more than one unnamed segment")]
    DuplicatePrimary,
    #[error("router `{name}` appears more than once")]
    DuplicateRouter { name: String },
    #[error("invalid router name `{name}`")]
    InvalidName { name: String },
    #[error("empty segment in composite URL")]
    EmptySegment,
    #[error("URL `{url}` contains the segment separator `;`")]
    ReservedSeparator { url: String },
    #[error("primary URL `{url}` would decode as a named segment")]
    AmbiguousPrimary { url: String },
}

/// Ordered `(router name, url)` pairs. The primary router's name is `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeUrl {
    pairs: Vec<(String, String)>,
}

impl CompositeUrl {
    /// Decode a composite string. An empty string addresses `/` on the
    /// primary router.
    pub fn decode(input: &str) -> Result<Self, CompositeUrlError> {
        if input.is_empty() {
            return Ok(Self {
                pairs: vec![(String::new(), "/".to_string())],
            });
        }

        let mut composite = Self::default();
        for segment in input.split(SEPARATOR) {
            if segment.is_empty() {
                return Err(CompositeUrlError::EmptySegment);
            }
            let (name, url) = match NAMED_SEGMENT.captures(segment) {
                Some(caps) => (caps[1].to_string(), caps[2].to_string()),
                None => (String::new(), segment.to_string()),
            };
            composite.insert(name, url)?;
        }
        Ok(composite)
    }

    /// Build from pairs, checking that the result encodes unambiguously.
    pub fn from_pairs<I, N, U>(pairs: I) -> Result<Self, CompositeUrlError>
    where
        I: IntoIterator<Item = (N, U)>,
        N: Into<String>,
        U: Into<String>,
    {
        let mut composite = Self::default();
        for (name, url) in pairs {
            let (name, url) = (name.into(), url.into());
            if !name.is_empty() && !ROUTER_NAME.is_match(&name) {
                return Err(CompositeUrlError::InvalidName { name });
            }
            if url.contains(SEPARATOR) {
                return Err(CompositeUrlError::ReservedSeparator { url });
            }
            if name.is_empty() && NAMED_SEGMENT.is_match(&url) {
                return Err(CompositeUrlError::AmbiguousPrimary { url });
            }
            composite.insert(name, url)?;
        }
        Ok(composite)
    }

    fn insert(&mut self, name: String, url: String) -> Result<(), CompositeUrlError> {
        if url.is_empty() {
            return Err(CompositeUrlError::EmptySegment);
        }
        if self.pairs.iter().any(|(existing, _)| *existing == name) {
            return Err(if name.is_empty() {
                CompositeUrlError::DuplicatePrimary
            } else {
                CompositeUrlError::DuplicateRouter { name }
            });
        }
        self.pairs.push((name, url));
        Ok(())
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn primary(&self) -> Option<&str> {
        self.get("")
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, url)| url.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, u)| (n.as_str(), u.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for CompositeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let primary = self.pairs.iter().filter(|(n, _)| n.is_empty());
        let named = self.pairs.iter().filter(|(n, _)| !n.is_empty());
        for (i, (name, url)) in primary.chain(named).enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            if name.is_empty() {
                f.write_str(url)?;
            } else {
                write!(f, "{name}={url}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for CompositeUrl {
    type Err = CompositeUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl IntoIterator for CompositeUrl {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

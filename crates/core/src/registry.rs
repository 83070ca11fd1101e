//! Namespaced registry keys for items, fluids and recipes.
//!
//! Vanilla content lives under `minecraft:`; everything the mod adds
//! (`traincraft:diesel`, `traincraft:oil_sands`) may omit its namespace in
//! data packs. Keys persist in records as their `namespace:path` string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Namespace assumed when a key has no `namespace:` prefix.
pub const DEFAULT_NAMESPACE: &str = "traincraft";

/// Which half of a key failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPart {
    /// Before the colon.
    Namespace,
    /// After the colon.
    Path,
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyPart::Namespace => "namespace",
            KeyPart::Path => "path",
        })
    }
}

/// Reasons a string is not a valid [`RegistryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryKeyError {
    /// A key part is empty (`"traincraft:"`, `":diesel"`, `""`).
    #[error("registry key {0} is empty")]
    Empty(KeyPart),
    /// A key part contains a character outside its allowed set.
    #[error("registry key {part} has invalid character {found:?}")]
    InvalidChar {
        /// Offending part.
        part: KeyPart,
        /// First rejected character.
        found: char,
    },
}

/// A `namespace:path` key. Orders by namespace, then path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistryKey {
    namespace: String,
    path: String,
}

impl RegistryKey {
    /// Parse `namespace:path`, or a bare `path` in [`DEFAULT_NAMESPACE`].
    pub fn parse(input: &str) -> Result<Self, RegistryKeyError> {
        let (namespace, path) = input
            .trim()
            .split_once(':')
            .unwrap_or((DEFAULT_NAMESPACE, input.trim()));
        check_part(KeyPart::Namespace, namespace)?;
        check_part(KeyPart::Path, path)?;
        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Namespace half.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Path half.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Lowercase resource-location characters; paths may also nest with `/`.
fn check_part(part: KeyPart, value: &str) -> Result<(), RegistryKeyError> {
    if value.is_empty() {
        return Err(RegistryKeyError::Empty(part));
    }
    let allowed = |c: char| {
        matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.') || (c == '/' && part == KeyPart::Path)
    };
    match value.chars().find(|&c| !allowed(c)) {
        Some(found) => Err(RegistryKeyError::InvalidChar { part, found }),
        None => Ok(()),
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for RegistryKey {
    type Err = RegistryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RegistryKey {
    type Error = RegistryKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RegistryKey> for String {
    fn from(key: RegistryKey) -> Self {
        key.to_string()
    }
}

//! Structured key-value tag data.
//!
//! Tags carry optional item/fluid data (enchantments, contained fluid, ...)
//! and are the record format block entities save to and load from. Keys are
//! kept sorted so encoding is deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single tag value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// 8-bit signed integer (also used for booleans).
    Byte(i8),
    /// 16-bit signed integer.
    Short(i16),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered list of tags.
    List(Vec<Tag>),
    /// Nested compound.
    Compound(Compound),
}

/// A compound of named tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Compound(BTreeMap<String, Tag>);

impl Compound {
    /// Create an empty compound.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a value, returning the previous one under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Tag>) -> Option<Tag> {
        self.0.insert(key.into(), value.into())
    }

    /// Raw access to a tag.
    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.0.get(key)
    }

    /// Remove a tag.
    pub fn remove(&mut self, key: &str) -> Option<Tag> {
        self.0.remove(key)
    }

    /// Whether a tag exists under `key`, regardless of its type.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the compound has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Tag)> {
        self.0.iter()
    }

    /// Read a byte; `None` when absent or of another type.
    pub fn get_byte(&self, key: &str) -> Option<i8> {
        match self.get(key)? {
            Tag::Byte(v) => Some(*v),
            _ => None,
        }
    }

    /// Read a boolean stored as a byte.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_byte(key).map(|v| v != 0)
    }

    /// Read a short; `None` when absent or of another type.
    pub fn get_short(&self, key: &str) -> Option<i16> {
        match self.get(key)? {
            Tag::Short(v) => Some(*v),
            _ => None,
        }
    }

    /// Read an int; `None` when absent or of another type.
    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.get(key)? {
            Tag::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Read a long; `None` when absent or of another type.
    pub fn get_long(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Tag::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Read a string; `None` when absent or of another type.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Tag::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Read a nested compound; `None` when absent or of another type.
    pub fn get_compound(&self, key: &str) -> Option<&Compound> {
        match self.get(key)? {
            Tag::Compound(v) => Some(v),
            _ => None,
        }
    }

    /// Read a list; `None` when absent or of another type.
    pub fn get_list(&self, key: &str) -> Option<&[Tag]> {
        match self.get(key)? {
            Tag::List(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

impl FromIterator<(String, Tag)> for Compound {
    fn from_iter<I: IntoIterator<Item = (String, Tag)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

macro_rules! impl_tag_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Tag {
            fn from(value: $ty) -> Self {
                Tag::$variant(value)
            }
        })*
    };
}

impl_tag_from! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    Vec<Tag> => List,
    Compound => Compound,
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::String(value.to_string())
    }
}

impl From<bool> for Tag {
    fn from(value: bool) -> Self {
        Tag::Byte(value as i8)
    }
}

//! Item stacks.

use crate::registry::RegistryKey;
use crate::tag::{Compound, Tag};
use serde::{Deserialize, Serialize};

/// A stack of items held in a slot.
///
/// Empty slots are represented as `Option::None` by containers; a stack whose
/// count reaches zero is considered empty and must be cleared by its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item identity.
    pub item: RegistryKey,
    /// Number of items in this stack.
    pub count: u32,
    /// Damage / variant value.
    #[serde(default)]
    pub damage: u16,
    /// Optional tag data.
    #[serde(default)]
    pub tag: Option<Compound>,
}

impl ItemStack {
    /// Create an untagged, undamaged stack.
    pub fn new(item: RegistryKey, count: u32) -> Self {
        Self {
            item,
            count,
            damage: 0,
            tag: None,
        }
    }

    /// Builder-style damage setter.
    pub fn with_damage(mut self, damage: u16) -> Self {
        self.damage = damage;
        self
    }

    /// Builder-style tag setter.
    pub fn with_tag(mut self, tag: Compound) -> Self {
        self.tag = Some(tag);
        self
    }

    /// A copy of this stack with another count.
    pub fn copy_with_count(&self, count: u32) -> Self {
        Self {
            count,
            ..self.clone()
        }
    }

    /// True when the stack holds no items.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Same item identity and damage, ignoring count and tag.
    pub fn is_same_item(&self, other: &ItemStack) -> bool {
        self.item == other.item && self.damage == other.damage
    }

    /// Tag equality; an absent tag equals an empty compound.
    pub fn tags_equal(&self, other: &ItemStack) -> bool {
        let empty = Compound::new();
        self.tag.as_ref().unwrap_or(&empty) == other.tag.as_ref().unwrap_or(&empty)
    }

    /// Whether both stacks can share a slot (identity, damage and tag match).
    pub fn can_merge(&self, other: &ItemStack) -> bool {
        self.is_same_item(other) && self.tags_equal(other)
    }

    /// Increase the count.
    pub fn grow(&mut self, amount: u32) {
        self.count = self.count.saturating_add(amount);
    }

    /// Decrease the count, never below zero. Returns how many were removed.
    pub fn shrink(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.count);
        self.count -= removed;
        removed
    }

    /// Encode into a record compound (`id`, `Count`, `Damage`, optional `tag`).
    pub fn to_compound(&self) -> Compound {
        let mut comp = Compound::new();
        comp.insert("id", self.item.to_string());
        comp.insert("Count", self.count.min(i32::MAX as u32) as i32);
        comp.insert("Damage", self.damage as i16);
        if let Some(tag) = &self.tag {
            comp.insert("tag", tag.clone());
        }
        comp
    }

    /// Decode from a record compound. Returns `None` when the identity is
    /// missing or invalid; a non-positive count yields `None` as well since
    /// the slot is then empty.
    pub fn from_compound(comp: &Compound) -> Option<Self> {
        let item = RegistryKey::parse(comp.get_str("id")?).ok()?;
        let count = comp.get_int("Count")?;
        if count <= 0 {
            return None;
        }
        let damage = comp.get_short("Damage").unwrap_or(0) as u16;
        let tag = match comp.get("tag") {
            Some(Tag::Compound(tag)) => Some(tag.clone()),
            _ => None,
        };
        Some(Self {
            item,
            count: count as u32,
            damage,
            tag,
        })
    }
}

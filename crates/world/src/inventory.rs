//! Fixed-size slot inventories and the item-handler interface used by
//! automation.
//!
//! Provides slot storage with stack merging/shrinking, record encoding, and
//! per-slot access flags.

use crate::item_registry::ItemRegistry;
use crate::Action;
use bitflags::bitflags;
use traincraft_core::{Compound, ItemStack, Tag};

bitflags! {
    /// Which directions automation may move items through a slot.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SlotAccess: u8 {
        /// Items may be inserted from outside.
        const INSERT = 1 << 0;
        /// Items may be extracted from outside.
        const EXTRACT = 1 << 1;
    }
}

/// Slot-level interface exposed to automation (hoppers, pipes, ...).
pub trait ItemHandler {
    /// Number of slots visible through this handler.
    fn slots(&self) -> usize;

    /// Contents of a slot.
    fn stack_in_slot(&self, slot: usize) -> Option<&ItemStack>;

    /// Insert `stack`, returning whatever did not fit.
    fn insert_item(&mut self, slot: usize, stack: ItemStack, action: Action) -> Option<ItemStack>;

    /// Extract up to `amount` items.
    fn extract_item(&mut self, slot: usize, amount: u32, action: Action) -> Option<ItemStack>;
}

/// Whether two slot contents can be combined into one slot.
///
/// Either side empty always merges; otherwise identity, damage and tag must
/// match and the combined count must fit the smaller stack limit.
pub fn can_stacks_merge(
    a: Option<&ItemStack>,
    b: Option<&ItemStack>,
    registry: &ItemRegistry,
) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return true;
    };
    if a.is_empty() || b.is_empty() {
        return true;
    }
    if !a.can_merge(b) {
        return false;
    }
    let limit = registry.max_stack_size(a).min(registry.max_stack_size(b));
    a.count.saturating_add(b.count) <= limit
}

/// Inventory with a fixed number of slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the inventory has zero slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Get an item stack from a slot.
    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot)?.as_ref()
    }

    /// Set a slot. Empty stacks clear it. Returns false when out of range.
    pub fn set(&mut self, slot: usize, stack: Option<ItemStack>) -> bool {
        let Some(entry) = self.slots.get_mut(slot) else {
            return false;
        };
        *entry = stack.filter(|s| !s.is_empty());
        true
    }

    /// Take an item stack from a slot, leaving it empty.
    pub fn take(&mut self, slot: usize) -> Option<ItemStack> {
        self.slots.get_mut(slot)?.take()
    }

    /// Remove up to `amount` items from a slot, clearing it when it runs out.
    /// Returns how many were removed.
    pub fn shrink(&mut self, slot: usize, amount: u32) -> u32 {
        let Some(entry) = self.slots.get_mut(slot) else {
            return 0;
        };
        let Some(stack) = entry.as_mut() else {
            return 0;
        };
        let removed = stack.shrink(amount);
        if stack.is_empty() {
            *entry = None;
        }
        removed
    }

    /// Merge `stack` into a slot without limit checks; callers check
    /// [`can_stacks_merge`] first.
    pub fn merge_into(&mut self, slot: usize, stack: ItemStack) {
        match self.slots.get_mut(slot) {
            Some(Some(existing)) => existing.grow(stack.count),
            Some(entry) => *entry = Some(stack).filter(|s| !s.is_empty()),
            None => {}
        }
    }

    /// Remove every stack.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Iterate slots in order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&ItemStack>> {
        self.slots.iter().map(Option::as_ref)
    }

    /// Encode non-empty slots as a list of compounds carrying a `Slot` byte.
    pub fn to_tag_list(&self) -> Vec<Tag> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let stack = slot.as_ref()?;
                let mut comp = stack.to_compound();
                comp.insert("Slot", index as i8);
                Some(Tag::Compound(comp))
            })
            .collect()
    }

    /// Replace the contents from a slot list. Entries that are not
    /// compounds are reported by index; out-of-range slots and malformed
    /// stacks are skipped.
    pub fn load_tag_list(&mut self, list: &[Tag]) -> Result<(), usize> {
        let mut loaded = Inventory::new(self.len());
        for (index, entry) in list.iter().enumerate() {
            let Tag::Compound(comp) = entry else {
                return Err(index);
            };
            load_slot(&mut loaded, comp);
        }
        *self = loaded;
        Ok(())
    }
}

fn load_slot(inventory: &mut Inventory, comp: &Compound) {
    let Some(slot) = comp.get_byte("Slot") else {
        return;
    };
    if slot < 0 || slot as usize >= inventory.len() {
        tracing::debug!(slot, "skipping out-of-range slot in record");
        return;
    }
    if let Some(stack) = ItemStack::from_compound(comp) {
        inventory.set(slot as usize, Some(stack));
    }
}

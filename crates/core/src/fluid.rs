//! Fluid stacks.

use crate::registry::RegistryKey;
use crate::tag::{Compound, Tag};
use serde::{Deserialize, Serialize};

/// Amount of fluid held by one bucket, in millibuckets.
pub const BUCKET_VOLUME: u32 = 1000;

/// A quantity of a single fluid kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidStack {
    /// Fluid identity.
    pub fluid: RegistryKey,
    /// Amount in millibuckets.
    pub amount: u32,
    /// Optional tag data; part of the fluid's kind.
    #[serde(default)]
    pub tag: Option<Compound>,
}

impl FluidStack {
    /// Create an untagged fluid stack.
    pub fn new(fluid: RegistryKey, amount: u32) -> Self {
        Self {
            fluid,
            amount,
            tag: None,
        }
    }

    /// A copy of this stack with another amount.
    pub fn copy_with_amount(&self, amount: u32) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }

    /// Same fluid kind: identity and tag (absent tag equals empty tag).
    pub fn is_fluid_equal(&self, other: &FluidStack) -> bool {
        let empty = Compound::new();
        self.fluid == other.fluid
            && self.tag.as_ref().unwrap_or(&empty) == other.tag.as_ref().unwrap_or(&empty)
    }

    /// Encode into a record compound (`FluidName`, `Amount`, optional `Tag`).
    pub fn to_compound(&self) -> Compound {
        let mut comp = Compound::new();
        comp.insert("FluidName", self.fluid.to_string());
        comp.insert("Amount", self.amount.min(i32::MAX as u32) as i32);
        if let Some(tag) = &self.tag {
            comp.insert("Tag", tag.clone());
        }
        comp
    }

    /// Decode from a record compound; `None` when malformed or empty.
    pub fn from_compound(comp: &Compound) -> Option<Self> {
        let fluid = RegistryKey::parse(comp.get_str("FluidName")?).ok()?;
        let amount = comp.get_int("Amount")?;
        if amount <= 0 {
            return None;
        }
        let tag = match comp.get("Tag") {
            Some(Tag::Compound(tag)) => Some(tag.clone()),
            _ => None,
        };
        Some(Self {
            fluid,
            amount: amount as u32,
            tag,
        })
    }
}

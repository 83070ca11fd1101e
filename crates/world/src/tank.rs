//! Fluid tanks and the fluid-handler interface.
//!
//! A [`FluidTank`] holds at most one fluid kind up to a fixed capacity.
//! External callers only reach it through [`FluidHandler`], which validates
//! kind and capacity on every fill and drain.

use crate::item_registry::{FluidContainerSpec, CONTAINER_FLUID_TAG};
use crate::Action;
use serde::{Deserialize, Serialize};
use traincraft_core::{Compound, FluidStack, ItemStack};

/// Anything that can accept or give up fluid.
pub trait FluidHandler {
    /// Current contents, if any.
    fn fluid(&self) -> Option<&FluidStack>;

    /// Maximum amount held.
    fn capacity(&self) -> u32;

    /// Fill with up to `resource.amount`; returns the amount accepted.
    fn fill(&mut self, resource: &FluidStack, action: Action) -> u32;

    /// Drain up to `max_amount` of whatever is held.
    fn drain(&mut self, max_amount: u32, action: Action) -> Option<FluidStack>;

    /// Drain up to `resource.amount`, only if the held fluid is of the same kind.
    fn drain_matching(&mut self, resource: &FluidStack, action: Action) -> Option<FluidStack> {
        match self.fluid() {
            Some(held) if held.is_fluid_equal(resource) => self.drain(resource.amount, action),
            _ => None,
        }
    }

    /// Amount currently held.
    fn amount(&self) -> u32 {
        self.fluid().map(|f| f.amount).unwrap_or(0)
    }
}

/// Single-fluid tank with a fixed capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidTank {
    fluid: Option<FluidStack>,
    capacity: u32,
}

impl FluidTank {
    /// Create an empty tank.
    pub fn new(capacity: u32) -> Self {
        Self {
            fluid: None,
            capacity,
        }
    }

    /// Whether the tank holds no fluid.
    pub fn is_empty(&self) -> bool {
        self.fluid.is_none()
    }

    /// Replace the contents. Empty stacks clear the tank.
    pub fn set_fluid(&mut self, fluid: Option<FluidStack>) {
        self.fluid = fluid.filter(|f| f.amount > 0);
    }

    /// Whether `fluid` is of a kind this tank can currently take.
    pub fn can_fill_fluid_type(&self, fluid: &FluidStack) -> bool {
        self.fluid
            .as_ref()
            .map_or(true, |held| held.is_fluid_equal(fluid))
    }

    /// Whether the whole of `fluid` fits: nothing to add, or a compatible kind
    /// with enough free capacity.
    pub fn can_accept(&self, fluid: Option<&FluidStack>) -> bool {
        let Some(fluid) = fluid else {
            return true;
        };
        self.can_fill_fluid_type(fluid)
            && self.amount().saturating_add(fluid.amount) <= self.capacity
    }

    /// Encode into a record compound; `None` when empty.
    pub fn to_compound(&self) -> Option<Compound> {
        self.fluid.as_ref().map(FluidStack::to_compound)
    }
}

impl FluidHandler for FluidTank {
    fn fluid(&self) -> Option<&FluidStack> {
        self.fluid.as_ref()
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn fill(&mut self, resource: &FluidStack, action: Action) -> u32 {
        if resource.amount == 0 || !self.can_fill_fluid_type(resource) {
            return 0;
        }
        let filled = resource.amount.min(self.capacity.saturating_sub(self.amount()));
        if filled > 0 && action.execute() {
            match &mut self.fluid {
                Some(held) => held.amount += filled,
                None => self.fluid = Some(resource.copy_with_amount(filled)),
            }
        }
        filled
    }

    fn drain(&mut self, max_amount: u32, action: Action) -> Option<FluidStack> {
        let held = self.fluid.as_mut()?;
        let drained = max_amount.min(held.amount);
        if drained == 0 {
            return None;
        }
        let out = held.copy_with_amount(drained);
        if action.execute() {
            held.amount -= drained;
            if held.amount == 0 {
                self.fluid = None;
            }
        }
        Some(out)
    }
}

/// Fluid-container capability of a single item, storing its contents in the
/// item's tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFluidHandler {
    container: ItemStack,
    spec: FluidContainerSpec,
    contents: Option<FluidStack>,
}

impl ItemFluidHandler {
    /// Wrap a single container item.
    pub fn new(container: ItemStack, spec: FluidContainerSpec) -> Self {
        let contents = container
            .tag
            .as_ref()
            .and_then(|tag| tag.get_compound(CONTAINER_FLUID_TAG))
            .and_then(FluidStack::from_compound);
        Self {
            container,
            spec,
            contents,
        }
    }

    /// The container item reflecting every executed fill and drain.
    pub fn container(&self) -> &ItemStack {
        &self.container
    }

    fn write_contents(&mut self) {
        let mut tag = self.container.tag.take().unwrap_or_default();
        match &self.contents {
            Some(fluid) => {
                tag.insert(CONTAINER_FLUID_TAG, fluid.to_compound());
            }
            None => {
                tag.remove(CONTAINER_FLUID_TAG);
            }
        }
        self.container.tag = (!tag.is_empty()).then_some(tag);
    }
}

impl FluidHandler for ItemFluidHandler {
    fn fluid(&self) -> Option<&FluidStack> {
        self.contents.as_ref()
    }

    fn capacity(&self) -> u32 {
        self.spec.capacity
    }

    fn fill(&mut self, resource: &FluidStack, action: Action) -> u32 {
        if resource.amount == 0 || self.container.count != 1 {
            return 0;
        }
        let held = self.amount();
        if let Some(contents) = &self.contents {
            if !contents.is_fluid_equal(resource) {
                return 0;
            }
        }
        let filled = if self.spec.whole_only {
            if held > 0 || resource.amount < self.spec.capacity {
                return 0;
            }
            self.spec.capacity
        } else {
            resource.amount.min(self.spec.capacity.saturating_sub(held))
        };
        if filled > 0 && action.execute() {
            self.contents = Some(resource.copy_with_amount(held + filled));
            self.write_contents();
        }
        filled
    }

    fn drain(&mut self, max_amount: u32, action: Action) -> Option<FluidStack> {
        let contents = self.contents.as_ref()?;
        let drained = if self.spec.whole_only {
            if max_amount < contents.amount {
                return None;
            }
            contents.amount
        } else {
            max_amount.min(contents.amount)
        };
        if drained == 0 {
            return None;
        }
        let out = contents.copy_with_amount(drained);
        if action.execute() {
            let remaining = contents.amount - drained;
            self.contents = (remaining > 0).then(|| out.copy_with_amount(remaining));
            self.write_contents();
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traincraft_core::RegistryKey;

    fn fluid(s: &str, amount: u32) -> FluidStack {
        FluidStack::new(RegistryKey::parse(s).unwrap(), amount)
    }

    #[test]
    fn tank_fill_respects_capacity_and_kind() {
        let mut tank = FluidTank::new(1000);
        assert_eq!(tank.fill(&fluid("traincraft:diesel", 600), Action::Execute), 600);
        assert_eq!(tank.fill(&fluid("traincraft:diesel", 600), Action::Simulate), 400);
        assert_eq!(tank.amount(), 600);
        assert_eq!(tank.fill(&fluid("minecraft:water", 100), Action::Execute), 0);
        assert_eq!(tank.fill(&fluid("traincraft:diesel", 600), Action::Execute), 400);
        assert_eq!(tank.amount(), 1000);
    }

    #[test]
    fn tank_drain_clears_when_empty() {
        let mut tank = FluidTank::new(1000);
        tank.set_fluid(Some(fluid("traincraft:diesel", 300)));
        let simulated = tank.drain(500, Action::Simulate).unwrap();
        assert_eq!(simulated.amount, 300);
        assert_eq!(tank.amount(), 300);

        assert!(tank.drain_matching(&fluid("minecraft:water", 100), Action::Execute).is_none());
        let drained = tank.drain(500, Action::Execute).unwrap();
        assert_eq!(drained.amount, 300);
        assert!(tank.is_empty());
        assert!(tank.drain(1, Action::Execute).is_none());
    }

    #[test]
    fn can_accept_checks_kind_and_room() {
        let mut tank = FluidTank::new(100);
        assert!(tank.can_accept(None));
        assert!(tank.can_accept(Some(&fluid("traincraft:diesel", 100))));
        assert!(!tank.can_accept(Some(&fluid("traincraft:diesel", 101))));
        tank.set_fluid(Some(fluid("traincraft:diesel", 60)));
        assert!(tank.can_accept(Some(&fluid("traincraft:diesel", 40))));
        assert!(!tank.can_accept(Some(&fluid("traincraft:diesel", 41))));
        assert!(!tank.can_accept(Some(&fluid("minecraft:water", 1))));
    }

    #[test]
    fn bucket_fills_whole_capacity_only() {
        let spec = FluidContainerSpec {
            capacity: 1000,
            whole_only: true,
        };
        let bucket = ItemStack::new(RegistryKey::parse("minecraft:bucket").unwrap(), 1);
        let mut handler = ItemFluidHandler::new(bucket, spec);

        assert_eq!(handler.fill(&fluid("traincraft:diesel", 999), Action::Execute), 0);
        assert_eq!(handler.fill(&fluid("traincraft:diesel", 5000), Action::Execute), 1000);
        assert_eq!(handler.fill(&fluid("traincraft:diesel", 5000), Action::Execute), 0);

        let tag = handler.container().tag.clone().unwrap();
        let stored = tag.get_compound(CONTAINER_FLUID_TAG).unwrap();
        assert_eq!(stored.get_int("Amount"), Some(1000));

        // Re-wrapping the filled item sees its contents.
        let rewrapped = ItemFluidHandler::new(handler.container().clone(), spec);
        assert_eq!(rewrapped.amount(), 1000);
    }

    #[test]
    fn canister_fills_partially_and_drains_back_to_plain_item() {
        let spec = FluidContainerSpec {
            capacity: 4000,
            whole_only: false,
        };
        let canister = ItemStack::new(RegistryKey::parse("traincraft:canister").unwrap(), 1);
        let mut handler = ItemFluidHandler::new(canister.clone(), spec);

        assert_eq!(handler.fill(&fluid("traincraft:diesel", 2500), Action::Execute), 2500);
        assert_eq!(handler.fill(&fluid("traincraft:diesel", 2500), Action::Simulate), 1500);
        assert_eq!(handler.fill(&fluid("minecraft:water", 10), Action::Execute), 0);

        let drained = handler.drain(4000, Action::Execute).unwrap();
        assert_eq!(drained.amount, 2500);
        assert_eq!(handler.container(), &canister);
    }
}

//! Item descriptors: stack limits, fuel values and fluid-container capability.

use crate::tank::ItemFluidHandler;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use traincraft_core::{ItemStack, RegistryKey};

/// Maximum stack size for items without an explicit limit.
pub const DEFAULT_STACK_SIZE: u32 = 64;

/// Tag key under which a fluid container stores its contents.
pub const CONTAINER_FLUID_TAG: &str = "Fluid";

fn default_max_stack_size() -> u32 {
    DEFAULT_STACK_SIZE
}

/// Fluid-container capability of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluidContainerSpec {
    /// Capacity of one container item in millibuckets.
    pub capacity: u32,
    /// Bucket-like containers only fill or drain their whole capacity at once.
    #[serde(default)]
    pub whole_only: bool,
}

/// Static properties of one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// Item identity.
    pub key: RegistryKey,
    /// Maximum number of items per slot.
    #[serde(default = "default_max_stack_size")]
    pub max_stack_size: u32,
    /// Ticks of burn time one item provides (0 = not a fuel).
    #[serde(default)]
    pub burn_time: u32,
    /// Present when the item can hold fluid.
    #[serde(default)]
    pub fluid_container: Option<FluidContainerSpec>,
}

impl ItemDescriptor {
    /// A plain stackable item.
    pub fn simple(key: RegistryKey) -> Self {
        Self {
            key,
            max_stack_size: DEFAULT_STACK_SIZE,
            burn_time: 0,
            fluid_container: None,
        }
    }

    /// Builder-style fuel value.
    pub fn with_burn_time(mut self, burn_time: u32) -> Self {
        self.burn_time = burn_time;
        self
    }

    /// Builder-style stack limit.
    pub fn with_max_stack_size(mut self, max_stack_size: u32) -> Self {
        self.max_stack_size = max_stack_size;
        self
    }

    /// Builder-style fluid-container capability.
    pub fn with_fluid_container(mut self, capacity: u32, whole_only: bool) -> Self {
        self.fluid_container = Some(FluidContainerSpec {
            capacity,
            whole_only,
        });
        self
    }
}

/// Registry of item descriptors keyed by registry key.
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    descriptors: Vec<ItemDescriptor>,
    by_key: HashMap<RegistryKey, usize>,
}

impl ItemRegistry {
    /// Construct a registry; later duplicates of a key are ignored.
    pub fn new(descriptors: Vec<ItemDescriptor>) -> Self {
        let mut by_key = HashMap::new();
        let mut kept = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if by_key.contains_key(&descriptor.key) {
                tracing::warn!(key = %descriptor.key, "ignoring duplicate item descriptor");
                continue;
            }
            by_key.insert(descriptor.key.clone(), kept.len());
            kept.push(descriptor);
        }
        Self {
            descriptors: kept,
            by_key,
        }
    }

    /// Registry with the furnace fuel table and the mod's own items.
    pub fn builtin() -> Self {
        // (key, burn time, max stack size, fluid container)
        const ITEMS: &[(&str, u32, u32, Option<FluidContainerSpec>)] = &[
            ("minecraft:coal", 1600, 64, None),
            ("minecraft:coal_block", 16000, 64, None),
            ("minecraft:planks", 300, 64, None),
            ("minecraft:log", 300, 64, None),
            ("minecraft:stick", 100, 64, None),
            ("minecraft:blaze_rod", 2400, 64, None),
            ("minecraft:lava_bucket", 20000, 1, None),
            (
                "minecraft:bucket",
                0,
                16,
                Some(FluidContainerSpec {
                    capacity: 1000,
                    whole_only: true,
                }),
            ),
            (
                "traincraft:canister",
                0,
                64,
                Some(FluidContainerSpec {
                    capacity: 4000,
                    whole_only: false,
                }),
            ),
            ("traincraft:oil_sands", 0, 64, None),
            ("traincraft:petroleum", 0, 64, None),
            ("traincraft:plastic", 0, 64, None),
        ];

        Self::new(
            ITEMS
                .iter()
                .filter_map(|&(key, burn_time, max_stack_size, fluid_container)| {
                    Some(ItemDescriptor {
                        key: RegistryKey::parse(key).ok()?,
                        max_stack_size,
                        burn_time,
                        fluid_container,
                    })
                })
                .collect(),
        )
    }

    /// Look up a descriptor.
    pub fn get(&self, key: &RegistryKey) -> Option<&ItemDescriptor> {
        self.by_key.get(key).map(|&index| &self.descriptors[index])
    }

    /// Iterate descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemDescriptor> {
        self.descriptors.iter()
    }

    /// Number of registered items.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the registry has no items.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Stack limit for a concrete stack. Containers holding fluid never stack.
    pub fn max_stack_size(&self, stack: &ItemStack) -> u32 {
        let Some(descriptor) = self.get(&stack.item) else {
            return DEFAULT_STACK_SIZE;
        };
        let holds_fluid = descriptor.fluid_container.is_some()
            && stack
                .tag
                .as_ref()
                .is_some_and(|tag| tag.contains(CONTAINER_FLUID_TAG));
        if holds_fluid {
            1
        } else {
            descriptor.max_stack_size.max(1)
        }
    }

    /// Fuel value of one item of the stack (0 when not a fuel).
    pub fn burn_time(&self, stack: &ItemStack) -> u32 {
        self.get(&stack.item).map(|d| d.burn_time).unwrap_or(0)
    }

    /// Check if an item is a valid fuel.
    pub fn is_fuel(&self, stack: &ItemStack) -> bool {
        self.burn_time(stack) > 0
    }

    /// Whether the item exposes the fluid-container capability.
    pub fn has_fluid_capability(&self, stack: &ItemStack) -> bool {
        self.get(&stack.item)
            .is_some_and(|d| d.fluid_container.is_some())
    }

    /// Query the fluid-container capability of a single item of `stack`.
    ///
    /// Absence is an ordinary outcome for items that cannot hold fluid.
    pub fn fluid_handler(&self, stack: &ItemStack) -> Option<ItemFluidHandler> {
        let spec = self.get(&stack.item)?.fluid_container?;
        Some(ItemFluidHandler::new(stack.copy_with_count(1), spec))
    }
}

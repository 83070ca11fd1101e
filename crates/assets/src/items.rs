use serde::Deserialize;
use traincraft_world::{FluidContainerSpec, ItemDescriptor, DEFAULT_STACK_SIZE};

use crate::{parse_key, AssetError};

/// Item entry as written in a data pack.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDefinition {
    /// Identifier; a bare path uses the `traincraft` namespace.
    pub id: String,
    /// Stack limit (defaults to 64).
    #[serde(default)]
    pub max_stack_size: Option<u32>,
    /// Fuel value in ticks; omitted for non-fuels.
    #[serde(default)]
    pub burn_time: u32,
    /// Fluid-container capability.
    #[serde(default)]
    pub fluid_container: Option<FluidContainerSpec>,
}

impl ItemDefinition {
    /// Convert into a registry descriptor.
    pub fn into_descriptor(self) -> Result<ItemDescriptor, AssetError> {
        let mut descriptor = ItemDescriptor::simple(parse_key(&self.id)?)
            .with_burn_time(self.burn_time)
            .with_max_stack_size(self.max_stack_size.unwrap_or(DEFAULT_STACK_SIZE).max(1));
        descriptor.fluid_container = self.fluid_container;
        Ok(descriptor)
    }
}

//! Distillery recipe definitions as written in data packs.

use serde::Deserialize;
use traincraft_core::{Compound, FluidStack, ItemStack, RegistryKey};
use traincraft_world::{DistilleryRecipe, Ingredient, IngredientMatch, ItemRegistry};

use crate::{parse_key, AssetError};

fn default_count() -> u32 {
    1
}

/// One accepted input item.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientDefinition {
    /// Item identifier.
    pub item: String,
    /// Required damage value; omitted accepts any.
    #[serde(default)]
    pub damage: Option<u16>,
    /// Tag the input must carry.
    #[serde(default)]
    pub tag: Option<Compound>,
}

/// An item stack in a recipe.
#[derive(Debug, Clone, Deserialize)]
pub struct StackDefinition {
    /// Item identifier.
    pub item: String,
    /// Stack size (defaults to 1).
    #[serde(default = "default_count")]
    pub count: u32,
    /// Damage value.
    #[serde(default)]
    pub damage: u16,
    /// Optional tag data.
    #[serde(default)]
    pub tag: Option<Compound>,
}

/// A fluid amount in a recipe.
#[derive(Debug, Clone, Deserialize)]
pub struct FluidDefinition {
    /// Fluid identifier.
    pub fluid: String,
    /// Amount in millibuckets.
    pub amount: u32,
}

/// Distillery recipe entry as written in a data pack.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeDefinition {
    /// Recipe identifier.
    pub id: String,
    /// Accepted inputs; any one of them starts the recipe.
    pub input: Vec<IngredientDefinition>,
    /// Items consumed per craft (defaults to 1).
    #[serde(default = "default_count")]
    pub input_amount: u32,
    /// Fueled ticks per craft.
    pub burn_time: u32,
    /// Item output.
    pub output: StackDefinition,
    /// Optional fluid output.
    #[serde(default)]
    pub output_fluid: Option<FluidDefinition>,
}

impl RecipeDefinition {
    /// Resolve identifiers and check every item exists in `items`.
    pub fn into_recipe(self, items: &ItemRegistry) -> Result<DistilleryRecipe, AssetError> {
        let id = parse_key(&self.id)?;
        let known = |item: RegistryKey| -> Result<RegistryKey, AssetError> {
            if items.get(&item).is_none() {
                return Err(AssetError::UnknownItem {
                    recipe: id.clone(),
                    item,
                });
            }
            Ok(item)
        };

        let matches = self
            .input
            .into_iter()
            .map(|def| {
                Ok(IngredientMatch {
                    item: known(parse_key(&def.item)?)?,
                    damage: def.damage,
                    tag: def.tag,
                })
            })
            .collect::<Result<Vec<_>, AssetError>>()?;

        let mut output =
            ItemStack::new(known(parse_key(&self.output.item)?)?, self.output.count)
                .with_damage(self.output.damage);
        output.tag = self.output.tag;

        let output_fluid = self
            .output_fluid
            .map(|def| Ok::<_, AssetError>(FluidStack::new(parse_key(&def.fluid)?, def.amount)))
            .transpose()?;

        Ok(DistilleryRecipe {
            id,
            ingredient: Ingredient::new(matches),
            input_amount: self.input_amount,
            burn_time: self.burn_time,
            output,
            output_fluid,
        })
    }
}

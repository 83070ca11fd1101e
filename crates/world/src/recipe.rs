//! Distillation recipes and the immutable recipe catalog.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use traincraft_core::{Compound, FluidStack, ItemStack, RegistryKey};

/// One acceptable input item for an ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientMatch {
    /// Item identity.
    pub item: RegistryKey,
    /// Required damage value; `None` accepts any.
    #[serde(default)]
    pub damage: Option<u16>,
    /// Tag the input must carry for a recipe to start; `None` requires an
    /// untagged stack.
    #[serde(default)]
    pub tag: Option<Compound>,
}

impl IngredientMatch {
    fn same_item(&self, stack: &ItemStack) -> bool {
        self.item == stack.item && self.damage.map_or(true, |d| d == stack.damage)
    }

    fn tag_matches(&self, stack: &ItemStack) -> bool {
        let empty = Compound::new();
        self.tag.as_ref().unwrap_or(&empty) == stack.tag.as_ref().unwrap_or(&empty)
    }
}

/// Set of items a recipe accepts as input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ingredient {
    matches: Vec<IngredientMatch>,
}

impl Ingredient {
    /// Build from explicit match entries.
    pub fn new(matches: Vec<IngredientMatch>) -> Self {
        Self { matches }
    }

    /// Ingredient accepting any damage of a single untagged item.
    pub fn of(item: RegistryKey) -> Self {
        Self::new(vec![IngredientMatch {
            item,
            damage: None,
            tag: None,
        }])
    }

    /// Match entries in declaration order.
    pub fn matches(&self) -> &[IngredientMatch] {
        &self.matches
    }

    /// Loose test on identity and damage only, used for slot validity.
    pub fn test(&self, stack: &ItemStack) -> bool {
        self.matches.iter().any(|m| m.same_item(stack))
    }

    /// Strict test used when selecting a recipe: identity, damage, tag and
    /// at least `amount` items.
    pub fn accepts(&self, amount: u32, stack: &ItemStack) -> bool {
        !stack.is_empty()
            && stack.count >= amount
            && self
                .matches
                .iter()
                .any(|m| m.same_item(stack) && m.tag_matches(stack))
    }
}

/// One distillation recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistilleryRecipe {
    /// Stable recipe identity.
    pub id: RegistryKey,
    /// Accepted inputs.
    pub ingredient: Ingredient,
    /// Items consumed per craft.
    pub input_amount: u32,
    /// Ticks of fueled progress needed to finish one craft.
    pub burn_time: u32,
    /// Item stack produced per craft.
    pub output: ItemStack,
    /// Fluid produced per craft.
    #[serde(default)]
    pub output_fluid: Option<FluidStack>,
}

/// Errors raised while assembling a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two recipes share an id.
    #[error("duplicate distillery recipe id {0}")]
    DuplicateId(RegistryKey),
    /// Ingredient has no match entries.
    #[error("recipe {0} has an empty ingredient")]
    EmptyIngredient(RegistryKey),
    /// Input amount is zero.
    #[error("recipe {0} consumes zero items")]
    ZeroInputAmount(RegistryKey),
    /// Burn time is zero.
    #[error("recipe {0} has zero burn time")]
    ZeroBurnTime(RegistryKey),
    /// Output stack is empty.
    #[error("recipe {0} produces an empty output stack")]
    EmptyOutput(RegistryKey),
    /// Output fluid amount is zero.
    #[error("recipe {0} produces an empty output fluid")]
    EmptyOutputFluid(RegistryKey),
}

/// Ordered, immutable set of distillery recipes.
///
/// Lookups are first-match in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeCatalog {
    recipes: Vec<DistilleryRecipe>,
}

impl RecipeCatalog {
    /// Validate and build a catalog, keeping declaration order.
    pub fn new(recipes: Vec<DistilleryRecipe>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for recipe in &recipes {
            if !seen.insert(recipe.id.clone()) {
                return Err(CatalogError::DuplicateId(recipe.id.clone()));
            }
            if recipe.ingredient.matches.is_empty() {
                return Err(CatalogError::EmptyIngredient(recipe.id.clone()));
            }
            if recipe.input_amount == 0 {
                return Err(CatalogError::ZeroInputAmount(recipe.id.clone()));
            }
            if recipe.burn_time == 0 {
                return Err(CatalogError::ZeroBurnTime(recipe.id.clone()));
            }
            if recipe.output.is_empty() {
                return Err(CatalogError::EmptyOutput(recipe.id.clone()));
            }
            if recipe.output_fluid.as_ref().is_some_and(|f| f.amount == 0) {
                return Err(CatalogError::EmptyOutputFluid(recipe.id.clone()));
            }
        }
        Ok(Self { recipes })
    }

    /// Look up a recipe by id.
    pub fn get(&self, id: &RegistryKey) -> Option<&DistilleryRecipe> {
        self.recipes.iter().find(|r| &r.id == id)
    }

    /// First recipe, in declaration order, whose ingredient accepts `stack`
    /// with enough items.
    pub fn find_for_input(&self, stack: &ItemStack) -> Option<&DistilleryRecipe> {
        self.recipes
            .iter()
            .find(|r| r.ingredient.accepts(r.input_amount, stack))
    }

    /// Whether any recipe could ever use this item as input.
    pub fn accepts_input(&self, stack: &ItemStack) -> bool {
        self.recipes.iter().any(|r| r.ingredient.test(stack))
    }

    /// Iterate recipes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &DistilleryRecipe> {
        self.recipes.iter()
    }

    /// Number of recipes.
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

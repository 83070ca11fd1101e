use std::fs;
use std::path::Path;

use traincraft_world::{ItemRegistry, RecipeCatalog};

use crate::{AssetError, ItemDefinition, RecipeDefinition};

/// Load an item registry from the provided JSON file path.
pub fn item_registry_from_file(path: &Path) -> Result<ItemRegistry, AssetError> {
    let data = fs::read_to_string(path)?;
    item_registry_from_str(&data)
}

/// Load an item registry from an in-memory JSON string.
pub fn item_registry_from_str(input: &str) -> Result<ItemRegistry, AssetError> {
    let defs: Vec<ItemDefinition> = serde_json::from_str(input)?;
    let descriptors = defs
        .into_iter()
        .map(ItemDefinition::into_descriptor)
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = descriptors.len(), "loaded item definitions");
    Ok(ItemRegistry::new(descriptors))
}

/// Load a distillery recipe catalog from the provided JSON file path.
pub fn recipe_catalog_from_file(
    path: &Path,
    items: &ItemRegistry,
) -> Result<RecipeCatalog, AssetError> {
    let data = fs::read_to_string(path)?;
    recipe_catalog_from_str(&data, items)
}

/// Load a distillery recipe catalog from an in-memory JSON string,
/// keeping declaration order.
pub fn recipe_catalog_from_str(
    input: &str,
    items: &ItemRegistry,
) -> Result<RecipeCatalog, AssetError> {
    let defs: Vec<RecipeDefinition> = serde_json::from_str(input)?;
    let recipes = defs
        .into_iter()
        .map(|def| def.into_recipe(items))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = recipes.len(), "loaded distillery recipes");
    Ok(RecipeCatalog::new(recipes)?)
}

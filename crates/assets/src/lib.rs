#![warn(missing_docs)]
//! Data pack schema + validation helpers for items and distillery recipes.

mod items;
mod loader;
mod recipes;

pub use items::ItemDefinition;
pub use loader::{
    item_registry_from_file, item_registry_from_str, recipe_catalog_from_file,
    recipe_catalog_from_str,
};
pub use recipes::{FluidDefinition, IngredientDefinition, RecipeDefinition, StackDefinition};

use thiserror::Error;
use traincraft_core::{RegistryKey, RegistryKeyError};
use traincraft_world::CatalogError;

/// Errors emitted during pack loading.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Wrap IO errors when reading packs.
    #[error("failed to read data pack: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues.
    #[error("failed to parse data pack: {0}")]
    Parse(#[from] serde_json::Error),
    /// An identifier in the pack is malformed.
    #[error("invalid identifier `{id}`: {source}")]
    InvalidKey {
        /// The offending identifier.
        id: String,
        /// Why it was rejected.
        source: RegistryKeyError,
    },
    /// A recipe names an item the registry does not know.
    #[error("recipe {recipe} references unknown item {item}")]
    UnknownItem {
        /// Recipe id.
        recipe: RegistryKey,
        /// Missing item.
        item: RegistryKey,
    },
    /// Recipes failed catalog validation.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub(crate) fn parse_key(id: &str) -> Result<RegistryKey, AssetError> {
    RegistryKey::parse(id).map_err(|source| AssetError::InvalidKey {
        id: id.to_string(),
        source,
    })
}

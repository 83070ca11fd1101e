use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::warn;
use traincraft_assets::{item_registry_from_file, recipe_catalog_from_file};
use traincraft_world::{DistilleryConfig, ItemRegistry, RecipeCatalog};

pub const DEFAULT_CONFIG_PATH: &str = "config/traincraft.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TraincraftConfig {
    /// JSON item definitions.
    pub items_path: PathBuf,
    /// JSON distillery recipes, in match order.
    pub recipes_path: PathBuf,
    /// Directory holding model tables.
    pub models_dir: PathBuf,
    pub distillery: DistilleryConfig,
}

impl Default for TraincraftConfig {
    fn default() -> Self {
        Self {
            items_path: PathBuf::from("config/items.json"),
            recipes_path: PathBuf::from("config/distillery_recipes.json"),
            models_dir: PathBuf::from("assets/models"),
            distillery: DistilleryConfig::default(),
        }
    }
}

impl TraincraftConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<TraincraftConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    TraincraftConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Config not found at {}. Using defaults", path.display());
                }
                TraincraftConfig::default()
            }
        }
    }

    /// Item registry and recipe catalog named by this config.
    pub fn load_content(&self) -> Result<(Arc<ItemRegistry>, Arc<RecipeCatalog>)> {
        let items = item_registry_from_file(&self.items_path)
            .with_context(|| format!("Failed to load items from {}", self.items_path.display()))?;
        let catalog = recipe_catalog_from_file(&self.recipes_path, &items).with_context(|| {
            format!(
                "Failed to load distillery recipes from {}",
                self.recipes_path.display()
            )
        })?;
        Ok((Arc::new(items), Arc::new(catalog)))
    }

    /// Path of a model table by name.
    pub fn model_path(&self, name: &str) -> PathBuf {
        self.models_dir.join(format!("{name}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_path(rel: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(rel)
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = TraincraftConfig::load_from_path(Path::new("does/not/exist.toml"));
        assert_eq!(cfg, TraincraftConfig::default());
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_fields() {
        let cfg: TraincraftConfig = toml::from_str(
            r#"
            models_dir = "models"

            [distillery]
            sync_interval = 10
            "#,
        )
        .unwrap();
        assert_eq!(cfg.models_dir, PathBuf::from("models"));
        assert_eq!(cfg.items_path, PathBuf::from("config/items.json"));
        assert_eq!(cfg.distillery.sync_interval, 10);
        assert_eq!(
            cfg.distillery.tank_capacity,
            DistilleryConfig::default().tank_capacity
        );
    }

    #[test]
    fn shipped_config_parses() {
        let path = repo_path(DEFAULT_CONFIG_PATH);
        let contents = fs::read_to_string(&path).unwrap();
        let cfg: TraincraftConfig = toml::from_str(&contents).unwrap();
        assert_eq!(cfg, TraincraftConfig::default());
    }

    #[test]
    fn shipped_content_loads() {
        let mut cfg = TraincraftConfig::default();
        cfg.items_path = repo_path("config/items.json");
        cfg.recipes_path = repo_path("config/distillery_recipes.json");
        let (items, catalog) = cfg.load_content().unwrap();
        assert!(!items.is_empty());
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn model_path_joins_models_dir() {
        let cfg = TraincraftConfig::default();
        assert_eq!(
            cfg.model_path("caboose3"),
            PathBuf::from("assets/models/caboose3.json")
        );
    }
}

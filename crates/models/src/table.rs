//! Model tables: box primitives, validation, bounds and stats.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::render::box_transform;

/// One textured box of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPrimitive {
    /// Unique name within the model.
    pub name: String,
    /// Texture atlas offset `(u, v)` in pixels.
    pub texture_offset: [u32; 2],
    /// Per-box texture sheet size; falls back to the model's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_size: Option<[u32; 2]>,
    /// Box corner relative to the pivot.
    pub origin: Vec3,
    /// Box dimensions.
    pub size: Vec3,
    /// Pivot position.
    pub position: Vec3,
    /// Rotation around the pivot in radians, per axis.
    #[serde(default)]
    pub rotation: Vec3,
}

/// Errors emitted while loading a model table.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Wrap IO errors when reading tables.
    #[error("failed to read model table: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues.
    #[error("failed to parse model table: {0}")]
    Parse(#[from] serde_json::Error),
    /// The table has no boxes.
    #[error("model `{0}` has no boxes")]
    Empty(String),
    /// A box has an empty name.
    #[error("box #{0} has an empty name")]
    UnnamedBox(usize),
    /// Two boxes share a name.
    #[error("duplicate box name `{0}`")]
    DuplicateBox(String),
    /// A texture sheet dimension is zero.
    #[error("texture sheet of `{0}` has a zero dimension")]
    ZeroTextureSize(String),
    /// A box has a negative or non-finite dimension.
    #[error("box `{0}` has an invalid size")]
    InvalidSize(String),
}

/// Axis-aligned bounds in model units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Extent along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }
}

/// Summary numbers for a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelStats {
    /// Number of boxes.
    pub boxes: usize,
    /// Boxes with a non-zero rotation.
    pub rotated: usize,
    /// Sum of box volumes in cubic model units.
    pub volume: f32,
    /// Bounds of every transformed box.
    pub bounds: Aabb,
}

/// Ordered, validated list of boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTable {
    /// Model name.
    pub name: String,
    /// Default texture sheet size `(width, height)`.
    pub texture_size: [u32; 2],
    /// Boxes in draw order.
    pub boxes: Vec<BoxPrimitive>,
}

impl ModelTable {
    /// Parse and validate a JSON table.
    pub fn load_from_str(input: &str) -> Result<Self, ModelError> {
        let table: ModelTable = serde_json::from_str(input)?;
        table.validate()?;
        tracing::debug!(model = %table.name, boxes = table.boxes.len(), "loaded model table");
        Ok(table)
    }

    /// Read, parse and validate a JSON table file.
    pub fn load_from_file(path: &Path) -> Result<Self, ModelError> {
        let data = fs::read_to_string(path)?;
        Self::load_from_str(&data)
    }

    /// Check names, sheet sizes and box dimensions.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.boxes.is_empty() {
            return Err(ModelError::Empty(self.name.clone()));
        }
        if self.texture_size.contains(&0) {
            return Err(ModelError::ZeroTextureSize(self.name.clone()));
        }
        let mut seen = HashSet::new();
        for (index, primitive) in self.boxes.iter().enumerate() {
            if primitive.name.is_empty() {
                return Err(ModelError::UnnamedBox(index));
            }
            if !seen.insert(primitive.name.as_str()) {
                return Err(ModelError::DuplicateBox(primitive.name.clone()));
            }
            if primitive.texture_size.is_some_and(|size| size.contains(&0)) {
                return Err(ModelError::ZeroTextureSize(primitive.name.clone()));
            }
            if !primitive.size.is_finite() || primitive.size.min_element() < 0.0 {
                return Err(ModelError::InvalidSize(primitive.name.clone()));
            }
        }
        Ok(())
    }

    /// Look up a box by name.
    pub fn get(&self, name: &str) -> Option<&BoxPrimitive> {
        self.boxes.iter().find(|b| b.name == name)
    }

    /// Texture sheet size used by `primitive`.
    pub fn texture_size_of(&self, primitive: &BoxPrimitive) -> [u32; 2] {
        primitive.texture_size.unwrap_or(self.texture_size)
    }

    /// Bounds of every box after its rotation and translation.
    pub fn bounds(&self) -> Option<Aabb> {
        let mut corners = self.boxes.iter().flat_map(|primitive| {
            let transform = box_transform(primitive);
            box_corners(primitive).map(move |corner| transform.transform_point3(corner))
        });
        let first = corners.next()?;
        let mut bounds = Aabb {
            min: first,
            max: first,
        };
        corners.for_each(|corner| bounds.include(corner));
        Some(bounds)
    }

    /// Summary numbers, `None` for a table without boxes.
    pub fn stats(&self) -> Option<ModelStats> {
        Some(ModelStats {
            boxes: self.boxes.len(),
            rotated: self
                .boxes
                .iter()
                .filter(|b| b.rotation != Vec3::ZERO)
                .count(),
            volume: self.boxes.iter().map(|b| b.size.x * b.size.y * b.size.z).sum(),
            bounds: self.bounds()?,
        })
    }
}

fn box_corners(primitive: &BoxPrimitive) -> [Vec3; 8] {
    let min = primitive.origin;
    let max = primitive.origin + primitive.size;
    [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(min.x, max.y, max.z),
        Vec3::new(max.x, max.y, max.z),
    ]
}

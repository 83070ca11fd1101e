#![warn(missing_docs)]
//! Static block/entity model geometry tables.
//!
//! A model is an ordered list of textured boxes. Tables ship as JSON and are
//! drawn every frame by iterating the boxes in order.

mod render;
mod table;

pub use render::{box_transform, DrawSink, RecordingSink};
pub use table::{Aabb, BoxPrimitive, ModelError, ModelStats, ModelTable};

/// Scale factor converting model units (sixteenths of a block) to blocks.
pub const MODEL_UNIT_SCALE: f32 = 1.0 / 16.0;

const CABOOSE_JSON: &str = include_str!("../../../assets/models/caboose3.json");

/// The caboose model bundled with the crate.
pub fn caboose() -> Result<ModelTable, ModelError> {
    ModelTable::load_from_str(CABOOSE_JSON)
}

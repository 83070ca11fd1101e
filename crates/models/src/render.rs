//! Draw-call emission for model tables.

use glam::{EulerRot, Mat4, Quat};

use crate::table::{BoxPrimitive, ModelTable};

/// Receives one draw call per box.
pub trait DrawSink {
    /// Draw `primitive` with its model-space `transform`, scaled by `scale`.
    fn draw_box(&mut self, primitive: &BoxPrimitive, transform: Mat4, scale: f32);
}

/// Pivot translation followed by Z, Y, X rotations.
pub fn box_transform(primitive: &BoxPrimitive) -> Mat4 {
    let r = primitive.rotation;
    let rotation = Quat::from_euler(EulerRot::ZYX, r.z, r.y, r.x);
    Mat4::from_rotation_translation(rotation, primitive.position)
}

impl ModelTable {
    /// Issue a draw call for every box in declared order.
    pub fn render(&self, scale: f32, sink: &mut dyn DrawSink) {
        for primitive in &self.boxes {
            sink.draw_box(primitive, box_transform(primitive), scale);
        }
    }
}

/// Sink that records box names, for tests and tooling.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Names in draw order.
    pub drawn: Vec<String>,
}

impl DrawSink for RecordingSink {
    fn draw_box(&mut self, primitive: &BoxPrimitive, _transform: Mat4, _scale: f32) {
        self.drawn.push(primitive.name.clone());
    }
}

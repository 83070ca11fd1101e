//! The bundled caboose table loads, draws in order and stays in shape.

use glam::{Mat4, Vec3};
use traincraft_models::{caboose, BoxPrimitive, DrawSink, RecordingSink, MODEL_UNIT_SCALE};

#[test]
fn caboose_loads_every_box() {
    let model = caboose().unwrap();
    assert_eq!(model.name, "caboose3");
    assert_eq!(model.texture_size, [256, 128]);
    assert_eq!(model.boxes.len(), 46);

    let bogey = model.get("bogey").unwrap();
    assert_eq!(bogey.texture_offset, [2, 9]);
    assert_eq!(bogey.size, Vec3::new(1.0, 6.0, 14.0));
    assert_eq!(bogey.position, Vec3::new(-6.0, 0.0, -17.0));
    assert_eq!(bogey.rotation, Vec3::ZERO);

    let roof = model.get("box26").unwrap();
    assert!((roof.rotation.y - std::f32::consts::PI).abs() < 1e-6);
    assert!((roof.rotation.z - 0.139_626_34).abs() < 1e-6);
}

#[test]
fn render_visits_boxes_in_table_order() {
    let model = caboose().unwrap();
    let mut sink = RecordingSink::default();
    model.render(MODEL_UNIT_SCALE, &mut sink);

    assert_eq!(sink.drawn.len(), model.boxes.len());
    assert_eq!(&sink.drawn[..4], &["bogey", "bogey0", "box", "box0"]);
    assert_eq!(sink.drawn.last().map(String::as_str), Some("box9"));

    // Every frame issues the same calls.
    let mut again = RecordingSink::default();
    model.render(MODEL_UNIT_SCALE, &mut again);
    assert_eq!(sink.drawn, again.drawn);
}

struct ScaleCheck {
    scales: Vec<f32>,
    translations: Vec<Vec3>,
}

impl DrawSink for ScaleCheck {
    fn draw_box(&mut self, primitive: &BoxPrimitive, transform: Mat4, scale: f32) {
        self.scales.push(scale);
        let pivot = transform.transform_point3(Vec3::ZERO);
        assert!((pivot - primitive.position).abs().max_element() < 1e-5);
        self.translations.push(pivot);
    }
}

#[test]
fn render_passes_scale_and_pivot() {
    let model = caboose().unwrap();
    let mut sink = ScaleCheck {
        scales: Vec::new(),
        translations: Vec::new(),
    };
    model.render(0.5, &mut sink);
    assert!(sink.scales.iter().all(|&s| s == 0.5));
    assert_eq!(sink.translations.len(), 46);
}

#[test]
fn caboose_stats() {
    let stats = caboose().unwrap().stats().unwrap();
    assert_eq!(stats.boxes, 46);
    assert_eq!(stats.rotated, 4);
    assert!(stats.volume > 0.0);
    // Spans both end platforms.
    assert!(stats.bounds.min.z <= -19.0);
    assert!(stats.bounds.max.z >= 20.0);
    assert!(stats.bounds.min.y >= -0.5);
}

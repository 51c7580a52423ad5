use crate::db::core::{CircuitDB, Waypath};
use crate::db::indices::NetId;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect as ImageRect;
use std::collections::HashMap;
use std::path::Path;

const WIRE_COLORS: [Rgba<u8>; 6] = [
    Rgba([0, 110, 255, 255]),
    Rgba([255, 20, 80, 255]),
    Rgba([0, 255, 100, 255]),
    Rgba([255, 215, 0, 255]),
    Rgba([180, 50, 255, 255]),
    Rgba([0, 240, 255, 255]),
];

/// Rasterizes the routed schematic: chip boxes, wire polylines, terminal
/// dots. The canvas is mapped directly (schematic y grows downward, same
/// as image coordinates).
pub fn draw_routed_circuit(
    db: &CircuitDB,
    routed: &HashMap<NetId, Waypath>,
    filename: &str,
    width: u32,
    height: u32,
) {
    let mut img = RgbaImage::from_pixel(width, height, Rgba([20, 20, 20, 255]));

    let canvas_w = db.canvas.width();
    let canvas_h = db.canvas.height();
    if canvas_w <= 0.0 || canvas_h <= 0.0 {
        return;
    }

    let scale_x = width as f64 / canvas_w;
    let scale_y = height as f64 / canvas_h;
    let map = |x: f64, y: f64| {
        (
            (x - db.canvas.min.x) * scale_x,
            (y - db.canvas.min.y) * scale_y,
        )
    };

    let chip_fill = Rgba([45, 45, 55, 255]);
    let chip_edge = Rgba([140, 140, 150, 255]);
    for i in 0..db.num_chips() {
        let pos = db.positions[i];
        let chip = &db.chips[i];
        let (x, y) = map(pos.x, pos.y);
        let w = (chip.width * scale_x).max(2.0);
        let h = (chip.height * scale_y).max(2.0);
        let rect = ImageRect::at(x as i32, y as i32).of_size(w as u32, h as u32);
        draw_filled_rect_mut(&mut img, rect, chip_fill);
        draw_hollow_rect_mut(&mut img, rect, chip_edge);
    }

    let mut ids: Vec<NetId> = routed.keys().copied().collect();
    ids.sort();

    for id in ids {
        let path = &routed[&id];
        let color = WIRE_COLORS[id.index() % WIRE_COLORS.len()];

        for (a, b) in path.runs() {
            let (x1, y1) = map(a.x, a.y);
            let (x2, y2) = map(b.x, b.y);
            draw_line_segment_mut(
                &mut img,
                (x1 as f32, y1 as f32),
                (x2 as f32, y2 as f32),
                color,
            );
        }

        let dot = Rgba([255, 255, 255, 255]);
        for p in [path.source(), path.target()].into_iter().flatten() {
            let (px, py) = map(p.x, p.y);
            let rect = ImageRect::at(px as i32 - 1, py as i32 - 1).of_size(3, 3);
            draw_filled_rect_mut(&mut img, rect, dot);
        }
    }

    let _ = img.save(Path::new(filename));
}

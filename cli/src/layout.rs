use anyhow::{Result, anyhow};
use schem_common::db::core::{CircuitDB, PinRef};
use schem_common::db::parser::csv::{ChipInstance, Connection, Datasheets, GateEntry, OutputDef};
use schem_common::geom::point::Point;
use schem_common::geom::rect::Rect;
use schem_common::util::config::LayoutConfig;
use std::collections::BTreeMap;

const CHIP_WIDTH: f64 = 220.0;
const IO_BOX_WIDTH: f64 = 120.0;
const INPUT_BOX_X: f64 = 30.0;
const PIN_PITCH: f64 = 100.0;
const IO_PIN_PITCH: f64 = 80.0;
const CANVAS_RIGHT_MARGIN: f64 = 400.0;
const OUTPUT_BOX_INSET: f64 = 350.0;

fn chip_height(gate: &GateEntry) -> f64 {
    (80.0 + gate.input_pins.len() as f64 * PIN_PITCH).max(160.0)
}

fn io_box_height(num_pins: usize) -> f64 {
    (60.0 + num_pins as f64 * IO_PIN_PITCH).max(120.0)
}

/// Places every chip on the canvas and builds the circuit database.
///
/// Chips are placed in columns, one column per logic layer, stacked top
/// to bottom in file order. Pins sit just outside the chip footprint, at
/// the obstacle padding distance, so the first run of a wire leaves along
/// the padded boundary instead of through it: inputs on the left edge,
/// the gate output on the right. The circuit boundary is modelled as two
/// virtual boxes, `input` on the far left and `output` on the far right.
pub fn build_circuit(
    datasheets: &Datasheets,
    chips: &[ChipInstance],
    connections: &[Connection],
    inputs: &[String],
    outputs: &[OutputDef],
    layout: &LayoutConfig,
    padding: f64,
) -> Result<CircuitDB> {
    let mut db = CircuitDB::new();

    // File order within a layer, layers left to right.
    let mut by_layer: BTreeMap<i32, Vec<&ChipInstance>> = BTreeMap::new();
    for chip in chips {
        by_layer.entry(chip.layer).or_default().push(chip);
    }

    let mut max_x: f64 = 0.0;
    let mut max_y: f64 = 0.0;

    for (column, (_, members)) in by_layer.iter().enumerate() {
        let x = layout.start_x + column as f64 * layout.layer_spacing_x;
        let mut y = layout.start_y;

        for chip in members {
            let gate = datasheets
                .get(&chip.chip_type)
                .and_then(|gates| gates.get(&chip.gate_num))
                .ok_or_else(|| {
                    anyhow!(
                        "Chip '{}' uses undefined gate {} of type '{}'",
                        chip.id,
                        chip.gate_num,
                        chip.chip_type
                    )
                })?;

            let height = chip_height(gate);
            let id = db.add_chip(
                chip.id.clone(),
                chip.chip_type.clone(),
                CHIP_WIDTH,
                height,
                false,
            );
            db.positions[id.index()] = Point::new(x, y);

            for (i, pin) in gate.input_pins.iter().enumerate() {
                db.add_pin(
                    id,
                    pin.to_string(),
                    Point::new(-padding, 90.0 + i as f64 * PIN_PITCH),
                );
            }
            db.add_pin(
                id,
                gate.output_pin.to_string(),
                Point::new(CHIP_WIDTH + padding, height / 2.0),
            );

            max_x = max_x.max(x + CHIP_WIDTH);
            max_y = max_y.max(y + height);
            y += height + layout.chip_spacing_y;
        }
    }

    let canvas_width = max_x + CANVAS_RIGHT_MARGIN;

    let in_height = io_box_height(inputs.len());
    let in_box = db.add_chip("input".into(), "IO".into(), IO_BOX_WIDTH, in_height, true);
    db.positions[in_box.index()] = Point::new(INPUT_BOX_X, layout.start_y);
    for (i, name) in inputs.iter().enumerate() {
        db.add_pin(
            in_box,
            name.clone(),
            Point::new(IO_BOX_WIDTH + padding, 50.0 + i as f64 * IO_PIN_PITCH),
        );
    }
    max_y = max_y.max(layout.start_y + in_height);

    let out_height = io_box_height(outputs.len());
    let out_box = db.add_chip("output".into(), "IO".into(), IO_BOX_WIDTH, out_height, true);
    db.positions[out_box.index()] = Point::new(canvas_width - OUTPUT_BOX_INSET, layout.start_y);
    for (i, def) in outputs.iter().enumerate() {
        db.add_pin(
            out_box,
            def.name.clone(),
            Point::new(-padding, 50.0 + i as f64 * IO_PIN_PITCH),
        );
    }
    max_y = max_y.max(layout.start_y + out_height);

    db.canvas = Rect::new(
        Point::new(0.0, 0.0),
        Point::new(canvas_width, max_y + 200.0),
    );

    for conn in connections {
        let name = format!(
            "{}.{} -> {}.{}",
            conn.from_chip, conn.from_pin, conn.to_chip, conn.to_pin
        );
        db.add_net(
            name,
            PinRef::new(conn.from_chip.clone(), conn.from_pin.clone()),
            PinRef::new(conn.to_chip.clone(), conn.to_pin.clone()),
        );
    }

    log::info!(
        "Layout complete: {} chips in {} layers, canvas {:.0}x{:.0}.",
        chips.len(),
        by_layer.len(),
        db.canvas.width(),
        db.canvas.height()
    );
    Ok(db)
}

use schem_common::db::core::CircuitDB;
use schem_common::db::indices::NetId;
use schem_router::RoutingOutcome;
use std::fs::File;
use std::io::Write;

const WIRE_COLORS: [&str; 8] = [
    "#1f77b4", "#d62728", "#2ca02c", "#ff7f0e", "#9467bd", "#17becf", "#e377c2", "#bcbd22",
];

/// Writes the routed schematic as an SVG document: chip boxes with name
/// and type labels, pin markers, one colored polyline per routed net and
/// a footer noting any unrouted connections.
pub fn write_schematic(
    db: &CircuitDB,
    outcome: &RoutingOutcome,
    filename: &str,
) -> std::io::Result<()> {
    let mut file = File::create(filename)?;

    let w = db.canvas.width();
    let h = db.canvas.height();
    writeln!(
        file,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" viewBox=\"0 0 {:.0} {:.0}\">",
        w, h, w, h
    )?;
    writeln!(file, "  <rect width=\"100%\" height=\"100%\" fill=\"#fafafa\"/>")?;

    for i in 0..db.num_chips() {
        let chip = &db.chips[i];
        let pos = db.positions[i];
        let fill = if chip.is_virtual { "#e8eef7" } else { "#fff3d6" };

        writeln!(
            file,
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" stroke=\"#444\" stroke-width=\"1.5\" rx=\"4\"/>",
            pos.x, pos.y, chip.width, chip.height, fill
        )?;
        writeln!(
            file,
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-family=\"monospace\" font-size=\"16\" text-anchor=\"middle\">{}</text>",
            pos.x + chip.width / 2.0,
            pos.y + 24.0,
            chip.name
        )?;
        if !chip.is_virtual {
            writeln!(
                file,
                "  <text x=\"{:.1}\" y=\"{:.1}\" font-family=\"monospace\" font-size=\"11\" fill=\"#777\" text-anchor=\"middle\">{}</text>",
                pos.x + chip.width / 2.0,
                pos.y + 42.0,
                chip.chip_type
            )?;
        }

        for &pin in &chip.pins {
            let p = pos + db.pin_offsets[pin.index()];
            writeln!(
                file,
                "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"#222\"/>",
                p.x, p.y
            )?;
            writeln!(
                file,
                "  <text x=\"{:.1}\" y=\"{:.1}\" font-family=\"monospace\" font-size=\"10\" fill=\"#555\">{}</text>",
                p.x + 5.0,
                p.y - 5.0,
                db.pin_labels[pin.index()]
            )?;
        }
    }

    let mut ids: Vec<NetId> = outcome.routed.keys().copied().collect();
    ids.sort();
    for id in ids {
        let path = &outcome.routed[&id];
        let color = WIRE_COLORS[id.index() % WIRE_COLORS.len()];
        let points: Vec<String> = path
            .points
            .iter()
            .map(|p| format!("{:.1},{:.1}", p.x, p.y))
            .collect();
        writeln!(
            file,
            "  <polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>",
            points.join(" "),
            color
        )?;
    }

    if outcome.failed_count() > 0 {
        writeln!(
            file,
            "  <text x=\"20\" y=\"{:.1}\" font-family=\"monospace\" font-size=\"14\" fill=\"#c0392b\">{} connection(s) could not be routed</text>",
            h - 20.0,
            outcome.failed_count()
        )?;
    }

    writeln!(file, "</svg>")?;
    Ok(())
}

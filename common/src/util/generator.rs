use rand::Rng;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a synthetic benchmark circuit as the three input CSVs. Chips are
/// quad-NAND packages spread across logic layers; nets chain gate outputs
/// to inputs of later layers so most connections route left to right.
pub fn generate_random_circuit(
    dir: &str,
    num_chips: usize,
    num_nets: usize,
) -> std::io::Result<()> {
    let mut rng = rand::thread_rng();
    let num_layers = ((num_chips as f64).sqrt().ceil() as i32).clamp(2, 6);

    log::info!(
        "Generating Benchmark: {} chips, {} nets, {} layers",
        num_chips,
        num_nets,
        num_layers
    );

    let dir = Path::new(dir);
    std::fs::create_dir_all(dir)?;

    let mut file = File::create(dir.join("chip_datasheets.csv"))?;
    writeln!(
        file,
        "chip_type,gate_num,input_pins,output_pin,gate_type,vcc_pin,gnd_pin,total_pins"
    )?;
    for (gate, (a, b, y)) in [(1, 2, 3), (4, 5, 6), (9, 10, 8), (12, 13, 11)]
        .iter()
        .enumerate()
    {
        writeln!(
            file,
            "SN7400,{},\"{}, {}\",{},NAND,14,7,14",
            gate + 1,
            a,
            b,
            y
        )?;
    }

    let mut file = File::create(dir.join("chips.csv"))?;
    writeln!(file, "chip_id,chip_type,gate_num,layer")?;
    let mut layers = Vec::with_capacity(num_chips);
    for i in 0..num_chips {
        let layer = rng.gen_range(0..num_layers);
        layers.push(layer);
        writeln!(file, "U{},SN7400,{},{}", i + 1, rng.gen_range(1..=4), layer)?;
    }

    // Output pins per gate of the SN7400 sheet above.
    let out_pins = [3, 6, 8, 11];
    let in_pins = [1, 2, 4, 5, 9, 10, 12, 13];

    let mut file = File::create(dir.join("connections.csv"))?;
    writeln!(file, "from_chip,from_pin,to_chip,to_pin")?;
    for i in 0..num_nets {
        if i == 0 {
            let sink = rng.gen_range(0..num_chips);
            writeln!(file, "input,A,U{},{}", sink + 1, in_pins[rng.gen_range(0..in_pins.len())])?;
            continue;
        }
        if i == num_nets - 1 {
            let src = rng.gen_range(0..num_chips);
            writeln!(file, "U{},{},output,OUT", src + 1, out_pins[rng.gen_range(0..out_pins.len())])?;
            continue;
        }

        let src = rng.gen_range(0..num_chips);
        // Bias sinks toward later layers to keep the flow directional.
        let candidates: Vec<usize> = (0..4).map(|_| rng.gen_range(0..num_chips)).collect();
        let sink = candidates
            .iter()
            .copied()
            .max_by_key(|&c| layers[c])
            .unwrap_or(src);

        writeln!(
            file,
            "U{},{},U{},{}",
            src + 1,
            out_pins[rng.gen_range(0..out_pins.len())],
            sink + 1,
            in_pins[rng.gen_range(0..in_pins.len())]
        )?;
    }

    Ok(())
}

use anyhow::{Context, Result, anyhow};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};

/// One gate row of a chip datasheet.
#[derive(Clone, Debug)]
pub struct GateEntry {
    pub input_pins: Vec<u32>,
    pub output_pin: u32,
    pub gate_type: String,
    pub vcc_pin: u32,
    pub gnd_pin: u32,
    pub total_pins: u32,
}

/// chip_type -> gate_num -> gate description, gates kept sorted.
pub type Datasheets = HashMap<String, BTreeMap<u32, GateEntry>>;

#[derive(Clone, Debug)]
pub struct ChipInstance {
    pub id: String,
    pub chip_type: String,
    pub gate_num: u32,
    pub layer: i32,
}

/// A raw connection row. `input`/`output` are pseudo-chip names for the
/// circuit boundary; their pins are signal names rather than pin numbers.
#[derive(Clone, Debug)]
pub struct Connection {
    pub from_chip: String,
    pub from_pin: String,
    pub to_chip: String,
    pub to_pin: String,
}

#[derive(Clone, Debug)]
pub struct OutputDef {
    pub name: String,
    pub from_chip: String,
    pub from_pin: String,
}

/// Splits one CSV line, honoring double-quoted fields (the datasheet's
/// input_pins column contains commas).
fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

struct Header {
    columns: HashMap<String, usize>,
}

impl Header {
    fn parse(line: &str) -> Self {
        let columns = split_line(line)
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();
        Self { columns }
    }

    fn field<'a>(&self, row: &'a [String], name: &str) -> Result<&'a str> {
        let &idx = self
            .columns
            .get(name)
            .ok_or_else(|| anyhow!("missing column '{}'", name))?;
        row.get(idx)
            .map(|s| s.as_str())
            .ok_or_else(|| anyhow!("row too short for column '{}'", name))
    }
}

fn read_rows(filename: &str) -> Result<(Header, Vec<Vec<String>>)> {
    let file = File::open(filename).context(format!("Failed to open CSV file: {}", filename))?;
    let reader = BufReader::new(file);

    let mut lines = reader.lines();
    let header_line = lines
        .next()
        .ok_or_else(|| anyhow!("{}: empty file", filename))??;
    let header = Header::parse(&header_line);

    let mut rows = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        rows.push(split_line(&line));
    }
    Ok((header, rows))
}

pub fn load_datasheets(filename: &str) -> Result<Datasheets> {
    log::info!("Parsing Datasheets: {}", filename);
    let (header, rows) = read_rows(filename)?;

    let mut datasheets: Datasheets = HashMap::new();
    for row in &rows {
        let chip_type = header.field(row, "chip_type")?.to_string();
        let gate_num: u32 = header.field(row, "gate_num")?.parse()?;

        let input_pins = header
            .field(row, "input_pins")?
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .context(format!("{}: bad input_pins for {}", filename, chip_type))?;

        let entry = GateEntry {
            input_pins,
            output_pin: header.field(row, "output_pin")?.parse()?,
            gate_type: header.field(row, "gate_type")?.to_string(),
            vcc_pin: header.field(row, "vcc_pin")?.parse()?,
            gnd_pin: header.field(row, "gnd_pin")?.parse()?,
            total_pins: header.field(row, "total_pins")?.parse()?,
        };
        datasheets.entry(chip_type).or_default().insert(gate_num, entry);
    }
    Ok(datasheets)
}

pub fn load_chips(filename: &str, datasheets: &Datasheets) -> Result<Vec<ChipInstance>> {
    log::info!("Parsing Chips: {}", filename);
    let (header, rows) = read_rows(filename)?;

    let mut chips = Vec::new();
    for row in &rows {
        let id = header.field(row, "chip_id")?.to_string();
        let chip_type = header.field(row, "chip_type")?.to_string();

        if !datasheets.contains_key(&chip_type) {
            log::warn!("Chip '{}' references unknown type '{}'. Skipped.", id, chip_type);
            continue;
        }

        chips.push(ChipInstance {
            id,
            chip_type,
            gate_num: header.field(row, "gate_num")?.parse()?,
            layer: header.field(row, "layer")?.parse()?,
        });
    }
    if chips.is_empty() {
        return Err(anyhow!("{}: no chips loaded", filename));
    }
    Ok(chips)
}

/// Loads the connection list, preserving row order. Also collects the
/// distinct input signal names and the output definitions so the boundary
/// boxes can be drawn.
pub fn load_connections(filename: &str) -> Result<(Vec<Connection>, Vec<String>, Vec<OutputDef>)> {
    log::info!("Parsing Connections: {}", filename);
    let (header, rows) = read_rows(filename)?;

    let mut connections = Vec::new();
    let mut inputs: Vec<String> = Vec::new();
    let mut outputs = Vec::new();

    for row in &rows {
        let from_chip = header.field(row, "from_chip")?.to_string();
        let from_pin = header.field(row, "from_pin")?.to_string();
        let to_chip = header.field(row, "to_chip")?.to_string();
        let to_pin = header.field(row, "to_pin")?.to_string();

        if from_chip.eq_ignore_ascii_case("input") {
            if !inputs.contains(&from_pin) {
                inputs.push(from_pin.clone());
            }
        } else if to_chip.eq_ignore_ascii_case("output") {
            outputs.push(OutputDef {
                name: to_pin.clone(),
                from_chip: from_chip.clone(),
                from_pin: from_pin.clone(),
            });
        }

        connections.push(Connection {
            from_chip,
            from_pin,
            to_chip,
            to_pin,
        });
    }
    Ok((connections, inputs, outputs))
}

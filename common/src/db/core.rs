use crate::db::indices::*;
use crate::geom::point::Point;
use crate::geom::rect::Rect;
use std::collections::HashMap;

/// Run direction of a wire segment. Nets carry this as a tie-breaking
/// preference for which L-orientation the router tries first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn flipped(self) -> Orientation {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// One side of a connection as it appears in the input: a component name
/// and a pin label. Resolution to coordinates happens at routing time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PinRef {
    pub chip: String,
    pub pin: String,
}

impl PinRef {
    pub fn new(chip: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            chip: chip.into(),
            pin: pin.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChipData {
    pub name: String,
    pub chip_type: String,
    pub width: f64,
    pub height: f64,
    /// Input/output boxes are virtual components: they occupy canvas space
    /// and block wires like any chip, but carry no datasheet.
    pub is_virtual: bool,
    pub pins: Vec<PinId>,
}

#[derive(Clone, Debug)]
pub struct NetData {
    pub name: String,
    pub from: PinRef,
    pub to: PinRef,
    pub preferred: Orientation,
}

/// A routed wire: an ordered polyline of axis-aligned runs connecting the
/// net's two terminals. Direct routes have 2 points, single-bend routes 3;
/// a displaced corner adds one stitch point to stay Manhattan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Waypath {
    pub points: Vec<Point<f64>>,
}

impl Waypath {
    /// Builds a waypath, dropping repeated points and merging collinear
    /// consecutive runs.
    pub fn new(points: Vec<Point<f64>>) -> Self {
        let mut cleaned: Vec<Point<f64>> = Vec::with_capacity(points.len());
        for p in points {
            if cleaned.last() == Some(&p) {
                continue;
            }
            if cleaned.len() >= 2 {
                let a = cleaned[cleaned.len() - 2];
                let b = cleaned[cleaned.len() - 1];
                let collinear = (a.x == b.x && b.x == p.x) || (a.y == b.y && b.y == p.y);
                if collinear {
                    cleaned.pop();
                }
            }
            cleaned.push(p);
        }
        Self { points: cleaned }
    }

    pub fn runs(&self) -> impl Iterator<Item = (Point<f64>, Point<f64>)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn manhattan_len(&self) -> f64 {
        self.runs().map(|(a, b)| a.manhattan_dist(&b)).sum()
    }

    pub fn source(&self) -> Option<Point<f64>> {
        self.points.first().copied()
    }

    pub fn target(&self) -> Option<Point<f64>> {
        self.points.last().copied()
    }
}

pub struct CircuitDB {
    pub chips: Vec<ChipData>,
    pub nets: Vec<NetData>,

    pub pin_labels: Vec<String>,
    pub pin_offsets: Vec<Point<f64>>,
    pub pin_to_chip: Vec<ChipId>,

    pub positions: Vec<Point<f64>>,
    pub canvas: Rect,

    pub chip_name_map: HashMap<String, ChipId>,
    pin_label_map: HashMap<(ChipId, String), PinId>,
}

impl Default for CircuitDB {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitDB {
    pub fn new() -> Self {
        Self {
            chips: Vec::with_capacity(64),
            nets: Vec::with_capacity(256),
            pin_labels: Vec::with_capacity(512),
            pin_offsets: Vec::with_capacity(512),
            pin_to_chip: Vec::with_capacity(512),
            positions: Vec::with_capacity(64),
            canvas: Rect::default(),
            chip_name_map: HashMap::new(),
            pin_label_map: HashMap::new(),
        }
    }

    pub fn num_chips(&self) -> usize {
        self.chips.len()
    }
    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }

    pub fn add_chip(
        &mut self,
        name: String,
        chip_type: String,
        width: f64,
        height: f64,
        is_virtual: bool,
    ) -> ChipId {
        let id = ChipId::new(self.chips.len());
        self.chips.push(ChipData {
            name: name.clone(),
            chip_type,
            width,
            height,
            is_virtual,
            pins: Vec::new(),
        });
        self.positions.push(Point::new(0.0, 0.0));
        self.chip_name_map.insert(name, id);
        id
    }

    /// Registers a pin on `chip` at `offset` relative to the chip origin.
    /// Later registrations under the same label win, matching how the
    /// original connection lists reuse pin numbers per gate.
    pub fn add_pin(&mut self, chip: ChipId, label: String, offset: Point<f64>) -> PinId {
        let pid = PinId::new(self.pin_offsets.len());
        self.pin_labels.push(label.clone());
        self.pin_offsets.push(offset);
        self.pin_to_chip.push(chip);

        self.chips[chip.index()].pins.push(pid);
        self.pin_label_map.insert((chip, label), pid);
        pid
    }

    pub fn add_net(&mut self, name: String, from: PinRef, to: PinRef) -> NetId {
        let id = NetId::new(self.nets.len());
        self.nets.push(NetData {
            name,
            from,
            to,
            preferred: Orientation::Horizontal,
        });
        id
    }

    /// Terminal lookup: `(component, pin) -> (x, y)`, or `None` when either
    /// the chip name or the pin label is unknown.
    pub fn terminal(&self, r: &PinRef) -> Option<Point<f64>> {
        let &chip = self.chip_name_map.get(&r.chip)?;
        let &pin = self.pin_label_map.get(&(chip, r.pin.clone()))?;
        Some(self.positions[chip.index()] + self.pin_offsets[pin.index()])
    }

    /// Footprint of a chip at its placed position, before obstacle padding.
    pub fn chip_rect(&self, chip: ChipId) -> Rect {
        let pos = self.positions[chip.index()];
        let data = &self.chips[chip.index()];
        Rect::new(pos, Point::new(pos.x + data.width, pos.y + data.height))
    }
}

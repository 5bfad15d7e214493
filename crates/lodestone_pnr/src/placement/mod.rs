//! Instance placement: positions, orientations, and derived geometry.
//!
//! A [`Placement`] assigns every placeable instance a position and a
//! quarter-turn orientation. Everything else — world-frame footprints,
//! pin positions, validity — is derived from the netlist's templates.

mod anneal;
mod cost;
mod random;

pub use anneal::{place, PlacementProblem, PlacerConfig, PlacerOutcome};
pub use cost::{routable_cost, unroutable_cost};
pub use random::{mutated_placement, random_placement};

use lodestone_netlist::{InstanceId, Netlist, PinId, PinIdSequence, PortDirection};
use lodestone_voxel::{any_overlap, Direction, Pos, PositionSequence, Region};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Assignment of each placeable instance to a position and a horizontal
/// orientation.
///
/// The orientation is one of the four horizontal directions; its index in
/// the rotation cycle is the instance's quarter-turn count.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Placement {
    /// Position and orientation per instance.
    pub slots: BTreeMap<InstanceId, (Pos, Direction)>,
}

impl Placement {
    /// An empty placement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of placed instances.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no instances are placed.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Assigns an instance's slot.
    pub fn set(&mut self, id: InstanceId, pos: Pos, direction: Direction) {
        debug_assert!(direction.is_horizontal());
        self.slots.insert(id, (pos, direction));
    }

    /// A stable content hash, usable as a cache key.
    ///
    /// Two placements with equal slots hash equally across runs; object
    /// identity plays no part.
    pub fn content_hash(&self) -> u64 {
        let mut bytes = Vec::with_capacity(self.slots.len() * 17);
        for (&id, &(pos, direction)) in &self.slots {
            bytes.extend_from_slice(&id.as_raw().to_le_bytes());
            for coordinate in [pos.x, pos.y, pos.z] {
                bytes.extend_from_slice(&coordinate.to_le_bytes());
            }
            bytes.push(direction.xz_index().unwrap_or(0) as u8);
        }
        xxhash_rust::xxh3::xxh3_64(&bytes)
    }

    /// The world-frame footprint of one placed instance.
    pub fn instance_region(&self, netlist: &Netlist, id: InstanceId) -> Region {
        let (pos, direction) = self.slots[&id];
        let template = netlist
            .instance(id)
            .template
            .as_ref()
            .expect("placed instances are backed by templates");
        template
            .footprint
            .y_rotated(direction.xz_index().unwrap_or(0))
            .shifted(pos)
    }

    /// The composite of all placed instances' world-frame footprints.
    pub fn region(&self, netlist: &Netlist) -> Region {
        Region::Composite(
            self.slots
                .keys()
                .map(|&id| self.instance_region(netlist, id))
                .collect(),
        )
    }

    /// Whether no two instances' XZ-padded footprints overlap.
    pub fn is_valid(&self, netlist: &Netlist, xz_padding: i32) -> bool {
        let padded: Vec<Region> = self
            .slots
            .keys()
            .map(|&id| self.instance_region(netlist, id).xz_padded(xz_padding))
            .collect();
        !any_overlap(&padded)
    }

    /// World-frame wire positions for a pin sequence.
    ///
    /// The template's pin positions are sliced, offset one block out of
    /// the instance (towards the facing for outputs, away for inputs) and
    /// one block up, then rotated and translated with the instance.
    pub fn pin_seq_positions(
        &self,
        netlist: &Netlist,
        seq: &PinIdSequence,
    ) -> PositionSequence {
        let instance = netlist.instance(seq.port.instance);
        let template = instance
            .template
            .as_ref()
            .expect("pin positions exist only on templated instances");
        let port = &instance.ports[&seq.port.port];
        let layout = &template.pin_layout[&seq.port.port];

        let selected = layout
            .positions
            .sliced(seq.slice)
            .expect("netlist construction validated pin slices");
        let wire_points = selected.shifted(wire_offset(layout.facing, port.direction));

        let (pos, direction) = self.slots[&seq.port.instance];
        wire_points
            .y_rotated(direction.xz_index().unwrap_or(0))
            .shifted(pos)
    }
}

/// The local offset from a pin to the voxel its wire occupies.
fn wire_offset(facing: Direction, port_direction: PortDirection) -> Pos {
    let outward = match port_direction {
        PortDirection::Output => facing.unit(),
        PortDirection::Input => -facing.unit(),
    };
    outward + Direction::Up.unit()
}

/// One driver-pin/sink-pin pair with everything routing and cost need.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct PinPair {
    /// The driving pin.
    pub source_pin: PinId,
    /// World-frame wire voxel of the driving pin.
    pub source_pos: Pos,
    /// Momentum hint at the driver, when known.
    pub source_facing: Option<Direction>,
    /// Stride of the driver's pin row.
    pub source_stride: Pos,
    /// The driven pin.
    pub sink_pin: PinId,
    /// World-frame wire voxel of the driven pin.
    pub sink_pos: Pos,
    /// Momentum hint at the sink, when known.
    pub sink_facing: Option<Direction>,
    /// Stride of the sink's pin row.
    pub sink_stride: Pos,
}

/// Every driver/sink pin pair of the placement, in routing order.
pub fn source_sink_pin_pairs(netlist: &Netlist, placement: &Placement) -> Vec<PinPair> {
    let mut pairs = Vec::new();

    for (source_seq, sink_seq) in netlist.source_sink_seq_pairs() {
        let source_points = placement.pin_seq_positions(netlist, source_seq);
        let sink_points = placement.pin_seq_positions(netlist, sink_seq);

        for (index, (source_pin, sink_pin)) in
            source_seq.pin_ids().zip(sink_seq.pin_ids()).enumerate()
        {
            pairs.push(PinPair {
                source_pin,
                source_pos: source_points.index(index),
                // TODO: derive facing hints from the rotated pin layouts.
                source_facing: None,
                source_stride: source_points.step(),
                sink_pin,
                sink_pos: sink_points.index(index),
                sink_facing: None,
                sink_stride: sink_points.step(),
            });
        }
    }

    pairs
}

//! A small hand-built netlist used across the engine's tests.

use crate::netlist::{Netlist, INPUT_STUB, OUTPUT_STUB};
use crate::port::{PinIdSequence, Port, PortDirection, PortId};
use crate::template::{InstanceTemplate, PinLayout};
use lodestone_voxel::{
    Block, Direction, Pos, PositionSequence, Region, Slice, VoxelSchematic, ZERO_POS,
};
use std::collections::BTreeMap;

fn port(direction: PortDirection, pin_count: u32) -> Port {
    Port {
        direction,
        pin_count,
    }
}

fn pin_row(y: i32, z: i32, span: i32, count: u32) -> PinLayout {
    PinLayout {
        positions: PositionSequence::new(
            Pos::new(0, y, z),
            Pos::new(span, y, z),
            count,
        )
        .expect("pin row spacing is even by construction"),
        facing: Direction::South,
    }
}

fn filled_template(footprint_max: Pos, pin_layout: BTreeMap<String, PinLayout>) -> InstanceTemplate {
    let footprint = Region::prism(ZERO_POS, footprint_max);
    let mut voxels = VoxelSchematic::new();
    for pos in footprint.iter() {
        voxels.set(pos, Block::new("minecraft:smooth_stone"));
    }
    for layout in pin_layout.values() {
        for pos in layout.positions.iter() {
            voxels.set(
                pos,
                Block::with_attributes(
                    "minecraft:repeater",
                    [("facing", "south"), ("delay", "1")],
                ),
            );
        }
    }
    InstanceTemplate {
        footprint,
        voxels,
        pin_layout,
    }
}

/// An inverter template: `in` pins along the north face, `out` pins along
/// the south face, spaced two blocks apart.
pub fn inverter_template(bits: u32) -> InstanceTemplate {
    let span = 2 * (bits as i32 - 1);
    filled_template(
        Pos::new(span, 1, 3),
        BTreeMap::from([
            ("in".to_string(), pin_row(0, 0, span, bits)),
            ("out".to_string(), pin_row(0, 3, span, bits)),
        ]),
    )
}

/// A two-input AND template: `a` and `b` pin rows stacked on the north
/// face, `out` on the south face.
pub fn and_template(bits: u32) -> InstanceTemplate {
    let span = 2 * (bits as i32 - 1);
    filled_template(
        Pos::new(span, 3, 2),
        BTreeMap::from([
            ("a".to_string(), pin_row(2, 0, span, bits)),
            ("b".to_string(), pin_row(0, 0, span, bits)),
            ("out".to_string(), pin_row(1, 2, span, bits)),
        ]),
    )
}

/// The four-instance example circuit: two inverters feeding an AND gate
/// feeding a final inverter, with I/O stubs on the boundary.
pub fn example_netlist(bits: u32) -> Netlist {
    let mut netlist = Netlist::new();

    let not_a = netlist
        .add_instance(
            "not_a",
            BTreeMap::from([
                ("in".to_string(), port(PortDirection::Input, bits)),
                ("out".to_string(), port(PortDirection::Output, bits)),
            ]),
            Some(inverter_template(bits)),
        )
        .expect("example inverter is valid");
    let not_b = netlist
        .add_instance(
            "not_b",
            BTreeMap::from([
                ("in".to_string(), port(PortDirection::Input, bits)),
                ("out".to_string(), port(PortDirection::Output, bits)),
            ]),
            Some(inverter_template(bits)),
        )
        .expect("example inverter is valid");
    let and = netlist
        .add_instance(
            "and",
            BTreeMap::from([
                ("a".to_string(), port(PortDirection::Input, bits)),
                ("b".to_string(), port(PortDirection::Input, bits)),
                ("out".to_string(), port(PortDirection::Output, bits)),
            ]),
            Some(and_template(bits)),
        )
        .expect("example AND gate is valid");
    let not_out = netlist
        .add_instance(
            "not_out",
            BTreeMap::from([
                ("in".to_string(), port(PortDirection::Input, bits)),
                ("out".to_string(), port(PortDirection::Output, bits)),
            ]),
            Some(inverter_template(bits)),
        )
        .expect("example inverter is valid");

    // The stubs' port directions are inverted relative to the boundary.
    let input = netlist
        .add_instance(
            INPUT_STUB,
            BTreeMap::from([
                ("a".to_string(), port(PortDirection::Output, bits)),
                ("b".to_string(), port(PortDirection::Output, bits)),
            ]),
            None,
        )
        .expect("input stub is valid");
    let output = netlist
        .add_instance(
            OUTPUT_STUB,
            BTreeMap::from([("out".to_string(), port(PortDirection::Input, bits))]),
            None,
        )
        .expect("output stub is valid");

    let seq = |instance, port: &str| PinIdSequence {
        port: PortId {
            instance,
            port: port.to_string(),
        },
        slice: Slice::from_len(bits),
    };

    let connections = [
        (seq(not_a, "out"), seq(and, "a")),
        (seq(not_b, "out"), seq(and, "b")),
        (seq(and, "out"), seq(not_out, "in")),
        (seq(input, "a"), seq(not_a, "in")),
        (seq(input, "b"), seq(not_b, "in")),
        (seq(not_out, "out"), seq(output, "out")),
    ];
    for (driver, sink) in connections {
        netlist
            .add_network(driver, vec![sink])
            .expect("example networks are valid");
    }

    netlist
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_validate() {
        for bits in [1, 2, 4, 8] {
            let netlist = example_netlist(bits);
            assert_eq!(netlist.network_count(), 6);
            for instance in netlist.placeable_instances() {
                let template = instance.template.as_ref().unwrap();
                assert_eq!(template.validate(&instance.ports), Ok(()));
            }
        }
    }

    #[test]
    fn pin_rows_sit_inside_footprints() {
        let netlist = example_netlist(4);
        for instance in netlist.placeable_instances() {
            let template = instance.template.as_ref().unwrap();
            for layout in template.pin_layout.values() {
                for pos in layout.positions.iter() {
                    assert!(template.footprint.contains(pos), "{pos:?} outside footprint");
                }
            }
        }
    }

    #[test]
    fn template_voxels_cover_footprint() {
        let template = inverter_template(2);
        assert_eq!(template.voxels.len(), template.footprint.len());
    }
}

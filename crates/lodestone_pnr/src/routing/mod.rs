//! Wire routing: one constraint-aware A* route per sink pin.
//!
//! Wires are routed strictly sequentially in the netlist's fixed order;
//! the k-th route sees routes `0..k-1` (and the padded instance
//! footprints) as obstacles. The order is deterministic given the
//! netlist, and changing it changes results.

pub mod pathfind;
pub mod wire;

pub use pathfind::{min_route_cost, WireRoute};
pub use wire::{SignalStrength, StepKind, WirePath, WireStep};

use crate::error::RouteError;
use crate::placement::{source_sink_pin_pairs, Placement};
use lodestone_netlist::{Netlist, PinId};
use lodestone_voxel::Pos;
use std::collections::{BTreeMap, HashSet};
use wire::ObstacleField;

/// The routed wire paths, keyed by sink pin.
pub type RoutedWires = BTreeMap<PinId, WirePath>;

/// Routes every driver/sink pin pair of the placement.
///
/// Returns the per-sink wire paths, or the first routing failure.
pub fn route_all(
    netlist: &Netlist,
    placement: &Placement,
    max_steps: usize,
) -> Result<RoutedWires, RouteError> {
    let instance_points: HashSet<Pos> = placement
        .region(netlist)
        .xz_padded(1)
        .iter()
        .collect();

    let mut routed = RoutedWires::new();
    let mut accumulated = WirePath::default();

    for pair in source_sink_pin_pairs(netlist, placement) {
        let obstacles = ObstacleField::new(&accumulated, instance_points.clone());
        let route = WireRoute {
            start: pair.source_pos,
            end: pair.sink_pos,
            start_hint: pair.source_facing,
            end_hint: pair.sink_facing,
        };
        let path = pathfind::route_wire(&route, &obstacles, max_steps)?;

        tracing::debug!(
            sink = ?pair.sink_pin,
            elements = path.element_strengths.len(),
            "routed wire",
        );

        accumulated = accumulated.union(path.clone());
        routed.insert(pair.sink_pin, path);
    }

    Ok(routed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::Placement;
    use lodestone_netlist::example::example_netlist;
    use lodestone_voxel::Direction;

    fn spread_placement(netlist: &Netlist) -> Placement {
        // Signal flows south through a well-separated layout: the two
        // inverters' outputs face the AND gate, which feeds the final
        // inverter further south.
        let mut placement = Placement::new();
        for (name, pos) in [
            ("not_a", Pos::new(0, 0, 0)),
            ("not_b", Pos::new(12, 0, 0)),
            ("and", Pos::new(4, 0, 12)),
            ("not_out", Pos::new(4, 0, 24)),
        ] {
            let id = netlist.instance_named(name).unwrap().id;
            placement.set(id, pos, Direction::North);
        }
        placement
    }

    #[test]
    fn routes_every_sink_pin() {
        let netlist = example_netlist(1);
        let placement = spread_placement(&netlist);
        let wires = route_all(&netlist, &placement, 20_000).unwrap();

        // One sink pin per connection between placeable instances.
        assert_eq!(wires.len(), 3);
        for (pin, path) in &wires {
            assert!(!path.element_strengths.is_empty(), "empty path for {pin:?}");
        }
    }

    #[test]
    fn wires_respect_earlier_wires_and_footprints() {
        let netlist = example_netlist(1);
        let placement = spread_placement(&netlist);
        let wires = route_all(&netlist, &placement, 20_000).unwrap();

        let pairs = source_sink_pin_pairs(&netlist, &placement);
        let mut seen = WirePath::default();
        for pair in pairs {
            let path = &wires[&pair.sink_pin];
            // Elements and foundations stay off earlier wires, except at
            // shared driver voxels.
            for pos in path.element_strengths.keys() {
                if seen.element_strengths.contains_key(pos) {
                    assert_eq!(*pos, pair.source_pos, "unexpected overlap at {pos:?}");
                }
            }
            seen = seen.clone().union(path.clone());
        }
    }

    #[test]
    fn start_and_end_carry_expected_strengths() {
        let netlist = example_netlist(1);
        let placement = spread_placement(&netlist);
        let wires = route_all(&netlist, &placement, 20_000).unwrap();
        let pairs = source_sink_pin_pairs(&netlist, &placement);

        for pair in pairs {
            let path = &wires[&pair.sink_pin];
            assert_eq!(
                path.element_strengths[&pair.source_pos],
                SignalStrength::Wire(15)
            );
            match path.element_strengths[&pair.sink_pos] {
                SignalStrength::Wire(strength) => assert!(strength > 0),
                SignalStrength::Repeater => panic!("sink must not be a repeater"),
            }
        }
    }
}

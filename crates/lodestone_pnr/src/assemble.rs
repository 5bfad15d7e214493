//! Final voxel assembly: placed templates plus routed wires.

use crate::error::AssemblyError;
use crate::placement::Placement;
use crate::routing::{RoutedWires, WirePath};
use lodestone_netlist::Netlist;
use lodestone_voxel::VoxelSchematic;
use std::collections::HashSet;

/// Merges every placed template's voxels and every routed wire's voxels
/// into one schematic.
///
/// Wire paths are unioned first (paths sharing a driver share their
/// start voxels) and emitted once, with support blocks shaded by power
/// class. Template voxels may never overlap each other or the wiring.
pub fn assemble(
    netlist: &Netlist,
    placement: &Placement,
    wires: &RoutedWires,
) -> Result<VoxelSchematic, AssemblyError> {
    let mut combined = VoxelSchematic::new();

    for (&id, &(pos, direction)) in &placement.slots {
        let instance = netlist.instance(id);
        let template = instance
            .template
            .as_ref()
            .expect("placed instances are backed by templates");
        let placed = template
            .voxels
            .y_rotated(direction.xz_index().unwrap_or(0))
            .shifted(pos);

        combined = combined.merged(placed).map_err(|overlap| {
            AssemblyError::OverlappingPlacement {
                instance: instance.name.clone(),
                pos: overlap.pos,
            }
        })?;
    }

    let merged_wiring = wires
        .values()
        .fold(WirePath::default(), |acc, path| acc.union(path.clone()));
    let wire_blocks = merged_wiring.blocks(&HashSet::new(), None);

    combined
        .merged(wire_blocks)
        .map_err(|overlap| AssemblyError::WiringOverlap { pos: overlap.pos })
}

//! Random initial placement and the annealing mutation operator.

use crate::placement::Placement;
use lodestone_netlist::Netlist;
use lodestone_voxel::{Direction, Pos, ZERO_POS};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

/// Rejected samples per instance before growing the placement volume.
const MAX_PLACEMENT_ATTEMPTS: usize = 40;

/// Padding used when validating candidate random placements.
const RANDOM_PLACEMENT_PADDING: i32 = 3;

fn random_pos(rng: &mut dyn RngCore, inclusive_max: Pos) -> Pos {
    let axis = |rng: &mut dyn RngCore, max: i32| {
        if max <= 0 {
            0
        } else {
            rng.gen_range(0..=max)
        }
    };
    Pos::new(
        axis(rng, inclusive_max.x),
        axis(rng, inclusive_max.y),
        axis(rng, inclusive_max.z),
    )
}

fn random_xz_direction(rng: &mut dyn RngCore) -> Direction {
    *Direction::XZ
        .choose(rng)
        .expect("the direction table is nonempty")
}

/// Produces a random non-overlapping placement by rejection sampling.
///
/// Instances are dropped one at a time into a volume sized to the sum of
/// footprint extents plus slack; each gets a bounded number of samples
/// before the whole pass restarts with a larger volume, so the operation
/// always terminates with a placement.
pub fn random_placement(netlist: &Netlist, rng: &mut dyn RngCore) -> Placement {
    let instances: Vec<_> = netlist.placeable_instances().collect();

    let footprint_extent = |instance: &lodestone_netlist::Instance| {
        instance
            .template
            .as_ref()
            .and_then(|template| template.footprint.bounds())
            .map(|(_, max)| max + Pos::new(1, 1, 1))
            .unwrap_or(ZERO_POS)
    };

    let mut volume = instances
        .iter()
        .fold(Pos::new(8, 8, 8), |acc, instance| {
            acc + footprint_extent(instance)
        });

    'pass: loop {
        let mut placement = Placement::new();
        for instance in &instances {
            let extent = footprint_extent(instance);
            let limit = volume - extent - Pos::new(1, 1, 1);

            let mut placed = false;
            for _ in 0..MAX_PLACEMENT_ATTEMPTS {
                let pos = random_pos(rng, limit);
                let direction = random_xz_direction(rng);
                placement.set(instance.id, pos, direction);
                if placement.is_valid(netlist, RANDOM_PLACEMENT_PADDING) {
                    placed = true;
                    break;
                }
                placement.slots.remove(&instance.id);
            }

            if !placed {
                tracing::debug!(
                    instance = %instance.name,
                    ?volume,
                    "random placement pass failed; growing volume",
                );
                volume += Pos::new(8, 8, 8);
                continue 'pass;
            }
        }
        return placement;
    }
}

/// Mutates one instance's slot: occasionally re-rolls the orientation,
/// always nudges the position by one random unit step.
fn mutated_slot(
    slot: (Pos, Direction),
    rng: &mut dyn RngCore,
) -> (Pos, Direction) {
    let (mut pos, mut direction) = slot;
    if rng.gen::<f64>() < 0.1 {
        direction = random_xz_direction(rng);
    }
    let nudge = *Direction::ALL
        .choose(rng)
        .expect("the direction table is nonempty");
    pos += nudge.unit();
    (pos, direction)
}

/// The annealing mutation operator.
///
/// Tweaks `max(n/3, 2)` random instances, then occasionally swaps two
/// instances' slots outright.
pub fn mutated_placement(placement: &Placement, rng: &mut dyn RngCore) -> Placement {
    let ids: Vec<_> = placement.slots.keys().copied().collect();
    if ids.is_empty() {
        return placement.clone();
    }

    let tweak_count = (ids.len() / 3).max(2).min(ids.len());
    let tweaked_ids: Vec<_> = ids
        .choose_multiple(rng, tweak_count)
        .copied()
        .collect();

    let mut mutated = placement.clone();
    for id in tweaked_ids {
        let slot = mutated.slots[&id];
        mutated.slots.insert(id, mutated_slot(slot, rng));
    }

    if ids.len() > 1 && rng.gen::<f64>() < 0.1 {
        let swapped: Vec<_> = ids.choose_multiple(rng, 2).copied().collect();
        let (first, second) = (swapped[0], swapped[1]);
        let first_slot = mutated.slots[&first];
        let second_slot = mutated.slots[&second];
        mutated.slots.insert(first, second_slot);
        mutated.slots.insert(second, first_slot);
    }

    mutated
}

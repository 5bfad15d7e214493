//! Wire paths and the voxel bookkeeping behind signal propagation.
//!
//! A [`WirePath`] describes one or more routed wires: which voxels carry
//! elements (wire dust or repeaters) at which signal strengths, plus the
//! spacer and airspace voxels the propagation rules demand. Derived sets
//! (foundations, powered voxels, power-sensitive voxels) are computed from
//! those four maps.
//!
//! During search the per-state path is truncated to the last two elements,
//! so derived sets stay tiny; the accumulated context of previously routed
//! wires is snapshotted once per route into an [`ObstacleField`].

use lodestone_voxel::{Block, Direction, Pos, Prism, VoxelSchematic};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Signal strength carried by one element voxel.
///
/// Wire dust carries 1..=15 and attenuates by one per step; `Repeater`
/// marks an element about to re-amplify the signal to 15.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug,
    serde::Serialize, serde::Deserialize,
)]
pub enum SignalStrength {
    /// Plain wire dust at the given strength (1..=15).
    Wire(u8),
    /// A repeater element; the next wire voxel sees strength 15.
    Repeater,
}

/// One search action: place the next element at `next_pos`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct WireStep {
    /// Where the new element goes.
    pub next_pos: Pos,
    /// What kind of element it is.
    pub kind: StepKind,
}

/// The element kind a [`WireStep`] places.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum StepKind {
    /// Wire dust.
    Wire,
    /// A repeater facing the given horizontal direction.
    Repeater {
        /// Direction the repeater drives towards.
        facing: Direction,
    },
}

impl WireStep {
    /// Whether this step places a repeater.
    pub fn is_repeater(&self) -> bool {
        matches!(self.kind, StepKind::Repeater { .. })
    }

    /// Whether this step places wire dust.
    pub fn is_wire(&self) -> bool {
        matches!(self.kind, StepKind::Wire)
    }

    /// The repeater facing, if any.
    pub fn facing(&self) -> Option<Direction> {
        match self.kind {
            StepKind::Repeater { facing } => Some(facing),
            StepKind::Wire => None,
        }
    }

    /// Enumerates the candidate next steps from this element.
    ///
    /// Wires move one block in a horizontal direction, optionally rising
    /// or dropping one block; they never drop off a transparent
    /// foundation. Repeaters move one block horizontally, optionally
    /// dropping one block, but may only drop off a solid (soft-powered)
    /// foundation.
    pub fn successors(&self, transparent_foundation: bool) -> Vec<WireStep> {
        let foundation_soft_powered = !(self.is_repeater() || transparent_foundation);

        let mut steps = Vec::with_capacity(20);
        for direction in Direction::XZ {
            for elevation in [-1, 0, 1] {
                if transparent_foundation && elevation == -1 {
                    continue;
                }
                steps.push(WireStep {
                    next_pos: self.next_pos + direction.unit() + Pos::new(0, elevation, 0),
                    kind: StepKind::Wire,
                });
            }
        }
        for direction in Direction::XZ {
            for step_down in [true, false] {
                if step_down && !foundation_soft_powered {
                    continue;
                }
                let drop = if step_down {
                    Direction::Down.unit()
                } else {
                    Pos::new(0, 0, 0)
                };
                steps.push(WireStep {
                    next_pos: self.next_pos + direction.unit() + drop,
                    kind: StepKind::Repeater { facing: direction },
                });
            }
        }
        steps
    }
}

/// The voxel sets of one or more routed wires.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub struct WirePath {
    /// Every element voxel and its signal strength.
    pub element_strengths: BTreeMap<Pos, SignalStrength>,
    /// The subset of elements that are repeaters, with their facing.
    pub repeater_facings: BTreeMap<Pos, Direction>,
    /// Solid voxels inserted to isolate or bridge wires.
    pub spacers: BTreeSet<Pos>,
    /// Voxels that must stay clear (or transparent) for connectivity.
    pub airspace: BTreeSet<Pos>,
}

impl WirePath {
    /// A path holding a single wire element at full strength.
    pub fn source_at(pos: Pos) -> Self {
        Self {
            element_strengths: BTreeMap::from([(pos, SignalStrength::Wire(15))]),
            ..Self::default()
        }
    }

    /// Whether the path holds no voxels at all.
    pub fn is_empty(&self) -> bool {
        self.element_strengths.is_empty()
            && self.repeater_facings.is_empty()
            && self.spacers.is_empty()
            && self.airspace.is_empty()
    }

    /// Whether the voxel holds a repeater element.
    pub fn is_repeater(&self, pos: Pos) -> bool {
        self.repeater_facings.contains_key(&pos)
    }

    /// The structural voxel directly beneath every element.
    pub fn foundations(&self) -> BTreeSet<Pos> {
        self.element_strengths
            .keys()
            .map(|&pos| pos + Direction::Down.unit())
            .collect()
    }

    /// Element voxels that are plain wire dust.
    pub fn wires(&self) -> BTreeSet<Pos> {
        self.element_strengths
            .keys()
            .filter(|pos| !self.repeater_facings.contains_key(pos))
            .copied()
            .collect()
    }

    /// Foundations and spacers that are not themselves elements.
    pub fn non_element_solids(&self) -> BTreeSet<Pos> {
        let mut solids = self.foundations();
        solids.extend(self.spacers.iter().copied());
        solids
            .into_iter()
            .filter(|pos| !self.element_strengths.contains_key(pos))
            .collect()
    }

    /// Voxels hard-powered by this path's repeaters.
    pub fn hard_powered(&self) -> BTreeSet<Pos> {
        self.repeater_facings
            .iter()
            .map(|(&pos, &facing)| pos + facing.unit())
            .collect()
    }

    /// Voxels whose hard-powering would corrupt this path's signals.
    pub fn hard_power_sensitive(&self) -> BTreeSet<Pos> {
        let mut sensitive = self.soft_power_sensitive();
        for wire in self.wires() {
            sensitive.insert(wire);
            for direction in Direction::ALL {
                sensitive.insert(wire + direction.unit());
            }
        }
        sensitive
    }

    /// Voxels whose soft-powering would corrupt this path's signals:
    /// each repeater's input block.
    pub fn soft_power_sensitive(&self) -> BTreeSet<Pos> {
        self.repeater_facings
            .iter()
            .map(|(&pos, &facing)| pos - facing.unit())
            .collect()
    }

    /// Voxels soft-powered by this path: hard-powered voxels, wire
    /// foundations, and the blocks each wire visibly points into.
    pub fn soft_powered(&self) -> BTreeSet<Pos> {
        let mut powered = self.hard_powered();
        powered.extend(self.foundations());
        for wire in self.wires() {
            for direction in self.wire_possible_directions(wire) {
                powered.insert(wire + direction.unit());
            }
        }
        powered
    }

    /// The horizontal directions a wire voxel may point, judged from the
    /// adjacent wire voxels at the three relevant heights.
    pub fn wire_possible_directions(&self, wire: Pos) -> Vec<Direction> {
        let wires = self.wires();
        let connected: Vec<Direction> = Direction::XZ
            .into_iter()
            .filter(|direction| {
                [-1, 0, 1].into_iter().any(|dy| {
                    wires.contains(&(wire + direction.unit() + Pos::new(0, dy, 0)))
                })
            })
            .collect();

        match connected.len() {
            0 => Direction::XZ.to_vec(),
            1 => vec![connected[0], connected[0].opposite()],
            _ => connected,
        }
    }

    /// Foundations that must stay transparent, given the other wires'
    /// airspace voxels.
    pub fn transparent_foundations(&self, other_airspace: &HashSet<Pos>) -> BTreeSet<Pos> {
        self.foundations()
            .into_iter()
            .filter(|pos| self.airspace.contains(pos) || other_airspace.contains(pos))
            .collect()
    }

    /// Every voxel the path occupies or reserves.
    pub fn all_voxels(&self) -> BTreeSet<Pos> {
        let mut all: BTreeSet<Pos> = self.element_strengths.keys().copied().collect();
        all.extend(self.foundations());
        all.extend(self.spacers.iter().copied());
        all.extend(self.airspace.iter().copied());
        all
    }

    /// Joins two wire paths.
    ///
    /// Only valid when one path was accreted step-by-step against the
    /// other as obstacles, or when the paths occupy disjoint regions.
    pub fn union(mut self, other: WirePath) -> WirePath {
        self.element_strengths.extend(other.element_strengths);
        self.repeater_facings.extend(other.repeater_facings);
        self.spacers.extend(other.spacers);
        self.airspace.extend(other.airspace);
        self
    }

    /// The step that produced the element at `pos`.
    pub fn step_at(&self, pos: Pos) -> WireStep {
        WireStep {
            next_pos: pos,
            kind: match self.repeater_facings.get(&pos) {
                Some(&facing) => StepKind::Repeater { facing },
                None => StepKind::Wire,
            },
        }
    }

    /// Drops history beyond the current and previous elements.
    ///
    /// Bounds search-state size so A* converges; the found action
    /// sequence is re-verified against untruncated state afterwards.
    pub fn truncated(&self, current: Pos, previous: Pos) -> WirePath {
        WirePath {
            element_strengths: self
                .element_strengths
                .iter()
                .filter(|(&pos, _)| pos == current || pos == previous)
                .map(|(&pos, &strength)| (pos, strength))
                .collect(),
            repeater_facings: self
                .repeater_facings
                .iter()
                .filter(|(&pos, _)| pos == current)
                .map(|(&pos, &facing)| (pos, facing))
                .collect(),
            spacers: self.spacers.iter().copied().filter(|&pos| pos == current).collect(),
            airspace: self.airspace.iter().copied().filter(|&pos| pos == current).collect(),
        }
    }

    /// Emits the path's concrete blocks.
    ///
    /// `other_airspace` decides which foundations must render transparent;
    /// `color` tints solid support blocks, otherwise they are shaded by
    /// power class.
    pub fn blocks(&self, other_airspace: &HashSet<Pos>, color: Option<&str>) -> VoxelSchematic {
        let mut schematic = VoxelSchematic::new();
        let all = self.all_voxels();
        let (min, max) = match (all.iter().next(), all.iter().next_back()) {
            (Some(&first), Some(_)) => {
                let mut min = first;
                let mut max = first;
                for &pos in &all {
                    min = min.elem_min(pos);
                    max = max.elem_max(pos);
                }
                (min, max)
            }
            _ => return schematic,
        };

        let transparent = self.transparent_foundations(other_airspace);
        let non_element_solids = self.non_element_solids();
        let hard_powered = self.hard_powered();
        let soft_powered = self.soft_powered();

        for pos in Prism::new(min, max).iter() {
            if self.element_strengths.contains_key(&pos) {
                let block = match self.repeater_facings.get(&pos) {
                    Some(&facing) => Block::with_attributes(
                        "minecraft:repeater",
                        [
                            ("delay", "1".to_string()),
                            ("facing", facing.opposite().to_string()),
                            ("locked", "false".to_string()),
                            ("powered", "false".to_string()),
                        ],
                    ),
                    None => Block::new("minecraft:redstone_wire"),
                };
                schematic.set(pos, block);
                continue;
            }

            if !non_element_solids.contains(&pos) {
                continue;
            }

            let id = if transparent.contains(&pos) {
                match color {
                    Some(color) => format!("minecraft:{color}_stained_glass"),
                    None => "minecraft:glass".to_string(),
                }
            } else if let Some(color) = color {
                format!("minecraft:{color}_wool")
            } else if hard_powered.contains(&pos) {
                "minecraft:black_wool".to_string()
            } else if soft_powered.contains(&pos) {
                "minecraft:gray_wool".to_string()
            } else {
                "minecraft:white_wool".to_string()
            };
            schematic.set(pos, Block::new(id));
        }

        schematic
    }
}

/// Precomputed obstacle lookups for one routing invocation.
///
/// Snapshots every derived set of the accumulated other-wire path, plus
/// the padded instance voxels, as hash sets so the inner search loop only
/// pays membership tests.
#[derive(Debug, Default)]
pub(crate) struct ObstacleField {
    pub instance_points: HashSet<Pos>,
    pub element_foundations: HashSet<Pos>,
    pub foundations: HashSet<Pos>,
    pub wires: HashSet<Pos>,
    pub spacers: HashSet<Pos>,
    pub airspace: HashSet<Pos>,
    pub hard_powered: HashSet<Pos>,
    pub soft_powered: HashSet<Pos>,
    pub soft_power_sensitive: HashSet<Pos>,
    pub hard_power_sensitive: HashSet<Pos>,
}

impl ObstacleField {
    pub(crate) fn new(other_wires: &WirePath, instance_points: HashSet<Pos>) -> Self {
        let mut element_foundations: HashSet<Pos> =
            other_wires.element_strengths.keys().copied().collect();
        element_foundations.extend(other_wires.foundations());

        Self {
            instance_points,
            element_foundations,
            foundations: other_wires.foundations().into_iter().collect(),
            wires: other_wires.wires().into_iter().collect(),
            spacers: other_wires.spacers.iter().copied().collect(),
            airspace: other_wires.airspace.iter().copied().collect(),
            hard_powered: other_wires.hard_powered().into_iter().collect(),
            soft_powered: other_wires.soft_powered().into_iter().collect(),
            soft_power_sensitive: other_wires.soft_power_sensitive().into_iter().collect(),
            hard_power_sensitive: other_wires.hard_power_sensitive().into_iter().collect(),
        }
    }
}

impl WirePath {
    /// Extends the path by one step, enforcing every propagation rule.
    ///
    /// Returns `None` when the step is inadmissible. The rules, in the
    /// order checked:
    ///
    /// - the new element and its foundation may not collide with any
    ///   element or foundation of this path, the other wires, or the
    ///   placed instances (the end voxel is exempt);
    /// - a new wire may not sit beside another wire (at any of the three
    ///   heights) without a spacer between them, beside a hard-powered
    ///   voxel, or beside/above a soft-power-sensitive voxel;
    /// - a new repeater's input may not be powered by other wires, and
    ///   its output may not drive a power-sensitive voxel;
    /// - signal strength attenuates by one per wire voxel and must stay
    ///   above zero; repeaters reset it to 15;
    /// - a drop after a repeater needs a spacer above the landing to
    ///   carry the signal down; height changes reserve an airspace voxel
    ///   above the lower wire;
    /// - spacers may not land on airspace (ours or others'), and new
    ///   airspace may not land on others' solid foundations or spacers.
    pub(crate) fn with_step(
        &self,
        obstacles: &ObstacleField,
        prev_pos: Pos,
        end_pos: Pos,
        step: WireStep,
    ) -> Option<WirePath> {
        let up = Direction::Up.unit();
        let down = Direction::Down.unit();
        let next = step.next_pos;
        let below = next + down;
        let at_end = next == end_pos;

        let xz_neighbors: Vec<Pos> =
            Direction::XZ.iter().map(|d| next + d.unit()).collect();

        let self_foundations = self.foundations();
        let collides = |pos: &Pos| {
            obstacles.element_foundations.contains(pos)
                || obstacles.instance_points.contains(pos)
                || self.element_strengths.contains_key(pos)
                || self_foundations.contains(pos)
        };
        if !at_end && (collides(&next) || collides(&below)) {
            return None;
        }

        if step.is_wire() {
            let adjacent_wire = xz_neighbors.iter().any(|&neighbor| {
                [-1, 0, 1].into_iter().any(|dy| {
                    let candidate = neighbor + Pos::new(0, dy, 0);
                    obstacles.wires.contains(&candidate)
                        && (dy != -1 || !obstacles.spacers.contains(&(candidate + up)))
                        && (dy != 1 || !obstacles.spacers.contains(&(next + up)))
                })
            });
            let adjacent_hard_powered = Direction::ALL
                .iter()
                .any(|d| obstacles.hard_powered.contains(&(next + d.unit())));
            let disturbs_sensitive = xz_neighbors
                .iter()
                .any(|pos| obstacles.soft_power_sensitive.contains(pos))
                || obstacles.soft_power_sensitive.contains(&below);

            if adjacent_wire || adjacent_hard_powered || disturbs_sensitive {
                return None;
            }
        }

        if let Some(facing) = step.facing() {
            let noisy_input =
                obstacles.soft_powered.contains(&(next + facing.opposite().unit()));
            let output_disturbs =
                obstacles.hard_power_sensitive.contains(&(next + facing.unit()));
            if noisy_input || output_disturbs {
                return None;
            }
        }

        let next_strength = if step.is_repeater() {
            SignalStrength::Repeater
        } else {
            match self.element_strengths.get(&prev_pos) {
                Some(SignalStrength::Repeater) => SignalStrength::Wire(15),
                Some(&SignalStrength::Wire(strength)) => {
                    if strength <= 1 {
                        return None;
                    }
                    SignalStrength::Wire(strength - 1)
                }
                None => return None,
            }
        };

        let mut repeater_facings = self.repeater_facings.clone();
        if let Some(facing) = step.facing() {
            repeater_facings.insert(next, facing);
        }

        let mut new_spacers = BTreeSet::new();

        // A drop right after a repeater needs a solid block above the
        // landing wire to carry the signal down.
        let prev_was_repeater = self.repeater_facings.contains_key(&prev_pos);
        if prev_was_repeater && next.y < prev_pos.y {
            new_spacers.insert(next + up);
        }

        if step.is_wire() {
            if xz_neighbors
                .iter()
                .any(|&neighbor| obstacles.wires.contains(&(neighbor + up)))
            {
                new_spacers.insert(next + up);
            }
            for &neighbor in &xz_neighbors {
                if obstacles.wires.contains(&(neighbor + down)) {
                    new_spacers.insert(neighbor);
                }
            }
        }

        let mut spacers = self.spacers.clone();
        spacers.extend(new_spacers.iter().copied());

        let mut new_airspace = BTreeSet::new();
        if next.y < prev_pos.y {
            new_airspace.insert(next + up);
        }
        if next.y > prev_pos.y {
            new_airspace.insert(prev_pos + up);
        }

        let mut airspace = self.airspace.clone();
        airspace.extend(new_airspace.iter().copied());

        if spacers.iter().any(|pos| airspace.contains(pos)) {
            return None;
        }
        if new_spacers.iter().any(|pos| obstacles.airspace.contains(pos)) {
            return None;
        }

        let airspace_conflicts = new_airspace
            .iter()
            .filter(|pos| !obstacles.airspace.contains(pos))
            .any(|pos| {
                obstacles.foundations.contains(pos) || obstacles.spacers.contains(pos)
            });
        if airspace_conflicts {
            return None;
        }

        let mut element_strengths = self.element_strengths.clone();
        element_strengths.insert(next, next_strength);

        Some(WirePath {
            element_strengths,
            repeater_facings,
            spacers,
            airspace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_path() -> WirePath {
        // Three wire elements marching east at y = 0.
        WirePath {
            element_strengths: BTreeMap::from([
                (Pos::new(0, 0, 0), SignalStrength::Wire(15)),
                (Pos::new(1, 0, 0), SignalStrength::Wire(14)),
                (Pos::new(2, 0, 0), SignalStrength::Wire(13)),
            ]),
            ..WirePath::default()
        }
    }

    #[test]
    fn foundations_sit_below_elements() {
        let path = straight_path();
        let foundations = path.foundations();
        assert!(foundations.contains(&Pos::new(0, -1, 0)));
        assert!(foundations.contains(&Pos::new(2, -1, 0)));
        assert_eq!(foundations.len(), 3);
    }

    #[test]
    fn repeaters_split_out_of_wires() {
        let mut path = straight_path();
        path.element_strengths
            .insert(Pos::new(3, 0, 0), SignalStrength::Repeater);
        path.repeater_facings
            .insert(Pos::new(3, 0, 0), Direction::East);

        assert_eq!(path.wires().len(), 3);
        assert!(path.is_repeater(Pos::new(3, 0, 0)));
        assert_eq!(
            path.hard_powered(),
            BTreeSet::from([Pos::new(4, 0, 0)])
        );
        assert_eq!(
            path.soft_power_sensitive(),
            BTreeSet::from([Pos::new(2, 0, 0)])
        );
    }

    #[test]
    fn middle_wire_points_along_the_run() {
        let path = straight_path();
        let directions = path.wire_possible_directions(Pos::new(1, 0, 0));
        assert_eq!(directions.len(), 2);
        assert!(directions.contains(&Direction::East));
        assert!(directions.contains(&Direction::West));
    }

    #[test]
    fn lone_wire_points_everywhere() {
        let path = WirePath::source_at(Pos::new(0, 0, 0));
        assert_eq!(
            path.wire_possible_directions(Pos::new(0, 0, 0)).len(),
            4
        );
    }

    #[test]
    fn union_is_idempotent() {
        let path = straight_path();
        assert_eq!(path.clone().union(path.clone()), path);
    }

    #[test]
    fn union_merges_disjoint_paths() {
        let a = WirePath::source_at(Pos::new(0, 0, 0));
        let b = WirePath::source_at(Pos::new(10, 0, 0));
        let both = a.union(b);
        assert_eq!(both.element_strengths.len(), 2);
    }

    #[test]
    fn truncation_keeps_last_two_elements() {
        let path = straight_path();
        let truncated = path.truncated(Pos::new(2, 0, 0), Pos::new(1, 0, 0));
        assert_eq!(truncated.element_strengths.len(), 2);
        assert!(truncated
            .element_strengths
            .contains_key(&Pos::new(2, 0, 0)));
        assert!(!truncated
            .element_strengths
            .contains_key(&Pos::new(0, 0, 0)));
    }

    #[test]
    fn successor_counts() {
        let wire = WireStep {
            next_pos: Pos::new(0, 0, 0),
            kind: StepKind::Wire,
        };
        // 4 directions x 3 elevations wire steps, 4 x 2 repeater steps.
        assert_eq!(wire.successors(false).len(), 20);
        // Transparent foundation: no wire drops, no repeater drops.
        assert_eq!(wire.successors(true).len(), 12);

        let repeater = WireStep {
            next_pos: Pos::new(0, 0, 0),
            kind: StepKind::Repeater {
                facing: Direction::East,
            },
        };
        // Repeater foundations are never soft-powered: no repeater drops.
        assert_eq!(repeater.successors(false).len(), 16);
    }

    #[test]
    fn step_collides_with_obstacle() {
        let path = WirePath::source_at(Pos::new(0, 0, 0));
        let obstacles = ObstacleField::new(
            &WirePath::default(),
            HashSet::from([Pos::new(1, 0, 0)]),
        );
        let step = WireStep {
            next_pos: Pos::new(1, 0, 0),
            kind: StepKind::Wire,
        };
        assert_eq!(
            path.with_step(&obstacles, Pos::new(0, 0, 0), Pos::new(5, 0, 0), step),
            None
        );
    }

    #[test]
    fn end_voxel_is_exempt_from_collision() {
        let path = WirePath::source_at(Pos::new(0, 0, 0));
        let obstacles = ObstacleField::new(
            &WirePath::default(),
            HashSet::from([Pos::new(1, 0, 0)]),
        );
        let step = WireStep {
            next_pos: Pos::new(1, 0, 0),
            kind: StepKind::Wire,
        };
        let extended = path
            .with_step(&obstacles, Pos::new(0, 0, 0), Pos::new(1, 0, 0), step)
            .unwrap();
        assert_eq!(
            extended.element_strengths[&Pos::new(1, 0, 0)],
            SignalStrength::Wire(14)
        );
    }

    #[test]
    fn signal_strength_attenuates_and_dies() {
        let mut path = WirePath::source_at(Pos::new(0, 0, 0));
        path.element_strengths
            .insert(Pos::new(1, 0, 0), SignalStrength::Wire(1));
        let obstacles = ObstacleField::new(&WirePath::default(), HashSet::new());
        let step = WireStep {
            next_pos: Pos::new(2, 0, 0),
            kind: StepKind::Wire,
        };
        // Strength would hit zero.
        assert_eq!(
            path.with_step(&obstacles, Pos::new(1, 0, 0), Pos::new(9, 0, 0), step),
            None
        );
    }

    #[test]
    fn repeater_resets_signal_strength() {
        let mut path = WirePath::source_at(Pos::new(0, 0, 0));
        path.element_strengths
            .insert(Pos::new(1, 0, 0), SignalStrength::Repeater);
        path.repeater_facings
            .insert(Pos::new(1, 0, 0), Direction::East);
        let obstacles = ObstacleField::new(&WirePath::default(), HashSet::new());
        let step = WireStep {
            next_pos: Pos::new(2, 0, 0),
            kind: StepKind::Wire,
        };
        let extended = path
            .with_step(&obstacles, Pos::new(1, 0, 0), Pos::new(9, 0, 0), step)
            .unwrap();
        assert_eq!(
            extended.element_strengths[&Pos::new(2, 0, 0)],
            SignalStrength::Wire(15)
        );
    }

    #[test]
    fn height_changes_reserve_airspace() {
        let path = WirePath::source_at(Pos::new(0, 0, 0));
        let obstacles = ObstacleField::new(&WirePath::default(), HashSet::new());
        let rise = WireStep {
            next_pos: Pos::new(0, 1, 1),
            kind: StepKind::Wire,
        };
        let extended = path
            .with_step(&obstacles, Pos::new(0, 0, 0), Pos::new(9, 0, 0), rise)
            .unwrap();
        assert!(extended.airspace.contains(&Pos::new(0, 1, 0)));
    }

    #[test]
    fn wire_avoids_unspaced_neighbors() {
        let other = WirePath::source_at(Pos::new(1, 0, 1));
        let obstacles = ObstacleField::new(&other, HashSet::new());
        let path = WirePath::source_at(Pos::new(0, 0, 0));
        let step = WireStep {
            next_pos: Pos::new(0, 0, 1),
            kind: StepKind::Wire,
        };
        // (1,0,1) is horizontally adjacent to the new wire at dy = 0.
        assert_eq!(
            path.with_step(&obstacles, Pos::new(0, 0, 0), Pos::new(0, 0, 9), step),
            None
        );
    }

    #[test]
    fn wire_beside_hard_powered_voxel_rejected() {
        let mut other = WirePath::default();
        other
            .element_strengths
            .insert(Pos::new(2, 0, 0), SignalStrength::Repeater);
        other
            .repeater_facings
            .insert(Pos::new(2, 0, 0), Direction::East);
        // (3,0,0) is hard-powered by the repeater.
        let obstacles = ObstacleField::new(&other, HashSet::new());
        let path = WirePath::source_at(Pos::new(4, 0, 1));
        let step = WireStep {
            next_pos: Pos::new(3, 0, 1),
            kind: StepKind::Wire,
        };
        // New wire at (3,0,1) is 6-adjacent to hard-powered (3,0,0).
        assert_eq!(
            path.with_step(&obstacles, Pos::new(4, 0, 1), Pos::new(0, 0, 9), step),
            None
        );
    }

    #[test]
    fn wire_drop_after_repeater_rejected() {
        let mut path = WirePath::source_at(Pos::new(0, 0, 0));
        path.element_strengths
            .insert(Pos::new(1, 0, 0), SignalStrength::Repeater);
        path.repeater_facings
            .insert(Pos::new(1, 0, 0), Direction::East);
        let obstacles = ObstacleField::new(&WirePath::default(), HashSet::new());
        let drop = WireStep {
            next_pos: Pos::new(2, -1, 0),
            kind: StepKind::Wire,
        };
        // The carrier spacer above the landing collides with the airspace
        // the descent reserves, so this step is never admissible.
        assert_eq!(
            path.with_step(&obstacles, Pos::new(1, 0, 0), Pos::new(9, 0, 0), drop),
            None
        );
    }

    #[test]
    fn repeater_may_step_down_off_a_wire() {
        let path = WirePath::source_at(Pos::new(0, 0, 0));
        let obstacles = ObstacleField::new(&WirePath::default(), HashSet::new());
        let drop = WireStep {
            next_pos: Pos::new(1, -1, 0),
            kind: StepKind::Repeater {
                facing: Direction::East,
            },
        };
        let extended = path
            .with_step(&obstacles, Pos::new(0, 0, 0), Pos::new(9, 0, 0), drop)
            .unwrap();
        assert_eq!(
            extended.element_strengths[&Pos::new(1, -1, 0)],
            SignalStrength::Repeater
        );
        assert!(extended.spacers.is_empty());
        assert_eq!(extended.airspace, BTreeSet::from([Pos::new(1, 0, 0)]));
    }

    #[test]
    fn blocks_render_elements_and_support() {
        let mut path = straight_path();
        path.element_strengths
            .insert(Pos::new(3, 0, 0), SignalStrength::Repeater);
        path.repeater_facings
            .insert(Pos::new(3, 0, 0), Direction::East);

        let schematic = path.blocks(&HashSet::new(), None);
        assert_eq!(
            schematic.blocks[&Pos::new(0, 0, 0)].id,
            "minecraft:redstone_wire"
        );
        assert_eq!(
            schematic.blocks[&Pos::new(3, 0, 0)].id,
            "minecraft:repeater"
        );
        // Repeater output faces east, so the block attribute (which names
        // the side the repeater listens from) is west.
        assert_eq!(
            schematic.blocks[&Pos::new(3, 0, 0)].attributes["facing"],
            "west"
        );
        // Foundations render as support wool.
        assert!(schematic.blocks[&Pos::new(0, -1, 0)]
            .id
            .ends_with("_wool"));
    }

    #[test]
    fn colored_blocks_use_the_palette() {
        let path = straight_path();
        let schematic = path.blocks(&HashSet::new(), Some("lime"));
        assert_eq!(
            schematic.blocks[&Pos::new(0, -1, 0)].id,
            "minecraft:lime_wool"
        );
    }
}

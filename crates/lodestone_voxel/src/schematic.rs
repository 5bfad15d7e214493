//! Voxel schematics: positions mapped to concrete blocks.
//!
//! This is the output container of circuit assembly. Serialization to the
//! on-disk schematic format lives in the driver layer, not here.

use crate::pos::{Pos, ZERO_POS};
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single voxel block: a namespaced identifier plus state attributes.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Block {
    /// Namespaced block identifier, e.g. `minecraft:redstone_wire`.
    pub id: String,
    /// Block state attributes, e.g. `facing=north`.
    pub attributes: BTreeMap<String, String>,
}

impl Block {
    /// Creates a block with no attributes.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Creates a block with the given attributes.
    pub fn with_attributes<K, V>(
        id: impl Into<String>,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id: id.into(),
            attributes: attributes
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Error from merging schematics whose blocks collide.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("schematics overlap at {pos:?}")]
pub struct SchematicOverlap {
    /// The first colliding position found.
    pub pos: Pos,
}

/// A sparse voxel schematic: occupied positions mapped to blocks.
///
/// Serializes as a list of `(position, block)` pairs, since positions are
/// structured values rather than map keys.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Vec<(Pos, Block)>", into = "Vec<(Pos, Block)>")]
pub struct VoxelSchematic {
    /// Occupied positions and their blocks, in position order.
    pub blocks: BTreeMap<Pos, Block>,
}

impl From<Vec<(Pos, Block)>> for VoxelSchematic {
    fn from(pairs: Vec<(Pos, Block)>) -> Self {
        Self {
            blocks: pairs.into_iter().collect(),
        }
    }
}

impl From<VoxelSchematic> for Vec<(Pos, Block)> {
    fn from(schematic: VoxelSchematic) -> Self {
        schematic.blocks.into_iter().collect()
    }
}

impl VoxelSchematic {
    /// Creates an empty schematic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied positions.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the schematic holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Inserts a block, replacing any previous block at that position.
    pub fn set(&mut self, pos: Pos, block: Block) {
        self.blocks.insert(pos, block);
    }

    /// The occupied positions as a region.
    pub fn mask(&self) -> Region {
        Region::from_points(self.blocks.keys().copied())
    }

    /// Translates every block.
    pub fn shifted(&self, offset: Pos) -> Self {
        Self {
            blocks: self
                .blocks
                .iter()
                .map(|(&pos, block)| (pos + offset, block.clone()))
                .collect(),
        }
    }

    /// Rotates every block about the Y axis.
    ///
    /// Positions rotate with the grid; `facing` attributes naming a
    /// horizontal direction rotate with them.
    pub fn y_rotated(&self, quarter_turns: i32) -> Self {
        Self {
            blocks: self
                .blocks
                .iter()
                .map(|(&pos, block)| {
                    let mut block = block.clone();
                    if let Some(facing) = block.attributes.get_mut("facing") {
                        if let Some(rotated) = rotated_facing(facing, quarter_turns) {
                            *facing = rotated;
                        }
                    }
                    (pos.y_rotated(quarter_turns), block)
                })
                .collect(),
        }
    }

    /// Translates so the minimum occupied corner lands at the origin.
    pub fn normalized(&self) -> Self {
        match self.blocks.keys().copied().reduce(Pos::elem_min) {
            Some(min) if min != ZERO_POS => self.shifted(-min),
            _ => self.clone(),
        }
    }

    /// Merges two schematics, failing if any position is occupied by both.
    pub fn merged(mut self, other: Self) -> Result<Self, SchematicOverlap> {
        for (pos, block) in other.blocks {
            if self.blocks.contains_key(&pos) {
                return Err(SchematicOverlap { pos });
            }
            self.blocks.insert(pos, block);
        }
        Ok(self)
    }
}

fn rotated_facing(facing: &str, quarter_turns: i32) -> Option<String> {
    use crate::direction::Direction;

    let direction = match facing {
        "north" => Direction::North,
        "east" => Direction::East,
        "south" => Direction::South,
        "west" => Direction::West,
        _ => return None,
    };
    Some(direction.y_rotated(quarter_turns).to_string())
}

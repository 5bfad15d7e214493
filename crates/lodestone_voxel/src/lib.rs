//! Voxel-space foundations for the Lodestone circuit synthesizer.
//!
//! This crate provides the geometric vocabulary shared by every other
//! layer: integer positions, the six axis directions, linear position
//! sequences, a region algebra with AABB-accelerated set operations, and
//! the sparse voxel schematic container that assembly produces.

#![warn(missing_docs)]

pub mod direction;
pub mod pos;
pub mod region;
pub mod schematic;
pub mod sequence;
pub mod slice;

pub use direction::Direction;
pub use pos::{Pos, ZERO_POS};
pub use region::{any_overlap, Prism, Region};
pub use schematic::{Block, SchematicOverlap, VoxelSchematic};
pub use sequence::{PositionSequence, SequenceError};
pub use slice::Slice;

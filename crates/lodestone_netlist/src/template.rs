//! Pre-built sub-circuit templates.
//!
//! A template carries everything the engine needs to place copies of a
//! scanned sub-circuit: its footprint region, its voxel blocks, and the
//! position/facing of every I/O pin. Template introspection from schematic
//! files happens upstream; here the results are only validated and stored.

use crate::error::NetlistError;
use crate::port::Port;
use lodestone_voxel::{Direction, PositionSequence, Region, VoxelSchematic, ZERO_POS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where one port's pins sit in the template's local frame, and which way
/// they face.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PinLayout {
    /// Pin positions, one per pin, in pin-index order.
    pub positions: PositionSequence,
    /// The horizontal direction the pins face.
    pub facing: Direction,
}

impl PinLayout {
    /// Rotates the layout about the Y axis.
    pub fn y_rotated(&self, quarter_turns: i32) -> Self {
        Self {
            positions: self.positions.y_rotated(quarter_turns),
            facing: self.facing.y_rotated(quarter_turns),
        }
    }
}

/// A placeable sub-circuit template in its local frame.
///
/// The footprint's minimum corner sits at the origin; pin positions lie
/// inside the footprint's horizontal skin.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct InstanceTemplate {
    /// The space the template occupies, minimum corner at the origin.
    pub footprint: Region,
    /// The template's blocks, in the same local frame.
    pub voxels: VoxelSchematic,
    /// Pin placement per port name.
    pub pin_layout: BTreeMap<String, PinLayout>,
}

impl InstanceTemplate {
    /// Validates the template against its instance's ports.
    ///
    /// Checks that the footprint is anchored at the origin and that each
    /// port has a pin layout whose width matches the port's pin count.
    pub fn validate(&self, ports: &BTreeMap<String, Port>) -> Result<(), NetlistError> {
        if let Some((min, _)) = self.footprint.bounds() {
            if min != ZERO_POS {
                return Err(NetlistError::UnanchoredFootprint { min });
            }
        }

        for name in ports.keys() {
            if !self.pin_layout.contains_key(name) {
                return Err(NetlistError::PortLayoutMismatch { port: name.clone() });
            }
        }

        for (name, layout) in &self.pin_layout {
            let port = ports
                .get(name)
                .ok_or_else(|| NetlistError::PortLayoutMismatch { port: name.clone() })?;
            if layout.positions.len() != port.pin_count as usize {
                return Err(NetlistError::PinLayoutWidth {
                    port: name.clone(),
                    positions: layout.positions.len(),
                    pins: port.pin_count,
                });
            }
        }

        Ok(())
    }
}

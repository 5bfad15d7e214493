//! Ports, pins, and pin-range references.

use crate::ids::InstanceId;
use lodestone_voxel::Slice;
use serde::{Deserialize, Serialize};

/// Direction of a port relative to its instance.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize,
)]
pub enum PortDirection {
    /// The port consumes a signal.
    Input,
    /// The port drives a signal.
    Output,
}

impl PortDirection {
    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            PortDirection::Input => PortDirection::Output,
            PortDirection::Output => PortDirection::Input,
        }
    }
}

/// A named, directed bundle of pins on one instance.
///
/// Pins are identified by index within their port and are otherwise
/// unnamed. All pins of a port share its direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Port {
    /// Direction of every pin in the bundle.
    pub direction: PortDirection,
    /// Number of pins; at least 1.
    pub pin_count: u32,
}

/// Reference to a port: instance plus port name.
#[derive(
    Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize,
)]
pub struct PortId {
    /// The owning instance.
    pub instance: InstanceId,
    /// The port name on that instance.
    pub port: String,
}

/// Reference to a single pin: port plus pin index.
#[derive(
    Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize,
)]
pub struct PinId {
    /// The owning port.
    pub port: PortId,
    /// Index within the port.
    pub index: i32,
}

/// A contiguous (possibly strided) run of pins on one port.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct PinIdSequence {
    /// The referenced port.
    pub port: PortId,
    /// Which pin indices of the port are selected.
    pub slice: Slice,
}

impl PinIdSequence {
    /// Number of selected pins.
    pub fn len(&self) -> usize {
        self.slice.len()
    }

    /// Whether the sequence selects no pins.
    pub fn is_empty(&self) -> bool {
        self.slice.is_empty()
    }

    /// The selected pins, in slice order.
    pub fn pin_ids(&self) -> impl Iterator<Item = PinId> + '_ {
        self.slice.indices().map(move |index| PinId {
            port: self.port.clone(),
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port_id(raw: u32, port: &str) -> PortId {
        PortId {
            instance: InstanceId::from_raw(raw),
            port: port.into(),
        }
    }

    #[test]
    fn direction_flip() {
        assert_eq!(PortDirection::Input.flipped(), PortDirection::Output);
        assert_eq!(PortDirection::Output.flipped(), PortDirection::Input);
    }

    #[test]
    fn sequence_pins() {
        let seq = PinIdSequence {
            port: port_id(1, "a"),
            slice: Slice::new(0, 4, 1),
        };
        assert_eq!(seq.len(), 4);
        let pins: Vec<PinId> = seq.pin_ids().collect();
        assert_eq!(pins[0].index, 0);
        assert_eq!(pins[3].index, 3);
        assert_eq!(pins[2].port, port_id(1, "a"));
    }

    #[test]
    fn strided_sequence() {
        let seq = PinIdSequence {
            port: port_id(0, "out"),
            slice: Slice::new(0, 8, 2),
        };
        let indices: Vec<i32> = seq.pin_ids().map(|pin| pin.index).collect();
        assert_eq!(indices, [0, 2, 4, 6]);
    }

    #[test]
    fn serde_roundtrip() {
        let seq = PinIdSequence {
            port: port_id(3, "dout"),
            slice: Slice::new(2, 6, 1),
        };
        let json = serde_json::to_string(&seq).unwrap();
        let back: PinIdSequence = serde_json::from_str(&json).unwrap();
        assert_eq!(seq, back);
    }
}

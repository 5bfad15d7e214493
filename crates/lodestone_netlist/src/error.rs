//! Error types for netlist construction.

use crate::port::{PinId, PortId};
use lodestone_voxel::Pos;

/// Errors raised while building a netlist.
///
/// All of these are construction-time validity failures: a netlist that
/// builds successfully satisfies every structural invariant the engine
/// relies on, so the placer and router never re-validate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetlistError {
    /// A pin appears as both driver and sink of the same network.
    #[error("network is cyclic at the pin level: {pin:?} both drives and sinks")]
    CyclicNetwork {
        /// The offending pin.
        pin: PinId,
    },

    /// A pin sequence selects no pins.
    #[error("pin sequence for {port:?} selects no pins")]
    EmptyPinSequence {
        /// The port whose slice is empty.
        port: PortId,
    },

    /// A network has no sink sequences.
    #[error("network driven by {driver:?} has no sinks")]
    EmptyNetwork {
        /// The driver port.
        driver: PortId,
    },

    /// Driver and sink sequences of a network differ in width.
    #[error("network pin sequences have mismatched widths: driver {driver}, sink {sink}")]
    WidthMismatch {
        /// Driver sequence width.
        driver: usize,
        /// Offending sink sequence width.
        sink: usize,
    },

    /// A template footprint is not anchored at the origin.
    #[error("template footprint must have its minimum corner at the origin, found {min:?}")]
    UnanchoredFootprint {
        /// The footprint's actual minimum corner.
        min: Pos,
    },

    /// A non-stub instance was added without a template.
    #[error("instance {name:?} has no template; only the \"input\"/\"output\" stubs may omit one")]
    MissingTemplate {
        /// The instance name.
        name: String,
    },

    /// An instance name was added twice.
    #[error("duplicate instance name {name:?}")]
    DuplicateInstance {
        /// The repeated name.
        name: String,
    },

    /// A network referenced an instance that does not exist.
    #[error("unknown instance id {id}")]
    UnknownInstance {
        /// The raw instance id.
        id: u32,
    },

    /// A network referenced a port the instance does not have.
    #[error("instance {instance:?} has no port {port:?}")]
    UnknownPort {
        /// The instance name.
        instance: String,
        /// The missing port name.
        port: String,
    },

    /// A pin slice selects indices outside the port's pin range.
    #[error("slice selects pin {index} outside port {port:?} with {pin_count} pins")]
    SliceOutOfRange {
        /// The port name.
        port: String,
        /// The out-of-range pin index.
        index: i32,
        /// The port's pin count.
        pin_count: u32,
    },

    /// A template port has no pin layout, or vice versa.
    #[error("port {port:?} and the template pin layout disagree")]
    PortLayoutMismatch {
        /// The port name.
        port: String,
    },

    /// A pin layout's position count differs from the port's pin count.
    #[error("pin layout for {port:?} has {positions} positions but the port has {pins} pins")]
    PinLayoutWidth {
        /// The port name.
        port: String,
        /// Positions in the layout.
        positions: usize,
        /// Pins on the port.
        pins: u32,
    },
}

//! Abstract netlist model for the Lodestone circuit synthesizer.
//!
//! A netlist is a set of instances (copies of pre-built sub-circuit
//! templates, plus the reserved `"input"`/`"output"` boundary stubs) and
//! the networks connecting their pins. Construction validates every
//! structural invariant; the placement and routing layers consume the
//! netlist read-only.

#![warn(missing_docs)]

pub mod error;
pub mod example;
pub mod ids;
pub mod netlist;
pub mod port;
pub mod template;

pub use error::NetlistError;
pub use ids::{InstanceId, NetworkId};
pub use netlist::{Instance, Netlist, Network, INPUT_STUB, OUTPUT_STUB};
pub use port::{PinId, PinIdSequence, Port, PortDirection, PortId};
pub use template::{InstanceTemplate, PinLayout};

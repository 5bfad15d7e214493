//! Place-and-route engine for the Lodestone circuit synthesizer.
//!
//! Takes an abstract netlist of pre-built sub-circuit templates and
//! produces a physical 3-D voxel layout: a simulated-annealing placer
//! searches instance positions and orientations, a constraint-aware A*
//! router lays out every connection as a concrete signal-carrying voxel
//! path, and assembly merges placed templates and routed wires into one
//! schematic.
//!
//! # Pipeline
//!
//! 1. **Place** — random initial placement + annealing refinement, with
//!    routing feasibility in the acceptance loop
//! 2. **Route** — one A* wire per sink pin, in fixed netlist order
//! 3. **Assemble** — merge template voxels and wire voxels
//!
//! # Usage
//!
//! ```ignore
//! use lodestone_pnr::{synthesize, PlacerConfig};
//!
//! let synthesis = synthesize(&netlist, &PlacerConfig::default())?;
//! assert!(synthesis.placement.is_valid(&netlist, 1));
//! ```

#![warn(missing_docs)]

pub mod assemble;
pub mod error;
pub mod placement;
pub mod routing;

pub use assemble::assemble;
pub use error::{AssemblyError, PlaceError, RouteError, SynthesisError};
pub use placement::{
    mutated_placement, place, random_placement, routable_cost, source_sink_pin_pairs,
    unroutable_cost, PinPair, Placement, PlacementProblem, PlacerConfig, PlacerOutcome,
};
pub use routing::{
    min_route_cost, route_all, RoutedWires, SignalStrength, StepKind, WirePath, WireRoute,
    WireStep,
};

use lodestone_netlist::Netlist;
use lodestone_voxel::VoxelSchematic;

/// A fully synthesized design.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    /// Where every instance ended up.
    pub placement: Placement,
    /// The routed wire paths, keyed by sink pin.
    pub wires: RoutedWires,
    /// The assembled voxel schematic.
    pub schematic: VoxelSchematic,
}

/// Runs the full place, route, and assemble pipeline.
pub fn synthesize(netlist: &Netlist, config: &PlacerConfig) -> Result<Synthesis, SynthesisError> {
    let outcome = place(netlist, config)?;
    let schematic = assemble(netlist, &outcome.placement, &outcome.wires)?;
    Ok(Synthesis {
        placement: outcome.placement,
        wires: outcome.wires,
        schematic,
    })
}

//! Error types for placement, routing, and assembly.

use lodestone_voxel::Pos;

/// Failures from routing a single wire, or from the routing pass as a
/// whole.
///
/// `Timeout` and `NoRoute` are absorbed by the placer's cost function and
/// steer annealing away from hopeless placements. `ReplayDivergence` is a
/// bug in the routing rules themselves and aborts the run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    /// The router's step budget ran out before reaching the sink.
    #[error("no route found from {start:?} to {end:?} within {max_steps} steps")]
    Timeout {
        /// Route start voxel.
        start: Pos,
        /// Route end voxel.
        end: Pos,
        /// The exhausted step budget.
        max_steps: usize,
    },

    /// The search space was exhausted: no wire can connect the pins.
    #[error("no way to route a wire from {start:?} to {end:?}")]
    NoRoute {
        /// Route start voxel.
        start: Pos,
        /// Route end voxel.
        end: Pos,
    },

    /// The verifying replay rejected a step the search accepted.
    #[error("route replay diverged from the search solution at {pos:?}; please report this")]
    ReplayDivergence {
        /// The step position the replay rejected.
        pos: Pos,
    },

    /// The placement was rejected before routing was attempted.
    #[error("placement looks unroutable (cost {cost:.1} above {threshold:.1}); not attempting wiring")]
    HopelessPlacement {
        /// The placement's unroutable cost.
        cost: f64,
        /// The configured rejection threshold.
        threshold: f64,
    },
}

/// Failures from assembling the final voxel schematic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    /// Two placed templates occupy the same voxel.
    #[error("placed instance {instance:?} overlaps earlier instances at {pos:?}")]
    OverlappingPlacement {
        /// The instance whose voxels collided.
        instance: String,
        /// The first colliding voxel found.
        pos: Pos,
    },

    /// A routed wire occupies a voxel a template already owns.
    #[error("routed wiring overlaps placed instances at {pos:?}")]
    WiringOverlap {
        /// The first colliding voxel found.
        pos: Pos,
    },
}

/// Failure of the overall placement search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaceError {
    /// The annealing search ended without any routable placement.
    #[error("placement search ended without a routable placement: {source}")]
    Unroutable {
        /// The routing failure of the best placement found.
        #[source]
        source: RouteError,
    },
}

/// Any failure from the end-to-end synthesis pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthesisError {
    /// Placement search failed.
    #[error(transparent)]
    Place(#[from] PlaceError),
    /// Voxel assembly failed.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

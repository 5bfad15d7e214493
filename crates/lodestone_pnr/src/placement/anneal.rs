//! The annealing placer.
//!
//! An outer simulated-annealing search over placements, with routing in
//! the loop: every candidate is scored by the unroutable heuristics, and
//! candidates that look wirable are actually routed. Routing results
//! (including failures) are cached by placement content hash so the
//! mutation step can re-query them for free.

use crate::error::{PlaceError, RouteError};
use crate::placement::cost;
use crate::placement::random::{mutated_placement, random_placement};
use crate::placement::Placement;
use crate::routing::{route_all, RoutedWires};
use lodestone_netlist::Netlist;
use lodestone_search::{simulated_annealing, AnnealParams, LocalSearchProblem};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::HashMap;

/// Tuning knobs for [`place`].
#[derive(Debug, Clone)]
pub struct PlacerConfig {
    /// Outer annealing rounds.
    pub total_rounds: u32,
    /// Outer annealing restart segments.
    pub restarts: u32,
    /// Unroutable cost above which routing is not even attempted.
    pub max_reasonable_unroutable_cost: f64,
    /// Inner prewarm rounds for the very first random placement.
    pub first_random_prewarm_rounds: u32,
    /// Inner prewarm rounds for later random placements.
    pub random_prewarm_rounds: u32,
    /// Inner prewarm rounds when mutating an unroutable placement.
    pub mutation_prewarm_rounds: u32,
    /// Per-wire A* step budget.
    pub route_max_steps: usize,
    /// Seed for the placer's RNG; equal seeds reproduce runs exactly.
    pub seed: u64,
    /// Outer-loop progress reporting cadence.
    pub report_cadence: Option<u32>,
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            total_rounds: 150,
            restarts: 1,
            max_reasonable_unroutable_cost: 70.0,
            first_random_prewarm_rounds: 4096,
            random_prewarm_rounds: 256,
            mutation_prewarm_rounds: 64,
            route_max_steps: 2048,
            seed: 0xDEAD_BEEF,
            report_cadence: None,
        }
    }
}

/// Cost a placement by the unroutable heuristics only, caching by
/// content hash. Used by the inner prewarm annealing.
struct PrewarmProblem<'a> {
    netlist: &'a Netlist,
    initial: Placement,
    cost_cache: &'a mut HashMap<u64, f64>,
}

impl LocalSearchProblem for PrewarmProblem<'_> {
    type Solution = Placement;

    fn random_solution(&mut self, _rng: &mut dyn RngCore) -> Placement {
        self.initial.clone()
    }

    fn mutated_solution(&mut self, solution: &Placement, rng: &mut dyn RngCore) -> Placement {
        mutated_placement(&mutated_placement(solution, rng), rng)
    }

    fn solution_cost(&mut self, solution: &Placement) -> f64 {
        let hash = solution.content_hash();
        *self
            .cost_cache
            .entry(hash)
            .or_insert_with(|| cost::unroutable_cost(self.netlist, solution))
    }
}

/// The outer placement search problem.
pub struct PlacementProblem<'a> {
    netlist: &'a Netlist,
    config: PlacerConfig,
    route_cache: HashMap<u64, Result<RoutedWires, RouteError>>,
    unroutable_cost_cache: HashMap<u64, f64>,
    first_random_done: bool,
}

impl<'a> PlacementProblem<'a> {
    /// Creates the problem for one placer run.
    pub fn new(netlist: &'a Netlist, config: PlacerConfig) -> Self {
        Self {
            netlist,
            config,
            route_cache: HashMap::new(),
            unroutable_cost_cache: HashMap::new(),
            first_random_done: false,
        }
    }

    fn cached_unroutable_cost(&mut self, placement: &Placement) -> f64 {
        let hash = placement.content_hash();
        *self
            .unroutable_cost_cache
            .entry(hash)
            .or_insert_with(|| cost::unroutable_cost(self.netlist, placement))
    }

    /// Routes the placement, or replays a cached result — including a
    /// cached failure.
    pub fn routed_wires(&mut self, placement: &Placement) -> Result<RoutedWires, RouteError> {
        let unroutable_cost = self.cached_unroutable_cost(placement);
        let hash = placement.content_hash();

        if !self.route_cache.contains_key(&hash) {
            let result = if unroutable_cost > self.config.max_reasonable_unroutable_cost {
                Err(RouteError::HopelessPlacement {
                    cost: unroutable_cost,
                    threshold: self.config.max_reasonable_unroutable_cost,
                })
            } else {
                route_all(self.netlist, placement, self.config.route_max_steps)
            };
            match &result {
                // A divergence is a bug in the routing rules, not a bad
                // placement; steering the search around it would hide it.
                Err(error @ RouteError::ReplayDivergence { .. }) => panic!("{error}"),
                Err(error) => tracing::debug!(%error, "placement not routable"),
                Ok(_) => {}
            }
            self.route_cache.insert(hash, result);
        }

        self.route_cache[&hash].clone()
    }

    /// A short unroutable-cost-only annealing pass from `placement`.
    ///
    /// When the pass fails to move at all, falls back to three plain
    /// mutations so the outer search still gets a fresh candidate.
    fn prewarmed(
        &mut self,
        placement: Placement,
        rounds: u32,
        rng: &mut dyn RngCore,
    ) -> Placement {
        let mut problem = PrewarmProblem {
            netlist: self.netlist,
            initial: placement.clone(),
            cost_cache: &mut self.unroutable_cost_cache,
        };
        let params = AnnealParams {
            total_rounds: rounds,
            restarts: 2,
            report_cadence: None,
        };
        let improved = simulated_annealing(&mut problem, &params, rng);

        if improved == placement {
            tracing::debug!("prewarm found no improvement; mutating blindly");
            let mut fallback = placement;
            for _ in 0..3 {
                fallback = mutated_placement(&fallback, rng);
            }
            fallback
        } else {
            improved
        }
    }
}

impl LocalSearchProblem for PlacementProblem<'_> {
    type Solution = Placement;

    fn random_solution(&mut self, rng: &mut dyn RngCore) -> Placement {
        let rounds = if self.first_random_done {
            self.config.random_prewarm_rounds
        } else {
            self.config.first_random_prewarm_rounds
        };
        self.first_random_done = true;

        let placement = random_placement(self.netlist, rng);
        self.prewarmed(placement, rounds, rng)
    }

    fn mutated_solution(&mut self, solution: &Placement, rng: &mut dyn RngCore) -> Placement {
        // Routable placements get small, cheap nudges; unroutable ones
        // get a prewarm pass towards wirability first.
        match self.routed_wires(solution) {
            Ok(_) => mutated_placement(&mutated_placement(solution, rng), rng),
            Err(_) => {
                let rounds = self.config.mutation_prewarm_rounds;
                self.prewarmed(solution.clone(), rounds, rng)
            }
        }
    }

    fn solution_cost(&mut self, solution: &Placement) -> f64 {
        let unroutable_cost = self.cached_unroutable_cost(solution);
        match self.routed_wires(solution) {
            Ok(wires) => cost::routable_cost(self.netlist, solution, &wires),
            Err(_) => 100_000.0 + unroutable_cost,
        }
    }

    fn good_enough(&mut self, solution: &Placement) -> bool {
        self.routed_wires(solution).is_ok()
    }
}

/// A placed and routed design.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacerOutcome {
    /// The winning placement.
    pub placement: Placement,
    /// Its routed wires, keyed by sink pin.
    pub wires: RoutedWires,
}

/// Runs the annealing placer and routes the winning placement.
///
/// Deterministic for a given netlist and config: the RNG is seeded from
/// the config and threaded through every random choice.
pub fn place(netlist: &Netlist, config: &PlacerConfig) -> Result<PlacerOutcome, PlaceError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut problem = PlacementProblem::new(netlist, config.clone());
    let params = AnnealParams {
        total_rounds: config.total_rounds,
        restarts: config.restarts,
        report_cadence: config.report_cadence,
    };

    let placement = simulated_annealing(&mut problem, &params, &mut rng);
    let wires = problem
        .routed_wires(&placement)
        .map_err(|source| PlaceError::Unroutable { source })?;

    tracing::info!(
        instances = placement.len(),
        wires = wires.len(),
        "placement complete",
    );

    Ok(PlacerOutcome { placement, wires })
}

//! Simulated annealing over black-box local-search problems.
//!
//! Can be contrasted with the tree search in [`crate::astar`], which is
//! complete and deterministic. Annealing trades completeness for the
//! ability to optimize costs with no useful gradient or admissible bound.

use rand::{Rng, RngCore};

/// A black-box optimization problem for [`simulated_annealing`].
///
/// Methods take `&mut self` so implementations can carry caches; the
/// search itself never mutates the problem's meaning.
pub trait LocalSearchProblem {
    /// Candidate solutions.
    type Solution: Clone;

    /// Produces a fresh solution, used at every restart boundary.
    fn random_solution(&mut self, rng: &mut dyn RngCore) -> Self::Solution;

    /// Produces a nearby variant of an existing solution.
    fn mutated_solution(
        &mut self,
        solution: &Self::Solution,
        rng: &mut dyn RngCore,
    ) -> Self::Solution;

    /// The cost to minimize.
    fn solution_cost(&mut self, solution: &Self::Solution) -> f64;

    /// Whether the solution is good enough to stop early.
    fn good_enough(&mut self, _solution: &Self::Solution) -> bool {
        false
    }
}

/// Tuning parameters for [`simulated_annealing`].
#[derive(Debug, Clone)]
pub struct AnnealParams {
    /// Total rounds across all restarts. Must be positive.
    pub total_rounds: u32,
    /// Number of equal restart segments; each begins from a fresh random
    /// solution. At least 1.
    pub restarts: u32,
    /// Emit a progress event every this many rounds.
    pub report_cadence: Option<u32>,
}

impl Default for AnnealParams {
    fn default() -> Self {
        Self {
            total_rounds: 2_000,
            restarts: 1,
            report_cadence: None,
        }
    }
}

/// A periodic observer of the best solution found so far.
pub struct Checkpoint<'a, S> {
    /// Invoke the callback every this many rounds.
    pub cadence: u32,
    /// Receives `(round, best_solution, best_cost)`.
    pub callback: &'a mut dyn FnMut(u32, &S, f64),
}

/// Runs simulated annealing and returns the best solution seen.
///
/// The acceptance rule keeps the incumbent unless the candidate is
/// cheaper, or with probability `exp(−(c_cand/c_curr)·(4·i/T))` — cooling
/// monotonically as the round index `i` approaches the total `T`. A
/// candidate that satisfies [`LocalSearchProblem::good_enough`] is
/// returned immediately; otherwise the best candidate ever costed is
/// returned, even if every move was rejected.
pub fn simulated_annealing<P: LocalSearchProblem>(
    problem: &mut P,
    params: &AnnealParams,
    rng: &mut dyn RngCore,
) -> P::Solution {
    simulated_annealing_checkpointed(problem, params, rng, None)
}

/// [`simulated_annealing`] with a periodic best-solution checkpoint hook.
pub fn simulated_annealing_checkpointed<P: LocalSearchProblem>(
    problem: &mut P,
    params: &AnnealParams,
    rng: &mut dyn RngCore,
    mut checkpoint: Option<Checkpoint<'_, P::Solution>>,
) -> P::Solution {
    assert!(
        params.total_rounds > 0,
        "simulated annealing needs a positive round count"
    );
    assert!(params.restarts > 0, "simulated annealing needs at least one restart segment");

    let total_rounds = params.total_rounds;
    let rounds_per_restart = (total_rounds / params.restarts).max(1);

    let mut best: Option<(f64, P::Solution)> = None;
    let mut current: Option<(f64, P::Solution)> = None;

    for round in 0..total_rounds {
        let candidate = if round % rounds_per_restart == 0 {
            problem.random_solution(rng)
        } else {
            let (_, current_solution) =
                current.as_ref().expect("incumbent exists after round 0");
            problem.mutated_solution(current_solution, rng)
        };

        if let Some(cadence) = params.report_cadence {
            if round % cadence == 0 {
                tracing::info!(
                    round,
                    total_rounds,
                    best_cost = best.as_ref().map(|(cost, _)| *cost),
                    current_cost = current.as_ref().map(|(cost, _)| *cost),
                    "annealing progress",
                );
            }
        }
        if let Some(checkpoint) = checkpoint.as_mut() {
            if round > 0 && round % checkpoint.cadence == 0 {
                if let Some((best_cost, best_solution)) = best.as_ref() {
                    (checkpoint.callback)(round, best_solution, *best_cost);
                }
            }
        }

        let candidate_cost = problem.solution_cost(&candidate);
        if problem.good_enough(&candidate) {
            tracing::info!(
                round,
                total_rounds,
                cost = candidate_cost,
                "good-enough solution found",
            );
            return candidate;
        }

        let accept = match current.as_ref() {
            None => true,
            Some((current_cost, _)) if candidate_cost < *current_cost => true,
            Some((current_cost, _)) => {
                let temperature_factor =
                    (candidate_cost / current_cost) * (4.0 * round as f64 / total_rounds as f64);
                rng.gen::<f64>() < (-temperature_factor).exp()
            }
        };
        if accept {
            current = Some((candidate_cost, candidate.clone()));
        }

        if best
            .as_ref()
            .map_or(true, |(best_cost, _)| candidate_cost < *best_cost)
        {
            best = Some((candidate_cost, candidate));
        }
    }

    best.expect("positive round count produces a candidate").1
}

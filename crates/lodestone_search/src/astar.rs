//! A* search over pluggable path-search problems.
//!
//! Two drivers share one problem interface:
//!
//! - [`astar_best_first`] — priority-queue best-first search. Ideal for
//!   problems whose branches fold back into each other (like exploring a
//!   grid); memory-hungry on persistently wide problems.
//! - [`astar_iddfs`] — iterative-deepening depth-first search with a
//!   rising cost cap. Much smaller memory footprint on wide problems;
//!   slower when branches converge and get re-explored across passes.
//!
//! Both return the action sequence of a cheapest path, and both fail with
//! the same typed errors.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::rc::Rc;

/// A search problem: states, applicable actions, and an admissible bound.
pub trait PathSearchProblem {
    /// Search states. `Ord` participates in deterministic tie-breaking.
    type State: Clone + Eq + std::hash::Hash + Ord;
    /// Actions. Expanded in `Ord` order for reproducibility.
    type Action: Clone + Ord;

    /// The search's starting state.
    fn initial_state(&self) -> Self::State;

    /// Actions applicable in a state.
    fn state_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// The successor reached by an action, or `None` when the action turns
    /// out to be inadmissible.
    fn state_action_result(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Option<Self::State>;

    /// The nonnegative cost of taking an action.
    fn state_action_cost(&self, state: &Self::State, action: &Self::Action) -> f64;

    /// Whether a state satisfies the goal.
    fn is_goal_state(&self, state: &Self::State) -> bool;

    /// Admissible heuristic: a lower bound on the remaining cost from
    /// `state` to any goal.
    fn min_cost(&self, state: &Self::State) -> f64;
}

/// Failure modes shared by both search drivers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The step budget ran out before reaching a goal.
    #[error("no solution found within {max_steps} search steps")]
    Timeout {
        /// The exhausted budget.
        max_steps: usize,
    },

    /// The reachable space was exhausted without reaching a goal.
    #[error("search space exhausted without reaching a goal")]
    NoSolution,
}

struct Node<S, A> {
    parent: Option<Rc<Node<S, A>>>,
    action: Option<A>,
    state: S,
    /// Cumulative cost from the start (g).
    cost: f64,
    /// Estimated total cost through this node (f = g + h).
    estimate: f64,
}

fn action_sequence<S, A: Clone>(node: &Rc<Node<S, A>>) -> Vec<A> {
    let mut actions = Vec::new();
    let mut current = Some(node);
    while let Some(node) = current {
        if let Some(action) = &node.action {
            actions.push(action.clone());
        }
        current = node.parent.as_ref();
    }
    actions.reverse();
    actions
}

/// Heap entry ordered so the best frontier node compares greatest.
///
/// Best means: least estimate, then greatest cumulative cost (deeper
/// cheap paths first), then least state, then least action. The trailing
/// keys make expansion order fully deterministic.
struct HeapEntry<S, A>(Rc<Node<S, A>>);

impl<S: Ord, A: Ord> PartialEq for HeapEntry<S, A> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<S: Ord, A: Ord> Eq for HeapEntry<S, A> {}

impl<S: Ord, A: Ord> Ord for HeapEntry<S, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .estimate
            .partial_cmp(&self.0.estimate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                self.0
                    .cost
                    .partial_cmp(&other.0.cost)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| other.0.state.cmp(&self.0.state))
            .then_with(|| other.0.action.cmp(&self.0.action))
    }
}

impl<S: Ord, A: Ord> PartialOrd for HeapEntry<S, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first A* search.
///
/// Pops the least-estimate frontier node, skips already-expanded states,
/// returns on goal, otherwise expands successors in action order. Each
/// expansion consumes one step of the budget.
pub fn astar_best_first<P: PathSearchProblem>(
    problem: &P,
    max_steps: usize,
) -> Result<Vec<P::Action>, SearchError> {
    let mut frontier = BinaryHeap::new();
    frontier.push(HeapEntry(Rc::new(Node {
        parent: None,
        action: None,
        state: problem.initial_state(),
        cost: 0.0,
        estimate: 0.0,
    })));

    let mut expanded: HashSet<P::State> = HashSet::new();
    let mut remaining = max_steps;

    while remaining > 0 {
        let entry = match frontier.pop() {
            Some(entry) => entry,
            None => return Err(SearchError::NoSolution),
        };
        let node = entry.0;

        if expanded.contains(&node.state) {
            continue;
        }
        if problem.is_goal_state(&node.state) {
            return Ok(action_sequence(&node));
        }
        expanded.insert(node.state.clone());

        let mut actions = problem.state_actions(&node.state);
        actions.sort();
        for action in actions {
            if let Some(next_state) = problem.state_action_result(&node.state, &action) {
                let cost = node.cost + problem.state_action_cost(&node.state, &action);
                let estimate = cost + problem.min_cost(&next_state);
                frontier.push(HeapEntry(Rc::new(Node {
                    parent: Some(Rc::clone(&node)),
                    action: Some(action),
                    state: next_state,
                    cost,
                    estimate,
                })));
            }
        }

        remaining -= 1;
    }

    if frontier.is_empty() {
        Err(SearchError::NoSolution)
    } else {
        Err(SearchError::Timeout { max_steps })
    }
}

enum DfsOutcome<A> {
    /// Goal reached; actions are collected in reverse while unwinding.
    Found(Vec<A>),
    /// Subtree exhausted under the current cap.
    Exhausted {
        /// Whether any branch was cut off by the cap (rather than pruned).
        over_cap: bool,
        /// The least estimate seen beyond the cap.
        least_over_cap: f64,
    },
}

/// Iterative-deepening depth-first A* search.
///
/// Runs a cost-capped DFS; when a pass exhausts without a goal, the cap
/// rises to the least over-cap estimate seen (and at least by one) and the
/// pass repeats. States remember the best cumulative cost seen across all
/// passes, and strictly worse re-entries are pruned — equal-cost
/// re-entries must survive so later passes can re-descend the tree.
pub fn astar_iddfs<P: PathSearchProblem>(
    problem: &P,
    max_steps: usize,
) -> Result<Vec<P::Action>, SearchError> {
    let initial = problem.initial_state();
    let mut best_cost_per_state: HashMap<P::State, f64> = HashMap::new();

    let mut max_cost = 1.0f64;
    while max_cost < 100_000.0 {
        let mut steps_remaining = max_steps;
        let outcome = capped_dfs(
            problem,
            &initial,
            0.0,
            0.0,
            max_cost,
            &mut best_cost_per_state,
            &mut steps_remaining,
        )
        .map_err(|_| SearchError::Timeout { max_steps })?;

        match outcome {
            DfsOutcome::Found(mut actions) => {
                actions.reverse();
                return Ok(actions);
            }
            DfsOutcome::Exhausted { over_cap: false, .. } => {
                return Err(SearchError::NoSolution);
            }
            DfsOutcome::Exhausted { least_over_cap, .. } => {
                max_cost = (max_cost + 1.0).max(least_over_cap);
            }
        }
    }

    Err(SearchError::Timeout { max_steps })
}

fn capped_dfs<P: PathSearchProblem>(
    problem: &P,
    state: &P::State,
    cost: f64,
    estimate: f64,
    max_cost: f64,
    best_cost_per_state: &mut HashMap<P::State, f64>,
    steps_remaining: &mut usize,
) -> Result<DfsOutcome<P::Action>, SearchError> {
    if let Some(&previous_best) = best_cost_per_state.get(state) {
        if cost > previous_best {
            return Ok(DfsOutcome::Exhausted {
                over_cap: false,
                least_over_cap: f64::INFINITY,
            });
        }
    }
    best_cost_per_state.insert(state.clone(), cost);

    if estimate > max_cost {
        return Ok(DfsOutcome::Exhausted {
            over_cap: true,
            least_over_cap: estimate,
        });
    }

    if problem.is_goal_state(state) {
        return Ok(DfsOutcome::Found(Vec::new()));
    }

    if *steps_remaining == 0 {
        // Budget exhausted mid-pass; the driver rewraps with the real budget.
        return Err(SearchError::Timeout { max_steps: 0 });
    }
    *steps_remaining -= 1;

    let mut over_cap = false;
    let mut least_over_cap = f64::INFINITY;

    let mut actions = problem.state_actions(state);
    actions.sort();
    for action in actions {
        if let Some(next_state) = problem.state_action_result(state, &action) {
            let next_cost = cost + problem.state_action_cost(state, &action);
            let next_estimate = next_cost + problem.min_cost(&next_state);
            match capped_dfs(
                problem,
                &next_state,
                next_cost,
                next_estimate,
                max_cost,
                best_cost_per_state,
                steps_remaining,
            )? {
                DfsOutcome::Found(mut actions) => {
                    actions.push(action);
                    return Ok(DfsOutcome::Found(actions));
                }
                DfsOutcome::Exhausted {
                    over_cap: subtree_over_cap,
                    least_over_cap: subtree_least,
                } => {
                    over_cap |= subtree_over_cap;
                    least_over_cap = least_over_cap.min(subtree_least);
                }
            }
        }
    }

    Ok(DfsOutcome::Exhausted {
        over_cap,
        least_over_cap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestone_voxel::{Direction, Pos};
    use std::collections::HashSet;

    /// Walk a 2-D maze on the XZ plane, one step at a time.
    struct PlanarMaze {
        walls: HashSet<Pos>,
        start: Pos,
        end: Pos,
    }

    impl PlanarMaze {
        fn from_map(map: &str) -> Self {
            let mut walls = HashSet::new();
            let mut start = None;
            let mut end = None;
            for (row, line) in map.lines().enumerate() {
                for (col, cell) in line.chars().enumerate() {
                    let pos = Pos::new(col as i32, 0, row as i32);
                    match cell {
                        '#' => {
                            walls.insert(pos);
                        }
                        's' => start = Some(pos),
                        'e' => end = Some(pos),
                        _ => {}
                    }
                }
            }
            Self {
                walls,
                start: start.expect("map has a start"),
                end: end.expect("map has an end"),
            }
        }

        fn solution_valid(&self, solution: &[Direction]) -> bool {
            let mut pos = self.start;
            for &step in solution {
                pos += step.unit();
                if self.walls.contains(&pos) {
                    return false;
                }
            }
            pos == self.end
        }
    }

    impl PathSearchProblem for PlanarMaze {
        type State = Pos;
        type Action = Direction;

        fn initial_state(&self) -> Pos {
            self.start
        }

        fn state_actions(&self, state: &Pos) -> Vec<Direction> {
            Direction::XZ
                .into_iter()
                .filter(|direction| !self.walls.contains(&(*state + direction.unit())))
                .collect()
        }

        fn state_action_result(&self, state: &Pos, action: &Direction) -> Option<Pos> {
            Some(*state + action.unit())
        }

        fn state_action_cost(&self, _state: &Pos, _action: &Direction) -> f64 {
            1.0
        }

        fn is_goal_state(&self, state: &Pos) -> bool {
            *state == self.end
        }

        fn min_cost(&self, state: &Pos) -> f64 {
            (self.end - *state).l1() as f64
        }
    }

    // A pocket open only to the south; the shortest path loops west
    // around the long wall.
    const MAZE: &str =
        "         e\n\n########\n       #\n       #\n       #\ns      #\n       #";

    #[test]
    fn best_first_solves_maze() {
        let maze = PlanarMaze::from_map(MAZE);
        let solution = astar_best_first(&maze, 10_000).unwrap();
        assert!(maze.solution_valid(&solution));
        assert_eq!(solution.len(), 17);
    }

    #[test]
    fn iddfs_solves_maze() {
        let maze = PlanarMaze::from_map(MAZE);
        let solution = astar_iddfs(&maze, 100_000).unwrap();
        assert!(maze.solution_valid(&solution));
        assert_eq!(solution.len(), 17);
    }

    #[test]
    fn walled_in_start_has_no_solution() {
        let maze = PlanarMaze::from_map(" #\n#s#e\n # ");
        assert_eq!(astar_best_first(&maze, 10_000), Err(SearchError::NoSolution));
        assert_eq!(astar_iddfs(&maze, 10_000), Err(SearchError::NoSolution));
    }

    #[test]
    fn tiny_budget_times_out() {
        let maze = PlanarMaze::from_map(MAZE);
        assert!(matches!(
            astar_best_first(&maze, 3),
            Err(SearchError::Timeout { .. })
        ));
    }

    /// Find a specific action word; goal only at the exact word.
    struct FindWord {
        word: Vec<u8>,
    }

    impl PathSearchProblem for FindWord {
        type State = Vec<u8>;
        type Action = u8;

        fn initial_state(&self) -> Vec<u8> {
            Vec::new()
        }

        fn state_actions(&self, _state: &Vec<u8>) -> Vec<u8> {
            vec![0, 1, 2, 3]
        }

        fn state_action_result(&self, state: &Vec<u8>, action: &u8) -> Option<Vec<u8>> {
            let mut next = state.clone();
            next.push(*action);
            Some(next)
        }

        fn state_action_cost(&self, _state: &Vec<u8>, action: &u8) -> f64 {
            if *action > 0 {
                1.0
            } else {
                1.25
            }
        }

        fn is_goal_state(&self, state: &Vec<u8>) -> bool {
            *state == self.word
        }

        fn min_cost(&self, state: &Vec<u8>) -> f64 {
            if state.len() > self.word.len() || !self.word.starts_with(state) {
                1_000_000_000.0
            } else {
                (self.word.len() - state.len()).max(1) as f64
            }
        }
    }

    #[test]
    fn both_drivers_agree_on_cost() {
        let problem = FindWord {
            word: vec![0, 1, 2, 2, 3],
        };
        let bfs = astar_best_first(&problem, 100_000).unwrap();
        let iddfs = astar_iddfs(&problem, 100_000).unwrap();
        assert_eq!(bfs, problem.word);
        assert_eq!(iddfs, problem.word);
    }
}

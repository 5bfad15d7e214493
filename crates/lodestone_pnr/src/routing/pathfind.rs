//! A* wire routing over (voxel, partial wire, momentum) states.
//!
//! Momentum matters enormously here: without it the search meanders, and
//! with it the cost function can reward long straight runs the way the
//! underlying substrate does. Start/end momentum hints let routed wires
//! meet instance pins head-on.
//!
//! The search phase keeps only the previous and current elements of the
//! growing path in each state, which bounds state size; the winning
//! action sequence is then replayed against untruncated state, and any
//! disagreement is a routing-rule bug surfaced as
//! [`RouteError::ReplayDivergence`].

use crate::error::RouteError;
use crate::routing::wire::{ObstacleField, WirePath, WireStep};
use lodestone_search::{astar_best_first, PathSearchProblem, SearchError};
use lodestone_voxel::{Direction, Pos};

/// Vertical momentum of a growing wire.
///
/// A single rising step is ambiguous between a straight vertical stack
/// and a diagonal slant; `AnyUp` records the ambiguity until the next
/// step resolves it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum YMomentum {
    /// Rising on alternating horizontal directions (a vertical stack).
    StraightUp,
    /// Rising while continuing in one horizontal direction.
    SlantUp,
    /// Rising, direction not yet resolved.
    AnyUp,
    /// Level.
    Flat,
    /// Dropping while continuing in one horizontal direction.
    SlantDown,
}

/// One search state: position, truncated path, and momentum.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct PartialWire {
    /// The current element voxel.
    pub pos: Pos,
    /// The truncated wire path built so far.
    pub path: WirePath,
    /// Horizontal momentum; `None` before the first step.
    pub xz_momentum: Option<Direction>,
    /// Vertical momentum; `None` before the first step.
    pub y_momentum: Option<YMomentum>,
}

/// Whether a displacement continues the given momentum without a break.
fn momentum_allows(
    xz: Option<Direction>,
    y: Option<YMomentum>,
    is_repeater: bool,
    step: Pos,
) -> bool {
    let up = Pos::new(0, 1, 0);
    let down = Pos::new(0, -1, 0);

    match (xz, y) {
        (Some(d), None) => {
            // Continuing straight is free at any elevation change.
            step == d.unit() + up || step == d.unit() || step == d.unit() + down
        }
        (Some(d), Some(YMomentum::AnyUp)) => {
            step == d.opposite().unit() + up
                || step == d.unit() + up
                || (is_repeater && step == d.unit())
        }
        (Some(d), Some(YMomentum::StraightUp)) => {
            step == d.opposite().unit() + up || (is_repeater && step == d.unit())
        }
        (Some(d), Some(YMomentum::SlantUp)) => {
            step == d.unit() + up || (is_repeater && step == d.unit())
        }
        (Some(d), Some(YMomentum::Flat)) => step == d.unit(),
        (Some(d), Some(YMomentum::SlantDown)) => step == d.unit() + down,
        (None, Some(y)) => {
            let offset = match y {
                YMomentum::AnyUp | YMomentum::StraightUp | YMomentum::SlantUp => up,
                YMomentum::Flat => Pos::new(0, 0, 0),
                YMomentum::SlantDown => down,
            };
            Direction::XZ.iter().any(|d| {
                step == d.unit() + offset || (is_repeater && step == d.unit())
            })
        }
        (None, None) => Direction::XZ.iter().any(|d| {
            [down, Pos::new(0, 0, 0), up]
                .iter()
                .any(|&offset| step == d.unit() + offset)
        }),
    }
}

/// The momentum carried after taking `action`, and whether the action
/// broke the incoming momentum.
fn next_momentum(
    state: &PartialWire,
    action: &WireStep,
) -> (Direction, Option<YMomentum>, bool) {
    let step = action.next_pos - state.pos;
    let step_xz_dir = Direction::from_unit(step.xz())
        .expect("wire steps always move exactly one block horizontally");
    let step_y_dir = match step.y {
        1 => YMomentum::AnyUp,
        0 => YMomentum::Flat,
        _ => YMomentum::SlantDown,
    };

    let broken = !momentum_allows(
        state.xz_momentum,
        state.y_momentum,
        action.is_repeater(),
        step,
    );

    let y_momentum = if broken {
        Some(step_y_dir)
    } else if step_y_dir == YMomentum::AnyUp {
        match state.y_momentum {
            // Carry the resolved direction forward.
            Some(y) if y != YMomentum::AnyUp => Some(y),
            // Resolve the ambiguity from horizontal alignment.
            _ => match state.xz_momentum {
                None => Some(YMomentum::AnyUp),
                Some(xz) if xz == step_xz_dir => Some(YMomentum::SlantUp),
                Some(_) => Some(YMomentum::StraightUp),
            },
        }
    } else if action.is_repeater() {
        state.y_momentum
    } else {
        Some(step_y_dir)
    };

    (step_xz_dir, y_momentum, broken)
}

/// Lower bound on momentum breaks needed to cover `delta` horizontally.
///
/// Zero when already colinear and pointing the right way; one for a
/// single dogleg; two for a same-direction S-shape; plus one for each
/// endpoint momentum pointing away from the other endpoint.
fn min_xz_turns(
    delta: Pos,
    start_momentum: Option<Direction>,
    end_momentum: Option<Direction>,
) -> u32 {
    if delta.xz().is_zero() {
        return 0;
    }

    if delta.x == 0 || delta.z == 0 {
        let required = Direction::from_unit(if delta.x != 0 {
            Pos::new(delta.x.signum(), 0, 0)
        } else {
            Pos::new(0, 0, delta.z.signum())
        })
        .expect("a signed axis unit is a direction");

        let start_misaligned = start_momentum.is_some_and(|d| d != required);
        let end_misaligned = end_momentum.is_some_and(|d| d != required);
        return start_misaligned as u32 + end_misaligned as u32;
    }

    // Not colinear: equal endpoint momenta force a double-bend S.
    if start_momentum.is_some() && start_momentum == end_momentum {
        return 2;
    }

    let points_away = |momentum: Option<Direction>| {
        momentum.is_some_and(|d| {
            let unit = d.unit();
            let axis_delta = if unit.x != 0 { delta.x } else { delta.z };
            let is_positive = unit.x + unit.z > 0;
            (axis_delta > 0) != is_positive
        })
    };

    1 + points_away(start_momentum) as u32 + points_away(end_momentum) as u32
}

/// Loose lower bound on vertical momentum breaks: dropping further than
/// the horizontal span allows requires at least one turn.
fn min_y_turns(delta: Pos) -> u32 {
    let horizontal = delta.xz().l1();
    let descent = -delta.y;
    u32::from(descent > horizontal)
}

/// One wire-routing problem: connect `start` to `end` around the given
/// obstacle field.
pub(crate) struct WireRouteProblem<'a> {
    pub start: Pos,
    pub end: Pos,
    pub start_hint: Option<Direction>,
    pub end_hint: Option<Direction>,
    pub obstacles: &'a ObstacleField,
    pub early_repeater_cost: f64,
    pub momentum_break_cost: f64,
    /// Truncate per-state history during search; disabled for the replay.
    pub truncate_history: bool,
}

pub(crate) const EARLY_REPEATER_COST: f64 = 12.0;
pub(crate) const MOMENTUM_BREAK_COST: f64 = 3.0;

impl<'a> WireRouteProblem<'a> {
    pub(crate) fn new(
        start: Pos,
        end: Pos,
        start_hint: Option<Direction>,
        end_hint: Option<Direction>,
        obstacles: &'a ObstacleField,
    ) -> Self {
        Self {
            start,
            end,
            start_hint,
            end_hint,
            obstacles,
            early_repeater_cost: EARLY_REPEATER_COST,
            momentum_break_cost: MOMENTUM_BREAK_COST,
            truncate_history: true,
        }
    }
}

impl PathSearchProblem for WireRouteProblem<'_> {
    type State = PartialWire;
    type Action = WireStep;

    fn initial_state(&self) -> PartialWire {
        PartialWire {
            pos: self.start,
            path: WirePath::source_at(self.start),
            xz_momentum: self.start_hint,
            y_momentum: None,
        }
    }

    fn state_actions(&self, state: &PartialWire) -> Vec<WireStep> {
        let current = state.path.step_at(state.pos);
        let foundation = state.pos + Direction::Down.unit();
        let transparent_foundation = state.path.airspace.contains(&foundation)
            || self.obstacles.airspace.contains(&foundation);
        current.successors(transparent_foundation)
    }

    fn state_action_result(
        &self,
        state: &PartialWire,
        action: &WireStep,
    ) -> Option<PartialWire> {
        let (xz_momentum, y_momentum, _) = next_momentum(state, action);

        let mut path =
            state
                .path
                .with_step(self.obstacles, state.pos, self.end, *action)?;
        if self.truncate_history {
            path = path.truncated(action.next_pos, state.pos);
        }

        Some(PartialWire {
            pos: action.next_pos,
            path,
            xz_momentum: Some(xz_momentum),
            y_momentum,
        })
    }

    fn state_action_cost(&self, state: &PartialWire, action: &WireStep) -> f64 {
        let mut cost = 1.0;

        if action.is_repeater() {
            let strength = state.path.element_strengths.get(&state.pos);
            let early = !matches!(
                strength,
                Some(crate::routing::wire::SignalStrength::Wire(1))
            );
            if early {
                cost += self.early_repeater_cost;
            }
        }

        let (xz_momentum, _, broken) = next_momentum(state, action);
        let end_hint_mismatch = action.next_pos == self.end
            && self.end_hint.is_some_and(|hint| hint != xz_momentum);
        if broken || end_hint_mismatch {
            cost += self.momentum_break_cost;
        }

        cost
    }

    fn is_goal_state(&self, state: &PartialWire) -> bool {
        state.pos == self.end && !state.path.is_repeater(state.pos)
    }

    fn min_cost(&self, state: &PartialWire) -> f64 {
        let delta = self.end - state.pos;

        // Every sixteen blocks of height needs an extra repeater step.
        let y_distance = delta.y.abs() + delta.y.abs() / 16;
        let xz_distance = delta.xz().l1();
        let min_steps = xz_distance.max(y_distance) as f64;

        let turns = min_xz_turns(delta, state.xz_momentum, self.end_hint)
            .max(min_y_turns(delta));

        min_steps + turns as f64 * self.momentum_break_cost
    }
}

/// Inputs for routing one wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireRoute {
    /// Driver-pin voxel; the wire starts here at full strength.
    pub start: Pos,
    /// Sink-pin voxel.
    pub end: Pos,
    /// Horizontal momentum the wire should leave the driver with.
    pub start_hint: Option<Direction>,
    /// Horizontal momentum the wire should arrive at the sink with.
    pub end_hint: Option<Direction>,
}

/// Routes one wire, verifying the search result by replay.
pub(crate) fn route_wire(
    route: &WireRoute,
    obstacles: &ObstacleField,
    max_steps: usize,
) -> Result<WirePath, RouteError> {
    let problem = WireRouteProblem::new(
        route.start,
        route.end,
        route.start_hint,
        route.end_hint,
        obstacles,
    );

    let steps = astar_best_first(&problem, max_steps).map_err(|err| match err {
        SearchError::Timeout { .. } => RouteError::Timeout {
            start: route.start,
            end: route.end,
            max_steps,
        },
        SearchError::NoSolution => RouteError::NoRoute {
            start: route.start,
            end: route.end,
        },
    })?;

    // Replay against full, untruncated state; the search phase only saw a
    // two-element window of the path.
    let replay = WireRouteProblem {
        truncate_history: false,
        ..WireRouteProblem::new(
            route.start,
            route.end,
            route.start_hint,
            route.end_hint,
            obstacles,
        )
    };
    let mut state = replay.initial_state();
    for step in &steps {
        state = replay
            .state_action_result(&state, step)
            .ok_or(RouteError::ReplayDivergence { pos: step.next_pos })?;
    }

    Ok(state.path)
}

/// The router's admissible lower bound for a pin pair, with no search and
/// no obstacle context. Used by placement cost.
pub fn min_route_cost(
    start: Pos,
    end: Pos,
    start_hint: Option<Direction>,
    end_hint: Option<Direction>,
) -> f64 {
    let obstacles = ObstacleField::default();
    let problem = WireRouteProblem::new(start, end, start_hint, end_hint, &obstacles);
    let initial = problem.initial_state();
    problem.min_cost(&initial)
}

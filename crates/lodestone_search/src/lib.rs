//! Generic search algorithms for the Lodestone circuit synthesizer.
//!
//! Two families, both parameterized over pluggable problem traits:
//! simulated annealing for black-box cost minimization (placement), and
//! A* path search for exact lowest-cost paths (wire routing).

#![warn(missing_docs)]

pub mod anneal;
pub mod astar;

pub use anneal::{
    simulated_annealing, simulated_annealing_checkpointed, AnnealParams, Checkpoint,
    LocalSearchProblem,
};
pub use astar::{astar_best_first, astar_iddfs, PathSearchProblem, SearchError};

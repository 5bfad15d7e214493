//! Linear sequences of voxel positions.

use crate::pos::{Pos, ZERO_POS};
use crate::slice::Slice;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors from constructing or subselecting a [`PositionSequence`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    /// The sequence endpoints do not space evenly into `count` positions.
    #[error("{start:?} => {stop:?} does not divide cleanly into {count} positions")]
    UncleanStep {
        /// First position.
        start: Pos,
        /// Last position.
        stop: Pos,
        /// Requested position count.
        count: u32,
    },

    /// A sequence must contain at least one position.
    #[error("position sequences may not be empty")]
    Empty,

    /// A slice referenced an index outside the sequence.
    #[error("slice index {index} out of range for sequence of length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: i32,
        /// The sequence length.
        len: usize,
    },
}

/// A linear run of positions: `start` (inclusive) to `stop` (inclusive),
/// evenly spaced into `count` positions.
///
/// Construction validates that the endpoints divide cleanly and that each
/// axis either stays constant or steps in lockstep with the longest axis.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionSequence {
    start: Pos,
    stop: Pos,
    count: u32,
    step: Pos,
}

impl PositionSequence {
    /// Creates a sequence, validating the spacing invariants.
    pub fn new(start: Pos, stop: Pos, count: u32) -> Result<Self, SequenceError> {
        if count == 0 {
            return Err(SequenceError::Empty);
        }

        let unclean = || SequenceError::UncleanStep { start, stop, count };

        let step = if count == 1 {
            // A single-position sequence has no stride; the endpoints must agree.
            if start != stop {
                return Err(unclean());
            }
            ZERO_POS
        } else {
            (stop - start)
                .div_exact(Pos::new(
                    count as i32 - 1,
                    count as i32 - 1,
                    count as i32 - 1,
                ))
                .ok_or_else(unclean)?
        };

        let axis_step_counts = (stop - start).div_exact(step).ok_or_else(unclean)?;
        let max_axis_steps = axis_step_counts
            .abs()
            .x
            .max(axis_step_counts.abs().y)
            .max(axis_step_counts.abs().z);
        let each_axis_ok = [axis_step_counts.x, axis_step_counts.y, axis_step_counts.z]
            .into_iter()
            .all(|steps| steps == 0 || steps == max_axis_steps);
        if !each_axis_ok {
            return Err(unclean());
        }

        Ok(Self {
            start,
            stop,
            count,
            step,
        })
    }

    /// First position.
    pub fn start(&self) -> Pos {
        self.start
    }

    /// Last position.
    pub fn stop(&self) -> Pos {
        self.stop
    }

    /// The per-index stride. Zero for single-position sequences.
    pub fn step(&self) -> Pos {
        self.step
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Always false; sequences are nonempty by construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The position at the given index.
    pub fn index(&self, index: usize) -> Pos {
        debug_assert!(index < self.len());
        self.start + self.step * index as i32
    }

    /// Iterates the positions in order.
    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.len()).map(|index| self.index(index))
    }

    /// Rotates the whole sequence about the Y axis.
    pub fn y_rotated(&self, quarter_turns: i32) -> Self {
        Self {
            start: self.start.y_rotated(quarter_turns),
            stop: self.stop.y_rotated(quarter_turns),
            count: self.count,
            step: self.step.y_rotated(quarter_turns),
        }
    }

    /// Translates the whole sequence.
    pub fn shifted(&self, offset: Pos) -> Self {
        Self {
            start: self.start + offset,
            stop: self.stop + offset,
            count: self.count,
            step: self.step,
        }
    }

    /// Subselects positions by slice index.
    pub fn sliced(&self, slice: Slice) -> Result<Self, SequenceError> {
        let indices: Vec<i32> = slice.indices().collect();
        let (&first, &last) = match (indices.first(), indices.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(SequenceError::Empty),
        };

        for &index in [first, last].iter() {
            if index < 0 || index as usize >= self.len() {
                return Err(SequenceError::IndexOutOfRange {
                    index,
                    len: self.len(),
                });
            }
        }

        Self::new(
            self.index(first as usize),
            self.index(last as usize),
            indices.len() as u32,
        )
    }
}

impl fmt::Debug for PositionSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PositionSequence({:?}, {:?}, count={})",
            self.start, self.stop, self.count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evenly_spaced_positions() {
        let seq = PositionSequence::new(Pos::new(0, 0, 0), Pos::new(2, 2, 0), 3).unwrap();
        assert_eq!(
            seq.iter().collect::<Vec<_>>(),
            [Pos::new(0, 0, 0), Pos::new(1, 1, 0), Pos::new(2, 2, 0)]
        );
        assert_eq!(seq.step(), Pos::new(1, 1, 0));
    }

    #[test]
    fn descending_positions() {
        let seq =
            PositionSequence::new(Pos::new(-1, -1, 1), Pos::new(-5, -5, -3), 3).unwrap();
        assert_eq!(
            seq.iter().collect::<Vec<_>>(),
            [Pos::new(-1, -1, 1), Pos::new(-3, -3, -1), Pos::new(-5, -5, -3)]
        );
    }

    #[test]
    fn single_position() {
        let seq = PositionSequence::new(Pos::new(1, 0, 0), Pos::new(1, 0, 0), 1).unwrap();
        assert_eq!(seq.step(), ZERO_POS);
        assert_eq!(seq.iter().collect::<Vec<_>>(), [Pos::new(1, 0, 0)]);
    }

    #[test]
    fn unclean_spacing_rejected() {
        let err = PositionSequence::new(Pos::new(0, 0, 0), Pos::new(3, 2, 1), 3);
        assert!(matches!(err, Err(SequenceError::UncleanStep { .. })));
    }

    #[test]
    fn zero_count_rejected() {
        let err = PositionSequence::new(ZERO_POS, ZERO_POS, 0);
        assert_eq!(err, Err(SequenceError::Empty));
    }

    #[test]
    fn rotation() {
        let seq = PositionSequence::new(Pos::new(1, 2, 3), Pos::new(2, 3, 4), 2).unwrap();
        let rotated = seq.y_rotated(1);
        assert_eq!(
            rotated.iter().collect::<Vec<_>>(),
            [Pos::new(3, 2, -1), Pos::new(4, 3, -2)]
        );
    }

    #[test]
    fn shifting() {
        let seq = PositionSequence::new(Pos::new(0, 0, 0), Pos::new(0, 0, 3), 4).unwrap();
        let shifted = seq.shifted(Pos::new(1, 1, 1));
        assert_eq!(shifted.start(), Pos::new(1, 1, 1));
        assert_eq!(shifted.stop(), Pos::new(1, 1, 4));
        assert_eq!(shifted.step(), seq.step());
    }

    #[test]
    fn slicing_contiguous() {
        let seq = PositionSequence::new(Pos::new(0, 0, 0), Pos::new(7, 0, 0), 8).unwrap();
        let sub = seq.sliced(Slice::new(2, 6, 1)).unwrap();
        assert_eq!(sub.start(), Pos::new(2, 0, 0));
        assert_eq!(sub.stop(), Pos::new(5, 0, 0));
        assert_eq!(sub.len(), 4);
    }

    #[test]
    fn slicing_strided() {
        let seq = PositionSequence::new(Pos::new(0, 0, 0), Pos::new(7, 0, 0), 8).unwrap();
        let sub = seq.sliced(Slice::new(0, 8, 2)).unwrap();
        assert_eq!(sub.len(), 4);
        assert_eq!(sub.step(), Pos::new(2, 0, 0));
    }

    #[test]
    fn slicing_out_of_range() {
        let seq = PositionSequence::new(Pos::new(0, 0, 0), Pos::new(3, 0, 0), 4).unwrap();
        assert!(matches!(
            seq.sliced(Slice::new(0, 6, 1)),
            Err(SequenceError::IndexOutOfRange { .. })
        ));
    }
}

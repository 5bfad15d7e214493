//! Hashable integer slices for pin-range selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open integer range with a signed step, usable as a hash key.
///
/// `Slice::new(0, 8, 2)` selects indices `0, 2, 4, 6`. A negative step
/// counts downwards: `Slice::new(3, -1, -1)` selects `3, 2, 1, 0`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slice {
    /// First index (inclusive).
    pub start: i32,
    /// Stop index (exclusive).
    pub stop: i32,
    /// Step between indices; never zero.
    pub step: i32,
}

impl Slice {
    /// Creates a slice. A zero step is a programmer error.
    pub fn new(start: i32, stop: i32, step: i32) -> Self {
        assert!(step != 0, "slice step must be nonzero");
        Self { start, stop, step }
    }

    /// The unit-step slice `0..len`.
    pub fn from_len(len: u32) -> Self {
        Self::new(0, len as i32, 1)
    }

    /// The indices selected by this slice, in order.
    pub fn indices(self) -> impl Iterator<Item = i32> {
        let Slice { start, stop, step } = self;
        let mut current = start;
        std::iter::from_fn(move || {
            let in_range = if step > 0 { current < stop } else { current > stop };
            if in_range {
                let value = current;
                current += step;
                Some(value)
            } else {
                None
            }
        })
    }

    /// Number of selected indices.
    pub fn len(self) -> usize {
        let span = if self.step > 0 {
            self.stop as i64 - self.start as i64
        } else {
            self.start as i64 - self.stop as i64
        };
        if span <= 0 {
            return 0;
        }
        let step = self.step.unsigned_abs() as i64;
        ((span + step - 1) / step) as usize
    }

    /// Whether the slice selects no indices.
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slice({}, {}, {})", self.start, self.stop, self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_indices() {
        assert_eq!(Slice::from_len(4).indices().collect::<Vec<_>>(), [0, 1, 2, 3]);
        assert_eq!(
            Slice::new(0, 8, 2).indices().collect::<Vec<_>>(),
            [0, 2, 4, 6]
        );
    }

    #[test]
    fn reverse_indices() {
        assert_eq!(
            Slice::new(3, -1, -1).indices().collect::<Vec<_>>(),
            [3, 2, 1, 0]
        );
    }

    #[test]
    fn lengths() {
        assert_eq!(Slice::from_len(4).len(), 4);
        assert_eq!(Slice::new(0, 8, 2).len(), 4);
        assert_eq!(Slice::new(0, 7, 2).len(), 4);
        assert_eq!(Slice::new(3, -1, -1).len(), 4);
        assert_eq!(Slice::new(4, 4, 1).len(), 0);
        assert!(Slice::new(4, 0, 1).is_empty());
    }

    #[test]
    #[should_panic(expected = "step must be nonzero")]
    fn zero_step_rejected() {
        let _ = Slice::new(0, 4, 0);
    }

    #[test]
    fn usable_as_hash_key() {
        let mut set = std::collections::HashSet::new();
        set.insert(Slice::from_len(4));
        set.insert(Slice::new(0, 4, 1));
        assert_eq!(set.len(), 1);
    }
}

//! The six axis-aligned directions.

use crate::pos::Pos;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six axis-aligned unit directions.
///
/// The four horizontal directions form the quarter-turn rotation cycle
/// north → east → south → west used for instance orientation.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards positive `y`.
    Up,
    /// Towards negative `y`.
    Down,
    /// Towards negative `z`.
    North,
    /// Towards positive `x`.
    East,
    /// Towards positive `z`.
    South,
    /// Towards negative `x`.
    West,
}

impl Direction {
    /// All six directions.
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Down,
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The four horizontal directions, in rotation-cycle order.
    pub const XZ: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The unit displacement for this direction.
    pub const fn unit(self) -> Pos {
        match self {
            Direction::Up => Pos::new(0, 1, 0),
            Direction::Down => Pos::new(0, -1, 0),
            Direction::North => Pos::new(0, 0, -1),
            Direction::East => Pos::new(1, 0, 0),
            Direction::South => Pos::new(0, 0, 1),
            Direction::West => Pos::new(-1, 0, 0),
        }
    }

    /// The opposite direction.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Recovers a direction from its unit displacement.
    pub fn from_unit(unit: Pos) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.unit() == unit)
    }

    /// Whether this direction lies in the horizontal plane.
    pub const fn is_horizontal(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::East | Direction::South | Direction::West
        )
    }

    /// Index of a horizontal direction in the rotation cycle.
    ///
    /// This is the quarter-turn count used when orienting an instance: a
    /// placement direction of east means one quarter turn from north.
    pub fn xz_index(self) -> Option<i32> {
        match self {
            Direction::North => Some(0),
            Direction::East => Some(1),
            Direction::South => Some(2),
            Direction::West => Some(3),
            _ => None,
        }
    }

    /// Rotates a horizontal direction about the Y axis by quarter turns.
    ///
    /// Consistent with [`Pos::y_rotated`]: one quarter turn maps north to
    /// west. Vertical directions are fixed by the rotation.
    pub fn y_rotated(self, quarter_turns: i32) -> Direction {
        if !self.is_horizontal() {
            return self;
        }
        let mut direction = self;
        for _ in 0..quarter_turns.rem_euclid(4) {
            direction = match direction {
                Direction::North => Direction::West,
                Direction::West => Direction::South,
                Direction::South => Direction::East,
                Direction::East => Direction::North,
                _ => unreachable!(),
            };
        }
        direction
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_are_units() {
        for direction in Direction::ALL {
            assert_eq!(direction.unit().l1(), 1);
        }
    }

    #[test]
    fn opposite_is_involution() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(direction.unit(), -direction.opposite().unit());
        }
    }

    #[test]
    fn from_unit_roundtrip() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_unit(direction.unit()), Some(direction));
        }
        assert_eq!(Direction::from_unit(Pos::new(1, 1, 0)), None);
    }

    #[test]
    fn rotation_matches_pos_rotation() {
        for direction in Direction::XZ {
            for quarter_turns in 0..4 {
                assert_eq!(
                    direction.y_rotated(quarter_turns).unit(),
                    direction.unit().y_rotated(quarter_turns),
                );
            }
        }
    }

    #[test]
    fn rotation_fixes_vertical() {
        assert_eq!(Direction::Up.y_rotated(1), Direction::Up);
        assert_eq!(Direction::Down.y_rotated(3), Direction::Down);
    }

    #[test]
    fn rotation_by_four_is_identity() {
        for direction in Direction::ALL {
            assert_eq!(direction.y_rotated(4), direction);
        }
    }

    #[test]
    fn xz_cycle_order() {
        assert_eq!(Direction::North.xz_index(), Some(0));
        assert_eq!(Direction::East.xz_index(), Some(1));
        assert_eq!(Direction::South.xz_index(), Some(2));
        assert_eq!(Direction::West.xz_index(), Some(3));
        assert_eq!(Direction::Up.xz_index(), None);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Direction::North).unwrap(), "\"north\"");
        let back: Direction = serde_json::from_str("\"west\"").unwrap();
        assert_eq!(back, Direction::West);
    }
}

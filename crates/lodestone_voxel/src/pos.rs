//! Integer voxel positions.
//!
//! [`Pos`] is the coordinate type used everywhere in the engine: template
//! footprints, pin positions, wire voxels, and region bounds. Coordinates
//! follow the simulation substrate's convention: `y` is the vertical axis,
//! `x`/`z` span the horizontal plane.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// An integer position (or displacement) in the voxel grid.
///
/// Ordering is lexicographic by `(x, y, z)`, which gives deterministic
/// iteration when positions key sorted containers.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Pos {
    /// East/west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// South/north coordinate.
    pub z: i32,
}

/// The origin position.
pub const ZERO_POS: Pos = Pos { x: 0, y: 0, z: 0 };

impl Pos {
    /// Creates a position from its coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the elementwise absolute value.
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Returns the elementwise minimum of two positions.
    pub fn elem_min(self, other: Self) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Returns the elementwise maximum of two positions.
    pub fn elem_max(self, other: Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Elementwise exact division.
    ///
    /// Returns `None` when any axis fails to divide cleanly. Block-stacking
    /// logic treats `0 / 0` as `0` on a per-axis basis.
    pub fn div_exact(self, divisor: Self) -> Option<Self> {
        fn axis(n: i32, d: i32) -> Option<i32> {
            if n == 0 && d == 0 {
                Some(0)
            } else if d != 0 && n % d == 0 {
                Some(n / d)
            } else {
                None
            }
        }

        Some(Self::new(
            axis(self.x, divisor.x)?,
            axis(self.y, divisor.y)?,
            axis(self.z, divisor.z)?,
        ))
    }

    /// Elementwise remainder, with `0 % 0 = 0`.
    ///
    /// Returns `None` when a nonzero component is taken modulo zero.
    pub fn rem_elem(self, base: Self) -> Option<Self> {
        fn axis(n: i32, b: i32) -> Option<i32> {
            if n == 0 && b == 0 {
                Some(0)
            } else if b != 0 {
                Some(n % b)
            } else {
                None
            }
        }

        Some(Self::new(
            axis(self.x, base.x)?,
            axis(self.y, base.y)?,
            axis(self.z, base.z)?,
        ))
    }

    /// L1 (taxicab) norm.
    pub fn l1(self) -> i32 {
        self.x.abs() + self.y.abs() + self.z.abs()
    }

    /// Projection onto the horizontal plane (`y` zeroed).
    pub fn xz(self) -> Self {
        Self::new(self.x, 0, self.z)
    }

    /// Whether this is the origin.
    pub fn is_zero(self) -> bool {
        self == ZERO_POS
    }

    /// Rotates about the Y axis by the given number of quarter turns.
    pub fn y_rotated(self, quarter_turns: i32) -> Self {
        let Self { x, y, z } = self;
        match quarter_turns.rem_euclid(4) {
            0 => Self::new(x, y, z),
            1 => Self::new(z, y, -x),
            2 => Self::new(-x, y, -z),
            _ => Self::new(-z, y, x),
        }
    }

    /// Whether every component is `<=` the corresponding component of `other`.
    pub fn all_le(self, other: Self) -> bool {
        self.x <= other.x && self.y <= other.y && self.z <= other.z
    }

    /// Whether every component is `>=` the corresponding component of `other`.
    pub fn all_ge(self, other: Self) -> bool {
        self.x >= other.x && self.y >= other.y && self.z >= other.z
    }
}

impl Add for Pos {
    type Output = Pos;

    fn add(self, rhs: Pos) -> Pos {
        Pos::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Pos {
    fn add_assign(&mut self, rhs: Pos) {
        *self = *self + rhs;
    }
}

impl Sub for Pos {
    type Output = Pos;

    fn sub(self, rhs: Pos) -> Pos {
        Pos::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Pos {
    type Output = Pos;

    fn neg(self) -> Pos {
        Pos::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<Pos> for Pos {
    type Output = Pos;

    fn mul(self, rhs: Pos) -> Pos {
        Pos::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl Mul<i32> for Pos {
    type Output = Pos;

    fn mul(self, rhs: i32) -> Pos {
        Pos::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}, {}, {})", self.x, self.y, self.z)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

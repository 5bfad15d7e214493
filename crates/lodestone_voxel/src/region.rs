//! 3-D region algebra with set-like operations.
//!
//! Three region shapes cover everything the engine needs: explicit point
//! sets, axis-aligned rectangular prisms (inclusive on all edges), and
//! composites of either. Every set operation first runs a cheap AABB
//! overlap test so disjoint regions never enumerate their points.

use crate::pos::Pos;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An axis-aligned rectangular prism, inclusive on all edges.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Prism {
    /// Minimum corner (inclusive).
    pub min: Pos,
    /// Maximum corner (inclusive).
    pub max: Pos,
}

impl Prism {
    /// Creates a prism from its inclusive corners.
    pub fn new(min: Pos, max: Pos) -> Self {
        Self { min, max }
    }

    /// Whether the prism contains no points.
    pub fn is_empty(&self) -> bool {
        !self.min.all_le(self.max)
    }

    /// Whether the prism contains the point.
    pub fn contains(&self, pos: Pos) -> bool {
        self.min.all_le(pos) && pos.all_le(self.max)
    }

    /// Number of contained points.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let extent = self.max - self.min + Pos::new(1, 1, 1);
        extent.x as usize * extent.y as usize * extent.z as usize
    }

    /// Iterates every contained point.
    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        let prism = *self;
        (prism.min.x..=prism.max.x).flat_map(move |x| {
            (prism.min.y..=prism.max.y).flat_map(move |y| {
                (prism.min.z..=prism.max.z).map(move |z| Pos::new(x, y, z))
            })
        })
    }
}

/// A set of voxel positions: points, a prism, or a composite of subregions.
///
/// Composites are not necessarily minimal; they may contain empty or
/// mutually overlapping subregions.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Region {
    /// An explicit point set.
    Points(BTreeSet<Pos>),
    /// A rectangular prism.
    Prism(Prism),
    /// An ordered list of subregions.
    Composite(Vec<Region>),
}

impl Region {
    /// The empty region.
    pub fn empty() -> Self {
        Region::Points(BTreeSet::new())
    }

    /// A region holding the given points.
    pub fn from_points(points: impl IntoIterator<Item = Pos>) -> Self {
        Region::Points(points.into_iter().collect())
    }

    /// A prism region from inclusive corners.
    pub fn prism(min: Pos, max: Pos) -> Self {
        Region::Prism(Prism::new(min, max))
    }

    /// The inclusive AABB corners, or `None` when the region is empty.
    pub fn bounds(&self) -> Option<(Pos, Pos)> {
        match self {
            Region::Points(points) => {
                let mut iter = points.iter();
                let first = *iter.next()?;
                Some(iter.fold((first, first), |(min, max), &p| {
                    (min.elem_min(p), max.elem_max(p))
                }))
            }
            Region::Prism(prism) => {
                if prism.is_empty() {
                    None
                } else {
                    Some((prism.min, prism.max))
                }
            }
            Region::Composite(subregions) => {
                subregions.iter().filter_map(Region::bounds).reduce(
                    |(min_a, max_a), (min_b, max_b)| {
                        (min_a.elem_min(min_b), max_a.elem_max(max_b))
                    },
                )
            }
        }
    }

    /// The bounding prism, or `None` when the region is empty.
    pub fn bounding_prism(&self) -> Option<Prism> {
        self.bounds().map(|(min, max)| Prism::new(min, max))
    }

    /// Whether the region contains no points.
    pub fn is_empty(&self) -> bool {
        match self {
            Region::Points(points) => points.is_empty(),
            Region::Prism(prism) => prism.is_empty(),
            Region::Composite(subregions) => subregions.iter().all(Region::is_empty),
        }
    }

    /// Whether the region contains the point.
    pub fn contains(&self, pos: Pos) -> bool {
        match self {
            Region::Points(points) => points.contains(&pos),
            Region::Prism(prism) => prism.contains(pos),
            Region::Composite(subregions) => {
                subregions.iter().any(|region| region.contains(pos))
            }
        }
    }

    /// Number of distinct contained points.
    pub fn len(&self) -> usize {
        match self {
            Region::Points(points) => points.len(),
            Region::Prism(prism) => prism.len(),
            Region::Composite(subregions) => {
                // Count each subregion minus what earlier subregions already
                // covered, so overlapping composites aren't double counted.
                let mut count = 0;
                let mut counted = Region::empty();
                for subregion in subregions {
                    count += subregion.len() - subregion.intersection(&counted).len();
                    counted = counted.union(subregion.clone());
                }
                count
            }
        }
    }

    /// Iterates the distinct contained points.
    pub fn iter(&self) -> Box<dyn Iterator<Item = Pos> + '_> {
        match self {
            Region::Points(points) => Box::new(points.iter().copied()),
            Region::Prism(prism) => Box::new(prism.iter()),
            Region::Composite(subregions) => {
                let points: BTreeSet<Pos> = subregions
                    .iter()
                    .flat_map(|region| region.iter())
                    .collect();
                Box::new(points.into_iter())
            }
        }
    }

    /// Collects the contained points into a set.
    pub fn points(&self) -> BTreeSet<Pos> {
        self.iter().collect()
    }

    /// Expands the region by `padding` blocks in the horizontal plane only.
    pub fn xz_padded(&self, padding: i32) -> Region {
        match self {
            Region::Points(points) => Region::Points(
                points
                    .iter()
                    .flat_map(|&point| {
                        (-padding..=padding).flat_map(move |dx| {
                            (-padding..=padding)
                                .map(move |dz| point + Pos::new(dx, 0, dz))
                        })
                    })
                    .collect(),
            ),
            Region::Prism(prism) => Region::Prism(Prism::new(
                prism.min - Pos::new(padding, 0, padding),
                prism.max + Pos::new(padding, 0, padding),
            )),
            Region::Composite(subregions) => Region::Composite(
                subregions
                    .iter()
                    .map(|region| region.xz_padded(padding))
                    .collect(),
            ),
        }
    }

    /// Rotates the region about the Y axis by quarter turns.
    pub fn y_rotated(&self, quarter_turns: i32) -> Region {
        match self {
            Region::Points(points) => Region::Points(
                points
                    .iter()
                    .map(|point| point.y_rotated(quarter_turns))
                    .collect(),
            ),
            Region::Prism(prism) => {
                let a = prism.min.y_rotated(quarter_turns);
                let b = prism.max.y_rotated(quarter_turns);
                Region::Prism(Prism::new(a.elem_min(b), a.elem_max(b)))
            }
            Region::Composite(subregions) => Region::Composite(
                subregions
                    .iter()
                    .map(|region| region.y_rotated(quarter_turns))
                    .collect(),
            ),
        }
    }

    /// Translates the region.
    pub fn shifted(&self, offset: Pos) -> Region {
        match self {
            Region::Points(points) => {
                Region::Points(points.iter().map(|&point| point + offset).collect())
            }
            Region::Prism(prism) => {
                Region::Prism(Prism::new(prism.min + offset, prism.max + offset))
            }
            Region::Composite(subregions) => Region::Composite(
                subregions
                    .iter()
                    .map(|region| region.shifted(offset))
                    .collect(),
            ),
        }
    }

    /// Set union. Point sets merge; any other combination composites.
    pub fn union(self, other: Region) -> Region {
        match (self, other) {
            (Region::Points(a), Region::Points(b)) => {
                Region::Points(a.into_iter().chain(b).collect())
            }
            (Region::Composite(mut a), Region::Composite(b)) => {
                a.extend(b);
                Region::Composite(a)
            }
            (Region::Composite(mut a), b) => {
                a.push(b);
                Region::Composite(a)
            }
            (a, Region::Composite(mut b)) => {
                b.insert(0, a);
                Region::Composite(b)
            }
            (a, b) => Region::Composite(vec![a, b]),
        }
    }

    /// Whether the two regions' AABBs overlap.
    fn aabb_overlaps(&self, other: &Region) -> bool {
        match (self.bounds(), other.bounds()) {
            (Some((self_min, self_max)), Some((other_min, other_max))) => {
                self_min.all_le(other_max) && self_max.all_ge(other_min)
            }
            _ => false,
        }
    }

    /// Set intersection.
    ///
    /// Prism ∩ prism stays a prism; anything touching a point set produces a
    /// point set; composites intersect pairwise and drop empty results.
    pub fn intersection(&self, other: &Region) -> Region {
        if !self.aabb_overlaps(other) {
            return Region::empty();
        }

        match (self, other) {
            (Region::Points(a), Region::Points(b)) => {
                Region::Points(a.intersection(b).copied().collect())
            }
            (Region::Points(points), region) | (region, Region::Points(points)) => {
                Region::Points(
                    points
                        .iter()
                        .copied()
                        .filter(|&point| region.contains(point))
                        .collect(),
                )
            }
            (Region::Prism(a), Region::Prism(b)) => Region::Prism(Prism::new(
                a.min.elem_max(b.min),
                a.max.elem_min(b.max),
            )),
            (Region::Composite(subregions), region)
            | (region, Region::Composite(subregions)) => Region::Composite(
                subregions
                    .iter()
                    .map(|subregion| subregion.intersection(region))
                    .filter(|intersection| !intersection.is_empty())
                    .collect(),
            ),
        }
    }

    /// Whether the two regions share any point.
    pub fn intersects(&self, other: &Region) -> bool {
        if !self.aabb_overlaps(other) {
            return false;
        }

        match (self, other) {
            (Region::Points(a), Region::Points(b)) => {
                a.intersection(b).next().is_some()
            }
            (Region::Points(points), region) | (region, Region::Points(points)) => {
                points.iter().any(|&point| region.contains(point))
            }
            // Prisms that pass the AABB test overlap.
            (Region::Prism(_), Region::Prism(_)) => true,
            (Region::Composite(subregions), region)
            | (region, Region::Composite(subregions)) => subregions
                .iter()
                .any(|subregion| subregion.intersects(region)),
        }
    }
}

/// Whether any two of the given regions overlap.
///
/// Pairwise, but each check fails fast on the AABB test, so this stays
/// cheap while most regions are well separated.
pub fn any_overlap(regions: &[Region]) -> bool {
    regions.iter().enumerate().any(|(index, left)| {
        regions[index + 1..]
            .iter()
            .any(|right| left.intersects(right))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prism(min: (i32, i32, i32), max: (i32, i32, i32)) -> Region {
        Region::prism(
            Pos::new(min.0, min.1, min.2),
            Pos::new(max.0, max.1, max.2),
        )
    }

    #[test]
    fn prism_intersection_shares_corner() {
        let a = prism((0, 0, 0), (2, 3, 4));
        let b = prism((2, 3, 4), (3, 4, 5));
        let both = a.intersection(&b);
        assert_eq!(
            both,
            Region::prism(Pos::new(2, 3, 4), Pos::new(2, 3, 4))
        );
        assert!(a.intersects(&b));
    }

    #[test]
    fn prism_disjoint_just_beyond() {
        let a = prism((0, 0, 0), (2, 3, 4));
        let beyond = prism((3, 4, 5), (8, 8, 8));
        assert!(!a.intersects(&beyond));
        assert!(a.intersection(&beyond).is_empty());
        assert!(!a.intersects(&prism((-2, -2, -2), (-1, -1, -1))));
        assert!(a.intersects(&prism((-1, -1, -1), (8, 8, 8))));
    }

    #[test]
    fn composite_intersects_iff_any_subregion_does() {
        let composite = Region::Composite(vec![
            prism((0, 0, 0), (2, 3, 4)),
            prism((-1, -1, -1), (8, 8, 8)),
        ]);
        let just_beyond = prism((3, 4, 5), (8, 8, 8));
        assert!(composite.intersects(&just_beyond));

        let narrow = Region::Composite(vec![prism((0, 0, 0), (2, 3, 4))]);
        assert!(!narrow.intersects(&just_beyond));
    }

    #[test]
    fn point_region_operations() {
        let points = Region::from_points([Pos::new(0, 0, 0), Pos::new(1, 0, 0)]);
        assert_eq!(points.len(), 2);
        assert!(points.contains(Pos::new(1, 0, 0)));
        assert!(!points.contains(Pos::new(2, 0, 0)));

        let shifted = points.shifted(Pos::new(0, 1, 0));
        assert!(shifted.contains(Pos::new(0, 1, 0)));
    }

    #[test]
    fn xz_padding_expands_horizontally_only() {
        let padded = Region::from_points([Pos::new(0, 0, 0)]).xz_padded(2);
        assert!(padded.contains(Pos::new(2, 0, 2)));
        assert!(!padded.contains(Pos::new(2, 1, 2)));
        assert!(!padded.contains(Pos::new(3, 0, 2)));

        let padded_prism = prism((0, 0, 0), (1, 2, 3)).xz_padded(1);
        assert_eq!(
            padded_prism,
            Region::prism(Pos::new(-1, 0, -1), Pos::new(2, 2, 4))
        );
    }

    #[test]
    fn rotation_by_four_is_identity() {
        let regions = [
            prism((0, 0, 0), (1, 2, 3)),
            Region::from_points([Pos::new(1, 2, 3), Pos::new(-1, 0, 4)]),
            Region::Composite(vec![prism((0, 0, 0), (1, 1, 1)), prism((5, 0, 5), (6, 1, 6))]),
        ];
        for region in regions {
            assert_eq!(region.y_rotated(4), region);
        }
    }

    #[test]
    fn rotated_prism_renormalizes_corners() {
        let region = prism((0, 0, 0), (2, 1, 3));
        let rotated = region.y_rotated(1);
        assert_eq!(rotated.bounds(), Some((Pos::new(0, 0, -2), Pos::new(3, 1, 0))));
        assert_eq!(region.len(), rotated.len());
    }

    #[test]
    fn prism_iteration_and_len() {
        let region = prism((0, 0, 0), (1, 1, 1));
        assert_eq!(region.len(), 8);
        assert_eq!(region.iter().count(), 8);
        assert!(prism((1, 0, 0), (0, 0, 0)).is_empty());
    }

    #[test]
    fn composite_len_ignores_overlap() {
        let composite = Region::Composite(vec![
            prism((0, 0, 0), (1, 0, 0)),
            prism((1, 0, 0), (2, 0, 0)),
        ]);
        assert_eq!(composite.len(), 3);
        assert_eq!(composite.iter().count(), 3);
    }

    #[test]
    fn empty_region_bounds() {
        assert_eq!(Region::empty().bounds(), None);
        assert!(Region::empty().is_empty());
        assert_eq!(Region::Composite(vec![]).bounds(), None);
    }

    #[test]
    fn overlap_detection_across_lists() {
        let disjoint = [
            Region::Composite(vec![
                prism((10, 0, 0), (15, 5, 5)),
                prism((10, 0, 0), (10, 0, 0)),
                prism((0, 0, 10), (5, 5, 15)),
            ]),
            prism((0, 10, 0), (5, 15, 5)),
        ];
        assert!(!any_overlap(&disjoint));

        let overlapping = [
            Region::Composite(vec![
                prism((10, 0, 0), (15, 5, 5)),
                prism((0, 0, 10), (5, 5, 15)),
            ]),
            prism((10, 0, 0), (15, 5, 5)),
            prism((5, 0, 0), (10, 5, 5)),
        ];
        assert!(any_overlap(&overlapping));
    }

    #[test]
    fn union_merges_point_sets() {
        let a = Region::from_points([Pos::new(0, 0, 0)]);
        let b = Region::from_points([Pos::new(1, 0, 0), Pos::new(0, 0, 0)]);
        let union = a.union(b);
        assert_eq!(union.len(), 2);
        assert!(matches!(union, Region::Points(_)));

        let mixed = Region::from_points([Pos::new(0, 0, 0)]).union(prism((1, 1, 1), (2, 2, 2)));
        assert!(matches!(mixed, Region::Composite(_)));
        assert_eq!(mixed.len(), 9);
    }
}

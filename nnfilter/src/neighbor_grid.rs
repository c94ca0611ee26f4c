//! Uniform hash grid answering "is any point closer than r" queries.
//!
//! Cells are slightly wider than the search radius, so every point closer
//! than the radius lies in the query cell or one of its direct neighbors.
//! Candidates are then checked with the exact same distance function a full
//! cost matrix would use, so results match the brute force scan.

use std::collections::HashMap;

use rnoise_core::{frame::Point, Real};

use crate::config::CoordinateSubset;

// cell width relative to the radius; absorbs rounding in the distance itself
const CELL_MARGIN: f64 = 1e-3;

type CellKey = (i64, i64, i64);

pub struct NeighborGrid<'a> {
    points: &'a [Point],
    subset: CoordinateSubset,
    radius: f64,
    cell_size: f64,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl<'a> NeighborGrid<'a> {
    pub fn new(points: &'a [Point], subset: CoordinateSubset, radius: Real) -> Self {
        let radius = radius as f64;
        let cell_size = radius * (1.0 + CELL_MARGIN);
        let mut grid = Self {
            points,
            subset,
            radius,
            cell_size,
            cells: HashMap::new(),
        };

        // a zero radius can never be undercut, leave the grid empty
        if radius > 0.0 {
            for (index, point) in points.iter().enumerate() {
                let key = grid.cell_of(point);
                grid.cells.entry(key).or_default().push(index);
            }
        }
        grid
    }

    fn cell_of(&self, point: &Point) -> CellKey {
        let index = |v: Real| (v as f64 / self.cell_size).floor() as i64;
        match self.subset {
            CoordinateSubset::XOnly => (index(point.x), 0, 0),
            CoordinateSubset::Xyz => (index(point.x), index(point.y), index(point.z)),
        }
    }

    fn candidates(&self, query: &Point) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy, cz) = self.cell_of(query);
        let span: i64 = if self.subset.dimensions() == 1 { 0 } else { 1 };

        (-1..=1i64)
            .flat_map(move |dx| {
                (-span..=span).flat_map(move |dy| (-span..=span).map(move |dz| (dx, dy, dz)))
            })
            .filter_map(move |(dx, dy, dz)| {
                self.cells.get(&(
                    cx.saturating_add(dx),
                    cy.saturating_add(dy),
                    cz.saturating_add(dz),
                ))
            })
            .flatten()
            .copied()
    }

    /// Nearest point strictly closer than the radius, with its distance.
    pub fn nearest_within(&self, query: &Point) -> Option<(usize, f64)> {
        if self.cells.is_empty() {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        for index in self.candidates(query) {
            let distance = self.subset.distance(query, &self.points[index]);
            if distance >= self.radius {
                continue;
            }
            match best {
                Some((best_index, best_distance))
                    if best_distance < distance
                        || (best_distance == distance && best_index < index) => {}
                _ => best = Some((index, distance)),
            }
        }
        best
    }

    pub fn has_neighbor(&self, query: &Point) -> bool {
        self.nearest_within(query).is_some()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn brute_force_min(query: &Point, points: &[Point], subset: CoordinateSubset) -> Option<f64> {
        points
            .iter()
            .map(|p| subset.distance(query, p))
            .min_by(|a, b| a.total_cmp(b))
    }

    fn random_points(rng: &mut StdRng, n: usize) -> Vec<Point> {
        (0..n)
            .map(|_| {
                Point::new(
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-0.5..0.5),
                    rng.gen_range(0.0..50.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        for subset in [CoordinateSubset::XOnly, CoordinateSubset::Xyz] {
            for radius in [0.05, 0.3, 1.0] {
                let points = random_points(&mut rng, 200);
                let queries = random_points(&mut rng, 200);
                let grid = NeighborGrid::new(&points, subset, radius);

                for query in &queries {
                    let expected = brute_force_min(query, &points, subset)
                        .map(|d| d < radius as f64)
                        .unwrap_or(false);
                    assert_eq!(grid.has_neighbor(query), expected, "{subset:?} r={radius}");

                    if let Some((index, distance)) = grid.nearest_within(query) {
                        assert_eq!(Some(distance), brute_force_min(query, &points, subset));
                        assert_eq!(subset.distance(query, &points[index]), distance);
                    }
                }
            }
        }
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let points = [Point::new(0.0, 0.0, 0.0, 1.0)];
        let grid = NeighborGrid::new(&points, CoordinateSubset::XOnly, 0.5);
        assert!(!grid.has_neighbor(&Point::new(0.5, 0.0, 0.0, 1.0)));
        assert!(!grid.has_neighbor(&Point::new(-0.5, 0.0, 0.0, 1.0)));
        assert!(grid.has_neighbor(&Point::new(0.49, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_x_only_ignores_other_axes() {
        let points = [Point::new(1.0, 0.0, 0.0, 1.0)];
        let query = Point::new(1.1, 40.0, -3.0, 1.0);

        let grid = NeighborGrid::new(&points, CoordinateSubset::XOnly, 0.3);
        assert!(grid.has_neighbor(&query));

        let grid = NeighborGrid::new(&points, CoordinateSubset::Xyz, 0.3);
        assert!(!grid.has_neighbor(&query));
    }

    #[test]
    fn test_degenerate_inputs() {
        let grid = NeighborGrid::new(&[], CoordinateSubset::Xyz, 0.3);
        assert!(grid.is_empty());
        assert!(!grid.has_neighbor(&Point::new(0.0, 0.0, 0.0, 0.0)));

        let points = [Point::new(0.0, 0.0, 0.0, 1.0)];
        let grid = NeighborGrid::new(&points, CoordinateSubset::Xyz, 0.0);
        assert_eq!(grid.len(), 1);
        assert!(!grid.has_neighbor(&points[0]));
    }

    #[test]
    fn test_duplicate_points() {
        let points = vec![Point::new(2.0, 2.0, 0.0, 1.0); 500];
        let grid = NeighborGrid::new(&points, CoordinateSubset::Xyz, 0.3);
        assert_eq!(
            grid.nearest_within(&Point::new(2.1, 2.0, 0.0, 1.0)).map(|(i, _)| i),
            Some(0)
        );
    }

    #[test]
    fn test_tiny_radius() {
        let points = [Point::new(0.0, 0.0, 0.0, 1.0)];
        for subset in [CoordinateSubset::XOnly, CoordinateSubset::Xyz] {
            let grid = NeighborGrid::new(&points, subset, 1e-25);
            assert!(!grid.has_neighbor(&Point::new(1e-24, 0.0, 0.0, 1.0)));
            assert!(grid.has_neighbor(&Point::new(1e-26, 0.0, 0.0, 1.0)));
            assert!(grid.has_neighbor(&points[0]));
        }
    }

    #[test]
    fn test_far_from_origin() {
        let points = [Point::new(1e20, -1e20, 0.0, 1.0)];
        let grid = NeighborGrid::new(&points, CoordinateSubset::Xyz, 0.3);
        assert!(grid.has_neighbor(&points[0]));
        assert!(!grid.has_neighbor(&Point::new(-1e20, 1e20, 0.0, 1.0)));
    }
}

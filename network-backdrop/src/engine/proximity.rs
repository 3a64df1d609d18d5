use std::collections::{BTreeSet, HashMap};

use bevy::prelude::*;
use constants::cloud::PARTITION_MIN_POINTS;

use crate::engine::point_cloud::Point;

/// Unordered pair of point indices, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    a: u32,
    b: u32,
}

impl Edge {
    /// Normalise the pair. Returns `None` for a self-loop.
    pub fn new(i: u32, j: u32) -> Option<Self> {
        match i.cmp(&j) {
            std::cmp::Ordering::Less => Some(Self { a: i, b: j }),
            std::cmp::Ordering::Greater => Some(Self { a: j, b: i }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn endpoints(&self) -> (u32, u32) {
        (self.a, self.b)
    }
}

/// Largest cell coordinate the grid addresses. Neighbour offsets stay well
/// inside `i32`.
const MAX_GRID_COORD: f32 = (1u32 << 30) as f32;

/// Proximity graph of one engine instance. Built once, never mutated.
pub type EdgeSet = BTreeSet<Edge>;

/// Connect every pair of points strictly closer than `threshold`.
///
/// Small clouds use the exhaustive scan; larger ones go through a spatial
/// hash. Both produce the same set.
pub fn build(points: &[Point], threshold: f32) -> EdgeSet {
    if points.len() < PARTITION_MIN_POINTS {
        build_exhaustive(points, threshold)
    } else {
        build_partitioned(points, threshold)
    }
}

/// O(N²) scan over every pair `i < j`.
pub fn build_exhaustive(points: &[Point], threshold: f32) -> EdgeSet {
    let mut edges = EdgeSet::new();
    if threshold <= 0.0 {
        return edges;
    }
    let threshold_sq = threshold * threshold;

    for (i, first) in points.iter().enumerate() {
        for (j, second) in points.iter().enumerate().skip(i + 1) {
            if first.position.distance_squared(second.position) < threshold_sq {
                edges.extend(Edge::new(i as u32, j as u32));
            }
        }
    }

    edges
}

/// Uniform grid with cell size equal to `threshold`. Any pair closer than the
/// threshold lies in the same or an adjacent cell, so only the 27-cell
/// neighbourhood of each point is scanned. Clouds too large for the grid at
/// this threshold are scanned exhaustively.
pub fn build_partitioned(points: &[Point], threshold: f32) -> EdgeSet {
    let mut edges = EdgeSet::new();
    if threshold <= 0.0 {
        return edges;
    }
    let grid_of = |position: Vec3| (position / threshold).floor();
    let out_of_grid = points.iter().any(|point| {
        let grid = grid_of(point.position);
        !grid.is_finite() || grid.abs().max_element() > MAX_GRID_COORD
    });
    if out_of_grid {
        debug!("Cloud extent exceeds the cell grid at threshold {threshold}, scanning all pairs");
        return build_exhaustive(points, threshold);
    }

    let threshold_sq = threshold * threshold;
    let cell_of = |position: Vec3| grid_of(position).as_ivec3();

    let mut cells: HashMap<IVec3, Vec<u32>> = HashMap::new();
    for (index, point) in points.iter().enumerate() {
        cells
            .entry(cell_of(point.position))
            .or_default()
            .push(index as u32);
    }

    for (i, point) in points.iter().enumerate() {
        let i = i as u32;
        let cell = cell_of(point.position);

        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let Some(neighbours) = cells.get(&(cell + IVec3::new(dx, dy, dz))) else {
                        continue;
                    };
                    for &j in neighbours {
                        if j <= i {
                            continue;
                        }
                        let other = points[j as usize].position;
                        if point.position.distance_squared(other) < threshold_sq {
                            edges.extend(Edge::new(i, j));
                        }
                    }
                }
            }
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::BackdropConfig;
    use crate::engine::point_cloud::{ColourClass, generate};
    use rand::SeedableRng;
    use rand::seq::SliceRandom;
    use rand_chacha::ChaCha8Rng;

    fn point(x: f32, y: f32, z: f32) -> Point {
        Point {
            position: Vec3::new(x, y, z),
            class: ColourClass::Nominal,
        }
    }

    fn random_cloud(seed: u64, count: usize) -> Vec<Point> {
        let config = BackdropConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate(&mut rng, count, &config.bounds, &config.colour_bands)
    }

    #[test]
    fn edge_normalises_orientation() {
        assert_eq!(Edge::new(4, 1), Edge::new(1, 4));
        assert_eq!(Edge::new(4, 1).map(|e| e.endpoints()), Some((1, 4)));
        assert_eq!(Edge::new(3, 3), None);
    }

    #[test]
    fn empty_cloud_has_no_edges() {
        assert!(build(&[], 20.0).is_empty());
        assert!(build_partitioned(&[], 20.0).is_empty());
    }

    #[test]
    fn distance_equal_to_threshold_is_excluded() {
        let points = [point(0.0, 0.0, 0.0), point(20.0, 0.0, 0.0)];
        assert!(build(&points, 20.0).is_empty());
        assert!(build_partitioned(&points, 20.0).is_empty());
    }

    #[test]
    fn distance_just_below_threshold_is_included() {
        let points = [point(0.0, 0.0, 0.0), point(19.99, 0.0, 0.0)];
        let expected: EdgeSet = Edge::new(0, 1).into_iter().collect();
        assert_eq!(build(&points, 20.0), expected);
        assert_eq!(build_partitioned(&points, 20.0), expected);
    }

    #[test]
    fn non_positive_threshold_yields_no_edges() {
        let points = [point(0.0, 0.0, 0.0), point(0.0, 0.0, 0.0)];
        assert!(build(&points, 0.0).is_empty());
        assert!(build_partitioned(&points, 0.0).is_empty());
    }

    #[test]
    fn every_edge_is_shorter_than_threshold() {
        let points = random_cloud(11, 300);
        let edges = build(&points, 20.0);
        assert!(!edges.is_empty());

        for edge in &edges {
            let (a, b) = edge.endpoints();
            assert!(a < b);
            let distance = points[a as usize]
                .position
                .distance(points[b as usize].position);
            assert!(distance < 20.0, "edge {a}-{b} spans {distance}");
        }
    }

    #[test]
    fn no_qualifying_pair_is_missed() {
        let points = random_cloud(12, 200);
        let edges = build(&points, 20.0);
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                let close = points[i].position.distance(points[j].position) < 20.0;
                let present = edges.contains(&Edge::new(i as u32, j as u32).unwrap());
                assert_eq!(close, present, "pair {i}-{j}");
            }
        }
    }

    #[test]
    fn partitioned_matches_exhaustive() {
        for (seed, count, threshold) in [(1, 300, 20.0), (2, 1500, 8.0), (3, 500, 45.0)] {
            let points = random_cloud(seed, count);
            assert_eq!(
                build_partitioned(&points, threshold),
                build_exhaustive(&points, threshold),
                "seed {seed}"
            );
        }
    }

    #[test]
    fn partitioned_handles_points_on_cell_boundaries() {
        let points = [
            point(-20.0, 0.0, 0.0),
            point(0.0, 0.0, 0.0),
            point(19.5, 0.0, 0.0),
            point(-0.5, -0.5, -0.5),
        ];
        assert_eq!(
            build_partitioned(&points, 20.0),
            build_exhaustive(&points, 20.0)
        );
    }

    #[test]
    fn large_clouds_use_identical_graph() {
        let points = random_cloud(5, PARTITION_MIN_POINTS + 10);
        assert_eq!(build(&points, 10.0), build_exhaustive(&points, 10.0));
    }

    #[test]
    fn permuting_input_yields_isomorphic_graph() {
        let points = random_cloud(21, 300);
        let edges = build(&points, 20.0);

        let mut order: Vec<usize> = (0..points.len()).collect();
        order.shuffle(&mut ChaCha8Rng::seed_from_u64(99));
        let permuted: Vec<Point> = order.iter().map(|&i| points[i]).collect();

        // Map each edge of the permuted cloud back to original indices
        let relabelled: EdgeSet = build(&permuted, 20.0)
            .into_iter()
            .filter_map(|edge| {
                let (a, b) = edge.endpoints();
                Edge::new(order[a as usize] as u32, order[b as usize] as u32)
            })
            .collect();

        assert_eq!(relabelled, edges);
    }

    #[test]
    fn far_flung_cloud_falls_back_to_exhaustive_scan() {
        // Pairs share a position; distinct pairs sit 1e9 apart near 1e12
        let points: Vec<Point> = (0..PARTITION_MIN_POINTS)
            .map(|i| point(1.0e12 + (i / 2) as f32 * 1.0e9, 0.0, 0.0))
            .collect();

        let edges = build(&points, 20.0);
        assert_eq!(edges.len(), PARTITION_MIN_POINTS / 2);
        assert!(edges.contains(&Edge::new(0, 1).unwrap()));
        assert!(!edges.contains(&Edge::new(1, 2).unwrap()));
    }

    #[test]
    fn tiny_threshold_on_large_cloud_does_not_overflow_grid() {
        let points = random_cloud(23, PARTITION_MIN_POINTS);
        assert!(build_partitioned(&points, 1.0e-30).is_empty());
    }
}

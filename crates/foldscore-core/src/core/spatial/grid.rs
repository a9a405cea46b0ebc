use crate::core::models::conformation::Conformation;
use crate::core::models::ids::AtomId;
use nalgebra::Point3;
use slotmap::SecondaryMap;
use std::collections::HashMap;

/// Integer grid coordinates of a cell.
pub type Cell = (i32, i32, i32);

/// Uniform grid of cubic cells holding atom ids.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    inv_cell_size: f64,
    cells: HashMap<Cell, Vec<AtomId>>,
    positions: SecondaryMap<AtomId, Point3<f64>>,
    locations: SecondaryMap<AtomId, Cell>,
}

impl SpatialIndex {
    /// Creates an empty index. `cell_size` must be positive.
    pub fn new(cell_size: f64) -> Self {
        debug_assert!(cell_size > 0.0, "cell_size must be positive");
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            positions: SecondaryMap::new(),
            locations: SecondaryMap::new(),
        }
    }

    pub fn from_points(
        points: impl IntoIterator<Item = (AtomId, Point3<f64>)>,
        cell_size: f64,
    ) -> Self {
        let mut index = Self::new(cell_size);
        for (id, point) in points {
            index.insert(id, point);
        }
        index
    }

    /// Indexes every atom of a conformation at its current position.
    pub fn build(conformation: &Conformation, cell_size: f64) -> Self {
        Self::from_points(
            conformation.atoms().map(|(id, atom)| (id, atom.position)),
            cell_size,
        )
    }

    pub fn cell_of(&self, point: &Point3<f64>) -> Cell {
        (
            (point.x * self.inv_cell_size).floor() as i32,
            (point.y * self.inv_cell_size).floor() as i32,
            (point.z * self.inv_cell_size).floor() as i32,
        )
    }

    fn insert(&mut self, id: AtomId, point: Point3<f64>) {
        if self.positions.contains_key(id) {
            self.update_position(id, point);
            return;
        }
        let cell = self.cell_of(&point);
        self.cells.entry(cell).or_default().push(id);
        self.positions.insert(id, point);
        self.locations.insert(id, cell);
    }

    /// Moves an atom to `position`, changing buckets only when it leaves its
    /// cell. Unknown atoms are inserted.
    pub fn update_position(&mut self, id: AtomId, position: Point3<f64>) {
        let Some(&old_cell) = self.locations.get(id) else {
            self.insert(id, position);
            return;
        };
        let new_cell = self.cell_of(&position);
        self.positions.insert(id, position);
        if new_cell == old_cell {
            return;
        }

        if let Some(bucket) = self.cells.get_mut(&old_cell) {
            if let Some(slot) = bucket.iter().position(|&a| a == id) {
                bucket.swap_remove(slot);
            }
            if bucket.is_empty() {
                self.cells.remove(&old_cell);
            }
        }
        self.cells.entry(new_cell).or_default().push(id);
        self.locations.insert(id, new_cell);
    }

    /// Calls `f(id, distance_squared)` for every indexed atom strictly closer
    /// than `radius` to `point`, skipping `exclude`.
    pub fn for_each_neighbor<F: FnMut(AtomId, f64)>(
        &self,
        point: &Point3<f64>,
        radius: f64,
        exclude: Option<AtomId>,
        mut f: F,
    ) {
        let radius_sq = radius * radius;
        let (min_x, min_y, min_z) = self.cell_of(&Point3::new(
            point.x - radius,
            point.y - radius,
            point.z - radius,
        ));
        let (max_x, max_y, max_z) = self.cell_of(&Point3::new(
            point.x + radius,
            point.y + radius,
            point.z + radius,
        ));

        for gx in min_x..=max_x {
            for gy in min_y..=max_y {
                for gz in min_z..=max_z {
                    let Some(bucket) = self.cells.get(&(gx, gy, gz)) else {
                        continue;
                    };
                    for &id in bucket {
                        if Some(id) == exclude {
                            continue;
                        }
                        let d2 = (self.positions[id] - *point).norm_squared();
                        if d2 < radius_sq {
                            f(id, d2);
                        }
                    }
                }
            }
        }
    }

    /// Calls `f(id, position)` for every atom in the cells that can hold a
    /// point within `radius` of some point of `cell`. Callers filter by exact
    /// distance.
    pub fn for_each_near_cell<F: FnMut(AtomId, &Point3<f64>)>(
        &self,
        cell: Cell,
        radius: f64,
        mut f: F,
    ) {
        let reach = (radius * self.inv_cell_size).ceil() as i32;
        let (cx, cy, cz) = cell;
        for gx in cx - reach..=cx + reach {
            for gy in cy - reach..=cy + reach {
                for gz in cz - reach..=cz + reach {
                    let Some(bucket) = self.cells.get(&(gx, gy, gz)) else {
                        continue;
                    };
                    for &id in bucket {
                        f(id, &self.positions[id]);
                    }
                }
            }
        }
    }

    /// Atoms strictly within `radius` of `point`, excluding `exclude`.
    pub fn query(
        &self,
        point: &Point3<f64>,
        radius: f64,
        exclude: Option<AtomId>,
    ) -> Vec<AtomId> {
        let mut found = Vec::new();
        self.for_each_neighbor(point, radius, exclude, |id, _| found.push(id));
        found
    }

    /// Atoms strictly within `radius` of an indexed atom, excluding that atom.
    pub fn query_atom(&self, id: AtomId, radius: f64) -> Vec<AtomId> {
        match self.positions.get(id) {
            Some(point) => self.query(point, radius, Some(id)),
            None => Vec::new(),
        }
    }

    pub fn position(&self, id: AtomId) -> Option<Point3<f64>> {
        self.positions.get(id).copied()
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use slotmap::SlotMap;
    use std::collections::HashSet;

    fn random_point(rng: &mut StdRng, extent: f64) -> Point3<f64> {
        let half = extent / 2.0;
        Point3::new(
            rng.gen_range(-half..half),
            rng.gen_range(-half..half),
            rng.gen_range(-half..half),
        )
    }

    fn cloud(n: usize, extent: f64, seed: u64) -> (Vec<AtomId>, Vec<Point3<f64>>) {
        let mut keys: SlotMap<AtomId, ()> = SlotMap::with_key();
        let mut rng = StdRng::seed_from_u64(seed);
        let ids = (0..n).map(|_| keys.insert(())).collect();
        let points = (0..n).map(|_| random_point(&mut rng, extent)).collect();
        (ids, points)
    }

    fn brute_force(
        ids: &[AtomId],
        points: &[Point3<f64>],
        centre: &Point3<f64>,
        radius: f64,
        exclude: Option<AtomId>,
    ) -> HashSet<AtomId> {
        ids.iter()
            .zip(points)
            .filter(|(id, p)| Some(**id) != exclude && (**p - *centre).norm() < radius)
            .map(|(id, _)| *id)
            .collect()
    }

    #[test]
    fn query_matches_brute_force_for_several_cell_sizes() {
        let (ids, points) = cloud(400, 30.0, 7);
        for cell_size in [2.0, 4.5, 9.0] {
            let index =
                SpatialIndex::from_points(ids.iter().copied().zip(points.iter().copied()), cell_size);
            for (k, centre) in points.iter().enumerate().step_by(37) {
                for radius in [3.0, 8.0] {
                    let got: HashSet<_> =
                        index.query(centre, radius, Some(ids[k])).into_iter().collect();
                    let want = brute_force(&ids, &points, centre, radius, Some(ids[k]));
                    assert_eq!(got, want, "cell {cell_size}, radius {radius}");
                }
            }
        }
    }

    #[test]
    fn query_atom_excludes_itself() {
        let (ids, points) = cloud(50, 5.0, 3);
        let index = SpatialIndex::from_points(ids.iter().copied().zip(points), 4.5);
        let found = index.query_atom(ids[0], 100.0);
        assert_eq!(found.len(), 49);
        assert!(!found.contains(&ids[0]));
    }

    #[test]
    fn boundary_distance_is_excluded() {
        let (ids, _) = cloud(2, 1.0, 1);
        let index = SpatialIndex::from_points(
            [
                (ids[0], Point3::origin()),
                (ids[1], Point3::new(8.0, 0.0, 0.0)),
            ],
            4.5,
        );
        assert!(index.query_atom(ids[0], 8.0).is_empty());
        assert_eq!(index.query_atom(ids[0], 8.0001), vec![ids[1]]);
    }

    #[test]
    fn duplicate_positions_are_both_found() {
        let (ids, _) = cloud(3, 1.0, 1);
        let p = Point3::new(1.0, 1.0, 1.0);
        let index =
            SpatialIndex::from_points([(ids[0], p), (ids[1], p), (ids[2], Point3::origin())], 4.5);
        let found: HashSet<_> = index.query(&p, 0.5, None).into_iter().collect();
        assert_eq!(found, HashSet::from([ids[0], ids[1]]));
    }

    #[test]
    fn update_position_relocates_across_cells() {
        let (ids, mut points) = cloud(200, 20.0, 11);
        let mut index =
            SpatialIndex::from_points(ids.iter().copied().zip(points.iter().copied()), 4.5);

        let mut rng = StdRng::seed_from_u64(99);
        for k in (0..200).step_by(3) {
            points[k] = random_point(&mut rng, 20.0);
            index.update_position(ids[k], points[k]);
        }
        assert_eq!(index.len(), 200);

        for (k, centre) in points.iter().enumerate().step_by(19) {
            let got: HashSet<_> = index.query(centre, 8.0, Some(ids[k])).into_iter().collect();
            assert_eq!(got, brute_force(&ids, &points, centre, 8.0, Some(ids[k])));
        }
    }

    #[test]
    fn near_cell_scan_covers_every_point_of_the_cell() {
        let (ids, points) = cloud(300, 25.0, 23);
        let index = SpatialIndex::from_points(ids.iter().copied().zip(points.iter().copied()), 4.5);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let centre = random_point(&mut rng, 20.0);
            let mut seen = HashSet::new();
            index.for_each_near_cell(index.cell_of(&centre), 8.0, |id, _| {
                seen.insert(id);
            });
            assert!(brute_force(&ids, &points, &centre, 8.0, None).is_subset(&seen));
        }
    }

    #[test]
    fn update_back_and_forth_restores_query_results() {
        let (ids, points) = cloud(100, 15.0, 5);
        let mut index =
            SpatialIndex::from_points(ids.iter().copied().zip(points.iter().copied()), 4.5);
        let before: HashSet<_> = index.query(&points[0], 8.0, None).into_iter().collect();

        index.update_position(ids[3], Point3::new(500.0, 500.0, 500.0));
        index.update_position(ids[3], points[3]);

        let after: HashSet<_> = index.query(&points[0], 8.0, None).into_iter().collect();
        assert_eq!(before, after);
        assert_eq!(index.position(ids[3]), Some(points[3]));
    }

    #[test]
    fn negative_coordinates_use_floor_cells() {
        let (ids, _) = cloud(2, 1.0, 1);
        let index = SpatialIndex::from_points(
            [
                (ids[0], Point3::new(-0.1, -0.1, -0.1)),
                (ids[1], Point3::new(0.1, 0.1, 0.1)),
            ],
            4.5,
        );
        assert_eq!(index.query_atom(ids[0], 1.0), vec![ids[1]]);
    }
}

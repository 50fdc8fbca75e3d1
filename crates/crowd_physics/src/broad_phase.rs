//! Uniform spatial grid broad phase: produces candidate shape–shape and
//! shape–segment pairs for narrow-phase overlap testing (§4.4).

use crate::wall::Wall;
use nalgebra::Point2;

/// A reference to one disk shape: the index of its owning agent in
/// [`crate::agent::AgentManager`] and the shape's index within that agent.
pub type ShapeRef = (usize, usize);

/// A reference to one wall segment: the index of the wall and the index of
/// the segment (its starting corner) within that wall.
pub type SegmentRef = (usize, usize);

/// A uniform grid spanning the world's bounding box, with cells sized so that
/// any two overlapping disks are guaranteed to fall in the same or adjacent
/// cells (§4.4). Buffers are reused across sub-steps to avoid allocator
/// churn, per §5.
pub struct UniformGrid {
    cell_size: f64,
    n_cols: usize,
    n_rows: usize,
    shape_cells: Vec<Vec<ShapeRef>>,
    wall_cells: Vec<Vec<SegmentRef>>,
}

impl UniformGrid {
    /// Creates a grid spanning `[0, lx] x [0, ly]` with the given cell size,
    /// which callers must choose as at least `2 * r_max` across all shapes.
    pub fn new(lx: f64, ly: f64, cell_size: f64) -> Self {
        let n_cols = ((lx / cell_size).ceil() as usize).max(1);
        let n_rows = ((ly / cell_size).ceil() as usize).max(1);
        let n_cells = n_cols * n_rows;
        Self {
            cell_size,
            n_cols,
            n_rows,
            shape_cells: vec![Vec::new(); n_cells],
            wall_cells: vec![Vec::new(); n_cells],
        }
    }

    fn cell_coords(&self, point: Point2<f64>) -> (usize, usize) {
        let col = ((point.x / self.cell_size).floor() as isize).clamp(0, self.n_cols as isize - 1);
        let row = ((point.y / self.cell_size).floor() as isize).clamp(0, self.n_rows as isize - 1);
        (col as usize, row as usize)
    }

    fn cell_idx(&self, col: usize, row: usize) -> usize {
        row * self.n_cols + col
    }

    /// Rasterizes every wall's segments into the cells their bounding boxes
    /// overlap. Walls are static, so this is done once at load time.
    pub fn rasterize_walls(&mut self, walls: &[Wall]) {
        for cells in &mut self.wall_cells {
            cells.clear();
        }
        for (wall_idx, wall) in walls.iter().enumerate() {
            for (segment_idx, segment) in wall.segments() {
                let (col_a, row_a) = self.cell_coords(segment.start);
                let (col_b, row_b) = self.cell_coords(segment.end);
                let (col_lo, col_hi) = (col_a.min(col_b), col_a.max(col_b));
                let (row_lo, row_hi) = (row_a.min(row_b), row_a.max(row_b));
                for row in row_lo..=row_hi {
                    for col in col_lo..=col_hi {
                        let idx = self.cell_idx(col, row);
                        self.wall_cells[idx].push((wall_idx, segment_idx));
                    }
                }
            }
        }
    }

    /// Clears the per-sub-step shape buckets.
    pub fn clear_shapes(&mut self) {
        for cell in &mut self.shape_cells {
            cell.clear();
        }
    }

    pub fn insert_shape(&mut self, agent_idx: usize, shape_idx: usize, world_center: Point2<f64>) {
        let (col, row) = self.cell_coords(world_center);
        let idx = self.cell_idx(col, row);
        self.shape_cells[idx].push((agent_idx, shape_idx));
    }

    fn neighbor_cells(&self, col: usize, row: usize) -> impl Iterator<Item = usize> + '_ {
        let col_lo = col.saturating_sub(1);
        let col_hi = (col + 1).min(self.n_cols - 1);
        let row_lo = row.saturating_sub(1);
        let row_hi = (row + 1).min(self.n_rows - 1);
        (row_lo..=row_hi)
            .flat_map(move |row| (col_lo..=col_hi).map(move |col| (col, row)))
            .map(move |(col, row)| self.cell_idx(col, row))
    }

    /// Appends every candidate agent-shape pair not belonging to the same
    /// agent to `out`, in ascending `(agent_idx, shape_idx)` lexicographic
    /// order with no duplicates. `out` is cleared first; callers should
    /// retain and reuse the buffer across sub-steps.
    pub fn collect_shape_pairs(&self, out: &mut Vec<(ShapeRef, ShapeRef)>) {
        out.clear();
        for row in 0..self.n_rows {
            for col in 0..self.n_cols {
                let here = &self.shape_cells[self.cell_idx(col, row)];
                for &a in here {
                    for neighbor_idx in self.neighbor_cells(col, row) {
                        for &b in &self.shape_cells[neighbor_idx] {
                            if a.0 != b.0 && a < b {
                                out.push((a, b));
                            }
                        }
                    }
                }
            }
        }
        out.sort_unstable();
    }

    /// Appends every candidate (shape, wall segment) pair to `out`, in
    /// ascending `(agent_idx, shape_idx, wall_idx, segment_idx)`
    /// lexicographic order with no duplicates. `out` is cleared first.
    pub fn collect_wall_candidates(&self, out: &mut Vec<(ShapeRef, SegmentRef)>) {
        out.clear();
        for row in 0..self.n_rows {
            for col in 0..self.n_cols {
                let here = &self.shape_cells[self.cell_idx(col, row)];
                if here.is_empty() {
                    continue;
                }
                for neighbor_idx in self.neighbor_cells(col, row) {
                    for &segment_ref in &self.wall_cells[neighbor_idx] {
                        for &shape_ref in here {
                            out.push((shape_ref, segment_ref));
                        }
                    }
                }
            }
        }
        out.sort_unstable();
        out.dedup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wall::WallId;

    #[test]
    fn candidate_pairs_exclude_same_agent_and_avoid_duplicates() {
        let mut grid = UniformGrid::new(10.0, 10.0, 1.0);
        grid.clear_shapes();
        grid.insert_shape(0, 0, Point2::new(0.1, 0.1));
        grid.insert_shape(0, 1, Point2::new(0.2, 0.1));
        grid.insert_shape(1, 0, Point2::new(0.15, 0.15));

        let mut pairs = Vec::new();
        grid.collect_shape_pairs(&mut pairs);

        assert!(pairs.iter().all(|(a, b)| a.0 != b.0));
        assert_eq!(pairs.len(), 2); // agent 1 shape 0 vs each of agent 0's shapes
        let mut deduped = pairs.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(pairs, deduped);
    }

    #[test]
    fn far_apart_shapes_are_not_candidates() {
        let mut grid = UniformGrid::new(10.0, 10.0, 1.0);
        grid.clear_shapes();
        grid.insert_shape(0, 0, Point2::new(0.1, 0.1));
        grid.insert_shape(1, 0, Point2::new(9.0, 9.0));

        let mut pairs = Vec::new();
        grid.collect_shape_pairs(&mut pairs);
        assert!(pairs.is_empty());
    }

    #[test]
    fn wall_candidates_are_found_via_rasterized_segments() {
        let wall = crate::wall::Wall::new(
            WallId(0),
            None,
            vec![Point2::new(0.0, 0.0), Point2::new(5.0, 0.0)],
        )
        .unwrap();
        let mut grid = UniformGrid::new(10.0, 10.0, 1.0);
        grid.rasterize_walls(std::slice::from_ref(&wall));
        grid.clear_shapes();
        grid.insert_shape(0, 0, Point2::new(2.5, 0.3));

        let mut candidates = Vec::new();
        grid.collect_wall_candidates(&mut candidates);
        assert!(candidates.contains(&((0, 0), (0, 0))));
    }
}

use crate::grid::CellGrid;

/// A cell to compare against, plus the shift that brings the primary cell's
/// points into the neighbour's periodic frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NeighborCell {
    /// Flat index of the neighbour cell.
    pub index: usize,
    /// Added to every primary coordinate before differences are taken.
    pub offset: [f64; 3],
}

/// Precomputed cell offsets visited around every primary cell.
///
/// The forward window only looks at `iz + 0..=bz` along the line of sight:
/// every pair is seen from the point with the smaller z, and same-z pairs
/// are split by point index in the kernels. The symmetric window is used
/// when the grid is too coarse for that argument to hold, together with the
/// minimum-image filter.
#[derive(Clone, Debug)]
pub struct NeighborWindow {
    offsets: Vec<[isize; 3]>,
}

impl NeighborWindow {
    /// Offsets `[-bx, bx] x [-by, by] x [0, bz]`.
    pub fn forward(refine: [usize; 3]) -> Self {
        Self::with_z_range(refine, 0)
    }

    /// Offsets `[-bx, bx] x [-by, by] x [-bz, bz]`.
    pub fn symmetric(refine: [usize; 3]) -> Self {
        Self::with_z_range(refine, -(refine[2] as isize))
    }

    fn with_z_range(refine: [usize; 3], z_start: isize) -> Self {
        let [bx, by, bz] = refine.map(|r| r as isize);
        let mut offsets = Vec::new();
        for dx in -bx..=bx {
            for dy in -by..=by {
                for dz in z_start..=bz {
                    offsets.push([dx, dy, dz]);
                }
            }
        }
        Self { offsets }
    }

    /// Number of neighbour cells visited per primary cell.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn offsets(&self) -> &[[isize; 3]] {
        &self.offsets
    }

    /// Neighbours of the cell at `cell`, wrapped into the grid.
    ///
    /// Euclidean division gives the number of times an offset crosses the
    /// box, so even a window wider than the grid maps every offset to a
    /// distinct periodic image.
    pub fn neighbors<'a>(
        &'a self,
        grid: &'a CellGrid,
        cell: [usize; 3],
    ) -> impl Iterator<Item = NeighborCell> + 'a {
        let nmesh = grid.nmesh();
        let boxsize = grid.boxsize();
        self.offsets.iter().map(move |off| {
            let mut idx = [0_usize; 3];
            let mut offset = [0.0_f64; 3];
            for a in 0..3 {
                let n = nmesh[a] as isize;
                let unwrapped = cell[a] as isize + off[a];
                let crossings = unwrapped.div_euclid(n);
                idx[a] = unwrapped.rem_euclid(n) as usize;
                offset[a] = -(crossings as f64) * boxsize;
            }
            let index = grid.flat_index(idx);
            debug_assert!(index < grid.ncells(), "neighbour index out of range");
            NeighborCell { index, offset }
        })
    }
}

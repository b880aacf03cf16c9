use rayon::prelude::*;
use tracing::{debug, info_span};

use crate::bounds::{Axis, PeriodicBox};
use crate::error::{Result, WpError};
use crate::points::Points;

/// Options that shape the cell grid.
#[derive(Clone, Copy, Debug)]
pub struct GridOptions {
    /// Upper bound on the number of cells along any axis.
    pub max_cells_per_dim: usize,
    /// Order every cell by `(z, index)`.
    pub sort_on_z: bool,
    /// Sort cells on the current rayon pool rather than the calling thread.
    pub parallel: bool,
}

/// The points owned by one cell, as parallel slices into the grid arena.
#[derive(Clone, Copy, Debug)]
pub struct CellView<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub z: &'a [f64],
    /// Index of each point in the caller's input arrays.
    pub ids: &'a [usize],
}

impl CellView<'_> {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// A regular periodic lattice of cells covering `[0, boxsize)^3`.
///
/// All points live in one arena: coordinates and input indices are stored
/// grouped by cell, and `cell_starts[c]..cell_starts[c + 1]` is the range
/// owned by cell `c`. Cells are flattened row-major with x slowest, so
/// `index = ix * ny * nz + iy * nz + iz`.
pub struct CellGrid {
    nmesh: [usize; 3],
    cell_len: [f64; 3],
    boxsize: f64,
    cell_starts: Vec<usize>,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    ids: Vec<usize>,
    z_sorted: bool,
}

impl CellGrid {
    /// Bins `points` into cells at least `search_len[a] / refine[a]` wide.
    ///
    /// Coordinates must already be inside the box; points that round onto
    /// the upper face are clamped into the last cell.
    pub fn build(
        points: &Points,
        pbox: &PeriodicBox,
        search_len: [f64; 3],
        refine: [usize; 3],
        options: GridOptions,
    ) -> Result<Self> {
        let _span = info_span!("CellGrid::build", n_points = points.len()).entered();
        let boxsize = pbox.size();
        let nmesh = grid_shape(boxsize, search_len, refine, options.max_cells_per_dim);
        let cell_len = nmesh.map(|n| boxsize / n as f64);
        let grid_scale = nmesh.map(|n| n as f64 / boxsize);
        let ncells = nmesh[0] * nmesh[1] * nmesh[2];
        let n_points = points.len();
        debug!(?nmesh, ?cell_len, ncells, "grid shape");

        // 1. Cell of every point
        let mut cell_of = Vec::new();
        cell_of
            .try_reserve_exact(n_points)
            .map_err(WpError::allocation("cell assignments"))?;
        for i in 0..n_points {
            let pos = points.get(i);
            let idx = [0, 1, 2].map(|a| axis_cell(pos[a], grid_scale[a], nmesh[a]));
            cell_of.push(flat_index(nmesh, idx));
        }

        // 2. Cell occupancy and offsets
        let mut cell_starts = filled_vec(ncells + 1, 0_usize, "cell offsets")?;
        for &c in &cell_of {
            cell_starts[c + 1] += 1;
        }
        for c in 0..ncells {
            cell_starts[c + 1] += cell_starts[c];
        }

        // 3. Input indices grouped by cell, in input order
        let mut fill = filled_vec(ncells, 0_usize, "cell cursors")?;
        fill.copy_from_slice(&cell_starts[..ncells]);
        let mut ids = filled_vec(n_points, 0_usize, "point indices")?;
        for (i, &c) in cell_of.iter().enumerate() {
            ids[fill[c]] = i;
            fill[c] += 1;
        }
        drop(fill);
        drop(cell_of);

        // 4. Optional (z, index) ordering inside each cell
        if options.sort_on_z {
            let z = points.z();
            let mut segments = Vec::with_capacity(ncells);
            let mut rest = ids.as_mut_slice();
            for w in cell_starts.windows(2) {
                let (segment, tail) = std::mem::take(&mut rest).split_at_mut(w[1] - w[0]);
                segments.push(segment);
                rest = tail;
            }
            let by_z = |a: &usize, b: &usize| z[*a].total_cmp(&z[*b]).then(a.cmp(b));
            if options.parallel {
                segments.into_par_iter().for_each(|segment| segment.sort_unstable_by(by_z));
            } else {
                segments.into_iter().for_each(|segment| segment.sort_unstable_by(by_z));
            }
        }

        // 5. Gather coordinates into the arena
        let x = gather(&ids, points.x(), "x coordinates")?;
        let y = gather(&ids, points.y(), "y coordinates")?;
        let z = gather(&ids, points.z(), "z coordinates")?;

        Ok(Self {
            nmesh,
            cell_len,
            boxsize,
            cell_starts,
            x,
            y,
            z,
            ids,
            z_sorted: options.sort_on_z,
        })
    }

    /// Number of cells along x, y and z.
    pub fn nmesh(&self) -> [usize; 3] {
        self.nmesh
    }

    /// Edge length of a cell along x, y and z.
    pub fn cell_len(&self) -> [f64; 3] {
        self.cell_len
    }

    pub fn boxsize(&self) -> f64 {
        self.boxsize
    }

    pub fn ncells(&self) -> usize {
        self.cell_starts.len() - 1
    }

    pub fn npoints(&self) -> usize {
        self.ids.len()
    }

    /// Whether every cell is ordered by ascending z.
    pub fn is_z_sorted(&self) -> bool {
        self.z_sorted
    }

    pub fn flat_index(&self, idx: [usize; 3]) -> usize {
        flat_index(self.nmesh, idx)
    }

    /// Inverse of [`CellGrid::flat_index`].
    pub fn unflatten(&self, index: usize) -> [usize; 3] {
        let [_, ny, nz] = self.nmesh;
        let iz = index % nz;
        let iy = (index / nz) % ny;
        let ix = index / (ny * nz);
        debug_assert_eq!(self.flat_index([ix, iy, iz]), index, "index reconstruction is wrong");
        [ix, iy, iz]
    }

    pub fn cell(&self, index: usize) -> CellView<'_> {
        debug_assert!(index < self.ncells(), "cell {} out of range", index);
        let range = self.cell_starts[index]..self.cell_starts[index + 1];
        CellView {
            x: &self.x[range.clone()],
            y: &self.y[range.clone()],
            z: &self.z[range.clone()],
            ids: &self.ids[range],
        }
    }

    /// True when a window of `±refine` cells along `axis` would reach the
    /// same cell through both sides of the box.
    pub fn wraps_onto_itself(&self, axis: Axis, refine: usize) -> bool {
        self.nmesh[axis.index()] < 2 * refine + 1
    }
}

/// Number of cells along each axis: as many as fit while keeping every cell
/// at least `search_len / refine` wide, clamped to `[1, max_cells_per_dim]`.
pub fn grid_shape(
    boxsize: f64,
    search_len: [f64; 3],
    refine: [usize; 3],
    max_cells_per_dim: usize,
) -> [usize; 3] {
    [0, 1, 2].map(|a| {
        // float to int casts saturate, so a tiny search radius cannot overflow
        let n = (boxsize * refine[a] as f64 / search_len[a]).floor() as usize;
        n.clamp(1, max_cells_per_dim.max(1))
    })
}

#[inline]
fn flat_index(nmesh: [usize; 3], [ix, iy, iz]: [usize; 3]) -> usize {
    debug_assert!(ix < nmesh[0] && iy < nmesh[1] && iz < nmesh[2]);
    ix * nmesh[1] * nmesh[2] + iy * nmesh[2] + iz
}

#[inline]
fn axis_cell(coord: f64, grid_scale: f64, n: usize) -> usize {
    ((coord * grid_scale) as usize).min(n - 1)
}

fn filled_vec<T: Clone>(len: usize, value: T, what: &'static str) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(WpError::allocation(what))?;
    v.resize(len, value);
    Ok(v)
}

fn gather(ids: &[usize], source: &[f64], what: &'static str) -> Result<Vec<f64>> {
    let mut v = Vec::new();
    v.try_reserve_exact(ids.len()).map_err(WpError::allocation(what))?;
    v.extend(ids.iter().map(|&i| source[i]));
    Ok(v)
}

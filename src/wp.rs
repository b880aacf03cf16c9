use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::accumulator::{BinAccumulator, WpResults};
use crate::bins::RpBins;
use crate::bounds::{Axis, PeriodicBox};
use crate::config::{KernelChoice, WpConfig};
use crate::error::{Result, WpError};
use crate::grid::{CellGrid, GridOptions, grid_shape};
use crate::kernel::{PairContext, PairKernel, ScalarKernel, SimdKernel};
use crate::neighbors::NeighborWindow;
use crate::points::Points;

/// Counts pairs of `points` in a periodic cube of side `boxsize`, binned in
/// projected separation `rp` by `rp_edges` and restricted to line-of-sight
/// separations `|dz| < pimax`.
///
/// Every unordered pair of distinct points is counted at most once, using
/// the minimum-image separation. All inputs are checked before anything is
/// allocated; a call either returns complete counts or an error.
///
/// ```
/// use wpgrid::{Points, WpConfig, count_pairs_wp};
///
/// let x = [1.0, 2.0];
/// let y = [1.0, 1.0];
/// let z = [1.0, 1.5];
/// let points = Points::new(&x, &y, &z).unwrap();
/// let results = count_pairs_wp(&points, 10.0, 2.0, &[0.5, 1.5, 3.0], &WpConfig::default()).unwrap();
/// assert_eq!(results.npairs, vec![0, 1, 0]);
/// ```
pub fn count_pairs_wp(
    points: &Points,
    boxsize: f64,
    pimax: f64,
    rp_edges: &[f64],
    config: &WpConfig,
) -> Result<WpResults> {
    config.validate()?;
    let pbox = PeriodicBox::new(boxsize)?;
    if !(pimax.is_finite() && pimax > 0.0) {
        return Err(WpError::InvalidPimax(pimax));
    }
    let bins = RpBins::new(rp_edges)?;
    points.check_inside(&pbox)?;

    let _span = info_span!("count_pairs_wp", n_points = points.len(), nbin = bins.nbin()).entered();

    let refine = config.refine_factors(bins.rpmax(), pimax);
    let search_len = [bins.rpmax(), bins.rpmax(), pimax];
    let nmesh = grid_shape(boxsize, search_len, refine, config.max_cells_per_dim);
    debug!(?refine, ?nmesh, "refinement factors");

    let coarse = Axis::ALL
        .into_iter()
        .find(|a| nmesh[a.index()] < 2 * refine[a.index()] + 1);
    let min_image = match coarse {
        Some(axis) if config.strict_geometry => {
            return Err(WpError::GridTooCoarse {
                axis,
                cells: nmesh[axis.index()],
                required: 2 * refine[axis.index()] + 1,
            });
        }
        Some(axis) => {
            warn!(
                %axis,
                cells = nmesh[axis.index()],
                "grid too coarse for a forward search, using minimum-image pairs"
            );
            true
        }
        None => false,
    };

    match config.num_threads {
        Some(n) if n > 1 => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            debug!(threads = n, "dedicated worker pool");
            pool.install(|| run(points, &pbox, &bins, pimax, refine, min_image, config, true))
        }
        Some(_) => run(points, &pbox, &bins, pimax, refine, min_image, config, false),
        None => run(points, &pbox, &bins, pimax, refine, min_image, config, true),
    }
}

#[allow(clippy::too_many_arguments)]
fn run(
    points: &Points,
    pbox: &PeriodicBox,
    bins: &RpBins,
    pimax: f64,
    refine: [usize; 3],
    min_image: bool,
    config: &WpConfig,
    parallel: bool,
) -> Result<WpResults> {
    let search_len = [bins.rpmax(), bins.rpmax(), pimax];
    let options = GridOptions {
        max_cells_per_dim: config.max_cells_per_dim,
        sort_on_z: config.sort_on_z,
        parallel,
    };
    let grid = CellGrid::build(points, pbox, search_len, refine, options)?;
    debug_assert_eq!(
        Axis::ALL.iter().any(|&a| grid.wraps_onto_itself(a, refine[a.index()])),
        min_image,
        "grid shape disagrees with the geometry check"
    );

    let window = if min_image {
        NeighborWindow::symmetric(refine)
    } else {
        NeighborWindow::forward(refine)
    };
    let mut ctx = PairContext::new(bins, pimax, grid.is_z_sorted());
    if min_image {
        ctx = ctx.with_min_image(pbox.half());
    }

    let acc = match config.kernel {
        KernelChoice::Scalar => count_cells(&ScalarKernel, &grid, &window, &ctx, config.output_rpavg, parallel)?,
        KernelChoice::Simd => count_cells(&SimdKernel, &grid, &window, &ctx, config.output_rpavg, parallel)?,
    };

    let results = acc.into_results(bins.edges());
    info!(total_pairs = results.total_pairs(), "pair counting finished");
    Ok(results)
}

/// Runs `kernel` over every (primary, neighbour) cell pair in `window`.
///
/// Each worker folds into its own accumulator; the partial accumulators are
/// merged once all cells are done.
fn count_cells<K: PairKernel>(
    kernel: &K,
    grid: &CellGrid,
    window: &NeighborWindow,
    ctx: &PairContext,
    with_rpavg: bool,
    parallel: bool,
) -> Result<BinAccumulator> {
    let template = BinAccumulator::new(ctx.bins.nbin(), with_rpavg)?;
    debug!(
        kernel = kernel.name(),
        ncells = grid.ncells(),
        window = window.len(),
        min_image = ctx.min_image_half.is_some(),
        "counting pairs"
    );

    let visit = |mut acc: BinAccumulator, index: usize| {
        let primary = grid.cell(index);
        if primary.is_empty() {
            return acc;
        }
        for nb in window.neighbors(grid, grid.unflatten(index)) {
            let neighbor = grid.cell(nb.index);
            if !neighbor.is_empty() {
                kernel.count_pairs(ctx, primary, neighbor, nb.offset, &mut acc);
            }
        }
        acc
    };

    let acc = if parallel {
        (0..grid.ncells())
            .into_par_iter()
            .fold(|| template.clone(), visit)
            .reduce(
                || template.clone(),
                |mut a, b| {
                    a.merge(&b);
                    a
                },
            )
    } else {
        (0..grid.ncells()).fold(template, visit)
    };
    Ok(acc)
}

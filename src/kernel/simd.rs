use std::ops::ControlFlow;

use wide::{CmpEq, CmpGe, CmpLt, f64x4};

use super::scalar::scan_range;
use super::{PairContext, PairKernel, PrimaryPoint, ScalarKernel};
use crate::accumulator::BinAccumulator;
use crate::grid::CellView;

/// Neighbour points handled per step.
pub const LANES: usize = 4;

/// Four neighbour points per step, with a scalar tail.
///
/// A group holding any `dz == 0` lane goes through the scalar routine so the
/// index tie-break is applied exactly as in [`ScalarKernel`]. Minimum-image
/// runs delegate to the scalar kernel entirely.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimdKernel;

#[inline(always)]
fn load(values: &[f64], i: usize) -> f64x4 {
    f64x4::from([values[i], values[i + 1], values[i + 2], values[i + 3]])
}

impl PairKernel for SimdKernel {
    fn name(&self) -> &'static str {
        "simd"
    }

    fn count_pairs(
        &self,
        ctx: &PairContext,
        primary: CellView,
        neighbor: CellView,
        offset: [f64; 3],
        acc: &mut BinAccumulator,
    ) {
        if ctx.min_image_half.is_some() {
            ScalarKernel.count_pairs(ctx, primary, neighbor, offset, acc);
            return;
        }

        let bins = ctx.bins;
        let nbin = bins.nbin();
        let edges_sq = bins.edges_sq();
        let n = neighbor.len();
        let with_rpavg = acc.tracks_rpavg();

        let zero = f64x4::ZERO;
        let pimax_v = f64x4::splat(ctx.pimax);
        let rmin_sq_v = f64x4::splat(bins.rmin_sq());
        let rmax_sq_v = f64x4::splat(bins.rmax_sq());

        for k in 0..primary.len() {
            let p = PrimaryPoint::at(primary, k, offset);
            let px = f64x4::splat(p.x);
            let py = f64x4::splat(p.y);
            let pz = f64x4::splat(p.z);

            let mut i = 0;
            let mut stopped = false;
            while i + LANES <= n {
                let dz = load(neighbor.z, i) - pz;
                let m_pimax = dz.cmp_lt(pimax_v);
                if m_pimax.none() {
                    if ctx.z_sorted {
                        stopped = true;
                        break;
                    }
                    i += LANES;
                    continue;
                }
                if dz.cmp_eq(zero).any() {
                    if scan_range::<false>(ctx, &p, neighbor, i..i + LANES, acc).is_break() {
                        stopped = true;
                        break;
                    }
                    i += LANES;
                    continue;
                }

                let dx = load(neighbor.x, i) - px;
                let dy = load(neighbor.y, i) - py;
                let r2 = dx * dx + dy * dy;
                // lanes outside the pimax slab are parked at rmax, outside every bin
                let m_valid = m_pimax & dz.cmp_ge(zero);
                let r2 = m_valid.blend(r2, rmax_sq_v);
                let mut m_left = r2.cmp_lt(rmax_sq_v);
                if (m_left & r2.cmp_ge(rmin_sq_v)).none() {
                    i += LANES;
                    continue;
                }

                let mut lane_bin = zero;
                for kbin in (1..nbin).rev() {
                    let edge_v = f64x4::splat(edges_sq[kbin - 1]);
                    let m_bin = r2.cmp_ge(edge_v) & m_left;
                    let hits = (m_bin.move_mask() as u32).count_ones();
                    if hits > 0 {
                        acc.add_counts(kbin, u64::from(hits));
                        if with_rpavg {
                            lane_bin = m_bin.blend(f64x4::splat(kbin as f64), lane_bin);
                        }
                    }
                    m_left = m_left & r2.cmp_lt(edge_v);
                    if m_left.none() {
                        break;
                    }
                }

                if with_rpavg {
                    let rp = r2.sqrt().to_array();
                    let kb = lane_bin.to_array();
                    for lane in 0..LANES {
                        let kbin = kb[lane] as usize;
                        if kbin > 0 {
                            acc.add_rp(kbin, rp[lane]);
                        }
                    }
                }
                i += LANES;
            }

            if !stopped {
                let _: ControlFlow<()> = scan_range::<false>(ctx, &p, neighbor, i..n, acc);
            }
        }
    }
}

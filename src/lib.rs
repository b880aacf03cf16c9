//! # wpgrid
//!
//! `wpgrid` counts point pairs in a periodic cubic box, binned by their
//! projected separation `rp` (in the x-y plane) and restricted to
//! line-of-sight separations `|dz| < pimax`. These counts are the raw input of
//! the projected two-point correlation function `wp(rp)`.
//!
//! ## Features
//!
//! - **Cell grid**: points are binned into a periodic lattice sized from
//!   `rpmax` and `pimax`, so only nearby cells are ever compared.
//! - **Exactly-once counting**: each unordered pair of distinct points is
//!   counted at most once, at its minimum-image separation.
//! - **Vectorised kernel**: the inner loop runs on `wide::f64x4`, with a scalar
//!   reference kernel that produces identical counts.
//! - **Parallel**: cells are processed with `rayon`, each worker owning its
//!   own counters until a final merge.
//!
//! ## Example
//!
//! ```
//! use wpgrid::{Points, WpConfig, count_pairs_wp};
//!
//! let x = [1.0, 2.0, 8.0];
//! let y = [1.0, 1.0, 8.0];
//! let z = [1.0, 1.5, 8.0];
//! let points = Points::new(&x, &y, &z).unwrap();
//! let config = WpConfig::default().with_rpavg(true);
//!
//! let results = count_pairs_wp(&points, 10.0, 2.0, &[0.5, 1.5, 3.0], &config).unwrap();
//! assert_eq!(results.npairs, vec![0, 1, 0]);
//! for bin in results.bins() {
//!     println!("[{}, {}): {} pairs", bin.rmin, bin.rmax, bin.npairs);
//! }
//! ```
//!
//! ## Main Interface
//!
//! The entry point is [`count_pairs_wp`], configured through [`WpConfig`].

mod accumulator;
mod bins;
mod bounds;
mod config;
mod error;
mod grid;
pub mod kernel;
mod neighbors;
mod points;
mod wp;

pub use accumulator::{BinAccumulator, WpBin, WpResults};
pub use bins::RpBins;
pub use bounds::{Axis, PeriodicBox};
pub use config::{DEFAULT_MAX_CELLS_PER_DIM, KernelChoice, WpConfig};
pub use error::{Result, WpError};
pub use grid::{CellGrid, CellView, GridOptions, grid_shape};
pub use neighbors::{NeighborCell, NeighborWindow};
pub use points::Points;
pub use wp::count_pairs_wp;

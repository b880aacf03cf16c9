use serde::{Deserialize, Serialize};

use crate::error::{Result, WpError};

/// Default cap on the number of cells along one axis.
pub const DEFAULT_MAX_CELLS_PER_DIM: usize = 100;

/// Which pair-binning kernel runs the inner loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelChoice {
    Scalar,
    #[default]
    Simd,
}

/// Knobs for a single `count_pairs_wp` call.
///
/// Every field has a usable default, so `WpConfig::default()` is a valid
/// configuration. Missing fields fall back to the defaults when deserialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WpConfig {
    /// `None` runs on the ambient rayon pool, `Some(1)` runs on the calling
    /// thread and `Some(n)` builds a dedicated pool of `n` workers.
    pub num_threads: Option<usize>,
    /// Cells per `rpmax` along x and y.
    pub rp_refine: Option<usize>,
    /// Cells per `pimax` along z.
    pub z_refine: Option<usize>,
    pub max_cells_per_dim: usize,
    /// Also accumulate the mean projected separation per bin.
    pub output_rpavg: bool,
    pub kernel: KernelChoice,
    /// Sort each cell by z so the kernels can stop at `dz >= pimax`.
    pub sort_on_z: bool,
    /// Refuse grids that are too coarse for the forward neighbour search
    /// instead of switching to the minimum-image path.
    pub strict_geometry: bool,
}

impl Default for WpConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            rp_refine: None,
            z_refine: None,
            max_cells_per_dim: DEFAULT_MAX_CELLS_PER_DIM,
            output_rpavg: false,
            kernel: KernelChoice::default(),
            sort_on_z: true,
            strict_geometry: false,
        }
    }
}

impl WpConfig {
    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    pub fn with_refine(mut self, rp_refine: usize, z_refine: usize) -> Self {
        self.rp_refine = Some(rp_refine);
        self.z_refine = Some(z_refine);
        self
    }

    pub fn with_max_cells_per_dim(mut self, n: usize) -> Self {
        self.max_cells_per_dim = n;
        self
    }

    pub fn with_rpavg(mut self, enabled: bool) -> Self {
        self.output_rpavg = enabled;
        self
    }

    pub fn with_kernel(mut self, kernel: KernelChoice) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_sort_on_z(mut self, enabled: bool) -> Self {
        self.sort_on_z = enabled;
        self
    }

    pub fn with_strict_geometry(mut self, enabled: bool) -> Self {
        self.strict_geometry = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_threads == Some(0) {
            return Err(WpError::InvalidConfig("num_threads must be at least 1".into()));
        }
        if self.rp_refine == Some(0) || self.z_refine == Some(0) {
            return Err(WpError::InvalidConfig("refine factors must be at least 1".into()));
        }
        if self.max_cells_per_dim == 0 {
            return Err(WpError::InvalidConfig("max_cells_per_dim must be at least 1".into()));
        }
        Ok(())
    }

    /// Refinement factors `[x, y, z]` for a search with the given radii.
    ///
    /// Explicit overrides win. Otherwise x and y use 2 cells per `rpmax`, and
    /// z uses 2 cells per `pimax` when `rpmax >= pimax` (1 otherwise). A
    /// single-threaded run always uses `(2, 1)`.
    pub fn refine_factors(&self, rpmax: f64, pimax: f64) -> [usize; 3] {
        let (default_rp, default_z) = if self.num_threads == Some(1) {
            (2, 1)
        } else if rpmax >= pimax {
            (2, 2)
        } else {
            (2, 1)
        };
        let rp = self.rp_refine.unwrap_or(default_rp);
        let z = self.z_refine.unwrap_or(default_z);
        [rp, rp, z]
    }
}

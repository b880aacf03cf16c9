use std::collections::TryReserveError;

use thiserror::Error;

use crate::bounds::Axis;

/// Everything that can go wrong while counting pairs.
///
/// Configuration problems are detected before any grid memory is allocated.
/// Once the grid is built the computation cannot fail, so a call either
/// returns complete counts or one of these errors.
#[derive(Error, Debug)]
pub enum WpError {
    #[error("at least two rp bin edges are required, got {0}")]
    TooFewBinEdges(usize),

    #[error("rp bin edge {index} is not finite ({value})")]
    NonFiniteBinEdge { index: usize, value: f64 },

    #[error("the lowest rp bin edge must be non-negative, got {0}")]
    NegativeBinEdge(f64),

    #[error("rp bin edges must be strictly increasing: edge {index} ({value}) follows {previous}")]
    UnsortedBinEdges { index: usize, value: f64, previous: f64 },

    #[error("rp bin edge {index} ({value}) cannot be resolved once squared ({squared})")]
    UnresolvableBinEdge { index: usize, value: f64, squared: f64 },

    #[error("box size must be positive and finite, got {0}")]
    InvalidBoxSize(f64),

    #[error("pimax must be positive and finite, got {0}")]
    InvalidPimax(f64),

    #[error("coordinate arrays differ in length (x: {x}, y: {y}, z: {z})")]
    LengthMismatch { x: usize, y: usize, z: usize },

    #[error("point {index} has {axis} = {value}, outside of [0, {boxsize})")]
    PointOutsideBox {
        index: usize,
        axis: Axis,
        value: f64,
        boxsize: f64,
    },

    #[error("the {axis} axis has {cells} cells but the periodic neighbour search needs at least {required}")]
    GridTooCoarse {
        axis: Axis,
        cells: usize,
        required: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to allocate {what}")]
    Allocation {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    #[error("failed to build worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, WpError>;

impl WpError {
    pub(crate) fn allocation(what: &'static str) -> impl FnOnce(TryReserveError) -> WpError {
        move |source| WpError::Allocation { what, source }
    }
}

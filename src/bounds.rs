use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WpError};

/// One of the three box axes. z is the line of sight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of the axis in `[x, y, z]` arrays.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// A periodic cube `[0, size)^3`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeriodicBox {
    size: f64,
}

impl PeriodicBox {
    pub fn new(size: f64) -> Result<Self> {
        if !(size.is_finite() && size > 0.0) {
            return Err(WpError::InvalidBoxSize(size));
        }
        Ok(Self { size })
    }

    /// Edge length of the box.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Half the edge length; the largest separation a minimum image can have.
    pub fn half(&self) -> f64 {
        0.5 * self.size
    }

    /// Checks whether a coordinate lies in `[0, size)`.
    pub fn contains(&self, coord: f64) -> bool {
        (0.0..self.size).contains(&coord)
    }
}

use crate::bounds::{Axis, PeriodicBox};
use crate::error::{Result, WpError};

/// Read-only view of a point set stored as three parallel coordinate slices.
#[derive(Clone, Copy, Debug)]
pub struct Points<'a> {
    x: &'a [f64],
    y: &'a [f64],
    z: &'a [f64],
}

impl<'a> Points<'a> {
    /// Wraps the coordinate slices. They must all have the same length.
    pub fn new(x: &'a [f64], y: &'a [f64], z: &'a [f64]) -> Result<Self> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(WpError::LengthMismatch {
                x: x.len(),
                y: y.len(),
                z: z.len(),
            });
        }
        Ok(Self { x, y, z })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &'a [f64] {
        self.x
    }

    pub fn y(&self) -> &'a [f64] {
        self.y
    }

    pub fn z(&self) -> &'a [f64] {
        self.z
    }

    /// The coordinates of point `i`.
    pub fn get(&self, i: usize) -> [f64; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Verifies that every coordinate lies inside `[0, boxsize)`.
    ///
    /// The first offending point is reported.
    pub fn check_inside(&self, pbox: &PeriodicBox) -> Result<()> {
        for i in 0..self.len() {
            let pos = self.get(i);
            for axis in Axis::ALL {
                let value = pos[axis.index()];
                if !pbox.contains(value) {
                    return Err(WpError::PointOutsideBox {
                        index: i,
                        axis,
                        value,
                        boxsize: pbox.size(),
                    });
                }
            }
        }
        Ok(())
    }
}

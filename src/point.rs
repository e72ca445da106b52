use crate::error::Error;
use ordered_float::NotNan;
use std::ops::{Add, Sub};

/// A point in normalized image coordinates.
///
/// Coordinates are `f64`; the model's `f32` output widens to it losslessly.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub(crate) struct Point {
    x: f64,
    y: f64,
}

impl Point {
    pub(crate) fn new(x: f64, y: f64) -> Result<Self, Error> {
        Ok(Self {
            x: NotNan::new(x)
                .map_err(|e| Error::ConstructNotNan(e, x))?
                .into_inner(),
            y: NotNan::new(y)
                .map_err(|e| Error::ConstructNotNan(e, y))?
                .into_inner(),
        })
    }

    #[inline]
    pub(crate) fn x(self) -> f64 {
        self.x
    }

    #[inline]
    pub(crate) fn y(self) -> f64 {
        self.y
    }

    /// The point on the top edge of the image directly above `self`.
    #[inline]
    pub(crate) fn above(self) -> Self {
        Self { x: self.x, y: 0.0 }
    }

    /// Polar angle of `self` treated as a vector, in radians.
    #[inline]
    pub(crate) fn atan2(self) -> f64 {
        self.y.atan2(self.x)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

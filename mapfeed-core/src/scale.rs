//! Fixed-point coordinate scaling.
//!
//! Coordinates are stored as integers multiplied by a scale factor. One
//! scale applies to every coordinate column of a deployment, so it is passed
//! around as configuration instead of living in global state.

use std::num::NonZeroU32;

use geo::{Coord, Rect};
use thiserror::Error;

/// Scale used by the reference database schema (seven decimal places).
pub const DEFAULT_SCALE: u32 = 10_000_000;

const DEFAULT_FACTOR: NonZeroU32 = match NonZeroU32::new(DEFAULT_SCALE) {
    Some(factor) => factor,
    None => NonZeroU32::MIN,
};

/// Errors returned by [`CoordinateScale::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScaleError {
    /// A zero scale would divide by zero.
    #[error("coordinate scale must be greater than zero")]
    Zero,
}

/// Divisor turning stored integers into degrees.
///
/// # Examples
/// ```
/// use mapfeed_core::CoordinateScale;
///
/// # fn main() -> Result<(), mapfeed_core::ScaleError> {
/// let scale = CoordinateScale::new(100)?;
/// assert_eq!(scale.degrees(-12_345), -123.45);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateScale(NonZeroU32);

impl CoordinateScale {
    /// Validate and construct a scale.
    pub fn new(factor: u32) -> Result<Self, ScaleError> {
        NonZeroU32::new(factor).map(Self).ok_or(ScaleError::Zero)
    }

    /// The raw scale factor.
    pub const fn factor(self) -> u32 {
        self.0.get()
    }

    /// Convert a scaled integer to degrees.
    pub fn degrees(self, raw: i64) -> f64 {
        raw as f64 / f64::from(self.0.get())
    }

    /// Convert a scaled longitude/latitude pair to a coordinate.
    pub fn coord(self, lon: i64, lat: i64) -> Coord<f64> {
        Coord {
            x: self.degrees(lon),
            y: self.degrees(lat),
        }
    }

    /// Convert scaled bounds to a rectangle.
    pub fn rect(self, min_lon: i64, min_lat: i64, max_lon: i64, max_lat: i64) -> Rect<f64> {
        Rect::new(self.coord(min_lon, min_lat), self.coord(max_lon, max_lat))
    }
}

impl Default for CoordinateScale {
    fn default() -> Self {
        Self(DEFAULT_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_matches_reference_schema() {
        assert_eq!(CoordinateScale::default().factor(), DEFAULT_SCALE);
    }

    #[test]
    fn zero_scale_is_rejected() {
        assert_eq!(CoordinateScale::new(0), Err(ScaleError::Zero));
    }

    #[rstest]
    #[case(515_000_000, 51.5)]
    #[case(-1_234_567, -0.1234567)]
    #[case(0, 0.0)]
    fn degrees_divide_by_scale(#[case] raw: i64, #[case] expected: f64) {
        let delta = (CoordinateScale::default().degrees(raw) - expected).abs();
        assert!(delta < 1.0e-12, "expected {expected}, got delta {delta}");
    }

    #[test]
    fn rect_normalises_corners() {
        let rect = CoordinateScale::new(10)
            .expect("non-zero scale")
            .rect(20, 10, -20, -10);
        assert_eq!(rect.min(), Coord { x: -2.0, y: -1.0 });
        assert_eq!(rect.max(), Coord { x: 2.0, y: 1.0 });
    }
}

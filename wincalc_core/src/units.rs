//! # Unit Types
//!
//! Type-safe wrappers for the units that appear in window pricing. These are
//! plain f64 newtypes so JSON stays clean (just numbers).
//!
//! ## Conventions
//!
//! - Window dimensions and frame face widths are entered in millimeters
//! - All geometry is converted to meters before any area or heat-transfer math
//! - Prices, subsidies and savings are whole currency units after rounding
//!
//! ## Example
//!
//! ```rust
//! use wincalc_core::units::{Meters, Millimeters};
//!
//! let width = Millimeters(1200.0);
//! let width_m: Meters = width.into();
//! assert_eq!(width_m.0, 1.2);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMeters(pub f64);

impl Mul for Meters {
    type Output = SquareMeters;
    fn mul(self, rhs: Meters) -> SquareMeters {
        SquareMeters(self.0 * rhs.0)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }

            /// Multiply by a scalar
            pub fn scale(self, factor: f64) -> Self {
                Self(self.0 * factor)
            }
        }
    };
}

impl_arithmetic!(Millimeters);
impl_arithmetic!(Meters);
impl_arithmetic!(SquareMeters);

// ============================================================================
// Rounding
// ============================================================================

/// Round to the nearest integer, with halves going toward positive infinity.
///
/// `f64::round` sends -2.5 to -3.0; quotes and savings round -2.5 to -2.0.
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    // `value + 0.5` would carry 0.49999999999999994 over to 1.0
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Round to a fixed number of decimal places using [`round_half_up`].
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    round_half_up(value * factor) / factor
}

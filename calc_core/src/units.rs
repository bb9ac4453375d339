//! # Unit Types
//!
//! Type-safe wrappers for the units used by the verifiers. They stay plain
//! `f64` newtypes so that JSON stays clean (just numbers).
//!
//! ## SI Units
//!
//! The engine works in the mixed unit set common in Brazilian design offices:
//! - Length: centimeters for section geometry, meters for stations along the
//!   beam, millimeters for bar diameters and crack widths
//! - Force: kilonewtons (kN)
//! - Moment: kilonewton-meters (kN·m) at the boundary, kilonewton-centimeters
//!   (kN·cm) inside section formulas
//! - Stress: megapascals (MPa) at the boundary, kN/cm² inside section formulas
//!
//! ## Example
//!
//! ```rust
//! use calc_core::units::{KnCm, KnM, KnPerCm2, Mpa};
//!
//! let md = KnM(200.0);
//! let md_kncm: KnCm = md.into();
//! assert_eq!(md_kncm.0, 20000.0);
//!
//! let fcd: KnPerCm2 = Mpa(21.0).into();
//! assert!((fcd.0 - 2.1).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Length Units
// ============================================================================

/// Length in meters (stations along the beam axis)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in centimeters (section geometry)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(pub f64);

/// Length in millimeters (bar diameters, crack widths)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

impl From<Meters> for Centimeters {
    fn from(m: Meters) -> Self {
        Centimeters(m.0 * 100.0)
    }
}

impl From<Centimeters> for Meters {
    fn from(cm: Centimeters) -> Self {
        Meters(cm.0 / 100.0)
    }
}

impl From<Millimeters> for Centimeters {
    fn from(mm: Millimeters) -> Self {
        Centimeters(mm.0 / 10.0)
    }
}

impl From<Centimeters> for Millimeters {
    fn from(cm: Centimeters) -> Self {
        Millimeters(cm.0 * 10.0)
    }
}

// ============================================================================
// Force and Moment Units
// ============================================================================

/// Force in kilonewtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloNewtons(pub f64);

/// Moment in kilonewton-meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnM(pub f64);

/// Moment in kilonewton-centimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnCm(pub f64);

impl From<KnM> for KnCm {
    fn from(m: KnM) -> Self {
        KnCm(m.0 * 100.0)
    }
}

impl From<KnCm> for KnM {
    fn from(m: KnCm) -> Self {
        KnM(m.0 / 100.0)
    }
}

// ============================================================================
// Stress Units
// ============================================================================

/// Stress in megapascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mpa(pub f64);

/// Stress in kilonewtons per square centimeter (1 kN/cm² = 10 MPa)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnPerCm2(pub f64);

impl From<Mpa> for KnPerCm2 {
    fn from(s: Mpa) -> Self {
        KnPerCm2(s.0 / 10.0)
    }
}

impl From<KnPerCm2> for Mpa {
    fn from(s: KnPerCm2) -> Self {
        Mpa(s.0 * 10.0)
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

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
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
        }
    };
}

impl_arithmetic!(Meters);
impl_arithmetic!(Centimeters);
impl_arithmetic!(Millimeters);
impl_arithmetic!(KiloNewtons);
impl_arithmetic!(KnM);
impl_arithmetic!(KnCm);
impl_arithmetic!(Mpa);
impl_arithmetic!(KnPerCm2);

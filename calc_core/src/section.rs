//! # Rectangular Section
//!
//! Geometry and provided reinforcement of a rectangular beam cross-section.
//! All lengths are in centimeters except bar diameters (millimeters).
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "bw_cm": 30.0,
//!   "h_cm": 60.0,
//!   "d_cm": 55.0,
//!   "c_nom_cm": 3.0,
//!   "d_prime_cm": 5.0
//! }
//! ```
//!
//! `d_cm` may be omitted: it then defaults to `h − 5`, or is derived from the
//! detailing with [`SectionGeometry::with_detailed_depth`].

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::errors::{ensure_non_negative, ensure_positive, CalcError, CalcResult};
use crate::materials::BarType;
use crate::units::{Centimeters, Millimeters};

/// Offset used for the effective depth when none is given (cm)
pub const DEFAULT_DEPTH_OFFSET_CM: f64 = 5.0;

fn default_cover() -> f64 {
    3.0
}

fn default_d_prime() -> f64 {
    5.0
}

/// Rectangular section dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionGeometry {
    /// Web width (cm)
    pub bw_cm: f64,
    /// Total height (cm)
    pub h_cm: f64,
    /// Effective depth to the tension steel centroid (cm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d_cm: Option<f64>,
    /// Nominal cover (cm)
    #[serde(default = "default_cover")]
    pub c_nom_cm: f64,
    /// Depth of the compression steel centroid (cm)
    #[serde(default = "default_d_prime")]
    pub d_prime_cm: f64,
}

impl SectionGeometry {
    /// Build and validate a section. `d_cm = None` means `h − 5`.
    pub fn new(bw_cm: f64, h_cm: f64, d_cm: Option<f64>, c_nom_cm: f64, d_prime_cm: f64) -> CalcResult<Self> {
        let geometry = SectionGeometry {
            bw_cm,
            h_cm,
            d_cm,
            c_nom_cm,
            d_prime_cm,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Shorthand for the common case of an explicit effective depth
    pub fn rectangular(bw_cm: f64, h_cm: f64, d_cm: f64) -> CalcResult<Self> {
        Self::new(bw_cm, h_cm, Some(d_cm), default_cover(), default_d_prime())
    }

    /// Validate dimensions: finite and positive, with `0 < d < h`.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("bw_cm", self.bw_cm)?;
        ensure_positive("h_cm", self.h_cm)?;
        ensure_non_negative("c_nom_cm", self.c_nom_cm)?;
        ensure_positive("d_prime_cm", self.d_prime_cm)?;

        let d = self.d();
        if !(d.is_finite() && d > 0.0 && d < self.h_cm) {
            return Err(CalcError::invalid_input(
                "d_cm",
                d.to_string(),
                format!("Effective depth must satisfy 0 < d < h = {}", self.h_cm),
            ));
        }
        if self.d_prime_cm >= d {
            return Err(CalcError::invalid_input(
                "d_prime_cm",
                self.d_prime_cm.to_string(),
                "Compression steel must lie above the tension steel",
            ));
        }
        Ok(())
    }

    /// Effective depth (cm)
    pub fn d(&self) -> f64 {
        self.d_cm.unwrap_or(self.h_cm - DEFAULT_DEPTH_OFFSET_CM)
    }

    pub fn effective_depth(&self) -> Centimeters {
        Centimeters(self.d())
    }

    /// Fill in a missing effective depth from cover and bar sizes.
    pub fn with_detailed_depth(mut self, layout: &ReinforcementLayout) -> CalcResult<Self> {
        if self.d_cm.is_none() {
            self.d_cm = Some(layout.effective_depth_cm(self.h_cm, self.c_nom_cm));
        }
        self.validate()?;
        Ok(self)
    }

    /// Gross area (cm²)
    pub fn area_cm2(&self) -> f64 {
        self.bw_cm * self.h_cm
    }

    /// Gross moment of inertia `bw·h³/12` (cm⁴)
    pub fn gross_inertia_cm4(&self) -> f64 {
        self.bw_cm * self.h_cm.powi(3) / 12.0
    }

    /// Distance from centroid to extreme tension fiber (cm)
    pub fn yt_cm(&self) -> f64 {
        self.h_cm / 2.0
    }

    /// Elastic section modulus `bw·h²/6` (cm³)
    pub fn section_modulus_cm3(&self) -> f64 {
        self.bw_cm * self.h_cm.powi(2) / 6.0
    }
}

fn default_bar_diameter() -> f64 {
    20.0
}
fn default_stirrup_diameter() -> f64 {
    8.0
}
fn default_stirrup_spacing() -> f64 {
    15.0
}
fn default_stirrup_legs() -> u32 {
    2
}

/// Bars actually placed in the section.
///
/// ## JSON Example
///
/// ```json
/// { "bar_count": 4, "bar_diameter_mm": 20.0, "stirrup_diameter_mm": 8.0,
///   "stirrup_spacing_cm": 15.0, "stirrup_legs": 2 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReinforcementLayout {
    /// Number of longitudinal tension bars
    pub bar_count: u32,
    #[serde(default = "default_bar_diameter")]
    pub bar_diameter_mm: f64,
    #[serde(default = "default_stirrup_diameter")]
    pub stirrup_diameter_mm: f64,
    #[serde(default = "default_stirrup_spacing")]
    pub stirrup_spacing_cm: f64,
    #[serde(default = "default_stirrup_legs")]
    pub stirrup_legs: u32,
    /// Compression steel area (cm²), zero when absent
    #[serde(default)]
    pub compression_area_cm2: f64,
    /// Shape of the tension bars for the fatigue table
    #[serde(default)]
    pub bar_type: BarType,
}

impl Default for ReinforcementLayout {
    fn default() -> Self {
        ReinforcementLayout {
            bar_count: 4,
            bar_diameter_mm: default_bar_diameter(),
            stirrup_diameter_mm: default_stirrup_diameter(),
            stirrup_spacing_cm: default_stirrup_spacing(),
            stirrup_legs: default_stirrup_legs(),
            compression_area_cm2: 0.0,
            bar_type: BarType::Straight,
        }
    }
}

/// Area of one bar of diameter `phi` (cm²)
pub fn bar_area_cm2(phi: Millimeters) -> f64 {
    let r = Centimeters::from(phi).0 / 2.0;
    PI * r * r
}

impl ReinforcementLayout {
    pub fn validate(&self) -> CalcResult<()> {
        if self.bar_count == 0 {
            return Err(CalcError::invalid_input("bar_count", "0", "At least one tension bar is required"));
        }
        if self.stirrup_legs == 0 {
            return Err(CalcError::invalid_input("stirrup_legs", "0", "Stirrups need at least one leg"));
        }
        ensure_positive("bar_diameter_mm", self.bar_diameter_mm)?;
        ensure_positive("stirrup_diameter_mm", self.stirrup_diameter_mm)?;
        ensure_positive("stirrup_spacing_cm", self.stirrup_spacing_cm)?;
        ensure_non_negative("compression_area_cm2", self.compression_area_cm2)?;
        Ok(())
    }

    /// `n·π·(φ/20)²` (cm²)
    pub fn tension_area_cm2(&self) -> f64 {
        self.bar_count as f64 * bar_area_cm2(Millimeters(self.bar_diameter_mm))
    }

    /// Stirrup area per meter of beam `legs·π·(φt/20)²/s·100` (cm²/m)
    pub fn stirrup_area_per_m(&self) -> f64 {
        self.stirrup_legs as f64 * bar_area_cm2(Millimeters(self.stirrup_diameter_mm)) / self.stirrup_spacing_cm
            * 100.0
    }

    /// `d = h − c − φt − φ/2` (cm)
    pub fn effective_depth_cm(&self, h_cm: f64, c_nom_cm: f64) -> f64 {
        let phi_t = Centimeters::from(Millimeters(self.stirrup_diameter_mm)).0;
        let phi = Centimeters::from(Millimeters(self.bar_diameter_mm)).0;
        h_cm - c_nom_cm - phi_t - phi / 2.0
    }
}

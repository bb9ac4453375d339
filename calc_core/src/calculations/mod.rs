//! # Section Verifications
//!
//! This module contains the limit-state verifiers. Each verifier follows the
//! pattern:
//!
//! - a constructor taking a snapshot of geometry, materials and
//!   reinforcement, returning `CalcResult<Self>` (invalid numbers are errors)
//! - query methods returning JSON-serializable result records that carry a
//!   [`CheckStatus`]; structural outcomes never become errors
//!
//! The two pipelines at the bottom compose the verifiers:
//!
//! - [`section_check`] - every check for one section under explicit forces
//! - [`beam_check`] - load envelopes → critical sections → checks + deflection
//!
//! ## Available Verifiers
//!
//! - [`flexure`] - ULS bending, rectangular stress block
//! - [`shear`] - Model I truss, stirrup fatigue, moment shift
//! - [`fatigue`] - Stage II stress ranges in the longitudinal steel and concrete
//! - [`serviceability`] - crack width, Branson stiffness, creep, deflection
//! - [`curvature`] - double integration of curvature over one span

pub mod beam_check;
pub mod curvature;
pub mod fatigue;
pub mod flexure;
pub mod section_check;
pub mod serviceability;
pub mod shear;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CalcResult;

// Re-export commonly used types
pub use beam_check::{BeamCheckInput, BeamCheckResult};
pub use curvature::{CurvatureIntegrator, DeflectionProfile};
pub use fatigue::FatigueChecker;
pub use flexure::FlexuralDesigner;
pub use section_check::{SectionCheckInput, SectionCheckResult};
pub use serviceability::{ServiceabilityChecker, ServiceabilityOptions};
pub use shear::ShearDesigner;

/// Outcome of a single verification.
///
/// - `Ok`: model applicable and check satisfied
/// - `Warning`: valid but suboptimal (e.g. ductility limit exceeded)
/// - `Fail`: model applicable, check not satisfied
/// - `Error`: the model itself does not apply (e.g. no stress-block solution)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Ok,
    Warning,
    Fail,
    Error,
}

impl CheckStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, CheckStatus::Ok)
    }

    /// Whether the section may be built as detailed (`Ok` or `Warning`)
    pub fn is_acceptable(&self) -> bool {
        matches!(self, CheckStatus::Ok | CheckStatus::Warning)
    }

    /// Most severe of two statuses
    pub fn worst(self, other: CheckStatus) -> CheckStatus {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    fn severity(&self) -> u8 {
        match self {
            CheckStatus::Ok => 0,
            CheckStatus::Warning => 1,
            CheckStatus::Fail => 2,
            CheckStatus::Error => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "OK",
            CheckStatus::Warning => "WARNING",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Common view of every verifier result record.
pub trait CheckOutcome {
    fn status(&self) -> CheckStatus;

    /// Demand over capacity in percent, when the check defines one
    fn utilization_pct(&self) -> Option<f64>;

    fn message(&self) -> &str;

    fn passes(&self) -> bool {
        self.status().is_ok()
    }
}

/// Enum wrapper for every calculation a project can hold.
///
/// This allows storing heterogeneous calculations in a single collection
/// while maintaining type safety and clean serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationItem {
    /// Full beam verification from load envelopes
    Beam(BeamCheckInput),
    /// One section under explicit forces
    Section(SectionCheckInput),
}

impl CalculationItem {
    /// Get the user-provided label for this calculation
    pub fn label(&self) -> &str {
        match self {
            CalculationItem::Beam(b) => &b.label,
            CalculationItem::Section(s) => &s.label,
        }
    }

    /// Get the calculation type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationItem::Beam(_) => "Beam",
            CalculationItem::Section(_) => "Section",
        }
    }

    /// Run the verification this item describes
    pub fn calculate(&self) -> CalcResult<CalculationOutput> {
        match self {
            CalculationItem::Beam(input) => beam_check::calculate(input).map(CalculationOutput::Beam),
            CalculationItem::Section(input) => section_check::calculate(input).map(CalculationOutput::Section),
        }
    }
}

/// Result of [`CalculationItem::calculate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationOutput {
    Beam(BeamCheckResult),
    Section(SectionCheckResult),
}

impl CalculationOutput {
    pub fn label(&self) -> &str {
        match self {
            CalculationOutput::Beam(r) => &r.label,
            CalculationOutput::Section(r) => &r.label,
        }
    }

    pub fn status(&self) -> CheckStatus {
        match self {
            CalculationOutput::Beam(r) => r.status,
            CalculationOutput::Section(r) => r.status,
        }
    }

    pub fn all_ok(&self) -> bool {
        match self {
            CalculationOutput::Beam(r) => r.all_ok,
            CalculationOutput::Section(r) => r.section_ok,
        }
    }
}

//! # calc_core - Reinforced-Concrete Beam Verification Engine
//!
//! `calc_core` checks reinforced-concrete rail beams under NBR 6118. It
//! takes the load diagrams of a frame analysis (self-weight, rail and the
//! moving-load envelope), builds the ultimate, fatigue and service
//! combinations, locates the governing sections and verifies each of them
//! for bending, shear, fatigue, crack width and deflection. Inputs and
//! results are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: verifiers are pure functions of their inputs
//! - **JSON-First**: all inputs and results implement Serialize/Deserialize
//! - **Rich Errors**: bad input is a [`CalcError`]; a failed check is a
//!   [`CheckStatus`](calculations::CheckStatus), never an error
//!
//! ## Quick Start
//!
//! ```rust
//! use calc_core::calculations::beam_check::{calculate, BeamCheckInput};
//!
//! let input = BeamCheckInput::sample().unwrap();
//! let result = calculate(&input).unwrap();
//!
//! for verification in &result.sections {
//!     println!("{}: {}", verification.section.label, verification.result.status);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`project`] - Project container, metadata and settings
//! - [`calculations`] - Section verifiers and the beam/section pipelines
//! - [`loads`] - Load cases, combinations and critical sections
//! - [`materials`] - Concrete and reinforcing steel
//! - [`section`] - Cross-section geometry and reinforcement layout
//! - [`units`] - Unit conversions and type-safe wrappers
//! - [`errors`] - Structured error types
//! - [`file_io`] - `.rcp` files with atomic saves and locking

pub mod calculations;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod loads;
pub mod materials;
pub mod project;
pub mod section;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{CalculationItem, CalculationOutput, CheckStatus};
pub use errors::{CalcError, CalcResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_project, save_project, FileLock};
pub use project::{GlobalSettings, Project, ProjectMetadata};

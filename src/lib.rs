//! Linear SVM training through mixed-integer/quadratic optimization
//!
//! Training is formulated as an optimization model (weights, offset,
//! slacks, optional binary side variables) handed to the SCIP solver;
//! the best found solution is extracted into a plain linear decision
//! function.

pub mod api;
pub mod core;
pub mod data;
pub mod formulation;
pub mod persistence;
pub mod solver;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{EvaluationMetrics, MipSvm};
pub use crate::core::{
    DenseDataset, LinearDecision, ModelVariant, Result, SolveOutcome, SvmConfig, SvmError,
};
pub use crate::data::CsvDataset;
pub use crate::solver::{ScipSession, SolverBackend};
pub use crate::utils::scaling::StandardScaler;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

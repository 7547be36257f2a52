//! Optimization model construction
//!
//! Translates a labeled dataset and a model variant into variables, an
//! objective and constraints on a solving session. The pipeline order is
//! fixed: [`ProblemVariables::declare`] first, then
//! [`objective::add_objective`], then [`ModelVariant::add_constraints`];
//! the types make it impossible to add constraints before variables exist.

pub mod constraints;
pub mod objective;
pub mod variables;

pub use self::constraints::{big_m, RAMP_CEILING};
pub use self::objective::add_objective;
pub use self::variables::ProblemVariables;

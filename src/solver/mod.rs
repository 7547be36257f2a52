//! Solver session abstraction and the SCIP-backed implementation
//!
//! The optimization engine is an external collaborator: the formulation
//! layer only ever talks to the narrow [`SolverBackend`] surface below and
//! never inspects solver internals. One backend instance is one solving
//! session, scoped to a single training call.

pub mod scip;

pub use self::scip::ScipSession;

use crate::core::{Result, SolveOutcome};

/// Handle to a variable registered with a solving session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in the session's registration order
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Variable domain kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Continuous,
    Binary,
}

/// Best assignment found by a solve, if any
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Terminal state the solver reported
    pub outcome: SolveOutcome,
    /// Variable values in registration order, present when an incumbent exists
    pub values: Option<Vec<f64>>,
}

impl SolveResult {
    /// Value of `var` in the best solution, if one exists
    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.as_ref().map(|vals| vals[var.index()])
    }
}

/// One solving session of the external mixed-integer/quadratic engine
///
/// Constraints are given in interval form `lhs <= expr <= rhs`; one-sided
/// constraints pass `f64::NEG_INFINITY` or `f64::INFINITY` for the free
/// side. The objective is always minimization of the linear objective
/// coefficients attached at variable creation. `solve` consumes the
/// session, so no solver state can outlive a training call.
pub trait SolverBackend {
    /// Register a variable and return its handle
    fn add_var(&mut self, kind: VarKind, lb: f64, ub: f64, obj_coef: f64, name: &str) -> VarId;

    /// Add a linear constraint `lhs <= sum(coef * var) <= rhs`
    fn add_linear(&mut self, terms: &[(VarId, f64)], lhs: f64, rhs: f64, name: &str);

    /// Add a constraint with quadratic terms:
    /// `lhs <= sum(coef * var1 * var2) + sum(coef * var) <= rhs`
    fn add_quadratic(
        &mut self,
        quad_terms: &[(VarId, VarId, f64)],
        lin_terms: &[(VarId, f64)],
        lhs: f64,
        rhs: f64,
        name: &str,
    );

    /// Run the solve and report the best found assignment
    fn solve(self) -> Result<SolveResult>;
}

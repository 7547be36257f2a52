//! Objective formulation
//!
//! The training objective `sum(w_i^2) + C * sum(classWeight_j * xi_j)` is
//! quadratic, but the solver objective stays linear: a single auxiliary
//! variable is minimized and a quadratic constraint keeps it above the
//! true objective expression. Minimization presses the auxiliary variable
//! down onto the expression, so the one-sided bound is exact at
//! optimality.

use crate::core::{DenseDataset, Result, SvmConfig, SvmError};
use crate::formulation::constraints::RAMP_CEILING;
use crate::formulation::variables::ProblemVariables;
use crate::solver::{SolverBackend, VarKind};

/// Add the auxiliary objective variable and its defining constraint
///
/// Must be called exactly once per training run, after variable
/// declaration; a second call is a formulation error. For the ramp-loss
/// variant the penalty sum reads `xi_j + ceiling * r_j`, so an example
/// whose indicator is on contributes exactly the ceiling.
pub fn add_objective<B: SolverBackend>(
    backend: &mut B,
    vars: &mut ProblemVariables,
    config: &SvmConfig,
    dataset: &DenseDataset,
) -> Result<()> {
    if vars.objective.is_some() {
        return Err(SvmError::Formulation(
            "objective function already added".to_string(),
        ));
    }
    if dataset.len() != vars.slacks.len() {
        return Err(SvmError::DimensionMismatch {
            expected: vars.slacks.len(),
            actual: dataset.len(),
        });
    }
    if dataset.dim() != vars.weights.len() {
        return Err(SvmError::DimensionMismatch {
            expected: vars.weights.len(),
            actual: dataset.dim(),
        });
    }

    // The only variable with a nonzero objective coefficient.
    let objective = backend.add_var(VarKind::Continuous, 0.0, f64::INFINITY, 1.0, "obj");

    let quad_terms: Vec<_> = vars.weights.iter().map(|&w| (w, w, 1.0)).collect();

    let mut lin_terms = Vec::with_capacity(vars.slacks.len() * 2 + 1);
    for (j, &slack) in vars.slacks.iter().enumerate() {
        let penalty = config.c * config.class_weight(dataset.label(j));
        lin_terms.push((slack, penalty));
        if let Some(ramps) = &vars.ramps {
            lin_terms.push((ramps[j], penalty * RAMP_CEILING));
        }
    }
    lin_terms.push((objective, -1.0));

    // sum(w_i^2) + penalties - obj <= 0
    backend.add_quadratic(
        &quad_terms,
        &lin_terms,
        f64::NEG_INFINITY,
        0.0,
        "objective_function",
    );

    vars.objective = Some(objective);
    Ok(())
}

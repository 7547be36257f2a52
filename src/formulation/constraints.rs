//! Margin and side constraints per model variant
//!
//! Every variant shares the soft-margin constraints
//! `y_j * (b + w . X_j) >= 1 - xi_j`. The discrete variants add their
//! side constraints on top:
//!
//! * `SparseLinear` links each weight to a binary selector through a
//!   big-M box and caps the number of active selectors.
//! * `RampLoss` relaxes the margin constraint of an example by `M` when
//!   its indicator is on and caps the slack, turning the unbounded hinge
//!   into a ramp.

use crate::core::{DenseDataset, ModelVariant, Result, SvmConfig, SvmError};
use crate::formulation::variables::ProblemVariables;
use crate::solver::{SolverBackend, VarId};

/// Penalty ceiling of the ramp loss: the hinge value at margin -1, where
/// the classical ramp flattens out.
pub const RAMP_CEILING: f64 = 2.0;

/// Smallest constant that makes a relaxed margin constraint vacuous.
///
/// With `|w_i| <= W` and `|b| <= W` the decision value on a row `x` is
/// within `W * (1 + ||x||_1)`, so no hinge violation can exceed
/// `1 + W * (1 + max_j ||X_j||_1)`.
pub fn big_m(config: &SvmConfig, dataset: &DenseDataset) -> f64 {
    1.0 + config.weight_bound * (1.0 + dataset.max_l1_norm())
}

impl ModelVariant {
    /// Add this variant's constraints to the session
    ///
    /// Fails with a formulation error if the dataset shape disagrees with
    /// the declared variables.
    pub fn add_constraints<B: SolverBackend>(
        &self,
        backend: &mut B,
        vars: &ProblemVariables,
        config: &SvmConfig,
        dataset: &DenseDataset,
    ) -> Result<()> {
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

        match self {
            ModelVariant::Linear => {
                add_margin_constraints(backend, vars, dataset, None)?;
            }
            ModelVariant::SparseLinear => {
                add_margin_constraints(backend, vars, dataset, None)?;
                add_sparsity_constraints(backend, vars, config, dataset.dim())?;
            }
            ModelVariant::RampLoss => {
                let m = big_m(config, dataset);
                add_margin_constraints(backend, vars, dataset, Some(m))?;
                add_ramp_constraints(backend, vars, m)?;
            }
        }
        Ok(())
    }
}

/// Soft-margin constraints, optionally relaxed by `M * r_j` for the ramp
/// variant: `sum_i (y_j X_ji) w_i + y_j b + xi_j [+ M r_j] >= 1`
fn add_margin_constraints<B: SolverBackend>(
    backend: &mut B,
    vars: &ProblemVariables,
    dataset: &DenseDataset,
    relaxation: Option<f64>,
) -> Result<()> {
    for j in 0..dataset.len() {
        let label = dataset.label(j);
        let row = dataset.row(j);

        let mut terms: Vec<(VarId, f64)> = Vec::with_capacity(row.len() + 3);
        for (i, &w) in vars.weights.iter().enumerate() {
            terms.push((w, label * row[i]));
        }
        terms.push((vars.offset, label));
        terms.push((vars.slacks[j], 1.0));
        if let Some(m) = relaxation {
            let ramps = vars.ramps.as_ref().ok_or_else(|| {
                SvmError::Formulation("ramp indicators were not declared".to_string())
            })?;
            terms.push((ramps[j], m));
        }

        backend.add_linear(&terms, 1.0, f64::INFINITY, &format!("margin_{j}"));
    }
    Ok(())
}

/// Selector linking `-W v_i <= w_i <= W v_i` plus the cardinality cap
/// `sum_i v_i <= ceil(sparsity * nfeatures)`
fn add_sparsity_constraints<B: SolverBackend>(
    backend: &mut B,
    vars: &ProblemVariables,
    config: &SvmConfig,
    nfeatures: usize,
) -> Result<()> {
    let selectors = vars.selectors.as_ref().ok_or_else(|| {
        SvmError::Formulation("sparsity selectors were not declared".to_string())
    })?;

    let bound = config.weight_bound;
    for (i, (&w, &v)) in vars.weights.iter().zip(selectors.iter()).enumerate() {
        // w_i - W v_i <= 0
        backend.add_linear(
            &[(w, 1.0), (v, -bound)],
            f64::NEG_INFINITY,
            0.0,
            &format!("select_ub_{i}"),
        );
        // w_i + W v_i >= 0
        backend.add_linear(
            &[(w, 1.0), (v, bound)],
            0.0,
            f64::INFINITY,
            &format!("select_lb_{i}"),
        );
    }

    let budget = (config.sparsity * nfeatures as f64).ceil();
    let terms: Vec<(VarId, f64)> = selectors.iter().map(|&v| (v, 1.0)).collect();
    backend.add_linear(&terms, f64::NEG_INFINITY, budget, "cardinality");
    Ok(())
}

/// Slack caps `xi_j + M r_j <= ceiling + M` for the ramp variant
fn add_ramp_constraints<B: SolverBackend>(
    backend: &mut B,
    vars: &ProblemVariables,
    m: f64,
) -> Result<()> {
    let ramps = vars.ramps.as_ref().ok_or_else(|| {
        SvmError::Formulation("ramp indicators were not declared".to_string())
    })?;

    for (j, (&slack, &ramp)) in vars.slacks.iter().zip(ramps.iter()).enumerate() {
        backend.add_linear(
            &[(slack, 1.0), (ramp, m)],
            f64::NEG_INFINITY,
            RAMP_CEILING + m,
            &format!("ramp_cap_{j}"),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::recording::RecordingBackend;
    use approx::assert_relative_eq;

    fn dataset() -> DenseDataset {
        DenseDataset::new(
            vec![vec![2.0, 1.0], vec![-1.0, 0.5], vec![0.0, -2.0]],
            vec![1.0, -1.0, 1.0],
        )
        .unwrap()
    }

    fn declared(
        backend: &mut RecordingBackend,
        variant: ModelVariant,
        config: &SvmConfig,
    ) -> ProblemVariables {
        ProblemVariables::declare(backend, config, variant, 2, 3).unwrap()
    }

    #[test]
    fn test_linear_adds_one_margin_constraint_per_example() {
        let mut backend = RecordingBackend::new();
        let config = SvmConfig::default();
        let vars = declared(&mut backend, ModelVariant::Linear, &config);

        ModelVariant::Linear
            .add_constraints(&mut backend, &vars, &config, &dataset())
            .expect("constraints");

        assert_eq!(backend.linear.len(), 3);
        for cons in &backend.linear {
            assert_eq!(cons.lhs, 1.0);
            assert_eq!(cons.rhs, f64::INFINITY);
        }
    }

    #[test]
    fn test_margin_coefficients_carry_labels() {
        let mut backend = RecordingBackend::new();
        let config = SvmConfig::default();
        let vars = declared(&mut backend, ModelVariant::Linear, &config);
        let data = dataset();

        ModelVariant::Linear
            .add_constraints(&mut backend, &vars, &config, &data)
            .unwrap();

        // second example: label -1, row [-1.0, 0.5]
        let cons = &backend.linear[1];
        let coef_of = |idx: usize| {
            cons.terms
                .iter()
                .find(|&&(v, _)| v == idx)
                .map(|&(_, c)| c)
                .unwrap()
        };
        assert_relative_eq!(coef_of(vars.weights()[0].index()), 1.0);
        assert_relative_eq!(coef_of(vars.weights()[1].index()), -0.5);
        assert_relative_eq!(coef_of(vars.offset().index()), -1.0);
        assert_relative_eq!(coef_of(vars.slacks()[1].index()), 1.0);
    }

    #[test]
    fn test_sparse_adds_linking_and_cardinality() {
        let mut backend = RecordingBackend::new();
        let config = SvmConfig {
            sparsity: 0.5,
            ..Default::default()
        };
        let vars = declared(&mut backend, ModelVariant::SparseLinear, &config);

        ModelVariant::SparseLinear
            .add_constraints(&mut backend, &vars, &config, &dataset())
            .unwrap();

        // 3 margins + 2 features * 2 linking + 1 cardinality
        assert_eq!(backend.linear.len(), 3 + 4 + 1);
        let cardinality = backend
            .linear
            .iter()
            .find(|c| c.name == "cardinality")
            .expect("cardinality constraint");
        assert_relative_eq!(cardinality.rhs, (0.5f64 * 2.0).ceil());
        assert_eq!(cardinality.terms.len(), 2);
    }

    #[test]
    fn test_cardinality_budget_rounds_up() {
        let mut backend = RecordingBackend::new();
        let config = SvmConfig {
            sparsity: 0.2,
            ..Default::default()
        };
        let vars = ProblemVariables::declare(
            &mut backend,
            &config,
            ModelVariant::SparseLinear,
            7,
            1,
        )
        .unwrap();
        let data = DenseDataset::new(vec![vec![0.0; 7]], vec![1.0]).unwrap();

        ModelVariant::SparseLinear
            .add_constraints(&mut backend, &vars, &config, &data)
            .unwrap();

        let cardinality = backend
            .linear
            .iter()
            .find(|c| c.name == "cardinality")
            .unwrap();
        // ceil(0.2 * 7) = 2
        assert_relative_eq!(cardinality.rhs, 2.0);
    }

    #[test]
    fn test_selector_linking_uses_weight_bound() {
        let mut backend = RecordingBackend::new();
        let config = SvmConfig {
            weight_bound: 4.0,
            ..Default::default()
        };
        let vars = declared(&mut backend, ModelVariant::SparseLinear, &config);

        ModelVariant::SparseLinear
            .add_constraints(&mut backend, &vars, &config, &dataset())
            .unwrap();

        let upper = backend
            .linear
            .iter()
            .find(|c| c.name == "select_ub_0")
            .unwrap();
        let selector_coef = upper
            .terms
            .iter()
            .find(|&&(v, _)| v == vars.selectors.as_ref().unwrap()[0].index())
            .map(|&(_, c)| c)
            .unwrap();
        assert_relative_eq!(selector_coef, -4.0);
    }

    #[test]
    fn test_ramp_relaxes_margins_and_caps_slacks() {
        let mut backend = RecordingBackend::new();
        let config = SvmConfig::default();
        let vars = declared(&mut backend, ModelVariant::RampLoss, &config);
        let data = dataset();
        let m = big_m(&config, &data);

        ModelVariant::RampLoss
            .add_constraints(&mut backend, &vars, &config, &data)
            .unwrap();

        // 3 margins + 3 slack caps
        assert_eq!(backend.linear.len(), 6);

        let margin = &backend.linear[0];
        let ramp_coef = margin
            .terms
            .iter()
            .find(|&&(v, _)| v == vars.ramps.as_ref().unwrap()[0].index())
            .map(|&(_, c)| c)
            .unwrap();
        assert_relative_eq!(ramp_coef, m);

        let cap = backend
            .linear
            .iter()
            .find(|c| c.name == "ramp_cap_0")
            .unwrap();
        assert_relative_eq!(cap.rhs, RAMP_CEILING + m);
    }

    #[test]
    fn test_big_m_grows_with_data_magnitude() {
        let config = SvmConfig {
            weight_bound: 10.0,
            ..Default::default()
        };
        let small = DenseDataset::new(vec![vec![1.0, 1.0]], vec![1.0]).unwrap();
        let large = DenseDataset::new(vec![vec![100.0, 100.0]], vec![1.0]).unwrap();
        assert!(big_m(&config, &large) > big_m(&config, &small));
        // exact value for the small set: 1 + 10 * (1 + 2)
        assert_relative_eq!(big_m(&config, &small), 31.0);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let mut backend = RecordingBackend::new();
        let config = SvmConfig::default();
        let vars = declared(&mut backend, ModelVariant::Linear, &config);
        let wrong = DenseDataset::new(vec![vec![1.0, 2.0]], vec![1.0]).unwrap();

        let result = ModelVariant::Linear.add_constraints(&mut backend, &vars, &config, &wrong);
        assert!(matches!(result, Err(SvmError::DimensionMismatch { .. })));
    }
}

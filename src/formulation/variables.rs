//! Decision variable declaration
//!
//! One call per training run registers every decision variable with the
//! solving session: feature weights and the offset (boxed by the weight
//! bound), one nonnegative slack per example, and the binary side
//! variables the chosen model variant needs.

use crate::core::{ModelVariant, Result, SvmConfig, SvmError};
use crate::solver::{SolverBackend, VarId, VarKind};

/// Handles to every decision variable of one training run
///
/// The objective variable is absent until the objective formulation adds
/// it, which also serves as the "objective added exactly once" check.
#[derive(Debug)]
pub struct ProblemVariables {
    pub(crate) weights: Vec<VarId>,
    pub(crate) offset: VarId,
    pub(crate) slacks: Vec<VarId>,
    pub(crate) selectors: Option<Vec<VarId>>,
    pub(crate) ramps: Option<Vec<VarId>>,
    pub(crate) objective: Option<VarId>,
}

impl ProblemVariables {
    /// Register all decision variables for `nfeatures` dimensions and
    /// `nexamples` training examples
    pub fn declare<B: SolverBackend>(
        backend: &mut B,
        config: &SvmConfig,
        variant: ModelVariant,
        nfeatures: usize,
        nexamples: usize,
    ) -> Result<Self> {
        if nfeatures == 0 {
            return Err(SvmError::InvalidConfig(
                "number of features must be positive".to_string(),
            ));
        }
        if nexamples == 0 {
            return Err(SvmError::InvalidConfig(
                "number of examples must be positive".to_string(),
            ));
        }

        let bound = config.weight_bound;
        let weights = (0..nfeatures)
            .map(|i| backend.add_var(VarKind::Continuous, -bound, bound, 0.0, &format!("w_{i}")))
            .collect();
        // The offset shares the weight box; an unbounded offset would also
        // invalidate the big-M derivation in the ramp variant.
        let offset = backend.add_var(VarKind::Continuous, -bound, bound, 0.0, "b");
        let slacks = (0..nexamples)
            .map(|j| {
                backend.add_var(VarKind::Continuous, 0.0, f64::INFINITY, 0.0, &format!("xi_{j}"))
            })
            .collect();

        let selectors = match variant {
            ModelVariant::SparseLinear => Some(
                (0..nfeatures)
                    .map(|i| backend.add_var(VarKind::Binary, 0.0, 1.0, 0.0, &format!("v_{i}")))
                    .collect(),
            ),
            _ => None,
        };
        let ramps = match variant {
            ModelVariant::RampLoss => Some(
                (0..nexamples)
                    .map(|j| backend.add_var(VarKind::Binary, 0.0, 1.0, 0.0, &format!("r_{j}")))
                    .collect(),
            ),
            _ => None,
        };

        Ok(Self {
            weights,
            offset,
            slacks,
            selectors,
            ramps,
            objective: None,
        })
    }

    /// Weight variable handles, one per feature
    pub fn weights(&self) -> &[VarId] {
        &self.weights
    }

    /// Offset variable handle
    pub fn offset(&self) -> VarId {
        self.offset
    }

    /// Slack variable handles, one per example
    pub fn slacks(&self) -> &[VarId] {
        &self.slacks
    }

    /// Objective variable handle, present once the objective was added
    pub fn objective(&self) -> Option<VarId> {
        self.objective
    }
}

//! Core type definitions for mixed-integer SVM training

use crate::core::{Result, SvmError};
use serde::{Deserialize, Serialize};

/// Which optimization model is built for training
///
/// The variant set is closed: every variant shares the soft-margin
/// constraints and differs only in the discrete side constraints it adds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelVariant {
    /// Plain soft-margin linear SVM (continuous quadratic program)
    Linear,
    /// Linear SVM with binary feature selectors and a cardinality bound
    SparseLinear,
    /// Linear SVM with a discrete ramp loss capping per-example penalties
    RampLoss,
}

impl ModelVariant {
    /// Whether the variant introduces binary variables
    pub fn is_discrete(&self) -> bool {
        !matches!(self, ModelVariant::Linear)
    }
}

impl std::fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelVariant::Linear => write!(f, "linear"),
            ModelVariant::SparseLinear => write!(f, "sparse-linear"),
            ModelVariant::RampLoss => write!(f, "ramp-loss"),
        }
    }
}

/// Training configuration, validated at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmConfig {
    /// Objective weight for misclassification penalties
    pub c: f64,
    /// Solver time limit in seconds
    pub time_limit: f64,
    /// Solver log level (0 = quiet .. 5 = full SCIP output)
    pub verbosity: i32,
    /// Fraction of feature dimensions allowed to be nonzero (SparseLinear)
    pub sparsity: f64,
    /// Bound on the absolute value of each feature weight and the offset
    pub weight_bound: f64,
    /// Penalty multipliers for classes -1 and +1, in that order
    pub class_weights: [f64; 2],
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            c: 0.125,
            time_limit: 5.0,
            verbosity: 0,
            sparsity: 0.2,
            weight_bound: 10.0,
            class_weights: [1.0, 1.0],
        }
    }
}

impl SvmConfig {
    /// Check every option and reject bad values before any solving happens
    pub fn validate(&self) -> Result<()> {
        if self.c <= 0.0 || !self.c.is_finite() {
            return Err(SvmError::InvalidConfig(format!(
                "'c' must be a positive float, got {}",
                self.c
            )));
        }
        if self.time_limit <= 0.0 || !self.time_limit.is_finite() {
            return Err(SvmError::InvalidConfig(format!(
                "'time_limit' must be a positive float, got {}",
                self.time_limit
            )));
        }
        if !(0..=5).contains(&self.verbosity) {
            return Err(SvmError::InvalidConfig(format!(
                "'verbosity' must be between 0 and 5, got {}",
                self.verbosity
            )));
        }
        if !(0.0..=1.0).contains(&self.sparsity) {
            return Err(SvmError::InvalidConfig(format!(
                "'sparsity' must be between 0.0 and 1.0, got {}",
                self.sparsity
            )));
        }
        if self.weight_bound <= 0.0 || !self.weight_bound.is_finite() {
            return Err(SvmError::InvalidConfig(format!(
                "'weight_bound' must be a positive float, got {}",
                self.weight_bound
            )));
        }
        for &w in &self.class_weights {
            if w <= 0.0 || !w.is_finite() {
                return Err(SvmError::InvalidConfig(format!(
                    "'class_weights' entries must be positive floats, got {w}"
                )));
            }
        }
        Ok(())
    }

    /// Penalty multiplier for a label (-1 maps to the first entry, +1 to the second)
    pub fn class_weight(&self, label: f64) -> f64 {
        if label < 0.0 {
            self.class_weights[0]
        } else {
            self.class_weights[1]
        }
    }
}

/// Validated dense training data with labels in {-1, +1}
#[derive(Debug, Clone)]
pub struct DenseDataset {
    features: Vec<Vec<f64>>,
    labels: Vec<f64>,
    nfeatures: usize,
}

impl DenseDataset {
    /// Build a dataset from dense rows and labels, checking shape and label values
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<f64>) -> Result<Self> {
        if features.is_empty() {
            return Err(SvmError::EmptyDataset);
        }
        if features.len() != labels.len() {
            return Err(SvmError::DimensionMismatch {
                expected: features.len(),
                actual: labels.len(),
            });
        }
        let nfeatures = features[0].len();
        if nfeatures == 0 {
            return Err(SvmError::Formulation(
                "examples must have at least one feature".to_string(),
            ));
        }
        for row in &features {
            if row.len() != nfeatures {
                return Err(SvmError::DimensionMismatch {
                    expected: nfeatures,
                    actual: row.len(),
                });
            }
        }
        for &label in &labels {
            if label != 1.0 && label != -1.0 {
                return Err(SvmError::InvalidLabel(label));
            }
        }
        Ok(Self {
            features,
            labels,
            nfeatures,
        })
    }

    /// Borrow from caller-owned slices without taking ownership of the rows
    pub fn from_slices(features: &[Vec<f64>], labels: &[f64]) -> Result<Self> {
        Self::new(features.to_vec(), labels.to_vec())
    }

    /// Number of training examples
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the dataset holds no examples
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature space dimension
    pub fn dim(&self) -> usize {
        self.nfeatures
    }

    /// Feature row of example `j`
    pub fn row(&self, j: usize) -> &[f64] {
        &self.features[j]
    }

    /// Label of example `j`
    pub fn label(&self, j: usize) -> f64 {
        self.labels[j]
    }

    /// All labels
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// Largest L1 norm over all feature rows, used for big-M derivation
    pub fn max_l1_norm(&self) -> f64 {
        self.features
            .iter()
            .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
            .fold(0.0, f64::max)
    }
}

/// Terminal state of one solve, reported rather than raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Proven optimal solution found
    Optimal,
    /// Time limit hit but a feasible incumbent is available
    TimeLimitWithIncumbent,
    /// Time limit hit without any feasible solution
    TimeLimitNoIncumbent,
    /// Model proven infeasible
    Infeasible,
}

impl SolveOutcome {
    /// Whether a usable weight assignment exists for this outcome
    pub fn has_solution(&self) -> bool {
        matches!(
            self,
            SolveOutcome::Optimal | SolveOutcome::TimeLimitWithIncumbent
        )
    }
}

/// Linear decision function extracted from a solve
///
/// This is the only state that survives the optimization run. Evaluation
/// is per-example and depends on nothing but the weights, the offset and
/// the example itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearDecision {
    /// One weight per feature dimension
    pub weights: Vec<f64>,
    /// Additive offset of the separating hyperplane
    pub offset: f64,
}

impl LinearDecision {
    /// Trivial decision that predicts the positive class for everything
    pub fn trivial(nfeatures: usize) -> Self {
        Self {
            weights: vec![0.0; nfeatures],
            offset: 1.0,
        }
    }

    /// Raw score `offset + w . x`; the sign gives the predicted class
    pub fn score(&self, example: &[f64]) -> Result<f64> {
        if example.len() != self.weights.len() {
            return Err(SvmError::DimensionMismatch {
                expected: self.weights.len(),
                actual: example.len(),
            });
        }
        let dot: f64 = self
            .weights
            .iter()
            .zip(example.iter())
            .map(|(w, x)| w * x)
            .sum();
        Ok(self.offset + dot)
    }

    /// Scores for a batch of examples
    pub fn score_batch(&self, examples: &[Vec<f64>]) -> Result<Vec<f64>> {
        examples.iter().map(|x| self.score(x)).collect()
    }

    /// Number of nonzero weights (active features)
    pub fn nnz(&self) -> usize {
        self.weights.iter().filter(|&&w| w != 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_config_default_is_valid() {
        assert!(SvmConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_negative_c() {
        let config = SvmConfig {
            c: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SvmError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_rejects_out_of_range_sparsity() {
        let config = SvmConfig {
            sparsity: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_nonpositive_class_weight() {
        let config = SvmConfig {
            class_weights: [1.0, 0.0],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_class_weight_selection() {
        let config = SvmConfig {
            class_weights: [2.0, 3.0],
            ..Default::default()
        };
        assert_eq!(config.class_weight(-1.0), 2.0);
        assert_eq!(config.class_weight(1.0), 3.0);
    }

    #[test]
    fn test_dataset_validation() {
        let dataset = DenseDataset::new(
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            vec![1.0, -1.0],
        )
        .expect("valid dataset");
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dim(), 2);
        assert_eq!(dataset.label(1), -1.0);
        assert_eq!(dataset.row(0), &[1.0, 2.0]);
    }

    #[test]
    fn test_dataset_rejects_ragged_rows() {
        let result = DenseDataset::new(vec![vec![1.0, 2.0], vec![3.0]], vec![1.0, -1.0]);
        assert!(matches!(
            result,
            Err(SvmError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_dataset_rejects_label_mismatch() {
        let result = DenseDataset::new(vec![vec![1.0]], vec![1.0, -1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_dataset_rejects_bad_label() {
        let result = DenseDataset::new(vec![vec![1.0], vec![2.0]], vec![1.0, 0.5]);
        assert!(matches!(result, Err(SvmError::InvalidLabel(l)) if l == 0.5));
    }

    #[test]
    fn test_dataset_rejects_empty() {
        assert!(matches!(
            DenseDataset::new(vec![], vec![]),
            Err(SvmError::EmptyDataset)
        ));
    }

    #[test]
    fn test_max_l1_norm() {
        let dataset =
            DenseDataset::new(vec![vec![1.0, -2.0], vec![-3.0, 0.5]], vec![1.0, -1.0]).unwrap();
        assert_relative_eq!(dataset.max_l1_norm(), 3.5);
    }

    #[test]
    fn test_trivial_decision_predicts_positive() {
        let decision = LinearDecision::trivial(3);
        let score = decision.score(&[5.0, -5.0, 0.0]).unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let decision = LinearDecision {
            weights: vec![1.0, -0.5],
            offset: 0.25,
        };
        let x = vec![2.0, 4.0];
        let first = decision.score(&x).unwrap();
        let second = decision.score(&x).unwrap();
        assert_eq!(first, second);
        assert_relative_eq!(first, 0.25 + 2.0 - 2.0);
    }

    #[test]
    fn test_score_dimension_mismatch() {
        let decision = LinearDecision::trivial(2);
        assert!(decision.score(&[1.0]).is_err());
    }

    #[test]
    fn test_nnz_counts_active_features() {
        let decision = LinearDecision {
            weights: vec![0.0, 1.5, 0.0, -0.1],
            offset: 0.0,
        };
        assert_eq!(decision.nnz(), 2);
    }
}

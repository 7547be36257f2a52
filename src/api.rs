//! High-level training and prediction API
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use misvm::{MipSvm, ModelVariant};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let features = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![3.0, 3.0], vec![4.0, 4.0]];
//! let labels = vec![-1.0, -1.0, 1.0, 1.0];
//!
//! let mut svm = MipSvm::new(ModelVariant::Linear).with_c(1.0).with_time_limit(10.0);
//! svm.fit(&features, &labels)?;
//!
//! let scores = svm.predict(&features)?;
//! # Ok(())
//! # }
//! ```

use log::{debug, info, warn};

use crate::core::{
    DenseDataset, LinearDecision, ModelVariant, Result, SolveOutcome, SvmConfig, SvmError,
};
use crate::formulation::{add_objective, ProblemVariables};
use crate::solver::{ScipSession, SolveResult, SolverBackend};

/// Linear SVM trained by mixed-integer/quadratic optimization
///
/// `fit` is a blocking call that owns a fresh solving session for its
/// whole duration; the session and every decision variable are discarded
/// when it returns, on success and on error alike. Only the extracted
/// [`LinearDecision`] survives.
pub struct MipSvm {
    variant: ModelVariant,
    config: SvmConfig,
    decision: Option<LinearDecision>,
    last_outcome: Option<SolveOutcome>,
}

impl MipSvm {
    /// Create a classifier with default options for the given variant
    pub fn new(variant: ModelVariant) -> Self {
        Self {
            variant,
            config: SvmConfig::default(),
            decision: None,
            last_outcome: None,
        }
    }

    /// Create a classifier from an explicit configuration, validated eagerly
    pub fn with_config(variant: ModelVariant, config: SvmConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            variant,
            config,
            decision: None,
            last_outcome: None,
        })
    }

    /// Set the misclassification penalty weight C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set the solver time limit in seconds
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.config.time_limit = seconds;
        self
    }

    /// Set the solver log level (0 = quiet .. 5)
    pub fn with_verbosity(mut self, verbosity: i32) -> Self {
        self.config.verbosity = verbosity;
        self
    }

    /// Set the allowed fraction of nonzero feature weights (SparseLinear)
    pub fn with_sparsity(mut self, sparsity: f64) -> Self {
        self.config.sparsity = sparsity;
        self
    }

    /// Set the bound on the absolute value of weights and offset
    pub fn with_weight_bound(mut self, bound: f64) -> Self {
        self.config.weight_bound = bound;
        self
    }

    /// Set the penalty multipliers for classes -1 and +1
    pub fn with_class_weights(mut self, negative: f64, positive: f64) -> Self {
        self.config.class_weights = [negative, positive];
        self
    }

    /// The model variant this classifier trains
    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    /// Current configuration
    pub fn config(&self) -> &SvmConfig {
        &self.config
    }

    /// Fit the classifier to dense features and {-1, +1} labels
    ///
    /// Configuration and shape problems abort the call without touching
    /// any previously trained weights. A solve that finds no incumbent is
    /// not an error: the classifier falls back to the trivial decision
    /// (all-zero weights, offset +1) and records the outcome.
    pub fn fit(&mut self, features: &[Vec<f64>], labels: &[f64]) -> Result<&mut Self> {
        let dataset = DenseDataset::from_slices(features, labels)?;
        self.fit_dataset(&dataset)
    }

    /// Fit the classifier to an already validated dataset
    pub fn fit_dataset(&mut self, dataset: &DenseDataset) -> Result<&mut Self> {
        self.config.validate()?;

        info!(
            "training {} model: {} examples, {} features",
            self.variant,
            dataset.len(),
            dataset.dim()
        );

        let session = ScipSession::new("svm-train", &self.config)?;
        let (decision, outcome) = train_on(session, self.variant, &self.config, dataset)?;

        match outcome {
            SolveOutcome::Optimal => debug!("solver proved optimality"),
            SolveOutcome::TimeLimitWithIncumbent => {
                info!("time limit reached, keeping best incumbent")
            }
            SolveOutcome::TimeLimitNoIncumbent | SolveOutcome::Infeasible => warn!(
                "no solution found ({outcome:?}), falling back to the trivial classifier"
            ),
        }

        self.decision = Some(decision);
        self.last_outcome = Some(outcome);
        Ok(self)
    }

    /// Decision scores `offset + w . x` for a batch of examples
    ///
    /// The sign of each score is the predicted class; a score of exactly
    /// zero counts as the positive class. Purely a function of the
    /// trained weights and each example's own features.
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>> {
        let decision = self.decision.as_ref().ok_or(SvmError::NotTrained)?;
        decision.score_batch(features)
    }

    /// The trained decision function, if any fit has completed
    pub fn decision(&self) -> Option<&LinearDecision> {
        self.decision.as_ref()
    }

    /// Install a previously extracted decision function (model loading)
    pub fn set_decision(&mut self, decision: LinearDecision) {
        self.decision = Some(decision);
    }

    /// Terminal state of the most recent solve
    pub fn last_outcome(&self) -> Option<SolveOutcome> {
        self.last_outcome
    }

    /// Classify a labeled set and count the four confusion outcomes
    ///
    /// A score of exactly zero is classified as positive, matching the
    /// tie-break used by prediction everywhere else.
    pub fn evaluate(&self, features: &[Vec<f64>], labels: &[f64]) -> Result<EvaluationMetrics> {
        if features.len() != labels.len() {
            return Err(SvmError::DimensionMismatch {
                expected: features.len(),
                actual: labels.len(),
            });
        }
        let scores = self.predict(features)?;

        let mut tp = 0;
        let mut tn = 0;
        let mut fp = 0;
        let mut fn_ = 0;
        for (score, &label) in scores.iter().zip(labels.iter()) {
            match (*score >= 0.0, label > 0.0) {
                (true, true) => tp += 1,
                (false, false) => tn += 1,
                (true, false) => fp += 1,
                (false, true) => fn_ += 1,
            }
        }
        Ok(EvaluationMetrics {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        })
    }
}

/// Run the full formulation pipeline on one solving session
fn train_on<B: SolverBackend>(
    mut backend: B,
    variant: ModelVariant,
    config: &SvmConfig,
    dataset: &DenseDataset,
) -> Result<(LinearDecision, SolveOutcome)> {
    let mut vars =
        ProblemVariables::declare(&mut backend, config, variant, dataset.dim(), dataset.len())?;
    add_objective(&mut backend, &mut vars, config, dataset)?;
    variant.add_constraints(&mut backend, &vars, config, dataset)?;

    let result = backend.solve()?;
    let decision = extract_decision(&result, &vars, dataset.dim());
    Ok((decision, result.outcome))
}

/// Read weights and offset from the best solution, or fall back to the
/// trivial always-positive decision when none exists
fn extract_decision(
    result: &SolveResult,
    vars: &ProblemVariables,
    nfeatures: usize,
) -> LinearDecision {
    if !result.outcome.has_solution() || result.values.is_none() {
        return LinearDecision::trivial(nfeatures);
    }
    let weights = vars
        .weights()
        .iter()
        .map(|&w| result.value(w).unwrap_or(0.0))
        .collect();
    let offset = result.value(vars.offset()).unwrap_or(1.0);
    LinearDecision { weights, offset }
}

/// Confusion-matrix counts from one evaluation pass
#[derive(Debug, Clone)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl EvaluationMetrics {
    /// (TP + TN) / total
    pub fn accuracy(&self) -> f64 {
        let total = self.true_positives
            + self.true_negatives
            + self.false_positives
            + self.false_negatives;
        if total == 0 {
            0.0
        } else {
            (self.true_positives + self.true_negatives) as f64 / total as f64
        }
    }

    /// TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        let denominator = self.true_positives + self.false_positives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        let denominator = self.true_positives + self.false_negatives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// Harmonic mean of precision and recall
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::recording::RecordingBackend;
    use approx::assert_relative_eq;

    fn dataset() -> DenseDataset {
        DenseDataset::new(
            vec![vec![1.0, 0.0], vec![-1.0, 0.0]],
            vec![1.0, -1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_builder_pattern() {
        let svm = MipSvm::new(ModelVariant::SparseLinear)
            .with_c(2.0)
            .with_time_limit(30.0)
            .with_sparsity(0.5)
            .with_weight_bound(3.0)
            .with_class_weights(1.5, 2.5);

        assert_eq!(svm.variant(), ModelVariant::SparseLinear);
        assert_eq!(svm.config().c, 2.0);
        assert_eq!(svm.config().time_limit, 30.0);
        assert_eq!(svm.config().sparsity, 0.5);
        assert_eq!(svm.config().weight_bound, 3.0);
        assert_eq!(svm.config().class_weights, [1.5, 2.5]);
    }

    #[test]
    fn test_with_config_validates_eagerly() {
        let bad = SvmConfig {
            c: -1.0,
            ..Default::default()
        };
        assert!(MipSvm::with_config(ModelVariant::Linear, bad).is_err());
    }

    #[test]
    fn test_fit_rejects_invalid_config_without_touching_weights() {
        let mut svm = MipSvm::new(ModelVariant::Linear).with_c(-1.0);
        let features = vec![vec![1.0], vec![-1.0]];
        let labels = vec![1.0, -1.0];

        let result = svm.fit(&features, &labels);
        assert!(matches!(result, Err(SvmError::InvalidConfig(_))));
        assert!(svm.decision().is_none());
        assert!(svm.last_outcome().is_none());
    }

    #[test]
    fn test_fit_rejects_shape_mismatch() {
        let mut svm = MipSvm::new(ModelVariant::Linear);
        let result = svm.fit(&[vec![1.0], vec![2.0]], &[1.0]);
        assert!(result.is_err());
        assert!(svm.decision().is_none());
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let svm = MipSvm::new(ModelVariant::Linear);
        assert!(matches!(
            svm.predict(&[vec![1.0]]),
            Err(SvmError::NotTrained)
        ));
    }

    #[test]
    fn test_train_on_extracts_weights_and_offset() {
        // 2 weights, offset, 2 slacks, then obj appended by the pipeline
        let values = vec![0.5, -0.25, 0.125, 0.0, 0.0, 1.0];
        let backend = RecordingBackend::with_result(SolveOutcome::Optimal, Some(values));

        let (decision, outcome) =
            train_on(backend, ModelVariant::Linear, &SvmConfig::default(), &dataset()).unwrap();

        assert_eq!(outcome, SolveOutcome::Optimal);
        assert_relative_eq!(decision.weights[0], 0.5);
        assert_relative_eq!(decision.weights[1], -0.25);
        assert_relative_eq!(decision.offset, 0.125);
    }

    #[test]
    fn test_train_on_without_incumbent_yields_trivial_decision() {
        let backend = RecordingBackend::with_result(SolveOutcome::TimeLimitNoIncumbent, None);

        let (decision, outcome) =
            train_on(backend, ModelVariant::Linear, &SvmConfig::default(), &dataset()).unwrap();

        assert_eq!(outcome, SolveOutcome::TimeLimitNoIncumbent);
        assert_eq!(decision, LinearDecision::trivial(2));
        // the trivial classifier predicts the positive class for everything
        assert!(decision.score(&[-100.0, -100.0]).unwrap() > 0.0);
    }

    #[test]
    fn test_evaluate_counts_confusion_outcomes() {
        let mut svm = MipSvm::new(ModelVariant::Linear);
        svm.set_decision(LinearDecision {
            weights: vec![1.0],
            offset: 0.0,
        });

        let features = vec![vec![2.0], vec![-2.0], vec![3.0], vec![-1.0]];
        let labels = vec![1.0, -1.0, -1.0, 1.0];
        let metrics = svm.evaluate(&features, &labels).unwrap();

        assert_eq!(metrics.true_positives, 1);
        assert_eq!(metrics.true_negatives, 1);
        assert_eq!(metrics.false_positives, 1);
        assert_eq!(metrics.false_negatives, 1);
        assert_relative_eq!(metrics.accuracy(), 0.5);
    }

    #[test]
    fn test_evaluate_counts_zero_score_as_positive() {
        let mut svm = MipSvm::new(ModelVariant::Linear);
        svm.set_decision(LinearDecision {
            weights: vec![1.0],
            offset: 0.0,
        });

        // the example at the origin scores exactly zero
        let features = vec![vec![0.0], vec![0.0]];
        let labels = vec![1.0, -1.0];
        let metrics = svm.evaluate(&features, &labels).unwrap();

        assert_eq!(metrics.true_positives, 1);
        assert_eq!(metrics.false_positives, 1);
        assert_eq!(metrics.true_negatives, 0);
        assert_eq!(metrics.false_negatives, 0);
    }

    #[test]
    fn test_metrics_arithmetic() {
        let metrics = EvaluationMetrics {
            true_positives: 10,
            true_negatives: 5,
            false_positives: 2,
            false_negatives: 3,
        };
        assert_relative_eq!(metrics.accuracy(), 0.75);
        assert_relative_eq!(metrics.precision(), 10.0 / 12.0);
        assert_relative_eq!(metrics.recall(), 10.0 / 13.0);
        assert!(metrics.f1_score() > 0.0);
    }
}

//! Utility functions for dataset preparation

/// Feature scaling utilities
pub mod scaling {
    use serde::{Deserialize, Serialize};

    /// Per-feature standardization parameters fitted on training data
    ///
    /// Applies the usual z-score transform `(x - mean) / std`; constant
    /// features pass through unchanged. Serializable so a model trained
    /// on scaled data can carry its scaler along.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct StandardScaler {
        means: Vec<f64>,
        stds: Vec<f64>,
    }

    impl StandardScaler {
        /// Compute mean and standard deviation per feature column
        pub fn fit(features: &[Vec<f64>]) -> Self {
            let nfeatures = features.first().map_or(0, |row| row.len());
            let n = features.len() as f64;

            let mut means = vec![0.0; nfeatures];
            for row in features {
                for (m, &x) in means.iter_mut().zip(row.iter()) {
                    *m += x;
                }
            }
            for m in &mut means {
                *m /= n;
            }

            let mut stds = vec![0.0; nfeatures];
            for row in features {
                for (i, &x) in row.iter().enumerate() {
                    stds[i] += (x - means[i]).powi(2);
                }
            }
            for s in &mut stds {
                *s = (*s / n).sqrt();
            }

            Self { means, stds }
        }

        /// Scale a batch of rows with the fitted parameters
        pub fn transform(&self, features: &[Vec<f64>]) -> Vec<Vec<f64>> {
            features
                .iter()
                .map(|row| {
                    row.iter()
                        .enumerate()
                        .map(|(i, &x)| {
                            if self.stds[i] > 0.0 {
                                (x - self.means[i]) / self.stds[i]
                            } else {
                                x
                            }
                        })
                        .collect()
                })
                .collect()
        }

        /// Fit on the given rows and scale them in one step
        pub fn fit_transform(features: &[Vec<f64>]) -> (Self, Vec<Vec<f64>>) {
            let scaler = Self::fit(features);
            let scaled = scaler.transform(features);
            (scaler, scaled)
        }
    }

}

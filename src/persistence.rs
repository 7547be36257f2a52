//! Model serialization and persistence
//!
//! Saves trained classifiers as JSON for use by the CLI and other
//! scenarios where a model outlives its process.

use crate::api::MipSvm;
use crate::core::{LinearDecision, ModelVariant, Result, SvmConfig, SvmError};
use crate::utils::scaling::StandardScaler;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a trained classifier
#[derive(Serialize, Deserialize)]
pub struct SerializableModel {
    /// The extracted linear decision function
    pub decision: LinearDecision,
    /// Model variant the classifier was trained with
    pub variant: ModelVariant,
    /// Scaler fitted on the training data, when features were standardized
    ///
    /// The weights were learned in the scaled space, so the same transform
    /// must be applied to every batch scored against this model.
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Model metadata for tracking and validation
#[derive(Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of nonzero feature weights
    pub active_features: usize,
    /// Training configuration used
    pub training_config: SvmConfig,
    /// Creation timestamp
    pub created_at: String,
}

impl SerializableModel {
    /// Capture a trained classifier for saving
    ///
    /// Fails if the classifier has not been fitted yet.
    pub fn from_classifier(svm: &MipSvm) -> Result<Self> {
        let decision = svm.decision().ok_or(SvmError::NotTrained)?.clone();
        Ok(Self {
            metadata: ModelMetadata {
                library_version: crate::VERSION.to_string(),
                active_features: decision.nnz(),
                training_config: svm.config().clone(),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
            variant: svm.variant(),
            scaler: None,
            decision,
        })
    }

    /// Attach the scaler the training features went through
    pub fn with_scaler(mut self, scaler: StandardScaler) -> Self {
        self.scaler = Some(scaler);
        self
    }

    /// Apply the stored scaler, if any, to a batch of raw feature rows
    pub fn prepare_features(&self, features: &[Vec<f64>]) -> Vec<Vec<f64>> {
        match &self.scaler {
            Some(scaler) => scaler.transform(features),
            None => features.to_vec(),
        }
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(SvmError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SvmError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SvmError::IoError)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| SvmError::SerializationError(e.to_string()))
    }

    /// Rebuild a predict-capable classifier from the saved state
    pub fn to_classifier(&self) -> Result<MipSvm> {
        let mut svm = MipSvm::with_config(self.variant, self.metadata.training_config.clone())?;
        svm.set_decision(self.decision.clone());
        Ok(svm)
    }
}

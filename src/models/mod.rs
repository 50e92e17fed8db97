//! ML model inference components

pub mod loader;
pub mod predictor;

pub use loader::{ModelLoader, OnnxClassifier};
pub use predictor::Predictor;

use anyhow::Result;

/// Label and probability for one input row.
///
/// The probability keeps its own error so that a model without usable
/// probabilities still yields a label.
#[derive(Debug)]
pub struct Classification {
    pub class_id: i64,
    pub probability: Result<f64>,
}

/// A trained binary classifier over a fixed-order feature vector.
///
/// The two operations are independent: a model that cannot produce
/// probabilities still answers `predict`.
pub trait Classifier: Send + Sync {
    /// Discrete class id for the input row (0 or 1 for a binary model)
    fn predict(&self, features: &[f64]) -> Result<i64>;

    /// Probability of the positive class (class 1)
    fn predict_proba(&self, features: &[f64]) -> Result<f64>;

    /// Both outputs for one row. Backends that compute them in a single
    /// pass should override this.
    fn classify(&self, features: &[f64]) -> Result<Classification> {
        Ok(Classification {
            class_id: self.predict(features)?,
            probability: self.predict_proba(features),
        })
    }
}

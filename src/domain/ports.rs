use crate::domain::model::FeatureRow;
use crate::utils::error::InferenceError;

/// A fitted regression model. Takes rows in the contracted column order and
/// returns one scalar per row.
pub trait Regressor: Send + Sync {
    fn predict(&self, rows: &[FeatureRow]) -> std::result::Result<Vec<f64>, InferenceError>;
}

impl<R: Regressor + ?Sized> Regressor for Box<R> {
    fn predict(&self, rows: &[FeatureRow]) -> std::result::Result<Vec<f64>, InferenceError> {
        (**self).predict(rows)
    }
}

impl<R: Regressor + ?Sized> Regressor for std::sync::Arc<R> {
    fn predict(&self, rows: &[FeatureRow]) -> std::result::Result<Vec<f64>, InferenceError> {
        (**self).predict(rows)
    }
}

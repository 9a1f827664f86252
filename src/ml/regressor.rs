use crate::error::Result;

/// A loaded, read-only regression model.
///
/// Implementations must be safe to share across request tasks without locking:
/// inference only reads immutable weights.
pub trait Regressor: Send + Sync {
    /// Number of features each row must carry.
    fn input_dim(&self) -> usize;

    /// Run inference on a batch of rows, returning one estimate per row.
    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// Short human-readable summary for logs and health output.
    fn describe(&self) -> String;
}

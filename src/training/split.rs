//! Seeded train/test split

use crate::error::{CreditScoreError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Rows partitioned into a training part and a held-out test part
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Shuffle rows with `seed` and hold out `ceil(test_size * n)` of them.
///
/// Both parts must end up non-empty.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_size: f64,
    seed: u64,
) -> Result<DatasetSplit> {
    let n = x.nrows();
    if n != y.len() {
        return Err(CreditScoreError::ShapeError {
            expected: format!("y length = {}", n),
            actual: format!("y length = {}", y.len()),
        });
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(CreditScoreError::ConfigError(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }

    // Tolerance absorbs float error in the product.
    let n_test = (n as f64 * test_size - 1e-9).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(CreditScoreError::EmptyDataset(format!(
            "{n} rows cannot be split into train and test parts"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    let (test_idx, train_idx) = indices.split_at(n_test);

    Ok(DatasetSplit {
        x_train: x.select(Axis(0), train_idx),
        x_test: x.select(Axis(0), test_idx),
        y_train: y.select(Axis(0), train_idx),
        y_test: y.select(Axis(0), test_idx),
    })
}

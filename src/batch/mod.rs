pub mod queue;
pub mod window;

use ndarray::{Array2, Array3};

pub use queue::EpochQueue;
pub use window::{forecast_window, history_window, scalar_forecast, HistoryBatch};

use crate::types::SampleIndices;

/// One mini-batch as served to the training loop.
#[derive(Debug, Clone, PartialEq)]
pub struct XiBatch {
    pub history: HistoryBatch,
    /// Shape `(batch, n_steps, r)`
    pub forecast: Array3<f64>,
    /// Shape `(batch, n_steps)`, only when the generator was built with `return_q`
    pub q_forecast: Option<Array2<f64>>,
    /// The sample indices behind each row, only when explicitly requested
    pub indices: Option<SampleIndices>,
}

impl XiBatch {
    pub fn len(&self) -> usize {
        self.forecast.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

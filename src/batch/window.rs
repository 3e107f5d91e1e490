//! Extraction of history and forecast windows around sample indices.
//!
//! All functions here are pure: they only read the arrays they are given, so
//! separate batches can be built independently.

use ndarray::{s, Array2, Array3, ArrayD, Axis};

use crate::types::{Series, Trajectory};

/// History input of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryBatch {
    /// `m_hist == 1`: the current row of each sample, shape `(batch, r)`
    Rows(Array2<f64>),
    /// Shape `(batch, m_hist, r)`, oldest point first
    Lagged(Array3<f64>),
}

impl HistoryBatch {
    pub fn shape(&self) -> &[usize] {
        match self {
            HistoryBatch::Rows(rows) => rows.shape(),
            HistoryBatch::Lagged(lagged) => lagged.shape(),
        }
    }

    pub fn len(&self) -> usize {
        self.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Always three dimensional, inserting a unit lag axis for `Rows`.
    pub fn into_lagged(self) -> Array3<f64> {
        match self {
            HistoryBatch::Rows(rows) => rows.insert_axis(Axis(1)),
            HistoryBatch::Lagged(lagged) => lagged,
        }
    }

    pub fn into_dyn(self) -> ArrayD<f64> {
        match self {
            HistoryBatch::Rows(rows) => rows.into_dyn(),
            HistoryBatch::Lagged(lagged) => lagged.into_dyn(),
        }
    }
}

/// `[i, j, :] = xi[inds[i] - (m_hist - 1 - j) * stride]`
pub fn history_window(xi: &Trajectory, inds: &[usize], m_hist: usize, stride: usize) -> HistoryBatch {
    if m_hist == 1 {
        return HistoryBatch::Rows(xi.select(Axis(0), inds));
    }

    let lookback = (m_hist - 1) * stride;
    let mut batch = Array3::zeros((inds.len(), m_hist, xi.ncols()));

    for (i, &idx) in inds.iter().enumerate() {
        debug_assert!(idx >= lookback, "history of sample {idx} starts before row 0");
        let start = idx - lookback;
        // rows start, start + stride, ..., idx
        batch
            .index_axis_mut(Axis(0), i)
            .assign(&xi.slice(s![start..=idx;stride, ..]));
    }

    HistoryBatch::Lagged(batch)
}

/// `[i, j, :] = xi[inds[i] + (j + 1) * stride]`
pub fn forecast_window(xi: &Trajectory, inds: &[usize], n_steps: usize, stride: usize) -> Array3<f64> {
    let mut batch = Array3::zeros((inds.len(), n_steps, xi.ncols()));

    for (i, &idx) in inds.iter().enumerate() {
        let end = idx + n_steps * stride;
        debug_assert!(end < xi.nrows(), "forecast of sample {idx} runs past the last row");
        batch
            .index_axis_mut(Axis(0), i)
            .assign(&xi.slice(s![idx + stride..=end;stride, ..]));
    }

    batch
}

/// `[i, j] = q[inds[i] + (j + 1) * stride]`
pub fn scalar_forecast(q: &Series, inds: &[usize], n_steps: usize, stride: usize) -> Array2<f64> {
    let mut batch = Array2::zeros((inds.len(), n_steps));

    for (i, &idx) in inds.iter().enumerate() {
        let end = idx + n_steps * stride;
        debug_assert!(end < q.len(), "q forecast of sample {idx} runs past the last entry");
        batch
            .row_mut(i)
            .assign(&q.slice(s![idx + stride..=end;stride]));
    }

    batch
}

use ndarray::{Array1, Array2};

/// Latent coefficients, one row per time step, where the last row is the most recent
pub type Trajectory = Array2<f64>;

/// One value per time step, aligned with the trajectory rows
pub type Series = Array1<f64>;

/// Sample positions into the trajectory, already shifted past the history lookback
pub type SampleIndices = Vec<usize>;

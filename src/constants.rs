pub mod files {
    /// Where the reduction stage drops its `Xi_<r>.bin` records
    pub const DATA_PATH: &str = "../dense_Xi_predictions";
    pub const RECORD_PREFIX: &str = "Xi_";
    pub const RECORD_EXTENSION: &str = "bin";
}

pub mod defaults {
    pub const RANK: usize = 32;
    pub const N_STEPS: usize = 10;
    pub const BATCH_SIZE: usize = 100;
    pub const M_HIST: usize = 1;
    pub const STRIDE: usize = 1;
    pub const TRAIN_FRAC: f64 = 0.7;
    pub const VAL_FRAC: f64 = 0.15;
    pub const SEED: u64 = 0;
}

pub mod synth {
    pub const TIME_STEPS: usize = 2_000;
    pub const DT: f64 = 0.01;
    /// Relative amplitude of the noise added on top of each mode
    pub const NOISE: f64 = 0.05;
}

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{constants::synth::{DT, NOISE}, data::source::XiRecord};

/// Builds a stand-in for the reduction stage output: `rank` noisy sinusoid
/// modes of increasing frequency, with `q` the energy of the raw modes.
pub fn synthetic_record(rank: usize, time_steps: usize, seed: u64) -> XiRecord {
    let mut rng = StdRng::seed_from_u64(seed);

    let time: Vec<f64> = (0..time_steps).map(|t| t as f64 * DT).collect();
    let mut xi = Vec::with_capacity(time_steps * rank);
    let mut q = Vec::with_capacity(time_steps);

    for &t in &time {
        let mut energy = 0.;
        for k in 0..rank {
            let freq = (k + 1) as f64;
            let amplitude = 1. / freq;
            let value = amplitude * (freq * t + k as f64).sin()
                + amplitude * NOISE * rng.gen_range(-1.0..1.0);

            energy += value * value;
            xi.push(value);
        }
        q.push(energy);
    }

    XiRecord { rank, xi, q, time }
}

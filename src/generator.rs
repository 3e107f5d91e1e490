use std::{path::Path, sync::Arc};

use log::{info, trace, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    batch::{forecast_window, history_window, scalar_forecast, EpochQueue, XiBatch},
    config::GeneratorConfig,
    data::XiData,
    error::{Result, XiError},
    split::{split_dataset, Split, SplitIndices},
};

/// Serves shuffled train/val/test batches of history and forecast windows
/// cut from a normalized Xi trajectory.
///
/// A generator is meant for a single consumer. Several generators can share
/// the same [`XiData`] through an `Arc`, each with its own queues and seed.
#[derive(Debug)]
pub struct XiGenerator {
    data: Arc<XiData>,
    config: GeneratorConfig,
    /// Number of valid sample positions
    m: usize,
    splits: SplitIndices,
    train_queue: EpochQueue,
    val_queue: EpochQueue,
    test_queue: EpochQueue,
    rng: StdRng,
}

impl XiGenerator {
    /// Loads `Xi_<r>` from `data_dir` and prepares the splits.
    pub fn new<P: AsRef<Path>>(config: GeneratorConfig, data_dir: P) -> Result<Self> {
        config.validate()?;
        let data = XiData::load(data_dir.as_ref(), config.r)?;
        Self::from_data(Arc::new(data), config)
    }

    pub fn from_data(data: Arc<XiData>, mut config: GeneratorConfig) -> Result<Self> {
        config.validate()?;

        if config.r != data.rank() {
            warn!(
                "config asks for r={} but the trajectory has {} coefficients, using {}",
                config.r,
                data.rank(),
                data.rank()
            );
            config.r = data.rank();
        }

        let rnn_input_len = config.rnn_input_len();
        let reserved = rnn_input_len + config.forecast_len();
        let time_steps = data.time_steps();
        if time_steps <= reserved {
            return Err(XiError::invalid(format!(
                "trajectory of {time_steps} steps is too short for m_hist={} n_steps={} stride={}",
                config.m_hist, config.n_steps, config.stride
            )));
        }
        let m = time_steps - reserved;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let splits = split_dataset(
            m,
            config.train_frac,
            config.val_frac,
            config.contiguous_sets,
            rnn_input_len,
            &mut rng,
        )?;

        let train_queue = EpochQueue::new(splits.train.clone(), &mut rng);
        let val_queue = EpochQueue::new(splits.val.clone(), &mut rng);
        let test_queue = EpochQueue::new(splits.test.clone(), &mut rng);

        let generator = Self {
            data,
            config,
            m,
            splits,
            train_queue,
            val_queue,
            test_queue,
            rng,
        };

        let (train, val, test) = generator.batches_per_epoch();
        info!(
            "generator ready: m={m} rnn_input_len={rnn_input_len}, batches per epoch train={train} val={val} test={test}"
        );

        Ok(generator)
    }

    pub fn next_train(&mut self) -> XiBatch {
        self.next(Split::Train)
    }

    pub fn next_val(&mut self) -> XiBatch {
        self.next(Split::Val)
    }

    /// Pops the next batch of `split`, refilling its queue once exhausted.
    pub fn next(&mut self, split: Split) -> XiBatch {
        self.serve(split, false)
    }

    /// With `return_inds` the batch also carries the sample indices it was cut
    /// from, to line forecasts up with [`XiGenerator::times_at`].
    pub fn next_test(&mut self, return_inds: bool) -> XiBatch {
        self.serve(Split::Test, return_inds)
    }

    fn serve(&mut self, split: Split, return_inds: bool) -> XiBatch {
        let queue = match split {
            Split::Train => &mut self.train_queue,
            Split::Val => &mut self.val_queue,
            Split::Test => &mut self.test_queue,
        };
        let batch_inds = queue.pop(self.config.batch_size, &mut self.rng);
        trace!("{} batch of {} samples", split.name(), batch_inds.len());

        let mut batch = self.get_batch(&batch_inds);
        if return_inds {
            batch.indices = Some(batch_inds);
        }
        batch
    }

    /// Cuts the windows for already shifted sample indices.
    ///
    /// # Panics
    ///
    /// If an index is outside `[rnn_input_len, rnn_input_len + m)`, where the
    /// windows would leave the trajectory.
    pub fn get_batch(&self, batch_inds: &[usize]) -> XiBatch {
        let GeneratorConfig {
            m_hist,
            n_steps,
            stride,
            return_q,
            ..
        } = self.config;

        XiBatch {
            history: history_window(self.data.xi(), batch_inds, m_hist, stride),
            forecast: forecast_window(self.data.xi(), batch_inds, n_steps, stride),
            q_forecast: return_q.then(|| scalar_forecast(self.data.q(), batch_inds, n_steps, stride)),
            indices: None,
        }
    }

    /// Batches needed to see every sample of (train, val, test) once.
    pub fn batches_per_epoch(&self) -> (usize, usize, usize) {
        self.splits.batches_per_epoch(self.config.batch_size)
    }

    /// Only affects future pops and the epoch bookkeeping; queued samples stay.
    pub fn set_batch_size(&mut self, batch_size: usize) -> Result<()> {
        if batch_size == 0 {
            return Err(XiError::invalid("batch_size must be at least 1"));
        }
        self.config.batch_size = batch_size;
        Ok(())
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn data(&self) -> &Arc<XiData> {
        &self.data
    }

    pub fn valid_samples(&self) -> usize {
        self.m
    }

    pub fn splits(&self) -> &SplitIndices {
        &self.splits
    }

    pub fn queue(&self, split: Split) -> &EpochQueue {
        match split {
            Split::Train => &self.train_queue,
            Split::Val => &self.val_queue,
            Split::Test => &self.test_queue,
        }
    }

    pub fn epochs_completed(&self, split: Split) -> usize {
        self.queue(split).epochs_completed()
    }

    /// Timestamps of the given sample indices, `None` if any of them is past
    /// the end of the trajectory.
    pub fn times_at(&self, indices: &[usize]) -> Option<Vec<f64>> {
        indices
            .iter()
            .map(|&i| self.data.time().get(i).copied())
            .collect()
    }
}

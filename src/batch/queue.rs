use std::collections::VecDeque;

use log::debug;
use rand::{seq::SliceRandom, Rng};

use crate::types::SampleIndices;

/// Samples of one split that have not been served yet in the current epoch.
///
/// Batches are popped from the front. As soon as a pop empties the queue it is
/// refilled with a fresh permutation of the whole split, so the queue never
/// stays empty between calls (unless the split itself is empty).
#[derive(Debug, Clone)]
pub struct EpochQueue {
    indices: SampleIndices,
    pending: VecDeque<usize>,
    epochs_completed: usize,
}

impl EpochQueue {
    pub fn new<R: Rng + ?Sized>(indices: SampleIndices, rng: &mut R) -> Self {
        let mut queue = Self {
            indices,
            pending: VecDeque::new(),
            epochs_completed: 0,
        };
        queue.refill(rng);
        queue
    }

    /// Pops up to `batch_size` indices; the last batch of an epoch may be short.
    pub fn pop<R: Rng + ?Sized>(&mut self, batch_size: usize, rng: &mut R) -> SampleIndices {
        let take = batch_size.min(self.pending.len());
        let batch: SampleIndices = self.pending.drain(..take).collect();

        if self.pending.is_empty() {
            self.epochs_completed += 1;
            self.refill(rng);
            debug!(
                "queue of {} samples exhausted, starting epoch {}",
                self.indices.len(),
                self.epochs_completed
            );
        }

        batch
    }

    fn refill<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut permutation = self.indices.clone();
        permutation.shuffle(rng);
        self.pending = permutation.into();
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn split_len(&self) -> usize {
        self.indices.len()
    }

    pub fn epochs_completed(&self) -> usize {
        self.epochs_completed
    }

    pub fn pending(&self) -> impl Iterator<Item = &usize> {
        self.pending.iter()
    }
}

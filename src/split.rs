//! Assignment of valid sample positions to the train, val and test sets.

use std::ops::Range;

use hashbrown::HashSet;
use log::info;
use rand::{seq::index::sample, Rng};

use crate::{
    config::{check_fractions, ContiguousSets},
    error::Result,
    types::SampleIndices,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn name(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

/// Number of samples in each set; always sums to `m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSizes {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SplitSizes {
    pub fn new(m: usize, train_frac: f64, val_frac: f64) -> Result<Self> {
        check_fractions(train_frac, val_frac)?;

        let train = ((m as f64 * train_frac).floor() as usize).min(m);
        let val = ((m as f64 * val_frac).floor() as usize).min(m - train);

        Ok(Self {
            train,
            val,
            test: m - train - val,
        })
    }

    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: SampleIndices,
    pub val: SampleIndices,
    pub test: SampleIndices,
}

impl SplitIndices {
    pub fn get(&self, split: Split) -> &[usize] {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    pub fn sizes(&self) -> SplitSizes {
        SplitSizes {
            train: self.train.len(),
            val: self.val.len(),
            test: self.test.len(),
        }
    }

    /// `ceil(len / batch_size)` for train, val and test.
    pub fn batches_per_epoch(&self, batch_size: usize) -> (usize, usize, usize) {
        (
            self.train.len().div_ceil(batch_size),
            self.val.len().div_ceil(batch_size),
            self.test.len().div_ceil(batch_size),
        )
    }

    /// Whether the three sets are disjoint and together cover exactly `range`.
    pub fn is_partition_of(&self, range: Range<usize>) -> bool {
        let mut seen = vec![false; range.len()];

        for &index in self.train.iter().chain(&self.val).chain(&self.test) {
            if !range.contains(&index) || seen[index - range.start] {
                return false;
            }
            seen[index - range.start] = true;
        }

        seen.into_iter().all(|s| s)
    }

    fn shift(&mut self, offset: usize) {
        for index in self
            .train
            .iter_mut()
            .chain(self.val.iter_mut())
            .chain(self.test.iter_mut())
        {
            *index += offset;
        }
    }
}

/// Splits `[0, m)` according to `policy`, then shifts every index by
/// `rnn_input_len` so each sample has room for its history window.
pub fn split_dataset<R: Rng + ?Sized>(
    m: usize,
    train_frac: f64,
    val_frac: f64,
    policy: ContiguousSets,
    rnn_input_len: usize,
    rng: &mut R,
) -> Result<SplitIndices> {
    let sizes = SplitSizes::new(m, train_frac, val_frac)?;
    let head = sizes.train + sizes.val;

    let mut splits = match policy {
        ContiguousSets::All => SplitIndices {
            train: (0..sizes.train).collect(),
            val: (sizes.train..head).collect(),
            test: (head..m).collect(),
        },
        ContiguousSets::Test => {
            let train = sample(rng, head, sizes.train).into_vec();
            let taken: HashSet<usize> = train.iter().copied().collect();

            SplitIndices {
                val: (0..head).filter(|i| !taken.contains(i)).collect(),
                train,
                test: (head..m).collect(),
            }
        }
        ContiguousSets::None => {
            let train = sample(rng, m, sizes.train).into_vec();
            let mut taken: HashSet<usize> = train.iter().copied().collect();

            let remaining: Vec<usize> = (0..m).filter(|i| !taken.contains(i)).collect();
            let val: Vec<usize> = sample(rng, remaining.len(), sizes.val)
                .into_iter()
                .map(|i| remaining[i])
                .collect();
            taken.extend(val.iter().copied());

            SplitIndices {
                train,
                val,
                test: (0..m).filter(|i| !taken.contains(i)).collect(),
            }
        }
    };

    splits.shift(rnn_input_len);

    debug_assert_eq!(splits.sizes(), sizes);
    debug_assert!(splits.is_partition_of(rnn_input_len..rnn_input_len + m));

    info!(
        "split {m} samples ({policy}): train={} val={} test={}",
        sizes.train, sizes.val, sizes.test
    );

    Ok(splits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XiError;
    use rand::{rngs::StdRng, SeedableRng};

    const POLICIES: [ContiguousSets; 3] =
        [ContiguousSets::All, ContiguousSets::Test, ContiguousSets::None];

    fn is_sorted(indices: &[usize]) -> bool {
        indices.windows(2).all(|w| w[0] < w[1])
    }

    #[test]
    fn sizes_use_floor_and_remainder() {
        let sizes = SplitSizes::new(8, 0.5, 0.25).unwrap();
        assert_eq!(sizes, SplitSizes { train: 4, val: 2, test: 2 });

        let sizes = SplitSizes::new(101, 0.7, 0.15).unwrap();
        assert_eq!(sizes, SplitSizes { train: 70, val: 15, test: 16 });
        assert_eq!(sizes.total(), 101);

        assert!(matches!(
            SplitSizes::new(10, 0.9, 0.1),
            Err(XiError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn every_policy_partitions_the_valid_range() {
        let mut rng = StdRng::seed_from_u64(0);

        for policy in POLICIES {
            for (m, offset) in [(1, 0), (8, 0), (37, 4), (250, 9)] {
                let splits = split_dataset(m, 0.6, 0.2, policy, offset, &mut rng).unwrap();
                let expected = SplitSizes::new(m, 0.6, 0.2).unwrap();

                assert_eq!(splits.sizes(), expected, "{policy} m={m}");
                assert_eq!(splits.sizes().total(), m);
                assert!(splits.is_partition_of(offset..offset + m), "{policy} m={m}");
            }
        }
    }

    #[test]
    fn contiguous_all_is_ordered_blocks() {
        let mut rng = StdRng::seed_from_u64(1);
        let splits = split_dataset(20, 0.5, 0.25, ContiguousSets::All, 0, &mut rng).unwrap();

        assert_eq!(splits.train, (0..10).collect::<Vec<_>>());
        assert_eq!(splits.val, (10..15).collect::<Vec<_>>());
        assert_eq!(splits.test, (15..20).collect::<Vec<_>>());
    }

    #[test]
    fn contiguous_test_keeps_test_as_the_suffix() {
        let mut rng = StdRng::seed_from_u64(2);
        let splits = split_dataset(40, 0.5, 0.25, ContiguousSets::Test, 0, &mut rng).unwrap();

        assert_eq!(splits.test, (30..40).collect::<Vec<_>>());
        assert!(is_sorted(&splits.val));

        let mut head: Vec<usize> = splits.train.iter().chain(&splits.val).copied().collect();
        head.sort_unstable();
        assert_eq!(head, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn contiguous_none_interleaves_all_sets() {
        let mut rng = StdRng::seed_from_u64(3);
        let splits = split_dataset(200, 0.5, 0.25, ContiguousSets::None, 0, &mut rng).unwrap();

        assert!(is_sorted(&splits.test));
        // a random draw of 50 out of 200 landing entirely in the final quarter
        // is not a realistic outcome
        assert!(splits.test.iter().any(|&i| i < 150));
        assert!(splits.is_partition_of(0..200));
    }

    #[test]
    fn indices_are_shifted_by_the_history_length() {
        let mut rng = StdRng::seed_from_u64(4);
        let splits = split_dataset(10, 0.5, 0.2, ContiguousSets::All, 6, &mut rng).unwrap();

        assert_eq!(splits.train, vec![6, 7, 8, 9, 10]);
        assert_eq!(splits.val, vec![11, 12]);
        assert_eq!(splits.test, vec![13, 14, 15]);
    }

    #[test]
    fn same_seed_same_split() {
        let a = split_dataset(64, 0.7, 0.15, ContiguousSets::None, 2, &mut StdRng::seed_from_u64(5));
        let b = split_dataset(64, 0.7, 0.15, ContiguousSets::None, 2, &mut StdRng::seed_from_u64(5));
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn batches_per_epoch_rounds_up() {
        let splits = SplitIndices {
            train: (0..10).collect(),
            val: (10..13).collect(),
            test: vec![],
        };

        assert_eq!(splits.batches_per_epoch(4), (3, 1, 0));
        assert_eq!(splits.batches_per_epoch(1), (10, 3, 0));
    }

    #[test]
    fn partition_check_catches_overlap_and_gaps() {
        let overlapping = SplitIndices {
            train: vec![0, 1],
            val: vec![1],
            test: vec![2],
        };
        assert!(!overlapping.is_partition_of(0..4));

        let gapped = SplitIndices {
            train: vec![0],
            val: vec![1],
            test: vec![3],
        };
        assert!(!gapped.is_partition_of(0..4));
    }
}

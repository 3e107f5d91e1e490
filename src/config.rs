use std::{fmt, path::Path, str::FromStr};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    constants::defaults,
    error::{Result, XiError},
};

/// How the train/val/test sample positions are laid out in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContiguousSets {
    /// Train, val and test are consecutive blocks, in that order
    All,
    /// Test is the final block, train and val are interleaved before it
    Test,
    /// All three sets are interleaved
    None,
}

impl FromStr for ContiguousSets {
    type Err = XiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(ContiguousSets::All),
            "test" => Ok(ContiguousSets::Test),
            "none" => Ok(ContiguousSets::None),
            other => Err(XiError::invalid(format!(
                "contiguous_sets option not recognized: {other:?}"
            ))),
        }
    }
}

impl fmt::Display for ContiguousSets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContiguousSets::All => "all",
            ContiguousSets::Test => "test",
            ContiguousSets::None => "none",
        };
        f.write_str(s)
    }
}

/// Construction parameters of a [`crate::XiGenerator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Latent rank, selects which record is loaded
    pub r: usize,
    /// Forecast horizon
    pub n_steps: usize,
    pub batch_size: usize,
    /// History window length
    pub m_hist: usize,
    /// Spacing between consecutive history and forecast points
    pub stride: usize,
    pub train_frac: f64,
    pub val_frac: f64,
    pub contiguous_sets: ContiguousSets,
    /// Whether batches carry the scalar forecast target
    pub return_q: bool,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            r: defaults::RANK,
            n_steps: defaults::N_STEPS,
            batch_size: defaults::BATCH_SIZE,
            m_hist: defaults::M_HIST,
            stride: defaults::STRIDE,
            train_frac: defaults::TRAIN_FRAC,
            val_frac: defaults::VAL_FRAC,
            contiguous_sets: ContiguousSets::Test,
            return_q: false,
            seed: defaults::SEED,
        }
    }
}

impl GeneratorConfig {
    /// Parses a TOML table of generator settings; missing keys keep their
    /// defaults.
    ///
    /// An unrecognized `contiguous_sets` is an
    /// [`XiError::InvalidConfiguration`], not a parse error.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(s)?;

        let contiguous_sets = match table.remove("contiguous_sets") {
            Some(toml::Value::String(name)) => Some(name.parse::<ContiguousSets>()?),
            Some(other) => {
                return Err(XiError::invalid(format!(
                    "contiguous_sets must be a string, got {other}"
                )))
            }
            None => None,
        };

        let mut config: GeneratorConfig = table.try_into()?;
        if let Some(contiguous_sets) = contiguous_sets {
            config.contiguous_sets = contiguous_sets;
        }
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Rows of lookback needed in front of the first sample.
    pub fn rnn_input_len(&self) -> usize {
        self.m_hist.saturating_sub(1) * self.stride
    }

    /// Rows of lookahead needed after the last sample.
    pub fn forecast_len(&self) -> usize {
        self.n_steps * self.stride
    }

    pub fn validate(&self) -> Result<()> {
        check_fractions(self.train_frac, self.val_frac)?;

        if self.batch_size == 0 {
            return Err(XiError::invalid("batch_size must be at least 1"));
        }
        if self.m_hist == 0 {
            return Err(XiError::invalid("m_hist must be at least 1"));
        }
        if self.stride == 0 {
            return Err(XiError::invalid("stride must be at least 1"));
        }
        if self.n_steps == 0 {
            return Err(XiError::invalid("n_steps must be at least 1"));
        }

        Ok(())
    }
}

pub(crate) fn check_fractions(train_frac: f64, val_frac: f64) -> Result<()> {
    if !(train_frac >= 0.0 && val_frac >= 0.0) {
        return Err(XiError::invalid(format!(
            "split fractions must be non-negative, got train_frac={train_frac} val_frac={val_frac}"
        )));
    }
    if train_frac + val_frac >= 1.0 {
        return Err(XiError::invalid(format!(
            "train_frac + val_frac must be < 1, got {}",
            train_frac + val_frac
        )));
    }
    Ok(())
}

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::{
    constants::files::{RECORD_EXTENSION, RECORD_PREFIX},
    data::normalize::{standardize_columns, ColumnStats},
    error::{Result, XiError},
    types::{Series, Trajectory},
};

/// Persisted output of the reduction stage for one latent rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XiRecord {
    pub rank: usize,
    /// Row major, `time.len()` rows of `rank` coefficients
    pub xi: Vec<f64>,
    pub q: Vec<f64>,
    pub time: Vec<f64>,
}

impl XiRecord {
    pub fn rows(&self) -> usize {
        self.time.len()
    }
}

pub fn record_path(data_dir: &Path, r: usize) -> PathBuf {
    data_dir.join(format!("{RECORD_PREFIX}{r}.{RECORD_EXTENSION}"))
}

pub fn load_record(data_dir: &Path, r: usize) -> Result<XiRecord> {
    let path = record_path(data_dir, r);
    if !path.is_file() {
        return Err(XiError::DataNotFound { r, path });
    }

    let bytes = fs::read(&path)?;
    let record: XiRecord = postcard::from_bytes(&bytes)?;
    debug!("read {} bytes from {}", bytes.len(), path.display());

    Ok(record)
}

/// Writes `record` under `data_dir`, creating the folder if needed.
pub fn save_record(data_dir: &Path, record: &XiRecord) -> Result<PathBuf> {
    fs::create_dir_all(data_dir)?;

    let path = record_path(data_dir, record.rank);
    let encoded = postcard::to_stdvec(record)?;
    fs::write(&path, encoded)?;

    Ok(path)
}

/// Normalized, read-only arrays for one latent rank.
///
/// Wrap in an `Arc` to share between several generators.
#[derive(Debug, Clone)]
pub struct XiData {
    xi: Trajectory,
    q: Series,
    time: Series,
    stats: ColumnStats,
}

impl XiData {
    pub fn load(data_dir: &Path, r: usize) -> Result<Self> {
        let record = load_record(data_dir, r)?;
        let data = Self::from_record(record)?;
        info!(
            "loaded Xi for r={r}: {} time steps x {} coefficients",
            data.time_steps(),
            data.rank()
        );
        Ok(data)
    }

    pub fn from_record(record: XiRecord) -> Result<Self> {
        let rows = record.rows();
        let XiRecord { rank, xi, q, time } = record;

        if rows == 0 || rank == 0 {
            return Err(XiError::MalformedRecord(format!(
                "empty trajectory ({rows} rows, rank {rank})"
            )));
        }
        if q.len() != rows {
            return Err(XiError::MalformedRecord(format!(
                "q has {} entries but time has {rows}",
                q.len()
            )));
        }

        let mut xi = Array2::from_shape_vec((rows, rank), xi).map_err(|e| {
            XiError::MalformedRecord(format!("Xi does not fit {rows} x {rank}: {e}"))
        })?;
        let stats = standardize_columns(&mut xi)?;

        Ok(Self {
            xi,
            q: Array1::from(q),
            time: Array1::from(time),
            stats,
        })
    }

    pub fn xi(&self) -> &Trajectory {
        &self.xi
    }

    pub fn q(&self) -> &Series {
        &self.q
    }

    pub fn time(&self) -> &Series {
        &self.time
    }

    pub fn stats(&self) -> &ColumnStats {
        &self.stats
    }

    pub fn time_steps(&self) -> usize {
        self.xi.nrows()
    }

    pub fn rank(&self) -> usize {
        self.xi.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Axis;
    use tempfile::TempDir;

    fn ramp_record(rows: usize, rank: usize) -> XiRecord {
        XiRecord {
            rank,
            xi: (0..rows * rank).map(|v| v as f64).collect(),
            q: (0..rows).map(|t| t as f64 * 0.5).collect(),
            time: (0..rows).map(|t| t as f64 * 0.1).collect(),
        }
    }

    #[test]
    fn missing_rank_is_data_not_found() {
        let dir = TempDir::new().unwrap();
        let err = XiData::load(dir.path(), 7).unwrap_err();

        match err {
            XiError::DataNotFound { r, path } => {
                assert_eq!(r, 7);
                assert!(path.ends_with("Xi_7.bin"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn saved_record_loads_normalized() {
        let dir = TempDir::new().unwrap();
        let record = ramp_record(10, 3);
        let path = save_record(dir.path(), &record).unwrap();
        assert_eq!(path, record_path(dir.path(), 3));

        assert_eq!(load_record(dir.path(), 3).unwrap(), record);

        let data = XiData::load(dir.path(), 3).unwrap();
        assert_eq!(data.time_steps(), 10);
        assert_eq!(data.rank(), 3);
        assert_eq!(data.q()[4], 2.0);
        assert_abs_diff_eq!(data.time()[9], 0.9, epsilon = 1e-12);

        let mean = data.xi().mean_axis(Axis(0)).unwrap();
        let std = data.xi().std_axis(Axis(0), 0.0);
        for k in 0..3 {
            assert_abs_diff_eq!(mean[k], 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(std[k], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let dir = TempDir::new().unwrap();
        fs::write(record_path(dir.path(), 2), [0xff, 0xff, 0xff]).unwrap();

        assert!(matches!(load_record(dir.path(), 2), Err(XiError::Decode(_))));
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let mut record = ramp_record(6, 2);
        record.xi.pop();
        assert!(matches!(
            XiData::from_record(record),
            Err(XiError::MalformedRecord(_))
        ));

        let mut record = ramp_record(6, 2);
        record.q.push(1.0);
        assert!(matches!(
            XiData::from_record(record),
            Err(XiError::MalformedRecord(_))
        ));

        assert!(matches!(
            XiData::from_record(ramp_record(0, 2)),
            Err(XiError::MalformedRecord(_))
        ));
    }
}

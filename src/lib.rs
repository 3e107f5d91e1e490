pub mod batch;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod generator;
pub mod split;
pub mod types;

pub use batch::{HistoryBatch, XiBatch};
pub use config::{ContiguousSets, GeneratorConfig};
pub use data::{XiData, XiRecord};
pub use error::{Result, XiError};
pub use generator::XiGenerator;
pub use split::{Split, SplitIndices, SplitSizes};

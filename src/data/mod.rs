pub mod normalize;
pub mod source;
pub mod synth;

pub use normalize::ColumnStats;
pub use source::{load_record, record_path, save_record, XiData, XiRecord};
pub use synth::synthetic_record;

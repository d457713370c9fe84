pub mod config;
pub mod error;
pub mod types;

pub use config::{FootprintConfig, MaskConfig, StoreConfig, TrackerConfig};
pub use error::{MaskError, Result};
pub use types::{SubmeshIndex, UvRect};

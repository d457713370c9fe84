use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaskError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid region '{part}': {reason}")]
    InvalidRegion { part: String, reason: String },

    #[error("Invalid growth buffer: {0}")]
    InvalidGrowthBuffer(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, MaskError>;

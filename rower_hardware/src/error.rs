//! Hardware-layer errors.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("unsupported on this platform: {0}")]
    Unsupported(&'static str),
}

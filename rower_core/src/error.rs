//! Build-time errors for the rowing engine.
//!
//! The impulse hot path never returns errors: noise is absorbed by the flank
//! detector, pauses are dropped, and queue overflow is a counted soft
//! failure. Everything that can fail does so once, at construction.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid settings: {0}")]
    InvalidSettings(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

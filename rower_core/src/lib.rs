#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Rowing physics core (hardware-agnostic).
//!
//! From a sparse stream of flywheel impulse timings this crate infers the
//! biomechanics of a rowing stroke and derives cadence, power, distance,
//! speed, and a self-calibrated drag factor. Hardware is reached only
//! through `rower_traits::CycleCounter`.
//!
//! ## Pipeline
//!
//! ```text
//! sensor edge -> EdgeHandle (interrupt context, integer only)
//!             -> bounded queue (drop on full)
//!             -> worker (cycles -> seconds)
//!             -> FlankDetector -> RowingEngine state machine & physics
//!             -> RowerSnapshot cell + RowingObserver callbacks
//! ```
//!
//! - **averager**: O(1) sliding mean with in-place retro-correction
//! - **flank**: bounds filter, change limiter, drive/recovery trend detection
//! - **engine**: DRIVE/RECOVERY alternation, torque, cycle power and speed,
//!   drag auto-calibration, session accounting
//! - **source**/**worker**: the acquisition boundary and its drain thread
//!
//! Everything on the per-impulse path is allocation-free and bounded-time;
//! all fallible work happens once, at construction.

pub mod averager;
pub mod conversions;
pub mod engine;
pub mod error;
pub mod flank;
pub mod mocks;
pub mod observer;
pub mod settings;
pub mod snapshot;
pub mod source;
pub mod util;
pub mod worker;

pub use averager::MovingAverager;
pub use engine::RowingEngine;
pub use error::{BuildError, Result};
pub use flank::FlankDetector;
pub use observer::{NullObserver, RowingObserver};
pub use settings::RowerSettings;
pub use snapshot::{RowerSnapshot, RowerState, SnapshotHandle};
pub use source::{EdgeHandle, ImpulseSource, SourceControl};
pub use worker::ImpulseWorker;

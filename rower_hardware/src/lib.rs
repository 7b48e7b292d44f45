#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Edge delivery backends for the impulse pipeline.
//!
//! Both backends hand each sensor edge to a caller-supplied sink (in
//! practice `EdgeHandle::on_edge` from the core crate, but any `Fn()` will
//! do, which keeps this crate free of core dependencies):
//!
//! - `SimulatedFlywheel` replays a list of inter-impulse intervals from a
//!   thread, for demos and end-to-end tests without a rower.
//! - `GpioEdgeInput` (feature `hardware`, Linux only) arms a real GPIO
//!   interrupt via rppal.

pub mod error;

pub use error::HwError;

use rower_traits::{Clock, MonotonicClock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Replays a recorded or synthetic impulse stream against an edge sink,
/// sleeping each interval like a coasting flywheel would.
///
/// Safety: spawns exactly one thread, shut down and joined on drop.
pub struct SimulatedFlywheel {
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl SimulatedFlywheel {
    /// Start replaying `intervals` (seconds). The sink is called once before
    /// the first interval, so the consumer sees a priming edge exactly like
    /// real hardware would produce.
    pub fn spawn<F>(intervals: Vec<f64>, on_edge: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        Self::spawn_with_clock(intervals, on_edge, MonotonicClock::new())
    }

    /// Same, with an explicit clock for paced replay under test control.
    pub fn spawn_with_clock<F, C>(intervals: Vec<f64>, on_edge: F, clock: C) -> Self
    where
        F: Fn() + Send + 'static,
        C: Clock + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);

        let join_handle = std::thread::spawn(move || {
            on_edge();
            for &dt in &intervals {
                if shutdown_flag.load(Ordering::Relaxed) {
                    tracing::debug!("simulated flywheel received shutdown signal");
                    break;
                }
                clock.sleep(Duration::from_secs_f64(dt.max(0.0)));
                on_edge();
            }
            tracing::trace!("simulated flywheel thread exiting");
        });

        Self {
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Block until the whole stream has been delivered (or shutdown).
    pub fn join(mut self) {
        if let Some(handle) = self.join_handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("simulated flywheel thread panicked");
        }
    }
}

impl Drop for SimulatedFlywheel {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("simulated flywheel thread panicked during shutdown");
        }
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
mod gpio {
    use super::HwError;
    use rppal::gpio::{Gpio, InputPin, Trigger};

    /// Rising-edge (or falling, for active-low wiring) GPIO interrupt that
    /// forwards each trigger to the edge sink. The interrupt stays armed for
    /// the lifetime of this value.
    pub struct GpioEdgeInput {
        pin: InputPin,
    }

    impl GpioEdgeInput {
        pub fn attach<F>(bcm_pin: u8, active_low: bool, on_edge: F) -> Result<Self, HwError>
        where
            F: Fn() + Send + 'static,
        {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let mut pin = gpio
                .get(bcm_pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_input();
            let trigger = if active_low {
                Trigger::FallingEdge
            } else {
                Trigger::RisingEdge
            };
            pin.set_async_interrupt(trigger, move |_level| on_edge())
                .map_err(|e| HwError::Gpio(e.to_string()))?;
            tracing::info!(bcm_pin, active_low, "impulse sensor interrupt armed");
            Ok(Self { pin })
        }

        pub fn detach(mut self) -> Result<(), HwError> {
            self.pin
                .clear_async_interrupt()
                .map_err(|e| HwError::Gpio(e.to_string()))
        }
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use gpio::GpioEdgeInput;

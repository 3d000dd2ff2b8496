//! Fixed-period node driver
//!
//! Runs one node's tick function at a configured rate on the calling
//! thread. Ticks never overlap: a tick that overruns its period defers
//! the next one (with a warning) rather than running concurrently.
//! Recoverable tick errors are logged and the loop continues; a fatal
//! error stops the loop and propagates so main can exit nonzero.

use crate::error::NodeError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

pub fn run_node<F>(
    name: &str,
    rate_hz: f64,
    shutdown: &AtomicBool,
    mut tick: F,
) -> Result<(), NodeError>
where
    F: FnMut(Instant) -> Result<(), NodeError>,
{
    let period = if rate_hz > 0.0 {
        Duration::from_secs_f64(1.0 / rate_hz)
    } else {
        log::warn!("{} node: invalid rate {} Hz, falling back to 1 Hz", name, rate_hz);
        Duration::from_secs(1)
    };

    log::info!("{} node running at {:.1} Hz", name, 1.0 / period.as_secs_f64());

    while !shutdown.load(Ordering::Relaxed) {
        let cycle_start = Instant::now();

        match tick(cycle_start) {
            Ok(()) => {}
            Err(e) if e.is_fatal() => {
                log::error!("{} node: {}", name, e);
                return Err(e);
            }
            Err(e) => {
                log::error!("{} node tick failed: {}", name, e);
            }
        }

        let elapsed = cycle_start.elapsed();
        match period.checked_sub(elapsed) {
            Some(remaining) => thread::sleep(remaining),
            None => {
                log::warn!(
                    "{} node tick overran its period: {:?} > {:?}",
                    name,
                    elapsed,
                    period
                );
            }
        }
    }

    log::info!("{} node stopped", name);
    Ok(())
}

//! Continuous-time motion model.
//!
//! Axes keep moving at their last commanded speed between messages. Before a
//! received chunk is dispatched, the state is caught up to the wall clock.

use std::time::{Duration, Instant};

use crate::state::DeviceState;

/// Advance every axis by the time elapsed since the last update.
///
/// A `now` earlier than the last update counts as zero elapsed time and
/// leaves the clock where it was. Returns the elapsed time applied.
pub fn advance(state: &mut DeviceState, now: Instant) -> Duration {
    let elapsed = now.saturating_duration_since(state.last_update());
    let seconds = elapsed.as_secs_f64();
    for axis in state.axes_mut() {
        axis.advance(seconds);
    }
    if now > state.last_update() {
        state.set_last_update(now);
    }
    elapsed
}

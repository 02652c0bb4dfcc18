//! Linear cooling ramp integrator.
//!
//! While a channel is in the Cooling phase its live setpoint is lowered at a
//! configured rate until it meets the floor. Integration uses the measured
//! elapsed time between control ticks: the tick cadence is best-effort and
//! drifts under load, so assuming the nominal interval would accumulate
//! ramp-rate error over a long run.

/// One integration step: `max(floor, setpoint - rate * elapsed_minutes)`.
pub fn integrate(setpoint_c: f32, floor_c: f32, rate_c_per_min: f32, elapsed_ms: u64) -> f32 {
    let elapsed_min = elapsed_ms as f32 / 60_000.0;
    let next = setpoint_c - rate_c_per_min * elapsed_min;
    next.max(floor_c)
}

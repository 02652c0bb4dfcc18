//! Shared mutable context threaded through every phase handler.
//!
//! `ChannelContext` is the single struct that phase handlers read from and
//! write to — one per channel. It carries the channel's live parameters,
//! the last sensor reading, the actuation state, and the tick timing
//! injected by the scheduler. Think of it as the "blackboard" in a
//! blackboard architecture.

use crate::config::ChannelConfig;

/// The shared context passed to every phase handler function.
pub struct ChannelContext {
    /// Channel index (ascending, fixed at startup). Used in log lines.
    pub index: usize,

    // -- Parameters --
    /// Live channel parameters. `config.setpoint_c` is mutated downward by
    /// the Cooling handler; a configuration update replaces fields wholesale.
    pub config: ChannelConfig,

    // -- Sensor data --
    /// Last valid temperature, or `None` while the probe is unavailable.
    pub reading: Option<f32>,

    // -- Actuation --
    /// Current output (heater relay) state.
    pub output_on: bool,
    /// True only on the tick where the output went OFF -> ON.
    pub output_rose: bool,

    // -- Timing (written by the scheduler before each tick) --
    /// Monotonic timestamp of the current tick (milliseconds).
    pub now_ms: u64,
    /// Measured wall time since the previous control tick (milliseconds).
    pub elapsed_ms: u64,
    /// Monotonic timestamp at which the current non-Idle phase was entered.
    pub phase_start_ms: u64,
}

impl ChannelContext {
    /// Create a context for one channel with its startup parameters.
    pub fn new(index: usize, config: ChannelConfig) -> Self {
        Self {
            index,
            config,
            reading: None,
            output_on: false,
            output_rose: false,
            now_ms: 0,
            elapsed_ms: 0,
            phase_start_ms: 0,
        }
    }

    /// Milliseconds spent in the current phase.
    pub fn ms_in_phase(&self) -> u64 {
        self.now_ms.saturating_sub(self.phase_start_ms)
    }

    /// Hold time left at `now_ms` before the cooling ramp begins, floored
    /// at zero. Meaningful only while the channel is in Hold; takes the
    /// query time explicitly because snapshots are read between ticks.
    pub fn remaining_hold_ms(&self, now_ms: u64) -> u64 {
        self.config
            .hold_duration_ms()
            .saturating_sub(now_ms.saturating_sub(self.phase_start_ms))
    }
}

//! System configuration parameters
//!
//! All tunable parameters for the gelstat controller. Channel parameters are
//! mutable at runtime through the configuration gateway; everything here is
//! volatile and reverts to these defaults on restart.

use heapless::Vec;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of controlled channels (stack-allocated).
pub const MAX_CHANNELS: usize = 8;

/// Number of channels populated by the default build (matches the bench rig).
pub const DEFAULT_CHANNELS: usize = 7;

/// Display names for the default channel set, in channel-index order.
pub const CHANNEL_NAMES: [&str; DEFAULT_CHANNELS] = [
    "Syringe", "Sample 1", "Sample 2", "Sample 3", "Sample 4", "Sample 5", "Sample 6",
];

/// Human-readable name for a channel index (falls back past the named set).
pub fn channel_name(index: usize) -> &'static str {
    CHANNEL_NAMES.get(index).copied().unwrap_or("Channel")
}

/// Per-channel process parameters.
///
/// `setpoint_c` doubles as the live setpoint: the cooling ramp mutates it in
/// place, so after a completed cycle it reads back as the floor value, not
/// the originally configured target. Field-compatible with the bench
/// deployments, so the coupling is preserved on purpose.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Target temperature (°C). Live value — ramped downward during Cooling.
    pub setpoint_c: f32,
    /// Setpoint decrease rate during Cooling (°C per minute). Must be >= 0.
    pub cooling_rate_c_per_min: f32,
    /// Minimum setpoint the cooling ramp may reach (°C).
    pub floor_c: f32,
    /// Duration to hold after the setpoint is first reached (minutes).
    pub hold_duration_min: u32,
}

impl ChannelConfig {
    /// Hold duration normalized to milliseconds.
    pub fn hold_duration_ms(&self) -> u64 {
        u64::from(self.hold_duration_min) * 60_000
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            setpoint_c: 60.0,
            cooling_rate_c_per_min: 1.0,
            floor_c: 37.0,
            hold_duration_min: 60,
        }
    }
}

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Dead band below the setpoint that suppresses output chatter (°C).
    pub hysteresis_c: f32,

    // --- Timing ---
    /// Sensor read interval (milliseconds).
    pub sensor_read_interval_ms: u32,
    /// Control loop interval (milliseconds).
    pub control_loop_interval_ms: u32,

    /// Per-channel parameters. Length fixes the channel count at startup.
    pub channels: Vec<ChannelConfig, MAX_CHANNELS>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut channels = Vec::new();
        for _ in 0..DEFAULT_CHANNELS {
            // Capacity is MAX_CHANNELS >= DEFAULT_CHANNELS.
            let _ = channels.push(ChannelConfig::default());
        }
        Self {
            hysteresis_c: 0.5,
            sensor_read_interval_ms: 2000,
            control_loop_interval_ms: 500,
            channels,
        }
    }
}

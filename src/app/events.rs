//! Outbound application events.
//!
//! The [`ControlService`](super::service::ControlService) emits these through
//! the [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them — log to serial, feed the status page,
//! etc. The core itself raises no alarms; reporting is a collaborator
//! concern.

use crate::fsm::Phase;
use serde::Serialize;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, Copy)]
pub enum AppEvent {
    /// The control service has started (carries the channel count).
    Started { channels: usize },

    /// A channel's phase machine transitioned.
    PhaseChanged {
        channel: usize,
        from: Phase,
        to: Phase,
    },

    /// A channel's heater output changed state.
    OutputChanged { channel: usize, on: bool },

    /// A channel's probe stopped answering; its control logic is frozen
    /// until a valid reading returns.
    SensorLost { channel: usize },

    /// A previously lost probe answered again.
    SensorRecovered { channel: usize, celsius: f32 },

    /// A parameter update was validated and applied to a channel.
    ConfigApplied { channel: usize },
}

/// Read-only per-channel status for the reporting boundary.
///
/// `remaining_hold_ms` is hold duration minus elapsed, floored at zero, and
/// only non-zero while the channel is in Hold. `setpoint_c` is the live
/// value — during and after Cooling it reflects the ramp, not the original
/// target.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChannelSnapshot {
    pub channel: usize,
    pub name: &'static str,
    pub reading_c: Option<f32>,
    pub setpoint_c: f32,
    pub phase: Phase,
    pub remaining_hold_ms: u64,
}

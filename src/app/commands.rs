//! Inbound commands to the control service.
//!
//! These represent actions requested by the outside world (the status UI's
//! request handler, serial console, test rigs) that the
//! [`ControlService`](super::service::ControlService) interprets and acts
//! upon. Delivering updates as discrete commands keeps the cross-context
//! write atomic with respect to the control tick.

/// Partial update for one channel's parameters.
///
/// Each field is independently optional; omitted fields keep their current
/// value. In particular an update that omits `setpoint_c` leaves the live
/// (possibly ramp-decayed) setpoint in place.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelConfigUpdate {
    pub setpoint_c: Option<f32>,
    pub cooling_rate_c_per_min: Option<f32>,
    pub floor_c: Option<f32>,
    pub hold_duration_min: Option<u32>,
}

/// Commands that external adapters can send into the control core.
#[derive(Debug, Clone, Copy)]
pub enum AppCommand {
    /// Apply a validated parameter update to one channel.
    ApplyChannelConfig {
        channel: usize,
        update: ChannelConfigUpdate,
    },

    /// Abort the current cycle of one channel back to Idle (debug / bench).
    ResetChannel(usize),
}

//! Control service — the hexagonal core.
//!
//! [`ControlService`] owns one phase machine and blackboard context per
//! channel and exposes a clean, hardware-agnostic API. All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  TemperatureSource ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                        │       ControlService        │
//!        OutputSink ◀────│  Hysteresis · Phase · Ramp  │
//!                        └────────────────────────────┘
//! ```
//!
//! The service is the single writer of all channel state: the scheduler
//! drives `refresh_readings`/`control_tick` from the control loop, and
//! configuration updates arrive through `apply_channel_config`. Both take
//! `&mut self`, so within one context a torn read is impossible; the
//! cross-thread discipline (request handler vs. control loop) is a
//! short-held mutex around the whole service, owned by the binary.

use log::{info, warn};

use crate::config::{ChannelConfig, SystemConfig, channel_name, MAX_CHANNELS};
use crate::control::hysteresis;
use crate::error::{ConfigError, Error};
use crate::fsm::context::ChannelContext;
use crate::fsm::states::build_phase_table;
use crate::fsm::{Phase, PhaseFsm};

use super::commands::{AppCommand, ChannelConfigUpdate};
use super::events::{AppEvent, ChannelSnapshot};
use super::ports::{EventSink, OutputSink, TemperatureSource};

// ───────────────────────────────────────────────────────────────
// Per-channel slot
// ───────────────────────────────────────────────────────────────

/// One channel's machine plus its blackboard. Channels are structured
/// records, not parallel arrays — index alignment is by construction.
struct ChannelSlot {
    fsm: PhaseFsm,
    cx: ChannelContext,
    /// Whether a SensorLost event has been emitted for the current outage.
    lost_reported: bool,
}

// ───────────────────────────────────────────────────────────────
// ControlService
// ───────────────────────────────────────────────────────────────

/// The control service orchestrates all domain logic.
pub struct ControlService {
    channels: heapless::Vec<ChannelSlot, MAX_CHANNELS>,
    hysteresis_c: f32,
    tick_count: u64,
}

impl ControlService {
    /// Construct the service from configuration. Every channel starts in
    /// Idle with its output off and no reading.
    pub fn new(config: &SystemConfig) -> Self {
        let mut channels = heapless::Vec::new();
        for (index, ch) in config.channels.iter().enumerate() {
            let slot = ChannelSlot {
                fsm: PhaseFsm::new(build_phase_table(), Phase::Idle),
                cx: ChannelContext::new(index, *ch),
                lost_reported: false,
            };
            // Config channel count is bounded by MAX_CHANNELS.
            let _ = channels.push(slot);
        }
        Self {
            channels,
            hysteresis_c: config.hysteresis_c,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce startup. The binary has already driven every output low.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            channels: self.channels.len(),
        });
        info!("control service started with {} channels", self.channels.len());
    }

    // ── Reading-refresh task (sensor cadence, ~2 s) ───────────

    /// Poll the temperature source once for every channel.
    ///
    /// A probe that does not answer marks only its own channel unavailable;
    /// the others are untouched. The frozen channel resumes on the first
    /// valid reading of a later cycle.
    pub fn refresh_readings(
        &mut self,
        source: &mut impl TemperatureSource,
        sink: &mut impl EventSink,
    ) {
        source.request_conversion();
        for slot in &mut self.channels {
            let index = slot.cx.index;
            match source.read_temperature(index) {
                Some(celsius) => {
                    if slot.lost_reported {
                        slot.lost_reported = false;
                        info!("channel {index}: probe recovered at {celsius:.2} degC");
                        sink.emit(&AppEvent::SensorRecovered {
                            channel: index,
                            celsius,
                        });
                    }
                    slot.cx.reading = Some(celsius);
                }
                None => {
                    if !slot.lost_reported {
                        slot.lost_reported = true;
                        warn!("channel {index}: probe not answering, control frozen");
                        sink.emit(&AppEvent::SensorLost { channel: index });
                    }
                    slot.cx.reading = None;
                }
            }
        }
    }

    // ── Control task (control cadence, ~500 ms) ───────────────

    /// Run one control tick over all channels in ascending index order.
    ///
    /// Per channel: hysteresis output decision → actuation command on
    /// change → phase machine tick (transitions and, in Cooling, the ramp
    /// integration over `elapsed_ms`). A channel without a valid reading is
    /// skipped entirely — state frozen, no transitions — but wall-clock
    /// phase timing still advances because it is timestamp-based.
    pub fn control_tick(
        &mut self,
        now_ms: u64,
        elapsed_ms: u64,
        outputs: &mut impl OutputSink,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        for slot in &mut self.channels {
            let index = slot.cx.index;
            let Some(reading) = slot.cx.reading else {
                continue;
            };

            slot.cx.now_ms = now_ms;
            slot.cx.elapsed_ms = elapsed_ms;

            // 1. Output hysteresis — unconditional, phase-independent,
            //    always against the live (possibly ramped) setpoint.
            let was_on = slot.cx.output_on;
            let on = hysteresis::evaluate(
                reading,
                slot.cx.config.setpoint_c,
                self.hysteresis_c,
                was_on,
            );
            slot.cx.output_on = on;
            slot.cx.output_rose = on && !was_on;

            if on != was_on {
                info!(
                    "channel {index}: output {} at {reading:.2} degC (setpoint {:.2})",
                    if on { "ON" } else { "OFF" },
                    slot.cx.config.setpoint_c,
                );
                outputs.set_output(index, on);
                sink.emit(&AppEvent::OutputChanged { channel: index, on });
            }

            // 2. Phase transitions and cooling ramp.
            let prev_phase = slot.fsm.current_phase();
            slot.fsm.tick(&mut slot.cx);
            let phase = slot.fsm.current_phase();
            if phase != prev_phase {
                sink.emit(&AppEvent::PhaseChanged {
                    channel: index,
                    from: prev_phase,
                    to: phase,
                });
            }
        }
    }

    // ── Configuration gateway ─────────────────────────────────

    /// Apply a parameter update to one channel, all-or-nothing.
    ///
    /// Validation happens against the *effective* values (supplied fields
    /// merged over current ones) before anything is written; a rejected
    /// update leaves the channel exactly as it was. On success the channel's
    /// phase resets to Idle and the output is left for the next tick to
    /// re-evaluate. The live setpoint persists unless the caller supplied a
    /// new one.
    pub fn apply_channel_config(
        &mut self,
        channel: usize,
        update: ChannelConfigUpdate,
    ) -> Result<(), ConfigError> {
        let slot = self
            .channels
            .get_mut(channel)
            .ok_or(ConfigError::NoSuchChannel)?;

        let current = slot.cx.config;
        let proposed = ChannelConfig {
            setpoint_c: update.setpoint_c.unwrap_or(current.setpoint_c),
            cooling_rate_c_per_min: update
                .cooling_rate_c_per_min
                .unwrap_or(current.cooling_rate_c_per_min),
            floor_c: update.floor_c.unwrap_or(current.floor_c),
            hold_duration_min: update.hold_duration_min.unwrap_or(current.hold_duration_min),
        };

        if !proposed.setpoint_c.is_finite()
            || !proposed.cooling_rate_c_per_min.is_finite()
            || !proposed.floor_c.is_finite()
        {
            return Err(ConfigError::NonFiniteValue);
        }
        if proposed.cooling_rate_c_per_min < 0.0 {
            return Err(ConfigError::NegativeCoolingRate);
        }
        if proposed.floor_c > proposed.setpoint_c {
            return Err(ConfigError::FloorAboveSetpoint);
        }

        slot.cx.config = proposed;
        slot.fsm.force_transition(Phase::Idle, &mut slot.cx);
        info!("channel {channel}: settings updated, cycle reset to Idle");
        Ok(())
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from the request handler, serial, etc.).
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::ApplyChannelConfig { channel, update } => {
                match self.apply_channel_config(channel, update) {
                    Ok(()) => sink.emit(&AppEvent::ConfigApplied { channel }),
                    Err(e) => warn!("channel {channel}: rejected: {}", Error::from(e)),
                }
            }
            AppCommand::ResetChannel(channel) => {
                if let Some(slot) = self.channels.get_mut(channel) {
                    let prev = slot.fsm.current_phase();
                    slot.fsm.force_transition(Phase::Idle, &mut slot.cx);
                    if prev != Phase::Idle {
                        sink.emit(&AppEvent::PhaseChanged {
                            channel,
                            from: prev,
                            to: Phase::Idle,
                        });
                    }
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Read-only status of one channel at time `now_ms`.
    pub fn snapshot(&self, channel: usize, now_ms: u64) -> Option<ChannelSnapshot> {
        let slot = self.channels.get(channel)?;
        let phase = slot.fsm.current_phase();
        let remaining_hold_ms = if phase == Phase::Hold {
            slot.cx.remaining_hold_ms(now_ms)
        } else {
            0
        };
        Some(ChannelSnapshot {
            channel,
            name: channel_name(channel),
            reading_c: slot.cx.reading,
            setpoint_c: slot.cx.config.setpoint_c,
            phase,
            remaining_hold_ms,
        })
    }

    /// Status of every channel, in index order.
    pub fn snapshots(&self, now_ms: u64) -> heapless::Vec<ChannelSnapshot, MAX_CHANNELS> {
        let mut out = heapless::Vec::new();
        for i in 0..self.channels.len() {
            if let Some(s) = self.snapshot(i, now_ms) {
                let _ = out.push(s);
            }
        }
        out
    }

    /// Number of configured channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Current phase of one channel.
    pub fn phase(&self, channel: usize) -> Option<Phase> {
        self.channels.get(channel).map(|s| s.fsm.current_phase())
    }

    /// Current output state of one channel.
    pub fn output_on(&self, channel: usize) -> Option<bool> {
        self.channels.get(channel).map(|s| s.cx.output_on)
    }

    /// Clone of one channel's live parameters.
    pub fn channel_config(&self, channel: usize) -> Option<ChannelConfig> {
        self.channels.get(channel).map(|s| s.cx.config)
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSink;
    impl EventSink for NullSink {
        fn emit(&mut self, _event: &AppEvent) {}
    }

    struct NullOutputs;
    impl OutputSink for NullOutputs {
        fn set_output(&mut self, _channel: usize, _on: bool) {}
    }

    /// Source that returns a fixed value for every channel.
    struct FixedSource(Option<f32>);
    impl TemperatureSource for FixedSource {
        fn read_temperature(&mut self, _channel: usize) -> Option<f32> {
            self.0
        }
    }

    fn make_service() -> ControlService {
        ControlService::new(&SystemConfig::default())
    }

    fn prime_readings(svc: &mut ControlService, celsius: f32) {
        svc.refresh_readings(&mut FixedSource(Some(celsius)), &mut NullSink);
    }

    #[test]
    fn starts_idle_outputs_off() {
        let svc = make_service();
        for i in 0..svc.channel_count() {
            assert_eq!(svc.phase(i), Some(Phase::Idle));
            assert_eq!(svc.output_on(i), Some(false));
        }
    }

    #[test]
    fn reading_at_setpoint_latches_output_and_enters_hold() {
        let mut svc = make_service();
        prime_readings(&mut svc, 61.0);
        svc.control_tick(500, 500, &mut NullOutputs, &mut NullSink);
        assert_eq!(svc.output_on(0), Some(true));
        assert_eq!(svc.phase(0), Some(Phase::Hold));
    }

    #[test]
    fn channel_without_reading_is_frozen() {
        let mut svc = make_service();
        prime_readings(&mut svc, 61.0);
        svc.control_tick(500, 500, &mut NullOutputs, &mut NullSink);
        assert_eq!(svc.phase(0), Some(Phase::Hold));

        // Probe drops out: no transitions, no output change, even though the
        // hold duration expires in wall time.
        svc.refresh_readings(&mut FixedSource(None), &mut NullSink);
        svc.control_tick(4_000_000, 500, &mut NullOutputs, &mut NullSink);
        assert_eq!(svc.phase(0), Some(Phase::Hold));
        assert_eq!(svc.output_on(0), Some(true));

        // Probe returns: the expired hold timer is acted on immediately,
        // because phase timing is wall-clock based.
        prime_readings(&mut svc, 61.0);
        svc.control_tick(4_000_500, 500, &mut NullOutputs, &mut NullSink);
        assert_eq!(svc.phase(0), Some(Phase::Cooling));
    }

    #[test]
    fn sensor_loss_events_fire_once_per_outage() {
        struct Counting {
            lost: usize,
            recovered: usize,
        }
        impl EventSink for Counting {
            fn emit(&mut self, event: &AppEvent) {
                match event {
                    AppEvent::SensorLost { channel: 0 } => self.lost += 1,
                    AppEvent::SensorRecovered { channel: 0, .. } => self.recovered += 1,
                    _ => {}
                }
            }
        }
        let mut svc = make_service();
        let mut sink = Counting {
            lost: 0,
            recovered: 0,
        };
        prime_readings(&mut svc, 40.0);
        for _ in 0..3 {
            svc.refresh_readings(&mut FixedSource(None), &mut sink);
        }
        assert_eq!(sink.lost, 1);
        svc.refresh_readings(&mut FixedSource(Some(40.0)), &mut sink);
        assert_eq!(sink.recovered, 1);
    }

    #[test]
    fn gateway_applies_partial_update_and_resets_phase() {
        let mut svc = make_service();
        prime_readings(&mut svc, 61.0);
        svc.control_tick(500, 500, &mut NullOutputs, &mut NullSink);
        assert_eq!(svc.phase(0), Some(Phase::Hold));

        let update = ChannelConfigUpdate {
            hold_duration_min: Some(5),
            ..Default::default()
        };
        svc.apply_channel_config(0, update).unwrap();
        let cfg = svc.channel_config(0).unwrap();
        assert_eq!(cfg.hold_duration_min, 5);
        // Live setpoint untouched by an update that omits it.
        assert_eq!(cfg.setpoint_c, 60.0);
        assert_eq!(svc.phase(0), Some(Phase::Idle));
        // Output is left on for the next tick to re-evaluate.
        assert_eq!(svc.output_on(0), Some(true));
    }

    #[test]
    fn gateway_rejects_floor_above_setpoint_atomically() {
        let mut svc = make_service();
        let before = svc.channel_config(0).unwrap();
        let update = ChannelConfigUpdate {
            cooling_rate_c_per_min: Some(2.5),
            floor_c: Some(70.0), // above the 60.0 setpoint
            ..Default::default()
        };
        let err = svc.apply_channel_config(0, update).unwrap_err();
        assert_eq!(err, ConfigError::FloorAboveSetpoint);
        // No partial application: the valid rate field was not written either.
        let after = svc.channel_config(0).unwrap();
        assert_eq!(after.cooling_rate_c_per_min, before.cooling_rate_c_per_min);
        assert_eq!(after.floor_c, before.floor_c);
    }

    #[test]
    fn gateway_rejects_negative_rate_and_non_finite() {
        let mut svc = make_service();
        let err = svc
            .apply_channel_config(
                0,
                ChannelConfigUpdate {
                    cooling_rate_c_per_min: Some(-0.1),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, ConfigError::NegativeCoolingRate);

        let err = svc
            .apply_channel_config(
                0,
                ChannelConfigUpdate {
                    setpoint_c: Some(f32::NAN),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, ConfigError::NonFiniteValue);
    }

    #[test]
    fn gateway_rejects_unknown_channel() {
        let mut svc = make_service();
        let err = svc
            .apply_channel_config(MAX_CHANNELS + 3, ChannelConfigUpdate::default())
            .unwrap_err();
        assert_eq!(err, ConfigError::NoSuchChannel);
    }

    #[test]
    fn floor_validates_against_effective_setpoint() {
        let mut svc = make_service();
        // Raising both in one update: floor 65 is legal because the same
        // update raises the setpoint to 80.
        let update = ChannelConfigUpdate {
            setpoint_c: Some(80.0),
            floor_c: Some(65.0),
            ..Default::default()
        };
        svc.apply_channel_config(0, update).unwrap();
        let cfg = svc.channel_config(0).unwrap();
        assert_eq!(cfg.setpoint_c, 80.0);
        assert_eq!(cfg.floor_c, 65.0);
    }

    #[test]
    fn snapshot_reports_live_setpoint_and_hold_remaining() {
        let mut svc = make_service();
        prime_readings(&mut svc, 61.0);
        svc.control_tick(1_000, 500, &mut NullOutputs, &mut NullSink);
        assert_eq!(svc.phase(0), Some(Phase::Hold));

        // 10 minutes into a 60-minute hold.
        let snap = svc.snapshot(0, 1_000 + 600_000).unwrap();
        assert_eq!(snap.phase, Phase::Hold);
        assert_eq!(snap.remaining_hold_ms, 50 * 60_000);
        assert_eq!(snap.name, "Syringe");
        assert_eq!(snap.reading_c, Some(61.0));

        // Past the hold window the derived value floors at zero.
        let snap = svc.snapshot(0, 1_000 + 2 * 3_600_000).unwrap();
        assert_eq!(snap.remaining_hold_ms, 0);
    }

    #[test]
    fn snapshots_serialize_for_the_reporting_boundary() {
        let mut svc = make_service();
        prime_readings(&mut svc, 25.0);
        let all = svc.snapshots(0);
        assert_eq!(all.len(), svc.channel_count());
        let json = serde_json::to_string(&all[..]).unwrap();
        assert!(json.contains("\"Syringe\""));
        assert!(json.contains("\"Idle\""));
    }

    #[test]
    fn output_command_emitted_only_on_change() {
        struct CountingOutputs(usize);
        impl OutputSink for CountingOutputs {
            fn set_output(&mut self, _channel: usize, _on: bool) {
                self.0 += 1;
            }
        }
        let mut svc = make_service();
        let mut outputs = CountingOutputs(0);
        prime_readings(&mut svc, 61.0);
        svc.control_tick(500, 500, &mut outputs, &mut NullSink);
        let after_latch = outputs.0;
        assert!(after_latch >= 1);
        // Output already on and reading still high: no further commands.
        svc.control_tick(1_000, 500, &mut outputs, &mut NullSink);
        svc.control_tick(1_500, 500, &mut outputs, &mut NullSink);
        assert_eq!(outputs.0, after_latch);
    }

    #[test]
    fn reset_channel_command_returns_to_idle() {
        let mut svc = make_service();
        prime_readings(&mut svc, 61.0);
        svc.control_tick(500, 500, &mut NullOutputs, &mut NullSink);
        assert_eq!(svc.phase(0), Some(Phase::Hold));
        svc.handle_command(AppCommand::ResetChannel(0), &mut NullSink);
        assert_eq!(svc.phase(0), Some(Phase::Idle));
    }
}

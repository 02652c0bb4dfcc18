//! Cooperative two-rate control scheduler.
//!
//! Drives the two periodic tasks of the control core against one monotonic
//! clock supplied by the caller:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Scheduler loop                          │
//! │                                                              │
//! │   ┌─────────────────────┐      ┌──────────────────────────┐  │
//! │   │ Reading refresh     │      │ Control task             │  │
//! │   │ (nominal 2000 ms)   │      │ (nominal 500 ms)         │  │
//! │   │ TemperatureSource → │      │ hysteresis → phases →    │  │
//! │   │ per-channel reading │      │ ramp → OutputSink        │  │
//! │   └─────────────────────┘      └──────────────────────────┘  │
//! │                                                              │
//! │   each poll: "has at least the nominal period elapsed?"      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The "last time this task ran" values live here, in an explicit object
//! with its own lifecycle — not in hidden statics — so the whole loop is
//! testable with a synthetic clock. Tasks run to completion within one
//! poll; nothing interrupts a partially executed tick, and nothing blocks
//! on I/O. The control task hands the **measured** elapsed time since its
//! previous run to the service, because the poll cadence is best-effort.

use crate::app::ports::{EventSink, OutputSink, TemperatureSource};
use crate::app::service::ControlService;
use crate::config::SystemConfig;

/// Two-rate cooperative scheduler for the control core.
pub struct ControlScheduler {
    sensor_interval_ms: u64,
    control_interval_ms: u64,
    /// Timestamp of the last reading-refresh run; `None` until the first
    /// poll establishes the baseline.
    last_sensor_ms: Option<u64>,
    /// Timestamp of the last control run. Doubles as the start point of the
    /// elapsed-time measurement handed to the ramp integrator.
    last_control_ms: Option<u64>,
}

impl ControlScheduler {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            sensor_interval_ms: u64::from(config.sensor_read_interval_ms),
            control_interval_ms: u64::from(config.control_loop_interval_ms),
            last_sensor_ms: None,
            last_control_ms: None,
        }
    }

    /// Run one pass of the scheduler loop at monotonic time `now_ms`.
    ///
    /// The first poll only stamps both task baselines; tasks start firing
    /// once their nominal period has elapsed from that point. Within one
    /// poll the reading refresh runs before the control task, so a control
    /// tick always sees the freshest batch of readings.
    pub fn poll(
        &mut self,
        now_ms: u64,
        service: &mut ControlService,
        source: &mut impl TemperatureSource,
        outputs: &mut impl OutputSink,
        sink: &mut impl EventSink,
    ) {
        match self.last_sensor_ms {
            None => self.last_sensor_ms = Some(now_ms),
            Some(last) if now_ms.saturating_sub(last) >= self.sensor_interval_ms => {
                self.last_sensor_ms = Some(now_ms);
                service.refresh_readings(source, sink);
            }
            Some(_) => {}
        }

        match self.last_control_ms {
            None => self.last_control_ms = Some(now_ms),
            Some(last) if now_ms.saturating_sub(last) >= self.control_interval_ms => {
                let elapsed_ms = now_ms - last;
                self.last_control_ms = Some(now_ms);
                service.control_tick(now_ms, elapsed_ms, outputs, sink);
            }
            Some(_) => {}
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService (domain)
//! ```
//!
//! Driven adapters (sensor bus, relay bank, event sinks) implement these
//! traits. The [`ControlService`](super::service::ControlService) consumes
//! them via generics, so the domain core never touches hardware directly.

/// Read-side port: the scheduler polls this on the sensor cadence.
///
/// Implementations must be non-blocking: a probe that does not answer is
/// reported as `None` for that channel only, and the next poll retries.
pub trait TemperatureSource {
    /// Kick off a conversion on every probe sharing the bus.
    /// Fire-and-forget; results are picked up by the per-channel reads on
    /// or before the next matching poll. Default no-op for sources that
    /// sample synchronously.
    fn request_conversion(&mut self) {}

    /// Latest temperature for `channel` in °C, or `None` if unavailable.
    fn read_temperature(&mut self, channel: usize) -> Option<f32>;
}

/// Write-side port: the domain commands one heater output per channel.
///
/// Called only when the output state changes. Expected to be idempotent and
/// fire-and-forget — a failed actuation is not observable to the core.
pub trait OutputSink {
    fn set_output(&mut self, channel: usize, on: bool);
}

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, status
/// page, telemetry uplink, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

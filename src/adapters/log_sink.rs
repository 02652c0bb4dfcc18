//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (UART / USB-CDC in production, stderr on the host). A future
//! MQTT or BLE adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::config::channel_name;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { channels } => {
                info!("START | {channels} channels, all outputs off");
            }
            AppEvent::PhaseChanged { channel, from, to } => {
                info!(
                    "PHASE | {} ({channel}) | {} -> {}",
                    channel_name(*channel),
                    from.name(),
                    to.name(),
                );
            }
            AppEvent::OutputChanged { channel, on } => {
                info!(
                    "RELAY | {} ({channel}) | {}",
                    channel_name(*channel),
                    if *on { "ON" } else { "OFF" },
                );
            }
            AppEvent::SensorLost { channel } => {
                warn!("SENSOR | {} ({channel}) | lost", channel_name(*channel));
            }
            AppEvent::SensorRecovered { channel, celsius } => {
                info!(
                    "SENSOR | {} ({channel}) | recovered at {celsius:.2}\u{00b0}C",
                    channel_name(*channel),
                );
            }
            AppEvent::ConfigApplied { channel } => {
                info!("CONFIG | {} ({channel}) | applied", channel_name(*channel));
            }
        }
    }
}

//! Heater/chiller relay bank driver.
//!
//! One active-high relay per channel, driven through the `embedded-hal`
//! `OutputPin` trait so the bank works with real ESP-IDF pin drivers and
//! with in-memory fakes in tests alike.
//!
//! Pin faults are logged and swallowed: a relay that fails to switch must
//! not take down the control loop, and the next tick retries anyway.

use embedded_hal::digital::OutputPin;
use heapless::Vec;
use log::{info, warn};

use crate::app::ports::OutputSink;
use crate::config::MAX_CHANNELS;

pub struct RelayBank<P: OutputPin> {
    pins: Vec<P, MAX_CHANNELS>,
    states: Vec<bool, MAX_CHANNELS>,
}

impl<P: OutputPin> RelayBank<P> {
    /// Take ownership of the relay pins and drive every one low.
    /// All heaters are off until the control loop says otherwise.
    pub fn new(mut pins: Vec<P, MAX_CHANNELS>) -> Self {
        let mut states = Vec::new();
        for (channel, pin) in pins.iter_mut().enumerate() {
            if pin.set_low().is_err() {
                warn!("relay {channel}: failed to drive low at startup");
            }
            let _ = states.push(false);
        }
        info!("relay bank ready ({} channels, all off)", pins.len());
        Self { pins, states }
    }

    pub fn is_on(&self, channel: usize) -> bool {
        self.states.get(channel).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Drive every relay low, regardless of tracked state.
    pub fn all_off(&mut self) {
        for (channel, pin) in self.pins.iter_mut().enumerate() {
            if pin.set_low().is_err() {
                warn!("relay {channel}: failed to drive low");
            }
        }
        for state in &mut self.states {
            *state = false;
        }
    }
}

impl<P: OutputPin> OutputSink for RelayBank<P> {
    fn set_output(&mut self, channel: usize, on: bool) {
        let Some(pin) = self.pins.get_mut(channel) else {
            warn!("relay {channel}: no such channel");
            return;
        };
        let result = if on { pin.set_high() } else { pin.set_low() };
        if result.is_err() {
            warn!("relay {channel}: failed to switch {}", if on { "on" } else { "off" });
            return;
        }
        if let Some(state) = self.states.get_mut(channel) {
            *state = on;
        }
    }
}

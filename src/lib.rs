//! Gelstat firmware library.
//!
//! Multi-channel thermostat with a timed hold phase and a linear cooling
//! ramp per channel. Exposes the pure-logic modules for integration
//! testing and external inspection; all ESP-IDF-specific code is guarded
//! by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod fsm;
pub mod scheduler;

pub mod pins;

// Hardware-facing modules; the real implementations are guarded by cfg
// attributes inside, host builds get in-memory stand-ins.
pub mod adapters;
pub mod drivers;
pub mod sensors;

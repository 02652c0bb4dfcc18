//! Gelstat firmware — main entry point.
//!
//! Ports-and-adapters layout: the control core ([`ControlService`] plus
//! the per-channel phase machines) is pure logic, and this binary wires
//! it to the real peripherals.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 Adapters (outer ring)                │
//! │                                                      │
//! │  SensorBus        RelayBank       LogEventSink       │
//! │  (1-Wire DS18B20) (heater GPIOs)  (serial log)       │
//! │                                                      │
//! │  ───────────── Port Trait Boundary ─────────────     │
//! │                                                      │
//! │  ┌────────────────────────────────────────────┐      │
//! │  │        ControlService (pure logic)         │      │
//! │  │  hysteresis · phase FSM · cooling ramp     │      │
//! │  └────────────────────────────────────────────┘      │
//! │                                                      │
//! │  ControlScheduler (two rates, one monotonic clock)   │
//! └──────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, Output, PinDriver};
use heapless::Vec;
use log::info;

use gelstat::adapters::log_sink::LogEventSink;
use gelstat::adapters::time::MonotonicClock;
use gelstat::config::{SystemConfig, MAX_CHANNELS};
use gelstat::drivers::relay::RelayBank;
use gelstat::error::{Error, Result};
use gelstat::pins;
use gelstat::scheduler::ControlScheduler;
use gelstat::sensors::{ds18b20, SensorBus};
use gelstat::app::service::ControlService;

type RelayPin = PinDriver<'static, AnyOutputPin, Output>;

/// Claim the relay GPIOs and drive every line low.
fn init_relays() -> Result<RelayBank<RelayPin>> {
    let mut relay_pins: Vec<RelayPin, MAX_CHANNELS> = Vec::new();
    for &gpio in pins::OUTPUT_GPIOS.iter() {
        // SAFETY: each GPIO appears exactly once in OUTPUT_GPIOS and is
        // claimed only here.
        let pin = unsafe { AnyOutputPin::new(gpio) };
        let driver = PinDriver::output(pin).map_err(|_| Error::Init("relay pin driver"))?;
        relay_pins
            .push(driver)
            .map_err(|_| Error::Init("too many relay channels"))?;
    }
    Ok(RelayBank::new(relay_pins))
}

/// Claim the 1-Wire line and bind the probe addresses to it.
fn init_sensor_bus() -> Result<SensorBus> {
    // SAFETY: the 1-Wire GPIO is claimed only here.
    let wire_pin = unsafe { AnyIOPin::new(pins::ONEWIRE_GPIO) };
    let driver =
        PinDriver::input_output_od(wire_pin).map_err(|_| Error::Init("1-wire pin driver"))?;
    let wire = ds18b20::OneWire::new(driver);
    Ok(SensorBus::new(wire, &pins::SENSOR_ADDRESSES))
}

fn main() -> anyhow::Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Gelstat v{} starting", env!("CARGO_PKG_VERSION"));

    let config = SystemConfig::default();

    // ── 2. Hardware adapters ──────────────────────────────────
    //
    // Relays first so every heater line is driven low before the first
    // control tick.
    let mut relays = init_relays()?;
    let mut bus = init_sensor_bus()?;
    let mut sink = LogEventSink::new();

    // ── 3. Control core ───────────────────────────────────────
    let mut service = ControlService::new(&config);
    let mut scheduler = ControlScheduler::new(&config);
    let clock = MonotonicClock::new();

    service.start(&mut sink);
    info!("System ready. Entering control loop.");

    // ── 4. Control loop ───────────────────────────────────────
    //
    // The scheduler decides which task is due; this loop only needs to
    // poll noticeably faster than the 500 ms control interval.
    loop {
        scheduler.poll(
            clock.uptime_ms(),
            &mut service,
            &mut bus,
            &mut relays,
            &mut sink,
        );
        FreeRtos::delay_ms(50);
    }
}

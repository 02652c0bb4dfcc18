//! DS18B20 digital thermometer driver (shared 1-Wire bus).
//!
//! Bit-banged 1-Wire timing per the Maxim datasheet, built on an
//! open-drain GPIO with microsecond delays from the ESP-IDF HAL. The
//! conversion is split fire-and-forget: `start_conversion_all` broadcasts
//! CONVERT T to every probe, and `read_celsius` fetches one probe's
//! scratchpad on a later poll — the 2 s read cadence comfortably covers
//! the 750 ms worst-case 12-bit conversion.
//!
//! The ROM-command and CRC layers are target-independent and unit-tested
//! on the host; only the line driver itself is ESP-IDF-gated.

use crate::error::SensorError;

// 1-Wire ROM / function commands.
const CMD_SKIP_ROM: u8 = 0xCC;
const CMD_MATCH_ROM: u8 = 0x55;
const CMD_CONVERT_T: u8 = 0x44;
const CMD_READ_SCRATCHPAD: u8 = 0xBE;

/// Operating range of the DS18B20. Anything outside is treated as a bus
/// artifact (this also covers the -127 disconnect sentinel some stacks
/// report).
const MIN_C: f32 = -55.0;
const MAX_C: f32 = 125.0;

/// Whether a temperature is within the sensor's physical range.
pub fn plausible(celsius: f32) -> bool {
    celsius.is_finite() && (MIN_C..=MAX_C).contains(&celsius)
}

/// Dallas/Maxim CRC-8 (polynomial 0x31 reflected = 0x8C), as used by the
/// ROM code and scratchpad.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            let mix = (crc ^ b) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            b >>= 1;
        }
    }
    crc
}

/// Decode a scratchpad temperature register pair to °C.
///
/// A CRC mismatch over the nine scratchpad bytes is what an absent or
/// half-connected probe produces (all-ones reads), so it is classified as
/// `Disconnected`; a valid frame carrying a nonsense value is `OutOfRange`.
pub fn decode_scratchpad(scratchpad: &[u8; 9]) -> Result<f32, SensorError> {
    if crc8(&scratchpad[..8]) != scratchpad[8] {
        return Err(SensorError::Disconnected);
    }
    let raw = i16::from_le_bytes([scratchpad[0], scratchpad[1]]);
    let celsius = f32::from(raw) / 16.0;
    if !plausible(celsius) {
        return Err(SensorError::OutOfRange);
    }
    Ok(celsius)
}

// ---------------------------------------------------------------------------
// Line driver (ESP-IDF only)
// ---------------------------------------------------------------------------

#[cfg(target_os = "espidf")]
mod line {
    use super::{
        decode_scratchpad, CMD_CONVERT_T, CMD_MATCH_ROM, CMD_READ_SCRATCHPAD, CMD_SKIP_ROM,
    };
    use crate::error::SensorError;
    use esp_idf_hal::delay::Ets;
    use esp_idf_hal::gpio::{AnyIOPin, InputOutput, PinDriver};
    use log::warn;

    /// Bit-banged 1-Wire master on one open-drain GPIO.
    pub struct OneWire {
        pin: PinDriver<'static, AnyIOPin, InputOutput>,
    }

    impl OneWire {
        pub fn new(pin: PinDriver<'static, AnyIOPin, InputOutput>) -> Self {
            Self { pin }
        }

        /// Broadcast CONVERT T to every probe on the line (fire-and-forget).
        pub fn start_conversion_all(&mut self) {
            if !self.reset() {
                warn!("1-wire: no presence pulse on conversion request");
                return;
            }
            self.write_byte(CMD_SKIP_ROM);
            self.write_byte(CMD_CONVERT_T);
        }

        /// Read one probe's scratchpad and decode the temperature.
        ///
        /// A missing presence pulse means the shared line itself is dead
        /// (`BusFault`); per-probe failures come back from the decode.
        pub fn read_celsius(&mut self, address: &[u8; 8]) -> Result<f32, SensorError> {
            if !self.reset() {
                return Err(SensorError::BusFault);
            }
            self.write_byte(CMD_MATCH_ROM);
            for &b in address {
                self.write_byte(b);
            }
            self.write_byte(CMD_READ_SCRATCHPAD);
            let mut scratchpad = [0u8; 9];
            for b in &mut scratchpad {
                *b = self.read_byte();
            }
            decode_scratchpad(&scratchpad)
        }

        // ── 1-Wire primitives (datasheet timings) ─────────────

        /// Reset pulse; true if at least one device answered with presence.
        fn reset(&mut self) -> bool {
            let _ = self.pin.set_low();
            Ets::delay_us(480);
            let _ = self.pin.set_high();
            Ets::delay_us(70);
            let present = self.pin.is_low();
            Ets::delay_us(410);
            present
        }

        fn write_bit(&mut self, bit: bool) {
            let _ = self.pin.set_low();
            if bit {
                Ets::delay_us(6);
                let _ = self.pin.set_high();
                Ets::delay_us(64);
            } else {
                Ets::delay_us(60);
                let _ = self.pin.set_high();
                Ets::delay_us(10);
            }
        }

        fn read_bit(&mut self) -> bool {
            let _ = self.pin.set_low();
            Ets::delay_us(6);
            let _ = self.pin.set_high();
            Ets::delay_us(9);
            let bit = self.pin.is_high();
            Ets::delay_us(55);
            bit
        }

        fn write_byte(&mut self, byte: u8) {
            for i in 0..8 {
                self.write_bit(byte & (1 << i) != 0);
            }
        }

        fn read_byte(&mut self) -> u8 {
            let mut byte = 0u8;
            for i in 0..8 {
                if self.read_bit() {
                    byte |= 1 << i;
                }
            }
            byte
        }
    }
}

#[cfg(target_os = "espidf")]
pub use line::OneWire;

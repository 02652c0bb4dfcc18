//! GPIO / peripheral pin assignments for the gelstat controller board.
//!
//! Single source of truth — every adapter references this module rather than
//! hard-coding pin numbers. Change a pin here and it propagates everywhere.
//!
//! Pins 1 (TX) and 3 (RX) are avoided: they conflict with serial debug.

use crate::config::DEFAULT_CHANNELS;

// ---------------------------------------------------------------------------
// Heater relay outputs (one per channel, active HIGH)
// ---------------------------------------------------------------------------

/// Relay GPIO per channel, in channel-index order.
pub const OUTPUT_GPIOS: [i32; DEFAULT_CHANNELS] = [2, 5, 14, 12, 16, 15, 13];

// ---------------------------------------------------------------------------
// Temperature sensor bus (DS18B20, shared 1-Wire line)
// ---------------------------------------------------------------------------

/// Data line for the 1-Wire bus carrying all probes.
pub const ONEWIRE_GPIO: i32 = 4;

/// Factory-lasered 64-bit ROM address of each probe, in channel-index order.
/// Replace with the addresses of the probes actually fitted to the rig.
pub const SENSOR_ADDRESSES: [[u8; 8]; DEFAULT_CHANNELS] = [
    [0x28, 0x3F, 0x4C, 0xDA, 0x05, 0x00, 0x00, 0x30],
    [0x28, 0x70, 0x40, 0x43, 0xD4, 0xAF, 0x15, 0xD4],
    [0x28, 0xAC, 0xDC, 0x46, 0xD4, 0xB9, 0x2B, 0x9D],
    [0x28, 0x0E, 0x2A, 0x45, 0xD4, 0x8D, 0x3A, 0xC8],
    [0x28, 0xC5, 0x53, 0x46, 0xD4, 0xB0, 0x37, 0xE0],
    [0x28, 0xDF, 0x12, 0x45, 0xD4, 0xC1, 0x1A, 0x74],
    [0x28, 0xCD, 0x11, 0x46, 0xD4, 0xBF, 0x64, 0x0A],
];

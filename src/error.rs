//! Unified error types for the gelstat firmware.
//!
//! One `Error` enum that every subsystem converts into, so the top-level
//! control loop handles a single type. All variants are `Copy` and carry
//! no allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A temperature sensor could not be read for one channel.
    Sensor(SensorError),
    /// A configuration update was rejected before mutation.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// Bridges this type into `anyhow` at the binary's bootstrap seam.
impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Per-channel, per-cycle sensor faults.
///
/// These are never fatal: the control core freezes the affected channel
/// for the tick and retries on the next read cadence. No alarm is raised
/// here — reporting is a collaborator concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The probe did not answer on the bus (disconnect sentinel).
    Disconnected,
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// The shared sensor bus itself failed (reset did not ack).
    BusFault,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "probe disconnected"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::BusFault => write!(f, "sensor bus fault"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Validation failures for channel parameter updates.
///
/// The configuration gateway rejects the whole update before touching any
/// field, so a failed update leaves the channel exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Channel index beyond the configured channel count.
    NoSuchChannel,
    /// Cooling rate below zero.
    NegativeCoolingRate,
    /// Floor would end up above the effective setpoint.
    FloorAboveSetpoint,
    /// A supplied value is NaN or infinite.
    NonFiniteValue,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchChannel => write!(f, "no such channel"),
            Self::NegativeCoolingRate => write!(f, "cooling rate must be >= 0"),
            Self::FloorAboveSetpoint => write!(f, "floor above setpoint"),
            Self::NonFiniteValue => write!(f, "value is not finite"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

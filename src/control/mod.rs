//! Closed-loop control primitives.
//!
//! Pure functions only — no hidden state, no I/O. The per-channel state
//! machine and the scheduler feed these every control tick.

pub mod hysteresis;
pub mod ramp;

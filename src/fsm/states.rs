//! Concrete phase handler functions and table builder.
//!
//! Each phase is defined by plain `fn` pointers — no closures, no dynamic
//! dispatch, no heap. This is the classic embedded C FSM pattern expressed
//! in safe Rust.
//!
//! ```text
//!  IDLE ──[output rose OFF→ON]──▶ HOLD
//!    ▲                              │
//!    │                     [hold duration elapsed]
//!    │                              ▼
//!    └────[setpoint at floor]─── COOLING
//! ```
//!
//! The output hysteresis decision is made **before** the phase tick and is
//! independent of the phase; handlers only consume its OFF→ON edge. The
//! Cooling handler checks the floor before ramping, so the tick after the
//! ramp clamps to the floor is the one that returns the channel to Idle.

use super::context::ChannelContext;
use super::{Phase, PhaseDescriptor};
use crate::control::ramp;
use log::info;

/// Build the static phase table. Called once per channel at startup.
pub fn build_phase_table() -> [PhaseDescriptor; Phase::COUNT] {
    [
        // Index 0 — Idle
        PhaseDescriptor {
            id: Phase::Idle,
            name: "Idle",
            on_enter: None,
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1 — Hold
        PhaseDescriptor {
            id: Phase::Hold,
            name: "Holding",
            on_enter: Some(hold_enter),
            on_exit: None,
            on_update: hold_update,
        },
        // Index 2 — Cooling
        PhaseDescriptor {
            id: Phase::Cooling,
            name: "Cooling",
            on_enter: Some(cooling_enter),
            on_exit: None,
            on_update: cooling_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE phase — quiescent, waiting for the process to reach the setpoint
// ═══════════════════════════════════════════════════════════════════════════

fn idle_update(ctx: &mut ChannelContext) -> Option<Phase> {
    // A cycle starts exactly when the output switched OFF -> ON this tick.
    // An output that is already on (e.g. after a cut-short cooling ramp)
    // does not restart the cycle until it has dropped out and re-latched.
    if ctx.output_rose {
        return Some(Phase::Hold);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  HOLD phase — setpoint reached, holding for the configured duration
// ═══════════════════════════════════════════════════════════════════════════

fn hold_enter(ctx: &mut ChannelContext) {
    ctx.phase_start_ms = ctx.now_ms;
    info!(
        "channel {}: hold started ({} min)",
        ctx.index, ctx.config.hold_duration_min
    );
}

fn hold_update(ctx: &mut ChannelContext) -> Option<Phase> {
    // Boundary is inclusive: exactly at the threshold transitions.
    if ctx.ms_in_phase() >= ctx.config.hold_duration_ms() {
        return Some(Phase::Cooling);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  COOLING phase — live setpoint ramps linearly down to the floor
// ═══════════════════════════════════════════════════════════════════════════

fn cooling_enter(ctx: &mut ChannelContext) {
    // Restart the phase timer; the setpoint itself is untouched here — the
    // ramp begins on the first full Cooling tick.
    ctx.phase_start_ms = ctx.now_ms;
    info!(
        "channel {}: cooling started ({:.1} degC/min down to {:.1})",
        ctx.index, ctx.config.cooling_rate_c_per_min, ctx.config.floor_c
    );
}

fn cooling_update(ctx: &mut ChannelContext) -> Option<Phase> {
    let cfg = &mut ctx.config;
    if cfg.setpoint_c <= cfg.floor_c {
        info!("channel {}: cooling finished, reached floor", ctx.index);
        return Some(Phase::Idle);
    }
    cfg.setpoint_c = ramp::integrate(
        cfg.setpoint_c,
        cfg.floor_c,
        cfg.cooling_rate_c_per_min,
        ctx.elapsed_ms,
    );
    None
}

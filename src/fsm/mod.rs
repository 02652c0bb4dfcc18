//! Function-pointer finite state machine engine for the per-channel
//! heat/hold/cool lifecycle.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  PhaseTable                                            │
//! │  ┌─────────┬───────────┬──────────┬──────────────────┐ │
//! │  │ Phase   │ on_enter  │ on_exit  │ on_update        │ │
//! │  ├─────────┼───────────┼──────────┼──────────────────┤ │
//! │  │ Idle    │ —         │ —        │ fn(ctx)->Option<>│ │
//! │  │ Hold    │ fn(ctx)   │ —        │ fn(ctx)->Option<>│ │
//! │  │ Cooling │ fn(ctx)   │ —        │ fn(ctx)->Option<>│ │
//! │  └─────────┴───────────┴──────────┴──────────────────┘ │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Each control tick the engine calls `on_update` for the **current** phase.
//! If it returns `Some(next)`, the engine runs `on_exit` for the current
//! phase, then `on_enter` for the next, and moves the current pointer. All
//! handlers receive `&mut ChannelContext`, the channel's blackboard. At most
//! one transition fires per tick. The phase being a single tagged value makes
//! the "exactly one of Idle/Hold/Cooling" invariant structural.

pub mod context;
pub mod states;

use context::ChannelContext;
use log::info;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

/// The three lifecycle phases of one channel.
/// Must stay in sync with the table built in [`states::build_phase_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Phase {
    Idle = 0,
    Hold = 1,
    Cooling = 2,
}

impl Phase {
    /// Total number of phases — used to size the table array.
    pub const COUNT: usize = 3;

    /// Human-readable phase label, as shown in logs and snapshots.
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Hold => "Holding",
            Self::Cooling => "Cooling",
        }
    }

    /// Convert a `u8` index back to `Phase`. Panics on out-of-range in
    /// debug builds; returns `Idle` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Hold,
            2 => Self::Cooling,
            _ => {
                debug_assert!(false, "invalid phase index: {idx}");
                Self::Idle
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each phase transition.
pub type PhaseActionFn = fn(&mut ChannelContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type PhaseUpdateFn = fn(&mut ChannelContext) -> Option<Phase>;

// ---------------------------------------------------------------------------
// Phase descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single phase.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct PhaseDescriptor {
    pub id: Phase,
    pub name: &'static str,
    pub on_enter: Option<PhaseActionFn>,
    pub on_exit: Option<PhaseActionFn>,
    pub on_update: PhaseUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The per-channel phase machine.
///
/// Owns the phase table (array of [`PhaseDescriptor`]); the mutable
/// [`ChannelContext`] is threaded through every handler call by the owner.
pub struct PhaseFsm {
    /// Fixed-size table indexed by `Phase as usize`.
    table: [PhaseDescriptor; Phase::COUNT],
    /// Index of the currently active phase.
    current: usize,
}

impl PhaseFsm {
    /// Construct a new machine with the given table, starting in `initial`.
    pub fn new(table: [PhaseDescriptor; Phase::COUNT], initial: Phase) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Advance the machine by one control tick.
    ///
    /// 1. Call `on_update` for the current phase.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → move pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut ChannelContext) {
        let next = (self.table[self.current].on_update)(ctx);
        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition (used by the configuration gateway to
    /// reset a channel to Idle regardless of what `on_update` would return).
    pub fn force_transition(&mut self, next: Phase, ctx: &mut ChannelContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current phase's identity.
    pub fn current_phase(&self) -> Phase {
        Phase::from_index(self.current)
    }

    /// Display name of the current phase ("Idle" / "Holding" / "Cooling").
    pub fn current_phase_name(&self) -> &'static str {
        self.table[self.current].name
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: Phase, ctx: &mut ChannelContext) {
        let next_idx = next_id as usize;

        info!(
            "channel {}: {} -> {}",
            ctx.index, self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::context::ChannelContext;
    use super::*;
    use crate::config::ChannelConfig;

    fn make_ctx() -> ChannelContext {
        ChannelContext::new(0, ChannelConfig::default())
    }

    fn make_fsm() -> PhaseFsm {
        PhaseFsm::new(states::build_phase_table(), Phase::Idle)
    }

    /// Run one tick at `now_ms` with the given output edge already decided.
    fn tick_at(fsm: &mut PhaseFsm, ctx: &mut ChannelContext, now_ms: u64, rose: bool) {
        ctx.elapsed_ms = now_ms.saturating_sub(ctx.now_ms);
        ctx.now_ms = now_ms;
        ctx.output_rose = rose;
        fsm.tick(ctx);
    }

    #[test]
    fn starts_in_idle() {
        let fsm = make_fsm();
        assert_eq!(fsm.current_phase(), Phase::Idle);
        assert_eq!(fsm.current_phase_name(), "Idle");
    }

    #[test]
    fn idle_stays_without_output_edge() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        ctx.output_on = true; // already on — no edge
        tick_at(&mut fsm, &mut ctx, 500, false);
        assert_eq!(fsm.current_phase(), Phase::Idle);
    }

    #[test]
    fn idle_to_hold_on_output_rise() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        tick_at(&mut fsm, &mut ctx, 1_500, true);
        assert_eq!(fsm.current_phase(), Phase::Hold);
        assert_eq!(ctx.phase_start_ms, 1_500);
    }

    #[test]
    fn hold_runs_for_exactly_the_configured_duration() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        ctx.config.hold_duration_min = 60;
        tick_at(&mut fsm, &mut ctx, 0, true);
        assert_eq!(fsm.current_phase(), Phase::Hold);

        // One tick short of the boundary: still holding.
        tick_at(&mut fsm, &mut ctx, 3_600_000 - 500, false);
        assert_eq!(fsm.current_phase(), Phase::Hold);

        // Exactly at the boundary: transitions, timer restarts, setpoint kept.
        let sp_before = ctx.config.setpoint_c;
        tick_at(&mut fsm, &mut ctx, 3_600_000, false);
        assert_eq!(fsm.current_phase(), Phase::Cooling);
        assert_eq!(ctx.phase_start_ms, 3_600_000);
        assert_eq!(ctx.config.setpoint_c, sp_before);
    }

    #[test]
    fn cooling_ramps_with_measured_elapsed_time() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.force_transition(Phase::Cooling, &mut ctx);

        // 60 s of cooling at 1 degC/min lowers the setpoint by 1.0.
        tick_at(&mut fsm, &mut ctx, 60_000, false);
        assert_eq!(fsm.current_phase(), Phase::Cooling);
        assert!((ctx.config.setpoint_c - 59.0).abs() < 1e-4);
    }

    #[test]
    fn cooling_clamps_then_goes_idle_next_tick() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        ctx.config.setpoint_c = 37.2;
        ctx.config.cooling_rate_c_per_min = 60.0; // 1 degC per second
        fsm.force_transition(Phase::Cooling, &mut ctx);

        // Big step: clamps exactly to the floor but stays in Cooling.
        tick_at(&mut fsm, &mut ctx, 1_000, false);
        assert_eq!(ctx.config.setpoint_c, 37.0);
        assert_eq!(fsm.current_phase(), Phase::Cooling);

        // Next evaluation sees setpoint == floor and goes Idle.
        tick_at(&mut fsm, &mut ctx, 1_500, false);
        assert_eq!(fsm.current_phase(), Phase::Idle);
        assert_eq!(ctx.config.setpoint_c, 37.0);
    }

    #[test]
    fn cooling_never_undershoots_floor() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.force_transition(Phase::Cooling, &mut ctx);

        let mut now = 0;
        let mut prev = ctx.config.setpoint_c;
        for _ in 0..400 {
            now += 7_919; // deliberately ragged cadence
            tick_at(&mut fsm, &mut ctx, now, false);
            assert!(ctx.config.setpoint_c >= ctx.config.floor_c);
            assert!(ctx.config.setpoint_c <= prev);
            prev = ctx.config.setpoint_c;
            if fsm.current_phase() == Phase::Idle {
                break;
            }
        }
        assert_eq!(fsm.current_phase(), Phase::Idle);
        assert_eq!(ctx.config.setpoint_c, ctx.config.floor_c);
    }

    #[test]
    fn full_cycle_idle_hold_cooling_idle() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        ctx.config.hold_duration_min = 1;
        ctx.config.cooling_rate_c_per_min = 23.0; // 60 -> 37 in one minute

        tick_at(&mut fsm, &mut ctx, 500, true);
        assert_eq!(fsm.current_phase(), Phase::Hold);

        tick_at(&mut fsm, &mut ctx, 500 + 60_000, false);
        assert_eq!(fsm.current_phase(), Phase::Cooling);

        let mut now = 500 + 60_000;
        for _ in 0..200 {
            now += 500;
            tick_at(&mut fsm, &mut ctx, now, false);
            if fsm.current_phase() == Phase::Idle {
                break;
            }
        }
        assert_eq!(fsm.current_phase(), Phase::Idle);
        assert_eq!(ctx.config.setpoint_c, 37.0);
    }

    #[test]
    fn force_transition_to_same_phase_is_a_no_op() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        ctx.phase_start_ms = 123;
        fsm.force_transition(Phase::Idle, &mut ctx);
        assert_eq!(fsm.current_phase(), Phase::Idle);
        assert_eq!(ctx.phase_start_ms, 123);
    }

    #[test]
    fn forced_reset_from_hold_keeps_output_state() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        tick_at(&mut fsm, &mut ctx, 500, true);
        ctx.output_on = true;
        fsm.force_transition(Phase::Idle, &mut ctx);
        assert_eq!(fsm.current_phase(), Phase::Idle);
        // Output is left for the next hysteresis evaluation, not cleared here.
        assert!(ctx.output_on);
    }

    #[test]
    fn phase_from_index_roundtrip() {
        for i in 0..Phase::COUNT {
            let p = Phase::from_index(i);
            assert_eq!(p as usize, i);
        }
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn phase_from_invalid_index_returns_idle() {
        assert_eq!(Phase::from_index(99), Phase::Idle);
    }
}

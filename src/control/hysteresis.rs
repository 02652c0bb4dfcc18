//! Hysteresis (bang-bang) output controller.
//!
//! Maps a temperature reading and the live setpoint to a binary actuation
//! decision with a dead band below the setpoint. The band prevents relay
//! chatter when the process temperature sits right at the threshold.

/// Compute the next output state.
///
/// * ON iff `reading >= setpoint` while currently off.
/// * OFF iff `reading < setpoint - band` while currently on.
/// * Otherwise unchanged (inside the dead band).
///
/// Must be called every control tick with the channel's **current** setpoint —
/// during Cooling that value is the ramped one, not the configured target.
pub fn evaluate(reading: f32, setpoint: f32, band: f32, output_on: bool) -> bool {
    if !output_on && reading >= setpoint {
        true
    } else if output_on && reading < setpoint - band {
        false
    } else {
        output_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAND: f32 = 0.5;

    #[test]
    fn turns_on_at_setpoint() {
        assert!(evaluate(60.0, 60.0, BAND, false));
        assert!(evaluate(61.0, 60.0, BAND, false));
    }

    #[test]
    fn stays_off_below_setpoint() {
        assert!(!evaluate(59.9, 60.0, BAND, false));
    }

    #[test]
    fn turns_off_below_dead_band() {
        assert!(!evaluate(59.4, 60.0, BAND, true));
    }

    #[test]
    fn holds_on_inside_dead_band() {
        // setpoint - band <= reading < setpoint: no change in either direction
        assert!(evaluate(59.5, 60.0, BAND, true));
        assert!(evaluate(59.9, 60.0, BAND, true));
        assert!(!evaluate(59.9, 60.0, BAND, false));
    }

    #[test]
    fn exact_lower_edge_keeps_output_on() {
        // reading == setpoint - band is NOT strictly below the band edge
        assert!(evaluate(59.5, 60.0, BAND, true));
    }

    #[test]
    fn tracks_a_ramped_setpoint() {
        // Same reading flips the decision once the live setpoint drops past it.
        let reading = 50.0;
        assert!(!evaluate(reading, 60.0, BAND, false));
        assert!(evaluate(reading, 49.0, BAND, false));
    }
}

//! Echo time to length conversion
//!
//! All arithmetic is integer-only. The round-trip constant is the number
//! of microseconds sound needs to travel one length unit and back.

use crate::config::Rounding;
use crate::EchoTime;

/// Convert a round-trip echo time to whole length units
///
/// `Truncate` drops the fraction. `Nearest` rounds to the closest unit but
/// never turns a real (non-zero) echo into 0, so 0 keeps meaning "no echo".
pub fn convert_length(echo_time_us: EchoTime, us_per_unit: u32, rounding: Rounding) -> u32 {
    if us_per_unit == 0 {
        return 0;
    }

    match rounding {
        Rounding::Truncate => echo_time_us / us_per_unit,
        Rounding::Nearest => {
            let rounded = ((echo_time_us as u64 + (us_per_unit / 2) as u64) / us_per_unit as u64) as u32;
            if echo_time_us != 0 {
                rounded.max(1)
            } else {
                rounded
            }
        }
    }
}

/// Longest echo time a ping waits for, given a distance ceiling
///
/// `max_distance` is clamped to `max_sensor_distance` first. Truncating
/// mode adds one whole unit so that an object at exactly `max_distance`
/// still reads as in range; rounding mode adds half a unit instead.
pub fn max_echo_time_us(
    max_distance: u16,
    max_sensor_distance: u16,
    us_per_unit: u32,
    rounding: Rounding,
) -> u32 {
    let distance = max_distance.min(max_sensor_distance) as u32;

    match rounding {
        Rounding::Truncate => (distance + 1) * us_per_unit,
        Rounding::Nearest => distance * us_per_unit + us_per_unit / 2,
    }
}

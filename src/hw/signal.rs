//! Conversions for the ultrasonic ranger and the hobby servo.

use std::time::Duration;

/// Longest echo pulse the ranger waits for; anything longer is "no echo".
pub const ECHO_TIMEOUT: Duration = Duration::from_micros(30_000);

/// Speed of sound in cm/µs.
const SOUND_CM_PER_US: f64 = 0.0343;

/// Converts a measured echo pulse into a distance in centimetres.
///
/// `None` (pulse timed out) and pulses at or beyond [`ECHO_TIMEOUT`] mean
/// "no object detected", never an error.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use lotkeeper::hw::echo_to_cm;
///
/// let cm = echo_to_cm(Some(Duration::from_micros(583))).unwrap();
/// assert!((cm - 10.0).abs() < 0.01);
/// assert_eq!(echo_to_cm(None), None);
/// ```
pub fn echo_to_cm(pulse: Option<Duration>) -> Option<f64> {
    let pulse = pulse.filter(|p| *p < ECHO_TIMEOUT)?;
    Some(pulse.as_micros() as f64 * SOUND_CM_PER_US / 2.0)
}

/// Duty value (0..=1023 scale at 50 Hz) for a servo angle in degrees.
///
/// Angles above 180 are clamped.
pub fn servo_duty(angle: u16) -> u16 {
    let angle = f64::from(angle.min(180));
    (25.0 + angle / 180.0 * 100.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_out_pulse_is_no_echo() {
        assert_eq!(echo_to_cm(Some(ECHO_TIMEOUT)), None);
        assert_eq!(echo_to_cm(Some(Duration::from_secs(1))), None);
        assert_eq!(echo_to_cm(Some(Duration::ZERO)), Some(0.0));
    }

    #[test]
    fn servo_duty_spans_range() {
        assert_eq!(servo_duty(0), 25);
        assert_eq!(servo_duty(90), 75);
        assert_eq!(servo_duty(180), 125);
        assert_eq!(servo_duty(270), 125);
    }
}

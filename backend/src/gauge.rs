//! Manometer dial geometry
//!
//! Pure functions of pressure for whoever draws the gauge. The dial spans
//! 0–300 mmHg over 270 degrees, from −135° (0 mmHg) to +135° (300 mmHg).

pub const GAUGE_MAX_MMHG: f64 = 300.0;
pub const MIN_ANGLE_DEG: f64 = -135.0;
pub const MAX_ANGLE_DEG: f64 = 135.0;

/// One graduation mark on the dial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialTick {
    pub pressure: u32,
    /// Major graduations carry a number
    pub is_label: bool,
    pub angle_deg: f64,
}

/// Needle rotation for `pressure`, clamped to the dial
///
/// # Example
/// ```
/// use korotkoff_trainer_core::gauge::needle_angle;
///
/// assert_eq!(needle_angle(0.0), -135.0);
/// assert_eq!(needle_angle(150.0), 0.0);
/// assert_eq!(needle_angle(450.0), 135.0);
/// ```
pub fn needle_angle(pressure: f64) -> f64 {
    let ratio = (pressure / GAUGE_MAX_MMHG).clamp(0.0, 1.0);
    MIN_ANGLE_DEG + ratio * (MAX_ANGLE_DEG - MIN_ANGLE_DEG)
}

/// Graduations every 10 mmHg, labelled every 20 mmHg
pub fn dial_ticks() -> Vec<DialTick> {
    (0..=GAUGE_MAX_MMHG as u32)
        .step_by(10)
        .map(|pressure| DialTick {
            pressure,
            is_label: pressure % 20 == 0,
            angle_deg: needle_angle(pressure as f64),
        })
        .collect()
}

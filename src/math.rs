//! Phase angle math.
//!
//! Electrical phase angles are circular quantities; everything the
//! orchestrator hands to the motor driver is first mapped into (-pi, pi].

use core::f32::consts::PI;

use libm::remainderf;

/// Wrap an angle into the half-open interval (-pi, pi].
///
/// The result is congruent to `theta` modulo 2*pi.
#[inline]
pub fn wrap_pm_pi(theta: f32) -> f32 {
    let wrapped = remainderf(theta, 2.0 * PI);
    // remainderf lands in [-pi, pi]; fold the lower endpoint across.
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

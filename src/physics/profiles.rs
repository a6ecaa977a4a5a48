//! Reference condition pairs used by the driver, the tests and the benches.

use std::f64::consts::{PI, SQRT_2};

use glam::DVec2;

use super::conditions::{Selector, WaveConditions};

/// Angular frequency of the fundamental mode on the unit square.
#[inline]
fn omega(c: f64) -> f64 {
    SQRT_2 * PI * c
}

fn standing_value(x: f64, y: f64, t: f64, c: f64) -> f64 {
    (omega(c) * t).cos() * (PI * x).sin() * (PI * y).sin()
}

fn standing_velocity(x: f64, y: f64, t: f64, c: f64) -> f64 {
    -omega(c) * (omega(c) * t).sin() * (PI * x).sin() * (PI * y).sin()
}

fn pulse_value(x: f64, y: f64, t: f64, c: f64, r: DVec2, width: f64) -> f64 {
    let sx = x - r.x - c * t;
    let sy = y - r.y - c * t;
    0.2 * (-(sx * sx + sy * sy) / width).exp()
}

fn pulse_velocity(x: f64, y: f64, t: f64, c: f64, r: DVec2, width: f64) -> f64 {
    let sx = x - r.x - c * t;
    let sy = y - r.y - c * t;
    pulse_value(x, y, t, c, r, width) * 2.0 * c * (sx + sy) / width
}

/// `cos(√2πct)·sin(πx)·sin(πy)`, an exact standing mode of the unit square.
pub fn standing_wave() -> WaveConditions {
    WaveConditions::new(
        |x: f64, y: f64, t: f64, c: f64, _: Selector, _: DVec2| standing_value(x, y, t, c),
        |x: f64, y: f64, t: f64, c: f64, _: Selector, _: DVec2| standing_velocity(x, y, t, c),
    )
}

/// `cos(√2πct)·sin(π(x+y))`, released from rest.
pub fn diagonal_wave() -> WaveConditions {
    WaveConditions::at_rest(|x: f64, y: f64, t: f64, c: f64, _: Selector, _: DVec2| {
        (omega(c) * t).cos() * (PI * (x + y)).sin()
    })
}

/// Gaussian bump centred on the reference point, drifting along the diagonal
/// with speed `c`.
pub fn gaussian_pulse(width: f64) -> WaveConditions {
    WaveConditions::new(
        move |x: f64, y: f64, t: f64, c: f64, _: Selector, r: DVec2| {
            pulse_value(x, y, t, c, r, width)
        },
        move |x: f64, y: f64, t: f64, c: f64, _: Selector, r: DVec2| {
            pulse_velocity(x, y, t, c, r, width)
        },
    )
}

/// [`Selector::STANDING`] gives the standing wave, anything else the pulse.
pub fn selectable(width: f64) -> WaveConditions {
    WaveConditions::new(
        move |x: f64, y: f64, t: f64, c: f64, s: Selector, r: DVec2| {
            if s == Selector::STANDING {
                standing_value(x, y, t, c)
            } else {
                pulse_value(x, y, t, c, r, width)
            }
        },
        move |x: f64, y: f64, t: f64, c: f64, s: Selector, r: DVec2| {
            if s == Selector::STANDING {
                standing_velocity(x, y, t, c)
            } else {
                pulse_velocity(x, y, t, c, r, width)
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::conditions::WaveParams;
    use approx::assert_relative_eq;

    fn time_derivative(cond: &WaveConditions, p: DVec2, t: f64, params: &WaveParams) -> f64 {
        let h = 1e-6;
        (cond.value_at(p, t + h, params) - cond.value_at(p, t - h, params)) / (2.0 * h)
    }

    #[test]
    fn velocities_match_the_time_derivative() {
        let params = WaveParams::default()
            .with_wave_speed(0.8)
            .with_reference(DVec2::new(0.3, 0.4));
        let p = DVec2::new(0.35, 0.6);
        for cond in [standing_wave(), gaussian_pulse(0.05)] {
            for t in [0.0, 0.1, 0.37] {
                assert_relative_eq!(
                    cond.velocity_at(p, t, &params),
                    time_derivative(&cond, p, t, &params),
                    epsilon = 1e-6
                );
            }
        }
    }

    #[test]
    fn standing_wave_vanishes_on_the_unit_square_boundary() {
        let cond = standing_wave();
        let params = WaveParams::default();
        for p in [DVec2::new(0.0, 0.4), DVec2::new(1.0, 0.2), DVec2::new(0.7, 1.0)] {
            assert!(cond.value_at(p, 0.3, &params).abs() < 1e-15);
        }
    }

    #[test]
    fn selector_switches_between_profiles() {
        let cond = selectable(0.05);
        let p = DVec2::new(0.25, 0.5);
        let standing = WaveParams::default().with_selector(Selector::STANDING);
        let pulse = WaveParams::default().with_selector(Selector::PULSE);
        assert_eq!(
            cond.value_at(p, 0.2, &standing),
            standing_wave().value_at(p, 0.2, &standing)
        );
        assert_eq!(
            cond.value_at(p, 0.2, &pulse),
            gaussian_pulse(0.05).value_at(p, 0.2, &pulse)
        );
        assert_eq!(diagonal_wave().velocity_at(p, 0.2, &pulse), 0.0);
    }
}

use crate::complex::Complex;
use crate::params::KernelParams;

/// Returns `true` if `c` lies inside the main cardioid.
///
/// Closed-form membership test; skips iterating a large share of the
/// visible points at the default zoom level.
#[inline]
fn in_cardioid(re: f64, im: f64) -> bool {
    let im2 = im * im;
    let q = (re - 0.25) * (re - 0.25) + im2;
    q * (q + (re - 0.25)) <= 0.25 * im2
}

/// Returns `true` if `c` lies inside the period-2 bulb.
#[inline]
fn in_period2_bulb(re: f64, im: f64) -> bool {
    (re + 1.0) * (re + 1.0) + im * im <= 0.0625
}

/// Escape time of `c` under `z ← z² + c`, starting from `z₀ = 0`.
///
/// Returns the number of completed iterations before `|z|²` exceeded
/// the squared escape radius, or `params.max_iterations` if the orbit
/// never escaped within budget. The literal `max_iterations` value is
/// the interior sentinel throughout the workspace — it indexes the
/// palette's reserved final entry and is never produced for a point
/// that actually escaped.
///
/// The loop is unconditionally bounded by `max_iterations`, so this
/// always terminates. Purity matters: the same `c` and params produce
/// the same count on any thread, which is what lets work units be
/// recomputed or discarded freely.
pub fn escape_time(c: Complex, params: &KernelParams) -> u32 {
    let max_iter = params.max_iterations;

    // Known-interior shortcuts never escape; report the sentinel.
    if in_cardioid(c.re, c.im) || in_period2_bulb(c.re, c.im) {
        return max_iter;
    }

    let escape_radius_sq = params.escape_radius_sq();
    let mut z = Complex::ZERO;

    // Brent's cycle detection state.
    let mut old_z = z;
    let mut period: u32 = 0;
    let mut check: u32 = 3;

    for n in 0..max_iter {
        z = z * z + c;

        if z.norm_sq() > escape_radius_sq {
            return n;
        }

        // Periodicity check (Brent). Orbits rarely settle in the first
        // few dozen iterations, and checking every 4th keeps the branch
        // out of the common path.
        if n >= 32 && n & 3 == 0 {
            if (z.re - old_z.re).abs() < 1e-13 && (z.im - old_z.im).abs() < 1e-13 {
                return max_iter;
            }

            period += 1;
            if period > check {
                old_z = z;
                period = 0;
                check = check.saturating_mul(2);
            }
        }
    }

    max_iter
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time kernel and the color ramp.  Both are pure functions
//! with no shared state, which is what lets every worker thread in
//! every child process call them without any synchronization.

use num::Complex;

/// The largest packed color value; white on the grayscale-like ramp.
pub const COLOR_MAX: u32 = 0xFF_FFFF;

/// Return the number of iterations at a point in the Mandelbrot
/// space, up to a maximum of `max`.  The point escapes once its
/// squared magnitude exceeds four; points that never escape within
/// the budget report exactly `max`.
pub fn iterations_at_point(point: Complex<f64>, max: u32) -> u32 {
    let mut z = point;
    let mut iter = 0;

    while z.norm_sqr() <= 4.0 && iter < max {
        z = z * z + point;
        iter += 1;
    }

    iter
}

/// Convert an iteration number to a packed 0xRRGGBB color.  A plain
/// linear ramp from black at zero iterations to white at `max`; not a
/// palette, but monotone, and the endpoints are exact.  The product is
/// taken in f64 so a deep iteration budget cannot overflow it.
pub fn iteration_to_color(iters: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    ((COLOR_MAX as f64) * (iters as f64) / (max as f64)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        assert_eq!(iterations_at_point(Complex::new(0.0, 0.0), 100), 100);
        assert_eq!(iterations_at_point(Complex::new(0.0, 0.0), 1000), 1000);
    }

    #[test]
    fn far_corner_escapes_immediately() {
        // (-2,-2) already has squared magnitude 8, outside the radius.
        assert_eq!(iterations_at_point(Complex::new(-2.0, -2.0), 100), 0);
    }

    #[test]
    fn near_boundary_escapes_late() {
        // Just outside the main cardioid's cusp at 0.25.
        let iters = iterations_at_point(Complex::new(0.2501, 0.0), 10_000);
        assert!(iters > 100);
        assert!(iters < 10_000);
    }

    #[test]
    fn iterations_never_exceed_max() {
        for max in &[1, 10, 100] {
            for re in -3..3 {
                for im in -3..3 {
                    let c = Complex::new((re as f64) / 2.0, (im as f64) / 2.0);
                    assert!(iterations_at_point(c, *max) <= *max);
                }
            }
        }
    }

    #[test]
    fn color_ramp_endpoints_are_exact() {
        assert_eq!(iteration_to_color(0, 1000), 0);
        assert_eq!(iteration_to_color(1000, 1000), COLOR_MAX);
    }

    #[test]
    fn color_ramp_is_monotone() {
        let max = 1000;
        let mut last = 0;
        for iters in 0..=max {
            let color = iteration_to_color(iters, max);
            assert!(color >= last);
            assert!(color <= COLOR_MAX);
            last = color;
        }
    }

    #[test]
    fn color_ramp_survives_deep_budgets() {
        // 0xFFFFFF * 100_000 overflows an i32; the f64 path must not.
        assert_eq!(iteration_to_color(100_000, 100_000), COLOR_MAX);
        assert!(iteration_to_color(50_000, 100_000) <= COLOR_MAX);
    }

    #[test]
    fn zero_budget_maps_to_black() {
        assert_eq!(iteration_to_color(0, 0), 0);
    }
}

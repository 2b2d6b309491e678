// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a window on the complex plane described by its center and its
//! x/y extents.  Every frame of the animation owns exactly one of
//! these; zooming is nothing more than shrinking the extents around a
//! fixed center.
use num::Complex;

/// Describes the width and height of an integral plane that is assumed
/// to start at 0,0 and all values are assumed to be non-negative
/// integers.
#[derive(Copy, Clone, Debug)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the x, y of a point in a region.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Maps pixels of an integral cartesian plane onto points of a window
/// on the complex plane.  The window is held as its left-lower corner
/// plus the per-pixel step, so the mapping is a single multiply-add in
/// each axis.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    /// The right-upper hand corner of the integral cartesian plane.
    /// The left-lower is assumed to be at 0,0
    pub integral_plane: IntegralPlane,
    // Left-lower corner of the complex window.
    origin: Complex<f64>,
    // Complex-plane distance covered by one pixel in each axis.
    step: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Takes the integral plane's dimensions, the center
    /// of the complex window, and the window's full extent along each
    /// axis.  A window of extent `xscale` around center `c` runs from
    /// `c.re - xscale/2` to `c.re + xscale/2`, and likewise for the
    /// imaginary axis.
    pub fn new(
        width: usize,
        height: usize,
        center: Complex<f64>,
        xscale: f64,
        yscale: f64,
    ) -> Result<PlaneMapper, String> {
        if width == 0 || height == 0 {
            return Err("The pixel grid must be at least one pixel in each axis.".to_string());
        }

        if xscale <= 0.0 || yscale <= 0.0 {
            return Err("The complex window must have a positive extent.".to_string());
        }

        let origin = Complex::new(center.re - xscale / 2.0, center.im - yscale / 2.0);

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            origin,
            step: (xscale / (width as f64), yscale / (height as f64)),
        })
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Width of the integral plane in pixels.
    pub fn width(&self) -> usize {
        self.integral_plane.0
    }

    /// Height of the integral plane in pixels.
    pub fn height(&self) -> usize {
        self.integral_plane.1
    }

    /// Given a pixel on the integral cartesian plane, map that as
    /// closely as possible to a point on the complex cartesian plane.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            self.origin.re + (pixel.0 as f64) * self.step.0,
            self.origin.im + (pixel.1 as f64) * self.step.1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planemapper_fails_on_empty_grid() {
        let pm = PlaneMapper::new(0, 4, Complex::new(0.0, 0.0), 4.0, 4.0);
        assert!(pm.is_err());
    }

    #[test]
    fn planemapper_fails_on_collapsed_window() {
        let pm = PlaneMapper::new(4, 4, Complex::new(0.0, 0.0), 0.0, 4.0);
        assert!(pm.is_err());
        let pm = PlaneMapper::new(4, 4, Complex::new(0.0, 0.0), 4.0, -1.0);
        assert!(pm.is_err());
    }

    #[test]
    fn planemapper_passes_on_good_shape() {
        let pm = PlaneMapper::new(4, 4, Complex::new(0.0, 0.0), 4.0, 4.0);
        assert!(pm.is_ok());
    }

    #[test]
    fn pixel_to_point_on_centered_window() {
        let pm = PlaneMapper::new(4, 4, Complex::new(0.0, 0.0), 4.0, 4.0).unwrap();
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(-2.0, -2.0));
        assert_eq!(pm.pixel_to_point(&Pixel(2, 2)), Complex::new(0.0, 0.0));
        assert_eq!(pm.pixel_to_point(&Pixel(4, 4)), Complex::new(2.0, 2.0));
    }

    #[test]
    fn pixel_to_point_on_offset_window() {
        let pm = PlaneMapper::new(10, 10, Complex::new(-0.61, -0.60), 1.0, 1.0).unwrap();
        let p = pm.pixel_to_point(&Pixel(5, 5));
        assert!((p.re - -0.61).abs() < 1e-12);
        assert!((p.im - -0.60).abs() < 1e-12);
    }

    #[test]
    fn pixel_to_point_respects_aspect() {
        // A 2:1 grid with a 2:1 window keeps the per-pixel step square.
        let pm = PlaneMapper::new(8, 4, Complex::new(0.0, 0.0), 4.0, 2.0).unwrap();
        let a = pm.pixel_to_point(&Pixel(0, 0));
        let b = pm.pixel_to_point(&Pixel(1, 1));
        assert!((b.re - a.re - 0.5).abs() < 1e-12);
        assert!((b.im - a.im - 0.5).abs() < 1e-12);
    }

    #[test]
    fn grid_len_counts_every_pixel() {
        let pm = PlaneMapper::new(640, 480, Complex::new(0.0, 0.0), 4.0, 3.0).unwrap();
        assert_eq!(pm.len(), 640 * 480);
        assert!(!pm.is_empty());
    }
}

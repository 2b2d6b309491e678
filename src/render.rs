// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fills one frame's pixel buffer, optionally fanning the work out
//! across worker threads.
//!
//! The partition is a row-interleaved stripe: worker `t` of `n` owns
//! every row `j` with `j % n == t`.  Each stripe is handed to its
//! worker as a set of disjoint `&mut` row slices, so the coverage is
//! complete and non-overlapping by construction and no locking is ever
//! needed on the buffer.  Interleaving (rather than contiguous blocks)
//! keeps the stripes balanced even when the escape-time cost varies
//! wildly across the frame, which near the set boundary it does.
//!
//! Threading must never change the picture: the single-threaded path
//! and the striped path write bit-identical buffers.

extern crate crossbeam;

use itertools::iproduct;
use num::Complex;

use mandel::{iteration_to_color, iterations_at_point};
use planes::{Pixel, PlaneMapper};

/// Renders one frame.  Holds the frame's plane mapping and its
/// iteration budget; the pixel buffer is supplied by the caller, who
/// keeps ownership of it for persistence afterwards.
pub struct FrameRenderer {
    plane: PlaneMapper,
    max: u32,
}

impl FrameRenderer {
    /// Constructor.  Fails if the plane is degenerate.
    pub fn new(
        width: usize,
        height: usize,
        center: Complex<f64>,
        xscale: f64,
        yscale: f64,
        max: u32,
    ) -> Result<Self, String> {
        let plane = PlaneMapper::new(width, height, center, xscale, yscale)?;
        Ok(FrameRenderer { plane, max })
    }

    /// The number of pixels a buffer for this frame must hold.
    pub fn len(&self) -> usize {
        self.plane.len()
    }

    /// True for a degenerate zero-pixel frame.
    pub fn is_empty(&self) -> bool {
        self.plane.is_empty()
    }

    // Compute one pixel.  The single shared leaf of both the
    // sequential and the striped paths.
    fn color_at(&self, column: usize, row: usize) -> u32 {
        let point = self.plane.pixel_to_point(&Pixel(column, row));
        iteration_to_color(iterations_at_point(point, self.max), self.max)
    }

    /// Fill the buffer with a plain row-major scan on the calling
    /// thread.  This is both the degenerate case of the striped
    /// renderer and the reference its output is judged against.
    pub fn render_single(&self, buffer: &mut [u32]) -> Result<(), String> {
        self.check_buffer(buffer)?;
        let width = self.plane.width();
        for (row, column) in iproduct!(0..self.plane.height(), 0..width) {
            buffer[row * width + column] = self.color_at(column, row);
        }
        Ok(())
    }

    /// Fill the buffer using `threads` workers over interleaved row
    /// stripes.  All workers are created fresh for this frame and
    /// joined before the call returns, so the buffer is fully
    /// populated by the time the caller persists it.
    pub fn render(&self, buffer: &mut [u32], threads: usize) -> Result<(), String> {
        if threads <= 1 {
            return self.render_single(buffer);
        }
        self.check_buffer(buffer)?;

        let width = self.plane.width();
        let mut stripes: Vec<Vec<(usize, &mut [u32])>> =
            (0..threads).map(|_| Vec::new()).collect();
        for (row, slice) in buffer.chunks_mut(width).enumerate() {
            stripes[row % threads].push((row, slice));
        }

        crossbeam::scope(|spawner| {
            for stripe in stripes {
                spawner.spawn(move |_| {
                    for (row, slice) in stripe {
                        for column in 0..width {
                            slice[column] = self.color_at(column, row);
                        }
                    }
                });
            }
        })
        .map_err(|_| "a render worker panicked".to_string())?;
        Ok(())
    }

    fn check_buffer(&self, buffer: &[u32]) -> Result<(), String> {
        if buffer.len() != self.plane.len() {
            return Err(format!(
                "buffer holds {} pixels but the frame needs {}",
                buffer.len(),
                self.plane.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandel::COLOR_MAX;

    fn renderer(width: usize, height: usize) -> FrameRenderer {
        FrameRenderer::new(width, height, Complex::new(0.0, 0.0), 4.0, 4.0, 100).unwrap()
    }

    #[test]
    fn rejects_misallocated_buffer() {
        let r = renderer(10, 10);
        let mut buffer = vec![0u32; 99];
        assert!(r.render_single(&mut buffer).is_err());
        assert!(r.render(&mut buffer, 4).is_err());
    }

    #[test]
    fn center_pixel_is_inside_the_set() {
        // A 10x10 grid over a width-4 window centered on the origin
        // puts pixel (5,5) exactly on the origin, which never escapes.
        let r = renderer(10, 10);
        let mut buffer = vec![0u32; r.len()];
        r.render_single(&mut buffer).unwrap();
        assert_eq!(buffer[5 * 10 + 5], iteration_to_color(100, 100));
    }

    #[test]
    fn corner_pixel_escapes_fast() {
        let r = renderer(10, 10);
        let point = r.plane.pixel_to_point(&Pixel(0, 0));
        assert!(iterations_at_point(point, 100) < 10);
    }

    #[test]
    fn every_pixel_is_written_once() {
        let r = renderer(16, 16);
        let mut buffer = vec![0xDEAD_BEEF; r.len()];
        r.render(&mut buffer, 5).unwrap();
        // The sentinel is above COLOR_MAX, so any surviving cell was
        // missed by the partition.
        assert!(buffer.iter().all(|&c| c <= COLOR_MAX));
    }

    #[test]
    fn striping_matches_sequential_output() {
        let r = renderer(33, 17);
        let mut reference = vec![0u32; r.len()];
        r.render_single(&mut reference).unwrap();
        for threads in &[2, 3, 4, 7, 32] {
            let mut striped = vec![0u32; r.len()];
            r.render(&mut striped, *threads).unwrap();
            assert_eq!(striped, reference);
        }
    }

    #[test]
    fn more_threads_than_rows_still_covers() {
        let r = renderer(8, 3);
        let mut reference = vec![0u32; r.len()];
        r.render_single(&mut reference).unwrap();
        let mut striped = vec![0u32; r.len()];
        r.render(&mut striped, 16).unwrap();
        assert_eq!(striped, reference);
    }

    #[test]
    fn one_thread_takes_the_sequential_path() {
        let r = renderer(8, 8);
        let mut a = vec![0u32; r.len()];
        let mut b = vec![0u32; r.len()];
        r.render(&mut a, 1).unwrap();
        r.render_single(&mut b).unwrap();
        assert_eq!(a, b);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Produces the ordered list of frame geometries for the animation.
//!
//! The sequence is the only deliberately stateful piece of the system:
//! each frame's horizontal scale is the previous frame's multiplied by
//! the zoom ratio, so frame N depends on frame N-1.  But once a
//! FrameJob has been emitted it is immutable and self-contained, which
//! is exactly what lets frames render in parallel processes
//! afterwards.

use num::Complex;

/// Number of frames in one animation.
pub const FRAME_COUNT: usize = 50;

/// Per-frame shrink factor of the horizontal scale.  The first frame
/// already carries one application of it.
pub const ZOOM_RATIO: f64 = 0.9;

/// Everything a child process needs to render one frame.  Immutable
/// once emitted by the sequencer; lives only as long as its frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameJob {
    /// Position of this frame in the animation, starting at zero.
    pub index: usize,
    /// Pan target; the same for every frame of a run.
    pub center: Complex<f64>,
    /// Extent of the complex window along the real axis.
    pub xscale: f64,
    /// Extent along the imaginary axis, derived from `xscale` to
    /// preserve the pixel grid's aspect ratio.
    pub yscale: f64,
    /// Pixel width of the frame.
    pub width: usize,
    /// Pixel height of the frame.
    pub height: usize,
    /// Escape-time iteration budget.
    pub max: u32,
}

impl FrameJob {
    /// Name of the image file this frame persists to.
    pub fn outfile(&self) -> String {
        format!("mandel{}.png", self.index)
    }
}

/// Iterator over the animation's frames.  Finite, not restartable;
/// carries the current scale from frame to frame.
pub struct ZoomSequence {
    center: Complex<f64>,
    xscale: f64,
    width: usize,
    height: usize,
    max: u32,
    next: usize,
    frames: usize,
}

impl ZoomSequence {
    /// Start a sequence of `frames` jobs zooming onto `center`,
    /// beginning from the configured initial scale.  The full
    /// animation uses FRAME_COUNT frames.
    pub fn new(
        center: Complex<f64>,
        xscale: f64,
        width: usize,
        height: usize,
        max: u32,
        frames: usize,
    ) -> ZoomSequence {
        ZoomSequence {
            center,
            xscale,
            width,
            height,
            max,
            next: 0,
            frames,
        }
    }
}

impl Iterator for ZoomSequence {
    type Item = FrameJob;

    fn next(&mut self) -> Option<FrameJob> {
        if self.next >= self.frames {
            return None;
        }
        self.xscale *= ZOOM_RATIO;
        let job = FrameJob {
            index: self.next,
            center: self.center,
            xscale: self.xscale,
            yscale: self.xscale / (self.width as f64) * (self.height as f64),
            width: self.width,
            height: self.height,
            max: self.max,
        };
        self.next += 1;
        Some(job)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.frames - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ZoomSequence {}

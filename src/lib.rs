#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot zoom renderer
//!
//! Renders a fixed-length animation of Mandelbrot frames, each frame a
//! deeper zoom onto a single point of interest, and writes every frame
//! to its own image file.  The work is fanned out on two levels: a
//! bounded pool of child processes, each owning exactly one frame, and
//! inside every process a set of worker threads that stripe the
//! frame's pixel grid between them.
//!
//! The Mandelbrot itself is the classic escape-time computation: a
//! point on the complex plane is squared and re-added to itself until
//! its magnitude leaves the circle of radius two, and the number of
//! steps that took is mapped to a color.  Points inside the set never
//! leave and are charged the full iteration budget.

extern crate crossbeam;
extern crate itertools;
extern crate num;

pub mod mandel;
pub mod planes;
pub mod pool;
pub mod render;
pub mod sequence;

pub use mandel::{iteration_to_color, iterations_at_point};
pub use planes::PlaneMapper;
pub use pool::ProcessPool;
pub use render::FrameRenderer;
pub use sequence::{FrameJob, ZoomSequence, FRAME_COUNT, ZOOM_RATIO};

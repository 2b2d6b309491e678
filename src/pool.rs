// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Schedules frames onto a bounded number of concurrently running
//! child processes.
//!
//! Admission is batched: up to `limit` frames are launched, then the
//! whole batch is joined before the next batch starts.  That is a
//! coarser policy than topping the pool back up as each child exits,
//! and it trades a little latency at each barrier for a scheduler
//! simple enough to reason about; correctness is unaffected either
//! way, since frames never share state.
//!
//! The pool is generic over how a frame is launched and joined so the
//! batching policy can be tested without spawning real processes.
//! The binary plugs in `Command::spawn` / `Child::wait`.
//!
//! Failure policy: a launch that fails aborts the run, after reaping
//! the children already in flight.  A child that terminates
//! unsuccessfully does not stop its siblings; the frame is recorded
//! and the run as a whole reports the failures at the end.  No frame
//! is ever silently dropped.

use sequence::FrameJob;

/// Runs every frame of a sequence, at most `limit` at a time.
pub struct ProcessPool {
    limit: usize,
}

impl ProcessPool {
    /// Constructor.  A pool must be allowed at least one child.
    pub fn new(limit: usize) -> Result<ProcessPool, String> {
        if limit == 0 {
            return Err("The process pool needs a concurrency limit of at least one.".to_string());
        }
        Ok(ProcessPool { limit })
    }

    /// The pool's concurrency limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Drive the whole sequence through the pool.  `launch` starts one
    /// frame and returns a handle; `join` blocks until that frame's
    /// child has terminated.  Returns the number of frames launched,
    /// or an error once every in-flight child has been reaped.
    pub fn run<I, H, L, J>(&self, jobs: I, mut launch: L, mut join: J) -> Result<usize, String>
    where
        I: IntoIterator<Item = FrameJob>,
        L: FnMut(&FrameJob) -> Result<H, String>,
        J: FnMut(&FrameJob, H) -> Result<(), String>,
    {
        let mut jobs = jobs.into_iter();
        let mut batch: Vec<(FrameJob, H)> = Vec::with_capacity(self.limit);
        let mut launched = 0;
        let mut failures: Vec<String> = Vec::new();

        loop {
            // Admit frames until the batch is full or the sequence is
            // exhausted.
            while batch.len() < self.limit {
                let job = match jobs.next() {
                    Some(job) => job,
                    None => break,
                };
                match launch(&job) {
                    Ok(handle) => {
                        launched += 1;
                        batch.push((job, handle));
                    }
                    Err(e) => {
                        // The children already in flight still get
                        // reaped before the run aborts, and any that
                        // failed stay in the abort report.
                        join_batch(&mut batch, &mut join, &mut failures);
                        let mut message =
                            format!("could not launch frame {}: {}", job.index, e);
                        if !failures.is_empty() {
                            message.push_str(&format!(
                                "; {} earlier frames also failed: {}",
                                failures.len(),
                                failures.join("; ")
                            ));
                        }
                        return Err(message);
                    }
                }
            }

            if batch.is_empty() {
                break;
            }

            // Full-batch barrier: every child terminates before the
            // next batch is admitted.
            join_batch(&mut batch, &mut join, &mut failures);
        }

        if failures.is_empty() {
            Ok(launched)
        } else {
            Err(format!(
                "{} of {} frames failed: {}",
                failures.len(),
                launched,
                failures.join("; ")
            ))
        }
    }
}

fn join_batch<H, J>(batch: &mut Vec<(FrameJob, H)>, join: &mut J, failures: &mut Vec<String>)
where
    J: FnMut(&FrameJob, H) -> Result<(), String>,
{
    for (job, handle) in batch.drain(..) {
        if let Err(e) = join(&job, handle) {
            failures.push(format!("frame {}: {}", job.index, e));
        }
    }
}

//! Cancellable per-frame tasks.
//!
//! Continuous loops (physics sync, webcam frame copy) are driven by the
//! host's frame clock. Each loop owns a [`FrameTask`]; the host calls
//! [`FrameTask::tick`] once per frame and only schedules another frame while
//! it returns `true`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag that stays `true` until the owning task is cancelled.
#[derive(Debug, Clone)]
pub struct LivenessToken(Arc<AtomicBool>);

impl LivenessToken {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Returns `true` if this call flipped the flag.
    fn revoke(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

#[derive(Debug)]
pub struct FrameTask {
    name: &'static str,
    token: LivenessToken,
    frames: u64,
}

impl FrameTask {
    pub fn new(name: &'static str) -> Self {
        log::debug!("Frame task '{}' started", name);
        Self {
            name,
            token: LivenessToken::new(),
            frames: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn token(&self) -> LivenessToken {
        self.token.clone()
    }

    pub fn is_alive(&self) -> bool {
        self.token.is_alive()
    }

    /// Number of frames the callback has run.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run `frame` if the task is still alive. Returns whether another frame
    /// should be scheduled.
    pub fn tick(&mut self, frame: impl FnOnce()) -> bool {
        if !self.token.is_alive() {
            return false;
        }
        frame();
        self.frames += 1;
        // The callback may have cancelled the task.
        self.token.is_alive()
    }

    /// Stop the task. Safe to call any number of times; returns `true` only
    /// for the call that actually stopped it.
    pub fn cancel(&self) -> bool {
        let stopped = self.token.revoke();
        if stopped {
            log::debug!("Frame task '{}' cancelled after {} frames", self.name, self.frames);
        }
        stopped
    }
}

impl Drop for FrameTask {
    fn drop(&mut self) {
        self.token.revoke();
    }
}
